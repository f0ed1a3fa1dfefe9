/*!
 * Memory Types
 * Common types for the block-management engine
 */

use crate::core::data_structures::ProcessName;
use crate::core::types::{Offset, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
///
/// None of these are fatal to a session: every failing operation leaves
/// the layout exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("Invalid input: {0}")]
    #[diagnostic(
        code(memory::invalid_input),
        help("Check the process name and size before retrying.")
    )]
    InvalidInput(InvalidInput),

    #[error("Out of memory: requested {requested} units, largest free block {largest_free} units ({total_free} free in total)")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("Compact the layout or swap a process out to make room.")
    )]
    OutOfMemory {
        requested: Size,
        largest_free: Size,
        total_free: Size,
    },

    #[error("Process '{0}' not found")]
    #[diagnostic(
        code(memory::not_found),
        help("The process may have been freed or swapped out already.")
    )]
    NotFound(String),
}

impl MemoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MemoryError::InvalidInput(_) => ErrorKind::InvalidInput,
            MemoryError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            MemoryError::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// True when enough memory is free in aggregate but no single block fits
    pub fn is_fragmentation(&self) -> bool {
        matches!(
            self,
            MemoryError::OutOfMemory { requested, total_free, .. } if total_free >= requested
        )
    }
}

/// Reasons an input is rejected before the layout is touched
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "value", rename_all = "snake_case")]
pub enum InvalidInput {
    #[error("process name is empty")]
    EmptyName,

    #[error("process name '{0}' contains control characters")]
    MalformedName(String),

    #[error("size must be a positive integer, got {0}")]
    NonPositiveSize(i64),

    #[error("'{0}' is not a valid size")]
    InvalidSize(String),

    #[error("process '{0}' is already resident")]
    DuplicateName(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("missing argument <{0}>")]
    MissingArgument(String),

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("capacity must be positive")]
    ZeroCapacity,

    #[error("thresholds out of order: warning {warning}, critical {critical}")]
    InvalidThreshold { warning: f64, critical: f64 },

    #[error("invalid value '{value}' for {key}")]
    InvalidConfig { key: String, value: String },

    #[error("inconsistent layout: {0}")]
    Layout(InvariantViolation),
}

/// Coarse error classification exposed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    OutOfMemory,
    NotFound,
}

/// A broken layout invariant, reported by [`MemoryLayout::check_invariants`]
///
/// [`MemoryLayout::check_invariants`]: super::MemoryLayout::check_invariants
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "invariant", rename_all = "snake_case")]
pub enum InvariantViolation {
    #[error("block sizes sum to {actual}, expected capacity {capacity}")]
    CapacityMismatch { capacity: Size, actual: Size },

    #[error("block {index} has zero size")]
    ZeroSizedBlock { index: usize },

    #[error("free block {index} is followed by another free block")]
    AdjacentFreeBlocks { index: usize },

    #[error("process '{name}' is resident more than once")]
    DuplicateProcess { name: String },
}

/// What occupies a block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum BlockKind {
    Free,
    Occupied(ProcessName),
}

/// A contiguous span of the simulated address space
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    pub kind: BlockKind,
    pub size: Size,
}

impl Block {
    pub fn free(size: Size) -> Self {
        Self {
            kind: BlockKind::Free,
            size,
        }
    }

    pub fn occupied(name: ProcessName, size: Size) -> Self {
        Self {
            kind: BlockKind::Occupied(name),
            size,
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        matches!(self.kind, BlockKind::Free)
    }

    /// Name of the resident process, `None` for free blocks
    #[inline]
    pub fn name(&self) -> Option<&ProcessName> {
        match &self.kind {
            BlockKind::Occupied(name) => Some(name),
            BlockKind::Free => None,
        }
    }

    #[inline]
    pub fn is_named(&self, name: &str) -> bool {
        self.name().map_or(false, |n| n.as_str() == name)
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.kind {
            BlockKind::Free => write!(f, "Free({})", self.size),
            BlockKind::Occupied(name) => write!(f, "{}({})", name, self.size),
        }
    }
}

/// A block together with its derived offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    pub offset: Offset,
    #[serde(flatten)]
    pub block: Block,
}

/// Read-only ordered view of a layout, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub capacity: Size,
    pub blocks: Vec<Block>,
}

impl Snapshot {
    /// Blocks paired with their offsets from the start of the address space
    pub fn placed(&self) -> Vec<PlacedBlock> {
        let mut offset = 0;
        self.blocks
            .iter()
            .map(|block| {
                let placed = PlacedBlock {
                    offset,
                    block: block.clone(),
                };
                offset += block.size;
                placed
            })
            .collect()
    }

    pub fn used(&self) -> Size {
        self.blocks
            .iter()
            .filter(|b| !b.is_free())
            .map(|b| b.size)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A resident process: name and reserved size
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reservation {
    pub name: ProcessName,
    pub size: Size,
}

/// A process evicted to secondary storage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapEntry {
    pub name: ProcessName,
    pub size: Size,
}

impl From<Reservation> for SwapEntry {
    fn from(reservation: Reservation) -> Self {
        Self {
            name: reservation.name,
            size: reservation.size,
        }
    }
}

impl std::fmt::Display for SwapEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.size)
    }
}

/// Memory statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub available_memory: Size,
    pub usage_percentage: f64,
    pub occupied_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    pub swapped_processes: usize,
    pub swapped_memory: Size,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::classify(
            self.usage_percentage / 100.0,
            self.warning_threshold,
            self.critical_threshold,
        )
    }

    /// Share of free memory that cannot be used by a single request
    ///
    /// 0.0 means all free memory is one block; values close to 1.0 mean it
    /// is scattered across many small holes.
    pub fn external_fragmentation(&self) -> f64 {
        if self.available_memory == 0 {
            return 0.0;
        }
        1.0 - (self.largest_free_block as f64 / self.available_memory as f64)
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn classify(usage_ratio: f64, warning: f64, critical: f64) -> Self {
        if usage_ratio >= critical {
            MemoryPressure::Critical
        } else if usage_ratio >= warning {
            MemoryPressure::High
        } else if usage_ratio >= crate::core::limits::MEDIUM_PRESSURE_THRESHOLD {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
