/*!
 * Memory Layout
 *
 * Ordered sequence of blocks covering a fixed capacity, left to right from
 * offset 0.
 *
 * ## Invariants
 *
 * Every layout value handed out by this module satisfies:
 *
 * - Block sizes sum to the capacity
 * - No block has zero size
 * - No two adjacent blocks are free (free space is maximally coalesced)
 * - Resident process names are unique
 * - Block order is physical order; only compaction moves occupied blocks
 *
 * ## Value semantics
 *
 * Operations never mutate a layout in place. Each takes `&self` and returns
 * the next layout (or an error, in which case `self` is still the current
 * state). No-op detection for compaction is plain equality.
 */

mod allocator;
mod coalesce;
mod compaction;

use super::types::{
    Block, InvalidInput, InvariantViolation, MemoryError, MemoryResult, Reservation, Snapshot,
};
use crate::core::types::{Offset, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLayout")]
pub struct MemoryLayout {
    capacity: Size,
    blocks: Vec<Block>,
}

/// Unchecked wire form; deserialized layouts go through [`MemoryLayout::from_blocks`]
#[derive(Deserialize)]
struct RawLayout {
    capacity: Size,
    blocks: Vec<Block>,
}

impl TryFrom<RawLayout> for MemoryLayout {
    type Error = MemoryError;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        Self::from_blocks(raw.capacity, raw.blocks)
    }
}

impl MemoryLayout {
    /// Empty layout: one free block spanning the whole capacity
    pub fn new(capacity: Size) -> MemoryResult<Self> {
        NonZeroUsize::new(capacity)
            .map(Self::empty)
            .ok_or(MemoryError::InvalidInput(InvalidInput::ZeroCapacity))
    }

    pub fn empty(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: capacity.get(),
            blocks: vec![Block::free(capacity.get())],
        }
    }

    /// Build a layout from an explicit block list
    ///
    /// The list must already be a valid layout for `capacity`; it is not
    /// coalesced or repaired.
    pub fn from_blocks(capacity: Size, blocks: Vec<Block>) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::InvalidInput(InvalidInput::ZeroCapacity));
        }
        let layout = Self { capacity, blocks };
        layout
            .check_invariants()
            .map_err(|violation| MemoryError::InvalidInput(InvalidInput::Layout(violation)))?;
        Ok(layout)
    }

    /// Internal constructor for layouts the operations just computed
    fn from_parts(capacity: Size, blocks: Vec<Block>) -> Self {
        let layout = Self { capacity, blocks };
        debug_assert_eq!(layout.check_invariants(), Ok(()));
        layout
    }

    #[inline]
    pub fn capacity(&self) -> Size {
        self.capacity
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a valid layout; present for API symmetry with `len`
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Index and block of the resident process called `name`
    pub fn find(&self, name: &str) -> Option<(usize, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .find(|(_, block)| block.is_named(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Offset of the resident process called `name`
    pub fn offset_of(&self, name: &str) -> Option<Offset> {
        let (index, _) = self.find(name)?;
        Some(self.blocks[..index].iter().map(|b| b.size).sum())
    }

    pub fn occupied_size(&self) -> Size {
        self.blocks
            .iter()
            .filter(|b| !b.is_free())
            .map(|b| b.size)
            .sum()
    }

    pub fn free_size(&self) -> Size {
        self.capacity - self.occupied_size()
    }

    pub fn largest_free_block(&self) -> Size {
        self.blocks
            .iter()
            .filter(|b| b.is_free())
            .map(|b| b.size)
            .max()
            .unwrap_or(0)
    }

    pub fn free_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_free()).count()
    }

    pub fn occupied_block_count(&self) -> usize {
        self.blocks.len() - self.free_block_count()
    }

    /// Resident processes in address order
    pub fn processes(&self) -> Vec<Reservation> {
        self.blocks
            .iter()
            .filter_map(|b| {
                b.name().map(|name| Reservation {
                    name: name.clone(),
                    size: b.size,
                })
            })
            .collect()
    }

    /// True when all occupied blocks are packed from offset 0 and at most one
    /// free block trails them
    pub fn is_compact(&self) -> bool {
        match self.blocks.iter().position(Block::is_free) {
            Some(first_free) => first_free == self.blocks.len() - 1,
            None => true,
        }
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            capacity: self.capacity,
            blocks: self.blocks.clone(),
        }
    }

    /// Report the first broken invariant, if any
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        // Saturates so an oversized block list reports a mismatch instead of overflowing
        let actual = self
            .blocks
            .iter()
            .try_fold(0, |sum: Size, b| sum.checked_add(b.size))
            .unwrap_or(Size::MAX);
        if actual != self.capacity {
            return Err(InvariantViolation::CapacityMismatch {
                capacity: self.capacity,
                actual,
            });
        }

        if let Some(index) = self.blocks.iter().position(|b| b.size == 0) {
            return Err(InvariantViolation::ZeroSizedBlock { index });
        }

        if let Some(index) = self
            .blocks
            .windows(2)
            .position(|pair| pair[0].is_free() && pair[1].is_free())
        {
            return Err(InvariantViolation::AdjacentFreeBlocks { index });
        }

        let mut seen = HashSet::new();
        for name in self.blocks.iter().filter_map(Block::name) {
            if !seen.insert(name.as_str()) {
                return Err(InvariantViolation::DuplicateProcess {
                    name: name.to_string(),
                });
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a MemoryLayout {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl std::fmt::Display for MemoryLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", block)?;
        }
        write!(f, "]")
    }
}
