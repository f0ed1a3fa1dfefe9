/*!
 * Memory Traits
 * Seams between the simulator and its collaborators
 */

use super::command::Outcome;
use super::types::*;
use crate::core::types::Size;

/// First-fit allocation of named blocks
pub trait Allocator: Send + Sync {
    /// Reserve `size` units for process `name`
    fn allocate(&self, name: &str, size: Size) -> MemoryResult<Outcome>;

    /// Release the block owned by process `name`
    fn free(&self, name: &str) -> MemoryResult<Outcome>;
}

/// Defragmentation of the address space
pub trait Defragmenter: Send + Sync {
    /// Pack resident processes from offset 0; never fails
    fn compact(&self) -> Outcome;

    /// Move resident processes to their optimized placement; never fails
    fn relocate(&self) -> Outcome;
}

/// Eviction to secondary storage
pub trait Swapper: Send + Sync {
    /// Evict process `name` and record it in the swap registry
    fn swap_out(&self, name: &str) -> MemoryResult<Outcome>;

    /// Swap registry entries in eviction order
    fn swapped(&self) -> Vec<SwapEntry>;
}

/// Memory statistics provider
pub trait MemoryInfo: Send + Sync {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Current ordered block snapshot
    fn snapshot(&self) -> Snapshot;

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}

/// Receives the outcome of every successful command
///
/// This is how the presentation layer learns about new layouts. It is called
/// after the session lock has been released, so implementations may query
/// the session again.
pub trait LayoutObserver: Send + Sync {
    fn layout_changed(&self, outcome: &Outcome);
}

/// Simulator trait combining all interfaces
pub trait MemorySimulator: Allocator + Defragmenter + Swapper + MemoryInfo + Clone {}

/// Implement MemorySimulator for types that implement all required traits
impl<T> MemorySimulator for T where T: Allocator + Defragmenter + Swapper + MemoryInfo + Clone {}
