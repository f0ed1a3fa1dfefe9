/*!
 * memsim
 *
 * Teaching simulator for a single-level contiguous memory allocator:
 * first-fit allocation, block splitting, coalescing, compaction,
 * relocation and swap-out.
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{MemoryConfig, ProcessName};
pub use memory::{
    Block, BlockKind, Command, ErrorKind, LayoutObserver, MemoryError, MemoryLayout,
    MemoryManager, MemoryResult, MemoryStats, Outcome, Snapshot, SwapEntry,
};
pub use monitoring::init_tracing;
