/*!
 * Memory Module
 * Contiguous block allocation, compaction and swapping
 */

pub mod command;
pub mod layout;
pub mod manager;
pub mod swap;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use command::{parse_size, Command, Outcome};
pub use layout::MemoryLayout;
pub use manager::MemoryManager;
pub use swap::SwapRegistry;
pub use traits::*;
pub use types::*;
