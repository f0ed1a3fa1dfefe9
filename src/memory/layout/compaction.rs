/*!
 * Compaction and Relocation
 * Packing resident processes towards offset 0
 */

use super::MemoryLayout;
use crate::memory::types::Block;

impl MemoryLayout {
    /// Pack every occupied block from offset 0, keeping their relative order,
    /// and gather all free space into one trailing block
    ///
    /// Residency and sizes never change, only offsets. Applying it to an
    /// already compact layout returns an equal layout.
    pub fn compact(&self) -> Self {
        let mut blocks: Vec<Block> = self
            .blocks
            .iter()
            .filter(|b| !b.is_free())
            .cloned()
            .collect();
        let occupied: usize = blocks.iter().map(|b| b.size).sum();
        let free = self.capacity - occupied;
        if free > 0 {
            blocks.push(Block::free(free));
        }
        Self::from_parts(self.capacity, blocks)
    }

    /// Produce the optimized placement of resident processes
    ///
    /// The optimized placement is the compacted one; callers that need a
    /// different policy should add a new operation rather than change this.
    pub fn relocate(&self) -> Self {
        self.compact()
    }
}
