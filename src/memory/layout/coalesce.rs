/*!
 * Free Block Coalescing
 */

use crate::memory::types::Block;
use log::debug;

/// Merge every run of adjacent free blocks into one
///
/// Occupied blocks keep their order; zero-sized free blocks are dropped.
pub(crate) fn coalesce(blocks: Vec<Block>) -> Vec<Block> {
    let before = blocks.len();
    let mut merged: Vec<Block> = Vec::with_capacity(before);

    for block in blocks {
        if block.is_free() {
            if block.size == 0 {
                continue;
            }
            if let Some(last) = merged.last_mut().filter(|last| last.is_free()) {
                last.size += block.size;
                continue;
            }
        }
        merged.push(block);
    }

    if merged.len() < before {
        debug!(
            "Coalesced free blocks, reduced from {} to {} blocks",
            before,
            merged.len()
        );
    }

    merged
}
