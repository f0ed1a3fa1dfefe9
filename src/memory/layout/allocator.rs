/*!
 * First-Fit Allocation
 * Allocation, release and eviction of named blocks
 */

use super::coalesce::coalesce;
use super::MemoryLayout;
use crate::core::data_structures::ProcessName;
use crate::core::types::Size;
use crate::memory::types::{
    Block, BlockKind, InvalidInput, MemoryError, MemoryResult, Reservation, SwapEntry,
};
use log::{info, warn};

impl MemoryLayout {
    /// Reserve `size` units for `name` in the first free block that fits
    ///
    /// An exact fit converts the free block in place; a larger one is split
    /// into the new occupied block followed by the remainder.
    pub fn allocate(&self, name: &str, size: Size) -> MemoryResult<Self> {
        self.place(ProcessName::new(name)?, size)
    }

    /// First-fit allocation for a name that has already been validated
    pub fn place(&self, name: ProcessName, size: Size) -> MemoryResult<Self> {
        if size == 0 {
            return Err(MemoryError::InvalidInput(InvalidInput::NonPositiveSize(0)));
        }
        if self.contains(&name) {
            return Err(MemoryError::InvalidInput(InvalidInput::DuplicateName(
                name.to_string(),
            )));
        }

        let Some(index) = self
            .blocks
            .iter()
            .position(|block| block.is_free() && block.size >= size)
        else {
            let largest_free = self.largest_free_block();
            let total_free = self.free_size();
            warn!(
                "OOM: '{}' requested {} units, largest free block is {} ({} free in total)",
                name, size, largest_free, total_free
            );
            return Err(MemoryError::OutOfMemory {
                requested: size,
                largest_free,
                total_free,
            });
        };

        let hole = self.blocks[index].size;
        let mut blocks = Vec::with_capacity(self.blocks.len() + 1);
        blocks.extend_from_slice(&self.blocks[..index]);
        if hole > size {
            info!(
                "Split block: keeping {} units for '{}', returning {} units to free space",
                size,
                name,
                hole - size
            );
            blocks.push(Block::occupied(name, size));
            blocks.push(Block::free(hole - size));
        } else {
            blocks.push(Block::occupied(name, size));
        }
        blocks.extend_from_slice(&self.blocks[index + 1..]);

        Ok(Self::from_parts(self.capacity, blocks))
    }

    /// Release the block owned by `name`, coalescing it with free neighbours
    ///
    /// Returns the next layout and the reservation that was released.
    pub fn free(&self, name: &str) -> MemoryResult<(Self, Reservation)> {
        let (index, owner, size) = self
            .blocks
            .iter()
            .enumerate()
            .find_map(|(index, block)| match &block.kind {
                BlockKind::Occupied(owner) if owner.as_str() == name => {
                    Some((index, owner.clone(), block.size))
                }
                _ => None,
            })
            .ok_or_else(|| MemoryError::NotFound(name.to_string()))?;

        let mut blocks = self.blocks.clone();
        blocks[index] = Block::free(size);

        Ok((
            Self::from_parts(self.capacity, coalesce(blocks)),
            Reservation { name: owner, size },
        ))
    }

    /// Remove `name` from the layout for swapping out
    ///
    /// The freed span becomes ordinary free space; no hole is reserved for
    /// the process.
    pub fn evict(&self, name: &str) -> MemoryResult<(Self, SwapEntry)> {
        let (layout, released) = self.free(name)?;
        Ok((layout, SwapEntry::from(released)))
    }
}
