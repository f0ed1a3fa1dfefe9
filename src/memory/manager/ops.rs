/*!
 * Memory Manager Operations
 * Command execution against the session state
 */

use super::MemoryManager;
use crate::core::data_structures::ProcessName;
use crate::core::types::Size;
use crate::memory::command::{Command, Outcome};
use crate::memory::layout::MemoryLayout;
use crate::memory::types::{MemoryResult, Snapshot};
use crate::monitoring::CommandSpan;
use log::{info, warn};
use std::sync::atomic::Ordering;

impl MemoryManager {
    /// Reserve `size` units for `name` using first-fit
    pub fn allocate(&self, name: &str, size: Size) -> MemoryResult<Outcome> {
        let owner = ProcessName::new(name)?;
        let outcome = {
            let mut state = self.state.lock();
            let next = state.layout.place(owner.clone(), size)?;
            let offset = next.offset_of(name).unwrap_or_default();
            state.layout = next;

            let used = state.layout.occupied_size();
            if let Some(level) = self.check_memory_pressure(used) {
                warn!(
                    "Memory pressure {}: Allocated {} units at offset {} for '{}' ({:.1}% used: {} / {})",
                    level,
                    size,
                    offset,
                    name,
                    self.usage_percentage(used),
                    used,
                    state.layout.capacity()
                );
            } else {
                info!("Allocated {} units at offset {} for '{}'", size, offset, name);
            }

            Outcome::Allocated {
                name: owner,
                size,
                snapshot: state.layout.snapshot(),
            }
        };

        self.notify(&outcome);
        Ok(outcome)
    }

    /// Release the block owned by `name` and coalesce free space
    pub fn free(&self, name: &str) -> MemoryResult<Outcome> {
        let outcome = {
            let mut state = self.state.lock();
            let (next, released) = state.layout.free(name).map_err(|e| {
                warn!("Attempted to free unknown process '{}'", name);
                e
            })?;
            state.layout = next;

            info!(
                "Freed {} units from '{}' ({} units now free in {} blocks)",
                released.size,
                released.name,
                state.layout.free_size(),
                state.layout.free_block_count()
            );

            Outcome::Freed {
                name: released.name,
                size: released.size,
                snapshot: state.layout.snapshot(),
            }
        };

        self.notify(&outcome);
        Ok(outcome)
    }

    /// Pack resident processes from offset 0
    pub fn compact(&self) -> Outcome {
        let (changed, snapshot) = self.reorganize("Compaction", MemoryLayout::compact);
        let outcome = Outcome::Compacted { changed, snapshot };
        self.notify(&outcome);
        outcome
    }

    /// Move resident processes to their optimized placement
    pub fn relocate(&self) -> Outcome {
        let (changed, snapshot) = self.reorganize("Relocation", MemoryLayout::relocate);
        let outcome = Outcome::Relocated { changed, snapshot };
        self.notify(&outcome);
        outcome
    }

    /// Evict `name` to the swap registry, freeing its span
    pub fn swap_out(&self, name: &str) -> MemoryResult<Outcome> {
        let outcome = {
            let mut state = self.state.lock();
            let (next, entry) = state.layout.evict(name).map_err(|e| {
                warn!("Attempted to swap out unknown process '{}'", name);
                e
            })?;
            state.layout = next;
            state.swap.push(entry.clone());

            info!(
                "Swapped out '{}' ({} units), {} processes in swap ({} units)",
                entry.name,
                entry.size,
                state.swap.len(),
                state.swap.total_size()
            );

            Outcome::SwappedOut {
                entry,
                snapshot: state.layout.snapshot(),
            }
        };

        self.notify(&outcome);
        Ok(outcome)
    }

    /// Apply a command inside a traced span
    pub fn execute(&self, command: &Command) -> MemoryResult<Outcome> {
        let seq = self.commands_executed.fetch_add(1, Ordering::SeqCst) + 1;
        let span = CommandSpan::new(command.name(), seq);

        let result = {
            let _entered = span.enter();
            match command {
                Command::Allocate { name, size } => self.allocate(name, *size),
                Command::Free { name } => self.free(name),
                Command::Compact => Ok(self.compact()),
                Command::Relocate => Ok(self.relocate()),
                Command::SwapOut { name } => self.swap_out(name),
            }
        };

        match &result {
            Ok(outcome) => span.record_outcome(outcome.changed()),
            Err(e) => span.record_error(e),
        }
        result
    }

    /// Number of commands applied through [`MemoryManager::execute`]
    pub fn commands_executed(&self) -> u64 {
        self.commands_executed.load(Ordering::SeqCst)
    }

    /// Replace the layout with its rearranged form if that differs
    fn reorganize(
        &self,
        operation: &str,
        rearrange: fn(&MemoryLayout) -> MemoryLayout,
    ) -> (bool, Snapshot) {
        let mut state = self.state.lock();
        let next = rearrange(&state.layout);
        let changed = next != state.layout;

        if changed {
            info!(
                "{}: {} processes packed from offset 0, {} free blocks merged into one of {} units",
                operation,
                next.occupied_block_count(),
                state.layout.free_block_count(),
                next.free_size()
            );
            state.layout = next;
        } else {
            info!("{}: layout already compact, no changes made", operation);
        }

        (changed, state.layout.snapshot())
    }
}
