/*!
 * Memory Manager Statistics
 * Usage reporting and pressure classification
 */

use super::MemoryManager;
use crate::core::types::Size;
use crate::memory::types::{MemoryPressure, MemoryStats, Snapshot};

impl MemoryManager {
    /// Current ordered block snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.state.lock().layout.snapshot()
    }

    /// Get overall memory info: (total, used, available)
    pub fn info(&self) -> (Size, Size, Size) {
        let state = self.state.lock();
        let used = state.layout.occupied_size();
        (state.layout.capacity(), used, state.layout.capacity() - used)
    }

    /// Get detailed memory statistics
    pub fn stats(&self) -> MemoryStats {
        let state = self.state.lock();
        let layout = &state.layout;
        let used = layout.occupied_size();

        MemoryStats {
            total_memory: layout.capacity(),
            used_memory: used,
            available_memory: layout.capacity() - used,
            usage_percentage: self.usage_percentage(used),
            occupied_blocks: layout.occupied_block_count(),
            free_blocks: layout.free_block_count(),
            largest_free_block: layout.largest_free_block(),
            swapped_processes: state.swap.len(),
            swapped_memory: state.swap.total_size(),
            warning_threshold: self.config.warning_threshold,
            critical_threshold: self.config.critical_threshold,
        }
    }

    pub(super) fn usage_percentage(&self, used: Size) -> f64 {
        (used as f64 / self.config.capacity as f64) * 100.0
    }

    /// Pressure level worth reporting, `None` while usage is low
    pub(super) fn check_memory_pressure(&self, used: Size) -> Option<MemoryPressure> {
        let level = MemoryPressure::classify(
            used as f64 / self.config.capacity as f64,
            self.config.warning_threshold,
            self.config.critical_threshold,
        );
        (level != MemoryPressure::Low).then_some(level)
    }
}
