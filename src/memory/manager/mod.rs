/*!
 * Memory Manager
 *
 * One simulation session: a memory layout, its swap registry and the
 * configuration they were created with.
 *
 * ## Command model
 *
 * Every command is a single atomic transition. The session state sits behind
 * one mutex; a command locks it, computes the next layout from the current
 * one, and replaces it only on success. A failed command therefore leaves the
 * session exactly as it found it, and commands submitted from several handles
 * are applied one at a time.
 *
 * ## Features
 *
 * - **First-fit allocation** with block splitting
 * - **Coalescing** of adjacent free blocks after free and swap-out
 * - **Compaction / relocation** with no-op detection
 * - **Swap registry** recording every evicted process
 * - **Memory pressure tracking**: MEDIUM at 60%, configurable HIGH and CRITICAL
 * - **Observer** notified with the outcome of every successful command
 */

mod ops;
mod stats;

use super::layout::MemoryLayout;
use super::swap::SwapRegistry;
use super::traits::{Allocator, Defragmenter, LayoutObserver, MemoryInfo, Swapper};
use super::command::Outcome;
use super::types::{MemoryResult, MemoryStats, Snapshot, SwapEntry};
use crate::core::config::MemoryConfig;
use crate::core::limits::DEFAULT_CAPACITY;
use crate::core::types::Size;
use log::info;
use parking_lot::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Mutable part of a session
#[derive(Debug, Clone)]
pub(super) struct SessionState {
    pub(super) layout: MemoryLayout,
    pub(super) swap: SwapRegistry,
}

/// Memory manager
///
/// Cloning is cheap and yields another handle to the same session.
pub struct MemoryManager {
    pub(super) state: Arc<Mutex<SessionState>>,
    pub(super) config: MemoryConfig,
    pub(super) commands_executed: Arc<AtomicU64>,
    observer: Option<Arc<dyn LayoutObserver>>,
}

impl MemoryManager {
    /// Session with the default 1024-unit capacity
    pub fn new() -> Self {
        Self::from_layout(MemoryConfig::default(), MemoryLayout::empty(DEFAULT_CAPACITY))
    }

    /// Create a session with custom capacity (useful for testing)
    pub fn with_capacity(capacity: Size) -> MemoryResult<Self> {
        Self::with_config(MemoryConfig::new(capacity)?)
    }

    pub fn with_config(config: MemoryConfig) -> MemoryResult<Self> {
        config.validate()?;
        let layout = MemoryLayout::new(config.capacity)?;
        Ok(Self::from_layout(config, layout))
    }

    fn from_layout(config: MemoryConfig, layout: MemoryLayout) -> Self {
        info!(
            "Memory manager initialized with {} units (first-fit, warning at {:.0}%, critical at {:.0}%)",
            layout.capacity(),
            config.warning_threshold * 100.0,
            config.critical_threshold * 100.0
        );
        Self {
            state: Arc::new(Mutex::new(SessionState {
                layout,
                swap: SwapRegistry::new(),
            })),
            config,
            commands_executed: Arc::new(AtomicU64::new(0)),
            observer: None,
        }
    }

    /// Add a layout observer
    pub fn with_observer(mut self, observer: Arc<dyn LayoutObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set observer after construction
    pub fn set_observer(&mut self, observer: Arc<dyn LayoutObserver>) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Copy of the current layout value
    pub fn layout(&self) -> MemoryLayout {
        self.state.lock().layout.clone()
    }

    /// Swap registry entries in eviction order
    pub fn swap_entries(&self) -> Vec<SwapEntry> {
        self.state.lock().swap.entries().to_vec()
    }

    pub(super) fn notify(&self, outcome: &Outcome) {
        if let Some(ref observer) = self.observer {
            observer.layout_changed(outcome);
        }
    }
}

// Implement trait interfaces
impl Allocator for MemoryManager {
    fn allocate(&self, name: &str, size: Size) -> MemoryResult<Outcome> {
        MemoryManager::allocate(self, name, size)
    }

    fn free(&self, name: &str) -> MemoryResult<Outcome> {
        MemoryManager::free(self, name)
    }
}

impl Defragmenter for MemoryManager {
    fn compact(&self) -> Outcome {
        MemoryManager::compact(self)
    }

    fn relocate(&self) -> Outcome {
        MemoryManager::relocate(self)
    }
}

impl Swapper for MemoryManager {
    fn swap_out(&self, name: &str) -> MemoryResult<Outcome> {
        MemoryManager::swap_out(self, name)
    }

    fn swapped(&self) -> Vec<SwapEntry> {
        MemoryManager::swap_entries(self)
    }
}

impl MemoryInfo for MemoryManager {
    fn stats(&self) -> MemoryStats {
        MemoryManager::stats(self)
    }

    fn snapshot(&self) -> Snapshot {
        MemoryManager::snapshot(self)
    }
}

impl Clone for MemoryManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            config: self.config,
            commands_executed: Arc::clone(&self.commands_executed),
            observer: self.observer.as_ref().map(Arc::clone),
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}
