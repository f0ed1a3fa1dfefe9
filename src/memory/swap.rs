/*!
 * Swap Registry
 * Append-only record of processes evicted to secondary storage
 */

use super::types::SwapEntry;
use crate::core::types::Size;
use serde::{Deserialize, Serialize};

/// Ordered list of swapped-out processes
///
/// Entries are never removed: there is no swap-in. A name may appear more
/// than once if the process was re-allocated and swapped out again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapRegistry {
    entries: Vec<SwapEntry>,
}

impl SwapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SwapEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SwapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combined size of every swapped-out process
    pub fn total_size(&self) -> Size {
        self.entries.iter().map(|e| e.size).sum()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name.as_str() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SwapEntry> {
        self.entries.iter()
    }
}
