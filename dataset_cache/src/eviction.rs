//! Bounded eviction of top-level keys
//!
//! The store caps the number of top-level keys, not the number of leaves.
//! When a `set` would introduce a new top-level key while the cap is already
//! reached, the oldest top-level key (first inserted) is dropped together with
//! everything below it.

use crate::node::{CacheNode, Directory};

/// Default cap on top-level keys
pub const DEFAULT_CAPACITY: usize = 256;

/// Record of one eviction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    /// Top-level key that was dropped
    pub key: String,
    /// Number of leaves that disappeared with it
    pub leaves_dropped: usize,
}

/// FIFO eviction over top-level keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedEvictionPolicy {
    capacity: usize,
}

impl BoundedEvictionPolicy {
    /// Creates a policy with the given capacity
    ///
    /// A capacity of zero is raised to one so that the most recent insert
    /// always survives.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of top-level keys
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if inserting now requires dropping a top-level key
    ///
    /// Overwriting or extending an existing top-level key never evicts.
    pub fn needs_eviction(&self, top_level_count: usize, introduces_new_key: bool) -> bool {
        introduces_new_key && top_level_count >= self.capacity
    }

    /// Picks the top-level key to drop: the one inserted first
    pub fn select_victim<'a, T>(&self, root: &'a Directory<T>) -> Option<&'a str> {
        root.keys().next().map(String::as_str)
    }

    /// Drops one top-level subtree from `root` if `new_key` would exceed the cap
    pub fn apply<T>(&self, root: &mut Directory<T>, new_key: &str) -> Option<Eviction> {
        if !self.needs_eviction(root.len(), !root.contains_key(new_key)) {
            return None;
        }

        let victim = self.select_victim(root)?.to_string();
        let removed = root.shift_remove(&victim)?;

        Some(Eviction {
            key: victim,
            leaves_dropped: removed.leaf_count(),
        })
    }
}

impl Default for BoundedEvictionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
