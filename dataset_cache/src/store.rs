//! Path-keyed tree store
//!
//! Values live at the leaves of a tree of directories. Every path segment but
//! the last names a directory; the last names either a value or a directory.

use crate::eviction::{BoundedEvictionPolicy, Eviction};
use crate::node::{CacheNode, Directory, Lookup};
use dataset_path::{join_path, DatasetPath, PathError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters describing the current store contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Number of stored values
    pub leaves: usize,
    /// Number of top-level keys
    pub top_level: usize,
    /// Evictions since the store was created
    pub evictions: u64,
}

/// Mutable tree keyed by slash-delimited paths
///
/// Mutations bump [`revision`](Self::revision) so derived views (such as the
/// directory index) can tell whether they are stale.
#[derive(Debug)]
pub struct PathKeyedStore<T> {
    root: Directory<T>,
    policy: BoundedEvictionPolicy,
    revision: u64,
    evictions: u64,
}

impl<T> PathKeyedStore<T> {
    /// Creates an empty store holding at most `capacity` top-level keys
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(BoundedEvictionPolicy::new(capacity))
    }

    /// Creates an empty store with an explicit eviction policy
    pub fn with_policy(policy: BoundedEvictionPolicy) -> Self {
        Self {
            root: Directory::new(),
            policy,
            revision: 0,
            evictions: 0,
        }
    }

    /// Stores `value` at `path`, creating intermediate directories
    ///
    /// Whatever was at `path` is replaced. A leaf met on the way down is
    /// replaced by a directory. If the first segment is a new top-level key and
    /// the store is full, the oldest top-level subtree is evicted first.
    pub fn set(&mut self, path: &str, value: T) -> Result<(), PathError> {
        self.set_shared(path, Arc::new(value))
    }

    /// Stores an already shared value at `path`
    pub fn set_shared(&mut self, path: &str, value: Arc<T>) -> Result<(), PathError> {
        let segments = DatasetPath::split(path)?;
        let (name, parents) = segments.split_last().ok_or(PathError::Empty)?;

        if let Some(eviction) = self.policy.apply(&mut self.root, segments[0]) {
            self.record_eviction(eviction);
        }

        let mut current = &mut self.root;
        for segment in parents {
            let node = current
                .entry(segment.to_string())
                .or_insert_with(CacheNode::empty_directory);
            if node.is_leaf() {
                debug!(path, segment, "Replacing leaf with directory");
            }
            current = node.ensure_directory();
        }

        if let Some(CacheNode::Directory(children)) = current.get(*name) {
            debug!(path, children = children.len(), "Replacing directory with leaf");
        }
        current.insert(name.to_string(), CacheNode::Leaf(value));

        self.revision += 1;
        debug!(path, revision = self.revision, "Stored entry");
        Ok(())
    }

    /// Looks up `path`
    ///
    /// Unparsable paths are reported as [`Lookup::Missing`].
    pub fn get(&self, path: &str) -> Lookup<'_, T> {
        let Ok(segments) = DatasetPath::split(path) else {
            return Lookup::Missing;
        };

        let Some((name, parents)) = segments.split_last() else {
            return Lookup::Missing;
        };

        let mut current = &self.root;
        for segment in parents {
            match current.get(*segment) {
                Some(CacheNode::Directory(children)) => current = children,
                _ => return Lookup::Missing,
            }
        }

        current
            .get(*name)
            .map_or(Lookup::Missing, CacheNode::as_lookup)
    }

    /// Returns the stored value at `path`, if `path` names a leaf
    pub fn get_leaf(&self, path: &str) -> Option<&Arc<T>> {
        self.get(path).leaf()
    }

    /// Returns true if `path` names either a leaf or a directory
    pub fn has(&self, path: &str) -> bool {
        !self.get(path).is_missing()
    }

    /// Returns true if `path` names a stored value
    pub fn is_leaf(&self, path: &str) -> bool {
        self.get(path).is_leaf()
    }

    /// Returns true if `path` names a directory
    pub fn is_directory(&self, path: &str) -> bool {
        self.get(path).is_directory()
    }

    /// Removes the node at `path` and returns it
    ///
    /// Returns `None` (and leaves the store untouched) if `path` does not resolve.
    /// Parent directories are kept even if they become empty.
    pub fn remove(&mut self, path: &str) -> Option<CacheNode<T>> {
        let segments = DatasetPath::split(path).ok()?;
        let (name, parents) = segments.split_last()?;

        let mut current = &mut self.root;
        for segment in parents {
            match current.get_mut(*segment)? {
                CacheNode::Directory(children) => current = children,
                CacheNode::Leaf(_) => return None,
            }
        }

        let removed = current.shift_remove(*name)?;
        self.revision += 1;
        debug!(path, leaves = removed.leaf_count(), "Removed entry");
        Some(removed)
    }

    /// Full paths of every stored value, depth first in insertion order
    ///
    /// The order is stable for a given tree but unspecified across mutations.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.for_each_leaf(|path, _| paths.push(path.to_string()));
        paths
    }

    /// Every stored value, in the same order as [`leaf_paths`](Self::leaf_paths)
    pub fn leaf_values(&self) -> Vec<&Arc<T>> {
        let mut values = Vec::new();
        walk_leaves(&self.root, &mut Vec::new(), &mut |_, value| values.push(value));
        values
    }

    /// Calls `visit` with the full path and value of every leaf
    pub fn for_each_leaf<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&str, &'a Arc<T>),
    {
        walk_leaves(&self.root, &mut Vec::new(), &mut |segments, value| {
            visit(&join_path(segments), value)
        });
    }

    /// Number of stored values (not top-level keys)
    pub fn count(&self) -> usize {
        self.root.values().map(CacheNode::leaf_count).sum()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of top-level keys; this is what the capacity bounds
    pub fn top_level_count(&self) -> usize {
        self.root.len()
    }

    /// Maximum number of top-level keys
    pub fn capacity(&self) -> usize {
        self.policy.capacity()
    }

    /// The root directory
    pub fn root(&self) -> &Directory<T> {
        &self.root
    }

    /// Mutation counter, bumped on every successful change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            leaves: self.count(),
            top_level: self.top_level_count(),
            evictions: self.evictions,
        }
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        if self.root.is_empty() {
            return;
        }
        self.root.clear();
        self.revision += 1;
        debug!("Store cleared");
    }

    /// Keeps only the leaves for which `keep` returns true
    ///
    /// Directories left without children are dropped. Returns the number of
    /// leaves removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &T) -> bool,
    {
        let removed = retain_leaves(&mut self.root, &mut Vec::new(), &mut keep);
        if removed > 0 {
            self.revision += 1;
            debug!(removed, "Pruned store");
        }
        removed
    }

    /// Keeps only what is listed in `paths`, dropping everything else
    ///
    /// A listed leaf keeps itself; a listed directory keeps its whole subtree.
    /// Listed paths are normalized first, so `/a/b/` keeps `a/b`. Returns the
    /// number of leaves removed.
    pub fn clear_except<S: AsRef<str>>(&mut self, paths: &[S]) -> usize {
        let keep: Vec<DatasetPath> = paths
            .iter()
            .filter_map(|p| DatasetPath::parse(p.as_ref()).ok())
            .collect();
        self.retain(|path, _| keep.iter().any(|kept| kept.covers(path)))
    }

    fn record_eviction(&mut self, eviction: Eviction) {
        self.evictions += 1;
        self.revision += 1;
        warn!(
            key = %eviction.key,
            leaves_dropped = eviction.leaves_dropped,
            capacity = self.policy.capacity(),
            "Evicted top-level entry"
        );
    }
}

impl<T> Default for PathKeyedStore<T> {
    fn default() -> Self {
        Self::with_policy(BoundedEvictionPolicy::default())
    }
}

fn walk_leaves<'a, T, F>(dir: &'a Directory<T>, prefix: &mut Vec<&'a str>, visit: &mut F)
where
    F: FnMut(&[&'a str], &'a Arc<T>),
{
    for (name, node) in dir {
        prefix.push(name.as_str());
        match node {
            CacheNode::Directory(children) => walk_leaves(children, prefix, visit),
            CacheNode::Leaf(value) => visit(prefix, value),
        }
        prefix.pop();
    }
}

fn retain_leaves<T, F>(dir: &mut Directory<T>, prefix: &mut Vec<String>, keep: &mut F) -> usize
where
    F: FnMut(&str, &T) -> bool,
{
    let mut removed = 0;
    dir.retain(|name, node| {
        prefix.push(name.clone());
        let retained = match node {
            CacheNode::Leaf(value) => {
                let kept = keep(&join_path(prefix.as_slice()), &**value);
                if !kept {
                    removed += 1;
                }
                kept
            }
            CacheNode::Directory(children) => {
                let was_empty = children.is_empty();
                removed += retain_leaves(children, prefix, keep);
                was_empty || !children.is_empty()
            }
        };
        prefix.pop();
        retained
    });
    removed
}
