//! Flattened directory index
//!
//! The index is a snapshot of the store's paths. It is not kept in sync
//! automatically: call [`DirectoryIndex::recompute`] after mutating the store.
//! [`DirectoryIndex::is_current`] reports whether a recompute is due.

use crate::node::{CacheNode, Directory};
use crate::store::PathKeyedStore;
use dataset_path::join_path;
use tracing::debug;

/// Cached lists of every path in a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    /// Directories and leaves, parents before children
    all_paths: Vec<String>,
    /// Leaves only; these are the selectable datasets
    leaf_paths: Vec<String>,
    /// Store revision this snapshot was taken at
    revision: Option<u64>,
}

impl DirectoryIndex {
    /// Creates an empty index that has never been computed
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from the current store contents
    pub fn build<T>(store: &PathKeyedStore<T>) -> Self {
        let mut index = Self::new();
        index.recompute(store);
        index
    }

    /// Rebuilds both path lists from `store`
    pub fn recompute<T>(&mut self, store: &PathKeyedStore<T>) {
        self.all_paths.clear();
        self.leaf_paths.clear();
        collect(
            store.root(),
            &mut Vec::new(),
            &mut self.all_paths,
            &mut self.leaf_paths,
        );
        self.revision = Some(store.revision());
        debug!(
            paths = self.all_paths.len(),
            leaves = self.leaf_paths.len(),
            revision = store.revision(),
            "Recomputed directory index"
        );
    }

    /// Every directory and leaf path, for display
    pub fn all_paths(&self) -> &[String] {
        &self.all_paths
    }

    /// Leaf paths only, for resolution
    pub fn leaf_paths(&self) -> &[String] {
        &self.leaf_paths
    }

    /// Returns true if the snapshot matches the store's latest revision
    pub fn is_current<T>(&self, store: &PathKeyedStore<T>) -> bool {
        self.revision == Some(store.revision())
    }

    /// Returns true if `path` was a leaf at the last recompute
    pub fn contains_leaf(&self, path: &str) -> bool {
        self.leaf_paths.iter().any(|p| p == path)
    }
}

fn collect<T>(
    dir: &Directory<T>,
    prefix: &mut Vec<String>,
    all_paths: &mut Vec<String>,
    leaf_paths: &mut Vec<String>,
) {
    for (name, node) in dir {
        prefix.push(name.clone());
        let path = join_path(prefix.as_slice());
        all_paths.push(path.clone());
        match node {
            CacheNode::Directory(children) => collect(children, prefix, all_paths, leaf_paths),
            CacheNode::Leaf(_) => leaf_paths.push(path),
        }
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PathKeyedStore<u32> {
        let mut store = PathKeyedStore::new(8);
        store.set("Coronal/Density/MASTER", 1).unwrap();
        store.set("Coronal/Density/output_K1", 2).unwrap();
        store.set("NonGeneColumns", 3).unwrap();
        store
    }

    #[test]
    fn test_new_index_is_empty_and_stale() {
        let index = DirectoryIndex::new();
        assert!(index.all_paths().is_empty());
        assert!(!index.is_current(&PathKeyedStore::<u32>::new(1)));
    }

    #[test]
    fn test_all_paths_include_directories() {
        let index = DirectoryIndex::build(&store());
        assert_eq!(
            index.all_paths(),
            [
                "Coronal",
                "Coronal/Density",
                "Coronal/Density/MASTER",
                "Coronal/Density/output_K1",
                "NonGeneColumns",
            ]
        );
    }

    #[test]
    fn test_leaf_paths_match_store() {
        let store = store();
        let index = DirectoryIndex::build(&store);
        assert_eq!(index.leaf_paths(), store.leaf_paths().as_slice());
        assert!(index.contains_leaf("NonGeneColumns"));
        assert!(!index.contains_leaf("Coronal/Density"));
    }

    #[test]
    fn test_index_goes_stale_until_recomputed() {
        let mut store = store();
        let mut index = DirectoryIndex::build(&store);
        assert!(index.is_current(&store));

        store.set("Sagittal/MASTER", 4).unwrap();
        assert!(!index.is_current(&store));
        assert!(!index.contains_leaf("Sagittal/MASTER"));

        index.recompute(&store);
        assert!(index.is_current(&store));
        assert!(index.contains_leaf("Sagittal/MASTER"));
    }

    #[test]
    fn test_recompute_after_remove() {
        let mut store = store();
        let mut index = DirectoryIndex::build(&store);
        store.remove("Coronal/Density");
        index.recompute(&store);
        assert_eq!(index.all_paths(), ["Coronal", "NonGeneColumns"]);
        assert_eq!(index.leaf_paths(), ["NonGeneColumns"]);
    }
}
