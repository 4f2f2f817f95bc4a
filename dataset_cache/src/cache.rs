//! Dataset cache facade
//!
//! Bundles the store with its directory index and renderer. Every mutation
//! made through [`DatasetCache`] recomputes the index, so readers of
//! [`leaf_paths`](DatasetCache::leaf_paths) never see a stale snapshot.

use crate::index::DirectoryIndex;
use crate::node::{CacheNode, Lookup};
use crate::render::TreeRenderer;
use crate::store::{PathKeyedStore, StoreStats};
use cache_settings::{CacheSettings, DatasetCatalog};
use dataset_path::PathError;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of loading a catalog into the cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLoadReport {
    /// Paths that were stored
    pub loaded: Vec<String>,
    /// Paths whose loader returned nothing
    pub skipped: Vec<String>,
}

/// Hierarchical dataset cache owned by a single pipeline
#[derive(Debug)]
pub struct DatasetCache<T> {
    store: PathKeyedStore<T>,
    index: DirectoryIndex,
    renderer: TreeRenderer,
}

impl<T> DatasetCache<T> {
    /// Creates an empty cache configured from `settings`
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_parts(
            PathKeyedStore::new(settings.capacity),
            TreeRenderer::new(settings.max_directory_display),
        )
    }

    /// Creates an empty cache with default rendering and the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_parts(PathKeyedStore::new(capacity), TreeRenderer::default())
    }

    fn with_parts(store: PathKeyedStore<T>, renderer: TreeRenderer) -> Self {
        let index = DirectoryIndex::build(&store);
        Self {
            store,
            index,
            renderer,
        }
    }

    /// Stores `value` at `path` (see [`PathKeyedStore::set`])
    pub fn set(&mut self, path: &str, value: T) -> Result<(), PathError> {
        self.store.set(path, value)?;
        self.refresh_index();
        Ok(())
    }

    /// Stores an already shared value at `path`
    pub fn set_shared(&mut self, path: &str, value: Arc<T>) -> Result<(), PathError> {
        self.store.set_shared(path, value)?;
        self.refresh_index();
        Ok(())
    }

    pub fn get(&self, path: &str) -> Lookup<'_, T> {
        self.store.get(path)
    }

    /// Returns the value at `path` if `path` names a leaf
    pub fn get_leaf(&self, path: &str) -> Option<&Arc<T>> {
        self.store.get_leaf(path)
    }

    pub fn has(&self, path: &str) -> bool {
        self.store.has(path)
    }

    pub fn is_leaf(&self, path: &str) -> bool {
        self.store.is_leaf(path)
    }

    pub fn is_directory(&self, path: &str) -> bool {
        self.store.is_directory(path)
    }

    /// Removes the node at `path`; a no-op if nothing is there
    pub fn remove(&mut self, path: &str) -> Option<CacheNode<T>> {
        let removed = self.store.remove(path);
        if removed.is_some() {
            self.refresh_index();
        }
        removed
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.store.clear();
        self.refresh_index();
    }

    /// Keeps only the listed leaves and directory subtrees
    pub fn clear_except<S: AsRef<str>>(&mut self, paths: &[S]) -> usize {
        let removed = self.store.clear_except(paths);
        self.refresh_index();
        removed
    }

    /// Leaf paths as of the last mutation
    pub fn leaf_paths(&self) -> &[String] {
        self.index.leaf_paths()
    }

    /// Directory and leaf paths as of the last mutation
    pub fn all_paths(&self) -> &[String] {
        self.index.all_paths()
    }

    pub fn leaf_values(&self) -> Vec<&Arc<T>> {
        self.store.leaf_values()
    }

    /// Number of stored datasets
    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Maximum number of top-level keys
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Renders the tree as indented text
    pub fn render_tree(&self) -> String {
        self.renderer.render(self.store.root())
    }

    /// Renders the tree with a summary line under each dataset
    pub fn render_tree_with<F>(&self, describe: F) -> String
    where
        F: Fn(&T) -> Option<String>,
    {
        self.renderer.render_with(self.store.root(), describe)
    }

    pub fn store(&self) -> &PathKeyedStore<T> {
        &self.store
    }

    pub fn index(&self) -> &DirectoryIndex {
        &self.index
    }

    /// Loads every catalog entry through `loader`
    ///
    /// Entries the loader cannot produce are skipped with a warning. The index
    /// is recomputed once at the end rather than after every insert.
    pub fn load_catalog<F>(&mut self, catalog: &DatasetCatalog, mut loader: F) -> CatalogLoadReport
    where
        F: FnMut(&str) -> Option<T>,
    {
        let mut report = CatalogLoadReport::default();

        for entry in catalog.entries() {
            let Some(value) = loader(&entry.location) else {
                warn!(path = %entry.path, location = %entry.location, "Skipping dataset that failed to load");
                report.skipped.push(entry.path.clone());
                continue;
            };

            match self.store.set(&entry.path, value) {
                Ok(()) => report.loaded.push(entry.path.clone()),
                Err(e) => {
                    warn!(path = %entry.path, error = %e, "Skipping dataset with invalid path");
                    report.skipped.push(entry.path.clone());
                }
            }
        }

        self.refresh_index();
        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            total = self.count(),
            "Loaded dataset catalog"
        );
        report
    }

    fn refresh_index(&mut self) {
        if !self.index.is_current(&self.store) {
            self.index.recompute(&self.store);
        }
    }
}

impl<T> Default for DatasetCache<T> {
    fn default() -> Self {
        Self::new(&CacheSettings::default())
    }
}
