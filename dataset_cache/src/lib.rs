//! # Dataset Cache
//!
//! A hierarchical, path-addressed cache for in-memory datasets.
//!
//! ## Design
//!
//! - Datasets are stored under slash-delimited paths (`Coronal/Density/MASTER`)
//! - Intermediate segments are directories; the final segment holds the value
//! - Values are shared (`Arc`), never copied, and never mutated by the cache
//! - The number of top-level keys is bounded; overflow evicts the oldest
//!   top-level subtree in full
//! - A flattened [`DirectoryIndex`] lists every path for display and lookup;
//!   it is a snapshot that must be recomputed after mutation
//!   ([`DatasetCache`] does this for you)
//!
//! ## Example
//!
//! ```
//! use dataset_cache::DatasetCache;
//!
//! let mut cache = DatasetCache::with_capacity(16);
//! cache.set("Coronal/Density/MASTER", vec![1.0, 2.0]).unwrap();
//!
//! assert!(cache.get("Coronal/Density").is_directory());
//! assert_eq!(cache.get_leaf("Coronal/Density/MASTER").map(|v| v.len()), Some(2));
//! assert_eq!(cache.leaf_paths(), ["Coronal/Density/MASTER"]);
//! ```

pub mod cache;
pub mod eviction;
pub mod index;
pub mod node;
pub mod render;
pub mod store;

pub use cache::{CatalogLoadReport, DatasetCache};
pub use eviction::{BoundedEvictionPolicy, Eviction, DEFAULT_CAPACITY};
pub use index::DirectoryIndex;
pub use node::{CacheNode, Directory, Lookup};
pub use render::{TreeRenderer, DEFAULT_MAX_CHILDREN, INDENT_WIDTH};
pub use store::{PathKeyedStore, StoreStats};
