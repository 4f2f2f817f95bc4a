//! Tree node types
//!
//! A directory maps segment names to child nodes in insertion order.
//! A leaf holds a shared handle to the stored value.

use indexmap::IndexMap;
use std::sync::Arc;

/// Children of a directory, keyed by segment name, in insertion order
pub type Directory<T> = IndexMap<String, CacheNode<T>>;

/// A node in the cache tree
#[derive(Debug)]
pub enum CacheNode<T> {
    /// Nested mapping of further segments
    Directory(Directory<T>),
    /// Stored value
    Leaf(Arc<T>),
}

impl<T> CacheNode<T> {
    /// Creates an empty directory node
    pub fn empty_directory() -> Self {
        CacheNode::Directory(Directory::new())
    }

    /// Returns true if this node holds a value
    pub fn is_leaf(&self) -> bool {
        matches!(self, CacheNode::Leaf(_))
    }

    /// Returns true if this node is a directory
    pub fn is_directory(&self) -> bool {
        matches!(self, CacheNode::Directory(_))
    }

    /// Number of leaves at or below this node
    pub fn leaf_count(&self) -> usize {
        match self {
            CacheNode::Leaf(_) => 1,
            CacheNode::Directory(children) => children.values().map(CacheNode::leaf_count).sum(),
        }
    }

    /// Borrows this node as a lookup result
    pub fn as_lookup(&self) -> Lookup<'_, T> {
        match self {
            CacheNode::Directory(children) => Lookup::Directory(children),
            CacheNode::Leaf(value) => Lookup::Leaf(value),
        }
    }

    /// Turns this node into a directory, dropping a leaf value if present
    pub(crate) fn ensure_directory(&mut self) -> &mut Directory<T> {
        if self.is_leaf() {
            *self = CacheNode::empty_directory();
        }
        match self {
            CacheNode::Directory(children) => children,
            CacheNode::Leaf(_) => unreachable!("leaf replaced with a directory above"),
        }
    }
}

// Clone is only needed for the handles, not for `T` itself.
impl<T> Clone for CacheNode<T> {
    fn clone(&self) -> Self {
        match self {
            CacheNode::Directory(children) => CacheNode::Directory(children.clone()),
            CacheNode::Leaf(value) => CacheNode::Leaf(Arc::clone(value)),
        }
    }
}

/// Result of looking a path up in the store
///
/// A path can name a stored value, a partial directory, or nothing at all.
/// Callers match on the variant instead of guessing at the node's shape.
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// Path names a directory
    Directory(&'a Directory<T>),
    /// Path names a stored value
    Leaf(&'a Arc<T>),
    /// Path does not resolve
    Missing,
}

impl<'a, T> Lookup<'a, T> {
    /// Returns the stored value if the path named a leaf
    pub fn leaf(&self) -> Option<&'a Arc<T>> {
        match self {
            Lookup::Leaf(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the children if the path named a directory
    pub fn directory(&self) -> Option<&'a Directory<T>> {
        match self {
            Lookup::Directory(children) => Some(*children),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Lookup::Leaf(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Lookup::Directory(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }
}

// Manual impls: derive would require `T: Copy`.
impl<T> Clone for Lookup<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Lookup<'_, T> {}
