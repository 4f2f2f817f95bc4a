//! Tree rendering
//!
//! Renders the store as indented text, one line per key:
//!
//! ```text
//! Coronal
//!     Density
//!         MASTER
//!         output_K1
//! ```
//!
//! Directories with more children than the display cap are summarized as
//! `<N entries>` instead of being expanded.

use crate::node::{CacheNode, Directory};
use std::fmt::Write;

/// Default number of children a directory may have and still be expanded
pub const DEFAULT_MAX_CHILDREN: usize = 10;

/// Spaces per depth level
pub const INDENT_WIDTH: usize = 4;

/// Indentation-based tree renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeRenderer {
    max_children: usize,
}

impl TreeRenderer {
    pub fn new(max_children: usize) -> Self {
        Self { max_children }
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Renders keys only
    pub fn render<T>(&self, root: &Directory<T>) -> String {
        self.render_with(root, |_| None)
    }

    /// Renders keys plus an optional summary line under each leaf
    ///
    /// `describe` returns the summary for a value, e.g. `<4000 x 12> table`.
    pub fn render_with<T, F>(&self, root: &Directory<T>, describe: F) -> String
    where
        F: Fn(&T) -> Option<String>,
    {
        let mut out = String::new();
        self.render_level(&mut out, root, 0, &describe);
        out
    }

    fn render_level<T, F>(&self, out: &mut String, dir: &Directory<T>, level: usize, describe: &F)
    where
        F: Fn(&T) -> Option<String>,
    {
        for (name, node) in dir {
            push_line(out, level, name);

            match node {
                CacheNode::Directory(children) if children.len() > self.max_children => {
                    push_line(out, level + 1, &format!("<{} entries>", children.len()));
                }
                CacheNode::Directory(children) => {
                    self.render_level(out, children, level + 1, describe);
                }
                CacheNode::Leaf(value) => {
                    if let Some(summary) = describe(&**value) {
                        push_line(out, level + 1, &summary);
                    }
                }
            }
        }
    }
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHILDREN)
    }
}

fn push_line(out: &mut String, level: usize, text: &str) {
    // Writing to a String cannot fail
    let _ = writeln!(out, "{:indent$}{}", "", text, indent = level * INDENT_WIDTH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PathKeyedStore;

    #[test]
    fn test_render_nested() {
        let mut store = PathKeyedStore::new(4);
        store.set("Coronal/Density/MASTER", 1).unwrap();
        store.set("Coronal/Density/output_K1", 2).unwrap();

        let text = TreeRenderer::default().render(store.root());
        assert_eq!(
            text,
            "Coronal\n    Density\n        MASTER\n        output_K1\n"
        );
    }

    #[test]
    fn test_render_empty() {
        let store = PathKeyedStore::<u8>::new(4);
        assert_eq!(TreeRenderer::default().render(store.root()), "");
    }

    #[test]
    fn test_render_summarizes_large_directories() {
        let mut store = PathKeyedStore::new(4);
        for i in 0..5 {
            store.set(&format!("Coronal/Density/Genes/gene_{}", i), i).unwrap();
        }
        store.set("Coronal/Density/MASTER", 99).unwrap();

        let text = TreeRenderer::new(3).render(store.root());
        assert_eq!(
            text,
            "Coronal\n    Density\n        Genes\n            <5 entries>\n        MASTER\n"
        );
    }

    #[test]
    fn test_cap_is_inclusive() {
        let mut store = PathKeyedStore::new(4);
        store.set("a/x", 1).unwrap();
        store.set("a/y", 2).unwrap();
        let text = TreeRenderer::new(2).render(store.root());
        assert_eq!(text, "a\n    x\n    y\n");
    }

    #[test]
    fn test_render_with_leaf_summary() {
        let mut store = PathKeyedStore::new(4);
        store.set("Coronal/MASTER", (4000usize, 12usize)).unwrap();
        store.set("Coronal/empty", (0, 0)).unwrap();

        let text = TreeRenderer::default().render_with(store.root(), |(rows, cols)| {
            (*rows > 0).then(|| format!("<{} x {}> table", rows, cols))
        });
        assert_eq!(
            text,
            "Coronal\n    MASTER\n        <4000 x 12> table\n    empty\n"
        );
    }
}
