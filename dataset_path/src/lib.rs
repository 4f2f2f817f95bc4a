//! # Dataset Paths
//!
//! Slash-delimited names for entries in the dataset cache.
//!
//! ## Rules
//!
//! - A path is one or more non-empty segments joined by `/`
//! - Leading and trailing slashes are ignored (`/Coronal/` == `Coronal`)
//! - `.` and `..` are not segments; there is no relative addressing
//! - There is no escaping: a `/` always separates segments, so a logical
//!   name can never contain one

pub mod path;

pub use path::{join_path, DatasetPath, PathError, SEPARATOR};
