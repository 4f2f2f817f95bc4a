//! # Dataset Console
//!
//! Command-line front end for the dataset cache.
//!
//! The console owns all I/O: it reads the catalog and the datasets it lists,
//! prints the cache tree, and drives the resolution workflow from stdin or a
//! script file. The cache and resolver crates never print.

pub mod dataset;
pub mod runtime;

pub use dataset::LoadedDataset;
pub use runtime::{report_event, ConsoleConfig, ConsoleError, ConsoleRuntime};
