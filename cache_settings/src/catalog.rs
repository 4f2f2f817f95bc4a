//! Dataset catalog
//!
//! A catalog is a nested JSON object describing which datasets to load and
//! where they live. Objects become directories, strings become leaves:
//!
//! ```json
//! {
//!     "NonGeneColumns": "data/parent/NonGeneColumns.csv",
//!     "Coronal": {
//!         "Density": {
//!             "MASTER": "data/parent/NewDenCor.csv",
//!             "output_K1": "data/parent/output_K1.csv"
//!         }
//!     }
//! }
//! ```

use dataset_path::{join_path, DatasetPath};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog root must be an object")]
    NotAnObject,

    #[error("Invalid catalog name {name:?} under {parent:?}")]
    InvalidName { parent: String, name: String },

    #[error("Catalog entry {path} must be a string or an object")]
    InvalidEntry { path: String },
}

/// One dataset listed in a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Cache path the dataset is stored under
    pub path: String,
    /// Where the dataset is loaded from
    pub location: String,
}

/// Flattened catalog, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetCatalog {
    entries: Vec<CatalogEntry>,
}

impl DatasetCatalog {
    /// Parses a catalog from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Reads and parses a catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Flattens a parsed JSON value
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let Value::Object(root) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut entries = Vec::new();
        flatten(root, &mut Vec::new(), &mut entries)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(
    object: &Map<String, Value>,
    prefix: &mut Vec<String>,
    entries: &mut Vec<CatalogEntry>,
) -> Result<(), CatalogError> {
    for (name, value) in object {
        if !DatasetPath::is_valid_name(name) {
            return Err(CatalogError::InvalidName {
                parent: join_path(prefix.as_slice()),
                name: name.clone(),
            });
        }

        prefix.push(name.clone());
        match value {
            Value::Object(children) => flatten(children, prefix, entries)?,
            Value::String(location) => entries.push(CatalogEntry {
                path: join_path(prefix.as_slice()),
                location: location.clone(),
            }),
            _ => {
                return Err(CatalogError::InvalidEntry {
                    path: join_path(prefix.as_slice()),
                })
            }
        }
        prefix.pop();
    }
    Ok(())
}
