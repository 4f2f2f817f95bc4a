//! Datasets loaded from disk

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Raw dataset contents read into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDataset {
    source: PathBuf,
    bytes: Vec<u8>,
}

impl LoadedDataset {
    pub fn new(source: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }

    /// Reads `location`, resolving relative locations against `base`
    pub fn read(base: &Path, location: &str) -> io::Result<Self> {
        let source = base.join(location);
        let bytes = fs::read(&source)?;
        Ok(Self { source, bytes })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Number of non-empty lines, i.e. records in a delimited file
    pub fn row_count(&self) -> usize {
        self.bytes
            .split(|b| *b == b'\n')
            .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
            .count()
    }

    /// One-line summary shown under the dataset in the tree
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LoadedDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} rows, {} bytes>", self.row_count(), self.size_bytes())
    }
}
