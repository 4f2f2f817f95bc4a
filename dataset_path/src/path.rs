//! Path parsing and validation
//!
//! This module handles splitting cache paths into segments and joining them back.

use std::fmt;
use thiserror::Error;

/// Segment separator used in every cache path
pub const SEPARATOR: char = '/';

/// Errors that can occur while parsing a path
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is empty (or only slashes)
    #[error("Invalid path: empty path")]
    Empty,

    /// Path contains an empty segment, e.g. `a//b`
    #[error("Invalid path: {0} contains an empty segment")]
    EmptySegment(String),

    /// Path contains `.` or `..`
    #[error("Invalid path: {path} contains relative segment {segment}")]
    RelativeSegment { path: String, segment: String },

    /// Segment contains a NUL byte
    #[error("Invalid path: {0} contains a NUL byte")]
    NulByte(String),
}

/// A validated, owned cache path
///
/// Holds at least one segment. Display joins segments with [`SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetPath {
    segments: Vec<String>,
}

impl DatasetPath {
    /// Parses and validates a path
    ///
    /// # Examples
    ///
    /// ```
    /// use dataset_path::DatasetPath;
    ///
    /// let path = DatasetPath::parse("Coronal/Density/MASTER").unwrap();
    /// assert_eq!(path.segments(), ["Coronal", "Density", "MASTER"]);
    /// ```
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let segments = Self::split(path)?
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Self { segments })
    }

    /// Splits a path into borrowed segments without allocating them
    ///
    /// ```
    /// use dataset_path::DatasetPath;
    ///
    /// let segments = DatasetPath::split("/Coronal/Density/").unwrap();
    /// assert_eq!(segments, vec!["Coronal", "Density"]);
    /// ```
    pub fn split(path: &str) -> Result<Vec<&str>, PathError> {
        let trimmed = path.trim_matches(SEPARATOR);

        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<&str> = trimmed.split(SEPARATOR).collect();

        for segment in &segments {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(path.to_string()));
            }
            if *segment == "." || *segment == ".." {
                return Err(PathError::RelativeSegment {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
            if segment.contains('\0') {
                return Err(PathError::NulByte(path.to_string()));
            }
        }

        Ok(segments)
    }

    /// Validates a single segment name
    ///
    /// Returns true if `name` can be used as one segment of a path.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(SEPARATOR)
            && !name.contains('\0')
    }

    /// Returns all segments, first to last
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if `path` is this path or lies beneath it
    ///
    /// Unparsable paths are covered by nothing.
    ///
    /// ```
    /// use dataset_path::DatasetPath;
    ///
    /// let data = DatasetPath::parse("data").unwrap();
    /// assert!(data.covers("data"));
    /// assert!(data.covers("/data/Coronal/MASTER"));
    /// assert!(!data.covers("database/MASTER"));
    /// ```
    pub fn covers(&self, path: &str) -> bool {
        let Ok(segments) = Self::split(path) else {
            return false;
        };
        segments.len() >= self.depth()
            && self
                .segments
                .iter()
                .zip(&segments)
                .all(|(own, other)| own == other)
    }
}

impl fmt::Display for DatasetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_path(&self.segments))
    }
}

impl std::str::FromStr for DatasetPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Joins segments into a single slash-delimited path string
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut joined = String::new();
    for (index, segment) in segments.iter().enumerate() {
        if index > 0 {
            joined.push(SEPARATOR);
        }
        joined.push_str(segment.as_ref());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_simple_path() {
        let result = DatasetPath::split("MASTER").unwrap();
        assert_eq!(result, vec!["MASTER"]);
    }

    #[test]
    fn test_split_nested_path() {
        let result = DatasetPath::split("Coronal/Density/MASTER").unwrap();
        assert_eq!(result, vec!["Coronal", "Density", "MASTER"]);
    }

    #[test]
    fn test_split_trims_slashes() {
        assert_eq!(DatasetPath::split("/Coronal").unwrap(), vec!["Coronal"]);
        assert_eq!(DatasetPath::split("Coronal/").unwrap(), vec!["Coronal"]);
    }

    #[test]
    fn test_names_with_spaces_and_brackets() {
        let result = DatasetPath::split("Coronal/Density/[70% Edge]").unwrap();
        assert_eq!(result[2], "[70% Edge]");
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(DatasetPath::split(""), Err(PathError::Empty));
        assert_eq!(DatasetPath::split("///"), Err(PathError::Empty));
    }

    #[test]
    fn test_double_slash() {
        let result = DatasetPath::split("Coronal//MASTER");
        assert!(matches!(result, Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn test_relative_segments() {
        assert!(matches!(
            DatasetPath::split("Coronal/./MASTER"),
            Err(PathError::RelativeSegment { .. })
        ));
        assert!(matches!(
            DatasetPath::split("Coronal/../MASTER"),
            Err(PathError::RelativeSegment { .. })
        ));
    }

    #[test]
    fn test_nul_byte() {
        assert!(matches!(
            DatasetPath::split("Coronal/MAS\0TER"),
            Err(PathError::NulByte(_))
        ));
    }

    #[test]
    fn test_is_valid_name() {
        assert!(DatasetPath::is_valid_name("MASTER"));
        assert!(DatasetPath::is_valid_name("output_K1"));
        assert!(DatasetPath::is_valid_name("[70% Edge]"));

        assert!(!DatasetPath::is_valid_name(""));
        assert!(!DatasetPath::is_valid_name("."));
        assert!(!DatasetPath::is_valid_name(".."));
        assert!(!DatasetPath::is_valid_name("has/slash"));
        assert!(!DatasetPath::is_valid_name("has\0null"));
    }

    #[test]
    fn test_depth() {
        let path = DatasetPath::parse("Coronal/Density/output_K1").unwrap();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.segments(), ["Coronal", "Density", "output_K1"]);
    }

    #[test]
    fn test_covers_subtree() {
        let density = DatasetPath::parse("Coronal/Density").unwrap();
        assert!(density.covers("Coronal/Density"));
        assert!(density.covers("Coronal/Density/MASTER"));
        assert!(density.covers("Coronal/Density/Genes/gene_1"));
        assert!(!density.covers("Coronal"));
        assert!(!density.covers("Coronal/DensityMaps/MASTER"));
        assert!(!density.covers("Sagittal/Density/MASTER"));
        assert!(!density.covers("Coronal//Density"));
    }

    #[test]
    fn test_display_normalizes_slashes() {
        let path: DatasetPath = "/Coronal/Density/".parse().unwrap();
        assert_eq!(path.to_string(), "Coronal/Density");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["a", "b", "c"]), "a/b/c");
        assert_eq!(join_path(&["solo"]), "solo");
        assert_eq!(join_path::<&str>(&[]), "");
    }
}
