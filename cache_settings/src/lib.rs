//! # Cache Settings
//!
//! Typed configuration for the dataset cache and the dataset catalog format.
//!
//! ## Philosophy
//!
//! - **Typed settings**: every knob has an explicit type and a default
//! - **Deterministic**: settings are plain JSON and round-trip exactly
//! - **Validated**: nonsensical values are rejected at load time, not at use
//!
//! ## Example
//!
//! ```
//! use cache_settings::CacheSettings;
//!
//! let settings = CacheSettings::from_json_str(r#"{ "capacity": 32 }"#).unwrap();
//! assert_eq!(settings.capacity, 32);
//! assert_eq!(settings.cancel_keyword, "back");
//! ```

pub mod catalog;

pub use catalog::{CatalogEntry, CatalogError, DatasetCatalog};

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported settings version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Configuration for the cache, its rendering and name resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Format version of the settings file
    pub version: u32,
    /// Maximum number of top-level keys before eviction
    pub capacity: usize,
    /// Directories with more children than this are summarized when rendered
    pub max_directory_display: usize,
    /// Suggestions at or below this similarity ratio are withheld
    pub similarity_threshold: f64,
    /// Input that cancels interactive resolution
    pub cancel_keyword: String,
    /// Optional cap on resolution attempts; `None` retries until cancelled
    pub max_attempts: Option<usize>,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl CacheSettings {
    /// Current settings format version
    pub const CURRENT_VERSION: u32 = 1;

    pub const DEFAULT_CAPACITY: usize = 256;
    pub const DEFAULT_MAX_DIRECTORY_DISPLAY: usize = 10;
    pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;
    pub const DEFAULT_CANCEL_KEYWORD: &'static str = "back";

    /// Parses and validates settings from JSON; missing fields take defaults
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from `path`, or returns defaults if the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                let settings = Self::from_json_str(&text)?;
                info!(path = %path.display(), "Loaded settings");
                Ok(settings)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No settings file found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Writes settings to `path` as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks every field for sensible values
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(SettingsError::UnsupportedVersion(self.version));
        }
        if self.capacity == 0 {
            return Err(SettingsError::Invalid {
                key: "capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(SettingsError::Invalid {
                key: "similarity_threshold",
                reason: format!("{} is outside [0, 1]", self.similarity_threshold),
            });
        }
        if self.cancel_keyword.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "cancel_keyword",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_attempts == Some(0) {
            return Err(SettingsError::Invalid {
                key: "max_attempts",
                reason: "must be at least 1 when set".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            capacity: Self::DEFAULT_CAPACITY,
            max_directory_display: Self::DEFAULT_MAX_DIRECTORY_DISPLAY,
            similarity_threshold: Self::DEFAULT_SIMILARITY_THRESHOLD,
            cancel_keyword: Self::DEFAULT_CANCEL_KEYWORD.to_string(),
            max_attempts: None,
            log_level: "info".to_string(),
        }
    }
}
