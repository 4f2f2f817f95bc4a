//! Console runtime
//!
//! Loads settings and a catalog, fills the cache, prints the tree and then
//! asks for a dataset until one is picked or the session is cancelled.

use crate::dataset::LoadedDataset;
use cache_settings::{CacheSettings, CatalogError, DatasetCatalog, SettingsError};
use dataset_cache::{CatalogLoadReport, DatasetCache};
use dataset_picker::{
    MissReason, PromptSource, Resolution, ResolutionEvent, ResolutionWorkflow, ScriptError,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Console runtime errors
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Console configuration, usually built from command-line arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Settings file; defaults apply when absent
    pub settings_path: Option<PathBuf>,
    /// Catalog listing the datasets to load
    pub catalog_path: PathBuf,
    /// Script of answers replacing interactive input
    pub script: Option<String>,
}

/// Owns the cache for one console session
pub struct ConsoleRuntime {
    settings: CacheSettings,
    cache: DatasetCache<LoadedDataset>,
    report: CatalogLoadReport,
}

impl ConsoleRuntime {
    /// Loads settings and catalog, reading every listed dataset into memory
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let settings = Self::load_settings(config)?;
        Self::with_settings(config, settings)
    }

    /// Reads the configured settings file, or returns defaults when none is set
    pub fn load_settings(config: &ConsoleConfig) -> Result<CacheSettings, ConsoleError> {
        match &config.settings_path {
            Some(path) => Ok(CacheSettings::load(path)?),
            None => Ok(CacheSettings::default()),
        }
    }

    /// Loads the catalog using settings the caller already holds
    pub fn with_settings(
        config: &ConsoleConfig,
        settings: CacheSettings,
    ) -> Result<Self, ConsoleError> {
        let catalog = DatasetCatalog::load(&config.catalog_path)?;
        let base = config
            .catalog_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self::with_catalog(settings, &catalog, &base))
    }

    /// Builds a runtime from already loaded parts
    ///
    /// Relative dataset locations are resolved against `base`.
    pub fn with_catalog(settings: CacheSettings, catalog: &DatasetCatalog, base: &Path) -> Self {
        let mut cache = DatasetCache::new(&settings);
        let report = cache.load_catalog(catalog, |location| {
            LoadedDataset::read(base, location)
                .map_err(|e| warn!(location, error = %e, "Failed to read dataset"))
                .ok()
        });
        info!(
            datasets = cache.count(),
            skipped = report.skipped.len(),
            "Cache initialized"
        );

        Self {
            settings,
            cache,
            report,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn cache(&self) -> &DatasetCache<LoadedDataset> {
        &self.cache
    }

    pub fn report(&self) -> &CatalogLoadReport {
        &self.report
    }

    /// Prints the cache tree with a summary under each dataset
    pub fn print_tree<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.cache.render_tree_with(|d| Some(d.summary())))
    }

    /// Runs one resolution session, reporting misses to `out`
    pub fn resolve<P, W>(
        &self,
        source: &mut P,
        out: &mut W,
    ) -> Result<Resolution<LoadedDataset>, ConsoleError>
    where
        P: PromptSource + ?Sized,
        W: Write,
    {
        let mut write_error = None;
        let resolution = ResolutionWorkflow::from_settings(&self.cache, &self.settings).run(
            source,
            |event| {
                if write_error.is_none() {
                    write_error = report_event(&mut *out, event).err();
                }
            },
        );

        match write_error {
            Some(e) => Err(e.into()),
            None => Ok(resolution),
        }
    }

    /// Prints the tree, then resolves one dataset
    pub fn run<P, W>(
        &self,
        source: &mut P,
        out: &mut W,
    ) -> Result<Resolution<LoadedDataset>, ConsoleError>
    where
        P: PromptSource + ?Sized,
        W: Write,
    {
        writeln!(
            out,
            "Data pipeline initialized with {} data sets.",
            self.cache.count()
        )?;
        self.print_tree(out)?;

        let resolution = self.resolve(source, out)?;
        match &resolution {
            Resolution::Resolved { path, value } => {
                writeln!(out, "Selected {} {}", path, value.summary())?;
            }
            Resolution::Cancelled => writeln!(out, "Cancelled.")?,
            Resolution::InputExhausted => writeln!(out, "No more input.")?,
            Resolution::AttemptsExhausted { attempts } => {
                writeln!(out, "Giving up after {} attempts.", attempts)?;
            }
        }
        out.flush()?;
        Ok(resolution)
    }
}

/// Writes the user-facing message for a resolution event
pub fn report_event<W: Write>(out: &mut W, event: &ResolutionEvent) -> io::Result<()> {
    let ResolutionEvent::Miss {
        input,
        reason,
        suggestion,
    } = event
    else {
        return Ok(());
    };

    match reason {
        MissReason::NotFound => writeln!(out, "Data set {} not found.", input)?,
        MissReason::Directory => writeln!(out, "{} is a directory, not a data set.", input)?,
    }
    if let Some(suggestion) = suggestion {
        writeln!(out, "Did you mean {}?", suggestion.path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset_picker::ScriptedPrompt;
    use std::fs;

    fn write_fixture(dir: &Path) -> PathBuf {
        fs::create_dir_all(dir.join("coronal")).unwrap();
        fs::write(dir.join("coronal/master.csv"), "g1,1\ng2,2\n").unwrap();
        fs::write(dir.join("coronal/k1.csv"), "g1,3\n").unwrap();
        fs::write(dir.join("genes.csv"), "gene\n").unwrap();

        let catalog = dir.join("catalog.json");
        fs::write(
            &catalog,
            r#"{
                "NonGeneColumns": "genes.csv",
                "Coronal": {
                    "Density": {
                        "MASTER": "coronal/master.csv",
                        "output_K1": "coronal/k1.csv",
                        "output_K2": "coronal/missing.csv"
                    }
                }
            }"#,
        )
        .unwrap();
        catalog
    }

    fn runtime(dir: &Path) -> ConsoleRuntime {
        let config = ConsoleConfig {
            catalog_path: write_fixture(dir),
            ..ConsoleConfig::default()
        };
        ConsoleRuntime::new(&config).unwrap()
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());

        assert_eq!(runtime.cache().count(), 3);
        assert_eq!(runtime.report().skipped, vec!["Coronal/Density/output_K2"]);
    }

    #[test]
    fn test_print_tree_includes_summaries() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());

        let mut out = Vec::new();
        runtime.print_tree(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "NonGeneColumns\n    <1 rows, 5 bytes>\n\
             Coronal\n    Density\n        MASTER\n            <2 rows, 10 bytes>\n\
             \x20       output_K1\n            <1 rows, 5 bytes>\n"
        );
    }

    #[test]
    fn test_run_reports_misses_and_selection() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());
        let mut script = ScriptedPrompt::from_lines([
            "Coronal/Density/MASTR",
            "Coronal/Density",
            "Coronal/Density/MASTER",
        ]);

        let mut out = Vec::new();
        let resolution = runtime.run(&mut script, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(resolution.value().map(|d| d.row_count()), Some(2));
        assert!(text.starts_with("Data pipeline initialized with 3 data sets.\n"));
        assert!(text.contains(
            "Data set Coronal/Density/MASTR not found.\nDid you mean Coronal/Density/MASTER?\n"
        ));
        assert!(text.contains("Coronal/Density is a directory, not a data set.\n"));
        assert!(text.ends_with("Selected Coronal/Density/MASTER <2 rows, 10 bytes>\n"));
    }

    #[test]
    fn test_run_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = runtime(dir.path());
        let mut script = ScriptedPrompt::from_lines(["back"]);

        let mut out = Vec::new();
        let resolution = runtime.run(&mut script, &mut out).unwrap();
        assert!(resolution.is_cancelled());
        assert!(String::from_utf8(out).unwrap().ends_with("Cancelled.\n"));
    }

    #[test]
    fn test_settings_file_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("settings.json");
        fs::write(&settings_path, r#"{ "cancel_keyword": "quit", "max_attempts": 2 }"#).unwrap();

        let config = ConsoleConfig {
            settings_path: Some(settings_path),
            catalog_path: write_fixture(dir.path()),
            script: None,
        };
        let runtime = ConsoleRuntime::new(&config).unwrap();
        assert_eq!(runtime.settings().cancel_keyword, "quit");

        let mut script = ScriptedPrompt::from_lines(["back", "nope", "quit"]);
        let resolution = runtime.resolve(&mut script, &mut Vec::new()).unwrap();
        assert_eq!(resolution, Resolution::AttemptsExhausted { attempts: 2 });
    }

    #[test]
    fn test_with_settings_uses_given_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig {
            // Never read: the settings below are used as given
            settings_path: Some(dir.path().join("absent.json")),
            catalog_path: write_fixture(dir.path()),
            script: None,
        };
        let settings = CacheSettings {
            capacity: 1,
            ..CacheSettings::default()
        };

        let runtime = ConsoleRuntime::with_settings(&config, settings).unwrap();
        assert_eq!(runtime.settings().capacity, 1);
        assert_eq!(runtime.cache().leaf_paths(), ["Coronal/Density/MASTER", "Coronal/Density/output_K1"]);
        assert_eq!(runtime.cache().stats().evictions, 1);
    }

    #[test]
    fn test_load_settings_defaults_without_path() {
        let config = ConsoleConfig::default();
        assert_eq!(
            ConsoleRuntime::load_settings(&config).unwrap(),
            CacheSettings::default()
        );
    }

    #[test]
    fn test_missing_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig {
            catalog_path: dir.path().join("nope.json"),
            ..ConsoleConfig::default()
        };
        assert!(matches!(
            ConsoleRuntime::new(&config),
            Err(ConsoleError::Catalog(CatalogError::Io { .. }))
        ));
    }
}
