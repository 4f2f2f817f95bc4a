//! # Dataset Cache Integration Tests
//!
//! Cross-crate tests for the cache, the resolver and the resolution workflow.
//!
//! ## Test Philosophy
//!
//! - **Scenario**: the nested `Coronal/Density/...` layout used by the
//!   pipeline round-trips through store, index and renderer
//! - **Capacity**: eviction removes whole top-level subtrees, oldest first
//! - **Recovery**: typos produce suggestions, garbage produces none
//! - **Cancellation**: the cancel keyword wins before any lookup happens

#![cfg(test)]

use cache_settings::{CacheSettings, DatasetCatalog};
use dataset_cache::{DatasetCache, Lookup};
use dataset_path::{DatasetPath, PathError};
use dataset_picker::{
    resolve_interactively, MissReason, Resolution, ResolutionEvent, ResolutionWorkflow,
    ScriptedPrompt,
};
use name_resolver::FuzzyNameResolver;
use std::collections::BTreeSet;
use std::sync::Arc;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Table {
    rows: usize,
    columns: usize,
}

impl Table {
    fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }
}

fn density_cache() -> DatasetCache<Table> {
    let mut cache = DatasetCache::default();
    cache.set("Coronal/Density/MASTER", Table::new(4000, 12)).unwrap();
    cache.set("Coronal/Density/output_K1", Table::new(4000, 2)).unwrap();
    cache
}

// ============================================================================
// Store, index and renderer
// ============================================================================

#[test]
fn test_nested_scenario() {
    let cache = density_cache();

    let leaves: BTreeSet<&str> = cache.leaf_paths().iter().map(String::as_str).collect();
    assert_eq!(
        leaves,
        BTreeSet::from(["Coronal/Density/MASTER", "Coronal/Density/output_K1"])
    );
    assert_eq!(
        cache.render_tree(),
        "Coronal\n    Density\n        MASTER\n        output_K1\n"
    );
    assert_eq!(
        cache.all_paths(),
        [
            "Coronal",
            "Coronal/Density",
            "Coronal/Density/MASTER",
            "Coronal/Density/output_K1"
        ]
    );
}

#[test]
fn test_get_distinguishes_directories_from_leaves() {
    let cache = density_cache();

    match cache.get("Coronal/Density") {
        Lookup::Directory(children) => assert_eq!(children.len(), 2),
        other => panic!("expected directory, got {:?}", other.is_leaf()),
    }
    assert_eq!(
        cache.get("Coronal/Density/MASTER").leaf().map(|t| t.columns),
        Some(12)
    );
    assert!(cache.get("Coronal/Density/MASTER/extra").is_missing());
    assert!(cache.get("Sagittal").is_missing());
}

#[test]
fn test_invalid_paths_are_rejected_before_mutation() {
    let mut cache = density_cache();
    let revision = cache.store().revision();

    assert_eq!(cache.set("", Table::new(0, 0)), Err(PathError::Empty));
    assert!(matches!(
        cache.set("Coronal//MASTER", Table::new(0, 0)),
        Err(PathError::EmptySegment(_))
    ));
    assert!(matches!(
        cache.set("Coronal/../MASTER", Table::new(0, 0)),
        Err(PathError::RelativeSegment { .. })
    ));

    assert_eq!(cache.store().revision(), revision);
    assert_eq!(cache.count(), 2);
}

#[test]
fn test_names_with_slashes_become_nested_paths() {
    let mut cache = DatasetCache::default();
    let path = DatasetPath::parse("Coronal/Density/K1/K2").unwrap();
    assert_eq!(path.depth(), 4);
    assert!(!DatasetPath::is_valid_name("K1/K2"));

    cache.set("/Coronal/Density/K1/K2/", 1).unwrap();
    assert!(cache.get("Coronal/Density/K1").is_directory());
    assert_eq!(cache.leaf_paths(), ["Coronal/Density/K1/K2"]);
}

#[test]
fn test_values_are_shared_not_copied() {
    let mut cache = DatasetCache::default();
    let table = Arc::new(Table::new(10, 3));
    cache.set_shared("Clusters/K3", Arc::clone(&table)).unwrap();

    let stored = cache.get_leaf("Clusters/K3").unwrap();
    assert!(Arc::ptr_eq(stored, &table));
}

#[test]
fn test_leaf_count_matches_inserts() {
    let mut cache = DatasetCache::with_capacity(16);
    let paths = [
        "A/x",
        "A/y/z",
        "B",
        "C/d/e/f",
        "C/d/g",
        "D/h",
    ];
    for (i, path) in paths.iter().enumerate() {
        cache.set(path, i).unwrap();
    }

    assert_eq!(cache.count(), paths.len());
    assert_eq!(cache.leaf_values().len(), paths.len());
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn test_eviction_cascade_removes_whole_subtree() {
    let mut cache = DatasetCache::with_capacity(3);
    cache.set("Coronal/Density/MASTER", 1).unwrap();
    cache.set("Coronal/Density/output_K1", 2).unwrap();
    cache.set("Coronal/Genes/gene_1", 3).unwrap();
    cache.set("Sagittal/Density/MASTER", 4).unwrap();
    cache.set("NonGeneColumns", 5).unwrap();

    // Writes under an existing key never evict
    cache.set("Sagittal/Density/output_K1", 6).unwrap();
    assert_eq!(cache.count(), 6);

    cache.set("Transverse/Density/MASTER", 7).unwrap();

    assert_eq!(cache.stats().evictions, 1);
    assert_eq!(cache.count(), 4);
    assert!(!cache.has("Coronal"));
    assert!(cache
        .leaf_paths()
        .iter()
        .all(|path| !path.starts_with("Coronal/")));
    assert!(cache.has("Sagittal/Density/output_K1"));
    assert!(cache.has("Transverse/Density/MASTER"));
}

#[test]
fn test_eviction_follows_first_insertion() {
    let mut cache = DatasetCache::with_capacity(2);
    cache.set("first", 1).unwrap();
    cache.set("second", 2).unwrap();
    // Overwriting keeps the original position
    cache.set("first", 10).unwrap();
    cache.set("third", 3).unwrap();

    assert!(!cache.has("first"));
    assert_eq!(cache.get_leaf("second").map(|v| **v), Some(2));
    assert_eq!(cache.get_leaf("third").map(|v| **v), Some(3));
}

#[test]
fn test_catalog_fills_cache_in_document_order() {
    let catalog = DatasetCatalog::from_json_str(
        r#"{
            "NonGeneColumns": "non_gene.csv",
            "Coronal": {
                "Density": {
                    "MASTER": "coronal/MASTER.csv",
                    "output_K1": "coronal/output_K1.csv"
                }
            },
            "Sagittal": { "Density": { "MASTER": "sagittal/MASTER.csv" } }
        }"#,
    )
    .unwrap();

    let mut cache = DatasetCache::default();
    let report = cache.load_catalog(&catalog, |location| Some(location.len()));

    assert!(report.skipped.is_empty());
    assert_eq!(
        cache.leaf_paths(),
        [
            "NonGeneColumns",
            "Coronal/Density/MASTER",
            "Coronal/Density/output_K1",
            "Sagittal/Density/MASTER"
        ]
    );
}

// ============================================================================
// Fuzzy resolution
// ============================================================================

#[test]
fn test_typo_finds_candidate() {
    let resolver = FuzzyNameResolver::default();
    let suggestion = resolver
        .suggest("Coronl/Density/MASTER", ["Coronal/Density/MASTER"])
        .unwrap();
    assert_eq!(suggestion.path, "Coronal/Density/MASTER");
    assert!(suggestion.ratio > 0.9);
}

#[test]
fn test_garbage_finds_nothing() {
    let resolver = FuzzyNameResolver::default();
    assert!(resolver
        .suggest("zzzzz", ["Coronal/Density/MASTER"])
        .is_none());
}

#[test]
fn test_suggestions_come_from_leaf_paths_only() {
    let cache = density_cache();
    let resolver = FuzzyNameResolver::default();

    // "Coronal/Density" is stored but is a directory
    let suggestion = resolver
        .suggest("Coronal/Densty", cache.leaf_paths())
        .unwrap();
    assert!(cache.is_leaf(&suggestion.path));
}

// ============================================================================
// Resolution workflow
// ============================================================================

#[test]
fn test_cancel_first_skips_lookup() {
    let cache = density_cache();
    let mut prompts = 0;

    let value = resolve_interactively(
        &cache,
        |_| {
            prompts += 1;
            "back".to_string()
        },
        "back",
    );

    assert!(value.is_none());
    assert_eq!(prompts, 1);
}

#[test]
fn test_cancel_emits_no_miss() {
    let cache = density_cache();
    let mut script = ScriptedPrompt::from_lines(["back"]);
    let mut events = Vec::new();

    let resolution = ResolutionWorkflow::new(&cache).run(&mut script, |e| events.push(e.clone()));

    assert_eq!(resolution, Resolution::Cancelled);
    assert_eq!(events, vec![ResolutionEvent::Cancelled]);
}

#[test]
fn test_cache_entry_named_like_keyword_is_unreachable() {
    let mut cache = density_cache();
    cache.set("back", Table::new(1, 1)).unwrap();

    let value = resolve_interactively(&cache, |_| "back".to_string(), "back");
    assert!(value.is_none());
}

#[test]
fn test_typo_then_directory_then_leaf() {
    let cache = density_cache();
    let mut script = ScriptedPrompt::from_lines([
        "Coronl/Density/MASTER",
        "Coronal/Density",
        "Coronal/Density/MASTER",
    ]);
    let mut misses = Vec::new();

    let resolution = ResolutionWorkflow::new(&cache).run(&mut script, |event| {
        if let ResolutionEvent::Miss {
            reason, suggestion, ..
        } = event
        {
            misses.push((*reason, suggestion.as_ref().map(|s| s.path.clone())));
        }
    });

    assert_eq!(
        resolution.value().map(|t| t.rows),
        Some(4000),
    );
    assert_eq!(misses[0], (MissReason::NotFound, Some("Coronal/Density/MASTER".to_string())));
    assert_eq!(misses[1].0, MissReason::Directory);
    assert_eq!(misses.len(), 2);
}

#[test]
fn test_finite_input_terminates() {
    let cache = density_cache();
    let mut script = ScriptedPrompt::from_lines(["zzzzz", "qqqq"]);
    let resolution = ResolutionWorkflow::new(&cache).run(&mut script, |_| {});
    assert_eq!(resolution, Resolution::InputExhausted);
}

#[test]
fn test_settings_tune_workflow() {
    let cache = density_cache();
    let settings = CacheSettings::from_json_str(
        r#"{ "cancel_keyword": "quit", "similarity_threshold": 0.99, "max_attempts": 3 }"#,
    )
    .unwrap();
    let mut script = ScriptedPrompt::from_lines(["Coronl/Density/MASTER", "back", "x", "quit"]);
    let mut suggestions = 0;

    let resolution = ResolutionWorkflow::from_settings(&cache, &settings).run(&mut script, |e| {
        if let ResolutionEvent::Miss {
            suggestion: Some(_),
            ..
        } = e
        {
            suggestions += 1;
        }
    });

    assert_eq!(resolution, Resolution::AttemptsExhausted { attempts: 3 });
    assert_eq!(suggestions, 0);
}
