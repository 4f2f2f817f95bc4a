//! # Name Resolver
//!
//! Proposes the closest known dataset path for a name that does not exist.
//!
//! ## Design
//!
//! - Similarity is a normalized Levenshtein ratio in `[0, 1]`
//! - The best candidate wins; ties go to the earliest candidate
//! - Nothing is suggested when the best ratio is at or below the threshold
//! - Pure: no state, no side effects
//!
//! ## Example
//!
//! ```
//! use name_resolver::FuzzyNameResolver;
//!
//! let resolver = FuzzyNameResolver::default();
//! let candidates = ["Coronal/Density/MASTER", "Coronal/Density/output_K1"];
//!
//! let suggestion = resolver.suggest("Coronl/Density/MASTER", candidates).unwrap();
//! assert_eq!(suggestion.path, "Coronal/Density/MASTER");
//!
//! assert!(resolver.suggest("zzzzz", candidates).is_none());
//! ```

pub mod similarity;

pub use similarity::{levenshtein, similarity_ratio};

use tracing::debug;

/// Default ratio at or below which no suggestion is made
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// A proposed path and how close it was to the input
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub path: String,
    pub ratio: f64,
}

/// Picks the most similar candidate above a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyNameResolver {
    threshold: f64,
}

impl FuzzyNameResolver {
    /// Creates a resolver; `threshold` is clamped to `[0, 1]`
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the single most plausible candidate for `input`
    ///
    /// Costs O(input_len * candidate_len) per candidate.
    pub fn suggest<I, S>(&self, input: &str, candidates: I) -> Option<Suggestion>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut best: Option<Suggestion> = None;

        for candidate in candidates {
            let candidate = candidate.as_ref();
            let ratio = similarity_ratio(input, candidate);
            // Strictly greater keeps the first of equal candidates
            if best.as_ref().map_or(true, |b| ratio > b.ratio) {
                best = Some(Suggestion {
                    path: candidate.to_string(),
                    ratio,
                });
            }
        }

        let best = best.filter(|b| b.ratio > self.threshold);
        debug!(
            input,
            suggestion = best.as_ref().map(|b| b.path.as_str()),
            "Resolved suggestion"
        );
        best
    }
}

impl Default for FuzzyNameResolver {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: [&str; 3] = [
        "Coronal/Density/MASTER",
        "Coronal/Density/output_K1",
        "NonGeneColumns",
    ];

    #[test]
    fn test_dropped_character_is_recovered() {
        let resolver = FuzzyNameResolver::default();
        let suggestion = resolver.suggest("Coronl/Density/MASTER", CANDIDATES).unwrap();
        assert_eq!(suggestion.path, "Coronal/Density/MASTER");
        assert!(suggestion.ratio > 0.9);
    }

    #[test]
    fn test_unrelated_input_has_no_match() {
        let resolver = FuzzyNameResolver::default();
        assert!(resolver.suggest("zzzzz", CANDIDATES).is_none());
    }

    #[test]
    fn test_no_candidates() {
        let resolver = FuzzyNameResolver::default();
        assert!(resolver.suggest("MASTER", Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_ratio_at_threshold_is_rejected() {
        // "ab" vs "ax": one substitution over two characters, ratio exactly 0.5
        let resolver = FuzzyNameResolver::new(0.5);
        assert!(resolver.suggest("ab", ["ax"]).is_none());

        let lenient = FuzzyNameResolver::new(0.4);
        assert_eq!(lenient.suggest("ab", ["ax"]).map(|s| s.path), Some("ax".to_string()));
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let resolver = FuzzyNameResolver::default();
        let suggestion = resolver.suggest("abcd", ["abcx", "abcy"]).unwrap();
        assert_eq!(suggestion.path, "abcx");
    }

    #[test]
    fn test_exact_match_scores_one() {
        let resolver = FuzzyNameResolver::default();
        let suggestion = resolver.suggest("NonGeneColumns", CANDIDATES).unwrap();
        assert_eq!(suggestion.path, "NonGeneColumns");
        assert_eq!(suggestion.ratio, 1.0);
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(FuzzyNameResolver::new(3.0).threshold(), 1.0);
        assert_eq!(FuzzyNameResolver::new(-1.0).threshold(), 0.0);
    }
}
