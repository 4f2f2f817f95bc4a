//! Interactive dataset resolution
//!
//! ```text
//!                 cancel keyword
//!   AwaitingInput ───────────────> Cancelled
//!     │   ^
//!     │   │ missing / directory: suggest, re-prompt
//!     │   └───┐
//!     └───────┴──── leaf ─────────> Resolved
//! ```
//!
//! There is no retry limit unless one is configured: the loop ends when the
//! caller names a dataset, cancels, or runs out of input.

use cache_settings::CacheSettings;
use dataset_cache::{DatasetCache, Lookup};
use name_resolver::{FuzzyNameResolver, Suggestion};
use std::sync::Arc;
use tracing::debug;

use crate::prompt::{FnPrompt, PromptSource};

/// Default prompt text
pub const DEFAULT_PROMPT: &str = "Enter the name of the data set: ";

/// Where the workflow is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Waiting for the next name
    AwaitingInput,
    /// A dataset was selected
    Resolved,
    /// The caller entered the cancel keyword
    Cancelled,
}

/// Why an input was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// Nothing is stored under the name
    NotFound,
    /// The name is a directory, not a dataset
    Directory,
}

/// Result of feeding one input to the workflow
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult<T> {
    /// The input named a dataset
    Resolved { path: String, value: Arc<T> },
    /// The input was the cancel keyword
    Cancelled,
    /// The input was rejected; keep prompting
    Retry {
        input: String,
        reason: MissReason,
        suggestion: Option<Suggestion>,
    },
}

/// Something observable that happened during resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionEvent {
    /// An input was rejected
    Miss {
        input: String,
        reason: MissReason,
        suggestion: Option<Suggestion>,
    },
    /// A dataset was selected
    Resolved { path: String },
    /// Resolution was cancelled
    Cancelled,
}

/// Final outcome of [`ResolutionWorkflow::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The caller picked a dataset
    Resolved { path: String, value: Arc<T> },
    /// The caller entered the cancel keyword
    Cancelled,
    /// The prompt source ran dry before a decision
    InputExhausted,
    /// The configured attempt cap was reached
    AttemptsExhausted { attempts: usize },
}

impl<T> Resolution<T> {
    /// Returns the selected value, if any
    pub fn value(&self) -> Option<&Arc<T>> {
        match self {
            Resolution::Resolved { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Resolution::Cancelled)
    }
}

/// Resolves free-text names into cached datasets, tolerating typos
#[derive(Debug)]
pub struct ResolutionWorkflow<'c, T> {
    cache: &'c DatasetCache<T>,
    resolver: FuzzyNameResolver,
    cancel_keyword: String,
    max_attempts: Option<usize>,
    prompt: String,
    state: ResolutionState,
    attempts: usize,
}

impl<'c, T> ResolutionWorkflow<'c, T> {
    /// Creates a workflow with default threshold, `back` as cancel keyword
    /// and no attempt cap
    pub fn new(cache: &'c DatasetCache<T>) -> Self {
        Self {
            cache,
            resolver: FuzzyNameResolver::default(),
            cancel_keyword: CacheSettings::DEFAULT_CANCEL_KEYWORD.to_string(),
            max_attempts: None,
            prompt: DEFAULT_PROMPT.to_string(),
            state: ResolutionState::AwaitingInput,
            attempts: 0,
        }
    }

    /// Creates a workflow configured from `settings`
    pub fn from_settings(cache: &'c DatasetCache<T>, settings: &CacheSettings) -> Self {
        let mut workflow = Self::new(cache)
            .with_resolver(FuzzyNameResolver::new(settings.similarity_threshold))
            .with_cancel_keyword(settings.cancel_keyword.clone());
        workflow.max_attempts = settings.max_attempts;
        workflow
    }

    pub fn with_resolver(mut self, resolver: FuzzyNameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets the cancel keyword; surrounding whitespace is ignored, as it is for input
    pub fn with_cancel_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.cancel_keyword = keyword.trim().to_string();
        self
    }

    /// Caps the number of inputs accepted before giving up
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Number of inputs processed so far
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Processes one input
    ///
    /// Input is trimmed before matching. The fuzzy resolver is only consulted
    /// when the input is neither the cancel keyword nor a dataset.
    pub fn step(&mut self, input: &str) -> StepResult<T> {
        let input = input.trim();
        self.attempts += 1;

        if input == self.cancel_keyword {
            self.state = ResolutionState::Cancelled;
            debug!(attempts = self.attempts, "Resolution cancelled");
            return StepResult::Cancelled;
        }

        let reason = match self.cache.get(input) {
            Lookup::Leaf(value) => {
                self.state = ResolutionState::Resolved;
                debug!(path = input, attempts = self.attempts, "Resolved dataset");
                return StepResult::Resolved {
                    path: input.to_string(),
                    value: Arc::clone(value),
                };
            }
            Lookup::Directory(_) => MissReason::Directory,
            Lookup::Missing => MissReason::NotFound,
        };

        let suggestion = self.resolver.suggest(input, self.cache.leaf_paths());
        self.state = ResolutionState::AwaitingInput;
        debug!(input, ?reason, "Rejected dataset name");

        StepResult::Retry {
            input: input.to_string(),
            reason,
            suggestion,
        }
    }

    /// Prompts until the caller resolves a dataset, cancels, or input runs out
    ///
    /// `observe` sees every rejection and the final decision.
    pub fn run<P, O>(&mut self, source: &mut P, mut observe: O) -> Resolution<T>
    where
        P: PromptSource + ?Sized,
        O: FnMut(&ResolutionEvent),
    {
        loop {
            if let Some(max) = self.max_attempts {
                if self.attempts >= max {
                    return Resolution::AttemptsExhausted {
                        attempts: self.attempts,
                    };
                }
            }

            let Some(input) = source.next_input(&self.prompt) else {
                debug!(attempts = self.attempts, "Input exhausted");
                return Resolution::InputExhausted;
            };

            match self.step(&input) {
                StepResult::Resolved { path, value } => {
                    observe(&ResolutionEvent::Resolved { path: path.clone() });
                    return Resolution::Resolved { path, value };
                }
                StepResult::Cancelled => {
                    observe(&ResolutionEvent::Cancelled);
                    return Resolution::Cancelled;
                }
                StepResult::Retry {
                    input,
                    reason,
                    suggestion,
                } => observe(&ResolutionEvent::Miss {
                    input,
                    reason,
                    suggestion,
                }),
            }
        }
    }
}

/// Resolves a name by repeatedly calling `prompt_fn` until a dataset is named
/// or `cancel_keyword` is entered
///
/// Returns `None` on cancellation.
pub fn resolve_interactively<T, F>(
    cache: &DatasetCache<T>,
    prompt_fn: F,
    cancel_keyword: &str,
) -> Option<Arc<T>>
where
    F: FnMut(&str) -> String,
{
    let mut workflow = ResolutionWorkflow::new(cache).with_cancel_keyword(cancel_keyword);
    match workflow.run(&mut FnPrompt(prompt_fn), |_| {}) {
        Resolution::Resolved { value, .. } => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;

    fn cache() -> DatasetCache<&'static str> {
        let mut cache = DatasetCache::with_capacity(8);
        cache.set("Coronal/Density/MASTER", "T1").unwrap();
        cache.set("Coronal/Density/output_K1", "T2").unwrap();
        cache
    }

    #[test]
    fn test_initial_state() {
        let cache = cache();
        let workflow = ResolutionWorkflow::new(&cache);
        assert_eq!(workflow.state(), ResolutionState::AwaitingInput);
        assert_eq!(workflow.attempts(), 0);
    }

    #[test]
    fn test_step_resolves_leaf() {
        let cache = cache();
        let mut workflow = ResolutionWorkflow::new(&cache);
        match workflow.step("  Coronal/Density/MASTER ") {
            StepResult::Resolved { path, value } => {
                assert_eq!(path, "Coronal/Density/MASTER");
                assert_eq!(*value, "T1");
            }
            other => panic!("unexpected step: {:?}", other),
        }
        assert_eq!(workflow.state(), ResolutionState::Resolved);
    }

    #[test]
    fn test_step_rejects_directory_with_suggestion() {
        let cache = cache();
        let mut workflow = ResolutionWorkflow::new(&cache);
        match workflow.step("Coronal/Density") {
            StepResult::Retry {
                reason, suggestion, ..
            } => {
                assert_eq!(reason, MissReason::Directory);
                let suggestion = suggestion.unwrap();
                assert!(suggestion.path.starts_with("Coronal/Density/"));
            }
            other => panic!("unexpected step: {:?}", other),
        }
        assert_eq!(workflow.state(), ResolutionState::AwaitingInput);
    }

    #[test]
    fn test_step_typo_suggests_closest() {
        let cache = cache();
        let mut workflow = ResolutionWorkflow::new(&cache);
        match workflow.step("Coronl/Density/MASTER") {
            StepResult::Retry {
                reason, suggestion, ..
            } => {
                assert_eq!(reason, MissReason::NotFound);
                assert_eq!(suggestion.unwrap().path, "Coronal/Density/MASTER");
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }

    #[test]
    fn test_step_garbage_has_no_suggestion() {
        let cache = cache();
        let mut workflow = ResolutionWorkflow::new(&cache);
        assert!(matches!(
            workflow.step("zzzzz"),
            StepResult::Retry {
                suggestion: None,
                ..
            }
        ));
    }

    #[test]
    fn test_cancel_first() {
        let cache = cache();
        let mut script = ScriptedPrompt::from_lines(["back", "Coronal/Density/MASTER"]);
        let mut events = Vec::new();

        let resolution = ResolutionWorkflow::new(&cache).run(&mut script, |e| events.push(e.clone()));

        assert!(resolution.is_cancelled());
        assert_eq!(events, vec![ResolutionEvent::Cancelled]);
        assert_eq!(script.remaining(), 1);
    }

    #[test]
    fn test_retry_then_resolve() {
        let cache = cache();
        let mut script = ScriptedPrompt::from_lines([
            "Coronl/Density/MASTER",
            "Coronal",
            "Coronal/Density/output_K1",
        ]);
        let mut events = Vec::new();

        let mut workflow = ResolutionWorkflow::new(&cache);
        let resolution = workflow.run(&mut script, |e| events.push(e.clone()));

        assert_eq!(resolution.value().map(|v| **v), Some("T2"));
        assert_eq!(workflow.attempts(), 3);
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            ResolutionEvent::Miss {
                reason: MissReason::NotFound,
                ..
            }
        ));
        assert!(matches!(
            &events[1],
            ResolutionEvent::Miss {
                reason: MissReason::Directory,
                ..
            }
        ));
        assert_eq!(
            events[2],
            ResolutionEvent::Resolved {
                path: "Coronal/Density/output_K1".to_string()
            }
        );
    }

    #[test]
    fn test_input_exhausted() {
        let cache = cache();
        let mut script = ScriptedPrompt::from_lines(["nope", "still nope"]);
        let resolution = ResolutionWorkflow::new(&cache).run(&mut script, |_| {});
        assert_eq!(resolution, Resolution::InputExhausted);
    }

    #[test]
    fn test_attempt_cap() {
        let cache = cache();
        let mut script = ScriptedPrompt::from_lines(["a", "b", "c", "Coronal/Density/MASTER"]);
        let resolution = ResolutionWorkflow::new(&cache)
            .with_max_attempts(2)
            .run(&mut script, |_| {});
        assert_eq!(resolution, Resolution::AttemptsExhausted { attempts: 2 });
        assert_eq!(script.remaining(), 2);
    }

    #[test]
    fn test_custom_keyword_and_prompt() {
        let cache = cache();
        let mut script = ScriptedPrompt::from_lines(["back", "quit"]);
        let resolution = ResolutionWorkflow::new(&cache)
            .with_cancel_keyword("quit")
            .with_prompt("dataset> ")
            .run(&mut script, |_| {});
        assert!(resolution.is_cancelled());
        assert_eq!(script.prompts_seen(), ["dataset> ", "dataset> "]);
    }

    #[test]
    fn test_from_settings() {
        let cache = cache();
        let settings = CacheSettings {
            cancel_keyword: "exit".to_string(),
            max_attempts: Some(1),
            ..CacheSettings::default()
        };
        let mut script = ScriptedPrompt::from_lines(["back", "exit"]);
        let resolution = ResolutionWorkflow::from_settings(&cache, &settings).run(&mut script, |_| {});
        assert_eq!(resolution, Resolution::AttemptsExhausted { attempts: 1 });
    }

    #[test]
    fn test_padded_keyword_still_cancels() {
        let cache = cache();
        let settings = CacheSettings {
            cancel_keyword: " back ".to_string(),
            ..CacheSettings::default()
        };
        let mut script = ScriptedPrompt::from_lines([" back ", "back"]);
        let resolution = ResolutionWorkflow::from_settings(&cache, &settings).run(&mut script, |_| {});
        assert!(resolution.is_cancelled());
        assert_eq!(script.remaining(), 1);
    }

    #[test]
    fn test_resolve_interactively_padded_keyword() {
        let cache = cache();
        let mut prompts = 0;
        let value = resolve_interactively(
            &cache,
            |_| {
                prompts += 1;
                assert!(prompts < 3, "keyword never matched");
                "back".to_string()
            },
            "\tback\n",
        );
        assert!(value.is_none());
        assert_eq!(prompts, 1);
    }

    #[test]
    fn test_resolve_interactively() {
        let cache = cache();
        let mut answers = vec!["Coronl", "Coronal/Density/MASTER"].into_iter();
        let value = resolve_interactively(
            &cache,
            |_| answers.next().unwrap_or("back").to_string(),
            "back",
        );
        assert_eq!(value.map(|v| *v), Some("T1"));
    }

    #[test]
    fn test_resolve_interactively_cancel() {
        let cache = cache();
        let value = resolve_interactively(&cache, |_| "back".to_string(), "back");
        assert!(value.is_none());
    }
}
