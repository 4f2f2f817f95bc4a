//! # Dataset Picker
//!
//! Turns free-text dataset names into cached values.
//!
//! The caller is prompted until they name a stored dataset or enter the
//! cancel keyword. Misspelled names and directory names are rejected with a
//! "did you mean" suggestion drawn from the cache's leaf paths.
//!
//! Input comes from a [`PromptSource`]: a terminal ([`ReaderPrompt`]), a
//! closure ([`FnPrompt`]) or a replayable script ([`ScriptedPrompt`]).

pub mod prompt;
pub mod workflow;

pub use prompt::{FnPrompt, PromptSource, ReaderPrompt, ScriptError, ScriptedPrompt};
pub use workflow::{
    resolve_interactively, MissReason, Resolution, ResolutionEvent, ResolutionState,
    ResolutionWorkflow, StepResult, DEFAULT_PROMPT,
};
