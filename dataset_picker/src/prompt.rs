//! Prompt sources
//!
//! The workflow never reads from a terminal directly. It asks a
//! [`PromptSource`] for the next line, which may come from a person, a
//! closure, or a script of canned answers.
//!
//! ## Script format
//!
//! One answer per line. Blank lines and lines starting with `#` are ignored;
//! surrounding whitespace is trimmed.
//!
//! ```text
//! # Typo first, then the real name
//! Coronl/Density/MASTER
//! Coronal/Density/MASTER
//! ```

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::warn;

/// Supplies answers to prompts
pub trait PromptSource {
    /// Shows `prompt` and returns the answer, or `None` once input is exhausted
    fn next_input(&mut self, prompt: &str) -> Option<String>;
}

/// Script parse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Empty script")]
    EmptyScript,
}

/// Canned answers replayed in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedPrompt {
    inputs: VecDeque<String>,
    prompts_seen: Vec<String>,
}

impl ScriptedPrompt {
    /// Creates a prompt source from answers, used verbatim
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: lines.into_iter().map(Into::into).collect(),
            prompts_seen: Vec::new(),
        }
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, ScriptError> {
        let inputs: VecDeque<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        if inputs.is_empty() {
            return Err(ScriptError::EmptyScript);
        }

        Ok(Self {
            inputs,
            prompts_seen: Vec::new(),
        })
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    /// Every prompt shown so far, in order
    pub fn prompts_seen(&self) -> &[String] {
        &self.prompts_seen
    }
}

impl PromptSource for ScriptedPrompt {
    fn next_input(&mut self, prompt: &str) -> Option<String> {
        self.prompts_seen.push(prompt.to_string());
        self.inputs.pop_front()
    }
}

/// Adapts a closure that always produces an answer
pub struct FnPrompt<F>(pub F);

impl<F> PromptSource for FnPrompt<F>
where
    F: FnMut(&str) -> String,
{
    fn next_input(&mut self, prompt: &str) -> Option<String> {
        Some((self.0)(prompt))
    }
}

/// Reads answers line by line, writing each prompt first
///
/// End of input (or a read error) ends the session.
pub struct ReaderPrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> ReaderPrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: BufRead, W: Write> PromptSource for ReaderPrompt<R, W> {
    fn next_input(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.writer, "{}", prompt).and_then(|_| self.writer.flush()) {
            warn!(error = %e, "Failed to write prompt");
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()),
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                None
            }
        }
    }
}
