//! Colored runs: the flat representation shared by every highlighting stage.
//!
//!     A sequence of runs read left to right covers a contiguous span of source text.
//!     Concatenating the `text` of every run reproduces that source exactly. Runs with empty
//!     text only exist transiently while splitting and are never emitted.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// A contiguous piece of source text with an optional category tag.
///
/// The category is a short class name such as `k` or `s2`, or a compound tag such as
/// `n kt` produced when flattening nested markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColoredRun {
    pub text: String,
    pub category: Option<String>,
}

impl ColoredRun {
    pub fn new(text: impl Into<String>, category: Option<String>) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    /// A run rendered without any color.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn colored(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self::new(text, Some(category.into()))
    }

    pub fn is_colored(&self) -> bool {
        self.category.is_some()
    }

    /// Byte length of the run's text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for ColoredRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.category {
            Some(category) => write!(f, "{}\t{:?}", category, self.text),
            None => write!(f, "-\t{:?}", self.text),
        }
    }
}

/// The queue consumed by the merger. Runs are popped from the front and an unconsumed
/// remainder is pushed back to the front.
pub type RunQueue = VecDeque<ColoredRun>;

/// Concatenate the text of every run.
pub fn concat_text<'a>(runs: impl IntoIterator<Item = &'a ColoredRun>) -> String {
    runs.into_iter().map(|run| run.text.as_str()).collect()
}
