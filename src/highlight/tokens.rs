//! Raw token dump → colored runs
//!
//! # Input
//!
//! The lexical analyzer's raw formatter writes one token per line:
//!
//! ```text
//! Token.Keyword\t'def'
//! Token.Text\t' '
//! Token.Name.Function\t'main'
//! ```
//!
//! The second column is a quoted literal decoded by [`literal`](super::literal).
//!
//! # The Algorithm
//!
//! 1. **Decode:** split each non-empty line at the first tab and decode the quoted text.
//!    Tokens whose text decodes to nothing are dropped.
//! 2. **Categorize:** map the token name through the [category table](super::categories).
//!    Unknown names become uncolored runs, never errors.
//! 3. **Coalesce:** adjacent tokens with the same category are joined into one run.
//! 4. **Isolate line breaks:** every `\n` inside a run becomes its own uncolored run, with
//!    the text on either side keeping the run's category.
//!
//! Step 4 is what lets the line wrapper split at top-level text nodes only: after it, no
//! colored span produced from a token dump ever contains a line break.

use crate::highlight::categories::category_for;
use crate::highlight::literal::{self, LiteralError};
use crate::highlight::runs::{ColoredRun, RunQueue};
use std::fmt;

/// Error decoding a raw token dump
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStreamError {
    /// A line that is not `name<TAB>literal`, or whose literal does not decode
    MalformedTokenStream { line: usize, reason: String },
}

impl fmt::Display for TokenStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStreamError::MalformedTokenStream { line, reason } => {
                write!(f, "Malformed token stream at line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for TokenStreamError {}

/// Decode a raw token dump into a queue of colored runs.
pub fn colored_runs_from_raw_tokens(dump: &str) -> Result<RunQueue, TokenStreamError> {
    let mut runs = RunQueue::new();
    let mut current: Option<ColoredRun> = None;

    for (index, line) in dump.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let (token_name, text) = decode_line(line).map_err(|reason| {
            TokenStreamError::MalformedTokenStream {
                line: index + 1,
                reason,
            }
        })?;
        if text.is_empty() {
            continue;
        }
        let category = category_for(token_name).map(str::to_string);

        current = match current.take() {
            Some(mut run) if run.category == category => {
                run.text.push_str(&text);
                Some(run)
            }
            previous => {
                if let Some(run) = previous {
                    push_isolating_breaks(&mut runs, run);
                }
                Some(ColoredRun::new(text, category))
            }
        };
    }
    if let Some(run) = current {
        push_isolating_breaks(&mut runs, run);
    }

    Ok(runs)
}

fn decode_line(line: &str) -> Result<(&str, String), String> {
    let (token_name, quoted) = line
        .split_once('\t')
        .ok_or_else(|| format!("expected 'name<TAB>text', got {:?}", line))?;
    let text = literal::decode(quoted).map_err(|err: LiteralError| err.to_string())?;
    Ok((token_name, text))
}

/// Push `run`, turning every line break inside it into a separate uncolored run.
fn push_isolating_breaks(runs: &mut RunQueue, run: ColoredRun) {
    if !run.text.contains('\n') {
        runs.push_back(run);
        return;
    }

    let mut pieces = run.text.split('\n');
    if let Some(first) = pieces.next() {
        push_non_empty(runs, first, &run.category);
    }
    for piece in pieces {
        runs.push_back(ColoredRun::plain("\n"));
        push_non_empty(runs, piece, &run.category);
    }
}

fn push_non_empty(runs: &mut RunQueue, text: &str, category: &Option<String>) {
    if !text.is_empty() {
        runs.push_back(ColoredRun::new(text, category.clone()));
    }
}
