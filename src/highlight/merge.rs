//! Colored runs + original fragment → colored fragment
//!
//! # The High-Level Concept
//!
//! A lexer effectively assigns a category to every character of the fragment's text and
//! groups equal neighbours into runs. The original fragment assigns the same characters to
//! text leaves scattered through its own markup (emphasis, links, existing spans). Merging
//! walks both in lockstep: the tree in document order, the runs from the front of a queue.
//!
//! # The Algorithm
//!
//! For each text leaf, drain runs from the queue until the leaf's text is covered:
//!
//! - **Run fits:** the run is no longer than what is left of the leaf. Emit it whole (a
//!   span if colored, text if not) and advance within the leaf.
//! - **Run overflows:** emit only the part of the run that covers the rest of the leaf,
//!   then push the remainder, same category, back to the front of the queue for the next
//!   leaf.
//!
//! The leaf is then replaced by what was emitted. Elements are never split or recolored;
//! a run that crosses an element boundary is always cut at that boundary.
//!
//! # Precondition
//!
//! The runs must spell out exactly the fragment's text. This is checked before anything is
//! touched, so a fragment whose runs do not match is reported and left as it was.

use crate::highlight::dom::{
    add_class, append_child, create_element, create_text, is_element, replace_children,
    take_children, text_content, text_of,
};
use crate::highlight::runs::{concat_text, ColoredRun, RunQueue};
use markup5ever_rcdom::Handle;
use std::fmt;

/// Error merging colored runs into a fragment
#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// The runs' text differs from the fragment's text starting at byte `offset`
    TextMismatch {
        offset: usize,
        expected_len: usize,
        found_len: usize,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::TextMismatch {
                offset,
                expected_len,
                found_len,
            } => write!(
                f,
                "Highlighted text does not match the element's text: diverges at byte {} \
                 (element has {} bytes, highlighter returned {})",
                offset, expected_len, found_len
            ),
        }
    }
}

impl std::error::Error for MergeError {}

/// Merge `runs` into `el`, replacing each text leaf with plain text and colored spans, and
/// mark `el` with the `highlight` class.
pub fn merge_highlighting(el: &Handle, runs: RunQueue) -> Result<(), MergeError> {
    check_text_matches(el, &runs)?;

    let mut runs = runs;
    colorize_element(el, &mut runs);
    add_class(el, "highlight");
    Ok(())
}

fn check_text_matches(el: &Handle, runs: &RunQueue) -> Result<(), MergeError> {
    let expected = text_content(el);
    let found = concat_text(runs);
    if expected == found {
        return Ok(());
    }
    let offset = expected
        .bytes()
        .zip(found.bytes())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| expected.len().min(found.len()));
    Err(MergeError::TextMismatch {
        offset,
        expected_len: expected.len(),
        found_len: found.len(),
    })
}

fn colorize_element(el: &Handle, runs: &mut RunQueue) {
    let mut rebuilt = Vec::new();
    for node in take_children(el) {
        if is_element(&node) {
            colorize_element(&node, runs);
            rebuilt.push(node);
        } else if let Some(text) = text_of(&node) {
            rebuilt.extend(colorize_text(&text, runs));
        } else {
            rebuilt.push(node);
        }
    }
    replace_children(el, rebuilt);
}

fn colorize_text(text: &str, runs: &mut RunQueue) -> Vec<Handle> {
    let mut nodes = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let Some(run) = runs.pop_front() else {
            break;
        };
        if run.is_empty() {
            continue;
        }
        if run.len() <= rest.len() {
            rest = &rest[run.len()..];
            nodes.push(node_for(&run.text, run.category.as_deref()));
        } else {
            let (head, tail) = run.text.split_at(rest.len());
            nodes.push(node_for(head, run.category.as_deref()));
            runs.push_front(ColoredRun::new(tail, run.category.clone()));
            rest = "";
        }
    }
    nodes
}

fn node_for(text: &str, category: Option<&str>) -> Handle {
    match category {
        Some(category) => {
            let span = create_element("span", vec![("class", category)]);
            append_child(&span, create_text(text));
            span
        }
        None => create_text(text),
    }
}
