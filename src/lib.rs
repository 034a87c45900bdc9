//! # lex-highlight
//!
//! Merges externally produced syntax-highlighting output into existing HTML code fragments.
//!
//!     A code block in a document is not plain text: authors put emphasis, links and other
//!     spans inside `<pre>` and `<code>`. A lexer, on the other hand, only sees the
//!     concatenated text and returns a flat stream of colored runs. This crate reconciles the
//!     two, recoloring every text leaf of the original fragment while keeping its markup, and
//!     then optionally splits the fragment into numbered lines.
//!
//! Pipeline
//!
//!     1. [`highlight::tokens`]: raw token dump → ordered colored runs.
//!     2. [`highlight::flatten`]: nested highlighter markup → flat colored runs.
//!     3. [`highlight::merge`]: colored runs + original fragment → colored fragment.
//!     4. [`highlight::lines`]: colored fragment → numbered line wrappers.
//!
//!     [`highlight::driver`] walks a whole document and runs the pipeline for every code
//!     element, collecting diagnostics instead of aborting.

pub mod config;
pub mod highlight;

pub use highlight::driver::{HighlightOutcome, Highlighter};
pub use highlight::error::HighlightError;
pub use highlight::runs::ColoredRun;
