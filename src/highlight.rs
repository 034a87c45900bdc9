//! Syntax highlighting for HTML code fragments
//!
//! Data Flow
//!
//!     Flat-token path:   tokenizer → tokens (normalize) → merge → lines
//!     Nested-markup path: nested highlighter → flatten → merge → lines
//!
//!     Every stage works on a single fragment (one code element). Nothing is shared between
//!     fragments, so a failure in one of them is reported and the rest of the document
//!     continues.
//!
//! Tree Model
//!
//!     Fragments are `markup5ever_rcdom` handles. The merge and line passes mutate them in
//!     place, but never while iterating: children are taken out, a fresh list is built, and
//!     the list is swapped back in one step (see [`dom::replace_children`]).

pub mod categories;
pub mod diagnostics;
pub mod dom;
pub mod driver;
pub mod error;
pub mod flatten;
pub mod lines;
pub mod literal;
pub mod merge;
pub mod options;
pub mod runs;
pub mod styles;
pub mod tokenizer;
pub mod tokens;

pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics};
pub use runs::ColoredRun;
