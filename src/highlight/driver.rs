//! Document-wide highlighting pass
//!
//! # Walk
//!
//! The document is walked top-down. Every element refines the [`InheritedContext`] it
//! received, and every `pre`, `xmp` or `code` element is a candidate:
//!
//! 1. Resolve its options (language, line numbers, `line-start`, `line-highlight`).
//! 2. Color it: nested highlighter if one is registered for the language, tokenizer
//!    otherwise, then merge.
//! 3. Wrap its lines when numbers or highlighted lines were requested.
//! 4. Descend into it only if it was not colored. Text below a colored candidate already
//!    belongs to that candidate, while `<pre><code class="language-js">` still reaches the
//!    inner `code`.
//!
//! # Failure Isolation
//!
//! A fragment that fails is reported once, tagged with its opening tag, and left as it was.
//! The rest of the document is unaffected. Fragments share no state, so the only thing that
//! flows between them is the [`HighlightOutcome`], merged by logical OR.

use crate::config::{HighlightConfig, HighlightDefaults};
use crate::highlight::diagnostics::{Diagnostic, Diagnostics};
use crate::highlight::dom::{child_nodes, describe_element, text_content};
use crate::highlight::error::HighlightError;
use crate::highlight::flatten::colored_runs_from_nested;
use crate::highlight::lines::add_line_wrappers;
use crate::highlight::merge::merge_highlighting;
use crate::highlight::options::{
    is_candidate, normalize_highlight_markers, resolve_options, InheritedContext,
    LanguageChoice,
};
use crate::highlight::runs::RunQueue;
use crate::highlight::tokenizer::{
    NestedHighlighter, PygmentizeTokenizer, Tokenizer, UnavailableTokenizer,
};
use crate::highlight::tokens::colored_runs_from_raw_tokens;
use markup5ever_rcdom::Handle;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};

/// Which style sheets a pass made necessary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HighlightOutcome {
    pub highlighting: bool,
    pub line_numbering: bool,
    pub line_highlighting: bool,
}

impl HighlightOutcome {
    pub fn merge(&mut self, other: HighlightOutcome) {
        self.highlighting |= other.highlighting;
        self.line_numbering |= other.line_numbering;
        self.line_highlighting |= other.line_highlighting;
    }

    pub fn any(&self) -> bool {
        self.highlighting || self.line_numbering || self.line_highlighting
    }
}

impl BitOr for HighlightOutcome {
    type Output = HighlightOutcome;

    fn bitor(mut self, rhs: HighlightOutcome) -> HighlightOutcome {
        self.merge(rhs);
        self
    }
}

impl BitOrAssign for HighlightOutcome {
    fn bitor_assign(&mut self, rhs: HighlightOutcome) {
        self.merge(rhs);
    }
}

/// Runs the highlighting pass over documents.
pub struct Highlighter {
    tokenizer: Box<dyn Tokenizer>,
    nested: HashMap<String, Box<dyn NestedHighlighter>>,
    defaults: HighlightDefaults,
}

impl Highlighter {
    pub fn new(tokenizer: impl Tokenizer + 'static) -> Self {
        Self {
            tokenizer: Box::new(tokenizer),
            nested: HashMap::new(),
            defaults: HighlightDefaults::default(),
        }
    }

    /// Build from configuration. A missing tokenizer program is not an error here; each
    /// element that needs it reports the problem instead.
    pub fn from_config(config: &HighlightConfig) -> Self {
        let highlighter = match PygmentizeTokenizer::locate(&config.tokenizer.program) {
            Ok(tokenizer) => Self::new(tokenizer),
            Err(err) => {
                tracing::warn!("{}", err);
                Self::new(UnavailableTokenizer::new(err.to_string()))
            }
        };
        highlighter.with_defaults(config.highlight.clone())
    }

    pub fn with_defaults(mut self, defaults: HighlightDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Route `language` to a nested-markup highlighter instead of the tokenizer.
    pub fn with_nested_highlighter(
        mut self,
        language: &str,
        highlighter: impl NestedHighlighter + 'static,
    ) -> Self {
        self.nested
            .insert(language.to_string(), Box::new(highlighter));
        self
    }

    /// Highlight and line-wrap every candidate element below `root`.
    pub fn add_syntax_highlighting(
        &self,
        root: &Handle,
        diagnostics: &mut Diagnostics,
    ) -> HighlightOutcome {
        normalize_highlight_markers(root);

        let mut outcome = HighlightOutcome::default();
        self.visit(root, &InheritedContext::default(), diagnostics, &mut outcome);
        tracing::debug!(?outcome, "highlighting pass finished");
        outcome
    }

    fn visit(
        &self,
        node: &Handle,
        inherited: &InheritedContext,
        diagnostics: &mut Diagnostics,
        outcome: &mut HighlightOutcome,
    ) {
        let ctx = inherited.enter(node);
        if is_candidate(node) {
            let (fragment, colored) = self.process_fragment(node, &ctx, diagnostics);
            *outcome |= fragment;
            if colored {
                return;
            }
        }
        for child in child_nodes(node) {
            self.visit(&child, &ctx, diagnostics, outcome);
        }
    }

    /// Returns the fragment's outcome and whether its text is now colored.
    fn process_fragment(
        &self,
        el: &Handle,
        ctx: &InheritedContext,
        diagnostics: &mut Diagnostics,
    ) -> (HighlightOutcome, bool) {
        let options = resolve_options(el, ctx, &self.defaults, diagnostics);
        let mut outcome = HighlightOutcome::default();

        let colored = match &options.language {
            LanguageChoice::Skip => false,
            LanguageChoice::AlreadyHighlighted => true,
            LanguageChoice::Language(language) => {
                tracing::debug!(element = %describe_element(el), %language, "highlighting");
                match self.highlight_element(el, language) {
                    Ok(()) => true,
                    Err(err) => {
                        diagnostics.push(
                            Diagnostic::error(err.to_string())
                                .with_code(err.code())
                                .with_element(describe_element(el)),
                        );
                        false
                    }
                }
            }
        };
        outcome.highlighting = colored;

        if options.lines.is_requested() {
            add_line_wrappers(el, &options.lines);
            outcome.line_numbering = options.lines.numbers;
            outcome.line_highlighting = !options.lines.highlights.is_empty();
        }
        (outcome, colored)
    }

    /// Color one element's text in `language` and merge the result into it.
    pub fn highlight_element(&self, el: &Handle, language: &str) -> Result<(), HighlightError> {
        let text = text_content(el);
        let runs = self.colored_runs(&text, language)?;
        merge_highlighting(el, runs)?;
        Ok(())
    }

    fn colored_runs(&self, text: &str, language: &str) -> Result<RunQueue, HighlightError> {
        if text.is_empty() {
            return Ok(RunQueue::new());
        }
        if let Some(nested) = self.nested.get(language) {
            let tree = nested.highlight_nested(text)?;
            return Ok(colored_runs_from_nested(&tree));
        }
        let dump = self.tokenizer.tokenize(text, language)?;
        Ok(colored_runs_from_raw_tokens(&dump)?)
    }
}
