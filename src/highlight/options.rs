//! Per-element highlighting options
//!
//! Authors control highlighting through attributes on the code element or any of its
//! ancestors: `highlight`/`nohighlight`, `line-numbers`/`no-line-numbers`, plus
//! `line-start` and `line-highlight` on the element itself. Resolution walks the document
//! top-down and carries what ancestors said in an [`InheritedContext`], so no lookup ever
//! climbs parent pointers.

use crate::config::HighlightDefaults;
use crate::highlight::diagnostics::{Diagnostic, Diagnostics};
use crate::highlight::dom::{
    describe_element, get_attr, has_attr, has_class, is_tag, set_attr, tag_name,
};
use crate::highlight::lines::{LineHighlights, LineOptions};
use chumsky::prelude::*;
use markup5ever_rcdom::Handle;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prism-style language markers in a class list
static LANGUAGE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:lang|language)-(\w+)").unwrap());

/// Classes that make an element and its subtree non-normative
const NON_NORMATIVE_CLASSES: [&str; 4] = ["example", "note", "informative", "non-normative"];

/// Tags whose text is source code
pub const CANDIDATE_TAGS: [&str; 3] = ["pre", "xmp", "code"];

/// What an element (or its closest ancestor) says about highlighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightMarker {
    Disabled,
    Language(String),
}

/// State inherited from ancestors during the top-down walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedContext {
    pub highlight: Option<HighlightMarker>,
    pub line_numbers: Option<bool>,
    pub non_normative: bool,
}

impl InheritedContext {
    /// Context as seen by `el` itself: the closest setting wins.
    pub fn enter(&self, el: &Handle) -> Self {
        let mut ctx = self.clone();

        if has_attr(el, "nohighlight") {
            ctx.highlight = Some(HighlightMarker::Disabled);
        } else if let Some(lang) = get_attr(el, "highlight") {
            ctx.highlight = Some(HighlightMarker::Language(lang));
        }

        if has_attr(el, "no-line-numbers") {
            ctx.line_numbers = Some(false);
        } else if has_attr(el, "line-numbers") {
            ctx.line_numbers = Some(true);
        }

        if NON_NORMATIVE_CLASSES.iter().any(|class| has_class(el, class)) {
            ctx.non_normative = true;
        }
        ctx
    }
}

/// How a candidate element should be highlighted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageChoice {
    /// Leave the text alone
    Skip,
    /// Already colored by another pass; only the styles are needed
    AlreadyHighlighted,
    /// Highlight with the named (normalized) language
    Language(String),
}

/// Everything the driver needs to process one candidate element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentOptions {
    pub language: LanguageChoice,
    pub lines: LineOptions,
}

/// Copy `lang-X`/`language-X` class markers into a `highlight="X"` attribute, for `node`
/// and every element below it.
pub fn normalize_highlight_markers(node: &Handle) {
    if let Some(class) = get_attr(node, "class") {
        if let Some(captures) = LANGUAGE_MARKER.captures(&class) {
            set_attr(node, "highlight", &captures[1]);
        }
    }
    for child in node.children.borrow().iter() {
        normalize_highlight_markers(child);
    }
}

/// Map common aliases to names the lexical analyzer knows.
pub fn normalize_language_name(lang: &str) -> String {
    match lang {
        "aspnet" => "aspx-cs".to_string(),
        "markup" | "svg" => "html".to_string(),
        other => other.to_string(),
    }
}

pub fn is_candidate(el: &Handle) -> bool {
    tag_name(el).is_some_and(|tag| CANDIDATE_TAGS.contains(&tag))
}

/// Resolve all options for a candidate element. `ctx` must already include `el`.
pub fn resolve_options(
    el: &Handle,
    ctx: &InheritedContext,
    defaults: &HighlightDefaults,
    diagnostics: &mut Diagnostics,
) -> FragmentOptions {
    FragmentOptions {
        language: resolve_language(el, ctx, defaults),
        lines: LineOptions {
            numbers: resolve_line_numbers(el, ctx, defaults),
            start: resolve_line_start(el, diagnostics),
            highlights: resolve_line_highlights(el, diagnostics),
        },
    }
}

fn resolve_language(
    el: &Handle,
    ctx: &InheritedContext,
    defaults: &HighlightDefaults,
) -> LanguageChoice {
    let lang = match &ctx.highlight {
        Some(HighlightMarker::Disabled) => return LanguageChoice::Skip,
        Some(HighlightMarker::Language(lang)) => Some(lang.clone()),
        None if (is_tag(el, "pre") || is_tag(el, "xmp")) && has_class(el, "idl") => {
            if ctx.non_normative {
                Some("idl".to_string())
            } else {
                return LanguageChoice::AlreadyHighlighted;
            }
        }
        None => defaults.default_language.clone(),
    };

    match lang.map(|lang| lang.trim().to_string()) {
        Some(lang) if !lang.is_empty() => LanguageChoice::Language(normalize_language_name(&lang)),
        _ => LanguageChoice::Skip,
    }
}

fn resolve_line_numbers(el: &Handle, ctx: &InheritedContext, defaults: &HighlightDefaults) -> bool {
    if is_tag(el, "code") {
        return false;
    }
    ctx.line_numbers.unwrap_or(defaults.line_numbers)
}

fn resolve_line_start(el: &Handle, diagnostics: &mut Diagnostics) -> u32 {
    let Some(value) = get_attr(el, "line-start") else {
        return 1;
    };
    parse_line_start(&value).unwrap_or_else(|diagnostic| {
        diagnostics.push(diagnostic.with_element(describe_element(el)));
        1
    })
}

fn resolve_line_highlights(el: &Handle, diagnostics: &mut Diagnostics) -> LineHighlights {
    let Some(value) = get_attr(el, "line-highlight") else {
        return LineHighlights::new();
    };
    let (highlights, problems) = parse_line_highlights(&value);
    for diagnostic in problems {
        diagnostics.push(diagnostic.with_element(describe_element(el)));
    }
    highlights
}

/// Parse a `line-start` value. The error is a ready-to-report diagnostic.
pub fn parse_line_start(value: &str) -> Result<u32, Diagnostic> {
    let trimmed = value.trim();
    match trimmed.parse::<i64>() {
        Ok(start) if start >= 1 => u32::try_from(start).map_err(|_| line_start_error(value)),
        Ok(_) => Err(Diagnostic::error(format!(
            "line-start attribute must be a positive integer. Got '{}'.",
            value
        ))
        .with_code("line-start")),
        Err(_) => Err(line_start_error(value)),
    }
}

fn line_start_error(value: &str) -> Diagnostic {
    Diagnostic::error(format!(
        "line-start attribute must have an integer value. Got '{}'.",
        value
    ))
    .with_code("line-start")
}

/// One comma-separated item of a `line-highlight` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineItem {
    Single(u32),
    Range(u32, u32),
}

fn line_item_parser() -> impl Parser<char, LineItem, Error = Simple<char>> {
    let number = filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .try_map(|digits, span| {
            digits
                .parse::<u32>()
                .map_err(|err| Simple::custom(span, err.to_string()))
        });

    number
        .clone()
        .then(just('-').ignore_then(number).or_not())
        .then_ignore(end())
        .map(|(low, high)| match high {
            Some(high) => LineItem::Range(low, high),
            None => LineItem::Single(low),
        })
}

/// Parse a `line-highlight` value such as `"2, 4-5"`.
///
/// Bad items are skipped and returned as diagnostics; the rest still apply.
pub fn parse_line_highlights(value: &str) -> (LineHighlights, Vec<Diagnostic>) {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    let parser = line_item_parser();
    let mut highlights = LineHighlights::new();
    let mut diagnostics = Vec::new();

    for item in compact.split(',') {
        match parser.parse(item) {
            Ok(LineItem::Single(line)) => highlights.add_line(line),
            Ok(LineItem::Range(low, high)) if low < high => highlights.add_range(low..=high),
            Ok(LineItem::Range(..)) => diagnostics.push(line_highlight_error(format!(
                "line-highlight ranges must be well-formed lo-hi - got '{}'.",
                item
            ))),
            Err(_) if item.contains('-') => diagnostics.push(line_highlight_error(format!(
                "Error parsing line-highlight range '{}' - must be `int-int`.",
                item
            ))),
            Err(_) => diagnostics.push(line_highlight_error(format!(
                "Error parsing line-highlight value '{}' - must be integers.",
                item
            ))),
        }
    }
    (highlights, diagnostics)
}

fn line_highlight_error(message: String) -> Diagnostic {
    Diagnostic::error(message).with_code("line-highlight")
}
