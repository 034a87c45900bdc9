//! Style sheets for highlighted and line-numbered fragments
//!
//! The syntax colors are generated from the [category table](super::categories); the line
//! styles are fixed. A document only receives the sheets for what the pass actually did.

use crate::highlight::categories::categories;
use crate::highlight::dom::{append_child, create_element, create_text, find_first};
use crate::highlight::driver::HighlightOutcome;
use markup5ever_rcdom::Handle;

const HIGHLIGHT_PREAMBLE: &str = "\
.highlight:not(.idl) { background: hsl(24, 20%, 95%); }
code.highlight { padding: .1em; border-radius: .3em; }
pre.highlight, pre > code.highlight { display: block; padding: 1em; margin: .5em 0; overflow: auto; border-radius: 0; }
";

const LINE_NUMBER_STYLES: &str = "
.line-numbered {
    display: grid !important;
    grid-template-columns: min-content 1fr;
    grid-auto-flow: row;
}
.line-no {
    grid-column: 1;
    color: gray;
}
.line {
    grid-column: 2;
}
.line:hover {
    background: rgba(0,0,0,.05);
}
.line-no[line]::before {
    padding: 0 .5em 0 .1em;
    content: attr(line);
}
.line-no[line-end]::after {
    padding: 0 .5em 0 .1em;
    content: attr(line-end);
}
";

const LINE_HIGHLIGHTING_STYLES: &str = "
.line-numbered {
    display: grid;
    grid-template-columns: min-content 1fr;
    grid-auto-flow: row;
}
.line-no {
    grid-column: 1;
    color: gray;
}
.line {
    grid-column: 2;
}
.line.highlight-line {
    background: rgba(0,0,0,.05);
}
.line-no.highlight-line[line]::before {
    padding: 0 .5em 0 .1em;
    content: attr(line);
}
.line-no.highlight-line[line-end]::after {
    padding: 0 .5em 0 .1em;
    content: attr(line-end);
}
";

/// Colors for every category class, scoped under `.highlight`.
pub fn syntax_highlighting_styles() -> String {
    let mut css = String::from(HIGHLIGHT_PREAMBLE);
    for category in categories() {
        css.push_str(&format!(
            ".highlight .{} {{ color: {} }} /* {} */\n",
            category.tag,
            category.color,
            category.label()
        ));
    }
    css
}

pub fn line_number_styles() -> &'static str {
    LINE_NUMBER_STYLES
}

pub fn line_highlighting_styles() -> &'static str {
    LINE_HIGHLIGHTING_STYLES
}

/// The sheets needed for `outcome`, concatenated. Empty if the pass did nothing.
pub fn stylesheet_for(outcome: &HighlightOutcome) -> String {
    let mut css = String::new();
    if outcome.highlighting {
        css.push_str(&syntax_highlighting_styles());
    }
    if outcome.line_numbering {
        css.push_str(line_number_styles());
    }
    if outcome.line_highlighting {
        css.push_str(line_highlighting_styles());
    }
    css
}

/// Append a `<style>` element with the sheets for `outcome` to the document's `<head>`.
///
/// Returns `false` when there was nothing to add or the document has no head.
pub fn inject_styles(document: &Handle, outcome: &HighlightOutcome) -> bool {
    let css = stylesheet_for(outcome);
    if css.is_empty() {
        return false;
    }
    let Some(head) = find_first(document, "head") else {
        return false;
    };
    let style = create_element("style", vec![]);
    append_child(&style, create_text(&css));
    append_child(&head, style);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::dom::{child_nodes, is_tag, parse_document, text_content};

    fn outcome(highlighting: bool, line_numbering: bool, line_highlighting: bool) -> HighlightOutcome {
        HighlightOutcome {
            highlighting,
            line_numbering,
            line_highlighting,
        }
    }

    #[test]
    fn test_one_rule_per_category() {
        let css = syntax_highlighting_styles();
        assert!(css.contains(".highlight .kt { color: #990055 } /* Keyword.Type */"));
        assert!(css.contains(".highlight .nt { color: #669900 } /* Name.Tag */"));
        assert_eq!(css.matches(".highlight .").count(), categories().len());
    }

    #[test]
    fn test_stylesheet_follows_flags() {
        assert!(stylesheet_for(&outcome(false, false, false)).is_empty());

        let numbers_only = stylesheet_for(&outcome(false, true, false));
        assert!(numbers_only.contains(".line-no[line]::before"));
        assert!(!numbers_only.contains(".highlight .k "));

        let everything = stylesheet_for(&outcome(true, true, true));
        assert!(everything.contains(".highlight .k "));
        assert!(everything.contains(".line.highlight-line"));
    }

    #[test]
    fn test_inject_appends_to_head() {
        let dom = parse_document("<!DOCTYPE html><title>t</title><p>x</p>");
        assert!(inject_styles(&dom.document, &outcome(true, false, false)));

        let head = find_first(&dom.document, "head").unwrap();
        let last = child_nodes(&head).pop().unwrap();
        assert!(is_tag(&last, "style"));
        assert!(text_content(&last).contains(".highlight .c "));
    }

    #[test]
    fn test_inject_skips_when_nothing_happened() {
        let dom = parse_document("<p>x</p>");
        assert!(!inject_styles(&dom.document, &HighlightOutcome::default()));
        let head = find_first(&dom.document, "head").unwrap();
        assert!(child_nodes(&head).is_empty());
    }
}
