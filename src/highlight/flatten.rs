//! Nested highlighter markup → flat colored runs
//!
//! # The High-Level Concept
//!
//! Structured-grammar highlighters do not produce a token stream. They produce markup whose
//! spans nest: a keyword span inside a type-name span, a string span inside an argument
//! span. The merger needs a flat run sequence, so nesting is resolved by pushing each
//! ancestor's category down onto the text below it.
//!
//! # The Algorithm
//!
//! Walk the tree depth first, carrying the category accumulated from ancestors:
//!
//! - **Text:** emitted with the accumulated category (plain text if there is none).
//! - **Element:** its own class is combined with the accumulated one. Ancestor and
//!   descendant tags are joined with a space (`n kt`), never chosen between. An element
//!   with child elements is descended into with the combined category; an element with
//!   only text becomes one span.
//!
//! The root itself is a container and contributes no category. Empty text is dropped.
//! Flattening a tree that is already flat returns an equivalent tree.

use crate::highlight::dom::{
    append_child, child_nodes, create_element, create_text, get_attr, has_child_elements,
    is_element, text_content, text_of,
};
use crate::highlight::runs::{ColoredRun, RunQueue};
use markup5ever_rcdom::Handle;

/// Flatten `root`'s children into a fresh `div` holding only text nodes and single-level
/// spans with one (possibly compound) class.
pub fn flatten_highlighting(root: &Handle) -> Handle {
    let container = create_element("div", vec![]);
    for child in child_nodes(root) {
        flatten_into(&child, None, &container);
    }
    container
}

fn flatten_into(node: &Handle, inherited: Option<&str>, out: &Handle) {
    if is_element(node) {
        let own = get_attr(node, "class");
        let category = combine(inherited, own.as_deref());
        if has_child_elements(node) {
            for child in child_nodes(node) {
                flatten_into(&child, category.as_deref(), out);
            }
        } else {
            emit(out, &text_content(node), category.as_deref());
        }
    } else if let Some(text) = text_of(node) {
        emit(out, &text, inherited);
    }
}

/// Join an ancestor category and a node's own class into one compound tag.
fn combine(inherited: Option<&str>, own: Option<&str>) -> Option<String> {
    let own = own.map(str::trim).filter(|class| !class.is_empty());
    match (inherited, own) {
        (None, None) => None,
        (Some(parent), None) => Some(parent.to_string()),
        (None, Some(child)) => Some(child.to_string()),
        (Some(parent), Some(child)) => Some(format!("{} {}", parent, child)),
    }
}

fn emit(out: &Handle, text: &str, category: Option<&str>) {
    if text.is_empty() {
        return;
    }
    match category {
        Some(category) => {
            let span = create_element("span", vec![("class", category)]);
            append_child(&span, create_text(text));
            append_child(out, span);
        }
        None => append_child(out, create_text(text)),
    }
}

/// Read a flattened container back as colored runs.
pub fn colored_runs_from_flattened(container: &Handle) -> RunQueue {
    child_nodes(container)
        .iter()
        .filter_map(|node| {
            let text = text_content(node);
            if text.is_empty() {
                return None;
            }
            let category = if is_element(node) {
                get_attr(node, "class").filter(|class| !class.trim().is_empty())
            } else {
                None
            };
            Some(ColoredRun::new(text, category))
        })
        .collect()
}

/// Flatten nested markup straight to colored runs.
pub fn colored_runs_from_nested(root: &Handle) -> RunQueue {
    colored_runs_from_flattened(&flatten_highlighting(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::dom::{parse_fragment, serialize_node};
    use crate::highlight::runs::concat_text;

    fn runs_of(html: &str) -> Vec<ColoredRun> {
        colored_runs_from_nested(&parse_fragment(html))
            .into_iter()
            .collect()
    }

    #[test]
    fn test_flat_markup_passes_through() {
        assert_eq!(
            runs_of("<span class=kt>interface</span> <span class=nv>Foo</span> {};"),
            vec![
                ColoredRun::colored("interface", "kt"),
                ColoredRun::plain(" "),
                ColoredRun::colored("Foo", "nv"),
                ColoredRun::plain(" {};"),
            ]
        );
    }

    #[test]
    fn test_nested_categories_are_concatenated() {
        assert_eq!(
            runs_of("<span class=n><span class=kt>unsigned</span> <span class=kt>long</span></span> x;"),
            vec![
                ColoredRun::colored("unsigned", "n kt"),
                ColoredRun::colored(" ", "n"),
                ColoredRun::colored("long", "n kt"),
                ColoredRun::plain(" x;"),
            ]
        );
    }

    #[test]
    fn test_unclassed_wrappers_are_transparent() {
        assert_eq!(
            runs_of("<span><span class=s>\"a\"</span>, <b>b</b></span>"),
            vec![
                ColoredRun::colored("\"a\"", "s"),
                ColoredRun::plain(", "),
                ColoredRun::plain("b"),
            ]
        );
    }

    #[test]
    fn test_three_levels_accumulate() {
        assert_eq!(
            runs_of("<span class=a><span class=b><span class=c>x</span>y</span></span>"),
            vec![ColoredRun::colored("x", "a b c"), ColoredRun::colored("y", "a b")]
        );
    }

    #[test]
    fn test_empty_elements_are_dropped() {
        assert_eq!(
            runs_of("<span class=n></span>foo<span class=k></span>"),
            vec![ColoredRun::plain("foo")]
        );
    }

    #[test]
    fn test_reflattening_is_idempotent() {
        let nested = parse_fragment(
            "<span class=n><span class=kt>long</span> <span class=kt>long</span></span>;",
        );
        let once = flatten_highlighting(&nested);
        let twice = flatten_highlighting(&once);

        assert_eq!(
            serialize_node(&once).unwrap(),
            serialize_node(&twice).unwrap()
        );
        let runs = colored_runs_from_flattened(&once);
        assert_eq!(concat_text(&runs), text_content(&nested));
    }
}
