//! Line wrapping and numbering
//!
//! # Output Shape
//!
//! The fragment's children are replaced by alternating pairs, one per source line:
//!
//! ```text
//! <span class="line-no" line="1"></span><div class="line">...line 1...</div>
//! <span class="line-no" line="2"></span><div class="line">...line 2...</div>
//! ```
//!
//! # The Algorithm
//!
//! 1. **Split:** walk the top-level children. Text children are cut at every `\n`; each cut
//!    closes the current line. Element children are moved into the current line whole.
//! 2. **Blank lines:** a line with no content gets a single space so it keeps its height
//!    once lines are rendered as block boxes.
//! 3. **Number:** lines are numbered from `start`. The marker gets a `line` attribute when
//!    numbers were requested or the line is highlighted; highlighted lines get the
//!    `highlight-line` class on both marker and wrapper.
//! 4. **Multi-line elements:** breaks buried inside an element were not split in step 1.
//!    They advance the counter, the marker gets a `line-end` attribute when numbering, and
//!    a highlight on any covered line highlights the whole wrapper.
//!
//! Line breaks inside colored spans only survive to step 4 for nested-markup output; token
//! dumps have their breaks isolated as plain text before merging.

use crate::highlight::dom::{
    add_class, append_child, create_element, create_text, replace_children, set_attr,
    take_children, text_content, text_of,
};
use markup5ever_rcdom::Handle;
use std::ops::RangeInclusive;

pub const LINE_CLASS: &str = "line";
pub const LINE_NUMBER_CLASS: &str = "line-no";
pub const HIGHLIGHT_LINE_CLASS: &str = "highlight-line";
pub const LINE_NUMBERED_CLASS: &str = "line-numbered";

/// Resolved line options for one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOptions {
    /// Attach numbers to every line, not only to highlighted ones
    pub numbers: bool,
    /// Number of the first line
    pub start: u32,
    /// Line numbers to mark as highlighted
    pub highlights: LineHighlights,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            numbers: true,
            start: 1,
            highlights: LineHighlights::default(),
        }
    }
}

/// Highlighted line numbers, stored as the ranges they were written as.
///
/// Membership is checked range by range, so `1-4294967295` costs the same as `1-2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineHighlights {
    ranges: Vec<RangeInclusive<u32>>,
}

impl LineHighlights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: u32) {
        self.ranges.push(line..=line);
    }

    pub fn add_range(&mut self, range: RangeInclusive<u32>) {
        if !range.is_empty() {
            self.ranges.push(range);
        }
    }

    pub fn contains(&self, line: u64) -> bool {
        self.ranges
            .iter()
            .any(|range| line >= u64::from(*range.start()) && line <= u64::from(*range.end()))
    }

    /// Whether any line from `first` to `last` (inclusive) is highlighted.
    pub fn overlaps(&self, first: u64, last: u64) -> bool {
        self.ranges
            .iter()
            .any(|range| u64::from(*range.start()) <= last && u64::from(*range.end()) >= first)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl FromIterator<u32> for LineHighlights {
    fn from_iter<I: IntoIterator<Item = u32>>(lines: I) -> Self {
        let mut highlights = Self::new();
        for line in lines {
            highlights.add_line(line);
        }
        highlights
    }
}

impl LineOptions {
    /// Whether the line pass should run at all
    pub fn is_requested(&self) -> bool {
        self.numbers || !self.highlights.is_empty()
    }
}

/// A marker/wrapper pair for one rendered line
#[derive(Debug, Clone)]
pub struct LinePair {
    pub marker: Handle,
    pub wrapper: Handle,
}

/// Split `el` into numbered line wrappers and mark it `line-numbered`.
pub fn add_line_wrappers(el: &Handle, options: &LineOptions) -> Vec<LinePair> {
    let lines = split_lines(el);
    number_lines(&lines, options);

    let children = lines
        .iter()
        .flat_map(|pair| [pair.marker.clone(), pair.wrapper.clone()])
        .collect();
    replace_children(el, children);
    add_class(el, LINE_NUMBERED_CLASS);
    lines
}

fn new_pair() -> LinePair {
    LinePair {
        marker: create_element("span", vec![("class", LINE_NUMBER_CLASS)]),
        wrapper: create_element("div", vec![("class", LINE_CLASS)]),
    }
}

fn split_lines(el: &Handle) -> Vec<LinePair> {
    let mut lines = Vec::new();
    let mut current = new_pair();

    for node in take_children(el) {
        let text = match text_of(&node) {
            Some(text) => text,
            None => {
                append_child(&current.wrapper, node);
                continue;
            }
        };

        let mut rest = text.as_str();
        while let Some(index) = rest.find('\n') {
            push_text(&current.wrapper, &rest[..index]);
            lines.push(std::mem::replace(&mut current, new_pair()));
            rest = &rest[index + 1..];
        }
        push_text(&current.wrapper, rest);
    }
    lines.push(current);
    lines
}

fn push_text(wrapper: &Handle, text: &str) {
    if !text.is_empty() {
        append_child(wrapper, create_text(text));
    }
}

fn number_lines(lines: &[LinePair], options: &LineOptions) {
    // u64 so that a start near u32::MAX keeps counting
    let mut line_number = u64::from(options.start);

    for LinePair { marker, wrapper } in lines {
        if text_content(wrapper).is_empty() && wrapper.children.borrow().is_empty() {
            append_child(wrapper, create_text(" "));
        }

        let highlighted = options.highlights.contains(line_number);
        if options.numbers || highlighted {
            set_attr(marker, "line", &line_number.to_string());
        }
        if highlighted {
            mark_highlighted(marker, wrapper);
        }

        let internal = u64::from(count_internal_newlines(wrapper));
        if internal > 0 {
            if options.highlights.overlaps(line_number + 1, line_number + internal) {
                mark_highlighted(marker, wrapper);
                set_attr(marker, "line", &line_number.to_string());
            }
            line_number += internal;
            if options.numbers {
                set_attr(marker, "line-end", &line_number.to_string());
            }
        }
        line_number += 1;
    }
}

fn mark_highlighted(marker: &Handle, wrapper: &Handle) {
    add_class(marker, HIGHLIGHT_LINE_CLASS);
    add_class(wrapper, HIGHLIGHT_LINE_CLASS);
}

/// Line breaks left inside a wrapper's content.
pub fn count_internal_newlines(node: &Handle) -> u32 {
    text_content(node).matches('\n').count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::dom::{child_nodes, get_attr, has_class, serialize_node};

    fn pre_with_text(text: &str) -> Handle {
        let pre = create_element("pre", vec![]);
        append_child(&pre, create_text(text));
        pre
    }

    fn options(numbers: bool, start: u32, highlights: &[u32]) -> LineOptions {
        LineOptions {
            numbers,
            start,
            highlights: highlights.iter().copied().collect(),
        }
    }

    #[test]
    fn test_one_wrapper_per_line() {
        let pre = pre_with_text("a\nb\nc");
        let lines = add_line_wrappers(&pre, &options(true, 1, &[]));

        assert_eq!(lines.len(), 3);
        let numbers: Vec<_> = lines
            .iter()
            .map(|pair| get_attr(&pair.marker, "line"))
            .collect();
        assert_eq!(
            numbers,
            vec![Some("1".into()), Some("2".into()), Some("3".into())]
        );
        let texts: Vec<_> = lines.iter().map(|pair| text_content(&pair.wrapper)).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(has_class(&pre, LINE_NUMBERED_CLASS));
        assert_eq!(child_nodes(&pre).len(), 6);
    }

    #[test]
    fn test_serialized_shape() {
        let pre = create_element("code", vec![]);
        append_child(&pre, create_text("x\n"));
        add_line_wrappers(&pre, &options(true, 7, &[]));

        assert_eq!(
            serialize_node(&pre).unwrap(),
            "<code class=\"line-numbered\"><span class=\"line-no\" line=\"7\"></span>\
             <div class=\"line\">x</div><span class=\"line-no\" line=\"8\"></span>\
             <div class=\"line\"> </div></code>"
        );
    }

    #[test]
    fn test_blank_lines_get_a_space() {
        let pre = pre_with_text("a\n\nb");
        let lines = add_line_wrappers(&pre, &options(true, 1, &[]));

        assert_eq!(lines.len(), 3);
        assert_eq!(text_content(&lines[1].wrapper), " ");
    }

    #[test]
    fn test_elements_stay_on_their_line() {
        let pre = create_element("pre", vec![]);
        let span = create_element("span", vec![("class", "k")]);
        append_child(&span, create_text("if"));
        append_child(&pre, span);
        append_child(&pre, create_text(" x\ny"));

        let lines = add_line_wrappers(&pre, &options(true, 1, &[]));

        assert_eq!(lines.len(), 2);
        assert_eq!(
            serialize_node(&lines[0].wrapper).unwrap(),
            "<div class=\"line\"><span class=\"k\">if</span> x</div>"
        );
    }

    #[test]
    fn test_highlights_without_numbers() {
        let pre = pre_with_text("1\n2\n3\n4\n5\n6");
        let lines = add_line_wrappers(&pre, &options(false, 1, &[2, 4, 5]));

        let highlighted: Vec<u32> = lines
            .iter()
            .enumerate()
            .filter(|(_, pair)| has_class(&pair.wrapper, HIGHLIGHT_LINE_CLASS))
            .map(|(index, _)| index as u32 + 1)
            .collect();
        assert_eq!(highlighted, vec![2, 4, 5]);
        assert_eq!(get_attr(&lines[0].marker, "line"), None);
        assert_eq!(get_attr(&lines[1].marker, "line").as_deref(), Some("2"));
        assert!(has_class(&lines[1].marker, HIGHLIGHT_LINE_CLASS));
    }

    #[test]
    fn test_start_offsets_highlights() {
        let pre = pre_with_text("a\nb");
        let lines = add_line_wrappers(&pre, &options(true, 10, &[11]));

        assert!(!has_class(&lines[0].wrapper, HIGHLIGHT_LINE_CLASS));
        assert!(has_class(&lines[1].wrapper, HIGHLIGHT_LINE_CLASS));
        assert_eq!(get_attr(&lines[1].marker, "line").as_deref(), Some("11"));
    }

    #[test]
    fn test_multi_line_element_gets_line_end() {
        let pre = create_element("pre", vec![]);
        let comment = create_element("span", vec![("class", "cm")]);
        append_child(&comment, create_text("/* a\nb\nc */"));
        append_child(&pre, comment);
        append_child(&pre, create_text("\nx"));

        let lines = add_line_wrappers(&pre, &options(true, 1, &[]));

        assert_eq!(lines.len(), 2);
        assert_eq!(get_attr(&lines[0].marker, "line").as_deref(), Some("1"));
        assert_eq!(get_attr(&lines[0].marker, "line-end").as_deref(), Some("3"));
        assert_eq!(get_attr(&lines[1].marker, "line").as_deref(), Some("4"));
        assert_eq!(get_attr(&lines[1].marker, "line-end"), None);
    }

    #[test]
    fn test_highlight_inside_multi_line_element_marks_wrapper() {
        let pre = create_element("pre", vec![]);
        let comment = create_element("span", vec![("class", "cm")]);
        append_child(&comment, create_text("/* a\nb */"));
        append_child(&pre, comment);

        let lines = add_line_wrappers(&pre, &options(false, 1, &[2]));

        assert_eq!(lines.len(), 1);
        assert!(has_class(&lines[0].wrapper, HIGHLIGHT_LINE_CLASS));
        assert!(has_class(&lines[0].marker, HIGHLIGHT_LINE_CLASS));
        assert_eq!(get_attr(&lines[0].marker, "line").as_deref(), Some("1"));
        assert_eq!(get_attr(&lines[0].marker, "line-end"), None);
    }

    #[test]
    fn test_empty_fragment_is_one_blank_line() {
        let pre = create_element("pre", vec![]);
        let lines = add_line_wrappers(&pre, &LineOptions::default());
        assert_eq!(lines.len(), 1);
        assert_eq!(text_content(&lines[0].wrapper), " ");
    }

    #[test]
    fn test_last_representable_start_keeps_counting() {
        let pre = pre_with_text("a\nb");
        let lines = add_line_wrappers(&pre, &options(true, u32::MAX, &[u32::MAX]));

        assert_eq!(lines.len(), 2);
        assert_eq!(get_attr(&lines[0].marker, "line").as_deref(), Some("4294967295"));
        assert_eq!(get_attr(&lines[1].marker, "line").as_deref(), Some("4294967296"));
        assert!(has_class(&lines[0].wrapper, HIGHLIGHT_LINE_CLASS));
        assert!(!has_class(&lines[1].wrapper, HIGHLIGHT_LINE_CLASS));
    }

    #[test]
    fn test_huge_highlight_range_on_short_block() {
        let mut highlights = LineHighlights::new();
        highlights.add_range(2..=u32::MAX);
        let pre = pre_with_text("a\nb\nc");
        let lines = add_line_wrappers(
            &pre,
            &LineOptions {
                numbers: false,
                start: 1,
                highlights,
            },
        );

        let highlighted: Vec<bool> = lines
            .iter()
            .map(|pair| has_class(&pair.wrapper, HIGHLIGHT_LINE_CLASS))
            .collect();
        assert_eq!(highlighted, vec![false, true, true]);
    }

    #[test]
    fn test_line_highlights_membership() {
        let mut highlights: LineHighlights = [3].into_iter().collect();
        highlights.add_range(10..=12);
        highlights.add_range(9..=2);

        assert!(highlights.contains(3));
        assert!(highlights.contains(11));
        assert!(!highlights.contains(5));
        assert!(!highlights.contains(u64::from(u32::MAX) + 1));
        assert!(highlights.overlaps(4, 10));
        assert!(!highlights.overlaps(4, 9));
    }

    #[test]
    fn test_is_requested() {
        assert!(options(true, 1, &[]).is_requested());
        assert!(options(false, 1, &[3]).is_requested());
        assert!(!options(false, 1, &[]).is_requested());
    }
}
