//! Token category table
//!
//!     Maps the dotted token names of the raw token dump (`Token.Keyword.Type`) to the short
//!     class names used on the emitted spans (`kt`). Lookup is by exact name: a subtype that
//!     is not listed, such as `Token.Name.Builtin`, is rendered uncolored rather than falling
//!     back to its parent type. The table makes no claim of completeness.
//!
//!     Each entry also carries the color used by the generated style sheet, so this table is
//!     the only place where a category is defined.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One row of the category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Dotted token name as written in the raw dump.
    pub token_name: &'static str,
    /// Short class name placed on the span.
    pub tag: &'static str,
    /// CSS color for the style sheet.
    pub color: &'static str,
}

impl Category {
    /// Token name without the leading `Token.`, used as a style sheet comment.
    pub fn label(&self) -> &'static str {
        self.token_name
            .strip_prefix("Token.")
            .unwrap_or(self.token_name)
    }
}

const COMMENT: &str = "#708090";
const KEYWORD: &str = "#990055";
const LITERAL: &str = "#000000";
const NAME: &str = "#0077aa";
const OPERATOR: &str = "#999999";
const STRING: &str = "#a67f59";

macro_rules! category {
    ($name:literal, $tag:literal, $color:expr) => {
        Category {
            token_name: $name,
            tag: $tag,
            color: $color,
        }
    };
}

static CATEGORIES: &[Category] = &[
    category!("Token.Comment", "c", COMMENT),
    category!("Token.Keyword", "k", KEYWORD),
    category!("Token.Literal", "l", LITERAL),
    category!("Token.Name", "n", NAME),
    category!("Token.Operator", "o", OPERATOR),
    category!("Token.Punctuation", "p", OPERATOR),
    category!("Token.Comment.Multiline", "cm", COMMENT),
    category!("Token.Comment.Preproc", "cp", COMMENT),
    category!("Token.Comment.Single", "c1", COMMENT),
    category!("Token.Comment.Special", "cs", COMMENT),
    category!("Token.Keyword.Constant", "kc", KEYWORD),
    category!("Token.Keyword.Declaration", "kd", KEYWORD),
    category!("Token.Keyword.Namespace", "kn", KEYWORD),
    category!("Token.Keyword.Pseudo", "kp", KEYWORD),
    category!("Token.Keyword.Reserved", "kr", KEYWORD),
    category!("Token.Keyword.Type", "kt", KEYWORD),
    category!("Token.Literal.Date", "ld", LITERAL),
    category!("Token.Literal.Number", "m", LITERAL),
    category!("Token.Literal.String", "s", STRING),
    category!("Token.Name.Attribute", "na", NAME),
    category!("Token.Name.Class", "nc", NAME),
    category!("Token.Name.Constant", "no", NAME),
    category!("Token.Name.Decorator", "nd", NAME),
    category!("Token.Name.Entity", "ni", NAME),
    category!("Token.Name.Exception", "ne", NAME),
    category!("Token.Name.Function", "nf", NAME),
    category!("Token.Name.Label", "nl", NAME),
    category!("Token.Name.Namespace", "nn", NAME),
    category!("Token.Name.Property", "py", NAME),
    category!("Token.Name.Tag", "nt", "#669900"),
    category!("Token.Name.Variable", "nv", "#222222"),
    category!("Token.Operator.Word", "ow", OPERATOR),
    category!("Token.Literal.Number.Bin", "mb", LITERAL),
    category!("Token.Literal.Number.Float", "mf", LITERAL),
    category!("Token.Literal.Number.Hex", "mh", LITERAL),
    category!("Token.Literal.Number.Integer", "mi", LITERAL),
    category!("Token.Literal.Number.Oct", "mo", LITERAL),
    category!("Token.Literal.String.Backtick", "sb", STRING),
    category!("Token.Literal.String.Char", "sc", STRING),
    category!("Token.Literal.String.Doc", "sd", STRING),
    category!("Token.Literal.String.Double", "s2", STRING),
    category!("Token.Literal.String.Escape", "se", STRING),
    category!("Token.Literal.String.Heredoc", "sh", STRING),
    category!("Token.Literal.String.Interpol", "si", STRING),
    category!("Token.Literal.String.Other", "sx", STRING),
    category!("Token.Literal.String.Regex", "sr", STRING),
    category!("Token.Literal.String.Single", "s1", STRING),
    category!("Token.Literal.String.Symbol", "ss", STRING),
    category!("Token.Name.Variable.Class", "vc", NAME),
    category!("Token.Name.Variable.Global", "vg", NAME),
    category!("Token.Name.Variable.Instance", "vi", NAME),
    category!("Token.Literal.Number.Integer.Long", "il", LITERAL),
];

static BY_TOKEN_NAME: Lazy<HashMap<&'static str, &'static Category>> = Lazy::new(|| {
    CATEGORIES
        .iter()
        .map(|category| (category.token_name, category))
        .collect()
});

/// Look up the short tag for a dotted token name.
pub fn category_for(token_name: &str) -> Option<&'static str> {
    BY_TOKEN_NAME.get(token_name).map(|category| category.tag)
}

/// Every known category, in style sheet order.
pub fn categories() -> &'static [Category] {
    CATEGORIES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_names_map_to_tags() {
        assert_eq!(category_for("Token.Keyword"), Some("k"));
        assert_eq!(category_for("Token.Keyword.Type"), Some("kt"));
        assert_eq!(category_for("Token.Literal.String.Double"), Some("s2"));
        assert_eq!(category_for("Token.Literal.Number.Integer.Long"), Some("il"));
    }

    #[test]
    fn test_unlisted_subtypes_are_uncolored() {
        assert_eq!(category_for("Token.Name.Builtin"), None);
        assert_eq!(category_for("Token.Text"), None);
        assert_eq!(category_for("Token.Error"), None);
        assert_eq!(category_for(""), None);
    }

    #[test]
    fn test_tags_and_names_are_unique() {
        let tags: HashSet<_> = categories().iter().map(|c| c.tag).collect();
        let names: HashSet<_> = categories().iter().map(|c| c.token_name).collect();
        assert_eq!(tags.len(), categories().len());
        assert_eq!(names.len(), categories().len());
        assert_eq!(categories().len(), 52);
    }

    #[test]
    fn test_label_strips_token_prefix() {
        let category = categories()[0];
        assert_eq!(category.label(), "Comment");
    }
}
