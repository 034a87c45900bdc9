//! Per-fragment highlighting errors

use crate::highlight::merge::MergeError;
use crate::highlight::tokens::TokenStreamError;
use std::fmt;

/// Error that aborts highlighting for one fragment
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightError {
    /// The lexical analyzer has no lexer for the requested language
    UnknownLanguage(String),
    /// The lexical analyzer could not be run or failed for another reason
    Tokenizer(String),
    /// The nested-markup highlighter reported a failure
    NestedMarkup(String),
    /// The raw token dump could not be decoded
    TokenStream(TokenStreamError),
    /// The colored runs do not cover the fragment's text
    Merge(MergeError),
}

impl HighlightError {
    /// Stable code used when the error is reported as a diagnostic
    pub fn code(&self) -> &'static str {
        match self {
            HighlightError::UnknownLanguage(_) => "unknown-language",
            HighlightError::Tokenizer(_) => "tokenizer-failed",
            HighlightError::NestedMarkup(_) => "nested-markup-failed",
            HighlightError::TokenStream(_) => "malformed-token-stream",
            HighlightError::Merge(_) => "text-mismatch",
        }
    }
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnknownLanguage(lang) => {
                write!(f, "'{}' isn't a known syntax-highlighting language", lang)
            }
            HighlightError::Tokenizer(msg) => write!(f, "Tokenizer failed: {}", msg),
            HighlightError::NestedMarkup(msg) => write!(f, "{}", msg),
            HighlightError::TokenStream(err) => write!(f, "{}", err),
            HighlightError::Merge(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::TokenStream(err) => Some(err),
            HighlightError::Merge(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TokenStreamError> for HighlightError {
    fn from(err: TokenStreamError) -> Self {
        HighlightError::TokenStream(err)
    }
}

impl From<MergeError> for HighlightError {
    fn from(err: MergeError) -> Self {
        HighlightError::Merge(err)
    }
}
