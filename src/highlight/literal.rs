//! Decoder for the quoted text column of a raw token dump
//!
//!     The raw formatter writes each token's text as a Python string literal (`'foo'`,
//!     `"it's"`, `'\n'`, `u'\xe9'`). The body of the literal is split into plain runs and
//!     escape sequences by a logos lexer, and each piece is decoded on its own.
//!
//!     Only the escapes a `repr()` can produce are accepted, plus octal escapes. Anything
//!     else is an error rather than being passed through, since a dump that does not decode
//!     cannot be trusted to match the source text.

use logos::Logos;
use std::fmt;

/// Error decoding a quoted literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// The value is not wrapped in matching quotes
    Unquoted(String),
    /// An escape sequence that a string literal cannot contain
    InvalidEscape(String),
    /// An escape that names a value outside the Unicode scalar range
    InvalidCodePoint(u32),
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralError::Unquoted(value) => write!(f, "not a quoted literal: {}", value),
            LiteralError::InvalidEscape(escape) => write!(f, "invalid escape sequence '{}'", escape),
            LiteralError::InvalidCodePoint(value) => {
                write!(f, "escape names invalid code point {:#x}", value)
            }
        }
    }
}

impl std::error::Error for LiteralError {}

/// Pieces of a literal body
#[derive(Logos, Debug, PartialEq, Clone)]
enum Piece {
    #[regex(r"[^\\]+")]
    Chars,

    #[regex(r#"\\[\\'"abfnrtv]"#)]
    SimpleEscape,

    #[regex(r"\\x[0-9a-fA-F]{2}")]
    HexEscape,

    #[regex(r"\\u[0-9a-fA-F]{4}")]
    ShortUnicodeEscape,

    #[regex(r"\\U[0-9a-fA-F]{8}")]
    LongUnicodeEscape,

    #[regex(r"\\[0-7]{1,3}")]
    OctalEscape,
}

/// Decode a quoted literal such as `'a\tb'` into its text.
pub fn decode(literal: &str) -> Result<String, LiteralError> {
    let body = strip_quotes(literal.trim())?;

    let mut decoded = String::with_capacity(body.len());
    let mut lexer = Piece::lexer(body);
    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        match result {
            Ok(Piece::Chars) => decoded.push_str(slice),
            Ok(Piece::SimpleEscape) => decoded.push(simple_escape(slice)),
            Ok(Piece::HexEscape | Piece::ShortUnicodeEscape | Piece::LongUnicodeEscape) => {
                decoded.push(code_point(&slice[2..], 16)?)
            }
            Ok(Piece::OctalEscape) => decoded.push(code_point(&slice[1..], 8)?),
            Err(()) => return Err(LiteralError::InvalidEscape(slice.to_string())),
        }
    }
    Ok(decoded)
}

fn strip_quotes(literal: &str) -> Result<&str, LiteralError> {
    let unprefixed = literal
        .strip_prefix(['u', 'U', 'b', 'B'])
        .unwrap_or(literal);

    for quote in ['\'', '"'] {
        if unprefixed.len() >= 2 && unprefixed.starts_with(quote) && unprefixed.ends_with(quote) {
            return Ok(&unprefixed[1..unprefixed.len() - 1]);
        }
    }
    Err(LiteralError::Unquoted(literal.to_string()))
}

fn simple_escape(slice: &str) -> char {
    match slice.as_bytes()[1] {
        b'a' => '\u{07}',
        b'b' => '\u{08}',
        b'f' => '\u{0c}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'v' => '\u{0b}',
        other => other as char,
    }
}

fn code_point(digits: &str, radix: u32) -> Result<char, LiteralError> {
    let value = u32::from_str_radix(digits, radix)
        .map_err(|_| LiteralError::InvalidEscape(digits.to_string()))?;
    char::from_u32(value).ok_or(LiteralError::InvalidCodePoint(value))
}
