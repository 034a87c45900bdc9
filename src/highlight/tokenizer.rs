//! External highlighters
//!
//! The pass never lexes source text itself. Flat token streams come from a [`Tokenizer`]
//! (by default the `pygmentize` command), nested markup from a [`NestedHighlighter`]
//! registered for a language.

use crate::highlight::dom::parse_fragment;
use crate::highlight::error::HighlightError;
use markup5ever_rcdom::Handle;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Produces a raw token dump (`Token.Name<TAB>'text'` per line) for source text.
pub trait Tokenizer {
    fn tokenize(&self, text: &str, language: &str) -> Result<String, HighlightError>;
}

/// Produces nested highlighting markup for source text.
pub trait NestedHighlighter {
    fn highlight_nested(&self, text: &str) -> Result<Handle, HighlightError>;
}

/// Any function returning highlighted HTML can act as a nested highlighter.
impl<F> NestedHighlighter for F
where
    F: Fn(&str) -> Result<String, String>,
{
    fn highlight_nested(&self, text: &str) -> Result<Handle, HighlightError> {
        let markup = self(text).map_err(HighlightError::NestedMarkup)?;
        Ok(parse_fragment(&markup))
    }
}

/// Runs `pygmentize -f raw` as a child process.
#[derive(Debug, Clone)]
pub struct PygmentizeTokenizer {
    program: PathBuf,
}

impl PygmentizeTokenizer {
    /// Find `program` (a bare name looked up on `PATH`, or a path).
    pub fn locate(program: &str) -> Result<Self, HighlightError> {
        let program = which::which(program).map_err(|err| {
            HighlightError::Tokenizer(format!("cannot find '{}': {}", program, err))
        })?;
        Ok(Self { program })
    }

    fn arguments(language: &str) -> [&str; 6] {
        [
            "-f",
            "raw",
            "-l",
            language,
            "-O",
            "stripnl=False,ensurenl=False,encoding=utf-8",
        ]
    }
}

impl Tokenizer for PygmentizeTokenizer {
    fn tokenize(&self, text: &str, language: &str) -> Result<String, HighlightError> {
        let mut child = Command::new(&self.program)
            .args(Self::arguments(language))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                HighlightError::Tokenizer(format!("{}: {}", self.program.display(), err))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| HighlightError::Tokenizer("stdin was not captured".to_string()))?;

        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(text.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output.map_err(|err| HighlightError::Tokenizer(err.to_string()))?;

        // A failed child usually closed the pipe early; its stderr is the better report.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no lexer for alias") {
                return Err(HighlightError::UnknownLanguage(language.to_string()));
            }
            return Err(HighlightError::Tokenizer(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        match written {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                return Err(HighlightError::Tokenizer(format!(
                    "could not send source text to {}: {}",
                    self.program.display(),
                    err
                )))
            }
            Err(_) => {
                return Err(HighlightError::Tokenizer(
                    "stdin writer thread panicked".to_string(),
                ))
            }
        }

        String::from_utf8(output.stdout)
            .map_err(|err| HighlightError::Tokenizer(format!("output is not UTF-8: {}", err)))
    }
}

/// Stand-in used when no lexical analyzer could be found; every request fails.
#[derive(Debug, Clone)]
pub struct UnavailableTokenizer {
    reason: String,
}

impl UnavailableTokenizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Tokenizer for UnavailableTokenizer {
    fn tokenize(&self, _text: &str, _language: &str) -> Result<String, HighlightError> {
        Err(HighlightError::Tokenizer(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::dom::{child_nodes, get_attr, text_content};

    #[test]
    fn test_closure_nested_highlighter_parses_markup() {
        let highlighter =
            |text: &str| -> Result<String, String> { Ok(format!("<span class=kt>{}</span>", text)) };

        let tree = highlighter.highlight_nested("long").unwrap();
        let children = child_nodes(&tree);
        assert_eq!(children.len(), 1);
        assert_eq!(get_attr(&children[0], "class").as_deref(), Some("kt"));
        assert_eq!(text_content(&tree), "long");
    }

    #[test]
    fn test_closure_failure_is_nested_markup_error() {
        let highlighter = |_: &str| -> Result<String, String> { Err("unexpected token".into()) };
        let err = highlighter.highlight_nested("x").unwrap_err();
        assert_eq!(err, HighlightError::NestedMarkup("unexpected token".into()));
        assert_eq!(err.code(), "nested-markup-failed");
    }

    #[test]
    fn test_missing_program_is_tokenizer_error() {
        let err = PygmentizeTokenizer::locate("definitely-not-a-real-pygmentize-binary").unwrap_err();
        assert!(matches!(err, HighlightError::Tokenizer(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unread_input_is_reported_even_on_success() {
        // `true` exits 0 without reading stdin, so a large write hits a closed pipe
        let Ok(tokenizer) = PygmentizeTokenizer::locate("true") else {
            return;
        };
        let text = "x".repeat(4 * 1024 * 1024);

        let err = tokenizer.tokenize(&text, "js").unwrap_err();

        match err {
            HighlightError::Tokenizer(message) => {
                assert!(message.contains("could not send source text"), "{}", message)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_raw_formatter_arguments() {
        assert_eq!(
            PygmentizeTokenizer::arguments("js"),
            [
                "-f",
                "raw",
                "-l",
                "js",
                "-O",
                "stripnl=False,ensurenl=False,encoding=utf-8"
            ]
        );
    }

    #[test]
    fn test_unavailable_tokenizer_always_fails() {
        let tokenizer = UnavailableTokenizer::new("pygmentize not installed");
        assert_eq!(
            tokenizer.tokenize("x", "js"),
            Err(HighlightError::Tokenizer("pygmentize not installed".into()))
        );
    }
}
