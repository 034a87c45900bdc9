//! Configuration for the highlighting pass and the CLI.
//!
//! Every required key has a value in `defaults/highlight.default.toml`, which is compiled
//! in. Sources stacked on a [`Loader`] are read in order, the last one winning per key, and
//! the merged result is checked and deserialized into [`HighlightConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/highlight.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub highlight: HighlightDefaults,
    pub tokenizer: TokenizerConfig,
    pub output: OutputConfig,
}

/// Document-wide fallbacks used when an element says nothing about itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HighlightDefaults {
    #[serde(default)]
    pub default_language: Option<String>,
    pub line_numbers: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub program: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub include_styles: bool,
}

/// Stack of configuration sources over the compiled-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder()
                .add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Stack a TOML file that must exist (`--config`).
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Stack a TOML file if there is one, such as a per-project settings file.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(required));
        self
    }

    /// Set one dotted key, e.g. `highlight.line_numbers`. Overrides beat every file.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<HighlightConfig, ConfigError> {
        let config: HighlightConfig = self.builder.build()?.try_deserialize()?;
        if config.tokenizer.program.trim().is_empty() {
            return Err(ConfigError::Message(
                "tokenizer.program must name a program".to_string(),
            ));
        }
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The compiled-in defaults alone.
pub fn load_defaults() -> Result<HighlightConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.highlight.default_language, None);
        assert!(!config.highlight.line_numbers);
        assert_eq!(config.tokenizer.program, "pygmentize");
        assert!(config.output.include_styles);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("highlight.default_language", "js")
            .expect("override to apply")
            .set_override("highlight.line_numbers", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.highlight.default_language.as_deref(), Some("js"));
        assert!(config.highlight.line_numbers);
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[tokenizer]\nprogram = \"/opt/pygments/bin/pygmentize\"").unwrap();

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.tokenizer.program, "/opt/pygments/bin/pygmentize");
        assert!(config.output.include_styles);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Loader::new()
            .with_optional_file(dir.path().join("absent.toml"))
            .build()
            .expect("config to build");
        assert_eq!(config.tokenizer.program, "pygmentize");
    }

    #[test]
    fn empty_tokenizer_program_is_rejected() {
        let result = Loader::new()
            .set_override("tokenizer.program", "  ")
            .expect("override to apply")
            .build();
        assert!(matches!(result, Err(ConfigError::Message(_))));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = Loader::new().with_file(dir.path().join("absent.toml")).build();
        assert!(result.is_err());
    }
}
