//! Configuration loading
//!
//! `defaults/papertex.default.toml` is embedded into the binary so that the
//! documented defaults and the runtime behavior stay in sync. Callers layer
//! their own files and overrides on top via [`Loader`] before deserializing
//! into [`PapertexConfig`]. Each component converts the relevant section into
//! its options struct with `From<&PapertexConfig>`.

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

pub use ::config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../../defaults/papertex.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PapertexConfig {
    pub sanitize: SanitizeConfig,
    pub extract: ExtractConfig,
    pub render: RenderConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SanitizeConfig {
    pub max_blank_em: usize,
    pub ensure_enumitem: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub min_content_len: usize,
    pub max_strategies: usize,
    pub extra_boilerplate: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub max_depth: usize,
    pub wrap_paragraphs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub max_log_chars: usize,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer TOML text, e.g. read from stdin or embedded in a test.
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<PapertexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PapertexConfig, ConfigError> {
    Loader::new().build()
}
