//! Configuration loading
//!
//! `defaults/mcdeck.default.toml` is embedded into the crate. Callers layer their
//! own files and overrides on top through [`Loader`] before deserializing into
//! [`DeckConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

use crate::deck::formats::OutputVersion;

const DEFAULT_TOML: &str = include_str!("../../defaults/mcdeck.default.toml");

/// Top-level configuration for reading and writing decks.
///
/// There is no hard-coded default; [`load_defaults`] reads the embedded TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeckConfig {
    pub output: OutputConfig,
    pub linking: LinkingConfig,
    pub parsing: ParsingConfig,
}

impl DeckConfig {
    /// The configured output version
    pub fn output_version(&self) -> Result<OutputVersion, ConfigError> {
        self.output
            .version
            .parse()
            .map_err(|err: String| ConfigError::Message(err))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputConfig {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkingConfig {
    pub policy: LinkPolicy,
}

/// What a broken reference does to the deck being read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Fail with every broken link
    Strict,
    /// Log and keep going
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsingConfig {
    pub parallel: bool,
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

    /// Layer an optional configuration file, ignored if absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DeckConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DeckConfig, ConfigError> {
    Loader::new().build()
}
