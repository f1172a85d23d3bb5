//! Configuration loading
//!
//! `defaults/sfm.default.toml` is embedded into the crate so documented and
//! runtime defaults cannot drift apart. Applications layer user files and
//! single-key overrides on top with [`Loader`] before deserializing into
//! [`SfmConfig`].

use super::assembling::Dialect;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../../defaults/sfm.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfmConfig {
    pub assembly: AssemblyConfig,
    pub esfm: EsfmConfig,
}

/// Knobs for the line assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    pub dialect: Dialect,
    pub fallback_marker: String,
    pub ignored_markers: Vec<String>,
}

/// Knobs for the ESFM tag preprocessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsfmConfig {
    pub semantic_categories: String,
    pub strongs_marker: char,
    pub strongs_categories: String,
    pub word_punctuation: String,
    pub dash_characters: String,
    pub untagged_markers: Vec<String>,
}

impl AssemblyConfig {
    pub fn is_ignored(&self, marker: &str) -> bool {
        self.ignored_markers.iter().any(|m| m == marker)
    }
}

impl EsfmConfig {
    pub fn is_semantic_category(&self, category: char) -> bool {
        self.semantic_categories.contains(category)
    }

    pub fn is_strongs_category(&self, category: char) -> bool {
        self.strongs_categories.contains(category)
    }

    pub fn is_word_punctuation(&self, c: char) -> bool {
        self.word_punctuation.contains(c)
    }

    pub fn is_dash(&self, c: char) -> bool {
        self.dash_characters.contains(c)
    }

    pub fn is_untagged(&self, marker: &str) -> bool {
        self.untagged_markers.iter().any(|m| m == marker)
    }
}

impl Default for SfmConfig {
    fn default() -> Self {
        SfmConfig {
            assembly: AssemblyConfig {
                dialect: Dialect::Usfm,
                fallback_marker: "rem".to_string(),
                ignored_markers: vec!["restore".to_string()],
            },
            esfm: EsfmConfig::default(),
        }
    }
}

impl Default for EsfmConfig {
    fn default() -> Self {
        EsfmConfig {
            semantic_categories: "AGLOPQT".to_string(),
            strongs_marker: 'S',
            strongs_categories: "HG".to_string(),
            word_punctuation: ".,:;!?'\"()[]<>/|«»‘’“”".to_string(),
            dash_characters: "-–—".to_string(),
            untagged_markers: [
                "id", "ide", "h", "h1", "h2", "h3", "toc1", "toc2", "toc3", "rem", "sts", "usfm",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
        }
    }
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

    /// Layer an optional configuration file, skipped when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `assembly.dialect` from a CLI flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SfmConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<SfmConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config, SfmConfig::default());
    }

    #[test]
    fn test_override_dialect() {
        let config = Loader::new()
            .set_override("assembly.dialect", "esfm")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.assembly.dialect, Dialect::Esfm);
    }

    #[test]
    fn test_user_file_layers_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[esfm]\nsemantic_categories = \"GP\"").unwrap();
        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.esfm.semantic_categories, "GP");
        assert_eq!(config.esfm.strongs_categories, "HG");
        assert_eq!(config.assembly.fallback_marker, "rem");
    }

    #[test]
    fn test_missing_required_file_is_an_error() {
        let result = Loader::new().with_file("/nonexistent/sfm.toml").build();
        assert!(result.is_err());
        let config = Loader::new()
            .with_optional_file("/nonexistent/sfm.toml")
            .build()
            .unwrap();
        assert!(config.esfm.is_untagged("id"));
        assert!(config.assembly.is_ignored("restore"));
    }

    #[test]
    fn test_character_classes() {
        let esfm = EsfmConfig::default();
        assert!(esfm.is_semantic_category('G'));
        assert!(!esfm.is_semantic_category('S'));
        assert!(esfm.is_strongs_category('H'));
        assert!(esfm.is_word_punctuation(','));
        assert!(esfm.is_dash('—'));
    }
}
