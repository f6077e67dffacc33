//! Configuration loaded from `citelink.toml`.
//!
//! Every key is optional; a missing file means all defaults.

use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::markdown::{CitationScanner, DEFAULT_MAX_RANGE};
use crate::refs::DEFAULT_REFERENCES_HEADING;
use crate::rewriter::{CitationRewriter, DEFAULT_CITATION_CLASS};

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "citelink.toml";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub markdown: MarkdownOptions,
    pub citations: CitationOptions,
    pub references: ReferenceOptions,
}

/// Markdown parser switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownOptions {
    /// Pass raw HTML in the source through; when false it is escaped as text
    pub raw_html: bool,
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            raw_html: true,
            tables: true,
            footnotes: true,
            strikethrough: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CitationOptions {
    /// CSS class of inline citation anchors
    pub class: String,
    /// Longest range a marker like `[1-40]` may expand to
    pub max_range: u32,
}

impl Default for CitationOptions {
    fn default() -> Self {
        Self {
            class: DEFAULT_CITATION_CLASS.to_string(),
            max_range: DEFAULT_MAX_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceOptions {
    /// Heading of the generated reference list, also the `## ...` line
    /// stripped from documents that carry their own definitions
    pub heading: String,
}

impl Default for ReferenceOptions {
    fn default() -> Self {
        Self {
            heading: DEFAULT_REFERENCES_HEADING.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Loads `citelink.toml` from `dir`, or the defaults if there is none.
    ///
    /// A file that exists but is malformed is an error, never a silent
    /// fallback.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(dir.join(CONFIG_FILE_NAME)) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::IoError(e)),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The rewriter described by the `[citations]` table.
    pub fn citation_rewriter(&self) -> CitationRewriter {
        CitationRewriter::new(
            CitationScanner::new(self.citations.max_range),
            &self.citations.class,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.markdown.raw_html);
        assert_eq!(config.citations.class, "inline-ref");
        assert_eq!(config.citations.max_range, 1000);
        assert_eq!(config.references.heading, "References");
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        // Given: A config overriding one key per table
        let content = "[markdown]\nraw_html = false\n\n[citations]\nclass = \"cite\"\n";

        // When: We parse it
        let config = Config::from_toml_str(content).unwrap();

        // Then: Overrides apply and everything else is default
        assert!(!config.markdown.raw_html);
        assert!(config.markdown.tables);
        assert_eq!(config.citations.class, "cite");
        assert_eq!(config.citations.max_range, 1000);
        assert_eq!(config.references.heading, "References");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("[citations]\nclas = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlError(_)));
    }

    #[test]
    fn test_discover_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::discover(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_discover_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[references]\nheading = \"Sources\"\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.references.heading, "Sources");
    }

    #[test]
    fn test_discover_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[references\n").unwrap();

        assert!(Config::discover(dir.path()).is_err());
    }

    #[test]
    fn test_load_missing_path() {
        let err = Config::load(Path::new("/nonexistent/citelink.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
