//! YAML front matter.
//!
//! A document may start with a `---` line, a YAML block, and a closing `---`
//! line. The block carries page metadata and, optionally, the document's
//! reference map under `references`.

use serde::Deserialize;
use thiserror::Error;

use crate::refs::ReferenceMap;

/// Errors that can occur when reading front matter.
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Invalid front matter: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Page metadata read from the front matter block.
///
/// Unknown keys (layout, permalink, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub tags: Vec<String>,
    /// Subject line for the page's mailto link; falls back to the title
    #[serde(rename = "emailSubject")]
    pub email_subject: Option<String>,
    /// Reference number to URL
    pub references: Option<ReferenceMap>,
}

/// Splits a leading front matter block from the document body.
///
/// Returns `(Some(yaml), body)` when the document starts with a `---` line
/// that is later closed by another `---` line, and `(None, source)` otherwise.
pub fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let mut lines = source.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (None, source);
    };
    if first.trim_end() != "---" {
        return (None, source);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if line.trim_end() == "---" {
            return (
                Some(&source[yaml_start..offset]),
                &source[offset + line.len()..],
            );
        }
        offset += line.len();
    }

    (None, source)
}

/// Parses the front matter of a document, returning it with the body.
///
/// A document without front matter yields `FrontMatter::default()`.
///
/// # Errors
///
/// Returns an error if the front matter block is not valid YAML or does not
/// fit [`FrontMatter`].
pub fn parse_front_matter(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    match split_front_matter(source) {
        (Some(yaml), body) if !yaml.trim().is_empty() => Ok((serde_yaml::from_str(yaml)?, body)),
        (_, body) => Ok((FrontMatter::default(), body)),
    }
}
