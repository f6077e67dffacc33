//! Reference maps: loading, extraction and definition stripping.
//!
//! A reference map ties each reference number to the URL it points at. It can
//! come from front matter, from a standalone file, or from `[N]: URL`
//! definition lines written in the document body.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Heading removed by [`strip_reference_definitions`] unless configured otherwise.
pub const DEFAULT_REFERENCES_HEADING: &str = "References";

// Up to three spaces of indent, like a CommonMark link reference definition;
// four or more is an indented code block.
static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^ {0,3}\[(\d+)\]:\s*(.+)$").expect("reference definition pattern is valid")
});

/// Errors that can occur when loading references.
#[derive(Error, Debug)]
pub enum RefsError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid reference number '{0}': keys must be non-negative integers")]
    InvalidKey(String),
}

/// Reference number to URL, iterated in ascending numeric order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HashMap<RawKey, String>")]
pub struct ReferenceMap {
    entries: BTreeMap<u32, String>,
}

/// A map key as written in YAML (`1:`) or JSON (`"1":`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
enum RawKey {
    Number(u64),
    Text(String),
}

impl TryFrom<HashMap<RawKey, String>> for ReferenceMap {
    type Error = RefsError;

    fn try_from(raw: HashMap<RawKey, String>) -> Result<Self, Self::Error> {
        let mut map = ReferenceMap::new();
        for (key, url) in raw {
            let number = match &key {
                RawKey::Number(n) => u32::try_from(*n).ok(),
                RawKey::Text(s) => s.trim().parse::<u32>().ok(),
            }
            .ok_or_else(|| {
                RefsError::InvalidKey(match key {
                    RawKey::Number(n) => n.to_string(),
                    RawKey::Text(s) => s,
                })
            })?;
            map.insert(number, url);
        }
        Ok(map)
    }
}

impl FromIterator<(u32, String)> for ReferenceMap {
    fn from_iter<T: IntoIterator<Item = (u32, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `url` under `number`, returning the URL it replaced.
    pub fn insert(&mut self, number: u32, url: impl Into<String>) -> Option<String> {
        self.entries.insert(number, url.into())
    }

    /// The URL for `number`, or `None` when the document never defined it.
    pub fn get(&self, number: u32) -> Option<&str> {
        self.entries.get(&number).map(String::as_str)
    }

    pub fn contains(&self, number: u32) -> bool {
        self.entries.contains_key(&number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending numeric order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(n, url)| (*n, url.as_str()))
    }

    /// Overlays `other` on top of this map; entries from `other` win.
    pub fn merge(&mut self, other: ReferenceMap) {
        self.entries.extend(other.entries);
    }

    /// Cited numbers that have no entry, sorted and deduplicated.
    pub fn missing(&self, cited: &[u32]) -> Vec<u32> {
        let mut missing: Vec<u32> = cited
            .iter()
            .copied()
            .filter(|n| !self.contains(*n))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }
}

/// Loads a reference map from a file.
///
/// # Arguments
///
/// * `path` - Path to the references file
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if it holds a JSON object
/// that is malformed or has non-numeric keys.
pub fn load_refs(path: &Path) -> Result<ReferenceMap, RefsError> {
    let content = fs::read_to_string(path)?;
    parse_refs(&content)
}

/// Parses reference file content.
///
/// Supports two input formats:
/// - JSON object: `{"1": "https://a", "2": "https://b"}`
/// - Definition lines: `[1]: https://a`, one per line
fn parse_refs(content: &str) -> Result<ReferenceMap, RefsError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Ok(ReferenceMap::new());
    }

    if trimmed.starts_with('{') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    Ok(extract_references(content))
}

/// Collects every `[N]: URL` definition line in the document.
///
/// A number defined twice keeps its last URL.
///
/// # Examples
///
/// ```
/// use citelink::extract_references;
///
/// let refs = extract_references("Body [1].\n\n[1]: https://a.example\n[2]: https://b.example\n");
/// assert_eq!(refs.get(1), Some("https://a.example"));
/// assert_eq!(refs.len(), 2);
/// ```
pub fn extract_references(markdown: &str) -> ReferenceMap {
    let mut references = ReferenceMap::new();

    for cap in DEFINITION_RE.captures_iter(markdown) {
        let number = &cap[1];
        let url = cap[2].trim();
        if url.is_empty() {
            continue;
        }
        match number.parse::<u32>() {
            Ok(n) => {
                references.insert(n, url);
            }
            Err(_) => warn!("skipping reference definition [{}]: number too large", number),
        }
    }

    references
}

/// Removes `[N]: URL` definition lines and the first `## <heading>` line.
///
/// Only the heading line itself goes; whatever follows it stays in the
/// document. The result is trimmed.
pub fn strip_reference_definitions(markdown: &str, heading: &str) -> String {
    let cleaned = DEFINITION_RE.replace_all(markdown, "");

    let mut result = String::with_capacity(cleaned.len());
    let mut heading_removed = false;
    for line in cleaned.split_inclusive('\n') {
        if !heading_removed && is_references_heading(line, heading) {
            heading_removed = true;
            continue;
        }
        result.push_str(line);
    }

    result.trim().to_string()
}

fn is_references_heading(line: &str, heading: &str) -> bool {
    line.strip_prefix("##")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map_or(false, |rest| rest.trim() == heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Helper to create a temporary file with content
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    // --- ReferenceMap ---

    #[test]
    fn test_map_iterates_numerically() {
        let map: ReferenceMap = vec![
            (10, "j".to_string()),
            (2, "b".to_string()),
            (1, "a".to_string()),
        ]
        .into_iter()
        .collect();

        let keys: Vec<u32> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(keys, vec![1, 2, 10]);
    }

    #[test]
    fn test_map_absent_entry_is_none() {
        let mut map = ReferenceMap::new();
        map.insert(1, "https://a");
        assert_eq!(map.get(1), Some("https://a"));
        assert_eq!(map.get(2), None);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = ReferenceMap::new();
        base.insert(1, "old");
        base.insert(2, "keep");
        let mut overlay = ReferenceMap::new();
        overlay.insert(1, "new");

        base.merge(overlay);

        assert_eq!(base.get(1), Some("new"));
        assert_eq!(base.get(2), Some("keep"));
    }

    #[test]
    fn test_missing_sorted_and_deduplicated() {
        let mut map = ReferenceMap::new();
        map.insert(2, "b");
        assert_eq!(map.missing(&[5, 2, 1, 5]), vec![1, 5]);
    }

    #[test]
    fn test_deserialize_json_string_keys() {
        let map: ReferenceMap =
            serde_json::from_str(r#"{"2": "http://b", "1": "http://a"}"#).unwrap();
        assert_eq!(map.get(1), Some("http://a"));
        assert_eq!(map.get(2), Some("http://b"));
    }

    #[test]
    fn test_deserialize_yaml_integer_keys() {
        let map: ReferenceMap = serde_yaml::from_str("1: http://a\n12: http://l\n").unwrap();
        assert_eq!(map.get(12), Some("http://l"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_deserialize_rejects_non_numeric_key() {
        let result: Result<ReferenceMap, _> = serde_json::from_str(r#"{"smith": "http://a"}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("smith"), "{}", err);
    }

    // --- load_refs ---

    #[test]
    fn test_load_refs_json_object() {
        // Given: a file containing a JSON object of references
        let file = create_temp_file(r#"{"1": "https://a.example", "3": "https://c.example"}"#);

        // When: we load the references
        let refs = load_refs(file.path()).unwrap();

        // Then: both entries are present
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.get(3), Some("https://c.example"));
    }

    #[test]
    fn test_load_refs_definition_lines() {
        // Given: a file of definition lines
        let file = create_temp_file("[1]: https://a.example\n[2]: https://b.example\n");

        // When: we load the references
        let refs = load_refs(file.path()).unwrap();

        // Then: both definitions are read
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.get(2), Some("https://b.example"));
    }

    #[test]
    fn test_load_refs_file_not_found() {
        let path = Path::new("/nonexistent/path/refs.json");

        let err = load_refs(path).unwrap_err();

        assert!(matches!(err, RefsError::IoError(_)));
    }

    #[test]
    fn test_load_refs_invalid_json() {
        let file = create_temp_file(r#"{"1": "https://a", invalid"#);

        let err = load_refs(file.path()).unwrap_err();

        assert!(matches!(err, RefsError::JsonError(_)));
    }

    #[test]
    fn test_load_refs_empty_file() {
        let file = create_temp_file("");
        assert!(load_refs(file.path()).unwrap().is_empty());
    }

    // --- extract_references ---

    #[test]
    fn test_extract_last_definition_wins() {
        let refs = extract_references("[1]: https://first\n[1]: https://second\n");
        assert_eq!(refs.get(1), Some("https://second"));
    }

    #[test]
    fn test_extract_trims_url() {
        let refs = extract_references("[4]:    https://d.example   \r\n");
        assert_eq!(refs.get(4), Some("https://d.example"));
    }

    #[test]
    fn test_extract_ignores_code_indent_and_inline_definitions() {
        let refs = extract_references("    [1]: https://code\ntext [2]: https://inline\n");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_extract_accepts_small_indent() {
        // Given: Definitions indented by one to three spaces
        let markdown = " [1]: https://one\n  [2]: https://two\n   [3]: https://three\n";

        // When: We extract them
        let refs = extract_references(markdown);

        // Then: All three are read
        assert_eq!(refs.len(), 3);
        assert_eq!(refs.get(2), Some("https://two"));
    }

    #[test]
    fn test_extract_skips_oversized_number() {
        let refs = extract_references("[99999999999]: https://x\n[1]: https://a\n");
        assert_eq!(refs.len(), 1);
    }

    // --- strip_reference_definitions ---

    #[test]
    fn test_strip_removes_definitions_and_heading() {
        // Given: a document with a references section
        let markdown = "Intro [1].\n\n## References\n\n[1]: https://a.example\n";

        // When: we strip it
        let stripped = strip_reference_definitions(markdown, DEFAULT_REFERENCES_HEADING);

        // Then: only the body remains
        assert_eq!(stripped, "Intro [1].");
    }

    #[test]
    fn test_strip_removes_indented_definitions() {
        let stripped =
            strip_reference_definitions("Body [1].\n\n  [1]: http://x\n", DEFAULT_REFERENCES_HEADING);
        assert_eq!(stripped, "Body [1].");
    }

    #[test]
    fn test_strip_keeps_content_after_heading() {
        let markdown = "Intro.\n\n## References\n\nA closing note.\n\n[1]: https://a\n";

        let stripped = strip_reference_definitions(markdown, DEFAULT_REFERENCES_HEADING);

        assert!(!stripped.contains("## References"));
        assert!(stripped.contains("A closing note."));
    }

    #[test]
    fn test_strip_only_first_heading() {
        let markdown = "## References\n\ntext\n\n## References\n";

        let stripped = strip_reference_definitions(markdown, DEFAULT_REFERENCES_HEADING);

        assert_eq!(stripped, "text\n\n## References");
    }

    #[test]
    fn test_strip_ignores_other_heading_levels() {
        let markdown = "### References\n# References\n";

        let stripped = strip_reference_definitions(markdown, DEFAULT_REFERENCES_HEADING);

        assert_eq!(stripped, "### References\n# References");
    }

    #[test]
    fn test_strip_custom_heading() {
        let stripped = strip_reference_definitions("a\n##  Sources  \nb", "Sources");
        assert_eq!(stripped, "a\nb");
    }
}
