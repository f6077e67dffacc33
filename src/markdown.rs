//! Citation marker scanner.
//!
//! Finds numeric citation markers such as `[1]`, `[1,2,3]` and `[2-4]` in
//! plain text and expands them into the reference numbers they cite.
//!
//! A bracket group immediately followed by `(` is a Markdown link
//! (`[1](http://x)`) and is never treated as a marker.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default upper bound on how many numbers a single range like `[1-40]` may expand to.
pub const DEFAULT_MAX_RANGE: u32 = 1000;

// Group 1: comma-separated numbers, optionally ending in a single `a-b` range.
// The `regex` crate has no lookahead, so the "not followed by `(`" rule is
// checked by hand in `CitationScanner::find_markers`.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+(?:,\d+)*(?:-\d+)?)\]").expect("citation marker pattern is valid")
});

/// A citation marker found in plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    /// Cited reference numbers, in the order they appear (ranges expanded)
    pub numbers: Vec<u32>,
    /// Start and end byte positions of the marker in the scanned text
    pub span: (usize, usize),
}

/// Scans text for citation markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationScanner {
    max_range: u32,
}

impl Default for CitationScanner {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_MAX_RANGE,
        }
    }
}

impl CitationScanner {
    /// Creates a scanner that refuses to expand ranges longer than `max_range`.
    pub fn new(max_range: u32) -> Self {
        Self { max_range }
    }

    /// Returns every citation marker in `text`, left to right, non-overlapping.
    ///
    /// Bracket groups that match the marker syntax but cannot be expanded
    /// (reversed range, oversized range, number too large) are skipped and
    /// stay in the text as written.
    pub fn find_markers(&self, text: &str) -> Vec<CitationMarker> {
        MARKER_RE
            .captures_iter(text)
            .filter_map(|cap| {
                let full_match = cap.get(0)?;
                if text[full_match.end()..].starts_with('(') {
                    return None;
                }
                let numbers = expand_marker(cap.get(1)?.as_str(), self.max_range)?;
                Some(CitationMarker {
                    numbers,
                    span: (full_match.start(), full_match.end()),
                })
            })
            .collect()
    }
}

/// Extracts all citation markers from the given text using the default range limit.
///
/// # Examples
///
/// ```
/// use citelink::extract_citation_markers;
///
/// let markers = extract_citation_markers("see [1,2,3] and [5]");
/// assert_eq!(markers.len(), 2);
/// assert_eq!(markers[0].numbers, vec![1, 2, 3]);
/// assert_eq!(markers[1].numbers, vec![5]);
///
/// // A real Markdown link is not a citation
/// assert!(extract_citation_markers("[1](http://x)").is_empty());
/// ```
pub fn extract_citation_markers(text: &str) -> Vec<CitationMarker> {
    CitationScanner::default().find_markers(text)
}

/// Expands the inside of a marker (`"1,2"`, `"1-4"`, `"1,3-5"`) into reference numbers.
///
/// A range element `a-b` becomes `a, a+1, ..., b` in place. Returns `None` when
/// the range is reversed (`4-1`), spans more than `max_range` numbers, or a
/// number does not fit in `u32`.
pub fn expand_marker(group: &str, max_range: u32) -> Option<Vec<u32>> {
    let mut numbers = Vec::new();

    for element in group.split(',') {
        let element = element.trim();
        match element.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start.trim().parse().ok()?;
                let end: u32 = end.trim().parse().ok()?;
                if end < start || end - start >= max_range {
                    return None;
                }
                numbers.extend(start..=end);
            }
            None => numbers.push(element.parse().ok()?),
        }
    }

    Some(numbers)
}
