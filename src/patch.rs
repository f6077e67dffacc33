//! Post-render anchor patch.
//!
//! Some rendering paths leave citation anchors whose target never resolved,
//! written out as `<a href="undefined">3</a>`. This pass turns them back into
//! proper citation links on the final HTML string.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::output::escape_html;
use crate::rewriter::DEFAULT_CITATION_CLASS;

static UNDEFINED_ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<a href="undefined">(\d+)</a>"#).expect("undefined anchor pattern is valid")
});

/// Replaces every `<a href="undefined">N</a>` with
/// `<a href="#refN" class="inline-ref">[N]</a>`.
///
/// Running it again on its own output changes nothing.
///
/// # Examples
///
/// ```
/// use citelink::patch_undefined_anchors;
///
/// let fixed = patch_undefined_anchors(r#"<a href="undefined">7</a>"#);
/// assert_eq!(fixed, r##"<a href="#ref7" class="inline-ref">[7]</a>"##);
/// ```
pub fn patch_undefined_anchors(html: &str) -> String {
    patch_undefined_anchors_with_class(html, DEFAULT_CITATION_CLASS)
}

/// Like [`patch_undefined_anchors`], giving the fixed anchors `class`
/// so they match the citation links written by a configured rewriter.
pub fn patch_undefined_anchors_with_class(html: &str, class: &str) -> String {
    let class = escape_html(class);
    UNDEFINED_ANCHOR_RE
        .replace_all(html, |caps: &Captures| {
            format!(r##"<a href="#ref{n}" class="{c}">[{n}]</a>"##, n = &caps[1], c = class)
        })
        .into_owned()
}

/// Whether a path names an HTML document (`.html` or `.htm`, any case).
pub fn is_html_output(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
        })
}
