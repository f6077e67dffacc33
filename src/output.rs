//! Output generation for rendered documents.
//!
//! This module renders the reference list, joins it to the document body, and
//! fills the page template used by the standalone build.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::frontmatter::FrontMatter;
use crate::refs::ReferenceMap;

/// Characters left as-is by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Subject used when front matter has neither `emailSubject` nor `title`.
pub const DEFAULT_EMAIL_SUBJECT: &str = "Blog Post";

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the reference list for one document.
///
/// # Arguments
///
/// * `references` - The document's reference map
/// * `heading` - Text of the list's `<h3>` heading
///
/// # Returns
///
/// An empty string for an empty map. Otherwise the heading followed by one
/// `<p id="refN">` line per entry, in ascending numeric order, each linking
/// to its URL in a new browsing context.
pub fn generate_references(references: &ReferenceMap, heading: &str) -> String {
    if references.is_empty() {
        return String::new();
    }

    let mut html = format!("<h3>{}</h3>\n", escape_html(heading));
    html.push_str("<div style=\"font-size: 12px; line-height: 1.6;\">\n");

    for (number, url) in references.iter() {
        let url = escape_html(url);
        html.push_str(&format!(
            "    <p id=\"ref{n}\">[{n}] <a href=\"{u}\" target=\"_blank\">{u}</a></p>\n",
            n = number,
            u = url
        ));
    }

    html.push_str("</div>");
    html
}

/// Generates the final output with the reference list appended.
///
/// # Arguments
///
/// * `content` - The rendered document body
/// * `references` - The rendered reference list (if any)
pub fn generate_output(content: &str, references: Option<&str>) -> String {
    let mut output = content.trim_end().to_string();

    if let Some(references) = references {
        if !references.is_empty() {
            output.push_str("\n\n");
            output.push_str(references);
        }
    }

    output.push('\n');
    output
}

/// Everything a page template can refer to.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    pub front_matter: &'a FrontMatter,
    pub content: &'a str,
    pub references: &'a str,
    pub cache_buster: &'a str,
}

/// Replaces the `{{...}}` placeholders of a page template.
///
/// Supported placeholders: `{{title}}` (defaults to `Untitled`),
/// `{{description}}`, `{{date}}`, `{{tags}}`, `{{content}}`,
/// `{{references}}`, `{{cache_buster}}` and `{{emailSubject}}`. Metadata
/// values are escaped; the email subject is percent-encoded for use in a
/// `mailto:` query; content and references are inserted as-is.
pub fn fill_template(template: &str, page: &Page<'_>) -> String {
    let front_matter = page.front_matter;

    let tags = front_matter
        .tags
        .iter()
        .map(|tag| format!("<span class=\"tag\">{}</span>", escape_html(tag)))
        .collect::<Vec<_>>()
        .join("\n                    ");

    let replacements = [
        (
            "{{title}}",
            escape_html(front_matter.title.as_deref().unwrap_or("Untitled")),
        ),
        (
            "{{description}}",
            escape_html(front_matter.description.as_deref().unwrap_or_default()),
        ),
        (
            "{{date}}",
            escape_html(front_matter.date.as_deref().unwrap_or_default()),
        ),
        ("{{tags}}", tags),
        ("{{emailSubject}}", email_subject(front_matter)),
        ("{{cache_buster}}", page.cache_buster.to_string()),
        ("{{references}}", page.references.to_string()),
        ("{{content}}", page.content.to_string()),
    ];

    // Content goes in last so placeholder-looking text inside it survives
    replacements
        .iter()
        .fold(template.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        })
}

/// `emailSubject`, else `title`, else [`DEFAULT_EMAIL_SUBJECT`], percent-encoded.
fn email_subject(front_matter: &FrontMatter) -> String {
    let subject = front_matter
        .email_subject
        .as_deref()
        .or(front_matter.title.as_deref())
        .unwrap_or(DEFAULT_EMAIL_SUBJECT);
    utf8_percent_encode(subject, URI_COMPONENT).to_string()
}
