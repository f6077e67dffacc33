//! Markdown to HTML rendering with citation links.
//!
//! Two document pipelines share one renderer:
//!
//! - [`render_document`] takes references from front matter (plus any extra
//!   map the caller supplies) and leaves the Markdown body as written.
//! - [`build_document`] is the standalone path: `[N]: URL` definition lines
//!   in the body become the reference map and are stripped before rendering,
//!   along with the `## References` heading.
//!
//! All settings reach the renderer through an explicit [`BuildContext`].

use log::{debug, warn};
use pulldown_cmark::{html, Event, Options, Parser, TextMergeStream};
use sha2::{Digest, Sha256};

use crate::config::{Config, MarkdownOptions};
use crate::frontmatter::{parse_front_matter, FrontMatter, FrontMatterError};
use crate::output::generate_references;
use crate::refs::{extract_references, strip_reference_definitions, ReferenceMap};
use crate::rewriter::CitationRewriter;

/// Settings for one build, passed to every render call.
#[derive(Debug, Clone)]
pub struct BuildContext {
    config: Config,
    rewriter: CitationRewriter,
    cache_buster: String,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl BuildContext {
    pub fn new(config: Config) -> Self {
        let rewriter = config.citation_rewriter();
        Self {
            config,
            rewriter,
            cache_buster: String::new(),
        }
    }

    /// Derives the cache-busting token from `seed` (typically the template).
    pub fn with_cache_buster_seed(mut self, seed: &[u8]) -> Self {
        self.cache_buster = cache_buster(seed);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rewriter(&self) -> &CitationRewriter {
        &self.rewriter
    }

    pub fn cache_buster(&self) -> &str {
        &self.cache_buster
    }
}

/// First eight hex digits of the SHA-256 of `seed`.
pub fn cache_buster(seed: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(seed));
    digest[..8].to_string()
}

/// A rendered document and what went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub front_matter: FrontMatter,
    /// Body HTML with citation markers turned into links
    pub content: String,
    /// Reference list HTML, empty when the document has no references
    pub references_html: String,
    pub references: ReferenceMap,
    /// Cited numbers in document order, repeats included
    pub citations: Vec<u32>,
}

fn parser_options(options: &MarkdownOptions) -> Options {
    let mut parser_options = Options::empty();
    if options.tables {
        parser_options.insert(Options::ENABLE_TABLES);
    }
    if options.footnotes {
        parser_options.insert(Options::ENABLE_FOOTNOTES);
    }
    if options.strikethrough {
        parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    parser_options
}

/// Renders Markdown to HTML, rewriting citation markers into links.
///
/// # Examples
///
/// ```
/// use citelink::{render_markdown, BuildContext};
///
/// let html = render_markdown("see [1-2]", &BuildContext::default());
/// assert_eq!(
///     html,
///     "<p>see <a href=\"#ref1\" class=\"inline-ref\">[1]</a><a href=\"#ref2\" class=\"inline-ref\">[2]</a></p>\n"
/// );
/// ```
pub fn render_markdown(markdown: &str, ctx: &BuildContext) -> String {
    render_with_citations(markdown, ctx).0
}

fn render_with_citations(markdown: &str, ctx: &BuildContext) -> (String, Vec<u32>) {
    let raw_html = ctx.config().markdown.raw_html;
    let parser = Parser::new_ext(markdown, parser_options(&ctx.config().markdown));

    // Source HTML is demoted to text before rewriting so citation anchors,
    // which are themselves inline HTML, are never escaped.
    let events = parser.map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) if !raw_html => Event::Text(raw),
        other => other,
    });

    let (events, cited) = ctx.rewriter().rewrite_with_citations(TextMergeStream::new(events));

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    (out, cited)
}

/// Renders a document whose references come from front matter.
///
/// `extra_references` is overlaid on the front matter map; its entries win.
///
/// # Errors
///
/// Returns an error if the front matter block is malformed.
pub fn render_document(
    source: &str,
    extra_references: Option<&ReferenceMap>,
    ctx: &BuildContext,
) -> Result<RenderedDocument, FrontMatterError> {
    let (front_matter, body) = parse_front_matter(source)?;

    let mut references = front_matter.references.clone().unwrap_or_default();
    if let Some(extra) = extra_references {
        references.merge(extra.clone());
    }

    Ok(finish(front_matter, body, references, ctx))
}

/// Renders a document that defines its references inline as `[N]: URL` lines.
///
/// Definitions override front matter entries with the same number. The
/// definition lines and the `## References` heading are removed before
/// rendering so the generated list is the only one on the page.
///
/// # Errors
///
/// Returns an error if the front matter block is malformed.
pub fn build_document(
    source: &str,
    ctx: &BuildContext,
) -> Result<RenderedDocument, FrontMatterError> {
    let (front_matter, body) = parse_front_matter(source)?;

    let mut references = front_matter.references.clone().unwrap_or_default();
    references.merge(extract_references(body));
    let body = strip_reference_definitions(body, &ctx.config().references.heading);

    Ok(finish(front_matter, &body, references, ctx))
}

fn finish(
    front_matter: FrontMatter,
    body: &str,
    references: ReferenceMap,
    ctx: &BuildContext,
) -> RenderedDocument {
    let (content, citations) = render_with_citations(body, ctx);

    let missing = references.missing(&citations);
    if !missing.is_empty() {
        warn!("citations without a reference entry: {:?}", missing);
    }
    debug!(
        "rendered {} citation(s) against {} reference(s)",
        citations.len(),
        references.len()
    );

    let references_html = generate_references(&references, &ctx.config().references.heading);

    RenderedDocument {
        front_matter,
        content,
        references_html,
        references,
        citations,
    }
}
