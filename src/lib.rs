//! citelink: numeric citation links for Markdown documents.
//!
//! This library provides functionality to:
//! - Find citation markers like `[1,2]` and `[3-5]` in Markdown text
//! - Rewrite them into in-page anchors while rendering Markdown to HTML
//! - Load reference maps from front matter, files or `[N]: URL` definitions
//! - Render the matching reference list and fill a page template
//! - Patch `href="undefined"` citation anchors in already-rendered HTML

pub mod config;
pub mod frontmatter;
pub mod markdown;
pub mod output;
pub mod patch;
pub mod refs;
pub mod render;
pub mod rewriter;

pub use config::Config;
pub use frontmatter::{parse_front_matter, split_front_matter, FrontMatter};
pub use markdown::{extract_citation_markers, CitationMarker, CitationScanner};
pub use output::{fill_template, generate_output, generate_references, Page};
pub use patch::{is_html_output, patch_undefined_anchors, patch_undefined_anchors_with_class};
pub use refs::{extract_references, load_refs, strip_reference_definitions, ReferenceMap};
pub use render::{build_document, render_document, render_markdown, BuildContext, RenderedDocument};
pub use rewriter::{rewrite_citations, CitationRewriter};
