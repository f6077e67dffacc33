//! Citation reference rewriter.
//!
//! Runs over the event stream produced by the Markdown parser and replaces
//! each citation marker found in inline text with one anchor per cited
//! reference: `<a href="#refN" class="inline-ref">[N]</a>`.
//!
//! Every other event passes through untouched and in its original order.
//! Text inside code blocks, links and images is left alone, since a marker
//! there is either literal code or would produce nested anchors.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::markdown::CitationScanner;
use crate::output::escape_html;

/// CSS class given to inline citation anchors unless configured otherwise.
pub const DEFAULT_CITATION_CLASS: &str = "inline-ref";

/// Rewrites citation markers in an event stream into anchor events.
#[derive(Debug, Clone)]
pub struct CitationRewriter {
    scanner: CitationScanner,
    /// Already HTML-escaped
    class: String,
}

impl Default for CitationRewriter {
    fn default() -> Self {
        Self::new(CitationScanner::default(), DEFAULT_CITATION_CLASS)
    }
}

impl CitationRewriter {
    pub fn new(scanner: CitationScanner, class: &str) -> Self {
        Self {
            scanner,
            class: escape_html(class),
        }
    }

    /// Rewrites a whole event stream.
    ///
    /// Each input event maps to one or more output events; the results are
    /// flattened in order. Adjacent text events are not merged here, so a
    /// marker split across two text events is not recognized; callers that
    /// parse with pulldown-cmark should wrap the parser in a
    /// `TextMergeStream` first.
    pub fn rewrite<'a, I>(&self, events: I) -> Vec<Event<'a>>
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        self.rewrite_with_citations(events).0
    }

    /// Like [`CitationRewriter::rewrite`], also returning every cited
    /// reference number in document order (repeats included).
    pub fn rewrite_with_citations<'a, I>(&self, events: I) -> (Vec<Event<'a>>, Vec<u32>)
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        let mut opaque_depth = 0usize;
        let mut cited = Vec::new();

        let rewritten = events
            .into_iter()
            .flat_map(|event| {
                match &event {
                    Event::Start(Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. }) => {
                        opaque_depth += 1;
                    }
                    Event::End(TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image) => {
                        opaque_depth = opaque_depth.saturating_sub(1);
                    }
                    _ => {}
                }

                match event {
                    Event::Text(text) if opaque_depth == 0 => self.splice_text(text, &mut cited),
                    other => vec![other],
                }
            })
            .collect();

        (rewritten, cited)
    }

    /// Rewrites the content of a single text event.
    ///
    /// Text without any marker comes back as the very same event.
    pub fn rewrite_text<'a>(&self, text: CowStr<'a>) -> Vec<Event<'a>> {
        self.splice_text(text, &mut Vec::new())
    }

    fn splice_text<'a>(&self, text: CowStr<'a>, cited: &mut Vec<u32>) -> Vec<Event<'a>> {
        let markers = self.scanner.find_markers(&text);
        if markers.is_empty() {
            return vec![Event::Text(text)];
        }

        let mut events = Vec::new();
        let mut last_end = 0;

        for marker in &markers {
            let (start, end) = marker.span;
            if start > last_end {
                events.push(Event::Text(slice_cow(&text, last_end, start)));
            }
            for &number in &marker.numbers {
                events.extend(self.citation_link(number));
            }
            cited.extend_from_slice(&marker.numbers);
            last_end = end;
        }

        if last_end < text.len() {
            events.push(Event::Text(slice_cow(&text, last_end, text.len())));
        }

        events
    }

    /// The three events making up one inline citation link.
    pub fn citation_link<'a>(&self, number: u32) -> [Event<'a>; 3] {
        [
            Event::InlineHtml(
                format!(r##"<a href="#ref{}" class="{}">"##, number, self.class).into(),
            ),
            Event::Text(format!("[{}]", number).into()),
            Event::InlineHtml(CowStr::Borrowed("</a>")),
        ]
    }
}

/// Rewrites an event stream with the default scanner and CSS class.
pub fn rewrite_citations<'a, I>(events: I) -> Vec<Event<'a>>
where
    I: IntoIterator<Item = Event<'a>>,
{
    CitationRewriter::default().rewrite(events)
}

fn slice_cow<'a>(text: &CowStr<'a>, start: usize, end: usize) -> CowStr<'a> {
    match text {
        CowStr::Borrowed(s) => {
            let s: &'a str = *s;
            CowStr::Borrowed(&s[start..end])
        }
        other => CowStr::from(other[start..end].to_string()),
    }
}
