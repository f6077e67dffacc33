//! Shared test documents and helpers for integration tests.

#![allow(dead_code)]

/// A standalone post: front matter, inline definitions and a references heading.
pub const STANDALONE_POST: &str = "---
title: AI Safety Benchmarks
description: A short survey
date: 2024-03-15
tags: [ai, evaluation]
---
Recent benchmarks [1-3] disagree with earlier results [5].

## References

[1]: https://a.example/one
[2]: https://b.example/two
[3]: https://c.example/three
[5]: https://e.example/five
";

/// A post whose references live in front matter, as the site build expects.
pub const FRONT_MATTER_POST: &str = "---
title: Notes
references:
  10: https://j.example
  2: https://b.example
---
See [2] and [10], but not [link](https://x.example).
";

/// Page template using every placeholder.
pub const TEMPLATE: &str = "<html><head><title>{{title}}</title>\
<link rel=\"stylesheet\" href=\"style.css?v={{cache_buster}}\"></head>\
<body><p class=\"meta\">{{date}}</p><div class=\"tags\">{{tags}}</div>\
<main>{{content}}</main><section>{{references}}</section>\
<a href=\"mailto:me@example.com?subject={{emailSubject}}\">Reply</a></body></html>\n";

/// Every `href="#refN"` number in `html`, in order of appearance.
pub fn citation_hrefs(html: &str) -> Vec<u32> {
    const NEEDLE: &str = "href=\"#ref";
    html.match_indices(NEEDLE)
        .map(|(i, _)| {
            let rest = &html[i + NEEDLE.len()..];
            let end = rest.find('"').unwrap();
            rest[..end].parse().unwrap()
        })
        .collect()
}
