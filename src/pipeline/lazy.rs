//! Lazy-loading injector.
//!
//! Adds `loading="lazy"` to every `<img>` tag except above-the-fold
//! images: anything inside a `<header>` element, anything declaring
//! `fetchpriority="high"`, anything carrying the configured skip class,
//! and anything that already has a `loading` attribute (which also makes
//! the pass idempotent).

use crate::{
    config::SiteConfig,
    debug,
    page::{self, Page},
    pipeline::{Skipped, StageReport},
    utils::html::{Token, Tokenizer, attr, element_spans, has_class, parse_attributes},
};
use anyhow::Result;

/// Per-page image counts.
#[derive(Debug, Default, PartialEq)]
pub struct LazyCounts {
    /// Images that received `loading="lazy"`.
    pub added: usize,
    /// Images left untouched by a skip rule.
    pub skipped: usize,
}

impl LazyCounts {
    fn merge(&mut self, other: &LazyCounts) {
        self.added += other.added;
        self.skipped += other.skipped;
    }
}

/// Pipeline stage entry: rewrite every page of the output tree.
pub fn run(config: &SiteConfig) -> Result<StageReport> {
    let files = page::collect_html_files(config.output_dir(), &[])?;
    let mut report = StageReport::default();
    let mut totals = LazyCounts::default();

    for path in &files {
        report.scanned += 1;
        let mut page = match Page::read(path) {
            Ok(page) => page,
            Err(err) => {
                report.skipped.push(Skipped::new(
                    path.file_name().unwrap_or_default().to_string_lossy(),
                    err.to_string(),
                ));
                continue;
            }
        };

        let (rewritten, counts) = add_lazy_loading(&page.html, &config.lazy.skip_class);
        totals.merge(&counts);
        let Some(rewritten) = rewritten else {
            debug!("lazy"; "{} unchanged", page.file_name());
            continue;
        };

        page.html = rewritten;
        if let Err(err) = page.write() {
            report
                .skipped
                .push(Skipped::new(page.file_name(), err.to_string()));
            continue;
        }
        report.modified += 1;
    }

    debug!("lazy"; "{} images marked, {} left eager", totals.added, totals.skipped);
    Ok(report)
}

/// Add `loading="lazy"` to eligible images. `None` means no image needed
/// the attribute.
pub fn add_lazy_loading(html: &str, skip_class: &str) -> (Option<String>, LazyCounts) {
    let headers = element_spans(html, "header");
    let mut counts = LazyCounts::default();
    // Byte offsets right after each eligible tag name
    let mut insertions: Vec<usize> = Vec::new();

    for token in Tokenizer::new(html) {
        let Token::Open {
            name, attrs, span, ..
        } = token
        else {
            continue;
        };
        if !name.eq_ignore_ascii_case("img") {
            continue;
        }

        let parsed = parse_attributes(attrs);
        let eager = attr(&parsed, "loading").is_some()
            || attr(&parsed, "fetchpriority") == Some("high")
            || attr(&parsed, "class").is_some_and(|c| has_class(c, skip_class))
            || headers.iter().any(|h| h.contains(&span.start));

        if eager {
            counts.skipped += 1;
        } else {
            insertions.push(span.start + 1 + name.len());
            counts.added += 1;
        }
    }

    if insertions.is_empty() {
        return (None, counts);
    }

    const ATTR: &str = " loading=\"lazy\"";
    let mut out = String::with_capacity(html.len() + insertions.len() * ATTR.len());
    let mut pos = 0;
    for at in insertions {
        out.push_str(&html[pos..at]);
        out.push_str(ATTR);
        pos = at;
    }
    out.push_str(&html[pos..]);
    (Some(out), counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIP: &str = "profile-pic";

    #[test]
    fn test_adds_loading_attribute() {
        let html = r#"<body><img src="a.png" alt="A"></body>"#;
        let (out, counts) = add_lazy_loading(html, SKIP);
        assert_eq!(
            out.as_deref(),
            Some(r#"<body><img loading="lazy" src="a.png" alt="A"></body>"#)
        );
        assert_eq!(counts, LazyCounts { added: 1, skipped: 0 });
    }

    #[test]
    fn test_existing_loading_untouched() {
        let html = r#"<img src="a.png" loading="eager">"#;
        let (out, counts) = add_lazy_loading(html, SKIP);
        assert!(out.is_none());
        assert_eq!(counts.skipped, 1);
    }

    #[test]
    fn test_idempotent() {
        let html = r#"<img src="a.png"><img src="b.png">"#;
        let (once, _) = add_lazy_loading(html, SKIP);
        let once = once.unwrap();
        let (twice, counts) = add_lazy_loading(&once, SKIP);
        assert!(twice.is_none());
        assert_eq!(counts.skipped, 2);
    }

    #[test]
    fn test_fetchpriority_high_skipped() {
        let html = r#"<img src="hero.webp" fetchpriority="high">"#;
        let (out, counts) = add_lazy_loading(html, SKIP);
        assert!(out.is_none());
        assert_eq!(counts.skipped, 1);
    }

    #[test]
    fn test_skip_class() {
        let html = r#"<img src="me.jpg" class="round profile-pic">"#;
        let (out, _) = add_lazy_loading(html, SKIP);
        assert!(out.is_none());
    }

    #[test]
    fn test_header_images_stay_eager() {
        let html = r#"<header><img src="logo.svg"></header><main><img src="chart.png"></main>"#;
        let (out, counts) = add_lazy_loading(html, SKIP);
        assert_eq!(
            out.as_deref(),
            Some(
                r#"<header><img src="logo.svg"></header><main><img loading="lazy" src="chart.png"></main>"#
            )
        );
        assert_eq!(counts, LazyCounts { added: 1, skipped: 1 });
    }

    #[test]
    fn test_self_closing_and_uppercase() {
        let html = r#"<IMG SRC="a.png"/>"#;
        let (out, _) = add_lazy_loading(html, SKIP);
        assert_eq!(out.as_deref(), Some(r#"<IMG loading="lazy" SRC="a.png"/>"#));
    }

    #[test]
    fn test_no_images() {
        let (out, counts) = add_lazy_loading("<p>nur Text</p>", SKIP);
        assert!(out.is_none());
        assert_eq!(counts, LazyCounts::default());
    }
}
