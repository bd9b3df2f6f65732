//! Knowledge-base generator.
//!
//! Crawls all content pages, extracts boilerplate-free text, headings,
//! sections and frequency-ranked keywords, and serializes a page corpus
//! plus an inverted keyword → page-position index for the chat-assistant
//! backend. Both artifacts are rebuilt wholesale on every run; the index
//! holds positional references into the page array, so it is never
//! updated incrementally.

pub mod keywords;

use crate::{
    config::SiteConfig,
    debug,
    logger::ProgressLine,
    page::{
        self, Page,
        extract::{self, ExtractLimits, Heading, PageKind, Section},
    },
    pipeline::{Skipped, StageReport},
    utils::date::DateTimeUtc,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs};

/// One indexed page of the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgePage {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub kind: PageKind,
    pub headings: Vec<Heading>,
    pub sections: Vec<Section>,
    pub text: String,
    pub keywords: Vec<String>,
    pub indexed_at: String,
}

/// Generation statistics embedded in the artifact.
#[derive(Debug, Default, Serialize)]
pub struct KnowledgeStats {
    pub pages: usize,
    pub keywords: usize,
    pub skipped: Vec<Skipped>,
}

/// The serialized knowledge base.
#[derive(Debug, Serialize)]
pub struct KnowledgeBase {
    pub generated_at: String,
    pub stats: KnowledgeStats,
    pub pages: Vec<KnowledgePage>,
    /// Inverted index: keyword → positions in `pages`.
    pub index: BTreeMap<String, Vec<usize>>,
}

/// Pipeline stage entry: build the corpus and write both artifacts.
pub fn run(config: &SiteConfig) -> Result<StageReport> {
    let (kb, report) = build(config)?;

    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let pretty_path = data_dir.join(&config.knowledge.output);
    fs::write(&pretty_path, serde_json::to_string_pretty(&kb)?)
        .with_context(|| format!("failed to write {}", pretty_path.display()))?;

    let min_path = data_dir.join(&config.knowledge.output_min);
    fs::write(&min_path, serde_json::to_string(&kb)?)
        .with_context(|| format!("failed to write {}", min_path.display()))?;

    Ok(report)
}

/// Crawl the output tree and build the knowledge base.
pub fn build(config: &SiteConfig) -> Result<(KnowledgeBase, StageReport)> {
    let files = page::collect_html_files(config.output_dir(), &config.knowledge.exclude)?;
    let limits = ExtractLimits::from(&config.knowledge);
    let generated_at = DateTimeUtc::now().to_rfc3339();

    let progress = ProgressLine::new(&[("pages", files.len())]);

    // Per-file isolation: one bad page lands in the skip list, the rest
    // of the crawl continues. Order of `files` is preserved.
    let results: Vec<Result<Option<KnowledgePage>, Skipped>> = files
        .par_iter()
        .map(|path| {
            let result = index_page(path, config, &limits, &generated_at);
            progress.inc("pages");
            result
        })
        .collect();
    progress.finish();

    let mut report = StageReport {
        scanned: files.len(),
        ..StageReport::default()
    };
    let mut pages = Vec::new();
    for result in results {
        match result {
            Ok(Some(page)) => pages.push(page),
            Ok(None) => {}
            Err(skip) => report.skipped.push(skip),
        }
    }
    report.modified = pages.len();

    let index = build_index(&pages);
    let stats = KnowledgeStats {
        pages: pages.len(),
        keywords: index.len(),
        skipped: report.skipped.clone(),
    };

    let kb = KnowledgeBase {
        generated_at,
        stats,
        pages,
        index,
    };
    Ok((kb, report))
}

/// Index a single page. `Ok(None)` means the page has too little text.
fn index_page(
    path: &std::path::Path,
    config: &SiteConfig,
    limits: &ExtractLimits,
    generated_at: &str,
) -> Result<Option<KnowledgePage>, Skipped> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let page = Page::read(path).map_err(|err| Skipped::new(&file_name, err.to_string()))?;
    let extracted = extract::extract(&page.slug, &page.html, limits)
        .map_err(|err| Skipped::new(&file_name, err.to_string()))?;

    // Pages with too little content are dropped, not reported
    if extracted.text.chars().count() <= config.knowledge.min_text {
        debug!("knowledge"; "{} below text minimum, dropped", file_name);
        return Ok(None);
    }

    let keywords = keywords::extract_keywords(
        &extracted.title,
        &extracted.text,
        &page.slug,
        config.knowledge.max_keywords,
    );

    Ok(Some(KnowledgePage {
        slug: page.slug,
        title: extracted.title,
        description: extracted.description,
        kind: extracted.kind,
        headings: extracted.headings,
        sections: extracted.sections,
        text: extracted.text,
        keywords,
        indexed_at: generated_at.to_string(),
    }))
}

/// Build the inverted index: every page keyword plus every title word of
/// at least three letters maps to the page's position. Positions are
/// deduplicated per keyword.
fn build_index(pages: &[KnowledgePage]) -> BTreeMap<String, Vec<usize>> {
    let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();

    for (position, page) in pages.iter().enumerate() {
        let mut terms = page.keywords.clone();
        terms.extend(keywords::title_words(&page.title));

        for term in terms {
            let positions = index.entry(term).or_default();
            if positions.last() != Some(&position) {
                positions.push(position);
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb_page(slug: &str, title: &str, keywords: &[&str]) -> KnowledgePage {
        KnowledgePage {
            slug: slug.to_string(),
            title: title.to_string(),
            description: String::new(),
            kind: PageKind::Page,
            headings: vec![],
            sections: vec![],
            text: String::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            indexed_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_index_positions() {
        let pages = vec![
            kb_page("a", "Alpha", &["webdesign", "kassel"]),
            kb_page("b", "Beta", &["webdesign"]),
        ];
        let index = build_index(&pages);

        assert_eq!(index["webdesign"], vec![0, 1]);
        assert_eq!(index["kassel"], vec![0]);
        // Title words are indexed too
        assert_eq!(index["alpha"], vec![0]);
        assert_eq!(index["beta"], vec![1]);
    }

    #[test]
    fn test_index_deduplicates_positions() {
        // "alpha" appears as keyword and title word of page 0
        let pages = vec![kb_page("a", "Alpha", &["alpha"])];
        let index = build_index(&pages);
        assert_eq!(index["alpha"], vec![0]);
    }

    #[test]
    fn test_index_consistency_both_directions() {
        let pages = vec![
            kb_page("a", "Webdesign Kassel", &["webdesign", "agentur"]),
            kb_page("b", "SEO Tipps", &["seo", "agentur"]),
            kb_page("c", "Kontakt", &[]),
        ];
        let index = build_index(&pages);

        // Forward: every keyword of a page lists the page's position
        for (position, page) in pages.iter().enumerate() {
            for keyword in &page.keywords {
                assert!(
                    index[keyword].contains(&position),
                    "keyword '{keyword}' missing position {position}"
                );
            }
        }

        // Backward: every index entry points at a page actually carrying
        // the term in its keywords or title
        for (term, positions) in &index {
            for &position in positions {
                let page = &pages[position];
                let in_title = keywords::title_words(&page.title).contains(term);
                assert!(
                    page.keywords.contains(term) || in_title,
                    "index term '{term}' not present in page {position}"
                );
            }
        }
    }

    #[test]
    fn test_index_empty_for_no_pages() {
        assert!(build_index(&[]).is_empty());
    }

    #[test]
    fn test_build_drops_thin_pages() {
        let root =
            std::env::temp_dir().join(format!("sitewerk-knowledge-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let public = root.join("public");
        fs::create_dir_all(&public).unwrap();

        let body = "Webdesign aus Kassel für kleine Unternehmen. ".repeat(10);
        fs::write(
            public.join("leistungen.html"),
            format!("<html><body><h1>Leistungen</h1><p>{body}</p></body></html>"),
        )
        .unwrap();
        fs::write(
            public.join("kontakt.html"),
            "<html><body><h1>Kontakt</h1><p>kurz</p></body></html>",
        )
        .unwrap();

        let mut config = crate::config::test_parse_config("");
        config.root = root.clone();
        config.build.output = public;

        let (kb, report) = build(&config).unwrap();
        // The thin page is dropped silently, not reported as skipped
        assert_eq!(report.scanned, 2);
        assert_eq!(kb.pages.len(), 1);
        assert_eq!(kb.pages[0].slug, "leistungen");
        assert!(report.skipped.is_empty());
        assert_eq!(kb.stats.pages, 1);
        assert!(kb.index.contains_key("webdesign"));

        let _ = fs::remove_dir_all(&root);
    }
}
