//! Articles database builder.
//!
//! Scans blog-like pages and serializes `articles-db.json`: one metadata
//! record per article plus the static category → icon table. A candidate
//! page must contain an `<article>` element, an `<h1>`, and the
//! blog-marker container class. Declared `data-*` attributes on the
//! `<article>` tag win; heuristics from `rules` fill the gaps.
//!
//! Per-file failures land in the skip list and never abort the pass; the
//! output is whatever was successfully collected, sorted by slug.

pub mod rules;

use crate::{
    config::SiteConfig,
    debug,
    page::{self, Page, extract::attr_value},
    pipeline::{Skipped, StageReport},
    utils::html::{has_class, normalize_ws, text_content},
};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// One article's metadata record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Source file's basename without extension; unique per database.
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Derived FAQ-style question.
    pub question: String,
    /// Declared or derived answer.
    pub answer: String,
    pub category: String,
    pub icon: String,
    pub tags: Vec<String>,
}

/// The serialized articles database.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArticlesDb {
    pub articles: Vec<ArticleRecord>,
    pub categories: BTreeMap<String, String>,
}

impl ArticlesDb {
    /// Look up a record by slug.
    pub fn get(&self, slug: &str) -> Option<&ArticleRecord> {
        self.articles.iter().find(|a| a.slug == slug)
    }

    /// Load a previously written database.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read articles db {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid articles db {}", path.display()))
    }
}

/// Pipeline stage entry: build the database and write the artifact.
pub fn run(config: &SiteConfig) -> Result<StageReport> {
    let (db, report) = build(config)?;

    let data_dir = config.data_dir();
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;

    let path = config.articles_db_path();
    let json = serde_json::to_string_pretty(&db)?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(report)
}

/// Scan the output tree and collect article records.
pub fn build(config: &SiteConfig) -> Result<(ArticlesDb, StageReport)> {
    let files = page::collect_html_files(config.output_dir(), &config.articles.exclude)?;
    let mut report = StageReport::default();
    let mut articles = Vec::new();

    for path in &files {
        report.scanned += 1;
        let page = match Page::read(path) {
            Ok(page) => page,
            Err(err) => {
                report.skipped.push(Skipped::new(
                    path.file_name().unwrap_or_default().to_string_lossy(),
                    err.to_string(),
                ));
                continue;
            }
        };

        match extract_article(&page, config) {
            Ok(Some(record)) => {
                articles.push(record);
                report.modified += 1;
            }
            Ok(None) => {
                debug!("articles"; "{} is not an article candidate", page.file_name());
            }
            Err(err) => {
                report
                    .skipped
                    .push(Skipped::new(page.file_name(), err.to_string()));
            }
        }
    }

    articles.sort_by(|a, b| a.slug.cmp(&b.slug));

    let db = ArticlesDb {
        articles,
        categories: rules::category_table(),
    };
    Ok((db, report))
}

/// Extract an article record, or `None` if the page is not a candidate.
fn extract_article(page: &Page, config: &SiteConfig) -> Result<Option<ArticleRecord>> {
    let dom = tl::parse(&page.html, tl::ParserOptions::default())
        .map_err(|_| anyhow!("failed to parse html"))?;
    let parser = dom.parser();

    let mut article_tag = None;
    let mut title = None;
    let mut description = String::new();
    let mut has_marker = false;
    let mut first_paragraph = None;

    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else { continue };
        let name = tag.name().as_utf8_str().to_ascii_lowercase();
        match name.as_str() {
            "article" => {
                if article_tag.is_none() {
                    article_tag = Some(tag);
                }
            }
            "h1" => {
                if title.is_none() {
                    let text = normalize_ws(&tag.inner_text(parser));
                    if !text.is_empty() {
                        title = Some(text);
                    }
                }
            }
            "p" => {
                // First paragraph after the article started
                if article_tag.is_some() && first_paragraph.is_none() {
                    let text = normalize_ws(&tag.inner_text(parser));
                    if !text.is_empty() {
                        first_paragraph = Some(text);
                    }
                }
            }
            "meta" => {
                if attr_value(tag, "name").as_deref() == Some("description")
                    && let Some(content) = attr_value(tag, "content")
                {
                    description = normalize_ws(&content);
                }
            }
            _ => {
                if !has_marker
                    && let Some(class) = attr_value(tag, "class")
                    && has_class(&class, &config.articles.marker_class)
                {
                    has_marker = true;
                }
            }
        }
    }

    // Candidate gate: <article> + <h1> + blog marker container
    let (Some(article), Some(title)) = (article_tag, title) else {
        return Ok(None);
    };
    if !has_marker {
        return Ok(None);
    }

    let body_text = text_content(&page.html);

    let category = attr_value(article, "data-category")
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| rules::guess_category(&format!("{title} {body_text}")).to_string());

    let icon = attr_value(article, "data-icon")
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| rules::category_icon(&category).to_string());

    let tags = match attr_value(article, "data-tags").filter(|t| !t.is_empty()) {
        Some(declared) => declared
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect(),
        None => fallback_tags(&category, &format!("{title} {body_text}")),
    };

    let question = attr_value(article, "data-question")
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| rules::derive_question(&title));

    let answer = attr_value(article, "data-answer")
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| {
            let source = first_paragraph.as_deref().unwrap_or(&description);
            rules::derive_answer(source, config.articles.answer_limit)
        });

    Ok(Some(ArticleRecord {
        slug: page.slug.clone(),
        title,
        description,
        question,
        answer,
        category,
        icon,
        tags,
    }))
}

/// Fallback tags: the matched category's rule keywords that actually
/// occur in the text.
fn fallback_tags(category: &str, text: &str) -> Vec<String> {
    let haystack = text.to_lowercase();
    rules::CATEGORY_RULES
        .iter()
        .find(|rule| rule.category == category)
        .map(|rule| {
            rule.keywords
                .iter()
                .filter(|kw| haystack.contains(*kw))
                .map(|kw| kw.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    fn page(slug: &str, html: &str) -> Page {
        Page {
            path: PathBuf::from(format!("{slug}.html")),
            slug: slug.to_string(),
            html: html.to_string(),
        }
    }

    const ARTICLE: &str = r#"<html><head>
<meta name="description" content="WordPress Tipps.">
</head><body>
<div class="blog-content">
<article data-category="WordPress" data-icon="🧩" data-tags="wordpress, seo"
         data-question="Lohnt sich WordPress?" data-answer="Ja, meistens.">
<h1>WordPress Grundlagen</h1>
<p>Der erste Absatz.</p>
</article>
</div>
</body></html>"#;

    #[test]
    fn test_declared_attributes_win() {
        let config = test_parse_config("");
        let record = extract_article(&page("wordpress-grundlagen", ARTICLE), &config)
            .unwrap()
            .unwrap();

        assert_eq!(record.slug, "wordpress-grundlagen");
        assert_eq!(record.title, "WordPress Grundlagen");
        assert_eq!(record.description, "WordPress Tipps.");
        assert_eq!(record.category, "WordPress");
        assert_eq!(record.icon, "🧩");
        assert_eq!(record.tags, vec!["wordpress", "seo"]);
        assert_eq!(record.question, "Lohnt sich WordPress?");
        assert_eq!(record.answer, "Ja, meistens.");
    }

    #[test]
    fn test_heuristic_fallback() {
        let html = r#"<body><div class="blog-content"><article>
<h1>SEO für kleine Unternehmen</h1>
<p>Gutes Ranking bei Google beginnt mit sauberer Technik.</p>
</article></div></body>"#;
        let config = test_parse_config("");
        let record = extract_article(&page("seo-tipps", html), &config)
            .unwrap()
            .unwrap();

        assert_eq!(record.category, "SEO");
        assert_eq!(record.icon, "🔍");
        assert!(record.tags.contains(&"seo".to_string()));
        assert!(record.tags.contains(&"google".to_string()));
        assert_eq!(
            record.question,
            "Was sollten Sie über SEO für kleine Unternehmen wissen?"
        );
        assert!(record.answer.starts_with("Gutes Ranking"));
    }

    #[test]
    fn test_non_candidates_rejected() {
        let config = test_parse_config("");

        // No <article>
        let html = r#"<body><div class="blog-content"><h1>T</h1></div></body>"#;
        assert!(extract_article(&page("a", html), &config).unwrap().is_none());

        // No <h1>
        let html = r#"<body><div class="blog-content"><article><p>x</p></article></div></body>"#;
        assert!(extract_article(&page("b", html), &config).unwrap().is_none());

        // No blog marker
        let html = r#"<body><article><h1>T</h1></article></body>"#;
        assert!(extract_article(&page("c", html), &config).unwrap().is_none());
    }

    #[test]
    fn test_db_lookup() {
        let db = ArticlesDb {
            articles: vec![ArticleRecord {
                slug: "a".into(),
                title: "A".into(),
                description: String::new(),
                question: String::new(),
                answer: String::new(),
                category: "SEO".into(),
                icon: "🔍".into(),
                tags: vec![],
            }],
            categories: rules::category_table(),
        };
        assert!(db.get("a").is_some());
        assert!(db.get("b").is_none());
    }
}
