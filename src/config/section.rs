//! Configuration section definitions for `sitewerk.toml`.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Webdesign Kassel"
//! url = "https://example.de"
//! language = "de"
//!
//! [build]
//! source = "site"            # pristine page sources
//! output = "public"          # build output (the tree the passes mutate)
//! fragments = "partials"     # shared HTML fragment files
//!
//! [knowledge]
//! min_text = 100             # pages with less extracted text are dropped
//! section_limit = 2000       # per-section text cap (chars)
//! text_limit = 8000          # full-page text cap (chars)
//! max_keywords = 15
//! ```
//!
//! Every limit the pipeline applies lives here rather than as a literal in
//! the pass that uses it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// [site]
// ============================================================================

/// Site metadata used for URLs and generated markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site title (sitemap.html heading).
    pub title: String,

    /// Base URL, no trailing slash (sitemap `loc` prefix).
    pub url: String,

    /// Content language code.
    pub language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            language: "de".to_string(),
        }
    }
}

// ============================================================================
// [build]
// ============================================================================

/// Build tree locations, resolved relative to the config file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Pristine page sources. `build` copies this tree into `output`
    /// before any pass runs, so passes stay idempotent against it.
    pub source: PathBuf,

    /// Output directory. All passes mutate only this tree.
    pub output: PathBuf,

    /// Directory holding the shared HTML fragments.
    pub fragments: PathBuf,

    /// Directory for generated JSON artifacts, relative to `output`.
    pub data_dir: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            source: PathBuf::from("site"),
            output: PathBuf::from("public"),
            fragments: PathBuf::from("partials"),
            data_dir: PathBuf::from("data"),
        }
    }
}

// ============================================================================
// [inject]
// ============================================================================

/// A fragment file paired with the placeholder id it replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partial {
    /// Fragment file name inside the fragments directory.
    pub fragment: String,

    /// Placeholder element id in the target pages.
    pub placeholder: String,
}

impl Partial {
    pub fn new(fragment: &str, placeholder: &str) -> Self {
        Self {
            fragment: fragment.to_string(),
            placeholder: placeholder.to_string(),
        }
    }
}

/// Partial-injection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectSection {
    /// Fragment/placeholder pairs, injected in order.
    pub partials: Vec<Partial>,
}

impl Default for InjectSection {
    fn default() -> Self {
        Self {
            partials: vec![
                Partial::new("header.html", "header-placeholder"),
                Partial::new("footer.html", "footer-placeholder"),
                Partial::new("modals.html", "modal-container"),
                Partial::new("side-menu.html", "side-menu-placeholder"),
                Partial::new("breadcrumb.html", "breadcrumb-placeholder"),
            ],
        }
    }
}

// ============================================================================
// [articles]
// ============================================================================

/// Articles-database builder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlesSection {
    /// Output file, relative to the data directory.
    pub db_file: String,

    /// File names never scanned as articles.
    pub exclude: Vec<String>,

    /// Class marking a page body as blog content; required for a page to
    /// count as an article candidate.
    pub marker_class: String,

    /// Character cap for the heuristically derived FAQ answer.
    pub answer_limit: usize,
}

impl Default for ArticlesSection {
    fn default() -> Self {
        Self {
            db_file: "articles-db.json".to_string(),
            exclude: vec![
                "index.html".to_string(),
                "404.html".to_string(),
                "sitemap.html".to_string(),
                "impressum.html".to_string(),
                "datenschutz.html".to_string(),
            ],
            marker_class: "blog-content".to_string(),
            answer_limit: 250,
        }
    }
}

// ============================================================================
// [related]
// ============================================================================

/// Related-articles injector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedSection {
    /// How many related articles to inject.
    pub max: usize,

    /// Score bonus for sharing the current article's category.
    pub category_bonus: usize,
}

impl Default for RelatedSection {
    fn default() -> Self {
        Self {
            max: 3,
            category_bonus: 2,
        }
    }
}

// ============================================================================
// [knowledge]
// ============================================================================

/// Knowledge-base generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSection {
    /// Pretty-printed output file, relative to the data directory.
    pub output: String,

    /// Compact output file, relative to the data directory.
    pub output_min: String,

    /// File names never indexed (non-content files and fragment templates).
    pub exclude: Vec<String>,

    /// Minimum extracted text length for a page to be indexed.
    pub min_text: usize,

    /// Per-section text cap in characters.
    pub section_limit: usize,

    /// Full-page text cap in characters.
    pub text_limit: usize,

    /// Number of frequency-ranked keywords kept per page.
    pub max_keywords: usize,
}

impl Default for KnowledgeSection {
    fn default() -> Self {
        Self {
            output: "knowledge.json".to_string(),
            output_min: "knowledge.min.json".to_string(),
            exclude: vec![
                "404.html".to_string(),
                "sitemap.html".to_string(),
                "header.html".to_string(),
                "footer.html".to_string(),
                "modals.html".to_string(),
                "side-menu.html".to_string(),
                "breadcrumb.html".to_string(),
            ],
            min_text: 100,
            section_limit: 2000,
            text_limit: 8000,
            max_keywords: 15,
        }
    }
}

// ============================================================================
// [sitemap]
// ============================================================================

/// Sitemap generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapSection {
    /// XML sitemap file name inside the output directory.
    pub path: String,

    /// Human-readable listing page file name.
    pub html_path: String,

    /// File names excluded from the sitemap.
    pub exclude: Vec<String>,

    /// Fixed change frequency for every entry.
    pub changefreq: String,

    /// Priority for the homepage entry.
    pub homepage_priority: String,

    /// Priority for every other entry.
    pub default_priority: String,
}

impl Default for SitemapSection {
    fn default() -> Self {
        Self {
            path: "sitemap.xml".to_string(),
            html_path: "sitemap.html".to_string(),
            exclude: vec!["404.html".to_string(), "sitemap.html".to_string()],
            changefreq: "weekly".to_string(),
            homepage_priority: "1.0".to_string(),
            default_priority: "0.8".to_string(),
        }
    }
}

// ============================================================================
// [lazy]
// ============================================================================

/// Lazy-loading injector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LazySection {
    /// Images carrying this class are never lazied (above-the-fold
    /// profile picture).
    pub skip_class: String,
}

impl Default for LazySection {
    fn default() -> Self {
        Self {
            skip_class: "profile-pic".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");

        assert_eq!(config.site.language, "de");
        assert_eq!(config.build.output.to_str(), Some("public"));
        assert_eq!(config.inject.partials.len(), 5);
        assert_eq!(config.inject.partials[1].placeholder, "footer-placeholder");
        assert_eq!(config.articles.answer_limit, 250);
        assert_eq!(config.related.max, 3);
        assert_eq!(config.related.category_bonus, 2);
        assert_eq!(config.knowledge.min_text, 100);
        assert_eq!(config.knowledge.section_limit, 2000);
        assert_eq!(config.knowledge.text_limit, 8000);
        assert_eq!(config.knowledge.max_keywords, 15);
        assert!(config.sitemap.exclude.contains(&"404.html".to_string()));
        assert_eq!(config.sitemap.homepage_priority, "1.0");
    }

    #[test]
    fn test_partial_override() {
        let config = test_parse_config("[knowledge]\nmin_text = 50");

        assert_eq!(config.knowledge.min_text, 50);
        // Untouched fields keep their defaults
        assert_eq!(config.knowledge.text_limit, 8000);
    }

    #[test]
    fn test_inject_partials_override() {
        let config = test_parse_config(
            "[[inject.partials]]\nfragment = \"nav.html\"\nplaceholder = \"nav-placeholder\"",
        );

        assert_eq!(config.inject.partials.len(), 1);
        assert_eq!(config.inject.partials[0].fragment, "nav.html");
    }
}
