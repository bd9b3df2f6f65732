//! Sitemap generation.
//!
//! Scans the top level of the output tree and writes two artifacts: a
//! search-engine `sitemap.xml` and a human-readable `sitemap.html`
//! listing page. Unlike the scanning passes this stage is fatal on any
//! error; a partial sitemap would be worse than none.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.de/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::SiteConfig,
    log,
    pipeline::StageReport,
    utils::{date::DateTimeUtc, html::escape, slug::humanize},
};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fs;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Pipeline stage entry: build and write both sitemap artifacts.
pub fn run(config: &SiteConfig) -> Result<StageReport> {
    let sitemap = Sitemap::build(config)?;
    let count = sitemap.urls.len();
    sitemap.write(config)?;

    Ok(StageReport {
        scanned: count,
        modified: 2,
        skipped: vec![],
    })
}

struct Sitemap {
    urls: Vec<UrlEntry>,
}

struct UrlEntry {
    loc: String,
    /// Human-readable page title for the HTML listing.
    title: String,
    lastmod: String,
    changefreq: String,
    priority: String,
}

impl Sitemap {
    /// Collect entries from the top level of the output tree. Pages in
    /// subdirectories are deliberately not listed.
    fn build(config: &SiteConfig) -> Result<Self> {
        let output_dir = config.output_dir();
        let base_url = config.base_url();
        let lastmod = DateTimeUtc::now().format_ymd();

        let mut stems: Vec<String> = Vec::new();
        let entries = fs::read_dir(output_dir)
            .with_context(|| format!("failed to read {}", output_dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to read {}", output_dir.display()))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if config.sitemap.exclude.contains(&name) {
                continue;
            }
            stems.push(name.trim_end_matches(".html").to_string());
        }
        stems.sort();

        // Homepage first, rest in sorted order
        let mut urls = Vec::with_capacity(stems.len());
        if let Some(pos) = stems.iter().position(|s| s == "index") {
            stems.remove(pos);
            urls.push(UrlEntry {
                loc: format!("{base_url}/"),
                title: "Startseite".to_string(),
                lastmod: lastmod.clone(),
                changefreq: config.sitemap.changefreq.clone(),
                priority: config.sitemap.homepage_priority.clone(),
            });
        }
        for stem in stems {
            urls.push(UrlEntry {
                loc: format!("{base_url}/{stem}"),
                title: humanize(&stem),
                lastmod: lastmod.clone(),
                changefreq: config.sitemap.changefreq.clone(),
                priority: config.sitemap.default_priority.clone(),
            });
        }

        Ok(Self { urls })
    }

    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n    <lastmod>");
            xml.push_str(&entry.lastmod);
            xml.push_str("</lastmod>\n    <changefreq>");
            xml.push_str(&entry.changefreq);
            xml.push_str("</changefreq>\n    <priority>");
            xml.push_str(&entry.priority);
            xml.push_str("</priority>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    fn into_html(&self, config: &SiteConfig) -> String {
        let mut html = String::with_capacity(4096);
        html.push_str("<!DOCTYPE html>\n<html lang=\"");
        html.push_str(&escape(&config.site.language));
        html.push_str("\">\n<head>\n<meta charset=\"UTF-8\">\n<title>Sitemap – ");
        html.push_str(&escape(&config.site.title));
        html.push_str("</title>\n</head>\n<body>\n<h1>Sitemap</h1>\n<ul class=\"sitemap-list\">\n");

        for entry in &self.urls {
            html.push_str("<li><a href=\"");
            html.push_str(&escape(&entry.loc));
            html.push_str("\">");
            html.push_str(&escape(&entry.title));
            html.push_str("</a></li>\n");
        }

        html.push_str("</ul>\n</body>\n</html>\n");
        html
    }

    fn write(self, config: &SiteConfig) -> Result<()> {
        let output_dir = config.output_dir();

        let html_path = output_dir.join(&config.sitemap.html_path);
        fs::write(&html_path, self.into_html(config))
            .with_context(|| format!("failed to write {}", html_path.display()))?;

        let xml_path = output_dir.join(&config.sitemap.path);
        fs::write(&xml_path, self.into_xml())
            .with_context(|| format!("failed to write {}", xml_path.display()))?;

        log!("sitemap"; "{}", xml_path.file_name().unwrap_or_default().to_string_lossy());
        Ok(())
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    fn entry(loc: &str, title: &str, priority: &str) -> UrlEntry {
        UrlEntry {
            loc: loc.to_string(),
            title: title.to_string(),
            lastmod: "2025-01-01".to_string(),
            changefreq: "weekly".to_string(),
            priority: priority.to_string(),
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("hello"), "hello");
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn test_sitemap_empty() {
        let xml = Sitemap { urls: vec![] }.into_xml();

        assert!(xml.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#)));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_sitemap_two_urls() {
        let xml = Sitemap {
            urls: vec![
                entry("https://example.de/", "Startseite", "1.0"),
                entry("https://example.de/kontakt", "Kontakt", "0.8"),
            ],
        }
        .into_xml();

        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://example.de/</loc>"));
        assert!(xml.contains("<loc>https://example.de/kontakt</loc>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<lastmod>2025-01-01</lastmod>"));
    }

    #[test]
    fn test_sitemap_escapes_loc() {
        let xml = Sitemap {
            urls: vec![entry("https://example.de/a?b=1&c=2", "A", "0.8")],
        }
        .into_xml();
        assert!(xml.contains("<loc>https://example.de/a?b=1&amp;c=2</loc>"));
    }

    #[test]
    fn test_html_listing() {
        let mut config = test_parse_config("");
        config.site.title = "Webdesign Kassel".to_string();
        let html = Sitemap {
            urls: vec![
                entry("https://example.de/", "Startseite", "1.0"),
                entry("https://example.de/kontakt", "Kontakt", "0.8"),
            ],
        }
        .into_html(&config);

        assert!(html.contains("<title>Sitemap – Webdesign Kassel</title>"));
        assert!(html.contains(r#"<a href="https://example.de/">Startseite</a>"#));
        assert!(html.contains(r#"<a href="https://example.de/kontakt">Kontakt</a>"#));
        assert!(html.contains(r#"<html lang="de">"#));
    }

    #[test]
    fn test_build_from_output_tree() {
        let root =
            std::env::temp_dir().join(format!("sitewerk-sitemap-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let public = root.join("public");
        fs::create_dir_all(public.join("data")).unwrap();
        for name in ["index.html", "kontakt.html", "web-design.html", "404.html", "sitemap.html"] {
            fs::write(public.join(name), "<html></html>").unwrap();
        }
        // Files in subdirectories and non-html files are not listed
        fs::write(public.join("data/knowledge.json"), "{}").unwrap();
        fs::write(public.join("styles.css"), "").unwrap();

        let mut config = test_parse_config("");
        config.root = root.clone();
        config.build.output = public;

        let sitemap = Sitemap::build(&config).unwrap();
        let locs: Vec<&str> = sitemap.urls.iter().map(|u| u.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "https://example.de/",
                "https://example.de/kontakt",
                "https://example.de/web-design",
            ]
        );
        assert_eq!(sitemap.urls[0].title, "Startseite");
        assert_eq!(sitemap.urls[0].priority, "1.0");
        assert_eq!(sitemap.urls[1].title, "Kontakt");
        assert_eq!(sitemap.urls[2].title, "Web design");
        assert_eq!(sitemap.urls[2].priority, "0.8");

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_xml_identical_across_runs_modulo_lastmod() {
        let root =
            std::env::temp_dir().join(format!("sitewerk-sitemap-rerun-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let public = root.join("public");
        fs::create_dir_all(&public).unwrap();
        for name in ["index.html", "kontakt.html", "leistungen.html"] {
            fs::write(public.join(name), "<html></html>").unwrap();
        }

        let mut config = test_parse_config("");
        config.root = root.clone();
        config.build.output = public;

        let first = Sitemap::build(&config).unwrap().into_xml();
        let second = Sitemap::build(&config).unwrap().into_xml();

        let without_lastmod = |xml: &str| -> String {
            xml.lines()
                .filter(|line| !line.trim_start().starts_with("<lastmod>"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(without_lastmod(&first), without_lastmod(&second));

        let _ = fs::remove_dir_all(&root);
    }
}
