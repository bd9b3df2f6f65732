//! Partial injector.
//!
//! Replaces a placeholder element (`<div id="footer-placeholder"></div>`)
//! with the raw markup of a shared fragment file, rewriting pages in
//! place. A missing fragment file is fatal; a page without the
//! placeholder is a no-op. Because the placeholder is consumed, a second
//! run over already-injected output skips every file.

use crate::{
    config::{Partial, SiteConfig},
    debug,
    page::{self, Page},
    pipeline::{Skipped, StageReport},
    utils::html::find_element_by_id,
};
use anyhow::{Context, Result, bail};
use std::fs;

/// Run every configured partial in order.
pub fn run_all(config: &SiteConfig) -> Result<StageReport> {
    let mut report = StageReport::default();
    for partial in &config.inject.partials {
        report.merge(run_partial(config, partial)?);
    }
    Ok(report)
}

/// Run a single partial selected by name (fragment stem or placeholder).
pub fn run_named(config: &SiteConfig, name: &str) -> Result<StageReport> {
    let partial = config
        .inject
        .partials
        .iter()
        .find(|p| p.fragment.trim_end_matches(".html") == name || p.placeholder == name);
    match partial {
        Some(partial) => run_partial(config, partial),
        None => bail!("no configured partial matches '{name}'"),
    }
}

/// Inject one fragment into every page of the output tree.
pub fn run_partial(config: &SiteConfig, partial: &Partial) -> Result<StageReport> {
    let fragment_path = config.fragments_dir().join(&partial.fragment);
    // Fatal: without the fragment nothing can be injected
    let fragment = fs::read_to_string(&fragment_path)
        .with_context(|| format!("missing fragment file {}", fragment_path.display()))?;
    let fragment = fragment.trim();

    let files = page::collect_html_files(config.output_dir(), &[])?;
    let mut report = StageReport::default();

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

        // Placeholder absence is a no-op, not an error
        let Some(injected) = inject_fragment(&page.html, &partial.placeholder, fragment) else {
            debug!("inject"; "{} has no #{}", page.file_name(), partial.placeholder);
            continue;
        };

        page.html = injected;
        if let Err(err) = page.write() {
            report
                .skipped
                .push(Skipped::new(page.file_name(), err.to_string()));
            continue;
        }
        report.modified += 1;
    }

    Ok(report)
}

/// Replace the placeholder element's outer markup with the fragment.
///
/// Returns `None` when the page has no such placeholder.
pub fn inject_fragment(html: &str, placeholder_id: &str, fragment: &str) -> Option<String> {
    let span = find_element_by_id(html, placeholder_id)?;
    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..span.outer.start]);
    out.push_str(fragment);
    out.push_str(&html[span.outer.end..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_inject_fragment() {
        let html = r#"<body><div id="footer-placeholder"></div></body>"#;
        let out = inject_fragment(html, "footer-placeholder", "<footer>Fuß</footer>").unwrap();
        assert_eq!(out, "<body><footer>Fuß</footer></body>");
    }

    #[test]
    fn test_inject_is_idempotent() {
        let html = r#"<body><div id="footer-placeholder"></div></body>"#;
        let once = inject_fragment(html, "footer-placeholder", "<footer>x</footer>").unwrap();
        // Placeholder consumed: second run is a no-op
        assert!(inject_fragment(&once, "footer-placeholder", "<footer>x</footer>").is_none());
    }

    #[test]
    fn test_inject_aside_placeholder() {
        let html = r#"<body><aside id="side-menu-placeholder"></aside></body>"#;
        let out = inject_fragment(html, "side-menu-placeholder", "<aside>Menü</aside>").unwrap();
        assert_eq!(out, "<body><aside>Menü</aside></body>");
    }

    fn test_config(root: &PathBuf) -> crate::config::SiteConfig {
        let mut config = test_parse_config("");
        config.root = root.clone();
        config.build.source = root.join("site");
        config.build.output = root.join("public");
        config.build.fragments = root.join("partials");
        config
    }

    #[test]
    fn test_run_partial_on_disk() {
        let root =
            std::env::temp_dir().join(format!("sitewerk-inject-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("public")).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();

        fs::write(
            root.join("public/index.html"),
            r#"<body><div id="footer-placeholder"></div></body>"#,
        )
        .unwrap();
        fs::write(root.join("public/plain.html"), "<body><p>kein Platzhalter</p></body>").unwrap();
        fs::write(root.join("partials/footer.html"), "<footer>Fuß</footer>\n").unwrap();

        let config = test_config(&root);
        let partial = Partial::new("footer.html", "footer-placeholder");

        let report = run_partial(&config, &partial).unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.modified, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(root.join("public/index.html")).unwrap(),
            "<body><footer>Fuß</footer></body>"
        );

        // Second run: placeholder gone, nothing modified
        let report = run_partial(&config, &partial).unwrap();
        assert_eq!(report.modified, 0);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_fragment_is_fatal() {
        let root =
            std::env::temp_dir().join(format!("sitewerk-inject-miss-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("public")).unwrap();

        let config = test_config(&root);
        let partial = Partial::new("nope.html", "x");
        assert!(run_partial(&config, &partial).is_err());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_run_named_unknown() {
        let config = test_parse_config("");
        assert!(run_named(&config, "unbekannt").is_err());
    }
}
