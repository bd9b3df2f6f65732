//! Related-articles injector.
//!
//! Consumes the articles database written by the articles stage (missing
//! database is fatal) and rewrites pages carrying the placeholders:
//!
//! - `#related-placeholder` becomes a card grid linking the highest
//!   scoring other articles,
//! - `#blog-faq-placeholder` becomes the page's own FAQ block.
//!
//! Scoring: one point per shared tag plus a configured bonus when the
//! categories match. Ties break alphabetically by slug. A page whose slug
//! is not in the database still gets cards, filled with the first
//! database entries.

use crate::{
    articles::{ArticleRecord, ArticlesDb},
    config::SiteConfig,
    debug,
    page::{self, Page},
    pipeline::{Skipped, StageReport, inject::inject_fragment},
    utils::html::{escape, escape_attr},
};
use anyhow::{Context, Result};

/// Pipeline stage entry: inject related cards and FAQ blocks.
pub fn run(config: &SiteConfig) -> Result<StageReport> {
    let db_path = config.articles_db_path();
    // Fatal: the articles stage must have run
    let db = ArticlesDb::load(&db_path)
        .with_context(|| format!("{} not found, run articles first", db_path.display()))?;

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

        let mut changed = false;

        let related = related_for(&db, &page.slug, config.related.max, config);
        if !related.is_empty()
            && let Some(html) = inject_fragment(
                &page.html,
                "related-placeholder",
                &render_cards(&related),
            )
        {
            page.html = html;
            changed = true;
        }

        if let Some(record) = db.get(&page.slug)
            && let Some(html) =
                inject_fragment(&page.html, "blog-faq-placeholder", &render_faq(record))
        {
            page.html = html;
            changed = true;
        }

        if !changed {
            debug!("related"; "{} has no placeholders", page.file_name());
            continue;
        }
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

/// Relatedness of `candidate` to `current`: shared tags plus the category
/// bonus.
pub fn score(current: &ArticleRecord, candidate: &ArticleRecord, category_bonus: usize) -> usize {
    let shared_tags = candidate
        .tags
        .iter()
        .filter(|tag| current.tags.contains(tag))
        .count();
    let bonus = if candidate.category == current.category {
        category_bonus
    } else {
        0
    };
    shared_tags + bonus
}

/// The top `max` related articles for `slug`, never including the page
/// itself. An unknown slug falls back to the first database entries.
pub fn related_for<'a>(
    db: &'a ArticlesDb,
    slug: &str,
    max: usize,
    config: &SiteConfig,
) -> Vec<&'a ArticleRecord> {
    let others = db.articles.iter().filter(|a| a.slug != slug);

    let Some(current) = db.get(slug) else {
        return others.take(max).collect();
    };

    let mut scored: Vec<(usize, &ArticleRecord)> = others
        .map(|candidate| (score(current, candidate, config.related.category_bonus), candidate))
        .collect();
    // Highest score first; ties alphabetically by slug
    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.slug.cmp(&b.slug)));
    scored.into_iter().take(max).map(|(_, a)| a).collect()
}

/// Render the card grid replacing `#related-placeholder`.
fn render_cards(records: &[&ArticleRecord]) -> String {
    let mut out = String::from(
        "<div class=\"related-articles\">\n\
         <h2>Das könnte Sie auch interessieren</h2>\n\
         <div class=\"related-grid\">\n",
    );
    for record in records {
        out.push_str(&format!(
            "<a class=\"related-card\" href=\"{slug}.html\">\n\
             <span class=\"related-icon\">{icon}</span>\n\
             <h3>{title}</h3>\n\
             <p>{description}</p>\n\
             </a>\n",
            slug = escape_attr(&record.slug),
            icon = escape(&record.icon),
            title = escape(&record.title),
            description = escape(&record.description),
        ));
    }
    out.push_str("</div>\n</div>");
    out
}

/// Render the FAQ block replacing `#blog-faq-placeholder`.
fn render_faq(record: &ArticleRecord) -> String {
    format!(
        "<section class=\"blog-faq\">\n\
         <h2>Häufig gestellte Frage</h2>\n\
         <h3>{question}</h3>\n\
         <p>{answer}</p>\n\
         </section>",
        question = escape(&record.question),
        answer = escape(&record.answer),
    )
}
