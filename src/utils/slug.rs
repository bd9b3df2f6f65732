//! Slug handling.
//!
//! A page's slug is its file name minus the `.html` extension. It is the
//! stable identifier tying pages to articles-db records, knowledge-base
//! entries and sitemap URLs.

use std::path::Path;

/// Slug of a page file: basename without extension.
pub fn slug_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Humanize a slug into a display title.
///
/// `index` is special-cased to the German homepage title; everything else
/// gets hyphens replaced by spaces and the first letter capitalized.
pub fn humanize(slug: &str) -> String {
    if slug == "index" {
        return "Startseite".to_string();
    }

    let spaced = slug.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Tokens of a slug usable as keywords: hyphen-split parts longer than
/// two characters.
pub fn keyword_tokens(slug: &str) -> Vec<String> {
    slug.to_lowercase()
        .split('-')
        .filter(|t| t.chars().count() > 2)
        .map(str::to_string)
        .collect()
}
