//! Keyword extraction with a German stopword list.
//!
//! Keywords are runs of at least three lowercase Latin/German letters in
//! the lowercased title + body text, minus stopwords, ranked by frequency.
//! Ties keep first-encountered order (stable sort), so output is
//! deterministic for identical input.

use crate::utils::slug;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

/// Word matcher: ≥3 lowercase letters including German umlauts/eszett.
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zäöüß]{3,}").expect("valid regex"));

/// Common German function words excluded from keyword ranking.
pub const STOPWORDS: &[&str] = &[
    "aber", "alle", "allem", "allen", "aller", "alles", "als", "also", "auch", "auf", "aus",
    "bei", "beim", "bin", "bis", "bist", "damit", "dann", "das", "dass", "dem", "den", "denn",
    "der", "des", "die", "dies", "diese", "diesem", "diesen", "dieser", "dieses", "doch",
    "dort", "durch", "ein", "eine", "einem", "einen", "einer", "eines", "einige", "etwas",
    "für", "gegen", "hab", "habe", "haben", "hat", "hatte", "hier", "ich", "ihr", "ihre",
    "ihrem", "ihren", "ihrer", "ihres", "ist", "jede", "jedem", "jeden", "jeder", "jedes",
    "kann", "kein", "keine", "können", "machen", "man", "mehr", "mein", "mit", "muss", "nach",
    "nicht", "noch", "nur", "oder", "ohne", "schon", "sehr", "sein", "seine", "sich", "sie",
    "sind", "sollte", "sowie", "über", "und", "uns", "unser", "unter", "vom", "von", "vor",
    "war", "waren", "was", "wenn", "werden", "wie", "wieder", "wir", "wird", "wurde", "zum",
    "zur",
];

static STOPWORD_SET: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Extract the top `max` keywords from title + text, then union in the
/// slug's hyphen-split tokens.
pub fn extract_keywords(title: &str, text: &str, page_slug: &str, max: usize) -> Vec<String> {
    let haystack = format!("{title} {text}").to_lowercase();

    // Count occurrences, remembering first-encounter order for stable ties
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();

    for m in WORD_RE.find_iter(&haystack) {
        let word = m.as_str();
        if STOPWORD_SET.contains(word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort by descending count preserves encounter order on ties
    let mut ranked = order;
    ranked.sort_by_key(|word| std::cmp::Reverse(counts[word]));
    let mut keywords: Vec<String> = ranked.into_iter().take(max).map(str::to_string).collect();

    for token in slug::keyword_tokens(page_slug) {
        if !keywords.contains(&token) {
            keywords.push(token);
        }
    }

    keywords
}

/// All words of a title eligible for the inverted index (≥3 letters,
/// lowercased, stopwords included).
pub fn title_words(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_excluded() {
        let keywords = extract_keywords("Der Titel", "das ist für die aber webdesign", "x", 15);
        assert_eq!(keywords, vec!["titel", "webdesign"]);
    }

    #[test]
    fn test_frequency_ranking() {
        let keywords = extract_keywords(
            "",
            "wartung wordpress wartung hosting wartung wordpress",
            "x",
            15,
        );
        assert_eq!(keywords, vec!["wartung", "wordpress", "hosting"]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let keywords = extract_keywords("", "zebra apfel zebra apfel birne", "x", 15);
        // zebra and apfel tie at 2, zebra was seen first
        assert_eq!(keywords, vec!["zebra", "apfel", "birne"]);
    }

    #[test]
    fn test_max_cap_applies_before_slug_union() {
        let keywords = extract_keywords("", "aaa bbb ccc ddd", "eee-fff", 2);
        assert_eq!(keywords, vec!["aaa", "bbb", "eee", "fff"]);
    }

    #[test]
    fn test_slug_tokens_not_duplicated() {
        let keywords = extract_keywords("", "webdesign webdesign kassel", "webdesign-kassel", 15);
        assert_eq!(keywords, vec!["webdesign", "kassel"]);
    }

    #[test]
    fn test_short_words_excluded() {
        let keywords = extract_keywords("", "ab cd webdesign", "x", 15);
        assert_eq!(keywords, vec!["webdesign"]);
    }

    #[test]
    fn test_umlauts_matched() {
        let keywords = extract_keywords("", "qualität zählt", "x", 15);
        assert_eq!(keywords, vec!["qualität", "zählt"]);
    }

    #[test]
    fn test_title_words_keep_stopwords() {
        assert_eq!(
            title_words("Warum SEO für Sie"),
            vec!["warum", "seo", "für", "sie"]
        );
    }
}
