//! Heuristic fallbacks for article metadata.
//!
//! Pages that do not declare `data-category`/`data-question`/... on their
//! `<article>` tag get their metadata guessed here. Category guessing is a
//! prioritized rule list: the first rule with a keyword found in the text
//! wins, so ordering is explicit and testable.

use crate::utils::html::{normalize_ws, truncate_chars};
use std::collections::BTreeMap;

/// One prioritized category rule.
pub struct CategoryRule {
    pub category: &'static str,
    pub icon: &'static str,
    pub keywords: &'static [&'static str],
}

/// Rules in priority order. Earlier rules win on overlap, so the more
/// specific topics come before the catch-all design keywords.
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "SEO",
        icon: "🔍",
        keywords: &["seo", "suchmaschine", "ranking", "google", "sichtbarkeit"],
    },
    CategoryRule {
        category: "WordPress",
        icon: "🧩",
        keywords: &["wordpress", "plugin", "theme", "gutenberg"],
    },
    CategoryRule {
        category: "Performance",
        icon: "⚡",
        keywords: &["performance", "ladezeit", "pagespeed", "core web vitals"],
    },
    CategoryRule {
        category: "Sicherheit",
        icon: "🔒",
        keywords: &["sicherheit", "ssl", "dsgvo", "datenschutz", "backup"],
    },
    CategoryRule {
        category: "Marketing",
        icon: "📈",
        keywords: &["marketing", "werbung", "newsletter", "social media", "conversion"],
    },
    CategoryRule {
        category: "Webdesign",
        icon: "🎨",
        keywords: &["webdesign", "design", "website", "homepage", "relaunch"],
    },
];

/// Fallback when no rule keyword occurs in the text.
pub const DEFAULT_CATEGORY: &str = "Webdesign";

/// Guess a category from article text (title + body, any case).
pub fn guess_category(text: &str) -> &'static str {
    let haystack = text.to_lowercase();
    for rule in CATEGORY_RULES {
        if rule.keywords.iter().any(|kw| haystack.contains(kw)) {
            return rule.category;
        }
    }
    DEFAULT_CATEGORY
}

/// Icon for a category, falling back to the default category's icon.
pub fn category_icon(category: &str) -> &'static str {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.category == category)
        .or_else(|| {
            CATEGORY_RULES
                .iter()
                .find(|rule| rule.category == DEFAULT_CATEGORY)
        })
        .map(|rule| rule.icon)
        .unwrap_or("🎨")
}

/// The static category → icon table serialized into articles-db.json.
pub fn category_table() -> BTreeMap<String, String> {
    CATEGORY_RULES
        .iter()
        .map(|rule| (rule.category.to_string(), rule.icon.to_string()))
        .collect()
}

/// Derive an FAQ-style question from an article title.
///
/// Substring rules, checked in order: comparison titles ("vs"), choice
/// titles ("oder"), titles already asking "warum", then a generic frame.
pub fn derive_question(title: &str) -> String {
    let title = normalize_ws(title);
    let lower = title.to_lowercase();

    if lower.contains(" vs ") || lower.contains(" vs. ") {
        return format!("Was ist besser: {title}?");
    }
    if lower.contains("warum") {
        if title.ends_with('?') {
            return title;
        }
        return format!("{title}?");
    }
    if lower.contains(" oder ") {
        return format!("{title}: Was passt besser?");
    }
    format!("Was sollten Sie über {title} wissen?")
}

/// Derive an FAQ answer from the first paragraph: normalize whitespace
/// and truncate to roughly `limit` characters at a word boundary.
pub fn derive_answer(text: &str, limit: usize) -> String {
    let text = normalize_ws(text);
    if text.chars().count() <= limit {
        return text;
    }

    let cut = truncate_chars(&text, limit);
    let cut = match cut.rfind(' ') {
        Some(idx) => &cut[..idx],
        None => cut,
    };
    format!("{}...", cut.trim_end_matches(['.', ',', ';', ':']))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_category_priority_order() {
        // SEO outranks Webdesign even though both match
        assert_eq!(guess_category("SEO für Ihre Website"), "SEO");
        assert_eq!(guess_category("WordPress Theme Design"), "WordPress");
        assert_eq!(guess_category("Moderne Homepage"), "Webdesign");
    }

    #[test]
    fn test_guess_category_default() {
        assert_eq!(guess_category("Lorem ipsum"), "Webdesign");
    }

    #[test]
    fn test_guess_category_case_insensitive() {
        assert_eq!(guess_category("GOOGLE Ranking verbessern"), "SEO");
    }

    #[test]
    fn test_category_icon() {
        assert_eq!(category_icon("SEO"), "🔍");
        assert_eq!(category_icon("Unbekannt"), "🎨");
    }

    #[test]
    fn test_category_table_complete() {
        let table = category_table();
        assert_eq!(table.len(), CATEGORY_RULES.len());
        assert_eq!(table.get("Performance").map(String::as_str), Some("⚡"));
    }

    #[test]
    fn test_derive_question_vs() {
        assert_eq!(
            derive_question("WordPress vs. Baukasten"),
            "Was ist besser: WordPress vs. Baukasten?"
        );
    }

    #[test]
    fn test_derive_question_warum() {
        assert_eq!(
            derive_question("Warum SEO wichtig ist"),
            "Warum SEO wichtig ist?"
        );
        // Already a question: unchanged
        assert_eq!(
            derive_question("Warum braucht meine Firma SEO?"),
            "Warum braucht meine Firma SEO?"
        );
    }

    #[test]
    fn test_derive_question_oder() {
        assert_eq!(
            derive_question("Eigene Website oder Social Media"),
            "Eigene Website oder Social Media: Was passt besser?"
        );
    }

    #[test]
    fn test_derive_question_generic() {
        assert_eq!(
            derive_question("Barrierefreiheit im Web"),
            "Was sollten Sie über Barrierefreiheit im Web wissen?"
        );
    }

    #[test]
    fn test_derive_answer_short_text_unchanged() {
        assert_eq!(derive_answer("Kurzer Text.", 250), "Kurzer Text.");
    }

    #[test]
    fn test_derive_answer_truncates_at_word_boundary() {
        let text = "Ein sehr langer Absatz der deutlich mehr Inhalt hat als erlaubt ist";
        let answer = derive_answer(text, 30);
        assert!(answer.ends_with("..."));
        assert!(answer.chars().count() <= 33);
        // No cut mid-word
        assert!(text.starts_with(answer.trim_end_matches("...")));
    }
}
