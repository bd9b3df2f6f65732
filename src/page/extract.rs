//! Metadata and text extraction from a page.
//!
//! Two layers cooperate here: `tl` parses the document for metadata
//! queries (title, meta description, headings, `<article>` detection),
//! while the span tokenizer from `utils::html` works on a boilerplate-free
//! copy of the markup to cut heading-delimited sections and the full body
//! text. Every cap applied here comes from `[knowledge]` config.

use crate::utils::html::{
    self, Token, Tokenizer, attr, consume_to_close, is_void_element, normalize_ws,
    parse_attributes, text_content, truncate_chars,
};
use crate::utils::slug;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Text caps for extraction, from `[knowledge]`.
#[derive(Debug, Clone, Copy)]
pub struct ExtractLimits {
    pub section_limit: usize,
    pub text_limit: usize,
}

impl From<&crate::config::KnowledgeSection> for ExtractLimits {
    fn from(section: &crate::config::KnowledgeSection) -> Self {
        Self {
            section_limit: section.section_limit,
            text_limit: section.text_limit,
        }
    }
}

/// Classification of a page for the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Article,
    Homepage,
    Blog,
    Page,
}

/// A heading with its level (1-3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// An `<h2>`-delimited content section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub text: String,
}

/// Everything extracted from one page.
#[derive(Debug, Clone)]
pub struct PageExtract {
    pub title: String,
    pub description: String,
    pub kind: PageKind,
    pub headings: Vec<Heading>,
    pub sections: Vec<Section>,
    pub text: String,
}

/// Extract metadata, sections and body text from a page.
pub fn extract(page_slug: &str, html: &str, limits: &ExtractLimits) -> Result<PageExtract> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|_| anyhow!("failed to parse html"))?;
    let parser = dom.parser();

    let mut title_h1: Option<String> = None;
    let mut title_tag: Option<String> = None;
    let mut description = String::new();
    let mut has_article = false;
    let mut headings = Vec::new();

    for node in dom.nodes() {
        let Some(tag) = node.as_tag() else { continue };
        let name = tag.name().as_utf8_str().to_ascii_lowercase();
        match name.as_str() {
            "article" => has_article = true,
            "h1" | "h2" | "h3" => {
                let text = normalize_ws(&tag.inner_text(parser));
                if text.is_empty() {
                    continue;
                }
                let level = name.as_bytes()[1] - b'0';
                if level == 1 && title_h1.is_none() {
                    title_h1 = Some(text.clone());
                }
                headings.push(Heading { level, text });
            }
            "title" => {
                if title_tag.is_none() {
                    let text = normalize_ws(&tag.inner_text(parser));
                    if !text.is_empty() {
                        title_tag = Some(text);
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
            _ => {}
        }
    }

    let title = title_h1
        .or(title_tag)
        .unwrap_or_else(|| slug::humanize(page_slug));

    let kind = classify(has_article, page_slug);

    let cleaned = clean_markup(html);
    let sections = cut_sections(&cleaned, limits.section_limit);
    let text = truncate_chars(&text_content(&cleaned), limits.text_limit).to_string();

    Ok(PageExtract {
        title,
        description,
        kind,
        headings,
        sections,
        text,
    })
}

/// Attribute value of a `tl` tag as an owned string.
pub fn attr_value(tag: &tl::HTMLTag<'_>, name: &str) -> Option<String> {
    tag.attributes()
        .get(name)
        .flatten()
        .map(|bytes| bytes.as_utf8_str().into_owned())
}

/// Classify a page: `<article>` wins, then the homepage file, then
/// blog-ish file names.
fn classify(has_article: bool, page_slug: &str) -> PageKind {
    if has_article {
        PageKind::Article
    } else if page_slug == "index" {
        PageKind::Homepage
    } else if page_slug.contains("blog") {
        PageKind::Blog
    } else {
        PageKind::Page
    }
}

/// Strip navigation and boilerplate regions from the markup: the whole
/// head, script, style, nav, header, footer, plus anything id'd or
/// classed as a modal or side menu.
pub fn clean_markup(html: &str) -> String {
    html::remove_elements(html, |name, attrs| {
        if matches!(name, "head" | "script" | "style" | "nav" | "header" | "footer") {
            return true;
        }
        // Cheap pre-filter before allocating the attribute list
        if !attrs.contains("modal") && !attrs.contains("side-menu") {
            return false;
        }
        let parsed = parse_attributes(attrs);
        let id = attr(&parsed, "id").unwrap_or("");
        let class = attr(&parsed, "class").unwrap_or("");
        id.contains("modal")
            || id.contains("side-menu")
            || class
                .split_whitespace()
                .any(|c| c.contains("modal") || c.contains("side-menu"))
    })
}

/// Cut `<h2>`-delimited sections: for each h2, collect the text of the
/// following top-level paragraph/list/span/div elements until the next h2.
fn cut_sections(cleaned: &str, section_limit: usize) -> Vec<Section> {
    let spans = html::element_spans(cleaned, "h2");
    let mut sections = Vec::with_capacity(spans.len());

    for (i, span) in spans.iter().enumerate() {
        let heading = text_content(&cleaned[span.clone()]);
        if heading.is_empty() {
            continue;
        }
        let body_end = spans.get(i + 1).map_or(cleaned.len(), |next| next.start);
        let body = &cleaned[span.end..body_end];
        let text = section_text(body);
        sections.push(Section {
            heading,
            text: truncate_chars(&text, section_limit).to_string(),
        });
    }

    sections
}

/// Concatenated text of the top-level p/ul/ol/span/div elements in a
/// markup slice.
fn section_text(slice: &str) -> String {
    let mut out = String::new();
    let mut tokens = Tokenizer::new(slice);
    while let Some(token) = tokens.next() {
        let Token::Open {
            name,
            self_closing,
            span,
            ..
        } = token
        else {
            continue;
        };
        let name = name.to_ascii_lowercase();
        if self_closing || is_void_element(&name) {
            continue;
        }
        let end = consume_to_close(&mut tokens, slice.len());
        if matches!(name.as_str(), "p" | "ul" | "ol" | "span" | "div") {
            let text = text_content(&slice[span.start..end]);
            if !text.is_empty() {
                out.push_str(&text);
                out.push(' ');
            }
        }
    }
    normalize_ws(&out)
}
