//! HTML utility functions.
//!
//! Provides common HTML processing functions:
//! - `escape()`, `escape_attr()` - HTML entity escaping
//! - `unescape()` - entity decoding for extracted text
//! - `Tokenizer` - byte-offset HTML tag scanner for in-place rewriting
//! - `find_element_by_id()`, `element_spans()` - outer-span lookup
//! - `remove_elements()`, `text_content()` - boilerplate stripping
//!
//! The tokenizer reports byte spans into the original source, so rewriting
//! passes can splice replacement markup without re-serializing the document.

use std::borrow::Cow;
use std::ops::Range;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape HTML attribute values.
///
/// Identical to `escape()` but semantically indicates attribute context.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '&' {
            result.push(c);
            continue;
        }

        // Collect an entity candidate: alphanumerics (or a leading '#')
        // up to a terminating ';'. Anything else is a bare ampersand.
        let mut entity = String::new();
        let mut terminated = false;
        while let Some(&next) = chars.peek() {
            if next == ';' {
                chars.next();
                terminated = true;
                break;
            }
            let valid = next.is_ascii_alphanumeric() || (entity.is_empty() && next == '#');
            if !valid || entity.len() >= 10 {
                break;
            }
            entity.push(chars.next().unwrap());
        }

        // Bare '&' (or '&;'): emit verbatim
        if entity.is_empty() {
            result.push('&');
            if terminated {
                result.push(';');
            }
            continue;
        }
        // Unterminated run like "& Antworten": not an entity
        if !terminated {
            result.push('&');
            result.push_str(&entity);
            continue;
        }

        // Decode entity
        match entity.as_str() {
            "lt" => result.push('<'),
            "gt" => result.push('>'),
            "amp" => result.push('&'),
            "quot" => result.push('"'),
            "apos" => result.push('\''),
            "nbsp" => result.push(' '),
            s if s.starts_with('#') => {
                let code = if s.starts_with("#x") || s.starts_with("#X") {
                    u32::from_str_radix(&s[2..], 16).ok()
                } else {
                    s[1..].parse().ok()
                };
                if let Some(c) = code.and_then(char::from_u32) {
                    result.push(c);
                } else {
                    result.push('&');
                    result.push_str(&entity);
                    result.push(';');
                }
            }
            _ => {
                result.push('&');
                result.push_str(&entity);
                result.push(';');
            }
        }
    }

    Cow::Owned(result)
}

// =============================================================================
// Element Classification
// =============================================================================

/// Check if an HTML tag is a void element (self-closing).
///
/// Void elements cannot have children and never produce a close tag.
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

// =============================================================================
// Attribute Parsing
// =============================================================================

/// Parse HTML-style attributes from a string.
///
/// Input: `id="footer-placeholder" class="foo" hidden`
/// Output: `vec![("id", "footer-placeholder"), ("class", "foo"), ("hidden", "")]`
pub fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }

        // Read attribute name
        let mut name = String::new();
        name.push(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next.is_whitespace() {
                break;
            }
            name.push(chars.next().unwrap());
        }

        // Skip whitespace
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        // Check for value
        if chars.peek() == Some(&'=') {
            chars.next(); // consume '='

            // Skip whitespace
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }

            // Read value
            let value = if chars.peek() == Some(&'"') || chars.peek() == Some(&'\'') {
                let quote = chars.next().unwrap();
                let mut val = String::new();
                for c in chars.by_ref() {
                    if c == quote {
                        break;
                    }
                    val.push(c);
                }
                val
            } else {
                // Unquoted value (read until whitespace)
                let mut val = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    val.push(chars.next().unwrap());
                }
                val
            };

            attrs.push((name.to_ascii_lowercase(), value));
        } else {
            // Boolean attribute (no value)
            attrs.push((name.to_ascii_lowercase(), String::new()));
        }
    }

    attrs
}

/// Look up an attribute value in a parsed attribute list.
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Check whether a space-separated class attribute value contains a class.
pub fn has_class(class_value: &str, class: &str) -> bool {
    class_value.split_whitespace().any(|c| c == class)
}

// =============================================================================
// Tag Tokenizer
// =============================================================================

/// A scanned token with byte spans into the original document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// An opening tag: `<name attrs>` or `<name attrs/>`.
    Open {
        name: &'a str,
        attrs: &'a str,
        self_closing: bool,
        span: Range<usize>,
    },
    /// A closing tag: `</name>`.
    Close { name: &'a str, span: Range<usize> },
    /// Text between tags. Raw script/style content is never reported.
    Text { span: Range<usize> },
}

/// Streaming HTML tag scanner.
///
/// Not a conforming HTML parser: it tracks quotes inside tags, skips
/// comments and doctypes, and treats script/style bodies as opaque. That
/// is exactly enough for span-based rewriting of well-formed pages.
pub struct Tokenizer<'a> {
    html: &'a str,
    pos: usize,
    /// Set after an `<script>`/`<style>` open: skip raw content until the
    /// matching close tag.
    raw_until: Option<&'a str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(html: &'a str) -> Self {
        Self {
            html,
            pos: 0,
            raw_until: None,
        }
    }

    /// Scan forward to the `>` that ends a tag, honoring quoted values.
    fn tag_end(&self, from: usize) -> Option<usize> {
        let bytes = self.html.as_bytes();
        let mut quote: Option<u8> = None;
        let mut i = from;
        while i < bytes.len() {
            match (quote, bytes[i]) {
                (Some(q), b) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"') => quote = Some(b'"'),
                (None, b'\'') => quote = Some(b'\''),
                (None, b'>') => return Some(i),
                (None, _) => {}
            }
            i += 1;
        }
        None
    }

    /// Find the close tag of a raw-text element, case-insensitively.
    fn find_raw_close(&self, name: &str) -> Option<usize> {
        let bytes = self.html.as_bytes();
        let needle = name.as_bytes();
        let mut i = self.pos;
        while i + needle.len() + 2 <= bytes.len() {
            if bytes[i] == b'<'
                && bytes[i + 1] == b'/'
                && bytes[i + 2..i + 2 + needle.len()].eq_ignore_ascii_case(needle)
            {
                return Some(i);
            }
            i += 1;
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        // Skip opaque script/style bodies first
        if let Some(name) = self.raw_until.take() {
            self.pos = self.find_raw_close(name).unwrap_or(self.html.len());
        }

        loop {
            if self.pos >= self.html.len() {
                return None;
            }

            let rest = &self.html[self.pos..];
            let Some(lt) = rest.find('<') else {
                let span = self.pos..self.html.len();
                self.pos = self.html.len();
                return Some(Token::Text { span });
            };

            if lt > 0 {
                let span = self.pos..self.pos + lt;
                self.pos += lt;
                return Some(Token::Text { span });
            }

            let start = self.pos;
            let rest = &self.html[start..];

            // Comment
            if rest.starts_with("<!--") {
                self.pos = match rest.find("-->") {
                    Some(i) => start + i + 3,
                    None => self.html.len(),
                };
                continue;
            }

            // Doctype / processing instruction
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.pos = match self.tag_end(start + 1) {
                    Some(i) => i + 1,
                    None => self.html.len(),
                };
                continue;
            }

            // Close tag
            if let Some(after) = rest.strip_prefix("</") {
                let name_len = after
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
                    .unwrap_or(after.len());
                let name = &self.html[start + 2..start + 2 + name_len];
                let end = match self.tag_end(start + 2) {
                    Some(i) => i + 1,
                    None => self.html.len(),
                };
                self.pos = end;
                if name.is_empty() {
                    continue;
                }
                return Some(Token::Close {
                    name,
                    span: start..end,
                });
            }

            // Open tag
            if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                let after = &rest[1..];
                let name_len = after
                    .find(|c: char| !c.is_ascii_alphanumeric() && c != '-')
                    .unwrap_or(after.len());
                let name = &self.html[start + 1..start + 1 + name_len];
                let Some(gt) = self.tag_end(start + 1 + name_len) else {
                    self.pos = self.html.len();
                    return None;
                };
                let mut attrs = &self.html[start + 1 + name_len..gt];
                let self_closing = attrs.trim_end().ends_with('/');
                if self_closing {
                    attrs = attrs.trim_end().trim_end_matches('/');
                }
                self.pos = gt + 1;

                if !self_closing && (name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")) {
                    self.raw_until = Some(name);
                }

                return Some(Token::Open {
                    name,
                    attrs,
                    self_closing,
                    span: start..gt + 1,
                });
            }

            // Stray '<': treat as text
            let span = start..start + 1;
            self.pos += 1;
            return Some(Token::Text { span });
        }
    }
}

// =============================================================================
// Span Queries
// =============================================================================

/// Outer span of a located element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpan {
    /// Lowercased tag name.
    pub name: String,
    /// Byte range of the full element, open tag through close tag.
    pub outer: Range<usize>,
}

/// Consume tokens until the element opened before this call is closed.
///
/// Returns the byte offset just past the matching close tag. Unbalanced
/// markup falls back to the end of input.
pub fn consume_to_close(tokens: &mut Tokenizer<'_>, len: usize) -> usize {
    let mut depth = 1usize;
    for token in tokens {
        match token {
            Token::Open {
                name, self_closing, ..
            } => {
                if !self_closing && !is_void_element(&name.to_ascii_lowercase()) {
                    depth += 1;
                }
            }
            Token::Close { span, .. } => {
                depth -= 1;
                if depth == 0 {
                    return span.end;
                }
            }
            Token::Text { .. } => {}
        }
    }
    len
}

/// Find the outer span of the element carrying `id`.
///
/// Only the first match is reported; the placeholder contract requires at
/// most one element per recognized id.
pub fn find_element_by_id(html: &str, id: &str) -> Option<ElementSpan> {
    let mut tokens = Tokenizer::new(html);
    while let Some(token) = tokens.next() {
        let Token::Open {
            name,
            attrs,
            self_closing,
            span,
        } = token
        else {
            continue;
        };

        // Cheap pre-filter before allocating the attribute list
        if !attrs.contains(id) {
            continue;
        }
        let parsed = parse_attributes(attrs);
        if attr(&parsed, "id") != Some(id) {
            continue;
        }

        let name = name.to_ascii_lowercase();
        let end = if self_closing || is_void_element(&name) {
            span.end
        } else {
            consume_to_close(&mut tokens, html.len())
        };
        return Some(ElementSpan {
            name,
            outer: span.start..end,
        });
    }
    None
}

/// Outer spans of all non-nested elements with the given tag name.
pub fn element_spans(html: &str, target: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut tokens = Tokenizer::new(html);
    while let Some(token) = tokens.next() {
        if let Token::Open {
            name,
            self_closing,
            span,
            ..
        } = token
            && name.eq_ignore_ascii_case(target)
        {
            let end = if self_closing || is_void_element(target) {
                span.end
            } else {
                consume_to_close(&mut tokens, html.len())
            };
            spans.push(span.start..end);
        }
    }
    spans
}

/// Remove whole elements (outer markup) for which the predicate matches.
///
/// The predicate receives the lowercased tag name and the raw attribute
/// string. Nested matches inside a removed element are gone with it.
pub fn remove_elements<F>(html: &str, pred: F) -> String
where
    F: Fn(&str, &str) -> bool,
{
    let mut removed: Vec<Range<usize>> = Vec::new();
    let mut tokens = Tokenizer::new(html);
    while let Some(token) = tokens.next() {
        if let Token::Open {
            name,
            attrs,
            self_closing,
            span,
            ..
        } = token
        {
            let name = name.to_ascii_lowercase();
            if pred(&name, attrs) {
                let end = if self_closing || is_void_element(&name) {
                    span.end
                } else {
                    consume_to_close(&mut tokens, html.len())
                };
                removed.push(span.start..end);
            }
        }
    }

    if removed.is_empty() {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    for range in removed {
        if range.start > pos {
            out.push_str(&html[pos..range.start]);
        }
        pos = pos.max(range.end);
    }
    if pos < html.len() {
        out.push_str(&html[pos..]);
    }
    out
}

// =============================================================================
// Text Extraction
// =============================================================================

/// Concatenate all text nodes, decoding entities. Script/style bodies are
/// skipped by the tokenizer.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::new();
    for token in Tokenizer::new(html) {
        if let Token::Text { span } = token {
            out.push_str(&unescape(&html[span]));
            // Tag boundaries separate words
            out.push(' ');
        }
    }
    out
}

/// Collapse all whitespace runs to single spaces.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracted, whitespace-normalized text content of an HTML snippet.
pub fn text_content(html: &str) -> String {
    normalize_ws(&strip_tags(html))
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// Tests
// =============================================================================
