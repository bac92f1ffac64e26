//! Content extraction: HTML → readable plain text.
//!
//! The DOM is walked in document order with [`scraper`]. Subtrees that never
//! carry prose (`script`, `style`, `nav`, embedded media …) are skipped
//! outright, and block-level elements become line breaks so that
//! `<p>One</p><p>Two</p>` reads as "One Two" rather than "OneTwo". A final
//! pass trims every line, collapses whitespace runs and joins the fragments
//! with single spaces.

use crate::error::MapperError;
use crate::pipeline::normalize::NormalizedUrl;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Plain text extracted from one fetched page. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL the text was fetched from.
    pub url: NormalizedUrl,
    /// `<title>` text, if the page has one.
    pub title: Option<String>,
    /// Whitespace-normalised readable text in document order.
    pub text: String,
}

impl PageContent {
    /// Number of characters (not bytes) in `text`.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Elements whose whole subtree is dropped.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "iframe", "svg", "canvas", "object",
];

/// Elements that start a new line of text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// Extract readable text from an HTML document.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::with_capacity(html.len() / 4);
    collect_text(document.root_element(), &mut raw);
    normalise_whitespace(&raw)
}

/// The trimmed `<title>` text, if present and non-empty.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| normalise_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Build a [`PageContent`] from fetched HTML, enforcing the minimum length.
///
/// # Errors
/// [`MapperError::EmptyContent`] when fewer than `min_chars` characters of
/// text survive extraction.
pub fn page_content_from_html(
    url: &NormalizedUrl,
    html: &str,
    min_chars: usize,
) -> Result<PageContent, MapperError> {
    let text = extract_text(html);
    let chars = text.chars().count();
    debug!("Extracted {} chars of text from {}", chars, url);

    if text.is_empty() || chars < min_chars {
        return Err(MapperError::EmptyContent {
            url: url.to_string(),
            chars,
            min: min_chars,
        });
    }

    Ok(PageContent {
        url: url.clone(),
        title: extract_title(html),
        text,
    })
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let s: &str = text;
                out.push_str(s);
            }
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trim every line, collapse inner whitespace, drop empty lines and join the
/// rest with single spaces.
fn normalise_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
