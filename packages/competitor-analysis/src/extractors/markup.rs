//! Page outline recovery from HTML markup.
//!
//! Shared by both webpage paths: the fast path parses the fetched body, the
//! full path parses the rendered DOM.

use scraper::{ElementRef, Html, Selector};

use crate::types::content::PageOutline;
use crate::types::text::squash_whitespace;

/// A paragraph must have more visible characters than this to count.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

/// Recover title, first `<h1>` and the first substantial paragraph.
///
/// Missing elements leave their field empty; this never fails.
pub fn parse_outline(html: &str) -> PageOutline {
    let document = Html::parse_document(html);

    PageOutline {
        title: first_text(&document, "title"),
        heading: first_text(&document, "h1"),
        lead_paragraph: lead_paragraph(&document),
    }
    .capped()
}

fn visible_text(element: ElementRef<'_>) -> String {
    squash_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(visible_text)
        .filter(|text| !text.is_empty())
}

/// First `<p>` whose visible text exceeds the threshold; shorter ones are skipped.
fn lead_paragraph(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    document
        .select(&selector)
        .map(visible_text)
        .find(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
}
