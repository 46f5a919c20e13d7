//! Readable-text selection from raw HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, p").expect("static selector"));

/// Page chrome whose headings and paragraphs are not article text.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Extract heading and paragraph text in document order.
///
/// Whitespace inside each element is collapsed and elements are joined with
/// a single space. Elements nested in navigation chrome are skipped.
pub fn readable_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    doc.select(&TEXT_SELECTOR)
        .filter(|el| !inside_chrome(el))
        .map(|el| collapse_whitespace(el.text()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn inside_chrome(el: &ElementRef<'_>) -> bool {
    el.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|parent| CHROME_TAGS.contains(&parent.name()))
    })
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
