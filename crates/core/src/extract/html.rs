//! HTML to plain text.
//!
//! Boilerplate elements are removed with a streaming `lol_html` rewrite,
//! then the remaining text nodes are collected with `scraper`. Text under a
//! boilerplate element is skipped during collection as well, which covers
//! markup the strict rewriter rejects.

use scraper::Html;

use crate::{ContentOrigin, PrecisError, Result};

/// Elements removed, with their content, before text extraction.
pub const BOILERPLATE_TAGS: [&str; 6] = ["script", "style", "nav", "footer", "header", "aside"];

/// Extracts the visible text of an HTML page.
///
/// Fails with [`PrecisError::EmptyContent`] when nothing but whitespace
/// remains after boilerplate removal.
///
/// # Example
///
/// ```rust
/// use precis_core::extract_html_text;
///
/// let text = extract_html_text("<body><p>Hello world</p></body>").unwrap();
/// assert_eq!(text, "Hello world");
/// ```
pub fn extract_html_text(html: &str) -> Result<String> {
    let cleaned = strip_boilerplate(html);
    let text = visible_text(&cleaned);

    if text.trim().is_empty() {
        return Err(PrecisError::EmptyContent(ContentOrigin::Page));
    }

    Ok(text)
}

/// Removes script, style, nav, footer, header and aside elements.
pub fn strip_boilerplate(html: &str) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: BOILERPLATE_TAGS
                .iter()
                .map(|tag| {
                    lol_html::element!(*tag, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
        tracing::debug!("boilerplate rewrite failed, filtering during text collection");
        return html.to_string();
    }

    output
}

/// Collects every text node outside boilerplate elements, trimmed, one per
/// line, skipping blank ones.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|el| BOILERPLATE_TAGS.contains(&el.name()))
        })
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
