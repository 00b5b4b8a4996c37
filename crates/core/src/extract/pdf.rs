//! PDF to plain text.
//!
//! Wraps `pdf-extract` with error handling for:
//! - corrupted or password-protected documents
//! - scanned/image-only documents with no text layer

use std::panic;

use crate::{ContentOrigin, PrecisError, Result};

/// The PDF header may be preceded by junk; readers scan this many bytes for it.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Returns true if the `%PDF-` magic appears near the start of `bytes`.
pub fn is_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    head.windows(5).any(|window| window == b"%PDF-")
}

/// Extracts the text of every page, in page order.
///
/// Pages without text are skipped; the rest are joined with newlines and
/// the result is trimmed. Unreadable documents fail with
/// [`PrecisError::MalformedDocument`], documents without any text with
/// [`PrecisError::EmptyContent`].
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    if !is_pdf(bytes) {
        return Err(PrecisError::MalformedDocument("missing %PDF- header".to_string()));
    }

    let pages = read_pages(bytes)?;
    tracing::debug!(pages = pages.len(), "read PDF pages");

    join_pages(pages)
}

/// Joins per-page text the way [`extract_pdf_text`] does.
pub fn join_pages<I, S>(pages: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = pages
        .into_iter()
        .filter(|page| !page.as_ref().trim().is_empty())
        .map(|page| page.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();

    if text.is_empty() {
        return Err(PrecisError::EmptyContent(ContentOrigin::Document));
    }

    Ok(text.to_string())
}

fn read_pages(bytes: &[u8]) -> Result<Vec<String>> {
    guard_parser(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
}

/// Runs a PDF parser call, mapping both its error and a panic to
/// [`PrecisError::MalformedDocument`].
///
/// pdf-extract panics on some malformed object streams. The panic hook is
/// process-wide and left alone, so the default hook still prints the panic
/// message to stderr before the error is returned.
fn guard_parser<T, E, F>(parse: F) -> Result<T>
where
    E: std::fmt::Display,
    F: FnOnce() -> std::result::Result<T, E> + panic::UnwindSafe,
{
    match panic::catch_unwind(parse) {
        Ok(parsed) => parsed.map_err(|e| PrecisError::MalformedDocument(e.to_string())),
        Err(_) => {
            tracing::warn!("PDF parser panicked on malformed input");
            Err(PrecisError::MalformedDocument("PDF parser aborted on malformed structure".to_string()))
        }
    }
}
