//! User-supplied inputs to summarize.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Filename recorded for uploads that arrive without one.
pub const UNKNOWN_PDF_NAME: &str = "unknown.pdf";

/// The kind of a [`Source`], as recorded in event logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "URL")]
    Url,
    #[serde(rename = "PDF")]
    Pdf,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Url => write!(f, "URL"),
            SourceKind::Pdf => write!(f, "PDF"),
        }
    }
}

/// A web article URL or an uploaded PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Pdf { filename: String, bytes: Vec<u8> },
}

impl Source {
    pub fn url(url: impl Into<String>) -> Self {
        Source::Url(url.into())
    }

    /// Creates a PDF source, naming it [`UNKNOWN_PDF_NAME`] when `filename` is blank.
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let filename = if filename.trim().is_empty() { UNKNOWN_PDF_NAME.to_string() } else { filename };
        Source::Pdf { filename, bytes }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Url(_) => SourceKind::Url,
            Source::Pdf { .. } => SourceKind::Pdf,
        }
    }

    /// The URL or the filename.
    pub fn identifier(&self) -> &str {
        match self {
            Source::Url(url) => url,
            Source::Pdf { filename, .. } => filename,
        }
    }

    /// Size of the uploaded payload in bytes; zero for URLs.
    pub fn byte_len(&self) -> usize {
        match self {
            Source::Url(_) => 0,
            Source::Pdf { bytes, .. } => bytes.len(),
        }
    }
}
