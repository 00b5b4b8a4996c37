//! Error types for Precis operations.
//!
//! This module defines the main error type [`PrecisError`], a closed set of
//! failure kinds shared by the extractors, the generation client and the
//! summarization pipeline. Callers classify failures by matching on the
//! variant, never on the error type of the underlying HTTP, PDF or model
//! library.
//!
//! # Example
//!
//! ```rust
//! use precis_core::{PrecisError, Result};
//!
//! fn require_text(text: &str) -> Result<&str> {
//!     if text.trim().is_empty() {
//!         return Err(PrecisError::InvalidInput("Nothing to summarize".to_string()));
//!     }
//!     Ok(text)
//! }
//! # assert!(require_text(" ").is_err());
//! ```

use std::fmt;

use thiserror::Error;

use crate::events::EventType;

/// Billing page for the Google Cloud project behind the API key.
pub const BILLING_URL: &str = "https://console.cloud.google.com/billing";

/// Rate limit and quota dashboard for the Gemini API.
pub const RATE_LIMIT_URL: &str = "https://ai.dev/rate-limit";

/// Main error type for summarization operations.
#[derive(Error, Debug)]
pub enum PrecisError {
    /// The user-supplied source was rejected before any work was done.
    ///
    /// Covers URLs without an accepted scheme and missing PDF uploads. The
    /// message is shown to the user verbatim.
    #[error("{0}")]
    InvalidInput(String),

    /// Fetching a web page failed.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The source was read successfully but yielded no usable text.
    #[error("{0}")]
    EmptyContent(ContentOrigin),

    /// The PDF structure could not be read (corrupt or password-protected).
    #[error("Could not read the PDF: {0}")]
    MalformedDocument(String),

    /// The generation client is missing required configuration.
    #[error("{0}")]
    Configuration(String),

    /// The generation endpoint reported resource exhaustion.
    ///
    /// The message already carries quota and billing remediation links.
    #[error("{0}")]
    QuotaExceeded(String),

    /// Any other generation or transport failure, with the original message.
    #[error("{0}")]
    Unexpected(String),
}

/// Failures of the outbound page fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// DNS, TLS or connection level failure.
    #[error("Connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-2xx status.
    #[error("{status} {reason} for url: {url}")]
    Status { status: u16, reason: String, url: String },
}

/// Which kind of source produced no text.
///
/// The display text tells the user the most likely cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrigin {
    /// An HTML page, usually behind a login wall or bot protection.
    Page,
    /// A PDF, usually a scanned or image-only document.
    Document,
}

impl fmt::Display for ContentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentOrigin::Page => write!(
                f,
                "No readable text could be extracted from this page. \
                 It may require a login or block automated access."
            ),
            ContentOrigin::Document => write!(
                f,
                "No text could be extracted from this PDF. \
                 It may be a scanned document or image-only PDF (OCR not supported)."
            ),
        }
    }
}

impl PrecisError {
    /// Builds the quota error with remediation links.
    pub fn quota_exceeded() -> Self {
        PrecisError::QuotaExceeded(format!(
            "Gemini API quota exceeded. Your request limit may be exhausted for today. \
             Check your usage and plan at {RATE_LIMIT_URL}, or enable billing for the \
             Google Cloud project linked to your API key at {BILLING_URL}. \
             You may need to wait until the quota resets or upgrade your plan."
        ))
    }

    /// Log event type under which this failure is recorded.
    pub fn event_type(&self) -> EventType {
        match self {
            PrecisError::InvalidInput(_) | PrecisError::EmptyContent(_) => EventType::ValidationError,
            PrecisError::Network(_) => EventType::FetchError,
            PrecisError::MalformedDocument(_) => EventType::PdfError,
            PrecisError::Configuration(_) | PrecisError::QuotaExceeded(_) | PrecisError::Unexpected(_) => {
                EventType::GeminiError
            }
        }
    }

    /// Friendly, category-specific text for the front-end.
    pub fn user_message(&self) -> String {
        match self {
            PrecisError::Network(NetworkError::Connection { .. }) => {
                "Could not reach that URL. Check your internet connection and verify the address.".to_string()
            }
            PrecisError::Network(NetworkError::Timeout { timeout }) => format!(
                "The request timed out after {timeout} seconds. The site may be slow or unavailable."
            ),
            PrecisError::Network(err @ NetworkError::Status { .. }) => {
                format!("HTTP error while fetching the page: {err}")
            }
            PrecisError::MalformedDocument(_) => {
                "Could not read the PDF. It may be corrupt or password-protected.".to_string()
            }
            PrecisError::Unexpected(message) => format!("An unexpected error occurred: {message}"),
            other => other.to_string(),
        }
    }
}

/// Result type alias for PrecisError.
pub type Result<T> = std::result::Result<T, PrecisError>;
