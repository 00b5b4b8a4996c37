//! Content fetching from URLs and local files.
//!
//! This module retrieves the raw inputs of the pipeline: HTML pages over
//! HTTP/HTTPS and PDF bytes from disk.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{NetworkError, PrecisError, Result};

/// Scheme prefixes a URL must start with to be fetched.
pub const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// HTTP client configuration for fetching web pages.
///
/// This struct controls timeout and user agent settings for HTTP requests.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 10, user_agent: "Mozilla/5.0 (compatible; Precis/1.0)".to_string() }
    }
}

/// Checks that `url` starts with `http://` or `https://` and parses it.
///
/// No network traffic happens here, so a rejected URL never reaches the wire.
pub fn validate_url(url: &str) -> Result<Url> {
    if !ACCEPTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(PrecisError::InvalidInput(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    Url::parse(url).map_err(|e| PrecisError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))
}

/// Fetches HTML content from a URL.
///
/// Performs a single HTTP GET (redirects are followed) with the configured
/// timeout and User-Agent. Non-2xx responses fail with
/// [`NetworkError::Status`]; nothing is retried.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = validate_url(url)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(|e| PrecisError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .await
        .map_err(|e| classify(url, config, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: url.to_string(),
        }
        .into());
    }

    let content = response.text().await.map_err(|e| classify(url, config, e))?;
    tracing::debug!(url, bytes = content.len(), "fetched page");

    Ok(content)
}

fn classify(url: &str, config: &FetchConfig, err: reqwest::Error) -> PrecisError {
    if err.is_timeout() {
        NetworkError::Timeout { timeout: config.timeout }.into()
    } else {
        NetworkError::Connection { url: url.to_string(), message: err.to_string() }.into()
    }
}

/// Reads an uploaded file from disk.
///
/// A missing path is an [`PrecisError::InvalidInput`], the same as a missing upload.
pub fn fetch_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(PrecisError::InvalidInput(format!(
            "Please upload a PDF file before summarizing ({} not found).",
            path.display()
        )));
    }

    fs::read(path).map_err(|e| PrecisError::InvalidInput(format!("Could not read {}: {}", path.display(), e)))
}
