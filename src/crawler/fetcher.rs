//! HTTP fetcher implementation
//!
//! This module handles all plain HTTP requests for the crawler:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-call timeout and a body size cap
//! - Error classification into a single `success` flag
//!
//! A failed fetch is never an error for the caller. The URL still counts as visited and
//! simply contributes no links.

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Result of one fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The URL that was requested
    pub url: Url,
    /// Final URL after redirects, when a response arrived
    pub final_url: Option<Url>,
    /// Page body (empty unless `success`)
    pub html: String,
    pub success: bool,
    /// HTTP status code, when a response arrived
    pub status: Option<u16>,
    /// Failure description for logging
    pub error: Option<String>,
}

impl FetchOutcome {
    pub(crate) fn failed(url: &Url, status: Option<u16>, error: String) -> Self {
        Self {
            url: url.clone(),
            final_url: None,
            html: String::new(),
            success: false,
            status,
            error: Some(error),
        }
    }

    /// Base for resolving links found in the body
    pub fn base_url(&self) -> &Url {
        self.final_url.as_ref().unwrap_or(&self.url)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use product_scout::config::UserAgentConfig;
/// use product_scout::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ProductScout".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL as HTML
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | 2xx with an HTML content type | `success = true`, body truncated to `max_bytes` |
/// | Non-2xx status | `success = false` |
/// | Non-HTML content type | `success = false` |
/// | Timeout / connection error | `success = false` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Deadline for the whole request including the body
/// * `max_bytes` - Body size cap
pub async fn fetch_url(client: &Client, url: &Url, timeout: Duration, max_bytes: usize) -> FetchOutcome {
    let mut response = match client.get(url.as_str()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            tracing::warn!("Fetch failed for {}: {}", url, error);
            return FetchOutcome::failed(url, None, error);
        }
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        tracing::warn!("Fetch failed for {}: HTTP {}", url, status.as_u16());
        return FetchOutcome::failed(url, Some(status.as_u16()), format!("HTTP {}", status));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    if !is_html(&content_type) {
        tracing::debug!("Skipping non-HTML {} ({})", url, content_type);
        return FetchOutcome::failed(
            url,
            Some(status.as_u16()),
            format!("Expected HTML, got {}", content_type),
        );
    }

    let mut body: Vec<u8> = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let room = max_bytes.saturating_sub(body.len());
                if chunk.len() >= room {
                    body.extend_from_slice(&chunk[..room]);
                    tracing::debug!("Truncated body of {} at {} bytes", url, max_bytes);
                    break;
                }
                body.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed reading body of {}: {}", url, e);
                return FetchOutcome::failed(url, Some(status.as_u16()), e.to_string());
            }
        }
    }

    FetchOutcome {
        url: url.clone(),
        final_url: Some(final_url),
        html: String::from_utf8_lossy(&body).into_owned(),
        success: true,
        status: Some(status.as_u16()),
        error: None,
    }
}

/// Missing content types are treated as HTML
fn is_html(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}
