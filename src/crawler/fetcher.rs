//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the crawler's user agent and timeout
//! - HEAD requests used by the redirect resolver
//! - GET requests used by the content validator and link extractor
//! - Error classification for logging
//!
//! Redirects are never followed by the client; the resolver walks chains itself.

use crate::config::UserAgentConfig;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Result of a GET fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Headers of a HEAD response that the redirect resolver needs
#[derive(Debug, Clone)]
pub struct HeadResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub content_type: Option<String>,
}

/// Builds an HTTP client with proper configuration
///
/// The timeout applies to every request issued through the client.
///
/// # Example
///
/// ```no_run
/// use sitemap_forge::config::UserAgentConfig;
/// use sitemap_forge::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a header-only request
pub async fn fetch_head(client: &Client, url: &str) -> Result<HeadResponse, reqwest::Error> {
    let response = client.head(url).send().await?;

    Ok(HeadResponse {
        status: response.status(),
        location: header_value(response.headers(), header::LOCATION),
        content_type: header_value(response.headers(), header::CONTENT_TYPE),
    })
}

/// Fetches a page body with a GET request
///
/// Never fails: every outcome, including timeouts, is a `FetchResult` variant.
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = header_value(response.headers(), header::CONTENT_TYPE).unwrap_or_default();

    match response.text().await {
        Ok(body) => FetchResult::Success {
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: describe_error(&e),
        },
    }
}

/// Returns true for HTML media types (`text/html`, `application/xhtml+xml`)
pub fn is_html_content_type(content_type: &str) -> bool {
    let essence = mime_essence(content_type);
    essence == "text/html" || essence == "application/xhtml+xml"
}

/// Strips parameters from a Content-Type value: `text/html; charset=utf-8` → `text/html`
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Produces a short, log-friendly description of a request error
pub fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}

fn header_value(headers: &header::HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
