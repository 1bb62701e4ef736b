//! Content validation
//!
//! Decides whether a resolved page is real content rather than a soft 404,
//! an empty shell, or a pagination page past the end of a listing.

use crate::config::SiteConfig;
use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::page_number;
use crate::crawler::fetcher::{fetch_page, is_html_content_type, FetchResult};
use crate::url::is_content_path;
use scraper::{Html, Selector};
use url::Url;

/// Title fragments that mark an error page served with a 2xx status
const ERROR_TITLE_MARKERS: &[&str] = &[
    "404",
    "500",
    "not found",
    "error",
    "გვერდი ვერ მოიძებნა",
];

/// Heuristic signals gathered from one page body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSignals {
    /// Non-empty `<title>` without error markers
    pub has_title: bool,

    /// Main-content markup, or a body above the size threshold
    pub has_structure: bool,

    /// Domain keyword or product name somewhere in the body
    pub has_keywords: bool,

    /// For paginated URLs, whether listing markup is present; `None` otherwise
    pub listing_ok: Option<bool>,
}

impl ContentSignals {
    /// title ∧ (structure ∨ keywords) ∧ pagination rule
    pub fn is_real(&self) -> bool {
        self.has_title
            && (self.has_structure || self.has_keywords)
            && self.listing_ok.unwrap_or(true)
    }
}

/// Fetches `url` and checks it for real content
///
/// Non-content-worthy URLs are rejected without a request. Any fetch
/// failure, non-2xx status, or non-HTML content type is a rejection.
/// A response without a Content-Type header is treated as HTML.
pub async fn is_real_content(ctx: &CrawlContext, url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    if !is_content_path(&parsed) {
        tracing::trace!("Skipping validation of non-content path {}", url);
        return false;
    }

    let body = match fetch_page(&ctx.client, url).await {
        FetchResult::Success {
            content_type, body, ..
        } => {
            if !content_type.is_empty() && !is_html_content_type(&content_type) {
                tracing::debug!("Rejecting {}: content type {}", url, content_type);
                return false;
            }
            body
        }
        FetchResult::HttpError { status_code } => {
            tracing::debug!("Rejecting {}: HTTP {}", url, status_code);
            return false;
        }
        FetchResult::NetworkError { error } => {
            tracing::debug!("Rejecting {}: {}", url, error);
            return false;
        }
    };

    let signals = assess_content(&parsed, &body, &ctx.site);
    if !signals.is_real() {
        tracing::debug!("Rejecting {}: thin content {:?}", url, signals);
    }
    signals.is_real()
}

/// Computes the content signals of a page body
pub fn assess_content(url: &Url, body: &str, site: &SiteConfig) -> ContentSignals {
    let document = Html::parse_document(body);
    let lowered = body.to_lowercase();

    let has_title = extract_title(&document)
        .map(|title| !is_error_title(&title))
        .unwrap_or(false);

    let has_structure = body.len() >= site.min_body_bytes
        || site
            .main_content_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()));

    let has_keywords = lowered.contains(&site.product_name.to_lowercase())
        || site
            .keywords
            .iter()
            .any(|keyword| lowered.contains(&keyword.to_lowercase()));

    let listing_ok = page_number(url).map(|_| {
        site.listing_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    });

    ContentSignals {
        has_title,
        has_structure,
        has_keywords,
        listing_ok,
    }
}

/// Extracts the trimmed page title
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn is_error_title(title: &str) -> bool {
    let title = title.to_lowercase();
    ERROR_TITLE_MARKERS
        .iter()
        .any(|marker| title.contains(marker))
}
