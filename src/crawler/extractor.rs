//! Link extraction
//!
//! A fetched page is mined by four independent passes:
//! - link attributes (`<a href>`, `<area href>`, `<link rel="canonical">`)
//! - root-relative path literals inside inline scripts
//! - `data-*` attributes whose value looks like a path
//! - sibling pages synthesized from a `page` query parameter
//!
//! Every candidate is resolved against the page URL, normalized, and kept
//! only if it is on the crawl origin and content-worthy. Duplicates are left
//! for the frontier to collapse.

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::{fetch_page, is_html_content_type, FetchResult};
use crate::crawler::frontier::{LinkSource, QueueItem};
use crate::url::{is_crawlable, normalize_url};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Highest page number synthesized by the pagination pass
const MAX_SYNTHESIZED_PAGE: u32 = 10;

/// How far past the current page the pagination pass looks
const PAGINATION_LOOKAHEAD: u32 = 3;

/// Quoted root-relative path without a file extension: `"/services/brakes"`
static SCRIPT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'](/[A-Za-z0-9][A-Za-z0-9_\-/]*)["']"#).unwrap());

/// Fetches `final_url` and extracts candidate links from it
///
/// `depth` is the depth of the page being mined; every returned item is
/// tagged with `depth + 1`. A failed fetch or a non-HTML body yields an empty
/// list.
pub async fn extract(ctx: &CrawlContext, final_url: &str, depth: u32) -> Vec<QueueItem> {
    let page_url = match Url::parse(final_url) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };

    match fetch_page(&ctx.client, final_url).await {
        FetchResult::Success {
            content_type, body, ..
        } if content_type.is_empty() || is_html_content_type(&content_type) => {
            extract_from_html(&body, &page_url, &ctx.base, depth + 1)
        }
        FetchResult::Success { content_type, .. } => {
            tracing::trace!("Not extracting from {} ({})", final_url, content_type);
            Vec::new()
        }
        FetchResult::HttpError { status_code } => {
            tracing::debug!("Extraction fetch of {} got HTTP {}", final_url, status_code);
            Vec::new()
        }
        FetchResult::NetworkError { error } => {
            tracing::debug!("Extraction fetch of {} failed: {}", final_url, error);
            Vec::new()
        }
    }
}

/// Runs every extraction pass over an already-fetched body
///
/// Items are tagged with `child_depth`. Parsing stays synchronous so the
/// document never lives across an await point.
pub fn extract_from_html(html: &str, page_url: &Url, base: &Url, child_depth: u32) -> Vec<QueueItem> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    let passes = [
        (anchor_links(&document, page_url), LinkSource::Anchor),
        (script_paths(&document, page_url), LinkSource::Script),
        (data_attribute_paths(&document, page_url), LinkSource::DataAttribute),
        (pagination_siblings(page_url), LinkSource::Pagination),
    ];

    for (candidates, source) in passes {
        let before = items.len();
        for candidate in candidates {
            let Ok(normalized) = normalize_url(candidate.as_str()) else {
                continue;
            };
            if is_crawlable(&normalized, base) {
                items.push(QueueItem::new(normalized.to_string(), child_depth, source));
            }
        }
        tracing::trace!(
            "{} pass on {} kept {} candidates",
            source,
            page_url,
            items.len() - before
        );
    }

    items
}

/// Extracts `href` targets of anchors, image-map areas, and canonical links
///
/// Download links and `javascript:`, `mailto:`, `tel:`, `data:` and
/// fragment-only targets are skipped. `rel="nofollow"` links are kept.
pub fn anchor_links(document: &Html, page_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href], area[href]") {
        for element in document.select(&selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                links.extend(resolve_link(href, page_url));
            }
        }
    }

    if let Ok(selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                links.extend(resolve_link(href, page_url));
            }
        }
    }

    links
}

/// Extracts quoted root-relative paths from inline `<script>` bodies
///
/// Catches client-side routes that never appear as anchors. Paths with a
/// file extension and protocol-relative `//host` literals do not match.
pub fn script_paths(document: &Html, page_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("script:not([src])") else {
        return Vec::new();
    };

    let mut paths = Vec::new();
    for script in document.select(&selector) {
        let source: String = script.text().collect();
        for capture in SCRIPT_PATH.captures_iter(&source) {
            if let Some(path) = capture.get(1) {
                paths.extend(resolve_link(path.as_str(), page_url));
            }
        }
    }

    paths
}

/// Extracts `data-*` attribute values that hold a path or an absolute URL
///
/// Values with whitespace, JSON payloads, and bare MIME-like strings are
/// ignored.
pub fn data_attribute_paths(document: &Html, page_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("*") else {
        return Vec::new();
    };

    let mut paths = Vec::new();
    for element in document.select(&selector) {
        for (name, value) in element.value().attrs() {
            if !name.starts_with("data-") || !looks_like_path(value) {
                continue;
            }
            paths.extend(resolve_link(value, page_url));
        }
    }

    paths
}

/// Synthesizes sibling pages of a paginated URL
///
/// For `?page=n`, returns pages `1..=min(n + 3, 10)` other than `n`, with
/// every other query parameter preserved. URLs without a numeric `page`
/// parameter produce nothing.
pub fn pagination_siblings(page_url: &Url) -> Vec<Url> {
    let Some(current) = page_number(page_url) else {
        return Vec::new();
    };

    let last = (current.saturating_add(PAGINATION_LOOKAHEAD)).min(MAX_SYNTHESIZED_PAGE);
    let others: Vec<(String, String)> = page_url
        .query_pairs()
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    (1..=last)
        .filter(|&page| page != current)
        .map(|page| {
            let mut sibling = page_url.clone();
            sibling
                .query_pairs_mut()
                .clear()
                .extend_pairs(others.iter())
                .append_pair("page", &page.to_string());
            sibling
        })
        .collect()
}

/// Reads a numeric `page` query parameter
pub fn page_number(url: &Url) -> Option<u32> {
    url.query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.trim().parse().ok())
}

fn looks_like_path(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    if value.starts_with('{') || value.starts_with('[') {
        return false;
    }
    (value.starts_with('/') && !value.starts_with("//"))
        || value.starts_with("http://")
        || value.starts_with("https://")
}

/// Resolves an attribute value against the page URL
///
/// Returns None for non-navigational schemes, fragment-only links, and
/// anything that does not resolve to http(s).
fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match page_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}
