//! Crawler module for discovering and validating site pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and manual redirect resolution
//! - Content validation and link extraction
//! - Seeding and pattern fallback discovery
//! - Overall crawl coordination over the frontier

mod context;
mod coordinator;
mod extractor;
mod fallback;
mod fetcher;
mod frontier;
mod resolver;
mod seeds;
mod validator;

pub use context::CrawlContext;
pub use coordinator::{run_crawl, Coordinator};
pub use extractor::{
    anchor_links, data_attribute_paths, extract, extract_from_html, page_number,
    pagination_siblings, script_paths,
};
pub use fallback::{fallback_candidates, observed_ids, FALLBACK_DEPTH};
pub use fetcher::{
    build_http_client, fetch_head, fetch_page, is_html_content_type, mime_essence, FetchResult,
    HeadResponse,
};
pub use frontier::{CrawlResult, Frontier, LinkSource, QueueItem};
pub use resolver::resolve;
pub use seeds::seed_items;
pub use validator::{assess_content, is_real_content, ContentSignals};
