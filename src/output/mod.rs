//! Output module for the documents and summaries a run produces
//!
//! This module handles:
//! - Rendering the url-set sitemap and the sitemap index
//! - Building the JSON summary returned to the caller

mod sitemap;
mod summary;

pub use sitemap::{
    emit, render_index, sitemap_entries, PageKind, SitemapDocuments, SitemapUrl, SitemapWriter,
};
pub use summary::{Breakdown, CrawlSummary, RunFailure};
