//! Crawl frontier: the discovered, processed, and valid sets of a single run
//!
//! The frontier is owned by the coordinator and only mutated between
//! batches. It enforces the run's set invariants:
//! - a URL's recorded depth is the minimum depth it was ever discovered at
//! - every processed URL was discovered first
//! - every valid URL was processed first

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Which heuristic or seeding step produced a candidate URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkSource {
    /// Root or top-level section seed
    Seed,
    /// Seeded search-query permutation
    SearchSeed,
    /// Seeded listing pagination
    PaginationSeed,
    /// `href` of an anchor, area, or canonical link
    Anchor,
    /// Root-relative path literal inside an inline script
    Script,
    /// `data-*` attribute holding a path
    DataAttribute,
    /// Sibling page synthesized from a `page` parameter
    Pagination,
    /// Pattern-guessed URL from the fallback discoverer
    Fallback,
}

impl LinkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::SearchSeed => "search-seed",
            Self::PaginationSeed => "pagination-seed",
            Self::Anchor => "anchor",
            Self::Script => "script",
            Self::DataAttribute => "data-attribute",
            Self::Pagination => "pagination",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Normalized absolute URL
    pub url: String,

    /// Distance from the seeds
    pub depth: u32,

    /// How the URL was found
    pub source: LinkSource,
}

impl QueueItem {
    pub fn new(url: impl Into<String>, depth: u32, source: LinkSource) -> Self {
        Self {
            url: url.into(),
            depth,
            source,
        }
    }
}

/// A URL that resolved to a 2xx terminal page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// URL as it was queued
    pub url: String,

    /// Terminal URL after following redirects
    pub final_url: String,

    /// Status of the terminal response
    pub status: u16,

    /// Number of redirect hops followed
    pub redirect_count: u32,

    /// Date the page was crawled
    pub lastmod: NaiveDate,

    /// Discovery depth of `url`
    pub depth: u32,

    /// Content-Type reported by the terminal response, if any
    pub content_type: Option<String>,
}

/// The three core sets of a crawl run plus its work queue
#[derive(Debug, Default)]
pub struct Frontier {
    /// URL → minimum discovery depth
    discovered: HashMap<String, u32>,

    /// URLs that received a fetch attempt
    processed: HashSet<String>,

    /// URL → result for pages that passed resolution and validation
    valid: HashMap<String, CrawlResult>,

    /// URLs waiting for a fetch attempt, in discovery order
    queue: VecDeque<QueueItem>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a discovery event
    ///
    /// The URL is recorded if it is new or was previously seen at a greater
    /// depth. It is queued only if it has not been processed yet.
    ///
    /// # Returns
    ///
    /// `true` if the item was queued
    pub fn discover(&mut self, item: QueueItem) -> bool {
        if !self.record_depth(&item.url, item.depth) {
            return false;
        }

        if self.processed.contains(&item.url) {
            return false;
        }

        self.queue.push_back(item);
        true
    }

    /// Marks a discovered URL as processed
    ///
    /// # Returns
    ///
    /// `false` if the URL was never discovered or was already processed
    pub fn mark_processed(&mut self, url: &str) -> bool {
        if !self.discovered.contains_key(url) {
            tracing::warn!("Refusing to mark undiscovered URL as processed: {}", url);
            return false;
        }

        self.processed.insert(url.to_string())
    }

    /// Records a discovery and claims the URL for a fetch attempt in one step
    ///
    /// Used by fallback probing, which bypasses the queue.
    ///
    /// # Returns
    ///
    /// The URL's recorded depth, or `None` if it was already processed
    pub fn claim(&mut self, item: &QueueItem) -> Option<u32> {
        self.record_depth(&item.url, item.depth);

        if self.mark_processed(&item.url) {
            self.depth_of(&item.url)
        } else {
            None
        }
    }

    /// Records a valid result
    ///
    /// # Returns
    ///
    /// `false` (and nothing is recorded) if the result's URL was never processed
    pub fn record_valid(&mut self, result: CrawlResult) -> bool {
        if !self.processed.contains(&result.url) {
            tracing::warn!("Refusing to record unprocessed URL as valid: {}", result.url);
            return false;
        }

        self.valid.insert(result.url.clone(), result);
        true
    }

    /// Pops the next batch and marks every returned item processed
    ///
    /// Already-processed entries are skipped, and at most
    /// `min(size, max_urls - processed)` items are returned, so the processed
    /// set never grows past `max_urls`. Each returned item carries its
    /// recorded (minimum) depth.
    pub fn next_batch(&mut self, size: usize, max_urls: usize) -> Vec<QueueItem> {
        let room = max_urls.saturating_sub(self.processed.len());
        let limit = size.min(room);
        let mut batch = Vec::with_capacity(limit);

        while batch.len() < limit {
            let Some(mut item) = self.queue.pop_front() else {
                break;
            };

            if !self.mark_processed(&item.url) {
                continue;
            }

            if let Some(depth) = self.depth_of(&item.url) {
                item.depth = depth;
            }
            batch.push(item);
        }

        batch
    }

    /// Returns the recorded depth of a URL
    pub fn depth_of(&self, url: &str) -> Option<u32> {
        self.discovered.get(url).copied()
    }

    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered.contains_key(url)
    }

    pub fn is_processed(&self, url: &str) -> bool {
        self.processed.contains(url)
    }

    pub fn is_valid(&self, url: &str) -> bool {
        self.valid.contains_key(url)
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    /// Number of queued entries, including stale ones that will be skipped
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Iterates over the valid results
    pub fn valid_results(&self) -> impl Iterator<Item = &CrawlResult> {
        self.valid.values()
    }

    /// Checks the subset invariants: valid ⊆ processed ⊆ discovered
    pub fn invariants_hold(&self) -> bool {
        self.processed
            .iter()
            .all(|url| self.discovered.contains_key(url))
            && self.valid.keys().all(|url| self.processed.contains(url))
    }

    /// Stores `depth` if the URL is new or `depth` is smaller than the recorded one
    fn record_depth(&mut self, url: &str, depth: u32) -> bool {
        match self.discovered.get_mut(url) {
            Some(existing) if *existing <= depth => false,
            Some(existing) => {
                *existing = depth;
                true
            }
            None => {
                self.discovered.insert(url.to_string(), depth);
                true
            }
        }
    }
}
