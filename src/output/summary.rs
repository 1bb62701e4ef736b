//! JSON run summaries returned to the trigger

use crate::crawler::{mime_essence, CrawlResult, Frontier};
use crate::state::Progress;
use serde::Serialize;
use std::collections::BTreeMap;

/// Label used for results that reported no content type
const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// Always `true`; failures are reported with [`RunFailure`]
    pub success: bool,

    /// Number of `<url>` entries written to the sitemap
    pub total_urls: usize,

    pub breakdown: Breakdown,

    /// Final progress snapshot
    pub progress: Progress,
}

/// Counters behind a summary
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub discovered: usize,
    pub processed: usize,
    pub valid: usize,
    pub redirects_resolved: usize,

    /// Configured depth limit
    pub max_depth: u32,

    /// Valid results per discovery depth
    pub depth_distribution: BTreeMap<u32, usize>,

    /// Valid results per MIME essence
    pub content_types: BTreeMap<String, usize>,
}

impl CrawlSummary {
    /// Builds the summary of a finished run
    pub fn from_run(frontier: &Frontier, progress: &Progress, max_depth: u32, total_urls: usize) -> Self {
        let mut breakdown = Breakdown {
            discovered: frontier.discovered_count(),
            processed: frontier.processed_count(),
            valid: frontier.valid_count(),
            redirects_resolved: progress.redirects_resolved,
            max_depth,
            ..Breakdown::default()
        };
        breakdown.tally(frontier.valid_results());

        Self {
            success: true,
            total_urls,
            breakdown,
            progress: progress.clone(),
        }
    }
}

impl Breakdown {
    /// Adds depth and content-type counts for `results`
    pub fn tally<'a>(&mut self, results: impl IntoIterator<Item = &'a CrawlResult>) {
        for result in results {
            *self.depth_distribution.entry(result.depth).or_insert(0) += 1;

            let content_type = result
                .content_type
                .as_deref()
                .map(mime_essence)
                .filter(|essence| !essence.is_empty())
                .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string());
            *self.content_types.entry(content_type).or_insert(0) += 1;
        }
    }
}

/// Body returned when a run fails
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub success: bool,
    pub error: String,
}

impl RunFailure {
    pub fn new(error: impl ToString) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}
