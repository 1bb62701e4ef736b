//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a single run through its phases:
//! - Seeding the frontier
//! - Batched breadth-first crawling (resolve, validate, extract)
//! - Pattern fallback probing when the crawl comes up short
//! - Emitting and uploading the sitemap documents

use crate::config::Config;
use crate::crawler::context::CrawlContext;
use crate::crawler::extractor::extract;
use crate::crawler::fallback::fallback_candidates;
use crate::crawler::frontier::{CrawlResult, Frontier, QueueItem};
use crate::crawler::resolver::resolve;
use crate::crawler::seeds::seed_items;
use crate::crawler::validator::is_real_content;
use crate::output::{emit, CrawlSummary};
use crate::state::{Progress, RunPhase};
use crate::storage::SitemapStore;
use crate::SitemapError;
use chrono::Utc;
use futures::future::join_all;
use std::time::Instant;

/// What happened to one URL of a batch
#[derive(Debug)]
struct UrlOutcome {
    item: QueueItem,
    resolved: Option<CrawlResult>,
    valid: bool,
    links: Vec<QueueItem>,
}

/// Main crawler coordinator structure
///
/// Owns the frontier and progress of a run. The per-URL steps only borrow the
/// shared context, and their outcomes are merged into the frontier after the
/// whole batch settles.
pub struct Coordinator<S: SitemapStore> {
    ctx: CrawlContext,
    store: S,
    sitemap_key: String,
    index_key: String,
    sitemap_url: String,
    frontier: Frontier,
    progress: Progress,
}

impl<S: SitemapStore> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Destination for the two generated documents
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SitemapError)` - The HTTP client or base URL could not be set up
    pub fn new(config: &Config, store: S) -> Result<Self, SitemapError> {
        Ok(Self::with_context(config, CrawlContext::new(config)?, store))
    }

    /// Creates a coordinator around a prepared context
    pub fn with_context(config: &Config, ctx: CrawlContext, store: S) -> Self {
        Self {
            ctx,
            store,
            sitemap_key: config.storage.sitemap_key.clone(),
            index_key: config.storage.index_key.clone(),
            sitemap_url: config.public_sitemap_url(),
            frontier: Frontier::new(),
            progress: Progress::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.progress.phase
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs one complete crawl
    ///
    /// All run state is reset first, so a coordinator can be reused. On error
    /// the run ends in [`RunPhase::Failed`] and nothing is reported as
    /// partially successful.
    pub async fn run(&mut self) -> Result<CrawlSummary, SitemapError> {
        self.frontier = Frontier::new();
        self.progress = Progress::new();
        self.ctx.today = Utc::now().date_naive();

        let start_time = Instant::now();
        tracing::info!("Starting crawl of {}", self.ctx.base);

        match self.execute().await {
            Ok(summary) => {
                tracing::info!(
                    "Crawl completed: {} URLs in sitemap, {} processed in {:?}",
                    summary.total_urls,
                    summary.breakdown.processed,
                    start_time.elapsed()
                );
                Ok(summary)
            }
            Err(e) => {
                if self.progress.phase.can_transition_to(RunPhase::Failed) {
                    self.progress.phase = RunPhase::Failed;
                    self.progress.status = format!("Failed: {}", e);
                }
                tracing::error!("Crawl failed after {:?}: {}", start_time.elapsed(), e);
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<CrawlSummary, SitemapError> {
        self.transition(RunPhase::Seeding)?;
        self.seed();

        self.transition(RunPhase::Crawling)?;
        self.crawl().await;

        if self.frontier.valid_count() < self.ctx.limits.min_urls_target {
            self.transition(RunPhase::FallbackProbing)?;
            self.probe_fallback().await;
        }

        self.transition(RunPhase::Emitting)?;
        let documents = emit(
            self.frontier.valid_results(),
            &self.ctx.site,
            &self.sitemap_url,
            self.ctx.today,
        )?;
        tracing::info!(
            "Publishing {} URLs to {}",
            documents.url_count,
            self.store.describe()
        );

        self.store
            .upload(&self.sitemap_key, &documents.sitemap)
            .await?;
        self.store.upload(&self.index_key, &documents.index).await?;

        self.transition(RunPhase::Done)?;
        self.progress.status = format!("Done: {} URLs published", documents.url_count);

        Ok(CrawlSummary::from_run(
            &self.frontier,
            &self.progress,
            self.ctx.limits.max_depth,
            documents.url_count,
        ))
    }

    fn transition(&mut self, next: RunPhase) -> Result<(), SitemapError> {
        let from = self.progress.phase;
        if !from.can_transition_to(next) {
            return Err(SitemapError::InvalidTransition { from, to: next });
        }

        tracing::info!("Run phase: {} -> {}", from, next);
        self.progress.phase = next;
        self.progress.status = next.to_string();
        Ok(())
    }

    fn seed(&mut self) {
        let mut queued = 0;
        for item in seed_items(&self.ctx.site, &self.ctx.base) {
            if self.frontier.discover(item) {
                queued += 1;
            }
        }

        tracing::info!("Seeded frontier with {} URLs", queued);
        self.refresh_progress(0, format!("Seeded {} URLs", queued));
    }

    /// Processes the frontier in fixed-size concurrent batches
    ///
    /// Stops when the queue is empty or `max_urls` URLs have been processed.
    async fn crawl(&mut self) {
        let batch_size = self.ctx.limits.concurrent_requests.max(1);
        let max_urls = self.ctx.limits.max_urls;
        let mut batches = 0usize;

        loop {
            let batch = self.frontier.next_batch(batch_size, max_urls);
            if batch.is_empty() {
                break;
            }
            batches += 1;

            let batch_depth = batch.iter().map(|item| item.depth).max().unwrap_or(0);
            let ctx = &self.ctx;
            let outcomes = join_all(batch.into_iter().map(|item| process_item(ctx, item))).await;

            for outcome in outcomes {
                self.merge(outcome);
            }

            self.refresh_progress(
                batch_depth,
                format!(
                    "Crawling: batch {}, {} of {} URLs processed",
                    batches,
                    self.frontier.processed_count(),
                    max_urls
                ),
            );
            tracing::debug!(
                "Batch {}: {} discovered, {} processed, {} valid, {} queued",
                batches,
                self.frontier.discovered_count(),
                self.frontier.processed_count(),
                self.frontier.valid_count(),
                self.frontier.queue_len()
            );
        }

        if self.frontier.processed_count() >= max_urls {
            tracing::info!("URL cap of {} reached, crawl stopped", max_urls);
        } else {
            tracing::info!("Frontier is empty, crawl complete");
        }
    }

    fn merge(&mut self, outcome: UrlOutcome) {
        if let Some(result) = outcome.resolved {
            if result.redirect_count > 0 {
                self.progress.redirects_resolved += 1;
            }
            if outcome.valid {
                tracing::debug!("Valid: {} (depth {})", result.final_url, result.depth);
                self.frontier.record_valid(result);
            }
        } else {
            tracing::trace!("Unresolved: {}", outcome.item.url);
        }

        for link in outcome.links {
            self.frontier.discover(link);
        }
    }

    /// Probes pattern-guessed URLs one at a time
    ///
    /// Candidates go through the resolver and validator only; links are not
    /// extracted from them.
    async fn probe_fallback(&mut self) {
        let limits = &self.ctx.limits;
        let (window, cap, max_urls) = (limits.fallback_id_window, limits.fallback_probe_cap, limits.max_urls);

        let candidates = fallback_candidates(
            self.frontier.valid_results(),
            &self.ctx.site,
            &self.ctx.base,
            window,
            cap,
        );
        let before = self.frontier.valid_count();
        tracing::info!(
            "Only {} valid URLs, probing {} fallback candidates",
            before,
            candidates.len()
        );

        for candidate in candidates {
            if self.frontier.processed_count() >= max_urls {
                tracing::info!("URL cap of {} reached during fallback probing", max_urls);
                break;
            }

            let Some(depth) = self.frontier.claim(&candidate) else {
                continue;
            };

            let Some(result) = resolve(&self.ctx, &candidate.url, depth).await else {
                continue;
            };
            if result.redirect_count > 0 {
                self.progress.redirects_resolved += 1;
            }
            if is_real_content(&self.ctx, &result.final_url).await {
                tracing::debug!("Fallback hit: {}", result.final_url);
                self.frontier.record_valid(result);
            }
        }

        let added = self.frontier.valid_count() - before;
        if added == 0 {
            tracing::warn!("Fallback probing found no additional valid URLs");
        } else {
            tracing::info!("Fallback probing added {} valid URLs", added);
        }

        let depth = self.progress.current_depth;
        self.refresh_progress(depth, format!("Fallback probing added {} URLs", added));
    }

    fn refresh_progress(&mut self, current_depth: u32, status: String) {
        self.progress.discovered = self.frontier.discovered_count();
        self.progress.processed = self.frontier.processed_count();
        self.progress.valid = self.frontier.valid_count();
        self.progress.current_depth = current_depth;
        self.progress.status = status;
    }
}

/// Resolves, validates, and mines one URL
///
/// Links are only extracted from pages that passed validation and sit
/// below `max_depth`.
async fn process_item(ctx: &CrawlContext, item: QueueItem) -> UrlOutcome {
    let Some(resolved) = resolve(ctx, &item.url, item.depth).await else {
        return UrlOutcome {
            item,
            resolved: None,
            valid: false,
            links: Vec::new(),
        };
    };

    let valid = is_real_content(ctx, &resolved.final_url).await;

    let links = if valid && item.depth < ctx.limits.max_depth {
        extract(ctx, &resolved.final_url, item.depth).await
    } else {
        Vec::new()
    };

    UrlOutcome {
        item,
        resolved: Some(resolved),
        valid,
        links,
    }
}

/// Runs the main crawl operation
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `store` - Destination for the sitemap and sitemap index
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Both documents were published
/// * `Err(SitemapError)` - Setup or publishing failed
///
/// # Example
///
/// ```no_run
/// use sitemap_forge::config::load_config;
/// use sitemap_forge::crawler::run_crawl;
/// use sitemap_forge::storage::DirectoryStore;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_crawl(&config, DirectoryStore::new("./out")).await?;
/// println!("{} URLs", summary.total_urls);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S: SitemapStore>(
    config: &Config,
    store: S,
) -> Result<CrawlSummary, SitemapError> {
    let mut coordinator = Coordinator::new(config, store)?;
    coordinator.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageError, StorageResult};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>AutoFixa</title></head>
        <body><main><a href="/about">About</a><a href="/service/1">Brakes</a></main></body></html>"#;

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<HashMap<String, String>>,
        fail: bool,
    }

    impl SitemapStore for MemoryStore {
        async fn upload(&self, key: &str, body: &str) -> StorageResult<()> {
            if self.fail {
                return Err(StorageError::MissingCredential("TEST_KEY".to_string()));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), body.to_string());
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn test_config(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.site.base_url = server.uri();
        config.site.sections = Vec::new();
        config.site.search_terms = Vec::new();
        config.site.primary_listings = Vec::new();
        config.site.categories = Vec::new();
        config.site.detail_prefixes = Vec::new();
        config.crawler.timeout_secs = 5;
        config.crawler.min_urls_target = 1;
        config
    }

    async fn serve_site(server: &MockServer) {
        for at in ["/", "/about", "/service/1"] {
            Mock::given(method("HEAD"))
                .and(path(at))
                .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
                .mount(server)
                .await;
            Mock::given(method("GET"))
                .and(path(at))
                .respond_with(
                    ResponseTemplate::new(200).set_body_raw(PAGE, "text/html; charset=utf-8"),
                )
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_run_reaches_done_and_uploads_both_documents() {
        let server = MockServer::start().await;
        serve_site(&server).await;
        let config = test_config(&server);

        let mut coordinator = Coordinator::new(&config, MemoryStore::default()).unwrap();
        let summary = coordinator.run().await.unwrap();

        assert_eq!(coordinator.phase(), RunPhase::Done);
        assert_eq!(summary.total_urls, 3);
        assert_eq!(summary.breakdown.valid, 3);
        assert!(coordinator.frontier().invariants_hold());

        let objects = coordinator.store.objects.lock().unwrap();
        assert!(objects["sitemap.xml"].contains("/service/1</loc>"));
        assert!(objects["sitemap-index.xml"].contains("<sitemapindex"));
    }

    #[tokio::test]
    async fn test_upload_failure_fails_the_run() {
        let server = MockServer::start().await;
        serve_site(&server).await;
        let config = test_config(&server);

        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let mut coordinator = Coordinator::new(&config, store).unwrap();
        let err = coordinator.run().await.unwrap_err();

        assert!(matches!(err, SitemapError::Storage(_)));
        assert_eq!(coordinator.phase(), RunPhase::Failed);
    }

    #[tokio::test]
    async fn test_coordinator_is_reusable() {
        let server = MockServer::start().await;
        serve_site(&server).await;
        let config = test_config(&server);

        let mut coordinator = Coordinator::new(&config, MemoryStore::default()).unwrap();
        let first = coordinator.run().await.unwrap();
        let second = coordinator.run().await.unwrap();

        assert_eq!(first.breakdown.processed, second.breakdown.processed);
        assert_eq!(first.total_urls, second.total_urls);
    }
}
