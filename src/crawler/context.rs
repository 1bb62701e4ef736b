use crate::config::{Config, CrawlerConfig, SiteConfig};
use crate::crawler::fetcher::build_http_client;
use crate::url::normalize_url;
use crate::SitemapError;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use url::Url;

/// Read-only inputs shared by the resolver, validator, and extractor
///
/// Built once per run; the per-URL steps borrow it and never mutate it.
#[derive(Debug, Clone)]
pub struct CrawlContext {
    pub client: Client,
    /// Normalized crawl origin
    pub base: Url,
    pub site: SiteConfig,
    pub limits: CrawlerConfig,
    /// Crawl date, stamped on every result as its `lastmod`
    pub today: NaiveDate,
}

impl CrawlContext {
    pub fn new(config: &Config) -> Result<Self, SitemapError> {
        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;
        Self::with_client(config, client)
    }

    /// Builds a context around an existing client
    pub fn with_client(config: &Config, client: Client) -> Result<Self, SitemapError> {
        Ok(Self {
            client,
            base: normalize_url(&config.site.base_url)?,
            site: config.site.clone(),
            limits: config.crawler.clone(),
            today: Utc::now().date_naive(),
        })
    }
}
