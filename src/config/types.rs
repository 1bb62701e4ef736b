use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitemap-Forge
///
/// Every section has defaults matching the production constants, so an empty
/// file (or no file at all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

/// Description of the target site: where to start and how its pages look
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Origin of the crawl; only URLs on this host are followed
    pub base_url: String,

    /// Product name, counted as a domain keyword by the content validator
    pub product_name: String,

    /// Top-level section paths seeded at depth 0 alongside the root
    pub sections: Vec<String>,

    /// Main listing sections (high priority, refreshed daily)
    pub primary_listings: Vec<String>,

    /// Path of the search page used for seeded query permutations
    pub search_path: String,

    /// Search terms combined into seed URLs
    pub search_terms: Vec<String>,

    /// Locations combined with search terms into seed URLs
    pub search_locations: Vec<String>,

    /// Number of pagination pages seeded per primary listing (starting at page 2)
    pub seed_pagination_pages: u32,

    /// Static informational pages (about, contact, legal)
    pub info_pages: Vec<String>,

    /// First path segments of detail pages (`/service/<id>`)
    pub detail_prefixes: Vec<String>,

    /// Path prefix under which category pages live
    pub category_prefix: String,

    /// Known category slugs
    pub categories: Vec<String>,

    /// Domain keywords, in both supported languages
    pub keywords: Vec<String>,

    /// Markup fragments that indicate a main content region
    pub main_content_markers: Vec<String>,

    /// Markup fragments that indicate a listing card
    pub listing_markers: Vec<String>,

    /// Bodies longer than this count as substantial content
    pub min_body_bytes: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.autofixa.com".to_string(),
            product_name: "AutoFixa".to_string(),
            sections: strings(&[
                "/services",
                "/mechanics",
                "/search",
                "/categories",
                "/about",
                "/contact",
                "/how-it-works",
            ]),
            primary_listings: strings(&["/services", "/mechanics"]),
            search_path: "/search".to_string(),
            search_terms: strings(&[
                "mechanic",
                "oil change",
                "brakes",
                "tires",
                "diagnostics",
                "ავტოსერვისი",
            ]),
            search_locations: strings(&["tbilisi", "batumi"]),
            seed_pagination_pages: 2,
            info_pages: strings(&[
                "/about",
                "/contact",
                "/how-it-works",
                "/faq",
                "/terms",
                "/privacy",
            ]),
            detail_prefixes: strings(&["service", "mechanic"]),
            category_prefix: "/categories".to_string(),
            categories: strings(&[
                "maintenance",
                "brakes",
                "tires",
                "engine",
                "electrical",
                "bodywork",
                "diagnostics",
                "air-conditioning",
            ]),
            keywords: strings(&[
                "service",
                "mechanic",
                "repair",
                "workshop",
                "garage",
                "სერვისი",
                "ავტოსერვისი",
                "მექანიკოსი",
                "ხელოსანი",
                "შეკეთება",
                "ხელოსნობა",
            ]),
            main_content_markers: strings(&["<main", "<article", "role=\"main\"", "id=\"content\""]),
            listing_markers: strings(&[
                "class=\"card",
                "service-card",
                "mechanic-card",
                "listing-item",
                "data-listing",
            ]),
            min_body_bytes: 5000,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Hard cap on URLs that receive a fetch attempt
    pub max_urls: usize,

    /// Below this many valid URLs the fallback discoverer runs
    pub min_urls_target: usize,

    /// Maximum depth from the seeds at which links are still extracted
    pub max_depth: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Number of URLs processed concurrently per batch
    pub concurrent_requests: usize,

    /// Redirect hops followed before a chain is abandoned
    pub max_redirects: u32,

    /// Maximum number of synthesized fallback candidates
    pub fallback_probe_cap: usize,

    /// IDs probed on either side of each observed detail ID
    pub fallback_id_window: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_urls: 2000,
            min_urls_target: 100,
            max_depth: 4,
            timeout_secs: 15,
            concurrent_requests: 5,
            max_redirects: 10,
            fallback_probe_cap: 200,
            fallback_id_window: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SitemapForge".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://www.autofixa.com/about".to_string(),
        }
    }
}

/// Object storage destination for the generated documents
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Base URL of the storage API (objects live under `/object/<bucket>/<key>`)
    pub endpoint: String,

    /// Bucket receiving both documents
    pub bucket: String,

    /// Object key of the url-set sitemap
    pub sitemap_key: String,

    /// Object key of the sitemap index
    pub index_key: String,

    /// Environment variable holding the service bearer credential
    pub credential_env: String,

    /// Public URL of the sitemap referenced from the index.
    /// Defaults to `<base-url>/<sitemap-key>`.
    pub public_sitemap_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://storage.autofixa.com/storage/v1".to_string(),
            bucket: "sitemaps".to_string(),
            sitemap_key: "sitemap.xml".to_string(),
            index_key: "sitemap-index.xml".to_string(),
            credential_env: "STORAGE_SERVICE_KEY".to_string(),
            public_sitemap_url: None,
        }
    }
}

/// HTTP trigger configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

impl Config {
    /// Public URL of the url-set sitemap, as referenced from the sitemap index
    pub fn public_sitemap_url(&self) -> String {
        match &self.storage.public_sitemap_url {
            Some(url) => url.clone(),
            None => format!(
                "{}/{}",
                self.site.base_url.trim_end_matches('/'),
                self.storage.sitemap_key
            ),
        }
    }
}

impl CrawlerConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
