//! Sitemap document generation
//!
//! Turns the valid results of a run into a `<urlset>` sitemap and a
//! `<sitemapindex>` that points at it.

use crate::config::SiteConfig;
use crate::crawler::{is_html_content_type, CrawlResult};
use crate::url::escape_xml;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt::{self, Write};
use url::Url;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Page role inferred from a URL's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// The site root
    Root,
    /// A top-level listing such as `/services`
    PrimaryListing,
    /// Search results, filtered or paginated listings, the category index
    SecondaryListing,
    /// A single service or mechanic page
    Detail,
    /// A single category page
    Category,
    /// About, contact, legal and similar pages
    Static,
    /// Anything else
    Other,
}

impl PageKind {
    /// Classifies a URL against the site's URL layout
    pub fn classify(url: &Url, site: &SiteConfig) -> Self {
        let path = url.path();
        let has_query = url.query().is_some_and(|q| !q.is_empty());
        let category_prefix = site.category_prefix.trim_end_matches('/');

        if path == "/" {
            return Self::Root;
        }
        if path == site.search_path || path == category_prefix {
            return Self::SecondaryListing;
        }
        if site.primary_listings.iter().any(|l| l == path) {
            return if has_query {
                Self::SecondaryListing
            } else {
                Self::PrimaryListing
            };
        }
        if path
            .strip_prefix(category_prefix)
            .is_some_and(|rest| rest.starts_with('/'))
        {
            return Self::Category;
        }

        let first_segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
        if site
            .detail_prefixes
            .iter()
            .any(|p| p.trim_matches('/') == first_segment)
        {
            return Self::Detail;
        }
        if site.primary_listings.iter().any(|l| {
            path.strip_prefix(l.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        }) {
            return Self::Detail;
        }
        if site.info_pages.iter().any(|p| p == path) {
            return Self::Static;
        }

        Self::Other
    }

    /// Base priority in tenths, before the depth penalty
    fn base_priority_tenths(&self) -> u32 {
        match self {
            Self::Root => 10,
            Self::PrimaryListing => 9,
            Self::SecondaryListing | Self::Detail => 8,
            Self::Category => 7,
            Self::Static => 6,
            Self::Other => 5,
        }
    }

    /// Sitemap priority: base minus 0.1 per depth level, never below 0.1
    pub fn priority(&self, depth: u32) -> f32 {
        let tenths = self.base_priority_tenths().saturating_sub(depth).max(1);
        tenths as f32 / 10.0
    }

    pub fn changefreq(&self) -> &'static str {
        match self {
            Self::Root | Self::PrimaryListing | Self::SecondaryListing => "daily",
            Self::Detail | Self::Category => "weekly",
            Self::Static => "monthly",
            Self::Other => "weekly",
        }
    }
}

/// One `<url>` entry
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: &'static str,
    pub priority: f32,
}

/// The two generated documents
#[derive(Debug, Clone)]
pub struct SitemapDocuments {
    /// `<urlset>` document
    pub sitemap: String,

    /// `<sitemapindex>` document referencing the sitemap
    pub index: String,

    /// Number of `<url>` entries in the sitemap
    pub url_count: usize,
}

/// Incrementally writes a `<urlset>` into memory
pub struct SitemapWriter {
    buffer: String,
    url_count: usize,
}

impl SitemapWriter {
    pub fn new() -> Result<Self, fmt::Error> {
        let mut buffer = String::new();
        writeln!(buffer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(buffer, r#"<urlset xmlns="{}">"#, SITEMAP_NAMESPACE)?;

        Ok(Self {
            buffer,
            url_count: 0,
        })
    }

    pub fn add_url(&mut self, url: &SitemapUrl) -> fmt::Result {
        writeln!(self.buffer, "  <url>")?;
        writeln!(self.buffer, "    <loc>{}</loc>", escape_xml(&url.loc))?;
        writeln!(
            self.buffer,
            "    <lastmod>{}</lastmod>",
            escape_xml(&url.lastmod.format("%Y-%m-%d").to_string())
        )?;
        writeln!(
            self.buffer,
            "    <changefreq>{}</changefreq>",
            escape_xml(url.changefreq)
        )?;
        writeln!(self.buffer, "    <priority>{:.1}</priority>", url.priority)?;
        writeln!(self.buffer, "  </url>")?;
        self.url_count += 1;
        Ok(())
    }

    /// Closes the document and returns it with its entry count
    pub fn finish(mut self) -> Result<(String, usize), fmt::Error> {
        writeln!(self.buffer, "</urlset>")?;
        Ok((self.buffer, self.url_count))
    }
}

/// Renders the sitemap and sitemap index for a run
///
/// Results whose known content type is not HTML are dropped. Results that
/// share a final URL are collapsed into one entry, keeping the shallowest.
/// Entries are sorted by final URL.
pub fn emit<'a>(
    results: impl IntoIterator<Item = &'a CrawlResult>,
    site: &SiteConfig,
    sitemap_url: &str,
    today: NaiveDate,
) -> Result<SitemapDocuments, fmt::Error> {
    let entries = sitemap_entries(results, site);

    let mut writer = SitemapWriter::new()?;
    for entry in &entries {
        writer.add_url(entry)?;
    }
    let (sitemap, url_count) = writer.finish()?;

    Ok(SitemapDocuments {
        sitemap,
        index: render_index(sitemap_url, today)?,
        url_count,
    })
}

/// Builds the ordered, deduplicated sitemap entries
pub fn sitemap_entries<'a>(
    results: impl IntoIterator<Item = &'a CrawlResult>,
    site: &SiteConfig,
) -> Vec<SitemapUrl> {
    let mut by_final_url: HashMap<&str, &CrawlResult> = HashMap::new();

    for result in results {
        if let Some(content_type) = &result.content_type {
            if !is_html_content_type(content_type) {
                tracing::debug!("Leaving {} out of the sitemap ({})", result.final_url, content_type);
                continue;
            }
        }

        by_final_url
            .entry(result.final_url.as_str())
            .and_modify(|kept| {
                if result.depth < kept.depth {
                    *kept = result;
                }
            })
            .or_insert(result);
    }

    let mut kept: Vec<&CrawlResult> = by_final_url.into_values().collect();
    kept.sort_by(|a, b| a.final_url.cmp(&b.final_url));

    kept.into_iter()
        .map(|result| {
            let kind = Url::parse(&result.final_url)
                .map(|url| PageKind::classify(&url, site))
                .unwrap_or(PageKind::Other);

            SitemapUrl {
                loc: result.final_url.clone(),
                lastmod: result.lastmod,
                changefreq: kind.changefreq(),
                priority: kind.priority(result.depth),
            }
        })
        .collect()
}

/// Renders a `<sitemapindex>` with a single entry
pub fn render_index(sitemap_url: &str, today: NaiveDate) -> Result<String, fmt::Error> {
    let mut index = String::new();
    writeln!(index, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(index, r#"<sitemapindex xmlns="{}">"#, SITEMAP_NAMESPACE)?;
    writeln!(index, "  <sitemap>")?;
    writeln!(index, "    <loc>{}</loc>", escape_xml(sitemap_url))?;
    writeln!(index, "    <lastmod>{}</lastmod>", today.format("%Y-%m-%d"))?;
    writeln!(index, "  </sitemap>")?;
    writeln!(index, "</sitemapindex>")?;
    Ok(index)
}
