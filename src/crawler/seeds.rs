//! Seed set construction

use crate::config::SiteConfig;
use crate::crawler::frontier::{LinkSource, QueueItem};
use crate::url::{is_crawlable, normalize_url};
use url::Url;

/// Builds the initial frontier items for a run
///
/// # Seed Layout
///
/// | Depth | Source | URLs |
/// |-------|--------|------|
/// | 0 | `Seed` | root and every configured section |
/// | 1 | `SearchSeed` | `search?q=<term>` and `search?q=<term>&location=<loc>` |
/// | 1 | `PaginationSeed` | `page=2..` of every primary listing |
///
/// Every seed is normalized and passes the same origin and content filter as
/// discovered links. Duplicates are left for the frontier.
pub fn seed_items(site: &SiteConfig, base: &Url) -> Vec<QueueItem> {
    let mut items = Vec::new();

    let mut push = |url: Url, depth: u32, source: LinkSource| {
        let Ok(normalized) = normalize_url(url.as_str()) else {
            return;
        };
        if is_crawlable(&normalized, base) {
            items.push(QueueItem::new(normalized.to_string(), depth, source));
        } else {
            tracing::debug!("Dropping seed outside the crawl scope: {}", normalized);
        }
    };

    push(base.clone(), 0, LinkSource::Seed);
    for section in &site.sections {
        if let Ok(url) = base.join(section) {
            push(url, 0, LinkSource::Seed);
        }
    }

    if let Ok(search) = base.join(&site.search_path) {
        for term in &site.search_terms {
            let mut by_term = search.clone();
            by_term.query_pairs_mut().append_pair("q", term);
            push(by_term.clone(), 1, LinkSource::SearchSeed);

            for location in &site.search_locations {
                let mut by_location = by_term.clone();
                by_location
                    .query_pairs_mut()
                    .append_pair("location", location);
                push(by_location, 1, LinkSource::SearchSeed);
            }
        }
    }

    for listing in &site.primary_listings {
        let Ok(listing_url) = base.join(listing) else {
            continue;
        };
        for page in 2..=site.seed_pagination_pages.saturating_add(1) {
            let mut paged = listing_url.clone();
            paged
                .query_pairs_mut()
                .append_pair("page", &page.to_string());
            push(paged, 1, LinkSource::PaginationSeed);
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn small_site() -> SiteConfig {
        SiteConfig {
            sections: vec!["/services".to_string(), "/about".to_string()],
            primary_listings: vec!["/services".to_string()],
            search_terms: vec!["oil change".to_string()],
            search_locations: vec!["tbilisi".to_string()],
            seed_pagination_pages: 2,
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_root_and_sections_at_depth_zero() {
        let items = seed_items(&small_site(), &base());
        let depth_zero: Vec<&str> = items
            .iter()
            .filter(|i| i.depth == 0)
            .map(|i| i.url.as_str())
            .collect();

        assert_eq!(
            depth_zero,
            vec![
                "https://example.com/",
                "https://example.com/services",
                "https://example.com/about",
            ]
        );
        assert!(items
            .iter()
            .filter(|i| i.depth == 0)
            .all(|i| i.source == LinkSource::Seed));
    }

    #[test]
    fn test_search_permutations() {
        let items = seed_items(&small_site(), &base());
        let searches: Vec<&str> = items
            .iter()
            .filter(|i| i.source == LinkSource::SearchSeed)
            .map(|i| i.url.as_str())
            .collect();

        assert_eq!(
            searches,
            vec![
                "https://example.com/search?q=oil+change",
                "https://example.com/search?location=tbilisi&q=oil+change",
            ]
        );
    }

    #[test]
    fn test_pagination_seeds() {
        let items = seed_items(&small_site(), &base());
        let pages: Vec<&QueueItem> = items
            .iter()
            .filter(|i| i.source == LinkSource::PaginationSeed)
            .collect();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].url, "https://example.com/services?page=2");
        assert_eq!(pages[1].url, "https://example.com/services?page=3");
        assert!(pages.iter().all(|i| i.depth == 1));
    }

    #[test]
    fn test_excluded_sections_are_dropped() {
        let site = SiteConfig {
            sections: vec!["/admin".to_string(), "/faq".to_string()],
            ..small_site()
        };
        let items = seed_items(&site, &base());
        assert!(items.iter().all(|i| !i.url.contains("/admin")));
        assert!(items.iter().any(|i| i.url == "https://example.com/faq"));
    }
}
