//! Pattern fallback discovery
//!
//! When a crawl finds too few pages, plausible URLs are synthesized from the
//! site's known URL shapes: category pages first, then numeric ID windows
//! around detail pages that were actually observed.

use crate::config::SiteConfig;
use crate::crawler::frontier::{CrawlResult, LinkSource, QueueItem};
use crate::url::{is_crawlable, normalize_url};
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Depth assigned to every synthesized candidate
pub const FALLBACK_DEPTH: u32 = 1;

/// Builds the capped, ordered list of fallback candidates
///
/// # Candidate Order
///
/// 1. `<category-prefix>/<slug>` for every configured category
/// 2. For each detail prefix, IDs in `id - window ..= id + window` around
///    every observed `/<prefix>/<id>` (floor 1). A prefix with no observed
///    IDs probes `1 ..= 2 * window`. Prefixes are interleaved so the cap
///    does not starve the later ones.
///
/// Candidates are normalized, filtered through the crawl scope, and
/// deduplicated. At most `cap` are returned.
pub fn fallback_candidates<'a>(
    results: impl IntoIterator<Item = &'a CrawlResult>,
    site: &SiteConfig,
    base: &Url,
    window: u64,
    cap: usize,
) -> Vec<QueueItem> {
    let observed: Vec<Url> = results
        .into_iter()
        .flat_map(|r| [r.url.as_str(), r.final_url.as_str()])
        .filter_map(|u| Url::parse(u).ok())
        .collect();

    let mut candidates = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |path: String| {
        if candidates.len() >= cap {
            return;
        }
        let Ok(joined) = base.join(&path) else {
            return;
        };
        let Ok(normalized) = normalize_url(joined.as_str()) else {
            return;
        };
        if is_crawlable(&normalized, base) && seen.insert(normalized.to_string()) {
            candidates.push(QueueItem::new(
                normalized.to_string(),
                FALLBACK_DEPTH,
                LinkSource::Fallback,
            ));
        }
    };

    let category_prefix = site.category_prefix.trim_end_matches('/');
    for slug in &site.categories {
        push(format!("{}/{}", category_prefix, slug));
    }

    let id_lists: Vec<(&str, Vec<u64>)> = site
        .detail_prefixes
        .iter()
        .map(|prefix| {
            let prefix = prefix.trim_matches('/');
            (prefix, id_window(&observed_ids(&observed, prefix), window))
        })
        .collect();

    let longest = id_lists.iter().map(|(_, ids)| ids.len()).max().unwrap_or(0);
    for i in 0..longest {
        for (prefix, ids) in &id_lists {
            if let Some(id) = ids.get(i) {
                push(format!("/{}/{}", prefix, id));
            }
        }
    }

    tracing::debug!("Synthesized {} fallback candidates", candidates.len());
    candidates
}

/// Collects numeric IDs from `/<prefix>/<id>` paths
pub fn observed_ids(urls: &[Url], prefix: &str) -> BTreeSet<u64> {
    urls.iter()
        .filter_map(|url| {
            let mut segments = url.path_segments()?;
            let first = segments.next()?;
            let second = segments.next()?;
            if first == prefix && segments.next().is_none() {
                second.parse().ok()
            } else {
                None
            }
        })
        .collect()
}

/// Expands observed IDs into the probe window, ordered by distance from the
/// nearest observed ID
fn id_window(observed: &BTreeSet<u64>, window: u64) -> Vec<u64> {
    if observed.is_empty() {
        return (1..=window.saturating_mul(2)).collect();
    }

    let mut ids = Vec::new();
    let mut seen = HashSet::new();
    for distance in 1..=window {
        for &id in observed {
            for candidate in [id.checked_sub(distance), id.checked_add(distance)] {
                let Some(candidate) = candidate.filter(|&c| c >= 1) else {
                    continue;
                };
                if !observed.contains(&candidate) && seen.insert(candidate) {
                    ids.push(candidate);
                }
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn result(path: &str) -> CrawlResult {
        let url = format!("https://example.com{}", path);
        CrawlResult {
            url: url.clone(),
            final_url: url,
            status: 200,
            redirect_count: 0,
            lastmod: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            depth: 0,
            content_type: None,
        }
    }

    fn no_results() -> Vec<CrawlResult> {
        Vec::new()
    }

    fn site() -> SiteConfig {
        SiteConfig {
            categories: vec!["brakes".to_string(), "tires".to_string()],
            detail_prefixes: vec!["service".to_string(), "mechanic".to_string()],
            category_prefix: "/categories".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_categories_come_first() {
        let items = fallback_candidates(&no_results(), &site(), &base(), 2, 100);
        assert_eq!(items[0].url, "https://example.com/categories/brakes");
        assert_eq!(items[1].url, "https://example.com/categories/tires");
        assert!(items
            .iter()
            .all(|i| i.depth == FALLBACK_DEPTH && i.source == LinkSource::Fallback));
    }

    #[test]
    fn test_without_observations_probes_low_ids() {
        let items = fallback_candidates(&no_results(), &site(), &base(), 2, 100);
        let urls: Vec<&str> = items.iter().skip(2).map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/service/1",
                "https://example.com/mechanic/1",
                "https://example.com/service/2",
                "https://example.com/mechanic/2",
                "https://example.com/service/3",
                "https://example.com/mechanic/3",
                "https://example.com/service/4",
                "https://example.com/mechanic/4",
            ]
        );
    }

    #[test]
    fn test_window_around_observed_ids() {
        let results = [result("/service/50"), result("/about")];
        let site = SiteConfig {
            detail_prefixes: vec!["service".to_string()],
            categories: Vec::new(),
            ..site()
        };
        let items = fallback_candidates(&results, &site, &base(), 2, 100);
        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/service/49",
                "https://example.com/service/51",
                "https://example.com/service/48",
                "https://example.com/service/52",
            ]
        );
    }

    #[test]
    fn test_window_floor_is_one() {
        let observed: BTreeSet<u64> = [2].into_iter().collect();
        assert_eq!(id_window(&observed, 3), vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_cap_is_respected() {
        let items = fallback_candidates(&no_results(), &site(), &base(), 50, 7);
        assert_eq!(items.len(), 7);
    }

    #[test]
    fn test_observed_ids_only_match_detail_shape() {
        let urls: Vec<Url> = [
            "https://example.com/service/12",
            "https://example.com/service/12/reviews",
            "https://example.com/service/abc",
            "https://example.com/mechanic/9",
        ]
        .iter()
        .map(|u| Url::parse(u).unwrap())
        .collect();

        let ids: Vec<u64> = observed_ids(&urls, "service").into_iter().collect();
        assert_eq!(ids, vec![12]);
    }
}
