//! Redirect resolver
//!
//! Walks a redirect chain with HEAD requests, one hop at a time, so hops can
//! be counted and off-origin targets refused.

use crate::crawler::context::CrawlContext;
use crate::crawler::fetcher::{describe_error, fetch_head};
use crate::crawler::frontier::CrawlResult;
use crate::url::is_same_origin;
use url::Url;

/// Resolves `url` to its terminal 2xx page
///
/// # Resolution Rules
///
/// | Response | Action |
/// |----------|--------|
/// | 2xx | Done, with the hops counted so far |
/// | 3xx with same-origin `Location` | Follow, hop count + 1 |
/// | 3xx with off-origin `Location` | Abandon |
/// | 3xx without `Location` | Abandon |
/// | More than `max_redirects` hops | Abandon (loop or excessive chain) |
/// | Any other status, timeout, network error | Abandon |
///
/// There are no retries. `depth` is carried into the result unchanged.
///
/// # Returns
///
/// * `Some(CrawlResult)` - The chain ended on a 2xx response
/// * `None` - The URL should be dropped for this run
pub async fn resolve(ctx: &CrawlContext, url: &str, depth: u32) -> Option<CrawlResult> {
    let mut current = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!("Cannot resolve unparseable URL {}: {}", url, e);
            return None;
        }
    };
    let mut hops: u32 = 0;

    loop {
        let head = match fetch_head(&ctx.client, current.as_str()).await {
            Ok(head) => head,
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", current, describe_error(&e));
                return None;
            }
        };

        if head.status.is_success() {
            return Some(CrawlResult {
                url: url.to_string(),
                final_url: current.to_string(),
                status: head.status.as_u16(),
                redirect_count: hops,
                lastmod: ctx.today,
                depth,
                content_type: head.content_type,
            });
        }

        if !head.status.is_redirection() {
            tracing::debug!("Dropping {}: HTTP {}", current, head.status.as_u16());
            return None;
        }

        let Some(location) = head.location else {
            tracing::debug!("Redirect from {} has no Location header", current);
            return None;
        };

        let mut next = match current.join(&location) {
            Ok(next) => next,
            Err(e) => {
                tracing::debug!("Bad redirect target '{}' from {}: {}", location, current, e);
                return None;
            }
        };
        next.set_fragment(None);

        if !is_same_origin(&next, &ctx.base) {
            tracing::debug!("Redirect from {} leaves the site: {}", url, next);
            return None;
        }

        hops += 1;
        if hops > ctx.limits.max_redirects {
            tracing::warn!(
                "Redirect chain from {} exceeded {} hops, abandoning",
                url,
                ctx.limits.max_redirects
            );
            return None;
        }

        tracing::trace!("Redirect hop {} for {}: {}", hops, url, next);
        current = next;
    }
}
