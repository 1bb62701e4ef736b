//! URL handling module for Sitemap-Forge
//!
//! Pure predicates and transforms over URLs: normalization into frontier
//! keys, same-origin checks, content-worthiness, and XML escaping for the
//! emitted documents.

mod classify;
mod domain;
mod normalize;

pub use classify::is_content_path;
pub use domain::{extract_domain, is_same_origin, site_domain};
pub use normalize::normalize_url;

use ::url::Url;

/// Checks that a URL is both on the crawl origin and content-worthy
///
/// This is the single filter every candidate passes before it may enter
/// the frontier.
pub fn is_crawlable(candidate: &Url, base: &Url) -> bool {
    is_same_origin(candidate, base) && is_content_path(candidate)
}

/// Escapes the five reserved XML characters
///
/// # Examples
///
/// ```
/// use sitemap_forge::url::escape_xml;
///
/// assert_eq!(escape_xml("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&apos;");
/// ```
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml_reserved_characters() {
        assert_eq!(escape_xml("&"), "&amp;");
        assert_eq!(escape_xml("<>"), "&lt;&gt;");
        assert_eq!(escape_xml("\"'"), "&quot;&apos;");
    }

    #[test]
    fn test_escape_xml_does_not_double_escape_plain_text() {
        assert_eq!(
            escape_xml("https://example.com/search?q=a&page=2"),
            "https://example.com/search?q=a&amp;page=2"
        );
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_is_crawlable() {
        let base = Url::parse("https://example.com/").unwrap();
        assert!(is_crawlable(
            &Url::parse("https://example.com/services").unwrap(),
            &base
        ));
        assert!(!is_crawlable(
            &Url::parse("https://other.com/services").unwrap(),
            &base
        ));
        assert!(!is_crawlable(
            &Url::parse("https://example.com/logo.svg").unwrap(),
            &base
        ));
    }
}
