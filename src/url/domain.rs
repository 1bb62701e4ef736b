use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_forge::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the site identity of a URL: its domain without a leading `www.`
///
/// `www.example.com` and `example.com` serve the same site, and links between
/// them are common, so the crawler treats them as one origin.
pub fn site_domain(url: &Url) -> Option<String> {
    extract_domain(url).map(|domain| match domain.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => domain,
    })
}

/// Checks whether `candidate` belongs to the same site as `base`
///
/// Hosts are compared via [`site_domain`]; explicit ports must agree.
/// The scheme is not compared, so an `http` link to an `https` site counts.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_forge::url::is_same_origin;
///
/// let base = Url::parse("https://www.example.com/").unwrap();
/// assert!(is_same_origin(&Url::parse("https://example.com/services").unwrap(), &base));
/// assert!(!is_same_origin(&Url::parse("https://other.com/").unwrap(), &base));
/// ```
pub fn is_same_origin(candidate: &Url, base: &Url) -> bool {
    match (site_domain(candidate), site_domain(base)) {
        (Some(a), Some(b)) => a == b && candidate.port() == base.port(),
        _ => false,
    }
}
