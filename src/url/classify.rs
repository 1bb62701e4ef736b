use url::Url;

/// File extensions of static assets that never render page content
const ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "map", "json", "xml", "txt", "png", "jpg", "jpeg", "gif", "svg", "ico",
    "webp", "avif", "bmp", "woff", "woff2", "ttf", "otf", "eot", "pdf", "zip", "gz", "mp3",
    "mp4", "webm", "mov", "csv", "webmanifest",
];

/// Path prefixes of admin, auth, API, and framework-internal routes
const EXCLUDED_PREFIXES: &[&str] = &[
    "/api",
    "/admin",
    "/auth",
    "/login",
    "/logout",
    "/signin",
    "/signup",
    "/register",
    "/reset-password",
    "/forgot-password",
    "/dashboard",
    "/account",
    "/settings",
    "/checkout",
    "/_next",
    "/static",
    "/assets",
    "/cdn-cgi",
    "/wp-admin",
    "/wp-json",
];

/// Checks whether a URL is likely to render genuine page content
///
/// Rejects static assets (by extension), admin/auth/account routes, API
/// routes, and framework-internal paths. Matching is case-insensitive and
/// segment-aware: `/api` excludes `/api/users` but not `/apiary`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_forge::url::is_content_path;
///
/// assert!(is_content_path(&Url::parse("https://example.com/services/12").unwrap()));
/// assert!(!is_content_path(&Url::parse("https://example.com/logo.png").unwrap()));
/// assert!(!is_content_path(&Url::parse("https://example.com/api/services").unwrap()));
/// ```
pub fn is_content_path(url: &Url) -> bool {
    let path = url.path().to_lowercase();

    if EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
    {
        return false;
    }

    !has_asset_extension(&path)
}

/// Checks the final path segment for a static asset extension
fn has_asset_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ASSET_EXTENSIONS.contains(&ext),
        _ => false,
    }
}
