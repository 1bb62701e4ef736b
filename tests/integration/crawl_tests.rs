//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the crawled site and the
//! storage API, and run the full seed → crawl → fallback → emit cycle.

use sitemap_forge::config::Config;
use sitemap_forge::crawler::Coordinator;
use sitemap_forge::storage::{DirectoryStore, ObjectStore};
use sitemap_forge::{CrawlSummary, RunPhase};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration that seeds only the root of the mock site
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.sections = Vec::new();
    config.site.primary_listings = Vec::new();
    config.site.search_terms = Vec::new();
    config.site.categories = Vec::new();
    config.site.detail_prefixes = Vec::new();
    config.crawler.timeout_secs = 5;
    config.crawler.min_urls_target = 0;
    config
}

fn html_page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><main><p>Find a mechanic.</p>{}</main></body></html>",
        title, anchors
    )
}

/// Mounts HEAD and GET responses for an HTML page
async fn mount_page(server: &MockServer, at: &str, body: String) {
    Mock::given(method("HEAD"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_redirect(server: &MockServer, from: &str, to: &str) {
    Mock::given(method("HEAD"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(301).insert_header("location", to))
        .mount(server)
        .await;
}

/// Runs a crawl into a temporary directory and returns the summary and sitemap
async fn crawl_to_dir(config: &Config) -> (CrawlSummary, String, String) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut coordinator = Coordinator::new(config, DirectoryStore::new(dir.path()))
        .expect("Failed to create coordinator");

    let summary = coordinator.run().await.expect("Crawl failed");
    assert_eq!(coordinator.phase(), RunPhase::Done);
    assert!(coordinator.frontier().invariants_hold());

    let sitemap = std::fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
    let index = std::fs::read_to_string(dir.path().join("sitemap-index.xml")).unwrap();
    (summary, sitemap, index)
}

#[tokio::test]
async fn test_root_is_valid_at_depth_zero() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &[])).await;

    let (summary, sitemap, index) = crawl_to_dir(&create_test_config(&base)).await;

    assert_eq!(summary.total_urls, 1);
    assert_eq!(summary.breakdown.depth_distribution.get(&0), Some(&1));
    assert!(sitemap.contains(&format!("<loc>{}/</loc>", base)));
    assert!(sitemap.contains("<priority>1.0</priority>"));
    assert!(sitemap.contains("<changefreq>daily</changefreq>"));
    assert!(index.contains(&format!("<loc>{}/sitemap.xml</loc>", base)));
}

#[tokio::test]
async fn test_three_hop_redirect_records_final_url() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &["/old"])).await;
    mount_redirect(&server, "/old", "/older").await;
    mount_redirect(&server, "/older", "/oldest").await;
    mount_redirect(&server, "/oldest", "/new").await;
    mount_page(&server, "/new", html_page("New page", &[])).await;

    let (summary, sitemap, _) = crawl_to_dir(&create_test_config(&base)).await;

    assert_eq!(summary.breakdown.redirects_resolved, 1);
    assert!(sitemap.contains(&format!("<loc>{}/new</loc>", base)));
    assert!(!sitemap.contains("/old"));
}

#[tokio::test]
async fn test_redirect_cycle_is_excluded_and_run_continues() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &["/loop-a", "/about"])).await;
    mount_redirect(&server, "/loop-a", "/loop-b").await;
    mount_redirect(&server, "/loop-b", "/loop-a").await;
    mount_page(&server, "/about", html_page("About us", &[])).await;

    let (summary, sitemap, _) = crawl_to_dir(&create_test_config(&base)).await;

    assert_eq!(summary.total_urls, 2);
    assert!(!sitemap.contains("loop"));
    assert!(sitemap.contains(&format!("<loc>{}/about</loc>", base)));
}

#[tokio::test]
async fn test_empty_pagination_page_is_rejected() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &["/listings?page=5"])).await;

    let empty_listing = html_page("Services", &[]);
    Mock::given(method("HEAD"))
        .and(path("/listings"))
        .and(query_param("page", "5"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/listings"))
        .and(query_param("page", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(empty_listing, "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let (summary, sitemap, _) = crawl_to_dir(&create_test_config(&base)).await;

    assert_eq!(summary.total_urls, 1);
    assert!(!sitemap.contains("page=5"));
}

#[tokio::test]
async fn test_rejected_page_links_are_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &["/thin"])).await;
    mount_page(
        &server,
        "/thin",
        r#"<html><head><title>Coming soon</title></head><body><a href="/hidden">x</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(&server, "/hidden", html_page("Hidden", &[])).await;

    let dir = TempDir::new().unwrap();
    let mut coordinator =
        Coordinator::new(&create_test_config(&base), DirectoryStore::new(dir.path())).unwrap();
    let summary = coordinator.run().await.unwrap();

    let frontier = coordinator.frontier();
    assert!(frontier.is_discovered(&format!("{}/thin", base)));
    assert!(!frontier.is_valid(&format!("{}/thin", base)));
    assert!(!frontier.is_discovered(&format!("{}/hidden", base)));
    assert_eq!(summary.total_urls, 1);

    let sitemap = std::fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
    assert!(!sitemap.contains("/hidden"));
}

#[tokio::test]
async fn test_fallback_runs_when_under_target() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &[])).await;
    mount_page(&server, "/service/1", html_page("Oil change", &[])).await;
    mount_page(&server, "/service/3", html_page("Brake pads", &[])).await;
    mount_page(&server, "/categories/brakes", html_page("Brakes", &[])).await;

    let mut config = create_test_config(&base);
    config.crawler.min_urls_target = 10;
    config.crawler.fallback_id_window = 2;
    config.site.detail_prefixes = vec!["service".to_string()];
    config.site.categories = vec!["brakes".to_string()];

    let (summary, sitemap, _) = crawl_to_dir(&config).await;

    assert_eq!(summary.breakdown.valid, 4);
    assert_eq!(summary.breakdown.processed, 1 + 1 + 4);
    assert!(sitemap.contains(&format!("<loc>{}/service/1</loc>", base)));
    assert!(sitemap.contains(&format!("<loc>{}/service/3</loc>", base)));
    assert!(sitemap.contains(&format!("<loc>{}/categories/brakes</loc>", base)));
    assert!(!sitemap.contains("/service/2"));
}

#[tokio::test]
async fn test_fallback_skipped_when_target_met() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &[])).await;

    let mut config = create_test_config(&base);
    config.crawler.min_urls_target = 1;
    config.site.detail_prefixes = vec!["service".to_string()];

    let (summary, _, _) = crawl_to_dir(&config).await;
    assert_eq!(summary.breakdown.processed, 1);
}

#[tokio::test]
async fn test_query_ampersands_are_escaped() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/",
        html_page("AutoFixa", &["/search?q=oil&amp;location=tbilisi"]),
    )
    .await;
    mount_page(&server, "/search", html_page("Search results", &[])).await;

    let (_, sitemap, _) = crawl_to_dir(&create_test_config(&base)).await;

    assert!(sitemap.contains(&format!(
        "<loc>{}/search?location=tbilisi&amp;q=oil</loc>",
        base
    )));
    assert!(!sitemap.contains("tbilisi&q"));
}

#[tokio::test]
async fn test_processed_never_exceeds_max_urls() {
    let server = MockServer::start().await;
    let base = server.uri();
    let links: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
    mount_page(&server, "/", html_page("AutoFixa", &link_refs)).await;
    for link in &links {
        mount_page(&server, link, html_page("Page", &[])).await;
    }

    let mut config = create_test_config(&base);
    config.crawler.max_urls = 5;

    let (summary, _, _) = crawl_to_dir(&config).await;

    assert_eq!(summary.breakdown.processed, 5);
    assert_eq!(summary.breakdown.discovered, 21);
    assert!(summary.total_urls <= 5);
}

#[tokio::test]
async fn test_depth_is_minimum_and_limit_is_respected() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html_page("AutoFixa", &["/a", "/b"])).await;
    mount_page(&server, "/a", html_page("A", &["/b", "/deep"])).await;
    mount_page(&server, "/b", html_page("B", &[])).await;
    mount_page(&server, "/deep", html_page("Deep", &["/deeper"])).await;
    mount_page(&server, "/deeper", html_page("Deeper", &[])).await;

    let mut config = create_test_config(&base);
    config.crawler.max_depth = 2;

    let dir = TempDir::new().unwrap();
    let mut coordinator = Coordinator::new(&config, DirectoryStore::new(dir.path())).unwrap();
    coordinator.run().await.unwrap();

    let frontier = coordinator.frontier();
    assert_eq!(frontier.depth_of(&format!("{}/b", base)), Some(1));
    assert_eq!(frontier.depth_of(&format!("{}/deep", base)), Some(2));
    assert!(frontier.is_valid(&format!("{}/deep", base)));
    assert!(!frontier.is_discovered(&format!("{}/deeper", base)));
}

#[tokio::test]
async fn test_documents_uploaded_to_storage() {
    let site = MockServer::start().await;
    let base = site.uri();
    mount_page(&site, "/", html_page("AutoFixa", &[])).await;

    let storage = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/sitemaps/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&storage)
        .await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/sitemaps/sitemap-index.xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&storage)
        .await;

    let mut config = create_test_config(&base);
    config.storage.endpoint = format!("{}/storage/v1", storage.uri());

    let store = ObjectStore::new(&config.storage, reqwest::Client::new()).with_credential("key");
    let mut coordinator = Coordinator::new(&config, store).unwrap();
    let summary = coordinator.run().await.unwrap();
    assert!(summary.success);

    let requests = storage.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.path().ends_with("/sitemap.xml"));
    assert!(requests[1].url.path().ends_with("/sitemap-index.xml"));
    assert!(String::from_utf8_lossy(&requests[0].body).contains("<urlset"));
}

#[tokio::test]
async fn test_failed_index_upload_fails_run() {
    let site = MockServer::start().await;
    mount_page(&site, "/", html_page("AutoFixa", &[])).await;

    let storage = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/object/sitemaps/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&storage)
        .await;
    Mock::given(method("POST"))
        .and(path("/object/sitemaps/sitemap-index.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&storage)
        .await;

    let mut config = create_test_config(&site.uri());
    config.storage.endpoint = storage.uri();

    let store = ObjectStore::new(&config.storage, reqwest::Client::new()).with_credential("key");
    let mut coordinator = Coordinator::new(&config, store).unwrap();

    assert!(coordinator.run().await.is_err());
    assert_eq!(coordinator.phase(), RunPhase::Failed);
}
