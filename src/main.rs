//! Sitemap-Forge main entry point
//!
//! This is the command-line interface for the Sitemap-Forge crawler.

use clap::Parser;
use sitemap_forge::config::{load_or_default, Config};
use sitemap_forge::crawler::{build_http_client, run_crawl, seed_items};
use sitemap_forge::output::RunFailure;
use sitemap_forge::storage::{DirectoryStore, ObjectStore};
use sitemap_forge::{normalize_url, server, CrawlSummary, SitemapError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitemap-Forge: a bounded sitemap crawler
///
/// Sitemap-Forge crawls one site breadth-first, keeps only pages with real
/// content, and publishes a sitemap plus a sitemap index.
#[derive(Parser, Debug)]
#[command(name = "sitemap-forge")]
#[command(version)]
#[command(about = "A bounded, validating sitemap crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the seed set without crawling
    #[arg(long, conflicts_with_all = ["serve", "output_dir"])]
    dry_run: bool,

    /// Run the HTTP trigger instead of a single crawl
    #[arg(long, conflicts_with_all = ["dry_run", "output_dir"])]
    serve: bool,

    /// Write the documents to this directory instead of uploading them
    #[arg(long, value_name = "DIR", conflicts_with_all = ["dry_run", "serve"])]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_or_default(cli.config.as_deref()) {
        Ok((cfg, Some(hash))) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Ok((cfg, None)) => {
            tracing::info!("No configuration file given, using built-in defaults");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.serve {
        server::serve(config).await?;
    } else if let Some(dir) = cli.output_dir {
        let result = run_crawl(&config, DirectoryStore::new(dir)).await;
        report(result)?;
    } else {
        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;
        let store = ObjectStore::new(&config.storage, client);
        let result = run_crawl(&config, store).await;
        report(result)?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_forge=info,warn"),
            1 => EnvFilter::new("sitemap_forge=debug,info"),
            2 => EnvFilter::new("sitemap_forge=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints the run summary as JSON on stdout
fn report(result: Result<CrawlSummary, SitemapError>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&RunFailure::new(&e))?);
            Err(e.into())
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sitemap-Forge Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Product: {}", config.site.product_name);
    println!("  Sitemap URL: {}", config.public_sitemap_url());

    println!("\nCrawler Configuration:");
    println!("  Max URLs: {}", config.crawler.max_urls);
    println!("  Min URLs target: {}", config.crawler.min_urls_target);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Concurrent requests: {}", config.crawler.concurrent_requests);
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!("  Fallback probe cap: {}", config.crawler.fallback_probe_cap);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);

    println!("\nStorage:");
    println!("  Endpoint: {}", config.storage.endpoint);
    println!("  Bucket: {}", config.storage.bucket);
    println!(
        "  Keys: {}, {}",
        config.storage.sitemap_key, config.storage.index_key
    );
    println!("  Credential env: {}", config.storage.credential_env);

    let base = normalize_url(&config.site.base_url)?;
    let seeds = seed_items(&config.site, &base);

    println!("\nSeed URLs ({}):", seeds.len());
    for seed in &seeds {
        println!("  [{} {}] {}", seed.depth, seed.source, seed.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());

    Ok(())
}
