//! Configuration module for Sitemap-Forge
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every value has a default, so the crawler runs with no file at all.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_forge::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ServerConfig, SiteConfig, StorageConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_or_default, parse_config,
};
pub use validation::validate;
