//! Storage traits and error types
//!
//! This module defines the upload interface the emitter publishes through
//! and the errors a backend can report.

use std::future::Future;
use thiserror::Error;

/// Errors that can occur while publishing a document
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage credential missing: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Upload of {key} failed: {source}")]
    Http {
        key: String,
        source: reqwest::Error,
    },

    #[error("Upload of {key} rejected with HTTP {status}: {body}")]
    Rejected {
        key: String,
        status: u16,
        body: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for the generated sitemap documents
///
/// Uploads replace any existing object under the same key. A run calls
/// `upload` exactly twice, sitemap first, and treats any error as fatal.
pub trait SitemapStore: Send + Sync {
    /// Writes `body` under `key`, replacing an existing object
    fn upload(&self, key: &str, body: &str) -> impl Future<Output = StorageResult<()>> + Send;

    /// Human-readable destination for log lines
    fn describe(&self) -> String;
}
