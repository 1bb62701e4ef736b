//! Storage module for publishing the generated documents
//!
//! This module handles the final step of a run:
//! - The `SitemapStore` upload interface
//! - Object-storage uploads with upsert semantics
//! - A local directory backend for offline runs

mod directory;
mod object_store;
mod traits;

pub use directory::DirectoryStore;
pub use object_store::ObjectStore;
pub use traits::{SitemapStore, StorageError, StorageResult};
