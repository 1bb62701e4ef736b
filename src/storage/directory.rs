use crate::storage::{SitemapStore, StorageResult};
use std::path::{Path, PathBuf};

/// Writes documents into a local directory instead of object storage
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SitemapStore for DirectoryStore {
    async fn upload(&self, key: &str, body: &str) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(key);
        tokio::fs::write(&path, body).await?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), body.len());
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
