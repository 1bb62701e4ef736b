//! Object-storage backend
//!
//! Publishes documents with `POST {endpoint}/object/{bucket}/{key}`, a bearer
//! credential read from the environment, and `x-upsert: true` so existing
//! objects are replaced.

use crate::config::StorageConfig;
use crate::storage::{SitemapStore, StorageError, StorageResult};
use reqwest::{header, Client};

/// Header asking the storage API to overwrite an existing object
const UPSERT_HEADER: &str = "x-upsert";

/// Maximum number of response body bytes kept in a rejection error
const MAX_ERROR_BODY: usize = 512;

/// Uploads documents to an HTTP object-storage API
#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    credential_env: String,
    credential: Option<String>,
}

impl ObjectStore {
    /// Creates a store for the configured bucket
    ///
    /// The credential is read from `credential_env` at upload time, so a
    /// store can be built before the variable is set.
    pub fn new(config: &StorageConfig, client: Client) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            credential_env: config.credential_env.clone(),
            credential: None,
        }
    }

    /// Uses an explicit credential instead of the environment variable
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Full URL of the object stored under `key`
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.endpoint, self.bucket, key)
    }

    fn credential(&self) -> StorageResult<String> {
        if let Some(credential) = &self.credential {
            return Ok(credential.clone());
        }

        std::env::var(&self.credential_env)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| StorageError::MissingCredential(self.credential_env.clone()))
    }
}

impl SitemapStore for ObjectStore {
    async fn upload(&self, key: &str, body: &str) -> StorageResult<()> {
        let credential = self.credential()?;
        let url = self.object_url(key);

        tracing::debug!("Uploading {} ({} bytes) to {}", key, body.len(), url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential)
            .header(header::CONTENT_TYPE, "application/xml")
            .header(UPSERT_HEADER, "true")
            .body(body.to_string())
            .send()
            .await
            .map_err(|source| StorageError::Http {
                key: key.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut detail = response.text().await.unwrap_or_default();
            if detail.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !detail.is_char_boundary(cut) {
                    cut -= 1;
                }
                detail.truncate(cut);
            }
            return Err(StorageError::Rejected {
                key: key.to_string(),
                status: status.as_u16(),
                body: detail,
            });
        }

        tracing::info!("Uploaded {} to bucket {}", key, self.bucket);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}/object/{}", self.endpoint, self.bucket)
    }
}
