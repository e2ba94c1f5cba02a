use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use configs::BlobStoreConfig;

use super::{extract_key, BlobError, BlobStore};

/// Blob store reached over plain HTTP: `DELETE {endpoint}/{bucket}/{key}`.
pub struct HttpBlobStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_base_url: Option<String>,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn from_config(cfg: &BlobStoreConfig) -> Result<Self, BlobError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| BlobError::Request { key: String::new(), reason: e.to_string() })?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            bucket: cfg.bucket.trim_matches('/').to_string(),
            public_base_url: cfg.public_base_url.clone(),
            token: cfg.token.clone(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        if self.bucket.is_empty() {
            format!("{}/{}", self.endpoint, key)
        } else {
            format!("{}/{}/{}", self.endpoint, self.bucket, key)
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    fn extract_key(&self, url: &str) -> Option<String> {
        extract_key(url, self.public_base_url.as_deref())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        if self.endpoint.is_empty() {
            return Err(BlobError::NotConfigured);
        }
        let url = self.object_url(key);
        let mut req = self.client.delete(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| BlobError::Request { key: key.to_string(), reason: e.to_string() })?;

        let status = resp.status();
        // Already gone counts as deleted so cleanup can be retried.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            debug!(%key, status = status.as_u16(), "blob_delete_ok");
            return Ok(());
        }
        Err(BlobError::Status { key: key.to_string(), status: status.as_u16() })
    }
}
