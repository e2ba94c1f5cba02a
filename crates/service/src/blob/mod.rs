//! Key-addressed blob store holding uploaded message images.
//!
//! Messages reference images by fully-qualified URL. The store only knows
//! keys, so every backend pairs a pure URL → key extraction with a
//! delete-by-key call.

use async_trait::async_trait;
use thiserror::Error;

pub mod http;

pub use http::HttpBlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob store is not configured")]
    NotConfigured,
    #[error("blob request failed for {key}: {reason}")]
    Request { key: String, reason: String },
    #[error("blob store answered {status} for {key}")]
    Status { key: String, status: u16 },
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Key for a stored image URL, or `None` when the URL is not one of ours.
    fn extract_key(&self, url: &str) -> Option<String>;

    /// Delete one blob. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Derive a blob key from an image URL.
///
/// With `public_base_url` the URL must start with that prefix and the key is
/// the remainder. Without it any http(s) URL maps to its path minus the leading
/// slash. Query and fragment are dropped. Keys stay percent-encoded exactly as
/// they appear in the URL.
pub fn extract_key(url: &str, public_base_url: Option<&str>) -> Option<String> {
    let url = url.trim();
    let without_suffix = url.split(['?', '#']).next().unwrap_or_default();

    let key = match public_base_url {
        Some(base) => {
            let base = base.trim_end_matches('/');
            let rest = without_suffix.strip_prefix(base)?;
            rest.strip_prefix('/')?.to_string()
        }
        None => {
            let parsed = reqwest::Url::parse(without_suffix).ok()?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return None;
            }
            parsed.path().trim_start_matches('/').to_string()
        }
    };

    if key.is_empty() { None } else { Some(key) }
}

/// Store for callers that never edit messages, such as the admin CLI.
/// No URL maps to a key and every delete is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBlobStore;

#[async_trait]
impl BlobStore for NoBlobStore {
    fn extract_key(&self, _url: &str) -> Option<String> { None }

    async fn delete(&self, _key: &str) -> Result<(), BlobError> { Err(BlobError::NotConfigured) }
}

/// In-memory blob store recording every delete, for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Mutex, PoisonError};

    #[derive(Default)]
    pub struct RecordingBlobStore {
        public_base_url: Option<String>,
        attempts: Mutex<Vec<String>>,
        failing: Mutex<HashSet<String>>,
    }

    impl RecordingBlobStore {
        pub fn with_base_url(base: impl Into<String>) -> Self {
            Self { public_base_url: Some(base.into()), ..Default::default() }
        }

        /// Make every delete of `key` fail.
        pub fn fail_on(&self, key: impl Into<String>) {
            self.failing.lock().unwrap_or_else(PoisonError::into_inner).insert(key.into());
        }

        /// Every key passed to `delete`, in call order, failed or not.
        pub fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        /// Keys whose delete succeeded.
        pub fn deleted(&self) -> Vec<String> {
            let failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
            self.attempts().into_iter().filter(|k| !failing.contains(k)).collect()
        }
    }

    #[async_trait]
    impl BlobStore for RecordingBlobStore {
        fn extract_key(&self, url: &str) -> Option<String> {
            extract_key(url, self.public_base_url.as_deref())
        }

        async fn delete(&self, key: &str) -> Result<(), BlobError> {
            self.attempts.lock().unwrap_or_else(PoisonError::into_inner).push(key.to_string());
            if self.failing.lock().unwrap_or_else(PoisonError::into_inner).contains(key) {
                return Err(BlobError::Status { key: key.to_string(), status: 503 });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_path_without_leading_slash() {
        assert_eq!(extract_key("https://s3/x/a.jpg", None).as_deref(), Some("x/a.jpg"));
        assert_eq!(
            extract_key("https://bucket.s3.ap-northeast-2.amazonaws.com/celebration/17/photo.png", None).as_deref(),
            Some("celebration/17/photo.png")
        );
    }

    #[test]
    fn query_and_fragment_are_dropped() {
        assert_eq!(extract_key("https://s3/x/a.jpg?v=2#top", None).as_deref(), Some("x/a.jpg"));
    }

    #[test]
    fn non_http_or_empty_paths_have_no_key() {
        assert_eq!(extract_key("ftp://s3/x/a.jpg", None), None);
        assert_eq!(extract_key("https://s3/", None), None);
        assert_eq!(extract_key("not a url", None), None);
        assert_eq!(extract_key("", None), None);
    }

    #[test]
    fn base_url_must_prefix_the_image() {
        let base = Some("https://cdn.example.com/images/");
        assert_eq!(extract_key("https://cdn.example.com/images/x/a.jpg", base).as_deref(), Some("x/a.jpg"));
        assert_eq!(extract_key("https://other.example.com/images/x/a.jpg", base), None);
        assert_eq!(extract_key("https://cdn.example.com/imagesx/a.jpg", base), None);
        assert_eq!(extract_key("https://cdn.example.com/images/", base), None);
    }

    #[tokio::test]
    async fn no_blob_store_owns_nothing() {
        assert_eq!(NoBlobStore.extract_key("https://s3/x/a.jpg"), None);
        assert!(matches!(NoBlobStore.delete("x/a.jpg").await, Err(BlobError::NotConfigured)));
    }

    #[tokio::test]
    async fn recording_store_tracks_failures() {
        let store = mock::RecordingBlobStore::default();
        store.fail_on("x/b.jpg");
        assert!(store.delete("x/a.jpg").await.is_ok());
        assert!(store.delete("x/b.jpg").await.is_err());
        assert_eq!(store.attempts(), vec!["x/a.jpg", "x/b.jpg"]);
        assert_eq!(store.deleted(), vec!["x/a.jpg"]);
    }
}
