//! Remote media sideloading.
//!
//! [`HttpMediaImporter`] fetches an image over HTTP and hands the bytes to the
//! host's [`MediaStore`]. Every failure mode is a typed [`MediaError`]; callers
//! decide whether an import failure is fatal for their operation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use folio_kernel::settings::MediaSettings;
use folio_store::{MediaId, MediaStore, RecordId, StoreError};

/// Fallback filename when the URL path has no usable last segment.
const DEFAULT_FILENAME: &str = "sideload.img";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image URL is empty")]
    EmptyUrl,

    #[error("invalid image URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to fetch image: {0}")]
    Fetch(String),

    #[error("remote resource is not an image (content type '{0}')")]
    UnsupportedType(String),

    #[error("image exceeds download limit of {0} bytes")]
    TooLarge(u64),

    #[error("failed to store image: {0}")]
    Store(#[from] StoreError),
}

/// Imports a remote image and persists it scoped to an owning record.
#[async_trait]
pub trait MediaImport: Send + Sync {
    async fn import_from_url(&self, url: &str, owner: RecordId) -> Result<MediaId, MediaError>;
}

/// [`MediaImport`] implementation backed by reqwest.
pub struct HttpMediaImporter {
    client: reqwest::Client,
    store: Arc<dyn MediaStore>,
    max_download_bytes: u64,
}

impl HttpMediaImporter {
    pub fn new(settings: &MediaSettings, store: Arc<dyn MediaStore>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.fetch_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            store,
            max_download_bytes: settings.max_download_bytes,
        })
    }
}

/// Last path segment of the URL, or a generic fallback.
fn filename_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|segment| !segment.is_empty() && segment.contains('.'))
        .map(|segment| segment.to_string())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

#[async_trait]
impl MediaImport for HttpMediaImporter {
    async fn import_from_url(&self, url: &str, owner: RecordId) -> Result<MediaId, MediaError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(MediaError::EmptyUrl);
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(MediaError::InvalidUrl(url.to_string()));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Fetch(format!(
                "unexpected status {} from {url}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        if !content_type.starts_with("image/") {
            return Err(MediaError::UnsupportedType(content_type));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_download_bytes {
                return Err(MediaError::TooLarge(self.max_download_bytes));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Fetch(e.to_string()))?;

        if bytes.len() as u64 > self.max_download_bytes {
            return Err(MediaError::TooLarge(self.max_download_bytes));
        }

        let filename = filename_from_url(url);
        tracing::debug!(url, owner, %filename, size = bytes.len(), "sideloading image");

        let media_id = self
            .store
            .sideload(owner, &filename, &content_type, bytes.to_vec())
            .await?;

        Ok(media_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_store::MemoryHost;

    fn importer() -> HttpMediaImporter {
        let store = Arc::new(MemoryHost::new("http://localhost:8080"));
        HttpMediaImporter::new(&MediaSettings::default(), store).unwrap()
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_any_fetch() {
        let err = importer().import_from_url("   ", 1).await.unwrap_err();
        assert!(matches!(err, MediaError::EmptyUrl));
    }

    #[tokio::test]
    async fn non_http_scheme_is_rejected() {
        let err = importer()
            .import_from_url("ftp://example.com/cover.jpg", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn unreachable_host_surfaces_fetch_error() {
        // Port 9 (discard) is not listening in test environments.
        let err = importer()
            .import_from_url("http://127.0.0.1:9/cover.jpg", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Fetch(_)));
    }

    #[test]
    fn filename_derivation_from_url() {
        assert_eq!(
            filename_from_url("https://example.com/images/cover.jpg?size=large"),
            "cover.jpg"
        );
        assert_eq!(filename_from_url("https://example.com/"), DEFAULT_FILENAME);
        assert_eq!(filename_from_url("https://example.com/images"), DEFAULT_FILENAME);
    }
}
