//! Outbound HTTP adapter for the ingestion pipeline.

use async_trait::async_trait;

use crate::domain::ports::{FetchError, ImageFetcher};

/// Reqwest-backed image fetcher. One GET per call, no retry, no caching.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher sharing the given client's connection pool.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(FetchError::request)?;
        Ok(bytes.to_vec())
    }
}
