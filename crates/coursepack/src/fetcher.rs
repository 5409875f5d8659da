//! # Document Fetcher
//!
//! Cache-first document resolution. A [`DocumentFetcher`] answers "give
//! me the bytes of document X": a store hit is returned as-is (cached
//! content is trusted indefinitely), a miss is fetched from the document
//! root, stored, and returned. Store trouble never blocks resolution; it
//! only costs the offline copy.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::store::BlobStore;

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &FetcherConfig) -> Result<Client, FetchError> {
    let mut client_builder = Client::builder()
        .pool_max_idle_per_host(5)
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .redirect(if config.follow_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::none()
        });

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    Ok(client_builder.build()?)
}

/// Resolves documents cache-first against a fixed document root
pub struct DocumentFetcher {
    client: Client,
    store: Arc<dyn BlobStore>,
    config: FetcherConfig,
}

impl DocumentFetcher {
    /// Create a fetcher backed by the given store
    pub fn new(config: FetcherConfig, store: Arc<dyn BlobStore>) -> Result<Self, FetchError> {
        let client = create_client(&config)?;
        Ok(Self {
            client,
            store,
            config,
        })
    }

    /// URL of a document under the configured root
    fn document_url(&self, id: &str) -> Result<Url, FetchError> {
        let mut url = self.config.document_root.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                id: id.to_string(),
                reason: "document root cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Resolve a document to its bytes: store hit first, network on miss.
    pub async fn resolve(&self, id: &str) -> Result<Bytes, FetchError> {
        match self.store.get(id).await {
            Ok(Some(bytes)) => {
                debug!(id, size = bytes.len(), "Document served from store");
                return Ok(bytes);
            }
            Ok(None) => {}
            Err(e) => {
                // An unusable store reads as a miss; the document can
                // still be served from the network this session
                warn!(id, error = %e, "Store lookup failed, treating as miss");
            }
        }

        self.fetch_and_store(id).await
    }

    /// Fetch a document from the origin and store a copy, skipping the
    /// store lookup. Nothing is written on failure.
    pub async fn fetch_and_store(&self, id: &str) -> Result<Bytes, FetchError> {
        let url = self.document_url(id)?;
        debug!(id, url = %url, "Fetching document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                id: id.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                id: id.to_string(),
                status,
            });
        }

        let data = response
            .bytes()
            .await
            .map_err(|source| FetchError::Network {
                id: id.to_string(),
                source,
            })?;

        info!(id, size = data.len(), "Document downloaded");

        if let Err(e) = self.store.put(id, data.clone()).await {
            // The bytes in hand are still good; losing the stored copy
            // only costs a re-download next session
            warn!(id, error = %e, "Failed to store document");
        }

        Ok(data)
    }

    /// Remote size of a document in bytes via a HEAD probe, for display
    /// before a bulk download. Any failure reads as 0.
    pub async fn probe_size(&self, id: &str) -> u64 {
        let Ok(url) = self.document_url(id) else {
            return 0;
        };

        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0),
            _ => 0,
        }
    }
}
