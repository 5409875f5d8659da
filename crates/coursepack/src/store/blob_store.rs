//! # Store Contract
//!
//! This module defines the trait every document store implementation must
//! follow, plus the per-record metadata kept alongside each document.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Result of a store operation
pub type StoreResult<T> = Result<T, StoreError>;

/// Metadata kept alongside every stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    /// Document id (its filename).
    pub id: String,
    /// Payload length in bytes. Recorded at write time so aggregate
    /// queries never have to touch payloads.
    pub size: u64,
    /// Unix timestamp (seconds) of the write. Informational only; records
    /// never expire.
    pub cached_at: u64,
}

impl BlobMeta {
    /// Create metadata for a payload written right now.
    pub fn new(id: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            size,
            cached_at: unix_now(),
        }
    }
}

pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A durable store mapping document ids to raw bytes plus metadata.
///
/// Writes replace whole records; there is no partial update. Records have
/// no lifetime management of any kind, they live until explicitly removed.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bring the store up. Safe to call more than once; implementations
    /// that need no setup return `Ok(())`.
    async fn open(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Look up a document. `Ok(None)` is a miss.
    async fn get(&self, id: &str) -> StoreResult<Option<Bytes>>;

    /// Store a document, replacing any existing record under the same id.
    async fn put(&self, id: &str, data: Bytes) -> StoreResult<()>;

    /// Check whether a record exists for the id.
    async fn contains(&self, id: &str) -> StoreResult<bool>;

    /// Remove one record. Removing an absent id is not an error.
    async fn remove(&self, id: &str) -> StoreResult<()>;

    /// Remove every record.
    async fn clear(&self) -> StoreResult<()>;

    /// Ids of every stored record.
    async fn list_ids(&self) -> StoreResult<Vec<String>>;

    /// Metadata of every stored record.
    async fn list_meta(&self) -> StoreResult<Vec<BlobMeta>>;

    /// Sum of all stored payload sizes in bytes.
    async fn total_size(&self) -> StoreResult<u64>;

    /// Number of stored records.
    async fn count(&self) -> StoreResult<usize>;
}
