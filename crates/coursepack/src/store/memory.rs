//! # Memory Store
//!
//! This module provides an in-memory store implementation. It backs tests
//! and is handy as an injectable stand-in when persistence is not wanted;
//! semantics match [`DiskStore`](super::DiskStore) minus durability.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;

use super::blob_store::{BlobMeta, BlobStore, StoreResult};

/// Entry in the memory store
#[derive(Clone)]
struct Record {
    data: Bytes,
    meta: BlobMeta,
}

/// Memory-backed store implementation
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<Option<Bytes>> {
        Ok(self.records.read().get(id).map(|r| r.data.clone()))
    }

    async fn put(&self, id: &str, data: Bytes) -> StoreResult<()> {
        let meta = BlobMeta::new(id, data.len() as u64);
        self.records
            .write()
            .insert(id.to_string(), Record { data, meta });
        Ok(())
    }

    async fn contains(&self, id: &str) -> StoreResult<bool> {
        Ok(self.records.read().contains_key(id))
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        if self.records.write().remove(id).is_some() {
            debug!(id, "Removed document from memory store");
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.records.write().clear();
        debug!("Memory store cleared");
        Ok(())
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self.records.read().keys().cloned().collect())
    }

    async fn list_meta(&self) -> StoreResult<Vec<BlobMeta>> {
        Ok(self
            .records
            .read()
            .values()
            .map(|r| r.meta.clone())
            .collect())
    }

    async fn total_size(&self) -> StoreResult<u64> {
        Ok(self.records.read().values().map(|r| r.meta.size).sum())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.records.read().len())
    }
}
