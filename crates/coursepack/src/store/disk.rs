//! # Disk Store
//!
//! This module implements the file-backed persistent document store.
//!
//! Each record is two files under the store root, both named after the
//! SHA-256 of the document id: `<hash>.bin` holds the payload and
//! `<hash>.meta` holds a JSON [`BlobMeta`] sidecar. Writes are staged in
//! `.tmp` files and renamed into place; a record exists only when both
//! final files do.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;

use super::blob_store::{BlobMeta, BlobStore, StoreResult};

#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
    initialized: Arc<AtomicBool>,
    init_lock: Arc<Mutex<()>>,
}

impl DiskStore {
    /// Create a store rooted at the given directory. No filesystem work
    /// happens until the first operation touches the store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            initialized: Arc::new(AtomicBool::new(false)),
            init_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Directory this store keeps its files in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the store directory on first use. A failed attempt leaves
    /// the flag unset so the next operation retries from scratch.
    async fn ensure_initialized(&self) -> StoreResult<()> {
        // Fast path - already initialized
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        // One initializer at a time; losers of the race re-check the flag
        let _guard = self.init_lock.lock().await;
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Unavailable {
                reason: format!("cannot create store directory {}: {e}", self.root.display()),
            })?;

        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn data_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.bin", encode_id(id)))
    }

    fn meta_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.meta", encode_id(id)))
    }

    /// Read and parse every metadata sidecar under the root. Records with
    /// an unparsable sidecar or a missing payload are skipped and cleaned
    /// up off the hot path.
    async fn read_all_meta(&self) -> StoreResult<Vec<BlobMeta>> {
        self.ensure_initialized().await?;

        let mut entries = fs::read_dir(&self.root).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let meta_path = entry.path();
            if meta_path.extension().and_then(|e| e.to_str()) != Some("meta") {
                continue;
            }

            let raw = match fs::read(&meta_path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(path = ?meta_path, error = %e, "Failed to read metadata sidecar");
                    continue;
                }
            };

            let meta: BlobMeta = match serde_json::from_slice(&raw) {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(path = ?meta_path, error = %e, "Failed to parse metadata sidecar");
                    remove_record_later(meta_path.with_extension("bin"), meta_path);
                    continue;
                }
            };

            // A sidecar without its payload is a torn write, not a record
            let data_path = meta_path.with_extension("bin");
            if !fs::try_exists(&data_path).await? {
                warn!(path = ?data_path, "Metadata sidecar without payload, dropping record");
                remove_record_later(data_path, meta_path);
                continue;
            }

            records.push(meta);
        }

        Ok(records)
    }
}

/// Filesystem-safe name for a document id.
fn encode_id(id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    let hash = hasher.finalize();
    format!("{hash:x}")
}

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling path a write is staged in before the rename. Unique per call,
/// so concurrent writers of the same id never touch each other's staging
/// files.
fn staging_path(path: &Path) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{seq}.tmp"));
    PathBuf::from(name)
}

/// Delete both files of a record as a background task.
fn remove_record_later(data_path: PathBuf, meta_path: PathBuf) {
    tokio::spawn(async move {
        let _ = fs::remove_file(&data_path).await;
        let _ = fs::remove_file(&meta_path).await;
    });
}

#[async_trait::async_trait]
impl BlobStore for DiskStore {
    async fn open(&self) -> StoreResult<()> {
        self.ensure_initialized().await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Bytes>> {
        self.ensure_initialized().await?;

        let data_path = self.data_path(id);
        let meta_path = self.meta_path(id);

        let data_exists = fs::try_exists(&data_path).await?;
        let meta_exists = fs::try_exists(&meta_path).await?;
        if !data_exists || !meta_exists {
            return Ok(None);
        }

        // Validate the sidecar before handing out the payload; a corrupt
        // record reads as a miss and is cleaned up in the background
        let meta_bytes = match fs::read(&meta_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = serde_json::from_slice::<BlobMeta>(&meta_bytes) {
            warn!(path = ?meta_path, error = %e, "Failed to parse metadata sidecar");
            remove_record_later(data_path, meta_path);
            return Ok(None);
        }

        let data = match fs::read(&data_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Bytes::from(data)))
    }

    async fn put(&self, id: &str, data: Bytes) -> StoreResult<()> {
        self.ensure_initialized().await?;

        let data_path = self.data_path(id);
        let meta_path = self.meta_path(id);

        let meta = BlobMeta::new(id, data.len() as u64);
        let meta_json = serde_json::to_vec(&meta).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to serialize metadata: {e}"),
            )
        })?;

        // Stage both files, then rename into place so a crash mid-write
        // never leaves a half-visible record
        let staged_data = staging_path(&data_path);
        let staged_meta = staging_path(&meta_path);

        if let Err(e) = fs::write(&staged_data, &data).await {
            warn!(path = ?staged_data, error = %e, "Failed to stage payload file");
            return Err(e.into());
        }

        if let Err(e) = fs::write(&staged_meta, &meta_json).await {
            warn!(path = ?staged_meta, error = %e, "Failed to stage metadata sidecar");
            let _ = fs::remove_file(&staged_data).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&staged_data, &data_path).await {
            warn!(
                from = ?staged_data,
                to = ?data_path,
                error = %e,
                "Failed to move payload into place"
            );
            let _ = fs::remove_file(&staged_data).await;
            let _ = fs::remove_file(&staged_meta).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&staged_meta, &meta_path).await {
            warn!(
                from = ?staged_meta,
                to = ?meta_path,
                error = %e,
                "Failed to move metadata into place"
            );
            // Reclaim only the staged file; the published paths may belong
            // to a concurrent writer of the same id by now, and a payload
            // without a fresh sidecar is already handled on the read side
            let _ = fs::remove_file(&staged_meta).await;
            return Err(e.into());
        }

        debug!(id, size = meta.size, "Stored document");
        Ok(())
    }

    async fn contains(&self, id: &str) -> StoreResult<bool> {
        self.ensure_initialized().await?;

        let data_exists = fs::try_exists(self.data_path(id)).await?;
        let meta_exists = fs::try_exists(self.meta_path(id)).await?;

        Ok(data_exists && meta_exists)
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        self.ensure_initialized().await?;

        let data_path = self.data_path(id);
        let meta_path = self.meta_path(id);

        // Absent files are fine; removing a missing record is a no-op
        let data_result = fs::remove_file(&data_path).await;
        let meta_result = fs::remove_file(&meta_path).await;

        match (data_result, meta_result) {
            (Err(e), _) if e.kind() != io::ErrorKind::NotFound => {
                warn!(path = ?data_path, error = %e, "Failed to remove payload file");
                Err(e.into())
            }
            (_, Err(e)) if e.kind() != io::ErrorKind::NotFound => {
                warn!(path = ?meta_path, error = %e, "Failed to remove metadata sidecar");
                Err(e.into())
            }
            _ => Ok(()),
        }
    }

    async fn clear(&self) -> StoreResult<()> {
        self.ensure_initialized().await?;

        let mut entries = fs::read_dir(&self.root).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = ?path, error = %e, "Failed to remove store file");
            } else {
                removed += 1;
            }
        }

        debug!(count = removed, "Cleared document store");
        Ok(())
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .read_all_meta()
            .await?
            .into_iter()
            .map(|meta| meta.id)
            .collect())
    }

    async fn list_meta(&self) -> StoreResult<Vec<BlobMeta>> {
        self.read_all_meta().await
    }

    async fn total_size(&self) -> StoreResult<u64> {
        Ok(self.read_all_meta().await?.iter().map(|meta| meta.size).sum())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.read_all_meta().await?.len())
    }
}
