//! # App State
//!
//! A small string-keyed store persisted as one JSON file. The document
//! store holds payloads; this holds the handful of flags that must
//! survive restarts, most importantly the "preload previously completed"
//! marker. The two are deliberately separate so clearing the document
//! store does not forget that the user already went through the preload
//! flow.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tokio::fs;
use tokio::io;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Key the preload completion marker is kept under.
pub const PRELOAD_COMPLETE_KEY: &str = "preload_complete";

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a state store persisted at the given file path. The file is
    /// created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read one key. An absent key, an absent file, and an unreadable
    /// file all read as `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.read_all().await.remove(key)
    }

    /// Write one key, creating the file if needed.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.read_all().await;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map).await
    }

    /// Remove one key. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.read_all().await;
        if map.remove(key).is_some() {
            self.write_all(&map).await?;
        }
        Ok(())
    }

    /// Whether a preload session was acknowledged as complete before.
    pub async fn is_preload_complete(&self) -> bool {
        self.get(PRELOAD_COMPLETE_KEY).await.is_some()
    }

    /// Record that the user acknowledged a finished preload session.
    pub async fn set_preload_complete(&self) -> Result<(), StoreError> {
        debug!("Marking preload as complete");
        self.set(PRELOAD_COMPLETE_KEY, "true").await
    }

    /// Forget the completion marker so the preload flow runs again.
    pub async fn reset_preload_complete(&self) -> Result<(), StoreError> {
        debug!("Resetting preload completion marker");
        self.remove(PRELOAD_COMPLETE_KEY).await
    }

    async fn read_all(&self) -> BTreeMap<String, String> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read state file");
                return BTreeMap::new();
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = ?self.path, error = %e, "State file is not valid JSON, treating as empty");
                BTreeMap::new()
            }
        }
    }

    async fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(map).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to serialize state: {e}"),
            )
        })?;

        // Stage and rename so a crash cannot truncate the state file
        let staged = {
            let mut name = self.path.as_os_str().to_os_string();
            name.push(".tmp");
            PathBuf::from(name)
        };
        fs::write(&staged, &json).await?;
        fs::rename(&staged, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state() -> (TempDir, StateStore) {
        let dir = TempDir::new().unwrap();
        let state = StateStore::new(dir.path().join("state.json"));
        (dir, state)
    }

    #[tokio::test]
    async fn test_absent_file_reads_as_unset() {
        let (_dir, state) = state();

        assert_eq!(state.get("anything").await, None);
        assert!(!state.is_preload_complete().await);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (_dir, state) = state();

        state.set("theme", "dark").await.unwrap();

        assert_eq!(state.get("theme").await.as_deref(), Some("dark"));
        assert_eq!(state.get("other").await, None);
    }

    #[tokio::test]
    async fn test_marker_round_trip() {
        let (_dir, state) = state();

        state.set_preload_complete().await.unwrap();
        assert!(state.is_preload_complete().await);

        state.reset_preload_complete().await.unwrap();
        assert!(!state.is_preload_complete().await);

        // Resetting twice is fine
        state.reset_preload_complete().await.unwrap();
    }

    #[tokio::test]
    async fn test_values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        StateStore::new(&path).set_preload_complete().await.unwrap();

        assert!(StateStore::new(&path).is_preload_complete().await);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty_but_stays_writable() {
        let (_dir, state) = state();
        state.set("a", "1").await.unwrap();

        fs::write(&state.path, b"not json at all").await.unwrap();

        assert_eq!(state.get("a").await, None);
        state.set("b", "2").await.unwrap();
        assert_eq!(state.get("b").await.as_deref(), Some("2"));
    }
}
