//! # Preload Orchestration
//!
//! Bulk download of every manifest document that is not yet stored. The
//! flow is an explicit state machine so a frontend can mirror it:
//!
//! ```text
//! Idle -> CheckingCache -> AwaitingConsent -> Downloading -> Complete
//!                      \-> Complete(NothingToDo)
//! ```
//!
//! Checking and downloading are separate steps because the download only
//! runs with the user's consent; a caller inspects the pending set in
//! `AwaitingConsent` and decides. Downloads run strictly one at a time in
//! manifest order, and a failed file is recorded and skipped rather than
//! aborting the batch, so a partial cache is a valid terminal state.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::PreloadError;
use crate::fetcher::DocumentFetcher;
use crate::manifest::Manifest;
use crate::store::BlobStore;

/// An enum to represent different preload progress events.
#[derive(Debug, Clone)]
pub enum PreloadEvent {
    /// A file is about to be fetched.
    FileStarted {
        /// Document id being fetched.
        id: String,
        /// Zero-based position in the batch.
        index: usize,
        /// Number of files in the batch.
        total: usize,
    },
    /// A file was fetched and stored.
    FileCompleted {
        id: String,
        /// Payload size in bytes.
        size: u64,
    },
    /// A file failed; the batch carries on.
    FileFailed {
        id: String,
        /// Human-readable failure description.
        error: String,
    },
    /// Overall progress after each attempt, success or failure.
    BatchProgress {
        /// Files attempted so far.
        attempted: usize,
        /// Number of files in the batch.
        total: usize,
        /// Completion percentage over attempts, 0.0 to 100.0.
        percent: f64,
        /// Bytes downloaded so far across the batch.
        bytes_transferred: u64,
    },
}

/// A callback function for preload progress updates.
pub type OnPreload = Arc<dyn Fn(PreloadEvent) + Send + Sync>;

/// Terminal result of one preload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// Every pending document was downloaded and stored.
    FullSuccess,
    /// Some documents failed; the app stays usable without them.
    PartialSuccess { failed: Vec<String> },
    /// The store already held every manifest document.
    NothingToDo,
}

/// Accounting for a finished preload run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadSummary {
    /// Number of documents that were pending when the run started.
    pub total: usize,
    /// Documents downloaded and stored.
    pub completed: usize,
    /// Ids of documents that failed, in attempt order.
    pub failed: Vec<String>,
    /// Bytes downloaded across the whole run.
    pub bytes_transferred: u64,
}

impl PreloadSummary {
    pub fn outcome(&self) -> PreloadOutcome {
        if self.total == 0 {
            PreloadOutcome::NothingToDo
        } else if self.failed.is_empty() {
            PreloadOutcome::FullSuccess
        } else {
            PreloadOutcome::PartialSuccess {
                failed: self.failed.clone(),
            }
        }
    }
}

/// Where the preload flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadState {
    Idle,
    CheckingCache,
    AwaitingConsent { pending: Vec<String> },
    Downloading,
    Complete(PreloadOutcome),
}

impl PreloadState {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            PreloadState::Idle => "idle",
            PreloadState::CheckingCache => "checking-cache",
            PreloadState::AwaitingConsent { .. } => "awaiting-consent",
            PreloadState::Downloading => "downloading",
            PreloadState::Complete(_) => "complete",
        }
    }
}

/// Drives one preload session from cache check to terminal outcome.
pub struct Preloader {
    fetcher: Arc<DocumentFetcher>,
    store: Arc<dyn BlobStore>,
    manifest: Arc<Manifest>,
    state: PreloadState,
}

impl Preloader {
    pub fn new(
        fetcher: Arc<DocumentFetcher>,
        store: Arc<dyn BlobStore>,
        manifest: Arc<Manifest>,
    ) -> Self {
        Self {
            fetcher,
            store,
            manifest,
            state: PreloadState::Idle,
        }
    }

    pub fn state(&self) -> &PreloadState {
        &self.state
    }

    /// Pending ids computed by the last [`check_cache`](Self::check_cache)
    /// call, in manifest order. Empty outside `AwaitingConsent`.
    pub fn pending(&self) -> &[String] {
        match &self.state {
            PreloadState::AwaitingConsent { pending } => pending,
            _ => &[],
        }
    }

    /// Diff the manifest universe against the store. Ends in
    /// `Complete(NothingToDo)` when everything is already stored,
    /// otherwise in `AwaitingConsent` with the pending set.
    pub async fn check_cache(&mut self) -> Result<&PreloadState, PreloadError> {
        if !matches!(self.state, PreloadState::Idle) {
            return Err(PreloadError::InvalidState {
                state: self.state.name(),
                expected: "idle",
            });
        }
        self.state = PreloadState::CheckingCache;

        // A store that cannot be listed counts as empty: the worst case
        // is re-downloading files we already had
        let stored: HashSet<String> = match self.store.list_ids().await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!(error = %e, "Could not list stored documents, assuming none");
                HashSet::new()
            }
        };

        let pending: Vec<String> = self
            .manifest
            .filenames()
            .into_iter()
            .filter(|file| !stored.contains(file))
            .collect();

        if pending.is_empty() {
            debug!("Every manifest document is already stored");
            self.state = PreloadState::Complete(PreloadOutcome::NothingToDo);
        } else {
            info!(
                pending = pending.len(),
                total = self.manifest.len(),
                "Documents need downloading"
            );
            self.state = PreloadState::AwaitingConsent { pending };
        }

        Ok(&self.state)
    }

    /// Download every pending document, one at a time, in manifest order.
    /// Each file is attempted exactly once; failures are recorded and the
    /// batch carries on.
    pub async fn download(
        &mut self,
        on_event: Option<OnPreload>,
    ) -> Result<PreloadSummary, PreloadError> {
        let pending = match std::mem::replace(&mut self.state, PreloadState::Downloading) {
            PreloadState::AwaitingConsent { pending } => pending,
            other => {
                self.state = other;
                return Err(PreloadError::InvalidState {
                    state: self.state.name(),
                    expected: "awaiting-consent",
                });
            }
        };

        let total = pending.len();
        let mut summary = PreloadSummary {
            total,
            completed: 0,
            failed: Vec::new(),
            bytes_transferred: 0,
        };
        let emit = |event: PreloadEvent| {
            if let Some(callback) = &on_event {
                callback(event);
            }
        };

        for (index, id) in pending.iter().enumerate() {
            emit(PreloadEvent::FileStarted {
                id: id.clone(),
                index,
                total,
            });

            match self.fetcher.fetch_and_store(id).await {
                Ok(bytes) => {
                    summary.completed += 1;
                    summary.bytes_transferred += bytes.len() as u64;
                    emit(PreloadEvent::FileCompleted {
                        id: id.clone(),
                        size: bytes.len() as u64,
                    });
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Document download failed, continuing");
                    summary.failed.push(id.clone());
                    emit(PreloadEvent::FileFailed {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }

            let attempted = index + 1;
            emit(PreloadEvent::BatchProgress {
                attempted,
                total,
                percent: attempted as f64 / total as f64 * 100.0,
                bytes_transferred: summary.bytes_transferred,
            });
        }

        info!(
            completed = summary.completed,
            failed = summary.failed.len(),
            bytes = summary.bytes_transferred,
            "Preload batch finished"
        );
        self.state = PreloadState::Complete(summary.outcome());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetcherConfig;
    use crate::init_test_tracing;
    use crate::store::MemoryStore;
    use crate::test_fixture::{DocServer, UnavailableStore};
    use crate::test_utils::manifest_from_files;
    use bytes::Bytes;
    use parking_lot::Mutex;

    fn manifest_of(files: &[&str]) -> Arc<Manifest> {
        manifest_from_files("P1100", files)
    }

    fn preloader_for(
        server: &DocServer,
        store: Arc<dyn BlobStore>,
        manifest: Arc<Manifest>,
    ) -> Preloader {
        let fetcher = Arc::new(
            DocumentFetcher::new(FetcherConfig::new(server.document_root()), store.clone())
                .unwrap(),
        );
        Preloader::new(fetcher, store, manifest)
    }

    #[tokio::test]
    async fn test_check_cache_computes_pending_set() {
        let server = DocServer::start(&[("a.pdf", "a"), ("b.pdf", "b"), ("c.pdf", "c")], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        store.put("b.pdf", Bytes::from("b")).await.unwrap();
        let mut preloader = preloader_for(&server, store, manifest_of(&["a.pdf", "b.pdf", "c.pdf"]));

        preloader.check_cache().await.unwrap();

        assert_eq!(preloader.pending(), ["a.pdf", "c.pdf"]);
        assert!(matches!(
            preloader.state(),
            PreloadState::AwaitingConsent { .. }
        ));
    }

    #[tokio::test]
    async fn test_fully_stored_manifest_finishes_immediately() {
        let server = DocServer::start(&[], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        store.put("a.pdf", Bytes::from("a")).await.unwrap();
        let mut preloader = preloader_for(&server, store, manifest_of(&["a.pdf"]));

        preloader.check_cache().await.unwrap();

        assert_eq!(
            *preloader.state(),
            PreloadState::Complete(PreloadOutcome::NothingToDo)
        );
        assert_eq!(server.hit_count(), 0);
    }

    #[tokio::test]
    async fn test_unlistable_store_means_everything_pending() {
        let server = DocServer::start(&[], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(UnavailableStore);
        let mut preloader = preloader_for(&server, store, manifest_of(&["a.pdf", "b.pdf"]));

        preloader.check_cache().await.unwrap();

        assert_eq!(preloader.pending(), ["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_download_all_pending() {
        let server = DocServer::start(&[("a.pdf", "aaaa"), ("b.pdf", "bb")], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let mut preloader =
            preloader_for(&server, store.clone(), manifest_of(&["a.pdf", "b.pdf"]));

        preloader.check_cache().await.unwrap();
        let summary = preloader.download(None).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 2);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.bytes_transferred, 6);
        assert_eq!(summary.outcome(), PreloadOutcome::FullSuccess);
        assert_eq!(
            *preloader.state(),
            PreloadState::Complete(PreloadOutcome::FullSuccess)
        );
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_partly_cached_manifest_ends_fully_stored() {
        let server = DocServer::start(
            &[
                ("a.pdf", "aaaa"),
                ("b.pdf", "bb"),
                ("c.pdf", "c"),
                ("d.pdf", "ddd"),
            ],
            &[],
        )
        .await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        store.put("b.pdf", Bytes::from("old-b")).await.unwrap();
        store.put("d.pdf", Bytes::from("old-d")).await.unwrap();
        let mut preloader = preloader_for(
            &server,
            store.clone(),
            manifest_of(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]),
        );

        preloader.check_cache().await.unwrap();
        assert_eq!(preloader.pending(), ["a.pdf", "c.pdf"]);
        let summary = preloader.download(None).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.outcome(), PreloadOutcome::FullSuccess);
        // Only the missing files were fetched, and afterwards the store
        // covers the whole manifest with the cached bytes untouched
        assert_eq!(server.hit_count(), 2);
        let mut ids = store.list_ids().await.unwrap();
        ids.sort();
        assert_eq!(ids, ["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
        assert_eq!(
            store.get("b.pdf").await.unwrap().unwrap(),
            Bytes::from("old-b")
        );
    }

    #[tokio::test]
    async fn test_failed_file_is_skipped_not_fatal() {
        init_test_tracing!();
        let server = DocServer::start(
            &[("a.pdf", "aaaa"), ("b.pdf", "bb"), ("c.pdf", "c")],
            &["b.pdf"],
        )
        .await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let mut preloader = preloader_for(
            &server,
            store.clone(),
            manifest_of(&["a.pdf", "b.pdf", "c.pdf"]),
        );

        preloader.check_cache().await.unwrap();
        let summary = preloader.download(None).await.unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, vec!["b.pdf"]);
        assert_eq!(
            summary.outcome(),
            PreloadOutcome::PartialSuccess {
                failed: vec!["b.pdf".to_string()]
            }
        );

        // The healthy files landed in the store, the failed one did not
        assert!(store.contains("a.pdf").await.unwrap());
        assert!(!store.contains("b.pdf").await.unwrap());
        assert!(store.contains("c.pdf").await.unwrap());
        assert_eq!(store.total_size().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_events_track_the_batch_in_order() {
        let server = DocServer::start(&[("a.pdf", "aa"), ("b.pdf", "b")], &["b.pdf"]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let mut preloader = preloader_for(&server, store, manifest_of(&["a.pdf", "b.pdf"]));
        preloader.check_cache().await.unwrap();

        let events: Arc<Mutex<Vec<PreloadEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let on_event: OnPreload = Arc::new(move |event| sink.lock().push(event));

        preloader.download(Some(on_event)).await.unwrap();

        let events = events.lock();
        assert_eq!(events.len(), 6);
        assert!(matches!(
            &events[0],
            PreloadEvent::FileStarted { id, index: 0, total: 2 } if id == "a.pdf"
        ));
        assert!(matches!(
            &events[1],
            PreloadEvent::FileCompleted { id, size: 2 } if id == "a.pdf"
        ));
        assert!(matches!(
            &events[2],
            PreloadEvent::BatchProgress {
                attempted: 1,
                total: 2,
                percent,
                bytes_transferred: 2,
            } if *percent == 50.0
        ));
        assert!(matches!(
            &events[3],
            PreloadEvent::FileStarted { id, index: 1, total: 2 } if id == "b.pdf"
        ));
        assert!(matches!(&events[4], PreloadEvent::FileFailed { id, .. } if id == "b.pdf"));
        // The failed file adds nothing to the byte total
        assert!(matches!(
            &events[5],
            PreloadEvent::BatchProgress {
                attempted: 2,
                total: 2,
                percent,
                bytes_transferred: 2,
            } if *percent == 100.0
        ));
    }

    #[tokio::test]
    async fn test_download_before_check_is_rejected() {
        let server = DocServer::start(&[], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let mut preloader = preloader_for(&server, store, manifest_of(&["a.pdf"]));

        let err = preloader.download(None).await.unwrap_err();

        assert!(matches!(
            err,
            PreloadError::InvalidState {
                state: "idle",
                expected: "awaiting-consent"
            }
        ));
        assert_eq!(*preloader.state(), PreloadState::Idle);
    }

    #[tokio::test]
    async fn test_check_cache_twice_is_rejected() {
        let server = DocServer::start(&[("a.pdf", "a")], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let mut preloader = preloader_for(&server, store, manifest_of(&["a.pdf"]));

        preloader.check_cache().await.unwrap();
        let err = preloader.check_cache().await.unwrap_err();

        assert!(matches!(err, PreloadError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_downloads_follow_manifest_order() {
        let server = DocServer::start(&[("z.pdf", "z"), ("a.pdf", "a"), ("m.pdf", "m")], &[]).await;
        let store: Arc<dyn BlobStore> = Arc::new(MemoryStore::new());
        let mut preloader = preloader_for(
            &server,
            store,
            manifest_of(&["z.pdf", "a.pdf", "m.pdf"]),
        );
        preloader.check_cache().await.unwrap();

        let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = order.clone();
        let on_event: OnPreload = Arc::new(move |event| {
            if let PreloadEvent::FileStarted { id, .. } = event {
                sink.lock().push(id);
            }
        });

        preloader.download(Some(on_event)).await.unwrap();

        assert_eq!(*order.lock(), ["z.pdf", "a.pdf", "m.pdf"]);
    }
}
