//! # Coursepack
//!
//! A library for keeping a course's reference documents available
//! offline. It pairs a durable local document store with cache-first
//! fetching from a fixed document root, bulk-preloads the course
//! manifest with per-file progress, and decides at startup whether the
//! cache is warm enough to skip the preload flow entirely.
//!
//! ## Features
//!
//! - Durable document store with per-record metadata and atomic writes
//! - Cache-first resolution: stored copies are trusted indefinitely
//! - Sequential bulk preload with progress events and failure tracking
//! - Startup gate with an 80% completeness tolerance
//! - Store trouble degrades to network fetches instead of failing

pub mod builder;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod manifest;
pub mod preload;
pub mod state;
pub mod store;
pub mod test_utils;

#[cfg(test)]
mod test_fixture;

pub use builder::FetcherConfigBuilder;
pub use config::FetcherConfig;
pub use error::{FetchError, ManifestError, PreloadError, StoreError};

// Re-export store types
pub use store::{BlobMeta, BlobStore, DiskStore, MemoryStore, StoreResult};

// Re-export the fetch layer
pub use fetcher::{DocumentFetcher, create_client};

// Re-export preload orchestration
pub use preload::{
    OnPreload, PreloadEvent, PreloadOutcome, PreloadState, PreloadSummary, Preloader,
};

// Re-export startup pieces
pub use gate::{GateDecision, StartupGate};
pub use manifest::{Category, Manifest, ManifestEntry};
pub use state::{PRELOAD_COMPLETE_KEY, StateStore};
