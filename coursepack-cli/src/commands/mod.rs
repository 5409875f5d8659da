use std::sync::Arc;

use coursepack_engine::{BlobStore, DocumentFetcher, Manifest, StateStore};

pub mod clear;
pub mod fetch;
pub mod preload;
pub mod remove;
pub mod reset;
pub mod status;

/// Shared handles every subcommand runs against.
pub struct AppContext {
    pub store: Arc<dyn BlobStore>,
    pub state: Arc<StateStore>,
    pub fetcher: Arc<DocumentFetcher>,
    pub manifest: Arc<Manifest>,
}
