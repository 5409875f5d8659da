//! Test-only HTTP fixture that plays the document origin, plus a store
//! whose operations always fail for exercising degrade paths.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bytes::Bytes;
use url::Url;

use crate::error::StoreError;
use crate::store::{BlobMeta, BlobStore, StoreResult};

struct ServerState {
    docs: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    hits: AtomicUsize,
}

/// A local HTTP server handing out canned documents under `/pdfs/`.
pub(crate) struct DocServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: tokio::task::JoinHandle<()>,
}

impl DocServer {
    /// Start a server on an ephemeral port. Files listed in `failing`
    /// answer 500; unknown files answer 404.
    pub(crate) async fn start(docs: &[(&str, &str)], failing: &[&str]) -> Self {
        let state = Arc::new(ServerState {
            docs: docs
                .iter()
                .map(|(name, body)| (name.to_string(), body.as_bytes().to_vec()))
                .collect(),
            failing: failing.iter().map(|name| name.to_string()).collect(),
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/pdfs/{file}", get(serve_doc))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Root URL a fetcher should resolve documents against.
    pub(crate) fn document_root(&self) -> Url {
        Url::parse(&format!("http://{}/pdfs/", self.addr)).unwrap()
    }

    /// Number of requests answered so far.
    pub(crate) fn hit_count(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

impl Drop for DocServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_doc(State(state): State<Arc<ServerState>>, Path(file): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if state.failing.contains(&file) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    match state.docs.get(&file) {
        Some(body) => body.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable {
        reason: "test store is down".to_string(),
    }
}

/// A store whose every operation fails.
pub(crate) struct UnavailableStore;

#[async_trait::async_trait]
impl BlobStore for UnavailableStore {
    async fn open(&self) -> StoreResult<()> {
        Err(unavailable())
    }

    async fn get(&self, _id: &str) -> StoreResult<Option<Bytes>> {
        Err(unavailable())
    }

    async fn put(&self, _id: &str, _data: Bytes) -> StoreResult<()> {
        Err(unavailable())
    }

    async fn contains(&self, _id: &str) -> StoreResult<bool> {
        Err(unavailable())
    }

    async fn remove(&self, _id: &str) -> StoreResult<()> {
        Err(unavailable())
    }

    async fn clear(&self) -> StoreResult<()> {
        Err(unavailable())
    }

    async fn list_ids(&self) -> StoreResult<Vec<String>> {
        Err(unavailable())
    }

    async fn list_meta(&self) -> StoreResult<Vec<BlobMeta>> {
        Err(unavailable())
    }

    async fn total_size(&self) -> StoreResult<u64> {
        Err(unavailable())
    }

    async fn count(&self) -> StoreResult<usize> {
        Err(unavailable())
    }
}
