//! # Startup Gate
//!
//! Decides once per launch whether the preload flow should run before the
//! app proper. The preload is skipped only when the user completed it
//! before AND the store still holds most of the manifest; the marker
//! alone is not trusted because the store can be cleared independently.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::manifest::Manifest;
use crate::state::StateStore;
use crate::store::BlobStore;

// The preload is skipped while at least 4/5 of the manifest is stored,
// so losing a stray record does not drag the user back through the flow.
const WARM_NUMERATOR: usize = 4;
const WARM_DENOMINATOR: usize = 5;

/// What the app should do at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Offer the preload flow before entering the app.
    RunPreload,
    /// The cache is warm enough; go straight in.
    SkipPreload,
}

pub struct StartupGate {
    store: Arc<dyn BlobStore>,
    state: Arc<StateStore>,
    manifest: Arc<Manifest>,
}

impl StartupGate {
    pub fn new(
        store: Arc<dyn BlobStore>,
        state: Arc<StateStore>,
        manifest: Arc<Manifest>,
    ) -> Self {
        Self {
            store,
            state,
            manifest,
        }
    }

    /// Decide between running and skipping the preload flow. Never fails:
    /// when the cache state cannot be determined, offering the preload
    /// flow again is the safe answer.
    pub async fn decide(&self) -> GateDecision {
        if !self.state.is_preload_complete().await {
            debug!("No completion marker, offering preload");
            return GateDecision::RunPreload;
        }

        let total = self.manifest.len();
        match self.store.count().await {
            Ok(count) if count * WARM_DENOMINATOR >= total * WARM_NUMERATOR => {
                debug!(count, total, "Cache warm enough, skipping preload");
                GateDecision::SkipPreload
            }
            Ok(count) => {
                debug!(count, total, "Cache below completeness threshold");
                GateDecision::RunPreload
            }
            Err(e) => {
                warn!(error = %e, "Could not inspect the store, offering preload");
                GateDecision::RunPreload
            }
        }
    }
}
