use std::sync::Arc;

use coursepack_engine::{
    GateDecision, OnPreload, PreloadOutcome, PreloadState, Preloader, StartupGate,
};
use tracing::info;

use super::AppContext;
use crate::error::AppError;
use crate::utils::progress::PreloadProgress;
use crate::utils::{confirm, format_bytes};

/// How many pending filenames to print before eliding the rest.
const LISTING_LIMIT: usize = 10;

pub async fn run(ctx: &AppContext, yes: bool, estimate: bool, force: bool) -> Result<(), AppError> {
    if !force {
        let gate = StartupGate::new(ctx.store.clone(), ctx.state.clone(), ctx.manifest.clone());
        if gate.decide().await == GateDecision::SkipPreload {
            println!("Cache is warm, nothing to preload. Run with --force to re-check every file.");
            return Ok(());
        }
    }

    let mut preloader = Preloader::new(
        ctx.fetcher.clone(),
        ctx.store.clone(),
        ctx.manifest.clone(),
    );
    preloader.check_cache().await?;

    if matches!(
        preloader.state(),
        PreloadState::Complete(PreloadOutcome::NothingToDo)
    ) {
        println!(
            "All {} documents are already cached.",
            ctx.manifest.len()
        );
        ctx.state.set_preload_complete().await?;
        return Ok(());
    }

    let pending = preloader.pending().to_vec();
    println!(
        "{} of {} documents for \"{}\" are missing from the local cache:",
        pending.len(),
        ctx.manifest.len(),
        ctx.manifest.course
    );
    for id in pending.iter().take(LISTING_LIMIT) {
        println!("  {id}");
    }
    if pending.len() > LISTING_LIMIT {
        println!("  ... and {} more", pending.len() - LISTING_LIMIT);
    }

    if estimate {
        let mut total = 0u64;
        for id in &pending {
            total += ctx.fetcher.probe_size(id).await;
        }
        if total > 0 {
            println!("Estimated download size: {}", format_bytes(total));
        } else {
            println!("Download size unknown, the server did not report sizes.");
        }
    }

    if !yes && !confirm("Download the missing documents now?")? {
        println!("Preload skipped. Run `coursepack preload` again at any time.");
        return Ok(());
    }

    let progress = PreloadProgress::new(pending.len() as u64);
    let on_event: OnPreload = {
        let progress = progress.clone();
        Arc::new(move |event| progress.handle_event(&event))
    };

    let summary = preloader.download(Some(on_event)).await?;
    progress.finish();

    match summary.outcome() {
        PreloadOutcome::FullSuccess => {
            info!(
                completed = summary.completed,
                bytes = summary.bytes_transferred,
                "Preload finished"
            );
            println!(
                "Preloaded {} documents ({}).",
                summary.completed,
                format_bytes(summary.bytes_transferred)
            );
        }
        PreloadOutcome::PartialSuccess { failed } => {
            println!(
                "Preloaded {} of {} documents ({}); {} failed:",
                summary.completed,
                summary.total,
                format_bytes(summary.bytes_transferred),
                failed.len()
            );
            for id in &failed {
                println!("  {id}");
            }
            println!("Failed documents will be fetched on demand, or run `coursepack preload` again.");
        }
        PreloadOutcome::NothingToDo => {
            println!("Nothing to download.");
        }
    }

    // The marker records that a preload pass ran to completion; partial
    // batches still count, the startup gate's tolerance covers the gap.
    ctx.state.set_preload_complete().await?;
    Ok(())
}
