use coursepack_engine::BlobStore;

use super::AppContext;
use crate::error::AppError;
use crate::utils::{format_bytes, format_timestamp};

pub async fn run(ctx: &AppContext, files: bool) -> Result<(), AppError> {
    let count = ctx.store.count().await?;
    let total_size = ctx.store.total_size().await?;
    let preloaded = ctx.state.is_preload_complete().await;

    println!("Course:   {}", ctx.manifest.course);
    println!(
        "Cached:   {} of {} documents ({})",
        count,
        ctx.manifest.len(),
        format_bytes(total_size)
    );
    println!("Preload:  {}", if preloaded { "completed" } else { "not run" });

    if files {
        let mut records = ctx.store.list_meta().await?;
        records.sort_by(|a, b| a.id.cmp(&b.id));

        if records.is_empty() {
            println!("\nNo documents cached.");
        } else {
            println!();
            for meta in &records {
                println!(
                    "{:>10}  {}  {}",
                    format_bytes(meta.size),
                    format_timestamp(meta.cached_at),
                    meta.id
                );
            }
        }
    }

    Ok(())
}
