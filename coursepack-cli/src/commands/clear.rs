use coursepack_engine::BlobStore;

use super::AppContext;
use crate::error::AppError;
use crate::utils::{confirm, format_bytes};

pub async fn run(ctx: &AppContext, yes: bool) -> Result<(), AppError> {
    let count = ctx.store.count().await?;
    if count == 0 {
        println!("The cache is already empty.");
        return Ok(());
    }

    let total_size = ctx.store.total_size().await?;
    if !yes
        && !confirm(&format!(
            "Delete {} cached documents ({})?",
            count,
            format_bytes(total_size)
        ))?
    {
        println!("Nothing deleted.");
        return Ok(());
    }

    ctx.store.clear().await?;
    println!("Cleared {} documents ({}).", count, format_bytes(total_size));
    println!("The preload marker is untouched; run `coursepack reset` to clear it too.");
    Ok(())
}
