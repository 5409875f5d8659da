use std::path::PathBuf;

use tracing::info;

use super::AppContext;
use crate::error::AppError;
use crate::utils::format_bytes;

pub async fn run(ctx: &AppContext, file: &str, output: Option<PathBuf>) -> Result<(), AppError> {
    let data = ctx.fetcher.resolve(file).await?;
    let dest = output.unwrap_or_else(|| PathBuf::from(file));

    tokio::fs::write(&dest, &data).await?;
    info!(file, dest = %dest.display(), size = data.len(), "Document written");
    println!(
        "Saved {} ({}) to {}",
        file,
        format_bytes(data.len() as u64),
        dest.display()
    );
    Ok(())
}
