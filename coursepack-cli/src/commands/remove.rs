use coursepack_engine::BlobStore;

use super::AppContext;
use crate::error::AppError;

pub async fn run(ctx: &AppContext, file: &str) -> Result<(), AppError> {
    if !ctx.store.contains(file).await? {
        println!("{file} is not cached.");
        return Ok(());
    }

    ctx.store.remove(file).await?;
    println!("Removed {file} from the cache.");
    Ok(())
}
