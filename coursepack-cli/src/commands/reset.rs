use super::AppContext;
use crate::error::AppError;

pub async fn run(ctx: &AppContext) -> Result<(), AppError> {
    ctx.state.reset_preload_complete().await?;
    println!("Preload marker cleared. The next `coursepack preload` will run the full flow.");
    Ok(())
}
