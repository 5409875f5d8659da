use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] coursepack_engine::StoreError),

    #[error("Download error: {0}")]
    Fetch(#[from] coursepack_engine::FetchError),

    #[error("Preload error: {0}")]
    Preload(#[from] coursepack_engine::PreloadError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] coursepack_engine::ManifestError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),
}
