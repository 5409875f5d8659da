use reqwest::StatusCode;

/// Errors surfaced by the persistent document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing storage could not be brought up at all, for example
    /// because the directory cannot be created or is not writable.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while resolving a document over the network.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch '{id}': server returned status {status}")]
    Status { id: String, status: StatusCode },

    #[error("failed to fetch '{id}': {source}")]
    Network {
        id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid document URL for '{id}': {reason}")]
    InvalidUrl { id: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors from loading a course manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from driving the preload flow out of order.
#[derive(Debug, thiserror::Error)]
pub enum PreloadError {
    #[error("preload is {state} but this step requires {expected}")]
    InvalidState {
        state: &'static str,
        expected: &'static str,
    },
}
