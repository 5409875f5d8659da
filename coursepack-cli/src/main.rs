use std::sync::Arc;

use clap::Parser;
use coursepack_engine::{BlobStore, DiskStore, DocumentFetcher, FetcherConfig, Manifest, StateStore};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use url::Url;

mod cli;
mod commands;
mod error;
mod utils;

use cli::{CliArgs, Command};
use commands::AppContext;
use error::AppError;

const BUNDLED_MANIFEST: &str = include_str!("../assets/manifest.json");

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Command failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    setup_logging(&args)?;

    // Load the course manifest
    let manifest = match &args.manifest {
        Some(path) => Manifest::from_path(path).await?,
        None => Manifest::from_json(BUNDLED_MANIFEST)
            .map_err(|e| AppError::Initialization(format!("bundled manifest is invalid: {e}")))?,
    };
    info!(course = %manifest.course, documents = manifest.len(), "Manifest loaded");

    // Resolve the document origin: explicit flag first, manifest second
    let origin = args
        .origin
        .clone()
        .or_else(|| manifest.origin.clone())
        .ok_or_else(|| {
            AppError::InvalidInput(
                "no document origin: pass --origin or set one in the manifest".to_string(),
            )
        })?;
    let document_root = Url::parse(&origin)
        .map_err(|e| AppError::InvalidInput(format!("invalid origin URL '{origin}': {e}")))?;

    // Wire up the store, the app state and the fetcher
    let store: Arc<dyn BlobStore> = Arc::new(DiskStore::new(args.data_dir.join("documents")));
    if let Err(e) = store.open().await {
        warn!(error = %e, "Document store unavailable, continuing without a cache");
    }
    let state = Arc::new(StateStore::new(args.data_dir.join("state.json")));
    let fetcher = Arc::new(DocumentFetcher::new(
        FetcherConfig::new(document_root),
        store.clone(),
    )?);

    let ctx = AppContext {
        store,
        state,
        fetcher,
        manifest: Arc::new(manifest),
    };

    match args.command {
        Command::Preload {
            yes,
            estimate,
            force,
        } => commands::preload::run(&ctx, yes, estimate, force).await,
        Command::Status { files } => commands::status::run(&ctx, files).await,
        Command::Fetch { file, output } => commands::fetch::run(&ctx, &file, output).await,
        Command::Remove { file } => commands::remove::run(&ctx, &file).await,
        Command::Clear { yes } => commands::clear::run(&ctx, yes).await,
        Command::Reset => commands::reset::run(&ctx).await,
    }
}

fn setup_logging(args: &CliArgs) -> Result<(), AppError> {
    std::fs::create_dir_all(&args.data_dir)?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(args.data_dir.join("coursepack.log"))?;

    // The log file gets everything; stdout joins in only with --verbose
    // so normal command output stays readable
    if args.verbose {
        let multi_writer = MakeWriterExt::and(std::io::stdout, log_file);
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_writer(multi_writer)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| AppError::Initialization(e.to_string()))?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(log_file)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| AppError::Initialization(e.to_string()))?;
    }
    Ok(())
}
