use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    version,
    about = "Offline cache manager for course documents",
    long_about = "Keeps a course's reference documents (lecture notes, tutorials, past\n\
                  exams) cached on disk so they stay available without a network\n\
                  connection.\n\
                  \n\
                  The typical flow is a one-time `preload` that downloads every document\n\
                  listed in the course manifest; afterwards `fetch` serves documents from\n\
                  the local cache and only touches the network for files the cache does\n\
                  not hold. `status` shows how warm the cache is."
)]
pub struct CliArgs {
    /// Directory holding the document cache and app state
    #[arg(
        long,
        default_value = "./.coursepack",
        help = "Directory where cached documents and app state are kept"
    )]
    pub data_dir: PathBuf,

    /// Document root URL override
    #[arg(
        long,
        help = "Document root URL; overrides the manifest's bundled origin"
    )]
    pub origin: Option<String>,

    /// Course manifest override
    #[arg(
        long,
        help = "Path to a course manifest JSON file (defaults to the bundled manifest)"
    )]
    pub manifest: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging on stdout")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download every manifest document that is not cached yet
    Preload {
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,

        #[arg(
            long,
            help = "Probe the origin for file sizes before asking for confirmation"
        )]
        estimate: bool,

        #[arg(
            long,
            help = "Check the cache even if a previous preload was completed"
        )]
        force: bool,
    },

    /// Show cache totals and the preload marker
    Status {
        #[arg(long, help = "List every cached document with size and cache date")]
        files: bool,
    },

    /// Resolve one document (cache first) and write it to a file
    Fetch {
        /// Document filename as listed in the manifest
        file: String,

        #[arg(
            short,
            long,
            help = "Output path (defaults to the document filename in the current directory)"
        )]
        output: Option<PathBuf>,
    },

    /// Delete one cached document
    Remove {
        /// Document filename to drop from the cache
        file: String,
    },

    /// Delete every cached document
    Clear {
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    /// Forget that a preload completed, so the flow runs again
    Reset,
}
