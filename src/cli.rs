use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ImportConfig, MissingTownHallPolicy};
use crate::query::DEFAULT_LIMIT;

#[derive(Parser, Debug)]
#[command(name = "ekatte-import")]
#[command(version, about = "Import the EKATTE territorial register into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all datasets from the source API and import them
    Sync {
        /// SQLite database path (created if missing)
        db: PathBuf,

        /// JSON file with source URLs (default: public NSI endpoints)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        import: ImportArgs,
    },

    /// Save the four source datasets to a local snapshot directory
    Download {
        /// Output directory (default: user cache directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with source URLs
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Import a snapshot directory produced by `download`
    Import {
        /// Directory containing regions.json, municipalities.json, ...
        snapshot_dir: PathBuf,

        /// SQLite database path (created if missing)
        db: PathBuf,

        /// JSON file with import options (`batch_size`, `missing_town_hall`)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        import: ImportArgs,
    },

    /// Search territorial units by name
    Search {
        /// SQLite database path
        db: PathBuf,

        /// Substring to look for (empty lists everything)
        #[arg(default_value = "")]
        query: String,

        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,

        #[arg(short, long, default_value_t = 0)]
        offset: u32,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tables and their columns
    ListTables,
}

/// Options shared by `sync` and `import`
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Rows per INSERT statement
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// What to do when a town hall cannot be matched to a municipality
    #[arg(long, value_enum)]
    pub on_missing_town_hall: Option<MissingTownHallPolicy>,

    /// Show the full-screen dashboard
    #[arg(long)]
    pub tui: bool,

    /// Print per-table statistics
    #[arg(short, long)]
    pub verbose: bool,
}

impl ImportArgs {
    /// Let command-line flags override the config file
    pub fn apply(&self, config: &mut ImportConfig) {
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(policy) = self.on_missing_town_hall {
            config.missing_town_hall = policy;
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
