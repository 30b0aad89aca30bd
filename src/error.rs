//! Error types for the import pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    /// Source answered with a non-success status
    #[error("Failed to fetch {url}: {status}")]
    FetchStatus { url: String, status: u16 },

    /// Source could not be reached at all
    #[error("Failed to fetch {url}: {source}")]
    FetchTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Payload was not a JSON array of records
    #[error("Expected an array from {origin}: {detail}")]
    Shape { origin: String, detail: String },

    /// Any failure raised by SQLite, including BEGIN/COMMIT/ROLLBACK
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A territorial unit points at a town hall with no derivable municipality
    #[error("Town hall {town_hall_code} referenced by {ekatte} has no matching municipality")]
    UnresolvedTownHall {
        ekatte: String,
        town_hall_code: String,
    },

    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path:?}: {detail}")]
    Config { path: PathBuf, detail: String },

    #[error("Invalid import options: {0}")]
    InvalidOptions(String),
}

impl ImportError {
    /// True for failures retrieving a source dataset
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            ImportError::FetchStatus { .. } | ImportError::FetchTransport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
