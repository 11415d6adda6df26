// Error types shared by the catalog, the playlist core and the config layer

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TuneboxError>;

#[derive(Error, Debug)]
pub enum TuneboxError {
    /// Store unreachable, misconfigured, or already closed
    #[error("Database connection error: {0}")]
    Connection(String),

    /// A CRUD statement failed
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Unsupported format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Player engine refused to load or drive a file
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TuneboxError {
    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    /// Validation errors come from user input; everything else is environmental
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}
