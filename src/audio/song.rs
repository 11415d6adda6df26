use super::AudioFormat;
use crate::error::{Result, TuneboxError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    id: Option<i64>,      // assigned by the catalog on insert
    title: String,
    duration: String,     // free text like "00:03:45", never parsed
    file_path: PathBuf,
}

impl Song {
    /// Build a song from user input. The file must have a supported extension.
    pub fn new(
        title: impl Into<String>,
        duration: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let file_path = file_path.into();
        validate_path(&file_path)?;

        Ok(Self {
            id: None,
            title: title.into(),
            duration: duration.into(),
            file_path,
        })
    }

    /// Rebuild a song from a catalog row. Rows are trusted as stored.
    pub fn restore(
        id: i64,
        title: impl Into<String>,
        duration: impl Into<String>,
        file_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: Some(id),
            title: title.into(),
            duration: duration.into(),
            file_path: file_path.into(),
        }
    }

    /// Attach the identity the catalog handed out
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn format(&self) -> AudioFormat {
        AudioFormat::from_path(&self.file_path)
    }

    /// Point the song at a different file. Unsupported formats leave it untouched.
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        validate_path(&path)?;
        self.file_path = path;
        Ok(())
    }

    pub fn play(&self) {
        info!(title = %self.title, path = %self.file_path.display(), "Playing");
    }

    pub fn stop(&self) {
        info!(title = %self.title, "Stopped");
    }
}

fn validate_path(path: &Path) -> Result<()> {
    if AudioFormat::from_path(path).is_supported() {
        Ok(())
    } else {
        Err(TuneboxError::unsupported_format(path))
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title, self.duration)
    }
}
