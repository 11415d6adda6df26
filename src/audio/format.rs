use serde::{Deserialize, Serialize};
use std::path::Path;

/// Formats the player knows how to recognise by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Mp3,
    Unknown,
}

/// Formats a song's file path may point at. Extend this together with the enum.
pub const SUPPORTED_FORMATS: &[AudioFormat] = &[AudioFormat::Mp3];

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_FORMATS.contains(self)
    }
}
