pub mod engine;
pub mod format;
pub mod playlist;
pub mod song;

pub use engine::{open_engine, NullEngine, PlayerEngine};
pub use format::{AudioFormat, SUPPORTED_FORMATS};
pub use playlist::{Playlist, PlaylistEvent, PlaylistState, QueueEntry};
pub use song::Song;

#[cfg(feature = "audio")]
pub use engine::RodioEngine;
