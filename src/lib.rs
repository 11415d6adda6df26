// tunebox library - song catalog, playlist transport and the text menu
// The playlist never touches the catalog itself; front-ends keep the two in step

pub mod audio;   // songs, playlist state machine, player engines
pub mod catalog; // SQLite-backed song store
pub mod config;  // settings and preferences
pub mod error;
pub mod logging;
pub mod ui;      // text menu

// Export the stuff other modules actually use
pub use audio::{NullEngine, PlayerEngine, Playlist, PlaylistEvent, PlaylistState, Song};
pub use catalog::Catalog;
pub use config::Config;
pub use error::{Result, TuneboxError};
