// Song catalog - the durable list of songs, kept in SQLite
// Every call commits on its own; the playlist is just an in-memory view of these rows

use crate::audio::Song;
use crate::config::CatalogConfig;
use crate::error::{Result, TuneboxError};
use rusqlite::{params, Connection, Row};
use std::fs;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const CATALOG_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS songs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        duration TEXT NOT NULL,
        file_path TEXT NOT NULL
    );
"#;

/// Owns the one catalog connection. A catalog that failed to connect, or has
/// been closed, answers every call with a connection error instead of panicking.
pub struct Catalog {
    conn: Option<Connection>,
}

impl Catalog {
    /// Connect, reporting failure through the log and returning an unusable catalog
    pub fn connect(config: &CatalogConfig) -> Self {
        match Self::try_connect(config) {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Catalog connection failed: {}", e);
                Self { conn: None }
            }
        }
    }

    pub fn try_connect(config: &CatalogConfig) -> Result<Self> {
        let opened = if config.is_in_memory() {
            Connection::open_in_memory()
        } else {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        TuneboxError::Connection(format!("{}: {}", parent.display(), e))
                    })?;
                }
            }
            Connection::open(&config.path)
        };
        let conn = opened
            .map_err(|e| TuneboxError::Connection(format!("{}: {}", config.path.display(), e)))?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch(CATALOG_SCHEMA)?;

        info!("Catalog connected: {}", config.path.display());
        Ok(Self { conn: Some(conn) })
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| TuneboxError::Connection("catalog is not connected".to_string()))
    }

    /// All songs in insertion order. Failures are logged and yield an empty list.
    pub fn fetch_all_songs(&self) -> Vec<Song> {
        match self.try_fetch_all_songs() {
            Ok(songs) => songs,
            Err(e) => {
                error!("Error fetching songs: {}", e);
                Vec::new()
            }
        }
    }

    pub fn try_fetch_all_songs(&self) -> Result<Vec<Song>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, title, duration, file_path FROM songs ORDER BY id")?;

        let songs = stmt
            .query_map([], row_to_song)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Fetched {} songs from catalog", songs.len());
        Ok(songs)
    }

    /// Store a new row from `song` and return its id. Any id already on the song is ignored.
    pub fn insert_song(&self, song: &Song) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO songs (title, duration, file_path) VALUES (?1, ?2, ?3)",
            params![
                song.title(),
                song.duration(),
                song.file_path().to_string_lossy().into_owned(),
            ],
        )
        .map_err(|e| {
            error!("Error inserting song '{}': {}", song.title(), e);
            e
        })?;

        let id = conn.last_insert_rowid();
        info!("Song '{}' added with ID {}", song.title(), id);
        Ok(id)
    }

    /// Returns the number of rows removed; an unknown id removes nothing and is not an error.
    pub fn delete_song_by_id(&self, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])
            .map_err(|e| {
                error!("Error deleting song {}: {}", id, e);
                e
            })?;

        if removed == 0 {
            debug!("No catalog row with ID {}", id);
        } else {
            info!("Song with ID {} deleted", id);
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Release the connection. Safe to call more than once.
    pub fn close(&mut self) {
        match self.conn.take() {
            Some(conn) => match conn.close() {
                Ok(()) => info!("Catalog connection closed"),
                Err((_, e)) => error!("Error closing catalog connection: {}", e),
            },
            None => warn!("Catalog connection already closed"),
        }
    }
}

fn row_to_song(row: &Row) -> rusqlite::Result<Song> {
    let file_path: String = row.get(3)?;
    Ok(Song::restore(row.get(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?, file_path))
}
