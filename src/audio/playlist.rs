use super::engine::{NullEngine, PlayerEngine};
use super::song::Song;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Derived from the song list and the playing flag, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistState {
    Empty,
    Paused,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub position: usize, // 1-based, as shown to the user
    pub song: String,
    pub now_playing: bool,
}

/// Outcome of a playlist operation, rendered by whichever front-end is driving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistEvent {
    Added { title: String },
    Removed { title: String, stopped: bool },
    NotFound,
    IdNotFound { id: i64 },
    Empty,
    Started { index: usize, title: String },
    AlreadyPlaying { title: String },
    Paused { title: String },
    AlreadyPaused,
    Stopped { title: String },
    OutOfRange { index: usize, len: usize },
    PlaybackFailed { title: String, reason: String },
    Queue { name: String, entries: Vec<QueueEntry> },
    Current { song: Song },
}

impl PlaylistEvent {
    /// True for reports about something the user asked for but could not happen
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PlaylistEvent::NotFound
                | PlaylistEvent::IdNotFound { .. }
                | PlaylistEvent::OutOfRange { .. }
                | PlaylistEvent::PlaybackFailed { .. }
        )
    }
}

impl fmt::Display for PlaylistEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistEvent::Added { title } => write!(f, "Added: {}", title),
            PlaylistEvent::Removed { title, stopped: false } => write!(f, "Removed: {}", title),
            PlaylistEvent::Removed { title, stopped: true } => {
                write!(f, "Removed: {} (playback stopped)", title)
            }
            PlaylistEvent::NotFound => write!(f, "Song not found in playlist."),
            PlaylistEvent::IdNotFound { id } => {
                write!(f, "Song with ID {} not found in playlist.", id)
            }
            PlaylistEvent::Empty => write!(f, "Playlist is empty."),
            PlaylistEvent::Started { title, .. } => write!(f, "Playing: {}", title),
            PlaylistEvent::AlreadyPlaying { title } => write!(f, "Already playing: {}", title),
            PlaylistEvent::Paused { title } => write!(f, "Paused: {}", title),
            PlaylistEvent::AlreadyPaused => write!(f, "Music is already paused."),
            PlaylistEvent::Stopped { title } => write!(f, "Stopped: {}", title),
            PlaylistEvent::OutOfRange { index, len } => write!(
                f,
                "No song at position {} (playlist has {} songs).",
                index + 1,
                len
            ),
            PlaylistEvent::PlaybackFailed { title, reason } => {
                write!(f, "Could not play {}: {}", title, reason)
            }
            PlaylistEvent::Queue { name, entries } => {
                write!(f, "Playlist: {}", name)?;
                for entry in entries {
                    let marker = if entry.now_playing { "->" } else { "  " };
                    write!(f, "\n{} {}. {}", marker, entry.position, entry.song)?;
                }
                Ok(())
            }
            PlaylistEvent::Current { song } => write!(f, "Current song: {}", song),
        }
    }
}

/// Ordered queue of songs with a play cursor, driving a player engine.
///
/// Transport operations (play, pause, stop, toggle, next, previous, play_at)
/// move the cursor and the playing flag; mutations (add, remove, delete by id)
/// change membership and keep the cursor pointing at a valid song. Keeping the
/// catalog in step with membership changes is the caller's job.
pub struct Playlist<E: PlayerEngine = NullEngine> {
    name: String,
    songs: Vec<Song>,
    current_index: usize,
    is_playing: bool,
    engine: E,
    loaded: Option<usize>, // index of the song sitting in the engine
}

impl<E: PlayerEngine> Playlist<E> {
    pub fn new(name: impl Into<String>, engine: E) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
            current_index: 0,
            is_playing: false,
            engine,
            loaded: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.current_index)
    }

    pub fn state(&self) -> PlaylistState {
        if self.songs.is_empty() {
            PlaylistState::Empty
        } else if self.is_playing {
            PlaylistState::Playing
        } else {
            PlaylistState::Paused
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn add_song(&mut self, song: Song) -> PlaylistEvent {
        info!("Added '{}' to playlist '{}'", song.title(), self.name);
        let title = song.title().to_string();
        self.songs.push(song);
        PlaylistEvent::Added { title }
    }

    /// Remove the first song equal to `song`
    pub fn remove_song(&mut self, song: &Song) -> PlaylistEvent {
        match self.songs.iter().position(|s| s == song) {
            Some(index) => self.remove_at(index),
            None => {
                warn!("'{}' is not in playlist '{}'", song.title(), self.name);
                PlaylistEvent::NotFound
            }
        }
    }

    pub fn delete_song_by_id(&mut self, id: i64) -> PlaylistEvent {
        match self.songs.iter().position(|s| s.id() == Some(id)) {
            Some(index) => self.remove_at(index),
            None => {
                warn!("No song with ID {} in playlist '{}'", id, self.name);
                PlaylistEvent::IdNotFound { id }
            }
        }
    }

    pub fn play(&mut self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        if self.is_playing {
            let title = self.songs[self.current_index].title().to_string();
            debug!("Already playing '{}'", title);
            return PlaylistEvent::AlreadyPlaying { title };
        }

        self.start_current()
    }

    pub fn pause(&mut self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        if !self.is_playing {
            return PlaylistEvent::AlreadyPaused;
        }

        let title = self.songs[self.current_index].title().to_string();
        if let Err(e) = self.engine.pause() {
            error!("Failed to pause '{}': {}", title, e);
            return PlaylistEvent::PlaybackFailed {
                title,
                reason: e.to_string(),
            };
        }

        self.is_playing = false;
        info!("Paused '{}'", title);
        PlaylistEvent::Paused { title }
    }

    /// Stop output and unload the current song. The cursor stays where it is.
    pub fn stop(&mut self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        let song = &self.songs[self.current_index];
        let title = song.title().to_string();
        if let Err(e) = self.engine.stop() {
            error!("Failed to stop '{}': {}", title, e);
            return PlaylistEvent::PlaybackFailed {
                title,
                reason: e.to_string(),
            };
        }

        song.stop();
        self.loaded = None;
        self.is_playing = false;
        PlaylistEvent::Stopped { title }
    }

    pub fn toggle_play_pause(&mut self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        if self.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Advance with wraparound. Skipping always starts playback, even from pause.
    pub fn next_song(&mut self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        let index = (self.current_index + 1) % self.songs.len();
        self.jump_to(index)
    }

    /// Step back with wraparound; index 0 goes to the last song.
    pub fn previous_song(&mut self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        let len = self.songs.len();
        let index = (self.current_index + len - 1) % len;
        self.jump_to(index)
    }

    /// Move the cursor to `index` (0-based) and start that song from the top
    pub fn play_at(&mut self, index: usize) -> PlaylistEvent {
        if self.songs.is_empty() {
            return self.report_empty();
        }

        if index >= self.songs.len() {
            return PlaylistEvent::OutOfRange {
                index,
                len: self.songs.len(),
            };
        }

        self.jump_to(index)
    }

    pub fn show_queue(&self) -> PlaylistEvent {
        if self.songs.is_empty() {
            return PlaylistEvent::Empty;
        }

        let entries = self
            .songs
            .iter()
            .enumerate()
            .map(|(i, song)| QueueEntry {
                position: i + 1,
                song: song.to_string(),
                now_playing: i == self.current_index && self.is_playing,
            })
            .collect();

        PlaylistEvent::Queue {
            name: self.name.clone(),
            entries,
        }
    }

    pub fn show_current_song(&self) -> PlaylistEvent {
        match self.current_song() {
            Some(song) => PlaylistEvent::Current { song: song.clone() },
            None => PlaylistEvent::Empty,
        }
    }

    fn report_empty(&self) -> PlaylistEvent {
        debug!("Playlist '{}' is empty", self.name);
        PlaylistEvent::Empty
    }

    fn jump_to(&mut self, index: usize) -> PlaylistEvent {
        self.current_index = index;
        // Skips restart the target song rather than resuming it
        self.loaded = None;
        self.start_current()
    }

    fn start_current(&mut self) -> PlaylistEvent {
        let index = self.current_index;

        match self.engine_start(index) {
            Ok(()) => {
                let song = &self.songs[index];
                song.play();
                self.is_playing = true;
                PlaylistEvent::Started {
                    index,
                    title: song.title().to_string(),
                }
            }
            Err(e) => {
                let title = self.songs[index].title().to_string();
                error!("Failed to play '{}': {}", title, e);
                let _ = self.engine.stop();
                self.loaded = None;
                self.is_playing = false;
                PlaylistEvent::PlaybackFailed {
                    title,
                    reason: e.to_string(),
                }
            }
        }
    }

    // Resume if the engine already holds this song, otherwise load it first
    fn engine_start(&mut self, index: usize) -> crate::error::Result<()> {
        if self.loaded != Some(index) {
            self.loaded = None;
            self.engine.load(self.songs[index].file_path())?;
            self.loaded = Some(index);
        }
        self.engine.play()
    }

    fn remove_at(&mut self, index: usize) -> PlaylistEvent {
        let removed = self.songs.remove(index);
        let mut stopped = false;

        match self.loaded {
            Some(loaded) if loaded == index => {
                if let Err(e) = self.engine.stop() {
                    warn!("Failed to stop removed song '{}': {}", removed.title(), e);
                }
                self.loaded = None;
                if self.is_playing {
                    removed.stop();
                    self.is_playing = false;
                    stopped = true;
                }
            }
            Some(loaded) if loaded > index => self.loaded = Some(loaded - 1),
            _ => {}
        }

        // Keep the cursor on the same song when something before it goes away
        if index < self.current_index {
            self.current_index -= 1;
        }

        if self.songs.is_empty() {
            self.current_index = 0;
            self.is_playing = false;
        } else if self.current_index >= self.songs.len() {
            self.current_index = self.songs.len() - 1;
        }

        info!("Removed '{}' from playlist '{}'", removed.title(), self.name);
        PlaylistEvent::Removed {
            title: removed.title().to_string(),
            stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::engine::testing::{EngineCall, RecordingEngine};
    use std::path::Path;

    fn song(id: i64, title: &str) -> Song {
        Song::restore(id, title, "00:03:00", format!("/music/{}.mp3", title.to_lowercase()))
    }

    fn abc() -> Playlist<RecordingEngine> {
        let mut playlist = Playlist::new("Test", RecordingEngine::default());
        playlist.add_song(song(1, "A"));
        playlist.add_song(song(2, "B"));
        playlist.add_song(song(3, "C"));
        playlist
    }

    fn title_of(playlist: &Playlist<RecordingEngine>) -> &str {
        playlist.current_song().unwrap().title()
    }

    #[test]
    fn test_add_keeps_cursor_and_flag() {
        let mut playlist = abc();
        playlist.next_song();
        playlist.add_song(song(4, "D"));

        assert_eq!(playlist.len(), 4);
        assert_eq!(playlist.current_index(), 1);
        assert!(playlist.is_playing());
        assert_eq!(playlist.songs()[3].title(), "D");
    }

    #[test]
    fn test_empty_playlist_reports_and_does_nothing() {
        let mut playlist = Playlist::new("Empty", RecordingEngine::default());

        assert_eq!(playlist.play(), PlaylistEvent::Empty);
        assert_eq!(playlist.next_song(), PlaylistEvent::Empty);
        assert_eq!(playlist.previous_song(), PlaylistEvent::Empty);
        assert_eq!(playlist.pause(), PlaylistEvent::Empty);
        assert_eq!(playlist.toggle_play_pause(), PlaylistEvent::Empty);
        assert_eq!(playlist.stop(), PlaylistEvent::Empty);
        assert_eq!(playlist.play_at(0), PlaylistEvent::Empty);
        assert_eq!(playlist.show_queue(), PlaylistEvent::Empty);
        assert_eq!(playlist.show_current_song(), PlaylistEvent::Empty);

        assert_eq!(playlist.current_index(), 0);
        assert!(!playlist.is_playing());
        assert_eq!(playlist.state(), PlaylistState::Empty);
        assert!(playlist.engine().calls.is_empty());
    }

    #[test]
    fn test_next_walks_and_wraps() {
        let mut playlist = abc();

        let event = playlist.next_song();
        assert_eq!(event, PlaylistEvent::Started { index: 1, title: "B".to_string() });
        assert_eq!(playlist.current_index(), 1);
        assert!(playlist.is_playing());

        playlist.next_song();
        assert_eq!(title_of(&playlist), "C");
        assert_eq!(playlist.current_index(), 2);

        playlist.next_song();
        assert_eq!(title_of(&playlist), "A");
        assert_eq!(playlist.current_index(), 0);
    }

    #[test]
    fn test_previous_from_zero_wraps_to_last() {
        let mut playlist = abc();
        playlist.previous_song();
        assert_eq!(playlist.current_index(), 2);
        assert_eq!(title_of(&playlist), "C");
        assert!(playlist.is_playing());
    }

    #[test]
    fn test_next_len_times_returns_to_start() {
        for start in 0..3 {
            let mut playlist = abc();
            playlist.play_at(start);
            for _ in 0..playlist.len() {
                playlist.next_song();
            }
            assert_eq!(playlist.current_index(), start);
        }
    }

    #[test]
    fn test_previous_then_next_is_identity() {
        for start in 0..3 {
            let mut playlist = abc();
            playlist.play_at(start);

            playlist.previous_song();
            playlist.next_song();
            assert_eq!(playlist.current_index(), start);

            playlist.next_song();
            playlist.previous_song();
            assert_eq!(playlist.current_index(), start);
        }
    }

    #[test]
    fn test_single_song_wraps_onto_itself() {
        let mut playlist = Playlist::new("Solo", RecordingEngine::default());
        playlist.add_song(song(1, "Only"));

        playlist.next_song();
        assert_eq!(playlist.current_index(), 0);
        playlist.previous_song();
        assert_eq!(playlist.current_index(), 0);
        // Each skip reloads the song from the top
        assert_eq!(playlist.engine().loads().len(), 2);
    }

    #[test]
    fn test_skip_forces_playback_from_pause() {
        let mut playlist = abc();
        assert!(!playlist.is_playing());
        playlist.next_song();
        assert!(playlist.is_playing());

        playlist.pause();
        playlist.previous_song();
        assert!(playlist.is_playing());
        assert_eq!(playlist.current_index(), 0);
    }

    #[test]
    fn test_toggle_twice_restores_flag() {
        let mut playlist = abc();

        for _ in 0..2 {
            let before = playlist.is_playing();
            playlist.toggle_play_pause();
            assert_ne!(playlist.is_playing(), before);
            playlist.toggle_play_pause();
            assert_eq!(playlist.is_playing(), before);
            playlist.next_song();
        }
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut playlist = abc();
        playlist.play_at(1);
        let calls = playlist.engine().calls.len();

        let event = playlist.play();
        assert_eq!(event, PlaylistEvent::AlreadyPlaying { title: "B".to_string() });
        assert_eq!(playlist.current_index(), 1);
        assert!(playlist.is_playing());
        assert_eq!(playlist.engine().calls.len(), calls);
    }

    #[test]
    fn test_pause_then_play_resumes_without_reload() {
        let mut playlist = abc();
        playlist.play();
        assert_eq!(playlist.pause(), PlaylistEvent::Paused { title: "A".to_string() });
        assert_eq!(playlist.pause(), PlaylistEvent::AlreadyPaused);
        assert_eq!(playlist.state(), PlaylistState::Paused);

        playlist.play();
        assert_eq!(playlist.state(), PlaylistState::Playing);
        assert_eq!(
            playlist.engine().calls,
            vec![
                EngineCall::Load("/music/a.mp3".into()),
                EngineCall::Play,
                EngineCall::Pause,
                EngineCall::Play,
            ]
        );
    }

    #[test]
    fn test_stop_unloads_and_next_play_reloads() {
        let mut playlist = abc();
        playlist.play();
        assert_eq!(playlist.stop(), PlaylistEvent::Stopped { title: "A".to_string() });
        assert!(!playlist.is_playing());
        assert_eq!(playlist.current_index(), 0);

        playlist.play();
        assert_eq!(playlist.engine().loads().len(), 2);
    }

    #[test]
    fn test_play_at_out_of_range() {
        let mut playlist = abc();
        assert_eq!(playlist.play_at(3), PlaylistEvent::OutOfRange { index: 3, len: 3 });
        assert_eq!(playlist.current_index(), 0);
        assert!(!playlist.is_playing());

        playlist.play_at(2);
        assert_eq!(title_of(&playlist), "C");
        assert_eq!(playlist.engine().loads(), vec![Path::new("/music/c.mp3")]);
    }

    #[test]
    fn test_engine_failure_is_reported_not_fatal() {
        let mut playlist = Playlist::new("Broken", RecordingEngine::failing_on("/music/b.mp3"));
        playlist.add_song(song(1, "A"));
        playlist.add_song(song(2, "B"));

        let event = playlist.next_song();
        assert!(event.is_failure());
        assert!(matches!(event, PlaylistEvent::PlaybackFailed { ref title, .. } if title == "B"));
        assert_eq!(playlist.current_index(), 1);
        assert!(!playlist.is_playing());

        // The rest of the playlist still works
        playlist.next_song();
        assert_eq!(playlist.current_index(), 0);
        assert!(playlist.is_playing());
    }

    #[test]
    fn test_remove_before_cursor_keeps_current_song() {
        let mut playlist = abc();
        playlist.play_at(2);

        playlist.remove_song(&song(1, "A"));
        assert_eq!(playlist.current_index(), 1);
        assert_eq!(title_of(&playlist), "C");
        assert!(playlist.is_playing());

        // The engine still holds C, so pause/play resumes rather than reloads
        playlist.pause();
        playlist.play();
        assert_eq!(playlist.engine().loads().len(), 1);
    }

    #[test]
    fn test_remove_playing_song_stops_playback() {
        let mut playlist = abc();
        playlist.play_at(1);

        let event = playlist.delete_song_by_id(2);
        assert_eq!(event, PlaylistEvent::Removed { title: "B".to_string(), stopped: true });
        assert!(!playlist.is_playing());
        assert_eq!(playlist.current_index(), 1);
        assert_eq!(title_of(&playlist), "C");
        assert_eq!(playlist.engine().calls.last(), Some(&EngineCall::Stop));
    }

    #[test]
    fn test_remove_last_song_clamps_cursor() {
        let mut playlist = abc();
        playlist.play_at(2);
        playlist.pause();

        let event = playlist.delete_song_by_id(3);
        assert_eq!(event, PlaylistEvent::Removed { title: "C".to_string(), stopped: false });
        assert_eq!(playlist.current_index(), 1);
        assert_eq!(title_of(&playlist), "B");
    }

    #[test]
    fn test_removing_everything_resets() {
        let mut playlist = abc();
        playlist.play_at(1);
        for id in 1..=3 {
            playlist.delete_song_by_id(id);
        }

        assert!(playlist.is_empty());
        assert_eq!(playlist.current_index(), 0);
        assert!(!playlist.is_playing());
        assert_eq!(playlist.state(), PlaylistState::Empty);
    }

    #[test]
    fn test_remove_and_delete_missing() {
        let mut playlist = abc();
        assert_eq!(playlist.remove_song(&song(9, "Z")), PlaylistEvent::NotFound);
        assert_eq!(playlist.delete_song_by_id(9), PlaylistEvent::IdNotFound { id: 9 });
        assert_eq!(playlist.len(), 3);
    }

    #[test]
    fn test_delete_by_id_ignores_unsaved_songs() {
        let mut playlist = abc();
        playlist.add_song(Song::new("Fresh", "00:01:00", "/music/fresh.mp3").unwrap());
        assert_eq!(playlist.delete_song_by_id(4), PlaylistEvent::IdNotFound { id: 4 });
        assert_eq!(playlist.len(), 4);
    }

    #[test]
    fn test_queue_marks_only_playing_current() {
        let mut playlist = abc();
        playlist.play_at(1);

        let PlaylistEvent::Queue { name, entries } = playlist.show_queue() else {
            panic!("expected a queue");
        };
        assert_eq!(name, "Test");
        let marked: Vec<usize> = entries
            .iter()
            .filter(|e| e.now_playing)
            .map(|e| e.position)
            .collect();
        assert_eq!(marked, vec![2]);

        playlist.pause();
        let PlaylistEvent::Queue { entries, .. } = playlist.show_queue() else {
            panic!("expected a queue");
        };
        assert!(entries.iter().all(|e| !e.now_playing));
    }

    #[test]
    fn test_event_rendering() {
        let mut playlist = abc();
        playlist.play_at(0);

        assert_eq!(
            playlist.show_queue().to_string(),
            "Playlist: Test\n-> 1. A [00:03:00]\n   2. B [00:03:00]\n   3. C [00:03:00]"
        );
        assert_eq!(
            playlist.show_current_song().to_string(),
            "Current song: A [00:03:00]"
        );
        assert_eq!(PlaylistEvent::Empty.to_string(), "Playlist is empty.");
    }
}
