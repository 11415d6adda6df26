use crate::audio::{PlayerEngine, Playlist, Song};
use crate::catalog::Catalog;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

const BANNER: &str = "
    ================================
          WELCOME TO TUNEBOX
    ================================

    Choose an option:
        1. Play/Pause Music
        2. Previous Song
        3. Next Song
        4. Show Song Queue
        5. Add Song
        6. Show Current Song
        7. Delete Song
        8. Play Song at Position
        9. Exit
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    TogglePlayPause,
    Previous,
    Next,
    ShowQueue,
    AddSong,
    ShowCurrent,
    DeleteSong,
    PlayAt,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::TogglePlayPause),
            "2" => Some(MenuChoice::Previous),
            "3" => Some(MenuChoice::Next),
            "4" => Some(MenuChoice::ShowQueue),
            "5" => Some(MenuChoice::AddSong),
            "6" => Some(MenuChoice::ShowCurrent),
            "7" => Some(MenuChoice::DeleteSong),
            "8" => Some(MenuChoice::PlayAt),
            "9" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Blocking text menu over any line source and sink.
///
/// The menu is what keeps the playlist and the catalog in step: it seeds the
/// playlist from the catalog on start, and adds/deletes go to both.
pub struct Menu<'a, E: PlayerEngine, R: BufRead, W: Write> {
    playlist: &'a mut Playlist<E>,
    catalog: &'a mut Catalog,
    input: R,
    output: W,
}

impl<'a, E: PlayerEngine, R: BufRead, W: Write> Menu<'a, E, R, W> {
    pub fn new(playlist: &'a mut Playlist<E>, catalog: &'a mut Catalog, input: R, output: W) -> Self {
        Self {
            playlist,
            catalog,
            input,
            output,
        }
    }

    /// Seed the playlist, then serve choices until exit or end of input
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", BANNER)?;
        self.seed()?;

        loop {
            let Some(line) = self.prompt("Enter your choice (1-9): ")? else {
                debug!("Input closed, leaving menu");
                self.exit()?;
                break;
            };

            let flow = match MenuChoice::parse(&line) {
                Some(choice) => self.handle(choice)?,
                None => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                break;
            }
        }

        Ok(())
    }

    fn seed(&mut self) -> io::Result<()> {
        let songs = self.catalog.fetch_all_songs();
        let count = songs.len();
        for song in songs {
            self.playlist.add_song(song);
        }

        info!("Seeded playlist with {} songs", count);
        writeln!(self.output, "Loaded {} songs.", count)
    }

    fn handle(&mut self, choice: MenuChoice) -> io::Result<Flow> {
        let event = match choice {
            MenuChoice::TogglePlayPause => self.playlist.toggle_play_pause(),
            MenuChoice::Previous => self.playlist.previous_song(),
            MenuChoice::Next => self.playlist.next_song(),
            MenuChoice::ShowQueue => self.playlist.show_queue(),
            MenuChoice::ShowCurrent => self.playlist.show_current_song(),
            MenuChoice::AddSong => return self.add_song(),
            MenuChoice::DeleteSong => return self.delete_song(),
            MenuChoice::PlayAt => return self.play_at(),
            MenuChoice::Exit => {
                self.exit()?;
                return Ok(Flow::Exit);
            }
        };

        writeln!(self.output, "{}", event)?;
        Ok(Flow::Continue)
    }

    fn add_song(&mut self) -> io::Result<Flow> {
        let Some(title) = self.prompt("Enter Song Title: ")? else {
            return self.exit().map(|_| Flow::Exit);
        };
        let Some(duration) = self.prompt("Enter Duration (e.g., 00:00:00): ")? else {
            return self.exit().map(|_| Flow::Exit);
        };
        let Some(file_path) = self.prompt("Enter File Path: ")? else {
            return self.exit().map(|_| Flow::Exit);
        };

        let song = match Song::new(title, duration, file_path) {
            Ok(song) => song,
            Err(e) => {
                writeln!(self.output, "Error adding song: {}", e)?;
                return Ok(Flow::Continue);
            }
        };

        match self.catalog.insert_song(&song) {
            Ok(id) => {
                let event = self.playlist.add_song(song.with_id(id));
                writeln!(self.output, "{}", event)?;
                writeln!(self.output, "Song added to playlist and database (ID {}).", id)?;
            }
            Err(e) => writeln!(self.output, "Error adding song: {}", e)?,
        }

        Ok(Flow::Continue)
    }

    fn delete_song(&mut self) -> io::Result<Flow> {
        let Some(line) = self.prompt("Enter Song ID to delete: ")? else {
            return self.exit().map(|_| Flow::Exit);
        };

        let id: i64 = match line.trim().parse() {
            Ok(id) => id,
            Err(_) => {
                writeln!(self.output, "Error deleting song: '{}' is not a valid ID", line.trim())?;
                return Ok(Flow::Continue);
            }
        };

        let event = self.playlist.delete_song_by_id(id);
        writeln!(self.output, "{}", event)?;

        match self.catalog.delete_song_by_id(id) {
            Ok(0) => writeln!(self.output, "No song with ID {} in the database.", id)?,
            Ok(_) => writeln!(self.output, "Song with ID {} deleted.", id)?,
            Err(e) => writeln!(self.output, "Error deleting song: {}", e)?,
        }

        Ok(Flow::Continue)
    }

    fn play_at(&mut self) -> io::Result<Flow> {
        let Some(line) = self.prompt("Enter position: ")? else {
            return self.exit().map(|_| Flow::Exit);
        };

        match line.trim().parse::<usize>() {
            Ok(position) if position > 0 => {
                let event = self.playlist.play_at(position - 1);
                writeln!(self.output, "{}", event)?;
            }
            _ => writeln!(self.output, "Invalid position: '{}'", line.trim())?,
        }

        Ok(Flow::Continue)
    }

    fn exit(&mut self) -> io::Result<()> {
        writeln!(self.output, "Exiting Music Player...")?;
        self.playlist.stop();
        self.catalog.close();
        Ok(())
    }

    /// None means the input is exhausted
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
