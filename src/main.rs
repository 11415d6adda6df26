// tunebox - small personal music player
// Loads config, opens the catalog and an audio engine, then hands over to the text menu

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tunebox::{
    audio::open_engine,
    catalog::Catalog,
    config::Config,
    logging::init_logging,
    ui::Menu,
    Playlist,
};

#[derive(Parser)]
#[command(name = "tunebox")]
#[command(about = "A small music player with a song catalog and a text menu")]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog database file (overrides the config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Run without audio output
    #[arg(long)]
    no_audio: bool,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    if let Some(database) = args.database {
        config.catalog.path = database;
    }
    if args.no_audio {
        config.player.enabled = false;
    }

    let _log_guard = init_logging(&config.logging.directory, args.dev)?;
    info!("tunebox starting up");

    let mut catalog = Catalog::connect(&config.catalog);
    if !catalog.is_connected() {
        warn!("Running without a catalog");
        eprintln!(
            "Could not open the song catalog at {} - songs will not be saved.",
            config.catalog.path.display()
        );
    }

    let engine = open_engine(&config.player);
    let mut playlist = Playlist::new(config.playlist.name.clone(), engine);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(&mut playlist, &mut catalog, stdin.lock(), stdout.lock()).run()?;

    info!("tunebox shutting down");
    Ok(())
}
