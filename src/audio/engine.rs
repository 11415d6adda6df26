// Player engine - the thing that actually makes sound
// The playlist only talks to the trait, so tests and --no-audio runs use the silent engine

use crate::config::PlayerConfig;
use crate::error::Result;
use std::path::Path;
use tracing::{debug, warn};

/// Audio output capability consumed by the playlist.
///
/// `load` prepares a file without starting it; `play` starts or resumes
/// whatever is loaded. Calls are fire-and-forget: nothing here blocks until
/// a track ends.
pub trait PlayerEngine {
    fn load(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

impl<E: PlayerEngine + ?Sized> PlayerEngine for Box<E> {
    fn load(&mut self, path: &Path) -> Result<()> {
        (**self).load(path)
    }

    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<()> {
        (**self).pause()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }
}

/// Engine that accepts every call and produces no sound
#[derive(Debug, Default, Clone)]
pub struct NullEngine;

impl PlayerEngine for NullEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        debug!("NullEngine load: {}", path.display());
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(feature = "audio")]
pub use rodio_engine::RodioEngine;

#[cfg(feature = "audio")]
mod rodio_engine {
    use super::PlayerEngine;
    use crate::config::PlayerConfig;
    use crate::error::{Result, TuneboxError};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;
    use tracing::debug;

    pub struct RodioEngine {
        _stream: OutputStream,
        stream_handle: OutputStreamHandle,
        sink: Option<Sink>,
        volume: f32,
    }

    impl RodioEngine {
        pub fn new(config: &PlayerConfig) -> Result<Self> {
            let (stream, stream_handle) = OutputStream::try_default()
                .map_err(|e| TuneboxError::Playback(format!("No audio output device: {}", e)))?;

            Ok(Self {
                _stream: stream,
                stream_handle,
                sink: None,
                volume: config.volume.clamp(0.0, 1.0),
            })
        }
    }

    impl PlayerEngine for RodioEngine {
        fn load(&mut self, path: &Path) -> Result<()> {
            self.stop()?;

            let file = File::open(path).map_err(|e| {
                TuneboxError::Playback(format!("Failed to open '{}': {}", path.display(), e))
            })?;

            let source = Decoder::new(BufReader::new(file)).map_err(|e| {
                TuneboxError::Playback(format!(
                    "Failed to decode '{}': {}. The file may be corrupted or use an unsupported format.",
                    path.display(),
                    e
                ))
            })?;

            let sink = Sink::try_new(&self.stream_handle)
                .map_err(|e| TuneboxError::Playback(format!("Failed to open sink: {}", e)))?;
            sink.set_volume(self.volume);
            // Loaded tracks wait for play()
            sink.pause();
            sink.append(source);

            debug!("Loaded {}", path.display());
            self.sink = Some(sink);
            Ok(())
        }

        fn play(&mut self) -> Result<()> {
            match self.sink.as_ref() {
                Some(sink) => {
                    sink.play();
                    Ok(())
                }
                None => Err(TuneboxError::Playback("Nothing loaded".to_string())),
            }
        }

        fn pause(&mut self) -> Result<()> {
            if let Some(sink) = self.sink.as_ref() {
                sink.pause();
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            Ok(())
        }
    }
}

/// Pick the engine for this run. Falls back to silence when no device is usable.
pub fn open_engine(config: &PlayerConfig) -> Box<dyn PlayerEngine> {
    if !config.enabled {
        debug!("Audio output disabled, using silent engine");
        return Box::new(NullEngine);
    }

    #[cfg(feature = "audio")]
    {
        match RodioEngine::new(config) {
            Ok(engine) => return Box::new(engine),
            Err(e) => warn!("{} - continuing without sound", e),
        }
    }

    #[cfg(not(feature = "audio"))]
    {
        warn!("Built without the `audio` feature - continuing without sound");
    }

    Box::new(NullEngine)
}
