//! The audio output seam.
//!
//! The controller talks to audio hardware only through [`AudioOutput`], so
//! the transport logic can be driven headlessly in tests.

use std::time::Duration;

use crate::library::TrackSource;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("no audio output device: {0}")]
    Device(String),
    #[error("failed to open {}: {}", .path.display(), .source)]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("relative source {0} needs a backend base URL")]
    Unresolved(String),
    #[error("cannot decode audio: {0}")]
    Decode(String),
}

/// A single audio sink. At most one source is loaded at a time; loading a
/// new source fully replaces (and silences) the previous one.
pub trait AudioOutput {
    /// Replace the current source with `source`. The new source starts paused.
    fn load(&mut self, source: &TrackSource) -> Result<(), OutputError>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Current playback position of the loaded source.
    fn position(&self) -> Duration;
    /// Total length of the loaded source; `None` until it is known.
    fn duration(&self) -> Option<Duration>;
    fn set_position(&mut self, position: Duration);
    /// `volume` is already clamped to `0.0..=1.0` by the caller.
    fn set_volume(&mut self, volume: f32);
    /// End-of-stream notification. Returns `true` exactly once per loaded
    /// source, after it has played to the end.
    fn take_ended(&mut self) -> bool;
}
