use crate::config::AudioSettings;
use crate::library::{Playlist, Track};

/// Live playback state owned by the controller.
///
/// Invariants kept by [`super::PlaybackController`]:
/// - `playing` implies `current.is_some()`
/// - `index < playlist.len()` whenever the playlist is non-empty
/// - `volume` is within `0.0..=1.0`
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) current: Option<Track>,
    pub(super) playlist: Playlist,
    pub(super) index: usize,
    pub(super) playing: bool,
    pub(super) volume: f32,
}

impl Session {
    /// A NaN `volume` falls back to the configured default.
    pub fn new(volume: f32) -> Self {
        Self {
            current: None,
            playlist: Playlist::default(),
            index: 0,
            playing: false,
            volume: clamp_volume(volume).unwrap_or(AudioSettings::default().initial_volume),
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// The active playlist; empty while an ad-hoc track plays.
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Position in the active playlist, or `None` when it is empty.
    pub fn index(&self) -> Option<usize> {
        if self.playlist.is_empty() {
            None
        } else {
            Some(self.index)
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

/// Clamp to `0.0..=1.0`; `None` for NaN.
pub(super) fn clamp_volume(v: f32) -> Option<f32> {
    if v.is_nan() { None } else { Some(v.clamp(0.0, 1.0)) }
}
