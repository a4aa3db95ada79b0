use std::sync::mpsc::Sender;
use std::time::Duration;

use log::{debug, info, warn};

use crate::library::{Playlist, Track};

use super::output::{AudioOutput, OutputError};
use super::session::{Session, clamp_volume};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// State changes published to the view. The controller never renders.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A new track became current (it is already playing).
    TrackChanged(Track),
    PlayingChanged(bool),
    VolumeChanged(f32),
    /// The output reported the current track's length.
    DurationKnown(Duration),
    /// The active playlist was replaced; `None` means an ad-hoc track detached it.
    PlaylistChanged(Option<String>),
}

/// Reported conditions. None of them are fatal: the current track and the
/// playing flag stay as they were.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Preview not available for \"{0}\"")]
    SourceUnavailable(String),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Owns the session and the single audio output; every transport action goes
/// through here.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    session: Session,
    events: Sender<PlaybackEvent>,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub fn new(mut output: O, volume: f32, events: Sender<PlaybackEvent>) -> Self {
        let session = Session::new(volume);
        output.set_volume(session.volume);
        Self {
            output,
            session,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(super) fn output(&self) -> &O {
        &self.output
    }

    #[cfg(test)]
    pub(super) fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Elapsed time and total length of the current track.
    pub fn progress(&self) -> (Duration, Option<Duration>) {
        match self.session.current.as_ref() {
            Some(_) => (self.output.position(), self.output.duration()),
            None => (Duration::ZERO, None),
        }
    }

    /// Make `playlist` active and play its first track. Empty playlists are
    /// ignored. The playlist stays active even when its first track cannot be
    /// played, so next/previous can move past it.
    pub fn load_playlist_and_play(&mut self, playlist: Playlist) -> Result<(), PlaybackError> {
        let Some(first) = playlist.tracks.first().cloned() else {
            debug!("playlist {:?} is empty, nothing to play", playlist.name);
            return Ok(());
        };

        info!("loading playlist {:?} ({} tracks)", playlist.name, playlist.len());
        let name = playlist.name.clone();
        self.session.playlist = playlist;
        self.session.index = 0;
        self.emit(PlaybackEvent::PlaylistChanged(Some(name)));

        self.start(&first)?;
        self.make_current(first);
        Ok(())
    }

    /// Play `track`. If it belongs to the active playlist the index follows it;
    /// otherwise the playlist is detached and the track plays on its own.
    pub fn play_track(&mut self, track: Track) -> Result<(), PlaybackError> {
        self.start(&track)?;

        match self.session.playlist.tracks.iter().position(|t| t.id == track.id) {
            Some(i) => self.session.index = i,
            None if !self.session.playlist.is_empty() => {
                debug!("{:?} is not in the active playlist, detaching", track.name);
                self.session.playlist = Playlist::default();
                self.session.index = 0;
                self.emit(PlaybackEvent::PlaylistChanged(None));
            }
            None => {}
        }

        self.make_current(track);
        Ok(())
    }

    pub fn toggle_play_pause(&mut self) {
        if self.session.current.is_none() {
            return;
        }

        if self.session.playing {
            self.output.pause();
        } else {
            self.output.play();
        }
        self.session.playing = !self.session.playing;
        self.emit(PlaybackEvent::PlayingChanged(self.session.playing));
    }

    /// Move through the active playlist, wrapping at both ends. The index moves
    /// even when the target entry cannot be played; the previous track keeps
    /// playing and the error is returned.
    pub fn advance(&mut self, direction: Direction) -> Result<(), PlaybackError> {
        let len = self.session.playlist.len();
        if len == 0 {
            return Ok(());
        }

        let delta = match direction {
            Direction::Next => 1,
            Direction::Previous => len - 1,
        };
        let index = (self.session.index + delta) % len;
        let track = self.session.playlist.tracks[index].clone();
        self.session.index = index;

        self.start(&track)?;
        self.make_current(track);
        Ok(())
    }

    /// End-of-stream handling: continue with the next playlist entry (wrapping
    /// from the last back to the first), or stop after an ad-hoc track.
    pub fn on_track_ended(&mut self) -> Result<(), PlaybackError> {
        if self.session.playlist.is_empty() {
            self.set_playing(false);
            return Ok(());
        }

        self.advance(Direction::Next).inspect_err(|_| {
            // The old stream is over either way.
            self.set_playing(false);
        })
    }

    /// Jump to `fraction` (0.0..=1.0) of the current track's length.
    pub fn seek(&mut self, fraction: f32) {
        if !fraction.is_finite() || self.session.current.is_none() {
            return;
        }
        // Only the decoded length counts; listed metadata may not match the file.
        let Some(total) = self.output.duration() else {
            debug!("seek ignored, duration unknown");
            return;
        };

        let target = total.mul_f64(f64::from(fraction.clamp(0.0, 1.0)));
        self.output.set_position(target);
    }

    /// Seek by `delta` (a fraction of the duration) relative to the current position.
    pub fn seek_relative(&mut self, delta: f32) {
        let (elapsed, Some(total)) = self.progress() else {
            return;
        };
        if total.is_zero() {
            return;
        }
        let at = elapsed.as_secs_f64() / total.as_secs_f64();
        self.seek((at + f64::from(delta)) as f32);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let Some(volume) = clamp_volume(volume) else {
            return;
        };
        self.output.set_volume(volume);
        if volume != self.session.volume {
            self.session.volume = volume;
            self.emit(PlaybackEvent::VolumeChanged(volume));
        }
    }

    /// Poll the output: record a newly known duration and handle end-of-stream.
    pub fn tick(&mut self) -> Result<(), PlaybackError> {
        self.sync_duration();
        if self.output.take_ended() {
            debug!("track ended");
            self.on_track_ended()?;
        }
        Ok(())
    }

    fn sync_duration(&mut self) {
        let Some(d) = self.output.duration() else {
            return;
        };
        let Some(current) = self.session.current.as_mut() else {
            return;
        };
        if current.duration == Some(d) {
            return;
        }

        current.duration = Some(d);
        let id = current.id.clone();
        if let Some(entry) = self.session.playlist.tracks.get_mut(self.session.index) {
            if entry.id == id {
                entry.duration = Some(d);
            }
        }
        self.emit(PlaybackEvent::DurationKnown(d));
    }

    /// Replace whatever the output holds with `track` and start it. Touches no
    /// session state.
    fn start(&mut self, track: &Track) -> Result<(), PlaybackError> {
        let Some(source) = track.source.as_ref() else {
            warn!("no playable source for {:?}", track.name);
            return Err(PlaybackError::SourceUnavailable(track.name.clone()));
        };

        self.output.load(source).inspect_err(|e| warn!("{e}"))?;
        self.output.play();
        Ok(())
    }

    fn make_current(&mut self, track: Track) {
        info!("now playing {:?}", track.name);
        self.session.current = Some(track.clone());
        self.emit(PlaybackEvent::TrackChanged(track));
        self.set_playing(true);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.session.playing != playing {
            self.session.playing = playing;
            self.emit(PlaybackEvent::PlayingChanged(playing));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // The view may already be gone during shutdown.
        let _ = self.events.send(event);
    }
}
