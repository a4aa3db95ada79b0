use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use super::*;
use crate::library::{Playlist, Track, TrackSource};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(TrackSource),
    Play,
    Pause,
    SetPosition(Duration),
    SetVolume(f32),
}

/// Records every call; duration and end-of-stream are scripted by the test.
#[derive(Default)]
struct FakeOutput {
    calls: Vec<Call>,
    duration: Option<Duration>,
    position: Duration,
    ended: bool,
    fail_load: bool,
}

impl AudioOutput for FakeOutput {
    fn load(&mut self, source: &TrackSource) -> Result<(), OutputError> {
        if self.fail_load {
            return Err(OutputError::Decode("scripted failure".into()));
        }
        self.calls.push(Call::Load(source.clone()));
        Ok(())
    }
    fn play(&mut self) {
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }
    fn position(&self) -> Duration {
        self.position
    }
    fn duration(&self) -> Option<Duration> {
        self.duration
    }
    fn set_position(&mut self, position: Duration) {
        self.calls.push(Call::SetPosition(position));
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::SetVolume(volume));
    }
    fn take_ended(&mut self) -> bool {
        std::mem::take(&mut self.ended)
    }
}

fn track(id: &str) -> Track {
    Track {
        id: id.into(),
        name: id.to_uppercase(),
        artist: Some("Artist".into()),
        album: None,
        artwork: None,
        source: Some(TrackSource::File(PathBuf::from(format!("/music/{id}.mp3")))),
        duration: None,
    }
}

fn no_source(id: &str) -> Track {
    Track {
        source: None,
        ..track(id)
    }
}

fn playlist(ids: &[&str]) -> Playlist {
    Playlist::new("Mix", ids.iter().map(|id| track(id)).collect())
}

fn controller() -> (PlaybackController<FakeOutput>, Receiver<PlaybackEvent>) {
    let (tx, rx) = mpsc::channel();
    (PlaybackController::new(FakeOutput::default(), 0.8, tx), rx)
}

/// Controller with its construction-time calls and events cleared.
fn fresh() -> (PlaybackController<FakeOutput>, Receiver<PlaybackEvent>) {
    let (mut c, rx) = controller();
    c.output_mut().calls.clear();
    drain(&rx);
    (c, rx)
}

fn drain(rx: &Receiver<PlaybackEvent>) -> Vec<PlaybackEvent> {
    rx.try_iter().collect()
}

fn current_id(c: &PlaybackController<FakeOutput>) -> Option<String> {
    c.session().current().map(|t| t.id.clone())
}

#[test]
fn new_session_is_empty_and_applies_initial_volume() {
    let (c, _rx) = controller();
    let s = c.session();
    assert!(s.current().is_none());
    assert!(!s.playing);
    assert_eq!(s.index(), None);
    assert_eq!(s.volume(), 0.8);
    assert_eq!(c.output().calls, vec![Call::SetVolume(0.8)]);
}

#[test]
fn nan_initial_volume_uses_default_volume() {
    let (tx, _rx) = mpsc::channel();
    let c = PlaybackController::new(FakeOutput::default(), f32::NAN, tx);
    assert_eq!(c.session().volume(), 0.8);
    assert_eq!(c.output().calls, vec![Call::SetVolume(0.8)]);
}

#[test]
fn load_playlist_plays_first_track() {
    let (mut c, rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b", "c"])).unwrap();

    assert_eq!(c.session().index(), Some(0));
    assert_eq!(current_id(&c).as_deref(), Some("a"));
    assert!(c.session().playing);
    assert_eq!(
        c.output().calls,
        vec![
            Call::Load(TrackSource::File("/music/a.mp3".into())),
            Call::Play
        ]
    );

    let events = drain(&rx);
    assert_eq!(events[0], PlaybackEvent::PlaylistChanged(Some("Mix".into())));
    assert!(matches!(&events[1], PlaybackEvent::TrackChanged(t) if t.id == "a"));
    assert_eq!(events[2], PlaybackEvent::PlayingChanged(true));
}

#[test]
fn load_empty_playlist_is_a_silent_noop() {
    let (mut c, rx) = fresh();
    c.load_playlist_and_play(Playlist::new("Empty", vec![])).unwrap();

    assert!(c.session().current().is_none());
    assert!(!c.session().playing);
    assert!(c.output().calls.is_empty());
    assert!(drain(&rx).is_empty());
}

#[test]
fn next_then_previous_returns_to_start_index() {
    let (mut c, _rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b", "c", "d"])).unwrap();

    for start in 0..4 {
        while c.session().index() != Some(start) {
            c.advance(Direction::Next).unwrap();
        }
        c.advance(Direction::Next).unwrap();
        c.advance(Direction::Previous).unwrap();
        assert_eq!(c.session().index(), Some(start));
    }
}

#[test]
fn advance_wraps_in_both_directions() {
    let (mut c, _rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b", "c"])).unwrap();

    c.advance(Direction::Previous).unwrap();
    assert_eq!(c.session().index(), Some(2));
    assert_eq!(current_id(&c).as_deref(), Some("c"));

    c.advance(Direction::Next).unwrap();
    assert_eq!(c.session().index(), Some(0));
    assert_eq!(current_id(&c).as_deref(), Some("a"));
}

#[test]
fn advance_on_empty_playlist_does_nothing() {
    let (mut c, rx) = fresh();
    c.advance(Direction::Next).unwrap();
    c.advance(Direction::Previous).unwrap();
    assert!(c.output().calls.is_empty());
    assert!(drain(&rx).is_empty());
}

#[test]
fn track_end_on_last_index_wraps_to_first() {
    let (mut c, _rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b", "c"])).unwrap();
    c.advance(Direction::Next).unwrap();
    c.advance(Direction::Next).unwrap();
    assert_eq!(c.session().index(), Some(2));
    c.output_mut().calls.clear();

    c.on_track_ended().unwrap();

    assert_eq!(c.session().index(), Some(0));
    assert_eq!(current_id(&c).as_deref(), Some("a"));
    assert!(c.session().playing);
    assert_eq!(
        c.output().calls,
        vec![
            Call::Load(TrackSource::File("/music/a.mp3".into())),
            Call::Play
        ]
    );
}

#[test]
fn track_end_of_adhoc_track_stops() {
    let (mut c, rx) = fresh();
    c.play_track(track("solo")).unwrap();
    drain(&rx);
    c.output_mut().calls.clear();

    c.on_track_ended().unwrap();

    assert!(!c.session().playing);
    assert_eq!(current_id(&c).as_deref(), Some("solo"));
    assert!(c.output().calls.is_empty());
    assert_eq!(drain(&rx), vec![PlaybackEvent::PlayingChanged(false)]);
}

#[test]
fn tick_forwards_end_of_stream() {
    let (mut c, _rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b"])).unwrap();
    c.output_mut().ended = true;

    c.tick().unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("b"));

    // The notification is edge-triggered.
    c.tick().unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("b"));
}

#[test]
fn tick_records_duration_once_known() {
    let (mut c, rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b"])).unwrap();
    drain(&rx);

    c.tick().unwrap();
    assert!(drain(&rx).is_empty());

    c.output_mut().duration = Some(Duration::from_secs(30));
    c.tick().unwrap();
    c.tick().unwrap();

    assert_eq!(
        drain(&rx),
        vec![PlaybackEvent::DurationKnown(Duration::from_secs(30))]
    );
    assert_eq!(
        c.session().current().unwrap().duration,
        Some(Duration::from_secs(30))
    );
    assert_eq!(
        c.session().playlist().tracks[0].duration,
        Some(Duration::from_secs(30))
    );
}

#[test]
fn volume_is_clamped() {
    let (mut c, rx) = fresh();

    c.set_volume(-0.5);
    assert_eq!(c.session().volume(), 0.0);
    c.set_volume(1.7);
    assert_eq!(c.session().volume(), 1.0);
    c.set_volume(0.25);
    assert_eq!(c.session().volume(), 0.25);

    assert_eq!(
        c.output().calls,
        vec![
            Call::SetVolume(0.0),
            Call::SetVolume(1.0),
            Call::SetVolume(0.25)
        ]
    );
    assert_eq!(
        drain(&rx),
        vec![
            PlaybackEvent::VolumeChanged(0.0),
            PlaybackEvent::VolumeChanged(1.0),
            PlaybackEvent::VolumeChanged(0.25)
        ]
    );
}

#[test]
fn nan_volume_is_ignored() {
    let (mut c, _rx) = fresh();
    c.set_volume(f32::NAN);
    assert_eq!(c.session().volume(), 0.8);
    assert!(c.output().calls.is_empty());
}

#[test]
fn toggle_without_track_makes_no_output_call() {
    let (mut c, rx) = fresh();
    c.toggle_play_pause();
    assert!(!c.session().playing);
    assert!(c.output().calls.is_empty());
    assert!(drain(&rx).is_empty());
}

#[test]
fn toggle_pauses_and_resumes() {
    let (mut c, rx) = fresh();
    c.play_track(track("a")).unwrap();
    c.output_mut().calls.clear();
    drain(&rx);

    c.toggle_play_pause();
    assert!(!c.session().playing);
    c.toggle_play_pause();
    assert!(c.session().playing);

    assert_eq!(c.output().calls, vec![Call::Pause, Call::Play]);
    assert_eq!(
        drain(&rx),
        vec![
            PlaybackEvent::PlayingChanged(false),
            PlaybackEvent::PlayingChanged(true)
        ]
    );
}

#[test]
fn seek_uses_fraction_of_duration() {
    let (mut c, _rx) = fresh();
    c.play_track(track("a")).unwrap();
    c.output_mut().duration = Some(Duration::from_secs(200));
    c.output_mut().calls.clear();

    c.seek(0.5);
    assert_eq!(
        c.output().calls,
        vec![Call::SetPosition(Duration::from_secs(100))]
    );
}

#[test]
fn seek_with_unknown_duration_is_a_noop() {
    let (mut c, _rx) = fresh();
    c.play_track(track("a")).unwrap();
    c.output_mut().calls.clear();

    c.seek(0.5);
    assert!(c.output().calls.is_empty());
}

#[test]
fn seek_without_track_is_a_noop() {
    let (mut c, _rx) = fresh();
    c.output_mut().duration = Some(Duration::from_secs(200));
    c.seek(0.5);
    assert!(c.output().calls.is_empty());
}

#[test]
fn seek_ignores_listed_duration_until_output_knows_length() {
    let (mut c, _rx) = fresh();
    let mut t = track("a");
    t.duration = Some(Duration::from_secs(200));
    c.play_track(t).unwrap();
    c.output_mut().calls.clear();

    c.seek(0.5);
    assert!(c.output().calls.is_empty());
    assert_eq!(c.progress(), (Duration::ZERO, None));

    c.output_mut().duration = Some(Duration::from_secs(30));
    c.seek(0.5);
    assert_eq!(
        c.output().calls,
        vec![Call::SetPosition(Duration::from_secs(15))]
    );
}

#[test]
fn seek_clamps_fraction_and_ignores_nan() {
    let (mut c, _rx) = fresh();
    c.play_track(track("a")).unwrap();
    c.output_mut().duration = Some(Duration::from_secs(60));
    c.output_mut().calls.clear();

    c.seek(2.0);
    c.seek(-1.0);
    c.seek(f32::NAN);
    assert_eq!(
        c.output().calls,
        vec![
            Call::SetPosition(Duration::from_secs(60)),
            Call::SetPosition(Duration::ZERO)
        ]
    );
}

#[test]
fn decoded_duration_replaces_listed_duration() {
    let (mut c, rx) = fresh();
    let mut p = playlist(&["a", "b"]);
    p.tracks[0].duration = Some(Duration::from_secs(200));
    c.load_playlist_and_play(p).unwrap();
    drain(&rx);

    c.output_mut().duration = Some(Duration::from_secs(30));
    c.tick().unwrap();

    assert_eq!(
        drain(&rx),
        vec![PlaybackEvent::DurationKnown(Duration::from_secs(30))]
    );
    assert_eq!(
        c.session().current().unwrap().duration,
        Some(Duration::from_secs(30))
    );
    assert_eq!(
        c.session().playlist().tracks[0].duration,
        Some(Duration::from_secs(30))
    );
}

#[test]
fn seek_relative_steps_from_current_position() {
    let (mut c, _rx) = fresh();
    c.play_track(track("a")).unwrap();
    c.output_mut().duration = Some(Duration::from_secs(100));
    c.output_mut().position = Duration::from_secs(50);
    c.output_mut().calls.clear();

    c.seek_relative(-0.25);
    assert_eq!(
        c.output().calls,
        vec![Call::SetPosition(Duration::from_secs(25))]
    );
}

#[test]
fn track_without_source_is_reported_and_changes_nothing() {
    let (mut c, rx) = fresh();
    c.play_track(track("a")).unwrap();
    c.output_mut().calls.clear();
    drain(&rx);

    let err = c.play_track(no_source("locked")).unwrap_err();

    assert!(matches!(err, PlaybackError::SourceUnavailable(ref name) if name == "LOCKED"));
    assert_eq!(current_id(&c).as_deref(), Some("a"));
    assert!(c.session().playing);
    assert!(c.output().calls.is_empty());
    assert!(drain(&rx).is_empty());
}

#[test]
fn track_without_source_from_empty_session_leaves_it_empty() {
    let (mut c, _rx) = fresh();
    assert!(c.play_track(no_source("locked")).is_err());
    assert!(c.session().current().is_none());
    assert!(!c.session().playing);
}

#[test]
fn output_failure_is_reported_and_keeps_current_track() {
    let (mut c, _rx) = fresh();
    c.play_track(track("solo")).unwrap();
    c.output_mut().fail_load = true;

    let err = c.load_playlist_and_play(playlist(&["a"])).unwrap_err();

    assert!(matches!(err, PlaybackError::Output(_)));
    assert_eq!(current_id(&c).as_deref(), Some("solo"));
    assert!(c.session().playing);
}

#[test]
fn adhoc_track_detaches_playlist() {
    let (mut c, rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b"])).unwrap();
    drain(&rx);

    c.play_track(track("search-hit")).unwrap();

    assert!(c.session().playlist().is_empty());
    assert_eq!(c.session().index(), None);
    assert_eq!(drain(&rx)[0], PlaybackEvent::PlaylistChanged(None));

    // With no playlist, next/previous have nothing to move through.
    c.advance(Direction::Next).unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("search-hit"));
}

#[test]
fn playing_a_playlist_member_moves_the_index() {
    let (mut c, _rx) = fresh();
    c.load_playlist_and_play(playlist(&["a", "b", "c"])).unwrap();

    c.play_track(track("c")).unwrap();
    assert_eq!(c.session().index(), Some(2));
    assert_eq!(c.session().playlist().len(), 3);

    c.advance(Direction::Next).unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("a"));
}

#[test]
fn next_moves_past_unplayable_entry() {
    let (mut c, rx) = fresh();
    let p = Playlist::new("Mixed", vec![track("a"), no_source("b"), track("c")]);
    c.load_playlist_and_play(p).unwrap();
    drain(&rx);
    c.output_mut().calls.clear();

    let err = c.advance(Direction::Next).unwrap_err();
    assert!(matches!(err, PlaybackError::SourceUnavailable(ref name) if name == "B"));
    assert_eq!(c.session().index(), Some(1));
    assert_eq!(current_id(&c).as_deref(), Some("a"));
    assert!(c.session().playing);
    assert!(c.output().calls.is_empty());
    assert!(drain(&rx).is_empty());

    c.advance(Direction::Next).unwrap();
    assert_eq!(c.session().index(), Some(2));
    assert_eq!(current_id(&c).as_deref(), Some("c"));
}

#[test]
fn previous_moves_past_unplayable_entry() {
    let (mut c, _rx) = fresh();
    let p = Playlist::new("Mixed", vec![track("a"), no_source("b"), track("c")]);
    c.load_playlist_and_play(p).unwrap();
    c.advance(Direction::Previous).unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("c"));

    assert!(c.advance(Direction::Previous).is_err());
    c.advance(Direction::Previous).unwrap();
    assert_eq!(c.session().index(), Some(0));
    assert_eq!(current_id(&c).as_deref(), Some("a"));
}

#[test]
fn unplayable_next_track_stops_at_end_of_stream_then_skips() {
    let (mut c, _rx) = fresh();
    let p = Playlist::new("Mixed", vec![track("a"), no_source("b"), track("c")]);
    c.load_playlist_and_play(p).unwrap();

    let err = c.on_track_ended().unwrap_err();
    assert!(matches!(err, PlaybackError::SourceUnavailable(_)));
    assert!(!c.session().playing);
    assert_eq!(c.session().index(), Some(1));
    assert_eq!(current_id(&c).as_deref(), Some("a"));

    c.advance(Direction::Next).unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("c"));
    assert!(c.session().playing);
}

#[test]
fn playlist_with_unplayable_first_entry_still_becomes_active() {
    let (mut c, rx) = fresh();
    c.play_track(track("solo")).unwrap();
    drain(&rx);

    let p = Playlist::new("Mix", vec![no_source("x"), track("y")]);
    let err = c.load_playlist_and_play(p).unwrap_err();

    assert!(matches!(err, PlaybackError::SourceUnavailable(ref name) if name == "X"));
    assert_eq!(c.session().playlist().name, "Mix");
    assert_eq!(c.session().index(), Some(0));
    assert_eq!(current_id(&c).as_deref(), Some("solo"));
    assert!(c.session().playing);
    assert_eq!(
        drain(&rx),
        vec![PlaybackEvent::PlaylistChanged(Some("Mix".into()))]
    );

    c.advance(Direction::Next).unwrap();
    assert_eq!(current_id(&c).as_deref(), Some("y"));
    assert_eq!(c.session().index(), Some(1));
}

#[test]
fn progress_reports_output_position() {
    let (mut c, _rx) = fresh();
    assert_eq!(c.progress(), (Duration::ZERO, None));

    c.play_track(track("a")).unwrap();
    c.output_mut().position = Duration::from_secs(7);
    c.output_mut().duration = Some(Duration::from_secs(30));
    assert_eq!(
        c.progress(),
        (Duration::from_secs(7), Some(Duration::from_secs(30)))
    );
}
