//! Application model types: `App` and `Pane`.
//!
//! The `App` struct holds what the terminal view shows: the browsable lists,
//! their selections, the query or playlist name being edited and a mirror of
//! the playback session built from controller events.

use std::time::{Duration, Instant};

use crate::library::{Playlist, Track};
use crate::player::{PlaybackEvent, Session};

/// The browsable panes, in `Tab` order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Playlists,
    Library,
    Search,
    SpotifyPlaylists,
}

impl Pane {
    pub const ALL: [Pane; 4] = [
        Pane::Playlists,
        Pane::Library,
        Pane::Search,
        Pane::SpotifyPlaylists,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Pane::Playlists => "playlists",
            Pane::Library => "library",
            Pane::Search => "spotify",
            Pane::SpotifyPlaylists => "spotify playlists",
        }
    }

    fn next(self) -> Self {
        match self {
            Pane::Playlists => Pane::Library,
            Pane::Library => Pane::Search,
            Pane::Search => Pane::SpotifyPlaylists,
            Pane::SpotifyPlaylists => Pane::Playlists,
        }
    }
}

/// The main application model.
#[derive(Debug, Default)]
pub struct App {
    pub pane: Pane,

    pub playlists: Vec<Playlist>,
    pub library: Vec<Track>,
    pub results: Vec<Track>,
    /// Summaries only; importing fetches the tracks.
    pub spotify_playlists: Vec<Playlist>,
    selected: [usize; 4],

    /// Typing goes to the active pane's query instead of being treated as keys.
    pub input_mode: bool,
    pub library_query: String,
    pub search_query: String,
    library_edited_at: Option<Instant>,
    /// Name being typed for a new playlist built from the active pane.
    pub new_playlist_name: Option<String>,

    notice: Option<(String, Instant)>,

    pub now_playing: Option<Track>,
    pub playing: bool,
    pub volume: f32,
    /// Name of the active playlist, `None` for ad-hoc playback.
    pub playlist_name: Option<String>,
    /// `(index, len)` within the active playlist.
    pub position: Option<(usize, usize)>,

    pub spotify_connected: bool,
}

impl App {
    pub fn new(volume: f32) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    fn slot(pane: Pane) -> usize {
        match pane {
            Pane::Playlists => 0,
            Pane::Library => 1,
            Pane::Search => 2,
            Pane::SpotifyPlaylists => 3,
        }
    }

    /// Number of rows in `pane`.
    pub fn len_of(&self, pane: Pane) -> usize {
        match pane {
            Pane::Playlists => self.playlists.len(),
            Pane::Library => self.library.len(),
            Pane::Search => self.results.len(),
            Pane::SpotifyPlaylists => self.spotify_playlists.len(),
        }
    }

    /// Selected row in `pane` (0 when the list is empty).
    pub fn selected_in(&self, pane: Pane) -> usize {
        self.selected[Self::slot(pane)]
    }

    pub fn selected(&self) -> usize {
        self.selected_in(self.pane)
    }

    fn set_selected(&mut self, pane: Pane, idx: usize) {
        self.selected[Self::slot(pane)] = idx;
    }

    /// Keep the selection of `pane` inside its list after the list changed.
    fn clamp_selection(&mut self, pane: Pane) {
        let len = self.len_of(pane);
        let sel = self.selected_in(pane);
        self.set_selected(pane, if len == 0 { 0 } else { sel.min(len - 1) });
    }

    /// Cycle `Playlists -> Library -> Search -> SpotifyPlaylists`. Leaves input mode.
    pub fn next_pane(&mut self) {
        self.input_mode = false;
        self.pane = self.pane.next();
    }

    /// Move selection to the next row, wrapping to the first.
    pub fn next(&mut self) {
        let len = self.len_of(self.pane);
        if len > 0 {
            self.set_selected(self.pane, (self.selected() + 1) % len);
        }
    }

    /// Move selection to the previous row, wrapping to the last.
    pub fn prev(&mut self) {
        let len = self.len_of(self.pane);
        if len > 0 {
            self.set_selected(self.pane, (self.selected() + len - 1) % len);
        }
    }

    pub fn set_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;
        self.clamp_selection(Pane::Playlists);
    }

    pub fn set_library(&mut self, tracks: Vec<Track>) {
        self.library = tracks;
        self.clamp_selection(Pane::Library);
    }

    pub fn set_results(&mut self, tracks: Vec<Track>) {
        self.results = tracks;
        self.set_selected(Pane::Search, 0);
    }

    pub fn set_spotify_playlists(&mut self, playlists: Vec<Playlist>) {
        self.spotify_playlists = playlists;
        self.clamp_selection(Pane::SpotifyPlaylists);
    }

    /// Forget everything that came from the Spotify account.
    pub fn spotify_disconnected(&mut self) {
        self.spotify_connected = false;
        self.set_spotify_playlists(Vec::new());
    }

    pub fn selected_playlist(&self) -> Option<&Playlist> {
        self.playlists.get(self.selected_in(Pane::Playlists))
    }

    pub fn selected_spotify_playlist(&self) -> Option<&Playlist> {
        self.spotify_playlists
            .get(self.selected_in(Pane::SpotifyPlaylists))
    }

    /// Tracks listed in the active pane, if it lists tracks.
    fn pane_tracks(&self) -> Option<&[Track]> {
        match self.pane {
            Pane::Library => Some(&self.library),
            Pane::Search => Some(&self.results),
            Pane::Playlists | Pane::SpotifyPlaylists => None,
        }
    }

    /// The highlighted track in the Library or Search pane.
    pub fn selected_track(&self) -> Option<&Track> {
        self.pane_tracks()?.get(self.selected())
    }

    /// The current library listing as an unnamed playlist, for "play all".
    pub fn library_as_playlist(&self) -> Playlist {
        Playlist::new("Library", self.library.clone())
    }

    /// Start editing the active pane's query. Only track panes have one.
    pub fn enter_input_mode(&mut self) {
        if self.pane_tracks().is_some() {
            self.input_mode = true;
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = false;
    }

    /// The query belonging to the active pane.
    pub fn query(&self) -> &str {
        match self.pane {
            Pane::Search => &self.search_query,
            _ => &self.library_query,
        }
    }

    fn query_mut(&mut self) -> Option<&mut String> {
        match self.pane {
            Pane::Library => Some(&mut self.library_query),
            Pane::Search => Some(&mut self.search_query),
            Pane::Playlists | Pane::SpotifyPlaylists => None,
        }
    }

    /// Append a character to the active query. Library edits are debounced.
    pub fn push_query_char(&mut self, c: char, now: Instant) {
        if let Some(q) = self.query_mut() {
            q.push(c);
            self.touch_library(now);
        }
    }

    /// Remove the last character from the active query.
    pub fn pop_query_char(&mut self, now: Instant) {
        if let Some(q) = self.query_mut() {
            q.pop();
            self.touch_library(now);
        }
    }

    /// Clear the active query.
    pub fn clear_query(&mut self, now: Instant) {
        if let Some(q) = self.query_mut() {
            q.clear();
            self.touch_library(now);
        }
    }

    fn touch_library(&mut self, now: Instant) {
        if self.pane == Pane::Library {
            self.library_edited_at = Some(now);
        }
    }

    /// Return the library query once it has been left alone for `debounce`,
    /// at most once per burst of edits.
    pub fn take_due_library_query(&mut self, now: Instant, debounce: Duration) -> Option<String> {
        let edited = self.library_edited_at?;
        if now.saturating_duration_since(edited) < debounce {
            return None;
        }
        self.library_edited_at = None;
        Some(self.library_query.clone())
    }

    /// Start naming a new playlist made of the active pane's tracks. Returns
    /// `false` when the pane lists no tracks.
    pub fn start_naming(&mut self) -> bool {
        if self.pane_tracks().is_none_or(|t| t.is_empty()) {
            return false;
        }
        self.input_mode = false;
        self.new_playlist_name = Some(String::new());
        true
    }

    pub fn push_name_char(&mut self, c: char) {
        if let Some(name) = self.new_playlist_name.as_mut() {
            name.push(c);
        }
    }

    pub fn pop_name_char(&mut self) {
        if let Some(name) = self.new_playlist_name.as_mut() {
            name.pop();
        }
    }

    pub fn cancel_naming(&mut self) {
        self.new_playlist_name = None;
    }

    /// Finish naming: the new playlist holds a copy of the active pane's
    /// tracks. A blank name becomes "New Playlist".
    pub fn take_new_playlist(&mut self) -> Option<Playlist> {
        let name = self.new_playlist_name.take()?;
        let tracks = self.pane_tracks()?.to_vec();
        let name = match name.trim() {
            "" => "New Playlist".to_string(),
            trimmed => trimmed.to_string(),
        };
        Some(Playlist::new(name, tracks))
    }

    /// Show `message` in the footer until `until`.
    pub fn notify(&mut self, message: impl Into<String>, until: Instant) {
        self.notice = Some((message.into(), until));
    }

    /// The current notice, if it has not expired.
    pub fn notice(&self, now: Instant) -> Option<&str> {
        match &self.notice {
            Some((msg, until)) if now < *until => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Mirror a controller event into the view state.
    pub fn apply(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::TrackChanged(track) => self.now_playing = Some(track),
            PlaybackEvent::PlayingChanged(playing) => self.playing = playing,
            PlaybackEvent::VolumeChanged(volume) => self.volume = volume,
            PlaybackEvent::DurationKnown(d) => {
                if let Some(t) = self.now_playing.as_mut() {
                    t.duration = Some(d);
                }
            }
            PlaybackEvent::PlaylistChanged(name) => self.playlist_name = name,
        }
    }

    /// Copy the playlist position, which has no event of its own.
    pub fn sync_position(&mut self, session: &Session) {
        self.position = session.index().map(|i| (i, session.playlist().len()));
    }
}
