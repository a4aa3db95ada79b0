use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Pane};
use crate::backend::{Loader, Payload, Request, RequestKind, Response};
use crate::config;
use crate::player::{AudioOutput, Direction, PlaybackController, PlaybackEvent};
use crate::ui;

/// Everything the event loop owns across iterations.
pub struct EventLoopState<O: AudioOutput> {
    pub app: App,
    pub controller: PlaybackController<O>,
    pub events: Receiver<PlaybackEvent>,
    pub loader: Loader,
    /// Whether a REST backend is configured (Spotify and remote playlists available).
    pub remote: bool,
}

impl<O: AudioOutput> EventLoopState<O> {
    fn notify(&mut self, settings: &config::Settings, message: impl Into<String>) {
        let until = Instant::now() + Duration::from_millis(settings.ui.notice_ms);
        self.app.notify(message, until);
    }

    /// Surface a playback failure without touching the session.
    fn report<E: std::fmt::Display>(&mut self, settings: &config::Settings, result: Result<(), E>) {
        if let Err(e) = result {
            self.notify(settings, e.to_string());
        }
    }

    fn request_library(&mut self, settings: &config::Settings, query: &str) {
        let query = query.trim();
        let query = if query.chars().count() < settings.library.min_search_chars {
            ""
        } else {
            query
        };
        self.loader.request(Request::Library(query.to_string()));
    }

    fn reload(&mut self, settings: &config::Settings) {
        self.loader.request(Request::Playlists);
        let query = self.app.library_query.clone();
        self.request_library(settings, &query);
        if self.remote {
            self.loader.request(Request::SpotifyStatus);
            if self.app.spotify_connected {
                self.loader.request(Request::SpotifyPlaylists);
            }
        }
    }
}

/// Main terminal event loop: drives the controller, collects catalog
/// responses, draws and handles input. Returns `Ok(())` when quit is requested.
pub fn run<O: AudioOutput>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    state: &mut EventLoopState<O>,
) -> Result<(), Box<dyn std::error::Error>> {
    let debounce = Duration::from_millis(settings.backend.search_debounce_ms);

    loop {
        let tick = state.controller.tick();
        state.report(settings, tick);

        while let Ok(ev) = state.events.try_recv() {
            state.app.apply(ev);
        }

        for resp in state.loader.poll() {
            handle_response(resp, settings, state);
        }
        // Responses may have started playback.
        while let Ok(ev) = state.events.try_recv() {
            state.app.apply(ev);
        }
        state.app.sync_position(state.controller.session());

        let now = Instant::now();
        if let Some(q) = state.app.take_due_library_query(now, debounce) {
            state.request_library(settings, &q);
        }

        let progress = state.controller.progress();
        terminal.draw(|f| ui::draw(f, &state.app, settings, progress, now))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_response<O: AudioOutput>(
    resp: Response,
    settings: &config::Settings,
    state: &mut EventLoopState<O>,
) {
    let kind = resp.token.kind();
    let payload = match resp.result {
        Ok(p) => p,
        Err(e) => {
            let what = match kind {
                RequestKind::Playlists => "Failed to load playlists",
                RequestKind::Library => "Search failed",
                RequestKind::SpotifyStatus => "Failed to check Spotify status",
                RequestKind::SpotifySearch => "Spotify search failed",
                RequestKind::PlayPlaylist => "Failed to load playlist",
                RequestKind::CreatePlaylist => "Failed to create playlist",
                RequestKind::SpotifyPlaylists => "Failed to load Spotify playlists",
                RequestKind::ImportSpotifyPlaylist => "Failed to import playlist",
                RequestKind::SpotifyDisconnect => "Failed to disconnect from Spotify",
            };
            state.notify(settings, format!("{what}: {e}"));
            return;
        }
    };

    match payload {
        Payload::Playlists(lists) => state.app.set_playlists(lists),
        Payload::Library(tracks) => state.app.set_library(tracks),
        Payload::SpotifyStatus(connected) => state.app.spotify_connected = connected,
        Payload::SpotifySearch(tracks) => {
            if tracks.is_empty() {
                state.notify(settings, "No results found");
            }
            state.app.set_results(tracks);
        }
        Payload::PlayPlaylist(Some(playlist)) => {
            let r = state.controller.load_playlist_and_play(playlist);
            state.report(settings, r);
        }
        Payload::PlayPlaylist(None) => state.notify(settings, "Playlist not found"),
        Payload::Created(playlist) => {
            if kind == RequestKind::ImportSpotifyPlaylist {
                state.notify(settings, format!("Imported \"{}\"", playlist.name));
                state.app.pane = Pane::Playlists;
            } else {
                state.notify(settings, format!("Created playlist \"{}\"", playlist.name));
            }
            state.loader.request(Request::Playlists);
        }
        Payload::SpotifyPlaylists(lists) => {
            if lists.is_empty() {
                state.notify(settings, "No playlists found");
            }
            state.app.set_spotify_playlists(lists);
        }
        Payload::Disconnected => {
            state.app.spotify_disconnected();
            state.notify(settings, "Disconnected from Spotify");
        }
    }
}

/// Handle one key press. Returns `true` when the app should quit.
fn handle_key_event<O: AudioOutput>(
    key: KeyEvent,
    settings: &config::Settings,
    state: &mut EventLoopState<O>,
) -> bool {
    let now = Instant::now();

    if state.app.new_playlist_name.is_some() {
        match key.code {
            KeyCode::Esc => state.app.cancel_naming(),
            KeyCode::Backspace => state.app.pop_name_char(),
            KeyCode::Enter => {
                if let Some(playlist) = state.app.take_new_playlist() {
                    state.loader.request(Request::CreatePlaylist(playlist));
                }
            }
            KeyCode::Char(c) if !c.is_control() => state.app.push_name_char(c),
            _ => {}
        }
        return false;
    }

    if state.app.input_mode {
        match key.code {
            KeyCode::Esc => {
                state.app.clear_query(now);
                state.app.exit_input_mode();
            }
            KeyCode::Backspace => state.app.pop_query_char(now),
            KeyCode::Enter => submit_query(settings, state, now),
            KeyCode::Char(c) if !c.is_control() => state.app.push_query_char(c, now),
            _ => {}
        }
        return false;
    }

    let audio = &settings.audio;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => state.app.next_pane(),
        KeyCode::Char('j') | KeyCode::Down => state.app.next(),
        KeyCode::Char('k') | KeyCode::Up => state.app.prev(),
        KeyCode::Enter => play_selection(settings, state),
        KeyCode::Char('a') => {
            let all = state.app.library_as_playlist();
            if all.is_empty() {
                state.notify(settings, "Library is empty");
            } else {
                state.loader.invalidate(RequestKind::PlayPlaylist);
                let r = state.controller.load_playlist_and_play(all);
                state.report(settings, r);
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if state.controller.session().current().is_none() {
                state.notify(settings, "Nothing is playing");
            } else {
                state.controller.toggle_play_pause();
            }
        }
        KeyCode::Char('l') => {
            let r = state.controller.advance(Direction::Next);
            state.report(settings, r);
        }
        KeyCode::Char('h') => {
            let r = state.controller.advance(Direction::Previous);
            state.report(settings, r);
        }
        KeyCode::Char('L') => state.controller.seek_relative(audio.seek_step),
        KeyCode::Char('H') => state.controller.seek_relative(-audio.seek_step),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = state.controller.session().volume() + audio.volume_step;
            state.controller.set_volume(v);
        }
        KeyCode::Char('-') => {
            let v = state.controller.session().volume() - audio.volume_step;
            state.controller.set_volume(v);
        }
        KeyCode::Char('/') => state.app.enter_input_mode(),
        KeyCode::Char('n') => {
            if !state.app.start_naming() {
                state.notify(settings, "Nothing to save: pick the library or search results");
            }
        }
        KeyCode::Char('s') => {
            state.app.pane = Pane::SpotifyPlaylists;
            state.loader.request(Request::SpotifyPlaylists);
        }
        KeyCode::Char('D') => {
            state.loader.request(Request::SpotifyDisconnect);
        }
        KeyCode::Char('r') => state.reload(settings),
        _ => {}
    }

    false
}

fn submit_query<O: AudioOutput>(settings: &config::Settings, state: &mut EventLoopState<O>, now: Instant) {
    match state.app.pane {
        Pane::Playlists | Pane::SpotifyPlaylists => state.app.exit_input_mode(),
        Pane::Library => {
            state.app.exit_input_mode();
            // Send right away instead of waiting out the debounce.
            let _ = state.app.take_due_library_query(now, Duration::ZERO);
            let query = state.app.library_query.clone();
            state.request_library(settings, &query);
        }
        Pane::Search => {
            let query = state.app.search_query.trim().to_string();
            if query.is_empty() {
                state.notify(settings, "Please enter a search term");
                return;
            }
            state.app.exit_input_mode();
            if !state.remote {
                state.notify(settings, "Spotify search needs a backend (set backend.base_url)");
                return;
            }
            state.loader.request(Request::SpotifySearch(query));
        }
    }
}

fn play_selection<O: AudioOutput>(settings: &config::Settings, state: &mut EventLoopState<O>) {
    if state.app.pane == Pane::SpotifyPlaylists {
        let Some(id) = state.app.selected_spotify_playlist().and_then(|p| p.id.clone()) else {
            return;
        };
        state.notify(settings, "Importing playlist...");
        state.loader.request(Request::ImportSpotifyPlaylist(id));
        return;
    }

    if state.app.pane == Pane::Playlists {
        let Some(playlist) = state.app.selected_playlist().cloned() else {
            return;
        };
        match (&playlist.id, state.remote) {
            // Fetch a fresh copy; the response starts playback if still wanted.
            (Some(id), true) => {
                state.loader.request(Request::PlayPlaylist(id.clone()));
            }
            _ => {
                state.loader.invalidate(RequestKind::PlayPlaylist);
                let r = state.controller.load_playlist_and_play(playlist);
                state.report(settings, r);
            }
        }
        return;
    }

    let Some(track) = state.app.selected_track().cloned() else {
        return;
    };
    state.loader.invalidate(RequestKind::PlayPlaylist);
    let r = state.controller.play_track(track);
    state.report(settings, r);
}
