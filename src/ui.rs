//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It only
//! reads the `App` model; nothing here touches playback.

use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Pane};
use crate::config::{Settings, TimeField, UiSettings};
use crate::library::{Playlist, display_from_fields};

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step: f32) -> String {
    let seek = format!("seek -/+{}%", (seek_step * 100.0).round());
    [
        ("tab", "pane"),
        ("j/k", "up/down"),
        ("enter", "play"),
        ("a", "play library"),
        ("space/p", "play/pause"),
        ("h/l", "prev/next"),
        ("H/L", seek.as_str()),
        ("+/-", "volume"),
        ("/", "search"),
        ("n", "save as playlist"),
        ("s", "spotify playlists"),
        ("D", "disconnect spotify"),
        ("r", "reload"),
        ("q", "quit"),
    ]
    .iter()
    .map(|(k, v)| format!("[{k}] {v}"))
    .collect::<Vec<String>>()
    .join(" | ")
}

/// Format a `Duration` as `m:ss`.
fn format_mss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
/// An unknown total renders as `0:00`.
fn now_playing_time_text(elapsed: Duration, total: Option<Duration>, ui: &UiSettings) -> Option<String> {
    let total = total.unwrap_or(Duration::ZERO);
    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .map(|f| match f {
            TimeField::Elapsed => format_mss(elapsed),
            TimeField::Total => format_mss(total),
            TimeField::Remaining => format!("-{}", format_mss(total.saturating_sub(elapsed))),
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn status_text(app: &App, progress: (Duration, Option<Duration>), ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    match &app.now_playing {
        Some(track) => {
            let song = display_from_fields(
                track,
                &ui.now_playing_track_fields,
                &ui.now_playing_track_separator,
            );
            match now_playing_time_text(progress.0, progress.1, ui) {
                Some(time) => parts.push(format!(" Song: {song} [{time}]")),
                None => parts.push(format!(" Song: {song}")),
            }
            parts.push(if app.playing { "Playing" } else { "Paused" }.to_string());
        }
        None => parts.push(" Stopped".to_string()),
    }

    if let Some(name) = &app.playlist_name {
        match app.position {
            Some((i, len)) => parts.push(format!("Playlist: {name} ({}/{len})", i + 1)),
            None => parts.push(format!("Playlist: {name}")),
        }
    }
    parts.push(format!("Volume: {}%", (app.volume * 100.0).round()));

    parts.join(" • ")
}

/// Tab strip for the list block title, highlighting the active pane.
fn pane_tabs(app: &App) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for pane in Pane::ALL {
        let label = format!("{} ({})", pane.title(), app.len_of(pane));
        if pane == app.pane {
            spans.push(Span::styled(label, Style::default().add_modifier(Modifier::REVERSED)));
        } else {
            spans.push(Span::raw(label));
        }
        spans.push(Span::raw(" "));
    }

    if let Some(name) = &app.new_playlist_name {
        spans.push(Span::raw(format!("new playlist: {name}_ ")));
    } else if matches!(app.pane, Pane::Library | Pane::Search)
        && (app.input_mode || !app.query().is_empty())
    {
        let cursor = if app.input_mode { "_" } else { "" };
        spans.push(Span::raw(format!("/{}{} ", app.query(), cursor)));
    }
    Line::from(spans)
}

fn playlist_label(p: &Playlist) -> String {
    match &p.owner {
        Some(owner) => format!("{} ({} tracks, by {owner})", p.name, p.display_len()),
        None => format!("{} ({} tracks)", p.name, p.display_len()),
    }
}

fn row_labels(app: &App, settings: &Settings) -> Vec<String> {
    let lib = &settings.library;
    let track_label = |t: &crate::library::Track| {
        let label = display_from_fields(t, &lib.display_fields, &lib.display_separator);
        if t.source.is_none() {
            format!("{label} (no preview)")
        } else {
            label
        }
    };

    match app.pane {
        Pane::Playlists => app.playlists.iter().map(playlist_label).collect(),
        Pane::Library => app.library.iter().map(track_label).collect(),
        Pane::Search => app.results.iter().map(track_label).collect(),
        Pane::SpotifyPlaylists => app.spotify_playlists.iter().map(playlist_label).collect(),
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    settings: &Settings,
    progress: (Duration, Option<Duration>),
    now: Instant,
) {
    let ui = &settings.ui;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let spotify = if app.spotify_connected {
        "Spotify: connected"
    } else {
        "Spotify: not connected"
    };
    let header = Paragraph::new(format!("{} • {}", ui.header_text, spotify))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app, progress, ui))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list. Only build ListItems for the visible window, centered on the
    // selection when possible.
    {
        let labels = row_labels(app, settings);
        let total = labels.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.selected().min(total.saturating_sub(1));
        let (start, end) = if total <= list_height || list_height == 0 {
            (0, total)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height)
        };

        let visible_items: Vec<ListItem> = labels[start..end]
            .iter()
            .map(|l| ListItem::new(l.as_str()))
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(pane_tabs(app)))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(sel_pos - start));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Footer: a live notice replaces the controls help.
    let footer = match app.notice(now) {
        Some(msg) => Paragraph::new(msg.to_string()).bold(),
        None => Paragraph::new(controls_text(settings.audio.seek_step)),
    };
    let footer = footer
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
