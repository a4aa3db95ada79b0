use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/encore/config.toml` or `~/.config/encore/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ENCORE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
    pub backend: BackendSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume at startup, 0.0 ..= 1.0.
    pub initial_volume: f32,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
    /// Seek step for `H` / `L`, as a fraction of the track duration.
    pub seek_step: f32,
    /// Timeout for downloading a streamed source (milliseconds).
    pub fetch_timeout_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            initial_volume: 0.8,
            volume_step: 0.05,
            seek_step: 0.05,
            fetch_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which track fields to show in the status "Song:" line, and in what order.
    ///
    /// Example: ["artist", "title", "album"]
    pub now_playing_track_fields: Vec<TrackDisplayField>,

    /// Separator used to join `now_playing_track_fields`.
    pub now_playing_track_separator: String,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["elapsed", "total", "remaining"]
    pub now_playing_time_fields: Vec<TimeField>,

    /// Separator used to join `now_playing_time_fields`.
    pub now_playing_time_separator: String,

    /// How long a notice stays on screen (milliseconds).
    pub notice_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ encore ~ ".to_string(),
            now_playing_track_fields: vec![TrackDisplayField::Display],
            now_playing_track_separator: " - ".to_string(),
            now_playing_time_fields: vec![TimeField::Elapsed, TimeField::Total],
            now_playing_time_separator: " / ".to_string(),
            notice_ms: 3_000,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    Elapsed,
    Total,
    Remaining,
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    /// "artist - title".
    Display,
    #[serde(alias = "name")]
    Title,
    Artist,
    Album,
    Filename,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory to scan when no backend is configured. Defaults to the
    /// first CLI argument, then the working directory.
    pub dir: Option<PathBuf>,
    /// JSON playlists file (same layout as the backend's `playlists.json`).
    pub playlists_file: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,

    /// Which fields to use to build a track's list label and its ordering.
    ///
    /// Example: ["artist", "title"] -> "Artist - Title"
    pub display_fields: Vec<TrackDisplayField>,
    /// Separator used to join `display_fields`.
    pub display_separator: String,
    /// Queries shorter than this list the whole library.
    pub min_search_chars: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dir: None,
            playlists_file: None,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            display_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            display_separator: " - ".to_string(),
            min_search_chars: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL of the music backend, e.g. `http://localhost:5000`.
    /// When unset, playlists and library come from local sources.
    pub base_url: Option<String>,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    /// Quiet period after the last keystroke before a library search is sent.
    pub search_debounce_ms: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 10_000,
            search_debounce_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    /// Log file. Defaults to `encore.log` in the system temp directory.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
