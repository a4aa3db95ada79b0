//! Where playlists and tracks come from: the REST backend, or a local
//! directory plus playlists file when no backend is configured. Both are
//! reached through [`Catalog`] on a background [`Loader`].

mod client;
mod loader;
mod local;

pub use client::BackendClient;
pub use loader::{Loader, Payload, Request, RequestKind, Response};
pub use local::LocalCatalog;

use crate::library::{LibraryError, Playlist, Track};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{error}")]
    Api {
        status: u16,
        error: String,
        detail: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error("{0}")]
    Unsupported(&'static str),
}

/// Source of playlists and tracks.
pub trait Catalog {
    fn playlists(&mut self) -> Result<Vec<Playlist>, CatalogError>;
    /// Library listing filtered by file name; an empty query lists everything.
    fn search_library(&mut self, query: &str) -> Result<Vec<Track>, CatalogError>;
    /// Save `playlist` as a new local playlist; returns it with its assigned id.
    fn create_playlist(&mut self, playlist: &Playlist) -> Result<Playlist, CatalogError>;
    fn spotify_status(&mut self) -> Result<bool, CatalogError>;
    fn spotify_search(&mut self, query: &str) -> Result<Vec<Track>, CatalogError>;
    /// The user's Spotify playlists as summaries (no tracks, see `Playlist::track_count`).
    fn spotify_playlists(&mut self) -> Result<Vec<Playlist>, CatalogError>;
    /// One Spotify playlist with its tracks.
    fn spotify_playlist(&mut self, id: &str) -> Result<Playlist, CatalogError>;
    fn spotify_disconnect(&mut self) -> Result<(), CatalogError>;
}

/// Resolve a source URL against the backend. Absolute `http(s)` URLs pass
/// through; relative ones (e.g. `/static/music/a.mp3`) need `base`.
pub fn resolve_url(base: Option<&str>, url: &str) -> Option<String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_string());
    }
    let base = base?.trim_end_matches('/');
    Some(format!("{}/{}", base, url.trim_start_matches('/')))
}
