use std::path::PathBuf;
use std::time::Duration;

/// Where the audio for a track comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// A streamable URL (Spotify preview clip or a file served by the backend).
    /// Relative URLs are resolved against the configured backend base URL.
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Stable identity: backend/Spotify id, or the file path for local files.
    pub id: String,
    pub name: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Artwork URL, if the source provided one.
    pub artwork: Option<String>,
    /// `None` means the track cannot be played (e.g. Spotify without a preview).
    pub source: Option<TrackSource>,
    /// Filled in lazily once the audio output reports it.
    pub duration: Option<Duration>,
}

impl Track {
    /// File name of a local or URL-backed source, used by library search.
    pub fn file_name(&self) -> Option<&str> {
        match self.source.as_ref()? {
            TrackSource::File(path) => path.file_name().and_then(|s| s.to_str()),
            TrackSource::Url(url) => url.rsplit('/').next().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Playlist {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub artwork: Option<String>,
    /// Listed size when only a summary was fetched (`tracks` is then empty).
    pub track_count: Option<usize>,
    pub owner: Option<String>,
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Number of tracks to show in listings: the listed size of a summary,
    /// otherwise the tracks held.
    pub fn display_len(&self) -> usize {
        self.track_count.unwrap_or(self.tracks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
