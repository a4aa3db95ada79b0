//! JSON shapes shared by the playlists file and the backend REST API.
//!
//! Field names follow the backend (`preview_url`, `image`, `duration` in
//! whole seconds). Conversion to and from the playback model happens here so
//! the rest of the crate never sees wire types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::model::{Playlist, Track, TrackSource};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    /// Local files served by the backend carry `url` instead of `preview_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Scanned local files saved into a playlist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaylistRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Spotify playlist summaries list a count instead of the tracks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks_total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub tracks: Vec<TrackRecord>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Strip the final extension, e.g. `song.mp3` -> `song`.
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    }
}

impl From<TrackRecord> for Track {
    fn from(r: TrackRecord) -> Self {
        let source = non_empty(r.preview_url)
            .or_else(|| non_empty(r.url))
            .map(TrackSource::Url)
            .or_else(|| r.path.map(TrackSource::File));
        let filename = non_empty(r.filename);

        let name = non_empty(r.name)
            .or_else(|| filename.as_deref().map(|f| strip_extension(f).to_string()))
            .unwrap_or_else(|| "Unknown".to_string());

        // Local uploads have no artist; label them like scanned local files.
        let artist = non_empty(r.artist).or_else(|| {
            filename
                .as_ref()
                .map(|_| super::LOCAL_ARTIST.to_string())
        });

        let id = non_empty(r.id)
            .or_else(|| filename.clone())
            .unwrap_or_else(|| name.clone());

        Track {
            id,
            name,
            artist,
            album: non_empty(r.album),
            artwork: non_empty(r.image),
            source,
            duration: r.duration.filter(|&d| d > 0).map(Duration::from_secs),
        }
    }
}

impl From<PlaylistRecord> for Playlist {
    fn from(r: PlaylistRecord) -> Self {
        Playlist {
            id: non_empty(r.id),
            name: r.name,
            description: non_empty(r.description),
            artwork: non_empty(r.image),
            track_count: r.tracks_total,
            owner: non_empty(r.owner),
            tracks: r.tracks.into_iter().map(Track::from).collect(),
        }
    }
}

impl From<&Track> for TrackRecord {
    fn from(t: &Track) -> Self {
        let (preview_url, path) = match &t.source {
            Some(TrackSource::Url(url)) => (Some(url.clone()), None),
            Some(TrackSource::File(path)) => (None, Some(path.clone())),
            None => (None, None),
        };
        let filename = path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string);
        TrackRecord {
            id: Some(t.id.clone()),
            name: Some(t.name.clone()),
            artist: t.artist.clone(),
            album: t.album.clone(),
            duration: t.duration.map(|d| d.as_secs()).filter(|&d| d > 0),
            preview_url,
            url: None,
            filename,
            path,
            image: t.artwork.clone(),
        }
    }
}

impl From<&Playlist> for PlaylistRecord {
    fn from(p: &Playlist) -> Self {
        PlaylistRecord {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            image: p.artwork.clone(),
            tracks_total: None,
            owner: None,
            tracks: p.tracks.iter().map(TrackRecord::from).collect(),
        }
    }
}
