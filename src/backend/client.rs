use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::library::records::{PlaylistRecord, TrackRecord};
use crate::library::{Playlist, Track};

use super::{Catalog, CatalogError};

#[derive(Deserialize)]
struct PlaylistsBody {
    playlists: Vec<PlaylistRecord>,
}

#[derive(Deserialize)]
struct ResultsBody {
    results: Vec<TrackRecord>,
}

#[derive(Deserialize)]
struct TracksBody {
    tracks: Vec<TrackRecord>,
}

#[derive(Deserialize)]
struct StatusBody {
    connected: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedBody {
    pub(super) playlist: PlaylistRecord,
}

/// `GET /api/spotify/playlists/<id>`: summary plus the tracks, side by side.
#[derive(Deserialize)]
pub(super) struct SpotifyPlaylistBody {
    pub(super) playlist: PlaylistRecord,
    #[serde(default)]
    pub(super) tracks: Vec<TrackRecord>,
}

impl SpotifyPlaylistBody {
    pub(super) fn into_playlist(self) -> Playlist {
        let mut record = self.playlist;
        record.tracks = self.tracks;
        record.tracks_total = None;
        Playlist::from(record)
    }
}

#[derive(Deserialize)]
struct SuccessBody {
    #[serde(default)]
    success: bool,
}

/// Error payload the backend sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a backend response body, turning error payloads into `CatalogError::Api`.
pub(super) fn parse_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, CatalogError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(CatalogError::Decode);
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(e) => Err(CatalogError::Api {
            status,
            error: e.error,
            detail: e.message,
        }),
        Err(_) => Err(CatalogError::Api {
            status,
            error: format!("request failed with status {status}"),
            detail: None,
        }),
    }
}

/// Blocking client for the music backend's REST API.
pub struct BackendClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {url} {query:?}");

        let resp = self.http.get(&url).query(query).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        parse_body(status, &body)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, payload: &B) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("POST {url}");

        let resp = self.http.post(&url).json(payload).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        parse_body(status, &body)
    }
}

impl Catalog for BackendClient {
    fn playlists(&mut self) -> Result<Vec<Playlist>, CatalogError> {
        let body: PlaylistsBody = self.get("/api/playlists", &[])?;
        Ok(body.playlists.into_iter().map(Playlist::from).collect())
    }

    fn search_library(&mut self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let body: ResultsBody = self.get("/api/search", &[("q", query)])?;
        Ok(body.results.into_iter().map(Track::from).collect())
    }

    fn create_playlist(&mut self, playlist: &Playlist) -> Result<Playlist, CatalogError> {
        let mut record = PlaylistRecord::from(playlist);
        // The backend assigns ids.
        record.id = None;
        let body: CreatedBody = self.post("/api/playlists", &record)?;
        Ok(Playlist::from(body.playlist))
    }

    fn spotify_status(&mut self) -> Result<bool, CatalogError> {
        let body: StatusBody = self.get("/api/spotify/status", &[])?;
        Ok(body.connected)
    }

    fn spotify_search(&mut self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let body: TracksBody = self.get("/api/spotify/search", &[("q", query)])?;
        Ok(body.tracks.into_iter().map(Track::from).collect())
    }

    fn spotify_playlists(&mut self) -> Result<Vec<Playlist>, CatalogError> {
        let body: PlaylistsBody = self.get("/api/spotify/playlists", &[])?;
        Ok(body.playlists.into_iter().map(Playlist::from).collect())
    }

    fn spotify_playlist(&mut self, id: &str) -> Result<Playlist, CatalogError> {
        let body: SpotifyPlaylistBody = self.get(&format!("/api/spotify/playlists/{id}"), &[])?;
        Ok(body.into_playlist())
    }

    fn spotify_disconnect(&mut self) -> Result<(), CatalogError> {
        let body: SuccessBody = self.get("/api/spotify/disconnect", &[])?;
        if !body.success {
            log::warn!("backend did not confirm the Spotify disconnect");
        }
        Ok(())
    }
}
