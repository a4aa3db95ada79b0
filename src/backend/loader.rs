//! Background worker that runs catalog requests off the UI thread.
//!
//! Requests are not cancelled when superseded. Instead every request gets a
//! [`RequestToken`]; when responses come back only the one answering the
//! latest request of its kind is handed out, so a slow, older load can never
//! overwrite a newer selection.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::library::{Playlist, Track};

use super::{Catalog, CatalogError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Playlists,
    Library,
    SpotifyStatus,
    SpotifySearch,
    PlayPlaylist,
    CreatePlaylist,
    SpotifyPlaylists,
    ImportSpotifyPlaylist,
    SpotifyDisconnect,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestToken {
    kind: RequestKind,
    seq: u64,
}

impl RequestToken {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Playlists,
    Library(String),
    SpotifyStatus,
    SpotifySearch(String),
    /// Fetch a fresh copy of the playlist with this id, then play it.
    PlayPlaylist(String),
    CreatePlaylist(Playlist),
    SpotifyPlaylists,
    /// Fetch the Spotify playlist with this id and save it as a local playlist.
    ImportSpotifyPlaylist(String),
    SpotifyDisconnect,
}

impl Request {
    fn kind(&self) -> RequestKind {
        match self {
            Request::Playlists => RequestKind::Playlists,
            Request::Library(_) => RequestKind::Library,
            Request::SpotifyStatus => RequestKind::SpotifyStatus,
            Request::SpotifySearch(_) => RequestKind::SpotifySearch,
            Request::PlayPlaylist(_) => RequestKind::PlayPlaylist,
            Request::CreatePlaylist(_) => RequestKind::CreatePlaylist,
            Request::SpotifyPlaylists => RequestKind::SpotifyPlaylists,
            Request::ImportSpotifyPlaylist(_) => RequestKind::ImportSpotifyPlaylist,
            Request::SpotifyDisconnect => RequestKind::SpotifyDisconnect,
        }
    }
}

#[derive(Debug)]
pub enum Payload {
    Playlists(Vec<Playlist>),
    Library(Vec<Track>),
    SpotifyStatus(bool),
    SpotifySearch(Vec<Track>),
    /// `None` when the playlist no longer exists.
    PlayPlaylist(Option<Playlist>),
    /// A playlist saved by `CreatePlaylist` or `ImportSpotifyPlaylist`.
    Created(Playlist),
    SpotifyPlaylists(Vec<Playlist>),
    Disconnected,
}

#[derive(Debug)]
pub struct Response {
    pub token: RequestToken,
    pub result: Result<Payload, CatalogError>,
}

/// Hands out tokens and remembers the latest one per request kind.
#[derive(Debug, Default)]
pub struct Freshness {
    next_seq: u64,
    latest: HashMap<RequestKind, u64>,
}

impl Freshness {
    pub fn issue(&mut self, kind: RequestKind) -> RequestToken {
        self.next_seq += 1;
        self.latest.insert(kind, self.next_seq);
        RequestToken {
            kind,
            seq: self.next_seq,
        }
    }

    /// Mark every outstanding request of `kind` stale without issuing a new one.
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.next_seq += 1;
        self.latest.insert(kind, self.next_seq);
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest.get(&token.kind) == Some(&token.seq)
    }
}

fn execute(catalog: &mut dyn Catalog, request: Request) -> Result<Payload, CatalogError> {
    match request {
        Request::Playlists => catalog.playlists().map(Payload::Playlists),
        Request::Library(q) => catalog.search_library(&q).map(Payload::Library),
        Request::SpotifyStatus => catalog.spotify_status().map(Payload::SpotifyStatus),
        Request::SpotifySearch(q) => catalog.spotify_search(&q).map(Payload::SpotifySearch),
        Request::PlayPlaylist(id) => catalog
            .playlists()
            .map(|all| Payload::PlayPlaylist(all.into_iter().find(|p| p.id.as_deref() == Some(id.as_str())))),
        Request::CreatePlaylist(p) => catalog.create_playlist(&p).map(Payload::Created),
        Request::SpotifyPlaylists => catalog.spotify_playlists().map(Payload::SpotifyPlaylists),
        Request::ImportSpotifyPlaylist(id) => {
            let mut playlist = catalog.spotify_playlist(&id)?;
            if playlist.description.is_none() {
                playlist.description = Some("Imported from Spotify".to_string());
            }
            catalog.create_playlist(&playlist).map(Payload::Created)
        }
        Request::SpotifyDisconnect => catalog.spotify_disconnect().map(|()| Payload::Disconnected),
    }
}

/// Dropping the loader closes the request channel, which ends the worker
/// once its in-flight request (if any) returns.
pub struct Loader {
    tx: Sender<(RequestToken, Request)>,
    rx: Receiver<Response>,
    freshness: Freshness,
}

impl Loader {
    pub fn spawn(mut catalog: Box<dyn Catalog + Send>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<(RequestToken, Request)>();
        let (resp_tx, resp_rx) = mpsc::channel::<Response>();

        thread::spawn(move || {
            while let Ok((token, request)) = req_rx.recv() {
                let result = execute(catalog.as_mut(), request);
                if let Err(e) = &result {
                    log::warn!("{:?} request failed: {e}", token.kind);
                }
                if resp_tx.send(Response { token, result }).is_err() {
                    break;
                }
            }
        });

        Self {
            tx: req_tx,
            rx: resp_rx,
            freshness: Freshness::default(),
        }
    }

    /// Queue `request`; any earlier request of the same kind becomes stale.
    pub fn request(&mut self, request: Request) -> RequestToken {
        let token = self.freshness.issue(request.kind());
        if self.tx.send((token, request)).is_err() {
            log::error!("catalog worker is gone");
        }
        token
    }

    /// Forget about outstanding requests of `kind`; their answers will be dropped.
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.freshness.invalidate(kind);
    }

    /// Collect finished responses, dropping stale ones.
    pub fn poll(&mut self) -> Vec<Response> {
        let mut fresh = Vec::new();
        while let Ok(resp) = self.rx.try_recv() {
            if self.freshness.is_latest(resp.token) {
                fresh.push(resp);
            } else {
                log::debug!("dropping stale {:?} response", resp.token.kind);
            }
        }
        fresh
    }
}
