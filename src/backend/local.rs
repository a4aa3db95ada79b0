use std::path::PathBuf;

use crate::config::LibrarySettings;
use crate::library::{self, Playlist, Track};

use super::{Catalog, CatalogError};

const NO_SPOTIFY: &str = "Spotify needs a backend (set backend.base_url)";

/// Catalog backed by a music directory and an optional playlists file.
///
/// The directory is rescanned on every library request, the same way the
/// backend lists its music folder per search.
pub struct LocalCatalog {
    dir: PathBuf,
    settings: LibrarySettings,
}

impl LocalCatalog {
    pub fn new(dir: PathBuf, settings: LibrarySettings) -> Self {
        Self { dir, settings }
    }
}

impl Catalog for LocalCatalog {
    fn playlists(&mut self) -> Result<Vec<Playlist>, CatalogError> {
        match &self.settings.playlists_file {
            Some(path) => Ok(library::load_playlists_file(path)?),
            None => Ok(Vec::new()),
        }
    }

    fn search_library(&mut self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let mut tracks = library::scan(&self.dir, &self.settings);
        let keep = library::search(&tracks, query, self.settings.min_search_chars);
        if keep.len() == tracks.len() {
            return Ok(tracks);
        }

        let mut i = 0;
        tracks.retain(|_| {
            let k = keep.binary_search(&i).is_ok();
            i += 1;
            k
        });
        Ok(tracks)
    }

    fn create_playlist(&mut self, playlist: &Playlist) -> Result<Playlist, CatalogError> {
        match &self.settings.playlists_file {
            Some(path) => Ok(library::append_playlist(path, playlist)?),
            None => Err(CatalogError::Unsupported(
                "Saving playlists needs a playlists file (set library.playlists_file)",
            )),
        }
    }

    fn spotify_status(&mut self) -> Result<bool, CatalogError> {
        Ok(false)
    }

    fn spotify_search(&mut self, _query: &str) -> Result<Vec<Track>, CatalogError> {
        Err(CatalogError::Unsupported(NO_SPOTIFY))
    }

    fn spotify_playlists(&mut self) -> Result<Vec<Playlist>, CatalogError> {
        Err(CatalogError::Unsupported(NO_SPOTIFY))
    }

    fn spotify_playlist(&mut self, _id: &str) -> Result<Playlist, CatalogError> {
        Err(CatalogError::Unsupported(NO_SPOTIFY))
    }

    fn spotify_disconnect(&mut self) -> Result<(), CatalogError> {
        Err(CatalogError::Unsupported(NO_SPOTIFY))
    }
}
