use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::backend::{BackendClient, Catalog, CatalogError, LocalCatalog, Loader, Request};
use crate::config::Settings;

/// Music directory for the local catalog: `library.dir`, then the first CLI
/// argument, then the working directory.
pub fn library_dir(settings: &Settings) -> PathBuf {
    settings
        .library
        .dir
        .clone()
        .or_else(|| env::args().nth(1).map(PathBuf::from))
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Pick the catalog: the REST backend when `backend.base_url` is set,
/// otherwise the local directory and playlists file.
pub fn build_catalog(settings: &Settings) -> Result<Box<dyn Catalog + Send>, CatalogError> {
    match &settings.backend.base_url {
        Some(base) => {
            log::info!("using backend at {base}");
            let timeout = Duration::from_millis(settings.backend.timeout_ms);
            Ok(Box::new(BackendClient::new(base, timeout)?))
        }
        None => {
            let dir = library_dir(settings);
            log::info!("using local library at {}", dir.display());
            Ok(Box::new(LocalCatalog::new(dir, settings.library.clone())))
        }
    }
}

/// Queue the loads the first frame needs.
pub fn request_initial(loader: &mut Loader, remote: bool) {
    loader.request(Request::Playlists);
    loader.request(Request::Library(String::new()));
    if remote {
        loader.request(Request::SpotifyStatus);
    }
}
