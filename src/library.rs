//! Track/playlist model plus the local sources of music: a scanned
//! directory, filename search over it, and a JSON playlists file.

use std::path::PathBuf;

mod display;
mod model;
mod playlists;
pub mod records;
mod scan;
mod search;

pub use display::display_from_fields;
pub use model::{Playlist, Track, TrackSource};
pub use playlists::{append_playlist, load_playlists_file};
pub use scan::{LOCAL_ARTIST, scan};
pub use search::search;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid playlists file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode playlists: {0}")]
    Encode(#[source] serde_json::Error),
}
