use std::fs;
use std::path::Path;

use super::LibraryError;
use super::model::Playlist;
use super::records::PlaylistRecord;

/// Load playlists from a JSON file in the backend's `playlists.json` layout
/// (a top-level array of playlist objects).
///
/// A missing file is not an error: it simply yields no playlists.
pub fn load_playlists_file(path: &Path) -> Result<Vec<Playlist>, LibraryError> {
    let records = read_records(path)?;
    Ok(records.into_iter().map(Playlist::from).collect())
}

/// Append `playlist` to the playlists file, creating the file if needed, and
/// return it with its newly assigned id.
pub fn append_playlist(path: &Path, playlist: &Playlist) -> Result<Playlist, LibraryError> {
    let mut records = read_records(path)?;

    let mut record = PlaylistRecord::from(playlist);
    record.id = Some(next_id(&records));
    records.push(record.clone());

    let raw = serde_json::to_string_pretty(&records).map_err(LibraryError::Encode)?;
    fs::write(path, raw).map_err(|source| LibraryError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved playlist {:?} to {}", record.name, path.display());

    Ok(Playlist::from(record))
}

/// One past the highest numeric id, so ids stay unique after removals.
fn next_id(records: &[PlaylistRecord]) -> String {
    let highest = records
        .iter()
        .filter_map(|r| r.id.as_deref()?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (highest.max(records.len() as u64) + 1).to_string()
}

fn read_records(path: &Path) -> Result<Vec<PlaylistRecord>, LibraryError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("playlists file {} not found", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(LibraryError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw).map_err(|source| LibraryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
