use crate::config::TrackDisplayField;

use super::model::Track;

/// Build a display string for `track` according to the provided `fields` and separator.
///
/// This composes metadata fields (artist, name, album, filename) in the
/// configured order and falls back to the track name when no parts were produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let artist = track.artist.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let name = track.name.trim();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                // "display" is shorthand for "artist - name".
                if let Some(a) = artist {
                    parts.push(a.to_string());
                }
                if !name.is_empty() {
                    parts.push(name.to_string());
                }
            }
            TrackDisplayField::Title => {
                if !name.is_empty() {
                    parts.push(name.to_string());
                }
            }
            TrackDisplayField::Artist => {
                if let Some(a) = artist {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = track.album.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(f) = track.file_name().filter(|s| !s.trim().is_empty()) {
                    parts.push(f.to_string());
                }
            }
        }
    }

    if parts.is_empty() {
        track.name.clone()
    } else {
        parts.join(sep)
    }
}
