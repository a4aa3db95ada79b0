use std::path::Path;
use std::time::Duration;

use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_from_fields;
use super::model::{Track, TrackSource};

/// Artist shown for local files without an artist tag.
pub const LOCAL_ARTIST: &str = "Local";

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Read a single audio file into a `Track`, using tags when lofty can parse them.
pub fn read_track(path: &Path) -> Track {
    let mut name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist: Option<String> = None;
    let mut album: Option<String> = None;
    let mut duration: Option<Duration> = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            let d = tagged.properties().duration();
            if !d.is_zero() {
                duration = Some(d);
            }

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                    if !v.trim().is_empty() {
                        name = v.trim().to_string();
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                    let v = v.trim();
                    if !v.is_empty() {
                        artist = Some(v.to_string());
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                    let v = v.trim();
                    if !v.is_empty() {
                        album = Some(v.to_string());
                    }
                }
            }
        }
        Err(e) => log::debug!("no tags for {}: {e}", path.display()),
    }

    Track {
        id: path.display().to_string(),
        name,
        artist: artist.or_else(|| Some(LOCAL_ARTIST.to_string())),
        album,
        artwork: None,
        source: Some(TrackSource::File(path.to_path_buf())),
        duration,
    }
}

pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut keyed: Vec<(String, Track)> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let track = read_track(path);
            let key = display_from_fields(&track, &settings.display_fields, &settings.display_separator)
                .to_lowercase();
            keyed.push((key, track));
        }
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    log::info!("scanned {} tracks under {}", keyed.len(), dir.display());
    keyed.into_iter().map(|(_, t)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackDisplayField;
    use std::fs;
    use tempfile::tempdir;

    fn names(tracks: &[Track]) -> Vec<String> {
        tracks.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn untagged_file_falls_back_to_stem_and_local_artist() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("Night Drive.mp3");
        fs::write(&p, b"not a real mp3").unwrap();

        let t = read_track(&p);
        assert_eq!(t.name, "Night Drive");
        assert_eq!(t.artist.as_deref(), Some(LOCAL_ARTIST));
        assert_eq!(t.source, Some(TrackSource::File(p.clone())));
        assert_eq!(t.id, p.display().to_string());
        assert_eq!(t.duration, None);
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let settings = LibrarySettings {
            display_fields: vec![TrackDisplayField::Title],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(names(&tracks), vec!["A", "b"]);
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(names(&tracks), vec!["visible"]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(names(&tracks), vec!["root"]);
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth: root = 0, children = 1, grandchildren = 2.
        let settings = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        let found = names(&scan(dir.path(), &settings));
        assert!(found.contains(&"root".to_string()));
        assert!(found.contains(&"one".to_string()));
        assert!(!found.contains(&"two".to_string()));
    }
}
