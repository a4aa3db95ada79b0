use super::model::Track;

/// Return the indices of `tracks` whose file name contains `query` (case-insensitive).
///
/// Queries shorter than `min_chars` (after trimming) match everything, so a
/// half-typed query shows the full listing instead of an empty one.
pub fn search(tracks: &[Track], query: &str, min_chars: usize) -> Vec<usize> {
    let query = query.trim();
    if query.chars().count() < min_chars {
        return (0..tracks.len()).collect();
    }

    let needle = query.to_lowercase();
    tracks
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.file_name()
                .unwrap_or(t.name.as_str())
                .to_lowercase()
                .contains(&needle)
        })
        .map(|(i, _)| i)
        .collect()
}
