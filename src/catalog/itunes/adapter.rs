//! Adapter layer: Convert iTunes DTOs to domain models

use super::dto;
use crate::catalog::domain::ReleaseInfo;

/// Release descriptor for an album hit
pub fn album_info(album: &dto::SearchResult) -> ReleaseInfo {
    ReleaseInfo {
        title: album.collection_name.clone().unwrap_or_default(),
        id: album.collection_id.map(|id| id.to_string()),
        artist: album.artist_name.clone(),
        year: album.release_date.as_deref().and_then(year_of),
    }
}

/// Release descriptor for a song hit (titled after the track)
pub fn song_info(song: &dto::SearchResult) -> ReleaseInfo {
    ReleaseInfo {
        title: song.track_name.clone().unwrap_or_default(),
        id: song.collection_id.map(|id| id.to_string()),
        artist: song.artist_name.clone(),
        year: song.release_date.as_deref().and_then(year_of),
    }
}

/// Larger artwork variant: the size token in the URL path is swapped,
/// e.g. `.../100x100bb.jpg` -> `.../600x600bb.jpg`.
pub fn larger_artwork(result: &dto::SearchResult, small: u32, large: u32) -> Option<String> {
    let url = result.artwork_url(small)?;
    let from = format!("{0}x{0}", small);
    let to = format!("{0}x{0}", large);
    Some(url.replace(&from, &to))
}

fn year_of(date: &str) -> Option<String> {
    date.get(..4).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> dto::SearchResult {
        dto::SearchResult {
            wrapper_type: Some("collection".into()),
            collection_id: Some(42),
            collection_name: Some("Discovery".into()),
            track_name: Some("One More Time".into()),
            artist_name: Some("Daft Punk".into()),
            release_date: Some("2001-03-12T08:00:00Z".into()),
            primary_genre_name: None,
            artwork_url_30: None,
            artwork_url_60: None,
            artwork_url_100: Some("https://img.test/thumb/100x100bb.jpg".into()),
        }
    }

    #[test]
    fn test_album_info() {
        let info = album_info(&hit());
        assert_eq!(info.title, "Discovery");
        assert_eq!(info.id.as_deref(), Some("42"));
        assert_eq!(info.year.as_deref(), Some("2001"));
    }

    #[test]
    fn test_song_info_uses_track_name() {
        assert_eq!(song_info(&hit()).title, "One More Time");
    }

    #[test]
    fn test_larger_artwork() {
        assert_eq!(
            larger_artwork(&hit(), 100, 600).as_deref(),
            Some("https://img.test/thumb/600x600bb.jpg")
        );
        assert_eq!(larger_artwork(&hit(), 60, 600), None);
    }
}
