//! iTunes Search API Data Transfer Objects
//!
//! These types match what https://itunes.apple.com/search returns.
//! DO NOT use these types outside the itunes module - convert to domain types.
//!
//! API Reference: https://performance-partners.apple.com/search-api

use serde::{Deserialize, Serialize};

/// Search response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// One album (collection) or song (track) hit
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// "collection" for albums, "track" for songs
    pub wrapper_type: Option<String>,
    pub collection_id: Option<u64>,
    pub collection_name: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    /// ISO 8601 timestamp, e.g. "1975-11-21T08:00:00Z"
    pub release_date: Option<String>,
    pub primary_genre_name: Option<String>,
    #[serde(rename = "artworkUrl30")]
    pub artwork_url_30: Option<String>,
    #[serde(rename = "artworkUrl60")]
    pub artwork_url_60: Option<String>,
    #[serde(rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
}

impl SearchResult {
    /// Artwork URL for one of the published sizes (30, 60, 100)
    pub fn artwork_url(&self, size: u32) -> Option<&str> {
        let url = match size {
            30 => self.artwork_url_30.as_deref(),
            60 => self.artwork_url_60.as_deref(),
            100 => self.artwork_url_100.as_deref(),
            _ => None,
        };
        url.filter(|u| !u.is_empty())
    }
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_album_search() {
        let json = r#"{
            "resultCount": 1,
            "results": [{
                "wrapperType": "collection",
                "collectionType": "Album",
                "artistId": 3296287,
                "collectionId": 1440650428,
                "artistName": "Queen",
                "collectionName": "A Night At the Opera (2011 Remaster)",
                "artworkUrl60": "https://is1-ssl.mzstatic.com/image/thumb/a/60x60bb.jpg",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/thumb/a/100x100bb.jpg",
                "collectionPrice": 9.99,
                "trackCount": 12,
                "country": "USA",
                "releaseDate": "1975-11-21T08:00:00Z",
                "primaryGenreName": "Rock"
            }]
        }"#;

        let response: SearchResponse =
            serde_json::from_str(json).expect("Should parse album search");

        assert_eq!(response.result_count, 1);
        let album = &response.results[0];
        assert_eq!(album.wrapper_type.as_deref(), Some("collection"));
        assert_eq!(album.collection_id, Some(1440650428));
        assert_eq!(
            album.artwork_url(100),
            Some("https://is1-ssl.mzstatic.com/image/thumb/a/100x100bb.jpg")
        );
        assert_eq!(album.artwork_url(30), None);
        assert_eq!(album.artwork_url(600), None);
    }

    #[test]
    fn test_parse_song_search() {
        let json = r#"{
            "resultCount": 1,
            "results": [{
                "wrapperType": "track",
                "kind": "song",
                "artistName": "Queen",
                "trackName": "Bohemian Rhapsody",
                "collectionName": "A Night At the Opera",
                "artworkUrl100": "https://is1-ssl.mzstatic.com/image/thumb/b/100x100bb.jpg",
                "releaseDate": "1975-10-31T12:00:00Z",
                "trackTimeMillis": 354947
            }]
        }"#;

        let response: SearchResponse =
            serde_json::from_str(json).expect("Should parse song search");
        assert_eq!(response.results[0].track_name.as_deref(), Some("Bohemian Rhapsody"));
    }

    #[test]
    fn test_parse_empty_search() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"resultCount": 0, "results": []}"#).expect("Should parse");
        assert!(response.results.is_empty());
    }
}
