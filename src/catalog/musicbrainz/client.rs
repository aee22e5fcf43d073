//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz search web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API/Search
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header (set by the shared
//! HTTP client) and rate limits to 1 req/sec.

use std::sync::Arc;
use std::time::Duration;

use super::dto;
use crate::catalog::domain::CatalogError;
use crate::catalog::http::{HttpClient, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl MusicBrainzClient {
    pub fn new(http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL, timeout)
    }

    /// Create a client with a custom base URL
    pub fn with_base_url(
        http: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Search releases by artist, optionally narrowed to an album title
    pub async fn search_releases(
        &self,
        artist: &str,
        album: Option<&str>,
        limit: u32,
    ) -> Result<dto::ReleaseSearchResponse, CatalogError> {
        let mut clauses = vec![field_clause("artist", artist)];
        if let Some(album) = album {
            clauses.push(field_clause("release", album));
        }

        let url = self.search_url("release", &clauses.join(" AND "), limit);
        fetch_json(self.http.as_ref(), &url, self.timeout).await
    }

    /// Search recordings by artist and track title
    pub async fn search_recordings(
        &self,
        artist: &str,
        title: &str,
        limit: u32,
    ) -> Result<dto::RecordingSearchResponse, CatalogError> {
        let query = format!(
            "{} AND {}",
            field_clause("artist", artist),
            field_clause("recording", title)
        );

        let url = self.search_url("recording", &query, limit);
        fetch_json(self.http.as_ref(), &url, self.timeout).await
    }

    fn search_url(&self, entity: &str, query: &str, limit: u32) -> String {
        format!(
            "{}/{}?query={}&limit={}&fmt=json",
            self.base_url,
            entity,
            urlencoding::encode(query),
            limit
        )
    }
}

/// `field:"value"` with Lucene phrase escaping
fn field_clause(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{}:\"{}\"", field, escaped)
}
