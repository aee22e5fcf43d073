//! Cover Art Archive lookup
//!
//! Resolves a MusicBrainz release ID to the URL of its artwork.
//! No API key required, but please respect their rate limits.
//!
//! API: https://coverartarchive.org

pub mod dto;

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::domain::CatalogError;
use crate::catalog::http::{HttpClient, fetch_json};

pub const DEFAULT_BASE_URL: &str = "https://coverartarchive.org";

/// Cover Art Archive client
pub struct CoverArtArchive {
    http: Arc<dyn HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl CoverArtArchive {
    pub fn new(http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL, timeout)
    }

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

    /// Artwork URL for a release: the front image if flagged, else the first.
    ///
    /// `Ok(None)` when the release has no artwork (404 or empty listing).
    pub async fn front_image_url(&self, release_id: &str) -> Result<Option<String>, CatalogError> {
        let url = format!("{}/release/{}", self.base_url, release_id);

        match fetch_json::<dto::CoverArtResponse>(self.http.as_ref(), &url, self.timeout).await {
            Ok(listing) => Ok(select_image(&listing)),
            Err(CatalogError::NoMatches) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Prefer the image flagged as front cover, else the first listed
pub fn select_image(listing: &dto::CoverArtResponse) -> Option<String> {
    listing
        .images
        .iter()
        .find(|image| image.front)
        .or_else(|| listing.images.first())
        .map(|image| image.image.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::http::mocks::MockHttp;
    use serde_json::json;

    fn archive(http: MockHttp) -> (Arc<MockHttp>, CoverArtArchive) {
        let http = Arc::new(http);
        let archive =
            CoverArtArchive::with_base_url(http.clone(), "https://caa.test", Duration::from_secs(1));
        (http, archive)
    }

    #[tokio::test]
    async fn test_prefers_front_image() {
        let (_, archive) = archive(MockHttp::new().json(
            "/release/rel-1",
            json!({"images": [
                {"front": false, "image": "https://caa.test/back.jpg"},
                {"front": true, "image": "https://caa.test/front.jpg"}
            ]}),
        ));

        let url = archive.front_image_url("rel-1").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://caa.test/front.jpg"));
    }

    #[tokio::test]
    async fn test_falls_back_to_first_image() {
        let (_, archive) = archive(MockHttp::new().json(
            "/release/rel-1",
            json!({"images": [
                {"front": false, "image": "https://caa.test/first.jpg"},
                {"front": false, "image": "https://caa.test/second.jpg"}
            ]}),
        ));

        let url = archive.front_image_url("rel-1").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://caa.test/first.jpg"));
    }

    #[tokio::test]
    async fn test_missing_release_is_none() {
        let (http, archive) = archive(MockHttp::new());
        assert_eq!(archive.front_image_url("nope").await.unwrap(), None);
        assert_eq!(http.calls(), vec!["https://caa.test/release/nope"]);
    }

    #[tokio::test]
    async fn test_empty_listing_is_none() {
        let (_, archive) = archive(MockHttp::new().json("/release/rel-1", json!({"images": []})));
        assert_eq!(archive.front_image_url("rel-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let (_, archive) = archive(MockHttp::new().status("/release/rel-1", 500));
        let result = archive.front_image_url("rel-1").await;
        assert!(matches!(result, Err(CatalogError::Status(500))));
    }
}
