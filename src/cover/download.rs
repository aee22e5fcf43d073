//! Validated cover download.
//!
//! Every resolution path ends here: the image is fetched with a bounded
//! timeout, must declare an `image/*` content type and may not exceed the
//! size limit, whether declared up front or discovered while streaming.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use crate::catalog::{CatalogError, HttpClient};

/// Downloads and validates cover images
pub struct CoverDownloader {
    http: Arc<dyn HttpClient>,
    timeout: Duration,
    max_bytes: u64,
}

impl CoverDownloader {
    pub fn new(http: Arc<dyn HttpClient>, timeout: Duration, max_bytes: u64) -> Self {
        Self {
            http,
            timeout,
            max_bytes,
        }
    }

    /// Fetch an image.
    ///
    /// `Ok(None)` means "no image here": any request failure, 404, not an
    /// image, or too large. Other HTTP error statuses are `Err`.
    pub async fn download(&self, url: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let response = match self.http.get(url, self.timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url, error = %e, "Cover request failed");
                return Ok(None);
            }
        };

        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(CatalogError::Status(response.status));
        }

        let is_image = response
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            tracing::debug!(url, content_type = ?response.content_type, "Not an image");
            return Ok(None);
        }

        if response.content_length.is_some_and(|len| len > self.max_bytes) {
            tracing::debug!(url, length = ?response.content_length, "Cover too large");
            return Ok(None);
        }

        let mut body = response.body;
        let mut data = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::debug!(url, error = %e, "Cover body interrupted");
                    return Ok(None);
                }
            };
            data.extend_from_slice(&chunk);
            if data.len() as u64 > self.max_bytes {
                tracing::debug!(url, "Cover exceeded size limit while streaming");
                return Ok(None);
            }
        }

        Ok(Some(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HttpError;
    use crate::catalog::http::mocks::{MockHttp, MockReply};

    const URL: &str = "https://img.test/cover.jpg";

    fn downloader(http: MockHttp, max_bytes: u64) -> CoverDownloader {
        CoverDownloader::new(Arc::new(http), Duration::from_secs(1), max_bytes)
    }

    fn reply(content_type: Option<&str>, length: Option<u64>, chunks: Vec<Vec<u8>>) -> MockReply {
        MockReply::Response {
            status: 200,
            content_type: content_type.map(String::from),
            content_length: length,
            chunks,
        }
    }

    #[tokio::test]
    async fn test_downloads_image() {
        let d = downloader(MockHttp::new().image("cover.jpg", &[0xff, 0xd8, 1, 2]), 1024);
        assert_eq!(d.download(URL).await.unwrap(), Some(vec![0xff, 0xd8, 1, 2]));
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let d = downloader(MockHttp::new().html("cover.jpg", "<html>"), 1024);
        assert_eq!(d.download(URL).await.unwrap(), None);

        let d = downloader(
            MockHttp::new().route("cover.jpg", reply(None, None, vec![vec![1]])),
            1024,
        );
        assert_eq!(d.download(URL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_declared_oversize() {
        let d = downloader(
            MockHttp::new().route("cover.jpg", reply(Some("image/png"), Some(11), vec![vec![0; 4]])),
            10,
        );
        assert_eq!(d.download(URL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_aborts_undeclared_oversize_while_streaming() {
        let d = downloader(
            MockHttp::new().route(
                "cover.jpg",
                reply(Some("image/jpeg"), None, vec![vec![0; 6], vec![0; 6]]),
            ),
            10,
        );
        assert_eq!(d.download(URL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_exactly_at_limit_is_accepted() {
        let d = downloader(
            MockHttp::new().route(
                "cover.jpg",
                reply(Some("image/jpeg"), None, vec![vec![0; 5], vec![0; 5]]),
            ),
            10,
        );
        assert_eq!(d.download(URL).await.unwrap().map(|d| d.len()), Some(10));
    }

    #[tokio::test]
    async fn test_missing_and_unreachable_are_misses() {
        let d = downloader(MockHttp::new(), 1024);
        assert_eq!(d.download(URL).await.unwrap(), None);

        let d = downloader(MockHttp::new().error("cover.jpg", HttpError::Timeout), 1024);
        assert_eq!(d.download(URL).await.unwrap(), None);

        let d = downloader(
            MockHttp::new().error("cover.jpg", HttpError::Connect("refused".into())),
            1024,
        );
        assert_eq!(d.download(URL).await.unwrap(), None);

        let d = downloader(
            MockHttp::new().error(
                "cover.jpg",
                HttpError::Request("builder error: relative URL without a base".into()),
            ),
            1024,
        );
        assert_eq!(d.download(URL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_other_statuses_propagate() {
        let d = downloader(MockHttp::new().status("cover.jpg", 500), 1024);
        assert!(matches!(d.download(URL).await, Err(CatalogError::Status(500))));

        let d = downloader(MockHttp::new().status("cover.jpg", 403), 1024);
        assert!(matches!(d.download(URL).await, Err(CatalogError::Status(403))));
    }
}
