//! HTTP capability shared by the catalog adapters, the cover downloader and
//! the hint scraper.
//!
//! Every remote call goes through the [`HttpClient`] trait so tests can swap
//! in a scripted client. Response bodies are exposed as a stream so callers
//! can stop reading once a size limit is crossed.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use serde::de::DeserializeOwned;

use super::domain::CatalogError;

/// User agent sent with every request - MusicBrainz rejects anonymous clients
pub const USER_AGENT: &str = concat!(
    "tunegrab/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/tunegrab/tunegrab)"
);

/// Transport-level failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<HttpError> for CatalogError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout => CatalogError::Timeout,
            other => CatalogError::Network(other.to_string()),
        }
    }
}

/// Chunked response body
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, HttpError>>;

/// Response head plus a body that has not been read yet
pub struct HttpResponse {
    pub status: u16,
    /// Lower-cased `content-type` header
    pub content_type: Option<String>,
    /// Declared `content-length`, if the server sent one
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the whole body
    pub async fn bytes(mut self) -> Result<Vec<u8>, HttpError> {
        let mut data = Vec::new();
        while let Some(chunk) = self.body.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }

    /// Read the body as (lossy) UTF-8
    pub async fn text(self) -> Result<String, HttpError> {
        let data = self.bytes().await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Read and deserialize a JSON body
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, CatalogError> {
        let data = self.bytes().await?;
        serde_json::from_slice(&data).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Build a response from an in-memory body, split into the given chunks
    #[cfg(test)]
    pub fn from_chunks(
        status: u16,
        content_type: Option<&str>,
        content_length: Option<u64>,
        chunks: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            status,
            content_type: content_type.map(|ct| ct.to_ascii_lowercase()),
            content_length,
            body: futures::stream::iter(chunks.into_iter().map(Ok)).boxed(),
        }
    }
}

/// Minimal GET-only HTTP client.
///
/// Implement this trait to script responses in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request. Non-2xx statuses are returned, not turned into errors.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, HttpError>;
}

/// GET a JSON document, mapping the usual catalog status codes.
pub async fn fetch_json<T: DeserializeOwned>(
    http: &dyn HttpClient,
    url: &str,
    timeout: Duration,
) -> Result<T, CatalogError> {
    let response = http.get(url, timeout).await?;

    match response.status {
        404 => return Err(CatalogError::NoMatches),
        429 | 503 => return Err(CatalogError::RateLimited),
        _ if !response.is_success() => return Err(CatalogError::Status(response.status)),
        _ => {}
    }

    response.json().await
}

/// Production client backed by reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, HttpError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        let content_length = response.content_length();

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(map_reqwest_error))
            .boxed();

        Ok(HttpResponse {
            status,
            content_type,
            content_length,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else if err.is_connect() {
        HttpError::Connect(err.to_string())
    } else if err.is_body() || err.is_decode() {
        HttpError::Body(err.to_string())
    } else {
        HttpError::Request(err.to_string())
    }
}

/// Scripted HTTP client for tests.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use parking_lot::Mutex;

    /// What a route answers with
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Response {
            status: u16,
            content_type: Option<String>,
            content_length: Option<u64>,
            chunks: Vec<Vec<u8>>,
        },
        Error(HttpError),
    }

    /// Mock client: the first route whose pattern is contained in the URL wins,
    /// anything unrouted gets a 404. Every requested URL is recorded.
    #[derive(Default)]
    pub struct MockHttp {
        routes: Vec<(String, MockReply)>,
        calls: Mutex<Vec<String>>,
    }

    impl MockHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, pattern: &str, reply: MockReply) -> Self {
            self.routes.push((pattern.to_string(), reply));
            self
        }

        /// Route answering 200 with a JSON body
        pub fn json(self, pattern: &str, body: serde_json::Value) -> Self {
            self.route(
                pattern,
                MockReply::Response {
                    status: 200,
                    content_type: Some("application/json".to_string()),
                    content_length: None,
                    chunks: vec![body.to_string().into_bytes()],
                },
            )
        }

        /// Route answering 200 with an HTML page
        pub fn html(self, pattern: &str, body: &str) -> Self {
            self.route(
                pattern,
                MockReply::Response {
                    status: 200,
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    content_length: None,
                    chunks: vec![body.as_bytes().to_vec()],
                },
            )
        }

        /// Route answering 200 with image bytes
        pub fn image(self, pattern: &str, data: &[u8]) -> Self {
            self.route(
                pattern,
                MockReply::Response {
                    status: 200,
                    content_type: Some("image/jpeg".to_string()),
                    content_length: Some(data.len() as u64),
                    chunks: vec![data.to_vec()],
                },
            )
        }

        pub fn status(self, pattern: &str, status: u16) -> Self {
            self.route(
                pattern,
                MockReply::Response {
                    status,
                    content_type: None,
                    content_length: None,
                    chunks: vec![],
                },
            )
        }

        pub fn error(self, pattern: &str, error: HttpError) -> Self {
            self.route(pattern, MockReply::Error(error))
        }

        /// All URLs requested so far
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        /// Number of requested URLs containing `pattern`
        pub fn count(&self, pattern: &str) -> usize {
            self.calls.lock().iter().filter(|u| u.contains(pattern)).count()
        }
    }

    #[async_trait]
    impl HttpClient for MockHttp {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, HttpError> {
            self.calls.lock().push(url.to_string());

            let reply = self
                .routes
                .iter()
                .find(|(pattern, _)| url.contains(pattern.as_str()))
                .map(|(_, reply)| reply.clone());

            match reply {
                Some(MockReply::Response {
                    status,
                    content_type,
                    content_length,
                    chunks,
                }) => Ok(HttpResponse::from_chunks(
                    status,
                    content_type.as_deref(),
                    content_length,
                    chunks,
                )),
                Some(MockReply::Error(err)) => Err(err),
                None => Ok(HttpResponse::from_chunks(404, None, None, vec![])),
            }
        }
    }
}
