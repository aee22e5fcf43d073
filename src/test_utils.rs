//! Test utilities and fixtures for tunegrab tests.
//!
//! This module provides track fixtures and a builder that wires a
//! [`DownloadPipeline`] to recording mocks, so pipeline tests can assert on
//! catalog calls, fetches and tag writes.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{PipelineBuilder, track};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let t = PipelineBuilder::new().build();
//!     let jobs = t.pipeline.create_jobs(&[track("A", "Song", Some("B"))], t.dir(), None).unwrap();
//!     t.pipeline.download(jobs, |_| {}).await;
//!     assert_eq!(t.primary.album_calls(), 1);
//! }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::catalog::CoverSource;
use crate::catalog::http::mocks::MockHttp;
use crate::catalog::traits::mocks::MockCatalog;
use crate::config::Config;
use crate::cover::{CoverDownloader, CoverResolver};
use crate::extractor::Extraction;
use crate::extractor::mocks::MockExtractor;
use crate::fetch::mocks::MockFetcher;
use crate::metadata::TrackMetadata;
use crate::metadata::tags::mocks::MockTagWriter;
use crate::pipeline::DownloadPipeline;

/// A selected track with a source URL derived from its title
pub fn track(artist: &str, title: &str, album: Option<&str>) -> TrackMetadata {
    let id: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    TrackMetadata {
        album: album.map(String::from),
        source_url: Some(format!("https://www.youtube.com/watch?v={}", id)),
        ..TrackMetadata::new(title, artist)
    }
}

/// A pipeline wired to mocks, plus handles to inspect them
pub struct TestPipeline {
    pub pipeline: DownloadPipeline,
    pub http: Arc<MockHttp>,
    pub primary: Arc<MockCatalog>,
    pub secondary: Arc<MockCatalog>,
    pub extractor: Arc<MockExtractor>,
    pub fetcher: Arc<MockFetcher>,
    pub tags: Arc<MockTagWriter>,
    /// Output directory, deleted on drop
    pub dir: TempDir,
}

impl TestPipeline {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Builds a [`TestPipeline`].
///
/// Defaults: no HTTP routes, catalogs that never match, an extractor that
/// fails, a fetcher that writes placeholder files, and no rate limit delay.
pub struct PipelineBuilder {
    http: MockHttp,
    primary: MockCatalog,
    secondary: MockCatalog,
    extractor: MockExtractor,
    fetcher: MockFetcher,
    tags: MockTagWriter,
    config: Config,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        let mut config = Config::default();
        config.download.rate_limit_delay_secs = 0.0;

        Self {
            http: MockHttp::new(),
            primary: MockCatalog::no_matches(CoverSource::PrimaryCatalog),
            secondary: MockCatalog::no_matches(CoverSource::SecondaryCatalog),
            extractor: MockExtractor::failing(),
            fetcher: MockFetcher::new(),
            tags: MockTagWriter::default(),
            config,
        }
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn http(mut self, http: MockHttp) -> Self {
        self.http = http;
        self
    }

    pub fn primary(mut self, catalog: MockCatalog) -> Self {
        self.primary = catalog;
        self
    }

    pub fn secondary(mut self, catalog: MockCatalog) -> Self {
        self.secondary = catalog;
        self
    }

    pub fn extraction(mut self, extraction: Extraction) -> Self {
        self.extractor = MockExtractor::returning(extraction);
        self
    }

    pub fn fetcher(mut self, fetcher: MockFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn tag_writer(mut self, tags: MockTagWriter) -> Self {
        self.tags = tags;
        self
    }

    pub fn configure(mut self, change: impl FnOnce(&mut Config)) -> Self {
        change(&mut self.config);
        self
    }

    pub fn build(self) -> TestPipeline {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");

        let http = Arc::new(self.http);
        let primary = Arc::new(self.primary);
        let secondary = Arc::new(self.secondary);
        let extractor = Arc::new(self.extractor);
        let fetcher = Arc::new(self.fetcher);
        let tags = Arc::new(self.tags);

        let downloader = CoverDownloader::new(
            http.clone(),
            Duration::from_secs(1),
            self.config.covers.max_cover_bytes,
        );
        let resolver = CoverResolver::new(primary.clone(), secondary.clone(), downloader);
        let pipeline = DownloadPipeline::new(
            &self.config,
            extractor.clone(),
            fetcher.clone(),
            tags.clone(),
            resolver,
        );

        TestPipeline {
            pipeline,
            http,
            primary,
            secondary,
            extractor,
            fetcher,
            tags,
            dir,
        }
    }
}
