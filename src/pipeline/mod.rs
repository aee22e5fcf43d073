//! Download pipeline - extraction, job construction and batch execution.
//!
//! A batch runs in two phases:
//! 1. **Pre-warm**: one cover cascade per unique (artist, album) pair, results
//!    stored in the cover cache
//! 2. **Execution**: jobs strictly in order, each rate limited, fetched,
//!    tagged and reported through the progress callback
//!
//! Job failures never abort the batch; they land in the job's outcome.

pub mod paths;
pub mod rate_limit;

pub use rate_limit::RateLimiter;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::{
    CatalogError, CoverSource, HttpClient, ITunesCatalog, MatchConfidence, MusicBrainzCatalog,
    ReqwestHttpClient,
};
use crate::config::Config;
use crate::cover::{CoverCache, CoverDownloader, CoverResolver, CoverResult};
use crate::error::{Error, Result, ResultExt};
use crate::extractor::{Extraction, MediaExtractor, YtDlpExtractor};
use crate::fetch::{MediaFetcher, YtDlpFetcher};
use crate::metadata::{LoftyTagWriter, TagWriter, TrackMetadata, clean_track};

/// Lifecycle of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One track to download
#[derive(Debug, Clone, Serialize)]
pub struct DownloadJob {
    pub url: String,
    pub metadata: TrackMetadata,
    pub output_path: PathBuf,
    pub status: JobStatus,
    pub error: Option<String>,
}

/// A finished job plus its cover summary
#[derive(Debug, Clone, Serialize)]
pub struct DownloadOutcome {
    pub job: DownloadJob,
    pub success: bool,
    pub error: Option<String>,
    pub cover_success: bool,
    pub cover_source: Option<CoverSource>,
    pub cover_confidence: Option<MatchConfidence>,
}

/// Reported before and after each job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub status: JobStatus,
    pub artist: String,
    pub title: String,
    pub error: Option<String>,
}

impl ProgressEvent {
    fn for_job(index: usize, total: usize, job: &DownloadJob) -> Self {
        Self {
            index,
            total,
            status: job.status,
            artist: job.metadata.artist.clone(),
            title: job.metadata.title.clone(),
            error: job.error.clone(),
        }
    }
}

/// Coordinates extraction, cover lookup, fetching and tagging
pub struct DownloadPipeline {
    extractor: Arc<dyn MediaExtractor>,
    fetcher: Arc<dyn MediaFetcher>,
    tag_writer: Arc<dyn TagWriter>,
    resolver: CoverResolver,
    cache: Mutex<CoverCache>,
    rate_limiter: RateLimiter,
    filename_template: String,
    extension: String,
    default_genre: Option<String>,
}

impl DownloadPipeline {
    pub fn new(
        config: &Config,
        extractor: Arc<dyn MediaExtractor>,
        fetcher: Arc<dyn MediaFetcher>,
        tag_writer: Arc<dyn TagWriter>,
        resolver: CoverResolver,
    ) -> Self {
        Self {
            extractor,
            fetcher,
            tag_writer,
            resolver,
            cache: Mutex::new(CoverCache::new()),
            rate_limiter: RateLimiter::new(config.download.rate_limit_delay()),
            filename_template: config.output.filename_template.clone(),
            extension: config.output.audio_format.clone(),
            default_genre: config.download.default_genre().map(str::to_string),
        }
    }

    /// Production wiring: reqwest, the two catalogs, yt-dlp and lofty
    pub fn from_config(config: &Config) -> Result<Self> {
        let http: Arc<dyn HttpClient> =
            Arc::new(ReqwestHttpClient::new().map_err(CatalogError::from)?);
        let covers = &config.covers;

        let resolver = CoverResolver::new(
            Arc::new(MusicBrainzCatalog::new(http.clone(), covers)),
            Arc::new(ITunesCatalog::new(http.clone(), covers)),
            CoverDownloader::new(http.clone(), covers.request_timeout(), covers.max_cover_bytes),
        );

        let mut extractor = YtDlpExtractor::new(config.download.ytdlp_path.clone());
        if config.extractor.platform_hints {
            extractor =
                extractor.with_hints(http, covers.request_timeout(), config.extractor.hint_delay());
        }

        Ok(Self::new(
            config,
            Arc::new(extractor),
            Arc::new(YtDlpFetcher::from_config(&config.output, &config.download)),
            Arc::new(LoftyTagWriter),
            resolver,
        ))
    }

    // ========================================================================
    // Extraction and jobs
    // ========================================================================

    /// Extract tracks for `url` and clean every one of them
    pub async fn extract(&self, url: &str) -> Result<Extraction> {
        let mut extraction = self.extractor.extract(url).await?;
        extraction.tracks = extraction
            .tracks
            .iter()
            .map(|track| clean_track(track, self.default_genre.as_deref()))
            .collect();
        Ok(extraction)
    }

    /// Build jobs for the selected tracks.
    ///
    /// Fails without producing any job if a selected track has no source URL.
    /// Output paths are unique within the batch and on disk.
    pub fn create_jobs(
        &self,
        tracks: &[TrackMetadata],
        base_dir: &Path,
        playlist_title: Option<&str>,
    ) -> Result<Vec<DownloadJob>> {
        let target_dir = match playlist_title.map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => base_dir.join(paths::sanitize_filename(title)),
            None => base_dir.to_path_buf(),
        };

        let mut reserved = HashSet::new();
        let mut jobs = Vec::new();

        for track in tracks.iter().filter(|t| t.selected) {
            let url = track
                .source_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .ok_or_else(|| Error::MissingSource {
                    title: track.title.clone(),
                })?;

            let stem = paths::sanitize_filename(&paths::render_filename(&self.filename_template, track));
            let output_path = paths::unique_path(&target_dir, &stem, &self.extension, &reserved);
            reserved.insert(output_path.clone());

            jobs.push(DownloadJob {
                url: url.to_string(),
                metadata: track.clone(),
                output_path,
                status: JobStatus::Pending,
                error: None,
            });
        }

        tracing::debug!(jobs = jobs.len(), dir = %target_dir.display(), "Created download jobs");
        Ok(jobs)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run a batch: pre-warm covers, then execute jobs in order.
    ///
    /// `on_progress` is called with the in-progress state and again with the
    /// final state of every job.
    pub async fn download<F>(&self, jobs: Vec<DownloadJob>, mut on_progress: F) -> Vec<DownloadOutcome>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        if jobs.is_empty() {
            return Vec::new();
        }

        self.prewarm_covers(&jobs).await;

        let total = jobs.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, mut job) in jobs.into_iter().enumerate() {
            let index = i + 1;

            job.status = JobStatus::InProgress;
            job.error = None;
            on_progress(ProgressEvent::for_job(index, total, &job));

            let outcome = self.run_job(job).await;
            on_progress(ProgressEvent::for_job(index, total, &outcome.job));
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        tracing::info!(total, succeeded, "Batch finished");
        outcomes
    }

    /// Run [`Self::download`] on a background task.
    ///
    /// Progress arrives on the returned channel; the handle yields the
    /// outcomes once the batch is done.
    pub fn spawn_download(
        self: &Arc<Self>,
        jobs: Vec<DownloadJob>,
    ) -> (mpsc::UnboundedReceiver<ProgressEvent>, JoinHandle<Vec<DownloadOutcome>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = Arc::clone(self);

        let handle = tokio::spawn(async move {
            pipeline
                .download(jobs, move |event| {
                    // A dropped receiver just means nobody is watching
                    let _ = tx.send(event);
                })
                .await
        });

        (rx, handle)
    }

    /// Cover for one track, through the cache when it has artist and album
    pub async fn resolve_cover(&self, track: &TrackMetadata) -> CoverResult {
        let Some((artist, album)) = cache_pair(track) else {
            return self.resolver.retrieve_cover(track).await;
        };

        let cached = self.cache.lock().get(artist, album).cloned();
        if let Some(hit) = cached {
            return hit;
        }

        let result = self.resolver.retrieve_cover(track).await;
        self.cache.lock().set(artist, album, result.clone());
        result
    }

    /// Number of (artist, album) pairs with a cached result
    pub fn cached_covers(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn clear_cover_cache(&self) {
        self.cache.lock().clear();
    }

    /// One cascade per uncached (artist, album) pair in the batch
    async fn prewarm_covers(&self, jobs: &[DownloadJob]) {
        let mut order: Vec<TrackMetadata> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for job in jobs {
            let Some((artist, album)) = cache_pair(&job.metadata) else {
                continue;
            };
            let key = CoverCache::key(artist, album);

            match index.get(&key) {
                // Any job of the pair may carry the page's own cover
                Some(&i) => {
                    if order[i].authoritative_cover_url.is_none() {
                        order[i].authoritative_cover_url =
                            job.metadata.authoritative_cover_url.clone();
                    }
                }
                None => {
                    if self.cache.lock().contains(artist, album) {
                        continue;
                    }
                    index.insert(key, order.len());
                    order.push(job.metadata.clone());
                }
            }
        }

        if order.is_empty() {
            return;
        }
        tracing::info!(pairs = order.len(), "Pre-warming cover cache");

        for track in &order {
            let Some((artist, album)) = cache_pair(track) else {
                continue;
            };
            let result = self.resolver.retrieve_cover(track).await;
            self.cache.lock().set(artist, album, result);
        }
    }

    async fn run_job(&self, mut job: DownloadJob) -> DownloadOutcome {
        self.rate_limiter.wait().await;

        if let Err(e) = self.fetch(&job).await {
            tracing::warn!(url = %job.url, error = %e, "Download failed");
            let message = e.to_string();
            job.status = JobStatus::Error;
            job.error = Some(message.clone());
            return DownloadOutcome {
                job,
                success: false,
                error: Some(message),
                cover_success: false,
                cover_source: None,
                cover_confidence: None,
            };
        }

        let cover = self.resolve_cover(&job.metadata).await;
        self.write_tags(&job, &cover).await;

        job.status = JobStatus::Completed;
        job.error = None;
        tracing::info!(
            path = %job.output_path.display(),
            cover = cover.success,
            "Downloaded track"
        );

        DownloadOutcome {
            job,
            success: true,
            error: None,
            cover_success: cover.success,
            cover_source: cover.source,
            cover_confidence: Some(cover.confidence),
        }
    }

    async fn fetch(&self, job: &DownloadJob) -> Result<()> {
        if let Some(dir) = job.output_path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(format!("Failed to create {}", dir.display()))?;
        }
        self.fetcher.fetch(&job.url, &job.output_path).await
    }

    /// Best effort: a file without tags is still a successful download
    async fn write_tags(&self, job: &DownloadJob, cover: &CoverResult) {
        let writer = Arc::clone(&self.tag_writer);
        let path = job.output_path.clone();
        let metadata = job.metadata.clone();
        let data = cover.cover_data.clone();

        let result = tokio::task::spawn_blocking(move || {
            writer.write_tags(&path, &metadata, data.as_deref())
        })
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(path = %job.output_path.display(), error = %e, "Could not write tags")
            }
            Err(e) => {
                tracing::warn!(path = %job.output_path.display(), error = %e, "Tag writer stopped")
            }
        }
    }
}

/// Trimmed (artist, album) when both are present
fn cache_pair(track: &TrackMetadata) -> Option<(&str, &str)> {
    let artist = track.artist.trim();
    let album = track.album_name()?;
    (!artist.is_empty()).then_some((artist, album))
}
