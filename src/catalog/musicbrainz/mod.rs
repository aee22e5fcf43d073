//! MusicBrainz + Cover Art Archive catalog
//!
//! The primary catalog. Album lookups run three searches in order and stop
//! at the first that yields artwork:
//!
//! 1. releases by artist + album, first candidate whose title matches
//! 2. releases by artist only (wider), name-match tiers only
//! 3. recordings by artist + title, first release of the first usable hit
//!
//! A failing step is logged and treated as a miss so the next step still runs.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::MusicBrainzClient;

use super::coverart::CoverArtArchive;
use super::domain::{CatalogError, CatalogMatch, CoverSource, MatchConfidence};
use super::http::HttpClient;
use super::matcher::match_album;
use super::traits::CatalogSource;
use crate::config::CoversConfig;
use crate::metadata::TrackMetadata;

/// Primary catalog adapter
pub struct MusicBrainzCatalog {
    client: MusicBrainzClient,
    cover_art: CoverArtArchive,
    search_limit: u32,
    extended_search_limit: u32,
}

impl MusicBrainzCatalog {
    pub fn new(http: Arc<dyn HttpClient>, config: &CoversConfig) -> Self {
        Self::with_base_urls(
            http,
            client::DEFAULT_BASE_URL,
            super::coverart::DEFAULT_BASE_URL,
            config,
        )
    }

    /// Point both services somewhere else
    pub fn with_base_urls(
        http: Arc<dyn HttpClient>,
        musicbrainz_url: &str,
        cover_art_url: &str,
        config: &CoversConfig,
    ) -> Self {
        let timeout = config.request_timeout();
        Self {
            client: MusicBrainzClient::with_base_url(http.clone(), musicbrainz_url, timeout),
            cover_art: CoverArtArchive::with_base_url(http, cover_art_url, timeout),
            search_limit: config.search_limit,
            extended_search_limit: config.extended_search_limit,
        }
    }

    /// Step 1: artist + album search
    async fn search_album_direct(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<CatalogMatch>, CatalogError> {
        let response = self
            .client
            .search_releases(artist, Some(album), self.search_limit)
            .await?;
        self.first_matching_release(&response.releases, album, false)
            .await
    }

    /// Step 2: artist-only search, strict tiers
    async fn search_album_fuzzy(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<CatalogMatch>, CatalogError> {
        let response = self
            .client
            .search_releases(artist, None, self.extended_search_limit)
            .await?;
        self.first_matching_release(&response.releases, album, true)
            .await
    }

    /// Step 3 (and the whole track-only lookup): recording search
    async fn search_recording(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<CatalogMatch>, CatalogError> {
        let response = self
            .client
            .search_recordings(artist, title, self.search_limit)
            .await?;

        for recording in &response.recordings {
            let Some((release, release_id)) = adapter::first_release(recording) else {
                continue;
            };
            if let Some(cover_url) = self.cover_url(release_id).await {
                return Ok(Some(CatalogMatch {
                    cover_url,
                    release: adapter::recording_release_info(recording, release),
                    confidence: MatchConfidence::RecordingMatch,
                }));
            }
        }

        Ok(None)
    }

    /// Walk candidates in order; the first matching release with artwork wins
    async fn first_matching_release(
        &self,
        releases: &[dto::Release],
        album: &str,
        name_match_only: bool,
    ) -> Result<Option<CatalogMatch>, CatalogError> {
        for release in releases {
            let (matches, confidence) = match_album(&release.title, album);
            if !matches || (name_match_only && !confidence.is_name_match()) {
                continue;
            }
            if let Some(cover_url) = self.cover_url(&release.id).await {
                return Ok(Some(CatalogMatch {
                    cover_url,
                    release: adapter::release_info(release),
                    confidence,
                }));
            }
        }
        Ok(None)
    }

    /// Artwork URL for a release; lookup failures count as "no artwork"
    async fn cover_url(&self, release_id: &str) -> Option<String> {
        match self.cover_art.front_image_url(release_id).await {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(release_id, error = %e, "Cover Art Archive lookup failed");
                None
            }
        }
    }
}

/// Collapse a step's outcome into "found" or "try the next step"
fn step_result(step: &str, result: Result<Option<CatalogMatch>, CatalogError>) -> Option<CatalogMatch> {
    match result {
        Ok(found) => {
            if found.is_none() {
                tracing::debug!(step, "MusicBrainz step found nothing");
            }
            found
        }
        Err(e) => {
            tracing::debug!(step, error = %e, "MusicBrainz step failed");
            None
        }
    }
}

#[async_trait]
impl CatalogSource for MusicBrainzCatalog {
    fn source(&self) -> CoverSource {
        CoverSource::PrimaryCatalog
    }

    async fn resolve_with_album(
        &self,
        track: &TrackMetadata,
    ) -> Result<CatalogMatch, CatalogError> {
        let artist = track.artist.trim();

        if let Some(album) = track.album_name() {
            let direct = self.search_album_direct(artist, album).await;
            if let Some(found) = step_result("direct", direct) {
                return Ok(found);
            }

            let fuzzy = self.search_album_fuzzy(artist, album).await;
            if let Some(found) = step_result("fuzzy", fuzzy) {
                return Ok(found);
            }
        }

        let recording = self.search_recording(artist, track.title.trim()).await;
        step_result("recording", recording).ok_or(CatalogError::NoMatches)
    }

    async fn resolve_by_track_only(
        &self,
        track: &TrackMetadata,
    ) -> Result<CatalogMatch, CatalogError> {
        let title = track.title.trim();
        if title.is_empty() {
            return Err(CatalogError::NoMatches);
        }

        let recording = self.search_recording(track.artist.trim(), title).await;
        step_result("recording", recording).ok_or(CatalogError::NoMatches)
    }
}
