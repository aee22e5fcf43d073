//! Cover resolver - one ordered list of strategies, first success wins.
//!
//! The default order is:
//! 1. Authoritative hint (cover published with the track itself)
//! 2. Artist guard (no artist, no catalog lookup)
//! 3. Title guard (no album and no title, no catalog lookup)
//! 4. Primary catalog, album search
//! 5. Secondary catalog, album search
//! 6. Primary catalog, track-only search
//! 7. Secondary catalog, track-only search
//!
//! Album strategies only run when the track has an album and track-only
//! strategies only when it has none, so a track takes exactly one of the two
//! paths. Every catalog hit is downloaded and validated before it counts.

use std::sync::Arc;

use async_trait::async_trait;

use super::{CoverDownloader, CoverResult};
use crate::catalog::{CatalogError, CatalogSource, CoverSource, MatchConfidence};
use crate::metadata::TrackMetadata;

/// What a strategy concluded
#[derive(Debug)]
pub enum Attempt {
    /// Stop here with this result (success or a definitive miss)
    Resolved(CoverResult),
    /// Not applicable or nothing found, try the next strategy
    Continue,
}

/// One step of the cascade
#[async_trait]
pub trait CoverStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Err` aborts the whole cascade with an error result.
    async fn attempt(
        &self,
        track: &TrackMetadata,
        downloader: &CoverDownloader,
    ) -> Result<Attempt, CatalogError>;
}

/// Cover published on the track's own page
pub struct AuthoritativeHint;

#[async_trait]
impl CoverStrategy for AuthoritativeHint {
    fn name(&self) -> &'static str {
        "authoritative_hint"
    }

    async fn attempt(
        &self,
        track: &TrackMetadata,
        downloader: &CoverDownloader,
    ) -> Result<Attempt, CatalogError> {
        let Some(url) = track.authoritative_cover_url.as_deref() else {
            return Ok(Attempt::Continue);
        };

        // The hint is opportunistic: any failure falls through to the catalogs
        match downloader.download(url).await {
            Ok(Some(data)) => Ok(Attempt::Resolved(CoverResult::found(
                CoverSource::AuthoritativeHint,
                url,
                data,
                None,
                MatchConfidence::Exact,
            ))),
            Ok(None) => Ok(Attempt::Continue),
            Err(e) => {
                tracing::debug!(url, error = %e, "Authoritative cover download failed");
                Ok(Attempt::Continue)
            }
        }
    }
}

/// Catalog lookups need an artist
pub struct RequireArtist;

#[async_trait]
impl CoverStrategy for RequireArtist {
    fn name(&self) -> &'static str {
        "require_artist"
    }

    async fn attempt(
        &self,
        track: &TrackMetadata,
        _downloader: &CoverDownloader,
    ) -> Result<Attempt, CatalogError> {
        if track.artist.trim().is_empty() {
            Ok(Attempt::Resolved(CoverResult::miss("No artist provided")))
        } else {
            Ok(Attempt::Continue)
        }
    }
}

/// Track-only lookups search by title, so a track without an album needs one
pub struct RequireTitle;

#[async_trait]
impl CoverStrategy for RequireTitle {
    fn name(&self) -> &'static str {
        "require_title"
    }

    async fn attempt(
        &self,
        track: &TrackMetadata,
        _downloader: &CoverDownloader,
    ) -> Result<Attempt, CatalogError> {
        if track.album_name().is_none() && track.title.trim().is_empty() {
            Ok(Attempt::Resolved(CoverResult::miss("No track title provided")))
        } else {
            Ok(Attempt::Continue)
        }
    }
}

/// Which catalog operation a [`CatalogLookup`] runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// Only for tracks with an album
    Album,
    /// Only for tracks without one
    TrackOnly,
}

/// Ask a catalog, then download what it points at
pub struct CatalogLookup {
    catalog: Arc<dyn CatalogSource>,
    mode: LookupMode,
}

impl CatalogLookup {
    pub fn new(catalog: Arc<dyn CatalogSource>, mode: LookupMode) -> Self {
        Self { catalog, mode }
    }
}

#[async_trait]
impl CoverStrategy for CatalogLookup {
    fn name(&self) -> &'static str {
        match (self.catalog.source(), self.mode) {
            (CoverSource::PrimaryCatalog, LookupMode::Album) => "primary_album",
            (CoverSource::PrimaryCatalog, LookupMode::TrackOnly) => "primary_track",
            (_, LookupMode::Album) => "secondary_album",
            (_, LookupMode::TrackOnly) => "secondary_track",
        }
    }

    async fn attempt(
        &self,
        track: &TrackMetadata,
        downloader: &CoverDownloader,
    ) -> Result<Attempt, CatalogError> {
        let lookup = match (self.mode, track.album_name().is_some()) {
            (LookupMode::Album, true) => self.catalog.resolve_with_album(track).await,
            (LookupMode::TrackOnly, false) => self.catalog.resolve_by_track_only(track).await,
            _ => return Ok(Attempt::Continue),
        };

        let found = match lookup {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(strategy = self.name(), error = %e, "Catalog miss");
                return Ok(Attempt::Continue);
            }
        };

        // A hit whose image can't be fetched is not a success
        match downloader.download(&found.cover_url).await? {
            Some(data) => Ok(Attempt::Resolved(CoverResult::found(
                self.catalog.source(),
                found.cover_url,
                data,
                Some(found.release),
                found.confidence,
            ))),
            None => {
                tracing::debug!(url = %found.cover_url, "Catalog cover not downloadable");
                Ok(Attempt::Continue)
            }
        }
    }
}

/// Cover resolver: runs the strategies in order.
pub struct CoverResolver {
    strategies: Vec<Box<dyn CoverStrategy>>,
    downloader: CoverDownloader,
}

impl CoverResolver {
    /// Standard cascade over a primary and a secondary catalog
    pub fn new(
        primary: Arc<dyn CatalogSource>,
        secondary: Arc<dyn CatalogSource>,
        downloader: CoverDownloader,
    ) -> Self {
        let strategies: Vec<Box<dyn CoverStrategy>> = vec![
            Box::new(AuthoritativeHint),
            Box::new(RequireArtist),
            Box::new(RequireTitle),
            Box::new(CatalogLookup::new(primary.clone(), LookupMode::Album)),
            Box::new(CatalogLookup::new(secondary.clone(), LookupMode::Album)),
            Box::new(CatalogLookup::new(primary, LookupMode::TrackOnly)),
            Box::new(CatalogLookup::new(secondary, LookupMode::TrackOnly)),
        ];
        Self::with_strategies(strategies, downloader)
    }

    /// Custom ordering
    pub fn with_strategies(
        strategies: Vec<Box<dyn CoverStrategy>>,
        downloader: CoverDownloader,
    ) -> Self {
        Self {
            strategies,
            downloader,
        }
    }

    /// Resolve a cover for `track`. Never fails: errors become a result with
    /// confidence `error`.
    pub async fn retrieve_cover(&self, track: &TrackMetadata) -> CoverResult {
        for strategy in &self.strategies {
            match strategy.attempt(track, &self.downloader).await {
                Ok(Attempt::Resolved(result)) => {
                    if result.success {
                        tracing::info!(
                            artist = %track.artist,
                            strategy = strategy.name(),
                            confidence = %result.confidence,
                            "Cover resolved"
                        );
                    }
                    return result;
                }
                Ok(Attempt::Continue) => {}
                Err(e) => {
                    tracing::warn!(strategy = strategy.name(), error = %e, "Cover resolution failed");
                    return CoverResult::failure(format!(
                        "Unexpected error during cover retrieval: {}",
                        e
                    ));
                }
            }
        }

        if track.album_name().is_some() {
            CoverResult::miss("No album cover found")
        } else {
            CoverResult::miss("No cover found for track-only search")
        }
    }
}
