//! iTunes Search catalog
//!
//! The secondary catalog. Album lookups run two searches:
//!
//! 1. albums by "artist album", name-match tiers only
//! 2. albums by artist alone (wider); any match, else the artist's first
//!    album tagged `artist_match_only`
//!
//! Track-only lookups take the first song hit for "artist title".
//! Hits without artwork are skipped.

pub mod dto;
mod adapter;
mod client;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::{Entity, ITunesClient};

use super::domain::{CatalogError, CatalogMatch, CoverSource, MatchConfidence};
use super::http::HttpClient;
use super::matcher::match_album;
use super::traits::CatalogSource;
use crate::config::CoversConfig;
use crate::metadata::TrackMetadata;

/// Secondary catalog adapter
pub struct ITunesCatalog {
    client: ITunesClient,
    search_limit: u32,
    extended_search_limit: u32,
    artist_albums_limit: u32,
    small_artwork_size: u32,
    large_artwork_size: u32,
}

impl ITunesCatalog {
    pub fn new(http: Arc<dyn HttpClient>, config: &CoversConfig) -> Self {
        Self::with_base_url(http, client::DEFAULT_BASE_URL, config)
    }

    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: &str, config: &CoversConfig) -> Self {
        Self {
            client: ITunesClient::with_base_url(
                http,
                base_url,
                config.country.clone(),
                config.request_timeout(),
            ),
            search_limit: config.search_limit,
            extended_search_limit: config.extended_search_limit,
            artist_albums_limit: config.artist_albums_limit,
            small_artwork_size: config.small_artwork_size,
            large_artwork_size: config.large_artwork_size,
        }
    }

    fn to_match(
        &self,
        hit: &dto::SearchResult,
        confidence: MatchConfidence,
    ) -> Option<CatalogMatch> {
        let cover_url =
            adapter::larger_artwork(hit, self.small_artwork_size, self.large_artwork_size)?;
        let release = match confidence {
            MatchConfidence::TrackOnly => adapter::song_info(hit),
            _ => adapter::album_info(hit),
        };
        Some(CatalogMatch {
            cover_url,
            release,
            confidence,
        })
    }

    /// Step 1: "artist album" search, strict tiers
    async fn search_album_direct(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<CatalogMatch>, CatalogError> {
        let term = format!("{} {}", artist, album);
        let response = self
            .client
            .search(&term, Entity::Album, self.extended_search_limit)
            .await?;

        Ok(response.results.iter().find_map(|hit| {
            let title = hit.collection_name.as_deref()?;
            let (matches, confidence) = match_album(title, album);
            if matches && confidence.is_name_match() {
                self.to_match(hit, confidence)
            } else {
                None
            }
        }))
    }

    /// Step 2: the artist's albums, any match, else best effort
    async fn search_artist_albums(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<CatalogMatch>, CatalogError> {
        let response = self
            .client
            .search(artist, Entity::Album, self.artist_albums_limit)
            .await?;

        let matched = response.results.iter().find_map(|hit| {
            let title = hit.collection_name.as_deref()?;
            let (matches, confidence) = match_album(title, album);
            if matches {
                self.to_match(hit, confidence)
            } else {
                None
            }
        });
        if matched.is_some() {
            return Ok(matched);
        }

        // Nothing matched by name: take the artist's first album rather than fail
        Ok(response
            .results
            .iter()
            .find_map(|hit| self.to_match(hit, MatchConfidence::ArtistMatchOnly)))
    }
}

#[async_trait]
impl CatalogSource for ITunesCatalog {
    fn source(&self) -> CoverSource {
        CoverSource::SecondaryCatalog
    }

    async fn resolve_with_album(
        &self,
        track: &TrackMetadata,
    ) -> Result<CatalogMatch, CatalogError> {
        let artist = track.artist.trim();
        let album = track.album_name().unwrap_or_default();

        if !album.is_empty() {
            match self.search_album_direct(artist, album).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => tracing::debug!(artist, album, "iTunes direct search found nothing"),
                Err(e) => tracing::debug!(artist, album, error = %e, "iTunes direct search failed"),
            }
        }

        match self.search_artist_albums(artist, album).await {
            Ok(Some(found)) => Ok(found),
            Ok(None) => Err(CatalogError::NoMatches),
            Err(e) => {
                tracing::debug!(artist, error = %e, "iTunes artist search failed");
                Err(CatalogError::NoMatches)
            }
        }
    }

    async fn resolve_by_track_only(
        &self,
        track: &TrackMetadata,
    ) -> Result<CatalogMatch, CatalogError> {
        let title = track.title.trim();
        if title.is_empty() {
            return Err(CatalogError::NoMatches);
        }

        let term = format!("{} {}", track.artist.trim(), title);
        let response = self
            .client
            .search(&term, Entity::Song, self.search_limit)
            .await?;

        response
            .results
            .first()
            .and_then(|song| self.to_match(song, MatchConfidence::TrackOnly))
            .ok_or(CatalogError::NoMatches)
    }
}
