//! Internal domain models for catalog lookups.
//!
//! These types are OUR types - they don't change when the catalog APIs change.
//! Each adapter converts its response DTOs into these at the adapter boundary.

use serde::Serialize;
use std::fmt;

/// How strongly a resolved album/cover match is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    /// Normalized album names are identical (or the cover came from the track's own page)
    Exact,
    /// One normalized name contains the other
    Partial,
    /// At least half of the words are shared
    WordOverlap,
    /// Found through a recording (track) search rather than an album search
    RecordingMatch,
    /// Found through a song search with no album to compare against
    TrackOnly,
    /// Artist's first album, taken when nothing matched by name
    ArtistMatchOnly,
    /// Nothing matched
    None,
    /// Resolution failed unexpectedly
    Error,
    /// The caller had no album to compare against
    NoAlbumExpected,
}

impl MatchConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::WordOverlap => "word_overlap",
            Self::RecordingMatch => "recording_match",
            Self::TrackOnly => "track_only",
            Self::ArtistMatchOnly => "artist_match_only",
            Self::None => "none",
            Self::Error => "error",
            Self::NoAlbumExpected => "no_album_expected",
        }
    }

    /// True for the name-based tiers (exact, partial, word overlap).
    ///
    /// Wider searches only accept these so coincidental hits are dropped.
    pub fn is_name_match(&self) -> bool {
        matches!(self, Self::Exact | Self::Partial | Self::WordOverlap)
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a cover came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverSource {
    /// The video platform's own page for the track
    AuthoritativeHint,
    /// MusicBrainz + Cover Art Archive
    PrimaryCatalog,
    /// iTunes Search
    SecondaryCatalog,
}

impl CoverSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthoritativeHint => "authoritative_hint",
            Self::PrimaryCatalog => "primary_catalog",
            Self::SecondaryCatalog => "secondary_catalog",
        }
    }
}

impl fmt::Display for CoverSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of the release a cover belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    /// Release (or track, for song searches) title
    pub title: String,
    /// Catalog identifier, when the catalog has one
    pub id: Option<String>,
    /// Credited artist
    pub artist: Option<String>,
    /// Release year as the catalog reports it
    pub year: Option<String>,
}

/// A successful catalog lookup: an artwork URL that has not been downloaded yet
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogMatch {
    pub cover_url: String,
    pub release: ReleaseInfo,
    pub confidence: MatchConfidence,
}

/// Errors that can occur while talking to a catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,
}
