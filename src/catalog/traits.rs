//! Trait definitions for catalog sources.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the MusicBrainz and iTunes adapters, while tests
//! can substitute mock implementations that count calls.

use async_trait::async_trait;

use super::domain::{CatalogError, CatalogMatch, CoverSource};
use crate::metadata::TrackMetadata;

/// A remote catalog that can locate artwork for a track.
///
/// Both operations return the artwork URL only; downloading and validating
/// the image is the resolver's job.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Which source tag results from this catalog carry
    fn source(&self) -> CoverSource;

    /// Resolve artwork for a track whose album is known.
    async fn resolve_with_album(
        &self,
        track: &TrackMetadata,
    ) -> Result<CatalogMatch, CatalogError>;

    /// Resolve artwork from artist and title alone.
    async fn resolve_by_track_only(
        &self,
        track: &TrackMetadata,
    ) -> Result<CatalogMatch, CatalogError>;
}
