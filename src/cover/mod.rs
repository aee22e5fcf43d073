//! Cover art resolution and caching.
//!
//! This module provides a unified interface for resolving album cover art from
//! multiple sources with proper priority ordering:
//!
//! 1. **Authoritative hint** - Cover published on the track's own page
//! 2. **MusicBrainz + Cover Art Archive** - Open catalog
//! 3. **iTunes Search** - Commercial catalog
//!
//! Missing art is fine: resolution always yields a [`CoverResult`], a miss is
//! just `success == false` with a reason.

mod cache;
mod download;
mod resolver;

pub use cache::CoverCache;
pub use download::CoverDownloader;
pub use resolver::{Attempt, CoverResolver, CoverStrategy};

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{CoverSource, MatchConfidence, ReleaseInfo};

/// Outcome of one cover resolution.
///
/// Built through [`CoverResult::found`], [`CoverResult::miss`] and
/// [`CoverResult::failure`] so image bytes only ever travel with a success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverResult {
    pub success: bool,
    pub cover_url: Option<String>,
    #[serde(skip)]
    pub cover_data: Option<Arc<[u8]>>,
    pub release_info: Option<ReleaseInfo>,
    pub error: Option<String>,
    pub source: Option<CoverSource>,
    pub confidence: MatchConfidence,
}

impl CoverResult {
    /// A validated, downloaded cover
    pub fn found(
        source: CoverSource,
        cover_url: impl Into<String>,
        data: Vec<u8>,
        release_info: Option<ReleaseInfo>,
        confidence: MatchConfidence,
    ) -> Self {
        Self {
            success: true,
            cover_url: Some(cover_url.into()),
            cover_data: Some(data.into()),
            release_info,
            error: None,
            source: Some(source),
            confidence,
        }
    }

    /// Nothing usable was found
    pub fn miss(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            cover_url: None,
            cover_data: None,
            release_info: None,
            error: Some(reason.into()),
            source: None,
            confidence: MatchConfidence::None,
        }
    }

    /// Resolution broke unexpectedly
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            confidence: MatchConfidence::Error,
            ..Self::miss(reason)
        }
    }

    /// Image bytes, present only on success
    pub fn data(&self) -> Option<&[u8]> {
        self.cover_data.as_deref()
    }
}

/// Image container detected from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Detect the format; anything unrecognized is assumed to be JPEG.
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Self::Png
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Jpeg
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_carries_no_bytes() {
        let miss = CoverResult::miss("No album cover found");
        assert!(!miss.success);
        assert!(miss.data().is_none());
        assert_eq!(miss.confidence, MatchConfidence::None);

        let failure = CoverResult::failure("boom");
        assert!(!failure.success);
        assert!(failure.data().is_none());
        assert_eq!(failure.confidence, MatchConfidence::Error);
    }

    #[test]
    fn test_found_carries_bytes() {
        let found = CoverResult::found(
            CoverSource::SecondaryCatalog,
            "https://img.test/a.jpg",
            vec![0xff, 0xd8, 0xff],
            None,
            MatchConfidence::Partial,
        );
        assert!(found.success);
        assert_eq!(found.data(), Some(&[0xff, 0xd8, 0xff][..]));
        assert_eq!(found.source, Some(CoverSource::SecondaryCatalog));
    }

    #[test]
    fn test_sniff_image_format() {
        assert_eq!(ImageFormat::sniff(&[0xff, 0xd8, 0xff, 0xe0]), ImageFormat::Jpeg);
        assert_eq!(
            ImageFormat::sniff(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a]),
            ImageFormat::Png
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::sniff(b""), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
        assert_eq!(ImageFormat::Gif.extension(), "gif");
    }

    #[test]
    fn test_serialized_result_omits_bytes() {
        let found = CoverResult::found(
            CoverSource::PrimaryCatalog,
            "https://img.test/a.jpg",
            vec![1, 2, 3],
            None,
            MatchConfidence::Exact,
        );
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["source"], "primary_catalog");
        assert_eq!(json["confidence"], "exact");
        assert!(json.get("cover_data").is_none());
    }
}
