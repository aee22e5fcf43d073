//! Track metadata as extracted from the video platform.
//!
//! # Features
//! - [`TrackMetadata`] record shared by the extractor, pipeline and cover resolver
//! - Cleaning (trim, placeholders, range checks) before jobs are built
//! - Display rows for the CLI

pub mod tags;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use tags::{LoftyTagWriter, TagWriter};

/// Placeholder used when a track has no usable title
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Placeholder used when a track has no usable artist
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;
const TRACK_RANGE: std::ops::RangeInclusive<u32> = 1..=999;

/// One track's descriptive fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub track_number: Option<u32>,
    pub total_tracks: Option<u32>,
    /// Duration in seconds
    pub duration: Option<u64>,
    /// Watch URL the audio is fetched from
    pub source_url: Option<String>,
    /// Cover URL published by the platform itself for this track
    pub authoritative_cover_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Video title before artist/title splitting
    pub original_title: Option<String>,
    /// Unselected tracks are skipped when jobs are built
    #[serde(default = "default_selected")]
    pub selected: bool,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_selected() -> bool {
    true
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            album: None,
            genre: None,
            year: None,
            track_number: None,
            total_tracks: None,
            duration: None,
            source_url: None,
            authoritative_cover_url: None,
            thumbnail_url: None,
            original_title: None,
            selected: true,
            extra: BTreeMap::new(),
        }
    }
}

impl TrackMetadata {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Default::default()
        }
    }

    /// Album name if one is set and non-blank
    pub fn album_name(&self) -> Option<&str> {
        self.album.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

/// Return a sanitized copy of `track`.
///
/// Strings are trimmed, a blank title/artist becomes a placeholder, blank
/// optional strings become `None`, and out-of-range year or track numbers are
/// dropped. `default_genre` fills a missing genre.
pub fn clean_track(track: &TrackMetadata, default_genre: Option<&str>) -> TrackMetadata {
    TrackMetadata {
        title: clean_required(&track.title, UNKNOWN_TITLE),
        artist: clean_required(&track.artist, UNKNOWN_ARTIST),
        album: clean_optional(track.album.as_deref()),
        genre: clean_optional(track.genre.as_deref())
            .or_else(|| clean_optional(default_genre)),
        year: track.year.filter(|y| YEAR_RANGE.contains(y)),
        track_number: track.track_number.filter(|n| TRACK_RANGE.contains(n)),
        total_tracks: track.total_tracks.filter(|n| TRACK_RANGE.contains(n)),
        duration: track.duration,
        source_url: clean_optional(track.source_url.as_deref()),
        authoritative_cover_url: clean_optional(track.authoritative_cover_url.as_deref()),
        thumbnail_url: track.thumbnail_url.clone(),
        original_title: track.original_title.clone(),
        selected: track.selected,
        extra: track.extra.clone(),
    }
}

fn clean_required(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Display rows for a track, in presentation order
pub fn format_track_info(track: &TrackMetadata) -> Vec<(&'static str, String)> {
    const NOT_SET: &str = "Not set";

    let track_pos = match (track.track_number, track.total_tracks) {
        (Some(n), Some(total)) => format!("{}/{}", n, total),
        _ => NOT_SET.to_string(),
    };

    vec![
        ("Title", track.title.clone()),
        ("Artist", track.artist.clone()),
        ("Album", track.album.clone().unwrap_or_else(|| NOT_SET.into())),
        ("Genre", track.genre.clone().unwrap_or_else(|| NOT_SET.into())),
        (
            "Year",
            track
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| NOT_SET.into()),
        ),
        ("Track", track_pos),
        ("Duration", format_duration(track.duration)),
    ]
}

/// Seconds as MM:SS, "Unknown" when absent or zero
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        Some(secs) if secs > 0 => format!("{:02}:{:02}", secs / 60, secs % 60),
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_drops_out_of_range_values() {
        let raw = TrackMetadata {
            title: "Song".into(),
            artist: "".into(),
            year: Some(1899),
            track_number: Some(0),
            total_tracks: Some(1000),
            ..Default::default()
        };

        let cleaned = clean_track(&raw, None);
        assert_eq!(cleaned.year, None);
        assert_eq!(cleaned.track_number, None);
        assert_eq!(cleaned.total_tracks, None);
        assert_eq!(cleaned.artist, UNKNOWN_ARTIST);
        assert_eq!(cleaned.title, "Song");
    }

    #[test]
    fn test_clean_keeps_valid_values() {
        let raw = TrackMetadata {
            title: "  Song  ".into(),
            artist: " Artist ".into(),
            album: Some(" Album ".into()),
            year: Some(2100),
            track_number: Some(999),
            ..Default::default()
        };

        let cleaned = clean_track(&raw, None);
        assert_eq!(cleaned.title, "Song");
        assert_eq!(cleaned.artist, "Artist");
        assert_eq!(cleaned.album.as_deref(), Some("Album"));
        assert_eq!(cleaned.year, Some(2100));
        assert_eq!(cleaned.track_number, Some(999));
    }

    #[test]
    fn test_clean_blank_optionals_and_default_genre() {
        let raw = TrackMetadata {
            album: Some("   ".into()),
            ..TrackMetadata::new("", "Artist")
        };

        let cleaned = clean_track(&raw, Some("Rock"));
        assert_eq!(cleaned.title, UNKNOWN_TITLE);
        assert_eq!(cleaned.album, None);
        assert_eq!(cleaned.genre.as_deref(), Some("Rock"));

        let own_genre = TrackMetadata {
            genre: Some("Jazz".into()),
            ..raw
        };
        assert_eq!(clean_track(&own_genre, Some("Rock")).genre.as_deref(), Some("Jazz"));
    }

    #[test]
    fn test_clean_preserves_selection_and_hint() {
        let raw = TrackMetadata {
            selected: false,
            authoritative_cover_url: Some("https://img.test/cover.jpg".into()),
            ..TrackMetadata::new("Song", "Artist")
        };

        let cleaned = clean_track(&raw, None);
        assert!(!cleaned.selected);
        assert_eq!(
            cleaned.authoritative_cover_url.as_deref(),
            Some("https://img.test/cover.jpg")
        );
    }

    #[test]
    fn test_album_name_ignores_blank() {
        let mut track = TrackMetadata::new("Song", "Artist");
        assert_eq!(track.album_name(), None);
        track.album = Some("  ".into());
        assert_eq!(track.album_name(), None);
        track.album = Some(" B ".into());
        assert_eq!(track.album_name(), Some("B"));
    }

    #[test]
    fn test_format_track_info() {
        let track = TrackMetadata {
            track_number: Some(3),
            total_tracks: Some(12),
            duration: Some(215),
            year: Some(1999),
            ..TrackMetadata::new("Song", "Artist")
        };

        let rows = format_track_info(&track);
        let labels: Vec<_> = rows.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            ["Title", "Artist", "Album", "Genre", "Year", "Track", "Duration"]
        );
        assert_eq!(rows[2].1, "Not set");
        assert_eq!(rows[4].1, "1999");
        assert_eq!(rows[5].1, "3/12");
        assert_eq!(rows[6].1, "03:35");
    }

    #[test]
    fn test_format_track_position_needs_both() {
        let track = TrackMetadata {
            track_number: Some(3),
            ..TrackMetadata::new("Song", "Artist")
        };
        assert_eq!(format_track_info(&track)[5].1, "Not set");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "Unknown");
        assert_eq!(format_duration(Some(0)), "Unknown");
        assert_eq!(format_duration(Some(59)), "00:59");
        assert_eq!(format_duration(Some(3600)), "60:00");
    }

    #[test]
    fn test_deserialize_defaults_selected() {
        let track: TrackMetadata = serde_json::from_str(
            r#"{"title":"Song","artist":"Artist","album":null,"genre":null,"year":null,
                "track_number":null,"total_tracks":null,"duration":null,"source_url":null,
                "authoritative_cover_url":null,"thumbnail_url":null,"original_title":null}"#,
        )
        .unwrap();
        assert!(track.selected);
        assert!(track.extra.is_empty());
    }
}
