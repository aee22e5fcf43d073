//! Track metadata extraction from video URLs.
//!
//! The [`MediaExtractor`] trait hides the extraction backend; the production
//! implementation shells out to yt-dlp (see [`ytdlp`]). Title parsing and URL
//! helpers live here because they don't depend on the backend.

pub mod hint;
pub mod ytdlp;

pub use hint::{PlatformHint, fetch_hint};
pub use ytdlp::YtDlpExtractor;

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;

use crate::error::Result;
use crate::metadata::TrackMetadata;

/// What a URL turned out to contain
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// URL that was extracted
    pub url: String,
    pub tracks: Vec<TrackMetadata>,
    pub is_playlist: bool,
    /// Playlist heuristics concluded this is one album
    pub is_album: bool,
    pub playlist_title: Option<String>,
    pub playlist_url: Option<String>,
}

impl Extraction {
    /// A single video
    pub fn single(url: impl Into<String>, track: TrackMetadata) -> Self {
        Self {
            url: url.into(),
            tracks: vec![track],
            is_playlist: false,
            is_album: false,
            playlist_title: None,
            playlist_url: None,
        }
    }
}

/// Turns a URL into raw track records.
///
/// Implement this trait to script extraction in tests.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Extraction>;
}

// ============================================================================
// Title parsing
// ============================================================================

/// First word of a promotional parenthetical, e.g. "(Official Video)"
const PROMO_QUALIFIERS: &[&str] = &["official", "music", "lyric", "audio", "hd", "4k"];
/// Remainder of a promotional parenthetical
const PROMO_KINDS: &[&str] = &["video", "audio", "music video", "lyric video"];

/// Separators between artist and title, tried in order
const TITLE_SEPARATORS: &[char] = &['-', '–', '|', ':'];

/// Longest artist part, in words, before the parts are assumed swapped
const MAX_ARTIST_WORDS: usize = 3;

/// Artist/title split of a video title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub artist: Option<String>,
    pub title: String,
}

/// Remove "(Official Video)"-style tags and anything after a pipe.
pub fn clean_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut rest = title;

    while let Some(open) = rest.find('(') {
        let after = &rest[open + 1..];
        match after.find(')') {
            Some(close) if is_promo_tag(&after[..close]) => {
                out.push_str(rest[..open].trim_end());
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);

    let head = match out.find('|') {
        Some(pipe) => &out[..pipe],
        None => &out,
    };
    head.trim().to_string()
}

fn is_promo_tag(inner: &str) -> bool {
    let lower = inner.to_lowercase();
    let mut words = lower.split_whitespace();
    let Some(qualifier) = words.next() else {
        return false;
    };
    let kind = words.collect::<Vec<_>>().join(" ");
    PROMO_QUALIFIERS.contains(&qualifier) && PROMO_KINDS.contains(&kind.as_str())
}

/// Split "Artist - Title" (or "Title - Artist") after cleaning.
///
/// The first separator present wins and splits once. A first part of at most
/// three words is taken as the artist; otherwise the parts are swapped.
pub fn parse_title(title: &str) -> ParsedTitle {
    let clean = clean_title(title);

    for sep in TITLE_SEPARATORS {
        if let Some((first, second)) = clean.split_once(*sep) {
            let (first, second) = (first.trim(), second.trim());
            return if first.split_whitespace().count() <= MAX_ARTIST_WORDS {
                ParsedTitle {
                    artist: Some(first.to_string()),
                    title: second.to_string(),
                }
            } else {
                ParsedTitle {
                    artist: Some(second.to_string()),
                    title: first.to_string(),
                }
            };
        }
    }

    ParsedTitle {
        artist: None,
        title: clean,
    }
}

// ============================================================================
// URL helpers
// ============================================================================

/// Parse a URL, assuming https when no scheme is given
pub fn normalize_url(input: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.contains("://") {
        Url::parse(input).ok()
    } else {
        Url::parse(&format!("https://{}", input)).ok()
    }
}

/// youtube.com, any subdomain of it, or youtu.be
pub fn is_youtube_url(input: &str) -> bool {
    let Some(url) = normalize_url(input) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    url.host_str().is_some_and(|host| {
        let host = host.to_lowercase();
        host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com")
    })
}

const VIDEO_ID_LEN: usize = 11;
const VIDEO_ID_MARKERS: &[&str] = &["youtube.com/watch?v=", "youtu.be/", "youtube.com/embed/", "youtube.com/v/"];

/// The 11-character video id in a watch, short, embed or /v/ URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_MARKERS.iter().find_map(|marker| {
        let start = url.find(marker)? + marker.len();
        let id: String = url[start..]
            .chars()
            .take(VIDEO_ID_LEN)
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        (id.len() == VIDEO_ID_LEN).then_some(id)
    })
}
