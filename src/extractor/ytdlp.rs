//! yt-dlp backed extraction.
//!
//! Runs `yt-dlp -J` and maps its JSON (a single video, or a playlist with
//! `entries`) onto [`TrackMetadata`]. Structured music fields published by the
//! platform win over whatever the title parser guessed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use super::{Extraction, MediaExtractor, extract_video_id, fetch_hint, normalize_url, parse_title};
use crate::catalog::HttpClient;
use crate::error::{Error, Result};
use crate::metadata::{TrackMetadata, UNKNOWN_ARTIST, UNKNOWN_TITLE};
use crate::pipeline::RateLimiter;

/// Entries inspected by the album heuristics
const ALBUM_SAMPLE: usize = 10;
/// Playlist title words that suggest a release
const ALBUM_TITLE_WORDS: &[&str] = &["album", "lp", "ep", "single", "compilation"];

/// Subset of yt-dlp's info dict that we read
#[derive(Debug, Default, Deserialize)]
struct InfoDict {
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    url: Option<String>,
    thumbnail: Option<String>,
    release_year: Option<i32>,
    track: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    channel: Option<String>,
    channel_url: Option<String>,
    track_number: Option<u32>,
    playlist_index: Option<u32>,
    playlist_type: Option<String>,
    entries: Option<Vec<Option<InfoDict>>>,
}

/// Source page access for platform hints
struct PageHints {
    http: Arc<dyn HttpClient>,
    timeout: Duration,
    /// Spaces out page fetches across a playlist
    limiter: RateLimiter,
}

/// Extractor that shells out to yt-dlp
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
    hints: Option<PageHints>,
}

impl YtDlpExtractor {
    pub fn new(ytdlp_path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            hints: None,
        }
    }

    /// Also read album and cover hints from each track's page, fetching at
    /// most one page per `delay`
    pub fn with_hints(mut self, http: Arc<dyn HttpClient>, timeout: Duration, delay: Duration) -> Self {
        self.hints = Some(PageHints {
            http,
            timeout,
            limiter: RateLimiter::new(delay),
        });
        self
    }

    async fn run(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "Running yt-dlp extraction");
        let output = Command::new(&self.ytdlp_path)
            .args(["-J", "--skip-download", "--no-warnings", url])
            .output()
            .await
            .map_err(|e| {
                Error::extract(format!(
                    "failed to run {}: {}",
                    self.ytdlp_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extract(stderr.trim().to_string()));
        }
        Ok(output.stdout)
    }

    async fn apply_hints(&self, extraction: &mut Extraction) {
        let Some(hints) = &self.hints else {
            return;
        };

        for track in &mut extraction.tracks {
            let Some(page) = track.source_url.as_deref() else {
                continue;
            };
            hints.limiter.wait().await;
            let Some(hint) = fetch_hint(hints.http.as_ref(), page, hints.timeout).await else {
                continue;
            };
            if hint.cover_url.is_some() {
                track.authoritative_cover_url = hint.cover_url;
            }
            if track.album_name().is_none() {
                track.album = hint.album;
            }
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn extract(&self, url: &str) -> Result<Extraction> {
        let mut extraction = match self.run(url).await.and_then(|json| parse_output(url, &json)) {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::warn!(url, error = %e, "yt-dlp extraction failed");
                fallback(url, e)?
            }
        };

        self.apply_hints(&mut extraction).await;
        tracing::info!(
            url,
            tracks = extraction.tracks.len(),
            playlist = extraction.is_playlist,
            "Extracted metadata"
        );
        Ok(extraction)
    }
}

/// Placeholder track when yt-dlp can't read the URL but the video id is known
fn fallback(url: &str, error: Error) -> Result<Extraction> {
    let Some(id) = extract_video_id(url) else {
        return Err(error);
    };
    let source = normalize_url(url).map_or_else(|| url.to_string(), |u| u.to_string());
    let track = TrackMetadata {
        source_url: Some(source),
        ..TrackMetadata::new(format!("YouTube Video {}", id), UNKNOWN_ARTIST)
    };
    Ok(Extraction::single(url, track))
}

/// Map yt-dlp's `-J` output onto an extraction
fn parse_output(url: &str, json: &[u8]) -> Result<Extraction> {
    let info: InfoDict = serde_json::from_slice(json)
        .map_err(|e| Error::extract(format!("unreadable yt-dlp output: {}", e)))?;

    match info.entries {
        Some(ref entries) => Ok(playlist(url, &info, entries)),
        None => Ok(Extraction::single(url, track_from_info(&info))),
    }
}

fn playlist(url: &str, info: &InfoDict, entries: &[Option<InfoDict>]) -> Extraction {
    let entries: Vec<&InfoDict> = entries.iter().flatten().collect();
    let title = info.title.clone().unwrap_or_else(|| "Unknown Playlist".to_string());
    let is_album = is_album_playlist(info, &entries);
    let total = entries.len() as u32;

    let tracks = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut track = track_from_info(entry);
            track.track_number = Some(i as u32 + 1);
            track.total_tracks = Some(total);
            track
                .extra
                .insert("playlist_index".to_string(), entry.playlist_index.into());
            if is_album && track.album_name().is_none() {
                track.album = Some(title.clone());
            }
            track
        })
        .collect();

    Extraction {
        url: url.to_string(),
        tracks,
        is_playlist: true,
        is_album,
        playlist_title: Some(title),
        playlist_url: info.webpage_url.clone(),
    }
}

fn track_from_info(info: &InfoDict) -> TrackMetadata {
    let raw_title = info.title.clone().unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let parsed = parse_title(&raw_title);

    let artist = info
        .artist
        .clone()
        .or(parsed.artist)
        .or_else(|| info.uploader.clone())
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    let mut extra = BTreeMap::new();
    extra.insert("album".to_string(), Value::from(info.album.clone()));
    extra.insert("channel".to_string(), Value::from(info.channel.clone()));
    extra.insert("channel_url".to_string(), Value::from(info.channel_url.clone()));

    TrackMetadata {
        title: info.track.clone().unwrap_or(parsed.title),
        artist,
        album: info.album.clone(),
        year: info.release_year,
        duration: info.duration.map(|d| d.round() as u64),
        source_url: info.webpage_url.clone().or_else(|| info.url.clone()),
        thumbnail_url: info.thumbnail.clone(),
        original_title: Some(raw_title),
        extra,
        ..TrackMetadata::default()
    }
}

/// Does this playlist look like one release?
///
/// Any of: an explicit album type, one shared album name across more than
/// three entries, a release word in the title, or at least three sampled
/// entries numbered without gaps.
fn is_album_playlist(info: &InfoDict, entries: &[&InfoDict]) -> bool {
    if info.playlist_type.as_deref() == Some("album") {
        return true;
    }

    let sample = &entries[..entries.len().min(ALBUM_SAMPLE)];

    let mut albums: Vec<String> = sample
        .iter()
        .filter_map(|e| e.album.as_deref())
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    albums.sort();
    albums.dedup();
    if albums.len() == 1 && entries.len() > 3 {
        return true;
    }

    let title = info.title.as_deref().unwrap_or_default().to_lowercase();
    if ALBUM_TITLE_WORDS.iter().any(|word| title.contains(word)) {
        return true;
    }

    let mut numbers: Vec<u32> = sample
        .iter()
        .filter_map(|e| e.track_number.or(e.playlist_index))
        .filter(|n| *n > 0)
        .collect();
    if numbers.len() >= 3 {
        numbers.sort_unstable();
        return numbers.windows(2).all(|pair| pair[1] == pair[0] + 1);
    }

    false
}
