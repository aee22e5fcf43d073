//! Authoritative hints read from the video page itself.
//!
//! Music videos carry a "structured description" card in the page's initial
//! data blob: album title, artist line and the album artwork the platform
//! licensed for the track. Everything here is best effort, a page without the
//! card simply yields no hint.

use std::time::Duration;

use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::HttpClient;

/// Variable holding the page's initial data
const INITIAL_DATA_MARKER: &str = "ytInitialData";
/// Structured description card
const CARD_KEY: &str = "videoAttributeViewModel";
/// Dialog that sometimes spells out the album name
const ALBUM_LABEL_KEY: &str = "confirmDialogRenderer";

/// Album, artist and cover published alongside the track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformHint {
    pub album: Option<String>,
    pub artist: Option<String>,
    pub cover_url: Option<String>,
}

impl PlatformHint {
    pub fn is_empty(&self) -> bool {
        self.album.is_none() && self.artist.is_none() && self.cover_url.is_none()
    }
}

/// Fetch `page_url` and read its hint. Any failure means no hint.
pub async fn fetch_hint(
    http: &dyn HttpClient,
    page_url: &str,
    timeout: Duration,
) -> Option<PlatformHint> {
    let response = match http.get(page_url, timeout).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(url = page_url, error = %e, "Hint page unreachable");
            return None;
        }
    };
    if !response.is_success() {
        tracing::debug!(url = page_url, status = response.status, "Hint page unavailable");
        return None;
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            tracing::debug!(url = page_url, error = %e, "Hint page body unreadable");
            return None;
        }
    };

    let hint = parse_hint(&html);
    tracing::debug!(url = page_url, found = hint.is_some(), "Platform hint lookup");
    hint
}

/// Read the hint out of a page's HTML
pub fn parse_hint(html: &str) -> Option<PlatformHint> {
    let data = initial_data(html)?;
    let card = find_key(&data, CARD_KEY)?;

    let label = find_key(card, ALBUM_LABEL_KEY)
        .and_then(|dialog| dialog.get("title"))
        .and_then(text_of);

    let hint = PlatformHint {
        album: label.or_else(|| card.get("title").and_then(text_of)),
        artist: card.get("subtitle").and_then(text_of),
        cover_url: card
            .get("image")
            .and_then(|image| image.get("sources"))
            .and_then(largest_source),
    };

    (!hint.is_empty()).then_some(hint)
}

/// First JSON value assigned to the initial-data variable in any script
fn initial_data(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script").ok()?;

    document.select(&selector).find_map(|script| {
        let text: String = script.text().collect();
        let start = text.find(INITIAL_DATA_MARKER)? + INITIAL_DATA_MARKER.len();
        let after = &text[start..];
        let json = &after[after.find('=')? + 1..];

        // The assignment is followed by more script; read one value only
        serde_json::Deserializer::from_str(json)
            .into_iter::<Value>()
            .next()?
            .ok()
    })
}

/// Depth-first search for an object key
fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_key(v, key))),
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// Text in any of the shapes the page uses: plain string, `simpleText`,
/// `content`, or a list of `runs`
fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(s) = map.get("simpleText").or_else(|| map.get("content")) {
                s.as_str()?.to_string()
            } else {
                map.get("runs")?
                    .as_array()?
                    .iter()
                    .filter_map(|run| run.get("text")?.as_str())
                    .collect()
            }
        }
        _ => return None,
    };

    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// URL of the widest image source
fn largest_source(sources: &Value) -> Option<String> {
    sources
        .as_array()?
        .iter()
        .filter_map(|source| {
            let url = source.get("url")?.as_str()?;
            let width = source.get("width").and_then(Value::as_u64).unwrap_or(0);
            Some((width, url))
        })
        .max_by_key(|(width, _)| *width)
        .map(|(_, url)| absolute_url(url))
}

fn absolute_url(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}
