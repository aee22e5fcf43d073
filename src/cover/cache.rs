//! In-memory cover cache.
//!
//! Memoizes resolution results for the lifetime of a run so tracks that
//! share an album trigger one lookup between them. Keyed by the normalized
//! (artist, album) pair; the stored result keeps its downloaded bytes.

use std::collections::HashMap;

use super::CoverResult;

/// Joins artist and album in a key; never appears in real names
const KEY_SEPARATOR: char = '\u{1f}';

/// Cover cache keyed by normalized (artist, album)
#[derive(Debug, Default)]
pub struct CoverCache {
    entries: HashMap<String, CoverResult>,
}

impl CoverCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key: both fields trimmed and lower-cased
    pub fn key(artist: &str, album: &str) -> String {
        format!(
            "{}{}{}",
            artist.trim().to_lowercase(),
            KEY_SEPARATOR,
            album.trim().to_lowercase()
        )
    }

    pub fn get(&self, artist: &str, album: &str) -> Option<&CoverResult> {
        self.entries.get(&Self::key(artist, album))
    }

    pub fn contains(&self, artist: &str, album: &str) -> bool {
        self.entries.contains_key(&Self::key(artist, album))
    }

    pub fn set(&mut self, artist: &str, album: &str, result: CoverResult) {
        self.entries.insert(Self::key(artist, album), result);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
