//! Output path construction: template rendering, sanitization and collision
//! resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::metadata::{TrackMetadata, UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// Used when a template renders to nothing
const EMPTY_RENDER: &str = "Track";
/// Used when sanitization leaves nothing
const EMPTY_NAME: &str = "untitled";

/// Characters most filesystems reject
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Render a filename template against a track.
///
/// Placeholders: `{artist}` `{title}` `{album}` `{year}` `{track_number}`
/// `{total_tracks}`. Missing values render empty, unknown placeholders are
/// dropped. Only the template is scanned: braces inside track values are
/// copied as-is.
pub fn render_filename(template: &str, track: &TrackMetadata) -> String {
    let mut rendered = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder_name(&after[..close]) => {
                if let Some(value) = placeholder_value(&after[..close], track) {
                    rendered.push_str(&value);
                }
                rest = &after[close + 1..];
            }
            _ => {
                rendered.push('{');
                rest = after;
            }
        }
    }
    rendered.push_str(rest);

    let rendered = rendered.trim();
    if rendered.is_empty() {
        EMPTY_RENDER.to_string()
    } else {
        rendered.to_string()
    }
}

/// Value for a known placeholder, `None` for unknown names
fn placeholder_value(name: &str, track: &TrackMetadata) -> Option<String> {
    let number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
    let non_blank = |value: &str, fallback: &str| {
        if value.trim().is_empty() {
            fallback.to_string()
        } else {
            value.to_string()
        }
    };

    let value = match name {
        "artist" => non_blank(&track.artist, UNKNOWN_ARTIST),
        "title" => non_blank(&track.title, UNKNOWN_TITLE),
        "album" => track.album.clone().unwrap_or_default(),
        "year" => track.year.map(|y| y.to_string()).unwrap_or_default(),
        "track_number" => number(track.track_number),
        "total_tracks" => number(track.total_tracks),
        _ => return None,
    };
    Some(value)
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Make a string safe to use as a single path component.
///
/// Invalid and non-word characters become `_` (letters, digits, `_`,
/// whitespace, `-` and `.` survive), then leading/trailing spaces and dots are
/// stripped. Never returns an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) {
                '_'
            } else if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.is_empty() {
        EMPTY_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// First free `dir/stem.ext`, then `dir/stem (1).ext`, `dir/stem (2).ext`...
///
/// A path is taken if it is in `reserved` (earlier jobs of the same batch) or
/// already exists on disk.
pub fn unique_path(dir: &Path, stem: &str, extension: &str, reserved: &HashSet<PathBuf>) -> PathBuf {
    let taken = |path: &Path| reserved.contains(path) || path.exists();

    let candidate = dir.join(format!("{}.{}", stem, extension));
    if !taken(&candidate) {
        return candidate;
    }

    (1u32..)
        .map(|n| dir.join(format!("{} ({}).{}", stem, n, extension)))
        .find(|path| !taken(path))
        .unwrap_or(candidate)
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Sanitized names are a single, non-empty path component
        #[test]
        fn sanitize_yields_single_component(input in ".{0,60}") {
            let sanitized = sanitize_filename(&input);
            prop_assert!(!sanitized.is_empty());
            for c in INVALID_CHARS {
                prop_assert!(!sanitized.contains(*c), "Found {} in: {}", c, sanitized);
            }
            prop_assert!(!sanitized.starts_with('.') && !sanitized.ends_with('.'));
            prop_assert!(!sanitized.starts_with(' ') && !sanitized.ends_with(' '));
        }

        /// Sanitizing twice changes nothing
        #[test]
        fn sanitize_is_idempotent(input in ".{0,60}") {
            let once = sanitize_filename(&input);
            prop_assert_eq!(sanitize_filename(&once), once);
        }

        /// Rendered names never come out blank
        #[test]
        fn render_never_blank(template in "[{}a-z _-]{0,30}", title in ".{0,20}") {
            let track = TrackMetadata::new(title, "Artist");
            prop_assert!(!render_filename(&template, &track).trim().is_empty());
        }

        /// Titles come through the default template unchanged
        #[test]
        fn render_copies_title_verbatim(title in ".{0,30}") {
            prop_assume!(!title.trim().is_empty());
            let track = TrackMetadata::new(title.clone(), "Artist");
            let expected = format!("Artist - {}", title);
            prop_assert_eq!(render_filename("{artist} - {title}", &track), expected.trim());
        }

        /// Placeholder-looking text in any field survives rendering
        #[test]
        fn render_never_rewrites_values(
            artist in "[a-z ]{0,5}\\{[a-z_]{1,12}\\}[a-z ]{0,5}",
            album in "[a-z{} ]{0,12}",
        ) {
            let track = TrackMetadata {
                album: Some(album.clone()),
                ..TrackMetadata::new("Song", artist.clone())
            };
            let rendered = render_filename("{artist}|{album}|{title}", &track);
            let expected = format!("{}|{}|Song", artist, album);
            prop_assert_eq!(rendered, expected.trim());
        }
    }
}
