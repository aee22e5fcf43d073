//! Tag writing for downloaded files.
//!
//! Uses lofty for format-independent tag access, so the same writer handles
//! whichever audio format the fetcher was asked to produce.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagExt};

use super::TrackMetadata;
use crate::cover::ImageFormat;
use crate::error::{Error, Result};

/// Embeds metadata and cover art into an audio file.
///
/// Implement this trait to record writes in tests.
pub trait TagWriter: Send + Sync {
    fn write_tags(&self, path: &Path, track: &TrackMetadata, cover: Option<&[u8]>) -> Result<()>;
}

/// Production writer backed by lofty
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagWriter;

impl TagWriter for LoftyTagWriter {
    fn write_tags(&self, path: &Path, track: &TrackMetadata, cover: Option<&[u8]>) -> Result<()> {
        let mut tagged_file = Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| Error::tag(path, e.to_string()))?;

        // Primary tag for the format, created if the file has none yet
        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| Error::tag(path, "no writable tag for this format"))?;

        tag.set_title(track.title.clone());
        tag.set_artist(track.artist.clone());
        if let Some(ref album) = track.album {
            tag.set_album(album.clone());
        }
        if let Some(ref genre) = track.genre {
            tag.set_genre(genre.clone());
        }
        if let Some(year) = track.year {
            tag.set_year(year as u32);
        }
        if let Some(track_number) = track.track_number {
            tag.set_track(track_number);
        }
        if let Some(total) = track.total_tracks {
            tag.set_track_total(total);
        }

        if let Some(data) = cover {
            tag.remove_picture_type(PictureType::CoverFront);
            tag.push_picture(front_cover(data));
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| Error::tag(path, e.to_string()))?;

        tracing::debug!(path = %path.display(), cover = cover.is_some(), "Tags written");
        Ok(())
    }
}

fn front_cover(data: &[u8]) -> Picture {
    let mime = match ImageFormat::sniff(data) {
        ImageFormat::Jpeg => MimeType::Jpeg,
        ImageFormat::Png => MimeType::Png,
        ImageFormat::Gif => MimeType::Gif,
    };
    Picture::new_unchecked(
        PictureType::CoverFront,
        Some(mime),
        Some("Cover".to_string()),
        data.to_vec(),
    )
}
