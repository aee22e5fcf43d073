//! One-off cover resolution.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::cover::{CoverResult, ImageFormat};
use crate::metadata::TrackMetadata;
use crate::pipeline::DownloadPipeline;

/// What to look up
#[derive(Debug, Default, Clone, Copy)]
pub struct CoverQuery<'a> {
    pub artist: &'a str,
    pub album: Option<&'a str>,
    pub title: Option<&'a str>,
    pub hint_url: Option<&'a str>,
}

impl CoverQuery<'_> {
    fn to_track(self) -> TrackMetadata {
        TrackMetadata {
            album: self.album.map(String::from),
            authoritative_cover_url: self.hint_url.map(String::from),
            ..TrackMetadata::new(self.title.unwrap_or_default(), self.artist)
        }
    }
}

/// Resolve a cover through the same cascade downloads use
pub fn cmd_cover(
    rt: &Runtime,
    config: &Config,
    query: CoverQuery<'_>,
    save: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let track = query.to_track();

    let result = rt.block_on(async {
        let pipeline = DownloadPipeline::from_config(config)?;
        anyhow::Ok(pipeline.resolve_cover(&track).await)
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in describe(&result) {
            println!("{}", line);
        }
    }

    let (Some(path), Some(data)) = (save, result.data()) else {
        if !result.success {
            anyhow::bail!("No cover found");
        }
        return Ok(());
    };

    let path = with_image_extension(path, ImageFormat::sniff(data));
    std::fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
    if !json {
        println!("Saved: {}", path.display());
    }
    Ok(())
}

fn describe(result: &CoverResult) -> Vec<String> {
    if !result.success {
        return vec![format!(
            "No cover: {}",
            result.error.as_deref().unwrap_or("unknown reason")
        )];
    }

    let mut lines = Vec::new();
    if let Some(source) = result.source {
        lines.push(format!("Source:     {}", source));
    }
    lines.push(format!("Confidence: {}", result.confidence));
    if let Some(ref url) = result.cover_url {
        lines.push(format!("URL:        {}", url));
    }
    if let Some(ref release) = result.release_info {
        let mut release_line = format!("Release:    {}", release.title);
        if let Some(ref artist) = release.artist {
            release_line.push_str(&format!(" by {}", artist));
        }
        if let Some(ref year) = release.year {
            release_line.push_str(&format!(" ({})", year));
        }
        lines.push(release_line);
    }
    if let Some(data) = result.data() {
        let format = ImageFormat::sniff(data);
        lines.push(format!("Image:      {} bytes, {}", data.len(), format.mime_type()));
    }
    lines
}

/// Keep an explicit extension, otherwise add the detected one
fn with_image_extension(path: &Path, format: ImageFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CoverSource, MatchConfidence, ReleaseInfo};

    #[test]
    fn test_query_to_track() {
        let track = CoverQuery {
            artist: "Radiohead",
            album: Some("OK Computer"),
            hint_url: Some("https://lh3.example.com/art.jpg"),
            ..Default::default()
        }
        .to_track();

        assert_eq!(track.artist, "Radiohead");
        assert_eq!(track.title, "");
        assert_eq!(track.album_name(), Some("OK Computer"));
        assert_eq!(
            track.authoritative_cover_url.as_deref(),
            Some("https://lh3.example.com/art.jpg")
        );
    }

    #[test]
    fn test_describe_found() {
        let result = CoverResult::found(
            CoverSource::SecondaryCatalog,
            "https://is1.example.com/600x600bb.jpg",
            vec![0x89, b'P', b'N', b'G', 0, 0],
            Some(ReleaseInfo {
                title: "OK Computer".into(),
                artist: Some("Radiohead".into()),
                year: Some("1997".into()),
                id: None,
            }),
            MatchConfidence::Exact,
        );

        let lines = describe(&result);
        assert_eq!(lines[0], "Source:     secondary_catalog");
        assert_eq!(lines[1], "Confidence: exact");
        assert_eq!(lines[3], "Release:    OK Computer by Radiohead (1997)");
        assert_eq!(lines[4], "Image:      6 bytes, image/png");
    }

    #[test]
    fn test_describe_miss() {
        let lines = describe(&CoverResult::miss("No album cover found"));
        assert_eq!(lines, vec!["No cover: No album cover found".to_string()]);
    }

    #[test]
    fn test_with_image_extension() {
        assert_eq!(
            with_image_extension(Path::new("/tmp/cover"), ImageFormat::Png),
            PathBuf::from("/tmp/cover.png")
        );
        assert_eq!(
            with_image_extension(Path::new("/tmp/cover.jpeg"), ImageFormat::Png),
            PathBuf::from("/tmp/cover.jpeg")
        );
    }
}
