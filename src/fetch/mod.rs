//! Audio download and transcoding.
//!
//! The pipeline only needs "put audio for this URL at this path"; the
//! production [`YtDlpFetcher`] asks yt-dlp to grab the best audio stream and
//! convert it with ffmpeg.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::{DownloadConfig, OutputConfig};
use crate::error::{Error, Result};

/// Produces an audio file for a source URL.
///
/// Implement this trait to record fetches in tests.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Write audio for `url` to `output`. The extension of `output` is the
    /// target format.
    async fn fetch(&self, url: &str, output: &Path) -> Result<()>;
}

/// Fetcher that runs yt-dlp with ffmpeg post-processing
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    ytdlp_path: PathBuf,
    audio_format: String,
    audio_quality: String,
}

impl YtDlpFetcher {
    pub fn new(
        ytdlp_path: impl Into<PathBuf>,
        audio_format: impl Into<String>,
        audio_quality: impl Into<String>,
    ) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            audio_format: audio_format.into(),
            audio_quality: audio_quality.into(),
        }
    }

    pub fn from_config(output: &OutputConfig, download: &DownloadConfig) -> Self {
        Self::new(
            download.ytdlp_path.clone(),
            output.audio_format.clone(),
            output.audio_quality.clone(),
        )
    }

    /// yt-dlp arguments for one fetch
    fn args(&self, url: &str, output: &Path) -> Vec<OsString> {
        // yt-dlp picks the extension itself, so hand it the stem
        let mut template = output.with_extension("").into_os_string();
        template.push(".%(ext)s");

        vec![
            "-f".into(),
            "bestaudio/best".into(),
            "-x".into(),
            "--audio-format".into(),
            self.audio_format.clone().into(),
            "--audio-quality".into(),
            self.audio_quality.clone().into(),
            "--no-playlist".into(),
            "--force-overwrites".into(),
            "--no-warnings".into(),
            "-o".into(),
            template,
            // Whatever follows is the URL, even if it starts with '-'
            "--".into(),
            url.into(),
        ]
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(&self, url: &str, output: &Path) -> Result<()> {
        tracing::debug!(url, output = %output.display(), "Fetching audio");

        let result = Command::new(&self.ytdlp_path)
            .args(self.args(url, output))
            .output()
            .await
            .map_err(|e| Error::fetch(format!("failed to run {}: {}", self.ytdlp_path.display(), e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = match stderr.trim() {
                "" => format!("yt-dlp exited with {}", result.status),
                trimmed => trimmed.to_string(),
            };
            return Err(Error::fetch(message));
        }

        Ok(())
    }
}
