//! Download and inspect commands.

use anyhow::{Context, bail};
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::error::Error;
use crate::extractor::{is_youtube_url, normalize_url};
use crate::metadata::format_track_info;
use crate::pipeline::{DownloadOutcome, DownloadPipeline, JobStatus, ProgressEvent};

/// Accept only YouTube URLs; returns the URL with a scheme
pub fn validate_url(input: &str) -> anyhow::Result<String> {
    if !is_youtube_url(input) {
        bail!("Not a YouTube URL: {}", input.trim());
    }
    normalize_url(input)
        .map(|url| url.to_string())
        .with_context(|| format!("Invalid URL: {}", input.trim()))
}

/// Extract, build jobs and download everything the URL points at
pub fn cmd_download(rt: &Runtime, config: &Config, url: &str, json: bool) -> anyhow::Result<()> {
    let url = validate_url(url)?;

    rt.block_on(async {
        let pipeline = std::sync::Arc::new(DownloadPipeline::from_config(config)?);

        let extraction = pipeline.extract(&url).await?;
        if !json {
            match extraction.playlist_title {
                Some(ref title) => println!("Playlist: {} ({} tracks)", title, extraction.tracks.len()),
                None => println!("Found {} track(s)", extraction.tracks.len()),
            }
        }

        let jobs = pipeline.create_jobs(
            &extraction.tracks,
            &config.output.directory,
            extraction.playlist_title.as_deref(),
        )?;

        let (mut progress, handle) = pipeline.spawn_download(jobs);
        while let Some(event) = progress.recv().await {
            if !json {
                println!("{}", progress_line(&event));
            }
        }
        let outcomes = handle.await.map_err(|e| Error::Worker(e.to_string()))?;

        if json {
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        } else {
            println!();
            for line in summary_lines(&outcomes) {
                println!("{}", line);
            }
        }

        let failed = outcomes.iter().filter(|o| !o.success).count();
        if failed > 0 {
            bail!("{} of {} downloads failed", failed, outcomes.len());
        }
        Ok(())
    })
}

/// Print the cleaned metadata for a URL
pub fn cmd_inspect(rt: &Runtime, config: &Config, url: &str, json: bool) -> anyhow::Result<()> {
    let url = validate_url(url)?;

    rt.block_on(async {
        let pipeline = DownloadPipeline::from_config(config)?;
        let extraction = pipeline.extract(&url).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&extraction)?);
            return Ok(());
        }

        if let Some(ref title) = extraction.playlist_title {
            let kind = if extraction.is_album { "Album" } else { "Playlist" };
            println!("{}: {}", kind, title);
            println!();
        }

        for (i, track) in extraction.tracks.iter().enumerate() {
            println!("Track {}", i + 1);
            for (label, value) in format_track_info(track) {
                println!("  {:<8} {}", format!("{}:", label), value);
            }
            if let Some(ref cover) = track.authoritative_cover_url {
                println!("  {:<8} {}", "Cover:", cover);
            }
            println!();
        }
        Ok(())
    })
}

/// One progress line, e.g. `[1/3] in_progress Artist - Title`
fn progress_line(event: &ProgressEvent) -> String {
    let mut line = format!(
        "[{}/{}] {:<11} {} - {}",
        event.index,
        event.total,
        event.status.as_str(),
        event.artist,
        event.title
    );
    if event.status == JobStatus::Error {
        if let Some(ref error) = event.error {
            line.push_str(&format!(" ({})", error));
        }
    }
    line
}

/// Final report: one line per job, then totals
fn summary_lines(outcomes: &[DownloadOutcome]) -> Vec<String> {
    let mut lines: Vec<String> = outcomes
        .iter()
        .map(|outcome| {
            if !outcome.success {
                let error = outcome.error.as_deref().unwrap_or("unknown error");
                return format!("✗ {} - {}", outcome.job.metadata.title, error);
            }

            let cover = match (outcome.cover_success, outcome.cover_source) {
                (true, Some(source)) => format!(
                    "cover: {} ({})",
                    source,
                    outcome
                        .cover_confidence
                        .map(|c| c.to_string())
                        .unwrap_or_default()
                ),
                _ => "no cover".to_string(),
            };
            format!("✓ {} [{}]", outcome.job.output_path.display(), cover)
        })
        .collect();

    let succeeded = outcomes.iter().filter(|o| o.success).count();
    let covers = outcomes.iter().filter(|o| o.cover_success).count();
    lines.push(format!(
        "Completed: {} successful, {} errors, {} with cover art",
        succeeded,
        outcomes.len() - succeeded,
        covers
    ));
    lines
}
