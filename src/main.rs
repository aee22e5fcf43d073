//! tunegrab - Download YouTube audio as tagged files with album art.
//!
//! A URL is expanded into tracks by yt-dlp, each track's metadata is cleaned,
//! and every download is tagged with a cover found on the video's own page,
//! on MusicBrainz + Cover Art Archive, or on iTunes.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod cover;
pub mod error;
pub mod extractor;
pub mod fetch;
pub mod metadata;
pub mod pipeline;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so --json output on stdout stays parseable
    let level = if args.verbose { "tunegrab=debug" } else { "tunegrab=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    cli::run_command(&args)
}
