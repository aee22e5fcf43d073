//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `download`: extraction, job creation and batch download
//! - `cover`: one-off cover resolution
//! - `settings`: config file inspection and initialization

mod cover;
mod download;
mod settings;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use cover::{CoverQuery, cmd_cover};
use download::{cmd_download, cmd_inspect};
use settings::cmd_config;

use crate::config::{self, Config, Overrides};

/// tunegrab CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "TUNEGRAB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Download a video or playlist as tagged audio files
    Download {
        /// YouTube video or playlist URL
        url: String,
        #[command(flatten)]
        overrides: OverrideArgs,
        /// Print outcomes as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
    /// Show the metadata that would be used, without downloading
    Inspect {
        /// YouTube video or playlist URL
        url: String,
        /// Default genre for tracks without one
        #[arg(long)]
        genre: Option<String>,
        /// Print the extraction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve album art for an artist/album (or artist/title)
    Cover {
        /// Artist name
        #[arg(long)]
        artist: String,
        /// Album name
        #[arg(long)]
        album: Option<String>,
        /// Track title, used when no album is given
        #[arg(long)]
        title: Option<String>,
        /// Cover URL to try before any catalog
        #[arg(long)]
        hint_url: Option<String>,
        /// Write the image to this file
        #[arg(long)]
        save: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the config file location and effective settings
    Config {
        /// Write a config file with default settings
        #[arg(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,
    },
}

/// Per-run overrides of the config file
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Base output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Filename template, e.g. "{artist} - {title}"
    #[arg(short, long)]
    pub template: Option<String>,
    /// Seconds to wait between downloads
    #[arg(long)]
    pub rate_limit: Option<f64>,
    /// Default genre for tracks without one
    #[arg(long)]
    pub genre: Option<String>,
    /// Audio quality passed to the transcoder
    #[arg(long)]
    pub quality: Option<String>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            output_dir: args.output_dir,
            filename_template: args.template,
            rate_limit_delay_secs: args.rate_limit,
            default_genre: args.genre,
            audio_quality: args.quality,
        }
    }
}

/// Run the parsed CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let mut config = load_config(cli);

    match &cli.command {
        Commands::Download {
            url,
            overrides,
            json,
        } => {
            config.apply(overrides.clone().into());
            cmd_download(&rt, &config, url, *json)
        }
        Commands::Inspect { url, genre, json } => {
            config.apply(Overrides {
                default_genre: genre.clone(),
                ..Overrides::default()
            });
            cmd_inspect(&rt, &config, url, *json)
        }
        Commands::Cover {
            artist,
            album,
            title,
            hint_url,
            save,
            json,
        } => {
            let query = CoverQuery {
                artist,
                album: album.as_deref(),
                title: title.as_deref(),
                hint_url: hint_url.as_deref(),
            };
            cmd_cover(&rt, &config, query, save.as_deref(), *json)
        }
        Commands::Config { init, force } => {
            cmd_config(&config, cli.config.as_deref(), *init, *force)
        }
    }
}

fn load_config(cli: &Cli) -> Config {
    match cli.config {
        Some(ref path) => config::load_from(path),
        None => config::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_download_overrides_parse() {
        let cli = Cli::try_parse_from([
            "tunegrab",
            "download",
            "https://youtu.be/dQw4w9WgXcQ",
            "--output-dir",
            "/tmp/music",
            "--rate-limit",
            "0.5",
            "--genre",
            "Pop",
        ])
        .unwrap();

        let Commands::Download { url, overrides, json } = cli.command else {
            panic!("expected download");
        };
        assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
        assert!(!json);

        let mut config = Config::default();
        config.apply(overrides.into());
        assert_eq!(config.output.directory, PathBuf::from("/tmp/music"));
        assert_eq!(config.download.rate_limit_delay_secs, 0.5);
        assert_eq!(config.download.default_genre(), Some("Pop"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tunegrab", "config", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cover_requires_artist() {
        assert!(Cli::try_parse_from(["tunegrab", "cover", "--album", "X"]).is_err());
    }
}
