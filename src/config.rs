//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\tunegrab\config.toml
//! - macOS: ~/Library/Application Support/tunegrab/config.toml
//! - Linux: ~/.config/tunegrab/config.toml
//!
//! The config file is human-readable and editable. Command-line flags are
//! merged on top with [`Overrides`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and how files are written
    pub output: OutputConfig,

    /// Download behaviour
    pub download: DownloadConfig,

    /// Cover lookup tuning
    pub covers: CoversConfig,

    /// Metadata extraction
    pub extractor: ExtractorConfig,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for downloads
    pub directory: PathBuf,

    /// Audio codec passed to the transcoder ("mp3", "m4a", "opus", ...)
    pub audio_format: String,

    /// Bitrate in kbps (or the transcoder's quality scale)
    pub audio_quality: String,

    /// Filename template; placeholders: {artist} {title} {album} {year}
    /// {track_number} {total_tracks}
    pub filename_template: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            audio_format: "mp3".to_string(),
            audio_quality: "192".to_string(),
            filename_template: "{artist} - {title}".to_string(),
        }
    }
}

/// Music folder + "YouTube", falling back to ~/Music/YouTube
fn default_output_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .unwrap_or_else(|| PathBuf::from("Music"))
        .join("YouTube")
}

/// Download settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Minimum pause between two fetches, in seconds
    pub rate_limit_delay_secs: f64,

    /// Genre applied to tracks that have none
    pub default_genre: String,

    /// yt-dlp executable
    pub ytdlp_path: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_secs: 1.5,
            default_genre: "Unknown".to_string(),
            ytdlp_path: PathBuf::from("yt-dlp"),
        }
    }
}

impl DownloadConfig {
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_limit_delay_secs).unwrap_or(Duration::ZERO)
    }

    /// Configured default genre, unless blank
    pub fn default_genre(&self) -> Option<&str> {
        Some(self.default_genre.trim()).filter(|g| !g.is_empty())
    }
}

/// Cover lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoversConfig {
    /// Per-request timeout for catalog calls and image downloads
    pub request_timeout_secs: u64,

    /// Largest accepted cover image
    pub max_cover_bytes: u64,

    /// Result limit for direct searches
    pub search_limit: u32,

    /// Result limit for wider searches
    pub extended_search_limit: u32,

    /// Result limit when listing an artist's albums
    pub artist_albums_limit: u32,

    /// iTunes storefront
    pub country: String,

    /// Artwork size iTunes publishes in search results
    pub small_artwork_size: u32,

    /// Artwork size requested instead
    pub large_artwork_size: u32,
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            max_cover_bytes: 10 * 1024 * 1024,
            search_limit: 5,
            extended_search_limit: 10,
            artist_albums_limit: 20,
            country: "us".to_string(),
            small_artwork_size: 100,
            large_artwork_size: 600,
        }
    }
}

impl CoversConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Read album and cover hints from the video page itself
    pub platform_hints: bool,

    /// Minimum seconds between two hint page fetches
    pub hint_delay_secs: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            platform_hints: true,
            hint_delay_secs: 0.5,
        }
    }
}

impl ExtractorConfig {
    pub fn hint_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.hint_delay_secs).unwrap_or(Duration::ZERO)
    }
}

/// Command-line overrides; `None` keeps the file's value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub filename_template: Option<String>,
    pub rate_limit_delay_secs: Option<f64>,
    pub default_genre: Option<String>,
    pub audio_quality: Option<String>,
}

impl Config {
    /// Merge command-line overrides into this config
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(dir) = overrides.output_dir {
            self.output.directory = dir;
        }
        if let Some(template) = overrides.filename_template.filter(|t| !t.trim().is_empty()) {
            self.output.filename_template = template;
        }
        if let Some(delay) = overrides.rate_limit_delay_secs.filter(|d| *d >= 0.0) {
            self.download.rate_limit_delay_secs = delay;
        }
        if let Some(genre) = overrides.default_genre {
            self.download.default_genre = genre;
        }
        if let Some(quality) = overrides.audio_quality {
            self.output.audio_quality = quality;
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunegrab"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`]
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {:?}: {}, using defaults", path, e);
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {:?}: {}, using defaults", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(&path, config)?;
    Ok(path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = to_toml(config)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Pretty TOML rendering of a config
pub fn to_toml(config: &Config) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(ConfigError::Serialize)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
