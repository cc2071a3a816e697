//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\roundmix\config.toml
//! - macOS: ~/Library/Application Support/roundmix/config.toml
//! - Linux: ~/.config/roundmix/config.toml
//!
//! Every field has a default, so a partial file (or none at all) is fine.
//! Command-line flags override whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::round::DEFAULT_SONG_BREAK;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Round layout
    pub rounds: RoundsConfig,

    /// Song trimming
    pub trim: TrimConfig,

    /// Output encoding
    pub encode: EncodeConfig,

    /// External tool locations
    pub tools: ToolsConfig,
}

/// Round layout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundsConfig {
    /// Seconds of silence inserted between songs without an explicit break
    pub song_break: u32,

    /// Where downloads, trimmed songs and silence clips are written
    pub artifacts_dir: PathBuf,
}

impl Default for RoundsConfig {
    fn default() -> Self {
        Self {
            song_break: DEFAULT_SONG_BREAK,
            artifacts_dir: PathBuf::from("artifacts"),
        }
    }
}

/// Trim window applied to every song
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Maximum song length in seconds
    pub window_secs: u32,

    /// Fade-in and fade-out length in seconds
    pub fade_secs: u32,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            window_secs: 90,
            fade_secs: 5,
        }
    }
}

impl TrimConfig {
    /// Second at which the fade-out starts.
    pub fn fade_out_start(&self) -> u32 {
        self.window_secs.saturating_sub(self.fade_secs)
    }
}

/// Encoding settings for silence clips and the final output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Output bitrate passed to libmp3lame
    pub bitrate: String,

    /// Sample rate of generated silence
    pub sample_rate: u32,

    /// Channel layout of generated silence
    pub channel_layout: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            bitrate: "192k".to_string(),
            sample_rate: 44100,
            channel_layout: "stereo".to_string(),
        }
    }
}

/// External tool paths (empty = search PATH and common locations)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub downloader_path: Option<PathBuf>,
}

impl Config {
    /// Check that the settings describe a usable round and trim window.
    pub fn validate(&self) -> Result<()> {
        if self.rounds.song_break == 0 {
            return Err(Error::config("rounds.song_break must be positive"));
        }
        if self.trim.window_secs == 0 {
            return Err(Error::config("trim.window_secs must be positive"));
        }
        if self.trim.fade_secs.saturating_mul(2) > self.trim.window_secs {
            return Err(Error::config(format!(
                "trim.fade_secs ({}) leaves no room in a {}s window",
                self.trim.fade_secs, self.trim.window_secs
            )));
        }
        if self.encode.bitrate.trim().is_empty() {
            return Err(Error::config("encode.bitrate must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("roundmix"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location.
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::warn!("Using default configuration");
            Config::default()
        }
    }
}

/// Load configuration from an explicit path. Fails if unreadable or invalid.
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config = toml::from_str(&contents)
        .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))?;
    tracing::info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Save configuration to `path`.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> std::result::Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration save errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[rounds]"));
        assert!(toml.contains("[trim]"));
        assert!(toml.contains("[encode]"));
        assert!(toml.contains("[tools]"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rounds.song_break, 10);
        assert_eq!(config.trim.window_secs, 90);
        assert_eq!(config.trim.fade_secs, 5);
        assert_eq!(config.trim.fade_out_start(), 85);
        assert_eq!(config.encode.bitrate, "192k");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[rounds]
song_break = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.rounds.song_break, 5);
        assert_eq!(config.rounds.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(config.trim.window_secs, 90);
        assert!(config.tools.ffmpeg_path.is_none());
    }

    #[test]
    fn test_validate_rejects_oversized_fades() {
        let mut config = Config::default();
        config.trim.window_secs = 8;
        config.trim.fade_secs = 5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.trim.window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_song_break() {
        let mut config = Config::default();
        config.rounds.song_break = 0;
        assert!(matches!(config.validate(), Err(Error::Config(msg)) if msg.contains("song_break")));

        config.rounds.song_break = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.rounds.song_break = 15;
        config.tools.ffmpeg_path = Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));

        save_to(&config, &path).unwrap();
        let loaded = load_from(&path).unwrap();

        assert_eq!(loaded.rounds.song_break, 15);
        assert_eq!(
            loaded.tools.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = load_from(Path::new("/nonexistent/roundmix.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rounds\nsong_break = ").unwrap();
        assert!(load_from(&path).is_err());
    }
}
