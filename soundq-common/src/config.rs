//! Bootstrap configuration loading and sounds folder resolution
//!
//! Configuration is read once at startup from a TOML file. A missing file is
//! not an error: a warning is logged and built-in defaults are used.
//!
//! # Settings Sources Priority (sounds folder)
//!
//! 1. Command-line argument
//! 2. Environment variable (`SOUNDQ_SOUNDS_FOLDER`)
//! 3. TOML configuration file
//! 4. Compiled default (`./sounds`)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the sounds folder
pub const SOUNDS_FOLDER_ENV: &str = "SOUNDQ_SOUNDS_FOLDER";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Command prefix shown in help text (e.g. `!` for `!sound`)
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Folder scanned for local sounds (optional, see resolve_sounds_folder)
    #[serde(default)]
    pub sounds_folder: Option<PathBuf>,

    /// Longest track accepted into the queue, in seconds. 0 = no limit.
    #[serde(default)]
    pub max_track_seconds: u64,

    /// Token prepended to a query when retrying it as a backend search
    #[serde(default = "default_search_prefix")]
    pub search_prefix: String,

    /// Resolve arguments that match no local sound as backend queries
    #[serde(default)]
    pub allow_remote_queries: bool,

    /// Optional TOML catalog of remote tracks and playlists
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// Message decoration
    #[serde(default)]
    pub emojis: EmojiConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Emoji prefixes used in status lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiConfig {
    #[serde(default = "default_success")]
    pub success: String,
    #[serde(default = "default_warning")]
    pub warning: String,
    #[serde(default = "default_error")]
    pub error: String,
    #[serde(default = "default_loading")]
    pub loading: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_search_prefix() -> String {
    "ytsearch:".to_string()
}

fn default_success() -> String {
    "🎶".to_string()
}

fn default_warning() -> String {
    "💡".to_string()
}

fn default_error() -> String {
    "🚫".to_string()
}

fn default_loading() -> String {
    "⌚".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            success: default_success(),
            warning: default_warning(),
            error: default_error(),
            loading: default_loading(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            sounds_folder: None,
            max_track_seconds: 0,
            search_prefix: default_search_prefix(),
            allow_remote_queries: false,
            catalog: None,
            emojis: EmojiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or from the platform default location
    /// when no path is given.
    ///
    /// A missing file logs a warning and returns defaults. A file that exists
    /// but does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Maximum accepted track duration in milliseconds, None when unlimited
    pub fn max_duration_ms(&self) -> Option<u64> {
        match self.max_track_seconds {
            0 => None,
            secs => Some(secs.saturating_mul(1000)),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.search_prefix.trim().is_empty() {
            return Err(Error::Config("search_prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Platform config file location: `<config_dir>/soundq/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("soundq").join("config.toml"))
}

/// Resolve the sounds folder following the priority order in the module docs
pub fn resolve_sounds_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(SOUNDS_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.sounds_folder {
        return path.clone();
    }

    // Priority 4: Compiled default
    PathBuf::from("./sounds")
}
