use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use sonority_search::recommend::DEFAULT_CATALOG_LIMIT;

const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_DEEZER_BASE_URL: &str = "https://api.deezer.com";

/// Configuration for sonority.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (SONO_* prefix)
/// 3. Config file (~/.config/sonority/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite catalog.
    ///
    /// Can be set via:
    /// - CLI: --db /path/to/db
    /// - ENV: SONO_DATABASE_PATH
    /// - Config: database_path = "/path/to/db"
    /// - Default: ~/.local/share/sonority/sonority.db
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// Spotify songs CSV used by `sonority seed` when `--csv` is not given.
    #[serde(default)]
    pub seed_csv_path: Option<PathBuf>,

    /// Maximum number of tracks read into one recommendation snapshot.
    #[serde(default = "default_catalog_limit")]
    pub catalog_limit: usize,

    /// Google AI Studio key for mood translation.
    ///
    /// Can be set via:
    /// - ENV: SONO_GOOGLE_API_KEY
    /// - Config: google_api_key = "..."
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Gemini model used for mood translation.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    #[serde(default = "default_deezer_base_url")]
    pub deezer_base_url: String,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_true")]
    pub coloured: bool,

    #[serde(default)]
    pub report_caller: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            coloured: true,
            report_caller: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            seed_csv_path: None,
            catalog_limit: default_catalog_limit(),
            google_api_key: None,
            model: default_model(),
            gemini_base_url: default_gemini_base_url(),
            deezer_base_url: default_deezer_base_url(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/sonority/config.toml
    /// Reads environment variables with SONO_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("sono");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration, overriding the database path (the --db CLI flag).
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.database_path = db_path;
        Ok(config)
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sonority")
        .join("sonority.db")
}

const fn default_catalog_limit() -> usize {
    DEFAULT_CATALOG_LIMIT
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_deezer_base_url() -> String {
    DEFAULT_DEEZER_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/sonority/config.toml
/// - macOS: ~/Library/Application Support/sonority/config.toml
/// - Windows: %APPDATA%\sonority\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sonority")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Sonority Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (SONO_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Google AI Studio API key, used by `sonority mood` to turn a description
# into audio features.
#
# Can also be set via:
# - Environment: SONO_GOOGLE_API_KEY=your-key-here
#google_api_key = "your-google-api-key-here"

# Gemini model for mood translation
#model = "gemini-2.5-flash-lite"

# Path to the SQLite catalog
#
# Can also be set via:
# - CLI: sonority --db /custom/path.db recommend ...
# - Environment: SONO_DATABASE_PATH=/custom/path.db
#
# Default: Platform-specific data directory
#database_path = "/path/to/custom/sonority.db"

# Spotify songs CSV loaded by `sonority seed`
#seed_csv_path = "/path/to/spotify_songs.csv"

# Upper bound on tracks read per recommendation
#catalog_limit = 100000

#deezer_base_url = "https://api.deezer.com"

[logging]
level = "info"
coloured = true
report_caller = false
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(config.google_api_key.is_none());
        assert_eq!(config.catalog_limit, DEFAULT_CATALOG_LIMIT);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }

    #[test]
    fn test_example_config_parses_with_defaults() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.deezer_base_url, DEFAULT_DEEZER_BASE_URL);
        assert!(config.logging.coloured);
        assert!(!config.logging.report_caller);
    }

    #[test]
    fn test_partial_logging_section_fills_defaults() {
        let config: Config = toml::from_str("[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.coloured);
    }
}
