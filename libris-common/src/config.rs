//! Configuration loading and database path resolution
//!
//! Bootstrap configuration is resolved with the following priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and compiled
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config file
pub const CONFIG_ENV_VAR: &str = "LIBRIS_CONFIG";

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV_VAR: &str = "LIBRIS_DATABASE";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// External bibliographic provider settings (optional)
    #[serde(default)]
    pub providers: ProviderSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Settings for the external bibliographic providers
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderSettings {
    /// Hard per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Open Library books API endpoint
    #[serde(default = "default_open_library_url")]
    pub open_library_url: String,

    /// Google Books volumes API endpoint
    #[serde(default = "default_google_books_url")]
    pub google_books_url: String,

    /// User-Agent sent with every provider request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Candidates inspected by the title/author cover search
    #[serde(default = "default_cover_search_max_results")]
    pub cover_search_max_results: u32,

    /// Query all providers at once instead of one after another
    #[serde(default)]
    pub concurrent_lookup: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            open_library_url: default_open_library_url(),
            google_books_url: default_google_books_url(),
            user_agent: default_user_agent(),
            cover_search_max_results: default_cover_search_max_results(),
            concurrent_lookup: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_open_library_url() -> String {
    "https://openlibrary.org/api/books".to_string()
}

fn default_google_books_url() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}

fn default_user_agent() -> String {
    format!("libris/{} (private library catalog)", env!("CARGO_PKG_VERSION"))
}

fn default_cover_search_max_results() -> u32 {
    5
}

/// Default HTTP port for the libris-meta service
pub const DEFAULT_PORT: u16 = 5740;

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LibrisConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub logging: LoggingConfig,
    pub providers: ProviderSettings,
}

impl LibrisConfig {
    /// Resolve configuration from CLI overrides, environment, TOML and defaults
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let config_path = overrides
            .config_path
            .clone()
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
            .or_else(default_config_path);

        let toml_config = match config_path {
            Some(path) => load_toml_config(&path)?,
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                TomlConfig::default()
            }
        };

        Ok(Self::from_parts(toml_config, overrides))
    }

    /// Merge a parsed TOML file with overrides (CLI > ENV > TOML > default)
    pub fn from_parts(toml_config: TomlConfig, overrides: ConfigOverrides) -> Self {
        let database_path = overrides
            .database_path
            .or_else(|| std::env::var(DATABASE_ENV_VAR).ok().map(PathBuf::from))
            .or(toml_config.database_path)
            .unwrap_or_else(default_database_path);

        let port = overrides
            .port
            .or(toml_config.port)
            .unwrap_or(DEFAULT_PORT);

        Self {
            database_path,
            port,
            logging: toml_config.logging,
            providers: toml_config.providers,
        }
    }
}

/// Load TOML config, returning defaults when the file does not exist
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

/// Write TOML config, creating the parent directory if needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Platform config file location (`<config_dir>/libris/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("libris").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("libris").join("books.db"))
        .unwrap_or_else(|| PathBuf::from("db").join("books.db"))
}
