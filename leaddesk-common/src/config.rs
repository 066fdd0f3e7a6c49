//! Configuration loading and data directory resolution
//!
//! Resolution priority for every setting:
//! 1. Environment variable
//! 2. TOML config file (`<config dir>/leaddesk/config.toml`)
//! 3. Compiled default

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "LEADDESK_DATA_DIR";
/// Environment variable overriding the advisory service base URL
pub const ADVISORY_URL_ENV: &str = "LEADDESK_ADVISORY_URL";
/// Environment variable overriding the advisory service API key
pub const ADVISORY_API_KEY_ENV: &str = "LEADDESK_ADVISORY_API_KEY";

const DEFAULT_ADVISORY_URL: &str = "https://advisory.leaddesk.example";

/// Advisory AI service connection settings
#[derive(Debug, Clone)]
pub struct AdvisoryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ADVISORY_URL.to_string(),
            api_key: None,
        }
    }
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database file
    pub data_dir: PathBuf,
    pub advisory: AdvisoryConfig,
}

/// TOML config file shape (all keys optional)
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    data_dir: Option<String>,
    advisory_url: Option<String>,
    advisory_api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment, config file, and defaults
    pub fn load() -> Result<Self> {
        let file = load_config_file();
        Ok(Self::from_sources(&file, |name| std::env::var(name).ok()))
    }

    /// Path of the SQLite database inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("leaddesk.db")
    }

    fn from_sources(file: &TomlConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = env(DATA_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| file.data_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let base_url = env(ADVISORY_URL_ENV)
            .or_else(|| file.advisory_url.clone())
            .unwrap_or_else(|| DEFAULT_ADVISORY_URL.to_string());

        let api_key = env(ADVISORY_API_KEY_ENV).or_else(|| file.advisory_api_key.clone());

        Self {
            data_dir,
            advisory: AdvisoryConfig { base_url, api_key },
        }
    }
}

/// Read the TOML config file if one exists; malformed content is ignored
/// with a warning rather than aborting startup
fn load_config_file() -> TomlConfig {
    let Some(path) = config_file_path() else {
        return TomlConfig::default();
    };
    if !path.exists() {
        return TomlConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(text) => parse_config(&text, &path),
        Err(err) => {
            warn!("Could not read config file {}: {}", path.display(), err);
            TomlConfig::default()
        }
    }
}

fn parse_config(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(config) => config,
        Err(err) => {
            warn!("Malformed config file {}: {}", path.display(), err);
            TomlConfig::default()
        }
    }
}

/// Default configuration file path for the platform
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leaddesk").join("config.toml"))
}

/// OS-dependent default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("leaddesk"))
        .unwrap_or_else(|| PathBuf::from("./leaddesk_data"))
}
