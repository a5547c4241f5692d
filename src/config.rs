use crate::campus::{Campus, CampusCatalog};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    pub campuses: Vec<CampusEntry>,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub selection: Option<SelectionSection>,
    #[serde(default)]
    pub source: Option<SourceSection>,
    #[serde(default)]
    pub store: Option<StoreSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CampusEntry {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
    /// Polling interval in seconds for the reading source (default: 5)
    pub refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelectionSection {
    /// JSON file remembering the last campus picked by the user
    pub preference_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSection {
    /// JSON file with an array of readings, re-read whenever it changes
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSection {
    pub max_readings: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.campuses.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[campuses]] entry is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for campus in &self.campuses {
            let code = campus.code.trim();
            if code.is_empty() {
                return Err(ConfigError::Invalid("campus code must not be empty".to_string()));
            }
            if code.contains(crate::reading::locality::LOCATION_SEPARATOR) {
                return Err(ConfigError::Invalid(format!(
                    "campus code {code:?} must not contain a separator"
                )));
            }
            if !seen.insert(code) {
                return Err(ConfigError::Invalid(format!("duplicate campus code {code:?}")));
            }
        }
        Ok(())
    }

    pub fn campus_catalog(&self) -> Result<CampusCatalog, ConfigError> {
        let campuses = self
            .campuses
            .iter()
            .map(|entry| Campus::new(entry.code.trim(), &entry.display_name))
            .collect();
        CampusCatalog::new(campuses)
            .ok_or_else(|| ConfigError::Invalid("campus list is empty".to_string()))
    }

    /// Tracing level, falling back to info for unknown names.
    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Returns the refresh interval as Duration (default: 5 seconds)
    pub fn refresh_interval(&self) -> Duration {
        let secs = self
            .server
            .as_ref()
            .and_then(|s| s.refresh_interval_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        Duration::from_secs(secs)
    }

    pub fn preference_path(&self) -> Option<&Path> {
        non_empty(self.selection.as_ref()?.preference_path.as_deref())
    }

    pub fn source_path(&self) -> Option<&Path> {
        non_empty(self.source.as_ref()?.path.as_deref())
    }

    pub fn max_readings(&self) -> Option<usize> {
        self.store.as_ref()?.max_readings
    }
}
