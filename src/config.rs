use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::constants;
use crate::error::ConfigError;

/// Runtime configuration. Non-secret settings may come from `config.toml`;
/// environment variables (optionally loaded from `.env`) always win, and the
/// Airtable token is only ever read from the environment.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub airtable: AirtableConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirtableConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub base_id: Option<String>,
    #[serde(skip)]
    pub token: Option<String>,
    #[serde(default)]
    pub tables: TableConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableConfig {
    pub codes: Option<String>,
    pub applications: Option<String>,
    pub interests: Option<String>,
}

fn default_port() -> u16 {
    constants::DEFAULT_PORT
}

fn default_static_dir() -> String {
    constants::DEFAULT_STATIC_DIR.to_string()
}

fn default_log_dir() -> String {
    constants::DEFAULT_LOG_DIR.to_string()
}

fn default_api_url() -> String {
    constants::AIRTABLE_API_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            base_id: None,
            token: None,
            tables: TableConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path` (must exist) or from `config.toml` when present, then
    /// apply the process environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(constants::CONFIG_FILE).exists() => {
                Self::from_file(Path::new(constants::CONFIG_FILE))?
            }
            None => {
                debug!("No {} found, using defaults", constants::CONFIG_FILE);
                Config::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Overlay values from `lookup`. Blank values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(port) = get(constants::ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: constants::ENV_PORT,
                value: port.clone(),
            })?;
        }
        if let Some(dir) = get(constants::ENV_STATIC_DIR) {
            self.server.static_dir = dir;
        }
        if let Some(dir) = get(constants::ENV_LOG_DIR) {
            self.server.log_dir = dir;
        }

        let airtable = &mut self.airtable;
        if let Some(url) = get(constants::ENV_AIRTABLE_API_URL) {
            airtable.api_url = url;
        }
        airtable.base_id = get(constants::ENV_AIRTABLE_BASE_ID).or(airtable.base_id.take());
        airtable.token = get(constants::ENV_AIRTABLE_TOKEN);
        airtable.tables.codes =
            get(constants::ENV_AIRTABLE_TABLE_CODES).or(airtable.tables.codes.take());
        airtable.tables.applications =
            get(constants::ENV_AIRTABLE_TABLE_APPLICATIONS).or(airtable.tables.applications.take());
        airtable.tables.interests =
            get(constants::ENV_AIRTABLE_TABLE_INTERESTS).or(airtable.tables.interests.take());
        Ok(())
    }
}

impl AirtableConfig {
    /// Names of every Airtable variable paired with whether it is absent.
    pub fn missing_report(&self) -> Vec<(&'static str, bool)> {
        vec![
            (constants::ENV_AIRTABLE_BASE_ID, self.base_id.is_none()),
            (constants::ENV_AIRTABLE_TOKEN, self.token.is_none()),
            (constants::ENV_AIRTABLE_TABLE_CODES, self.tables.codes.is_none()),
            (constants::ENV_AIRTABLE_TABLE_APPLICATIONS, self.tables.applications.is_none()),
            (constants::ENV_AIRTABLE_TABLE_INTERESTS, self.tables.interests.is_none()),
        ]
    }

    pub fn warn_if_incomplete(&self) {
        let missing: Vec<&str> = self
            .missing_report()
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(key, _)| key)
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Airtable configuration incomplete; affected routes will return 500");
        }
    }
}
