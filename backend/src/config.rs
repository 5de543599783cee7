//! # Application Configuration
//!
//! Settings are resolved in three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional YAML file (`MINI_PROJECTS_CONFIG`, else `<data_dir>/config.yaml`)
//! 3. environment overrides (`MINI_PROJECTS_DATA_DIR`, `MINI_PROJECTS_BIND_ADDR`,
//!    `MINI_PROJECTS_LOG`)
//!
//! ```yaml
//! bind_addr: "127.0.0.1:3000"
//! cors_origin: "http://localhost:8080"
//! history_limit: 50
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{StoreOptions, DEFAULT_HISTORY_LIMIT, DEFAULT_STORAGE_KEY};
use crate::domain::snapshot::SCHEMA_VERSION;

pub const CONFIG_PATH_ENV: &str = "MINI_PROJECTS_CONFIG";
pub const DATA_DIR_ENV: &str = "MINI_PROJECTS_DATA_DIR";
pub const BIND_ADDR_ENV: &str = "MINI_PROJECTS_BIND_ADDR";
pub const LOG_ENV: &str = "MINI_PROJECTS_LOG";

const CONFIG_FILE_NAME: &str = "config.yaml";
const DATA_DIR_NAME: &str = "Futuristic Mini Projects";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: String,
    pub storage_key: String,
    pub schema_version: u32,
    /// Prefix of backup filenames
    pub app_name: String,
    pub cors_origin: String,
    pub log_level: String,
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_addr: "127.0.0.1:3000".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            schema_version: SCHEMA_VERSION,
            app_name: "futuristic-projects".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            log_level: "info".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Platform data directory, falling back to home and then the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

impl AppConfig {
    /// Resolve configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Resolve configuration with `env` standing in for the environment
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir_override = env(DATA_DIR_ENV).map(PathBuf::from);

        let mut config = match env(CONFIG_PATH_ENV) {
            Some(path) => Self::from_yaml_file(Path::new(&path))?,
            None => {
                let data_dir = data_dir_override.clone().unwrap_or_else(default_data_dir);
                let path = data_dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_yaml_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(data_dir) = data_dir_override {
            config.data_dir = data_dir;
        }
        if let Some(bind_addr) = env(BIND_ADDR_ENV) {
            config.bind_addr = bind_addr;
        }
        if let Some(log_level) = env(LOG_ENV) {
            config.log_level = log_level;
        }

        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&yaml_content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_addr))
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            storage_key: self.storage_key.clone(),
            schema_version: self.schema_version,
            history_limit: self.history_limit,
        }
    }
}
