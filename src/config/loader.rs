//! Configuration loader with tier-based merging.
//!
//! Tiers, lowest priority first: embedded defaults, project
//! `./taskapi/config.yaml`, user `~/.taskapi/config.yaml`, environment
//! variables. YAML tiers are merged key by key, so a tier only needs the
//! fields it changes.

use super::types::Config;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const ENV_CONFIG_PATH: &str = "TASKAPI_CONFIG_PATH";
pub const ENV_DB_PATH: &str = "TASKAPI_DB_PATH";
pub const ENV_HOST: &str = "TASKAPI_HOST";
pub const ENV_PORT: &str = "TASKAPI_PORT";
pub const ENV_PROJECT_DIR: &str = "TASKAPI_PROJECT_DIR";
pub const ENV_USER_DIR: &str = "TASKAPI_USER_DIR";

const CONFIG_FILE: &str = "config.yaml";

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration directories from environment and defaults.
    pub fn discover() -> Self {
        let project_dir = std::env::var(ENV_PROJECT_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("taskapi")));

        let user_dir = std::env::var(ENV_USER_DIR)
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".taskapi")));

        Self {
            project_dir,
            user_dir,
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    /// Existing config files, lowest priority first.
    fn config_files(&self) -> Vec<PathBuf> {
        [&self.project_dir, &self.user_dir]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(CONFIG_FILE))
            .filter(|file| file.is_file())
            .collect()
    }
}

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Files that contributed to the configuration, in merge order.
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load from `TASKAPI_CONFIG_PATH` if set, otherwise from all tiers.
    pub fn load() -> Result<Self> {
        if let Ok(explicit) = std::env::var(ENV_CONFIG_PATH) {
            return Self::load_from_file(explicit);
        }
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load exactly one file, skipping tier discovery. Environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Config::load(path)?;
        apply_env_overrides(&mut config);
        Ok(Self {
            config,
            sources: vec![path.to_path_buf()],
        })
    }

    /// Load configuration with explicit tier directories.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut merged = serde_json::to_value(Config::default())?;
        let mut sources = Vec::new();

        for file in paths.config_files() {
            match read_yaml(&file) {
                Ok(layer) => {
                    debug!(file = %file.display(), "Merging config file");
                    overlay(&mut merged, layer);
                    sources.push(file);
                }
                Err(e) => warn!(file = %file.display(), "Ignoring unreadable config file: {}", e),
            }
        }

        let mut config: Config = serde_json::from_value(merged)?;
        apply_env_overrides(&mut config);

        Ok(Self { config, sources })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Merge `layer` into `base` in place. Objects merge key by key; anything
/// else replaces. A null in `layer` leaves `base` untouched.
pub fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (key, value) in layer_map {
                match base_map.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(db_path) = std::env::var(ENV_DB_PATH) {
        config.server.db_path = PathBuf::from(db_path);
    }

    if let Ok(host) = std::env::var(ENV_HOST) {
        config.server.host = host;
    }

    if let Ok(port) = std::env::var(ENV_PORT) {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
        }
    }
}
