//! Registry configuration loaded from TOML.
//!
//! ```toml
//! founders = ["0x0101…", "0x0202…"]
//! snapshot_path = "./felt-registry.json"
//! log_filter = "info"
//! ```
//!
//! `FELT_REGISTRY_SNAPSHOT` and `FELT_REGISTRY_LOG` override the file values
//! when `apply_env_overrides` is called.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::Address;

pub const ENV_SNAPSHOT_PATH: &str = "FELT_REGISTRY_SNAPSHOT";
pub const ENV_LOG_FILTER: &str = "FELT_REGISTRY_LOG";
pub const DEFAULT_SNAPSHOT_PATH: &str = "./felt-registry.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Hex addresses seated at genesis.
    pub founders: Vec<String>,

    /// Where the CLI keeps the registry snapshot.
    pub snapshot_path: PathBuf,

    /// `tracing_subscriber` env-filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            founders: Vec::new(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Parsed founder addresses, in file order.
    pub fn founder_addresses(&self) -> Result<Vec<Address>, ConfigError> {
        if self.founders.is_empty() {
            return Err(ConfigError::NoFounders);
        }
        self.founders
            .iter()
            .map(|value| {
                Address::from_hex(value).map_err(|source| ConfigError::InvalidAddress {
                    value: value.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_SNAPSHOT_PATH).ok(),
            std::env::var(ENV_LOG_FILTER).ok(),
        );
    }

    fn apply_overrides(&mut self, snapshot_path: Option<String>, log_filter: Option<String>) {
        if let Some(path) = snapshot_path.filter(|p| !p.trim().is_empty()) {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(filter) = log_filter.filter(|f| !f.trim().is_empty()) {
            self.log_filter = filter;
        }
    }
}

/// Load config from a TOML file path.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<RegistryConfig, ConfigError> {
    let p = path.as_ref();
    let s = fs::read_to_string(p).map_err(|source| ConfigError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    let cfg: RegistryConfig = toml::from_str(&s)?;
    Ok(cfg)
}
