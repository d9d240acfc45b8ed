use crate::criteria::Timezone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Unknown timezone '{name}': {reason}")]
    InvalidTimezone { name: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA name used to read dates typed without an offset.
    pub timezone: String,
    pub query: QueryRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            query: QueryRules::default(),
        }
    }
}

impl EngineConfig {
    pub fn timezone(&self) -> Result<Timezone, ConfigError> {
        self.timezone
            .parse()
            .map_err(|reason| ConfigError::InvalidTimezone {
                name: self.timezone.clone(),
                reason,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRules {
    pub table: String,
    pub order_column: String,
    /// Counts stop here; anything above is reported as "more".
    pub count_ceiling: u64,
    pub default_limit: u32,
}

impl Default for QueryRules {
    fn default() -> Self {
        Self {
            table: "messages".to_string(),
            order_column: "TIMESTAMP".to_string(),
            count_ceiling: 100_000,
            default_limit: 1_000,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    let config = toml::from_str::<EngineConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })?;
    config.timezone()?;
    Ok(config)
}

pub fn default_config() -> &'static EngineConfig {
    static DEFAULT_CONFIG: LazyLock<EngineConfig> = LazyLock::new(EngineConfig::default);
    &DEFAULT_CONFIG
}
