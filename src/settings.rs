//! # Settings Module
//!
//! ## Purpose
//! Holds the runtime configuration of the search services: which database files are served under
//! which names, where the adduct lists live, how many workers a batch may use, the pathway pruning
//! defaults and the log level.
//!
//! ## Configuration File
//! Read from `mine_config.json` in the working directory when present. A missing file gives the
//! defaults; a file that exists but does not parse is an error, so a typo never silently falls back.
//! ```json
//! {
//!   "databases": { "demo": "demo_db.json" },
//!   "positive_adducts": "Positive Adducts full.txt",
//!   "negative_adducts": null,
//!   "max_concurrency": 4,
//!   "np_min": -3.0,
//!   "gibbs_cap": 100.0,
//!   "log_level": "info"
//! }
//! ```
//! Every field is optional in the file, missing ones take the default value.

use crate::Pathways::pathway_search::{DEFAULT_GIBBS_CAP, DEFAULT_NP_MIN};
use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "mine_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineConfig {
    /// database name -> JSON store file
    pub databases: HashMap<String, String>,
    /// positive mode adduct list, built-in list when `None`
    pub positive_adducts: Option<String>,
    /// negative mode adduct list, built-in list when `None`
    pub negative_adducts: Option<String>,
    pub max_concurrency: usize,
    pub np_min: f64,
    pub gibbs_cap: f64,
    pub log_level: String,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            databases: HashMap::new(),
            positive_adducts: None,
            negative_adducts: None,
            max_concurrency: 4,
            np_min: DEFAULT_NP_MIN,
            gibbs_cap: DEFAULT_GIBBS_CAP,
            log_level: "info".to_string(),
        }
    }
}

impl MineConfig {
    /// Loads `mine_config.json` from the working directory, defaults when it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(CONFIG_FILE)
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            info!("no config file {}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: MineConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_string(),
                source,
            })?;
        info!(
            "config loaded from {}: {} database(s)",
            path,
            config.databases.len()
        );
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })
    }

    pub fn with_database(mut self, name: &str, file: &str) -> Self {
        self.databases.insert(name.to_string(), file.to_string());
        self
    }

    /// Log level for the terminal logger; an unknown name falls back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            warn!("unknown log level '{}', using info", self.log_level);
            LevelFilter::Info
        })
    }
}
