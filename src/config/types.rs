use serde::{Deserialize, Serialize};

use crate::events::DEFAULT_EVENT_LOG;
use crate::store::storage::DEFAULT_PATH;
use crate::types::{ConsistencyPolicy, DEFAULT_SEED};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default)]
    pub consistency: ConsistencyPolicy,
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            consistency: ConsistencyPolicy::default(),
            backup: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_seed")]
    pub seed: Vec<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_event_path")]
    pub path: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_event_path(),
        }
    }
}

const fn default_true() -> bool { true }
fn default_store_path() -> String { DEFAULT_PATH.to_string() }
fn default_event_path() -> String { DEFAULT_EVENT_LOG.to_string() }
fn default_seed() -> Vec<String> {
    DEFAULT_SEED.iter().map(ToString::to_string).collect()
}

/// Contents of `follownet.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub events: EventsConfig,
}
