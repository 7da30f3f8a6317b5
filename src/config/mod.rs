pub mod types;

pub use self::types::{Config, DirectoryConfig, EventsConfig, StoreConfig};

use crate::events::EventLogger;
use crate::store::LoadOptions;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "follownet.toml";

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `follownet.toml` from the working directory, or `path` if given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    /// # Errors
    /// Returns error if `content` is not a valid config.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.store.path)
    }

    /// The event logger, if event logging is enabled.
    #[must_use]
    pub fn event_logger(&self) -> Option<EventLogger> {
        self.events
            .enabled
            .then(|| EventLogger::new(&self.events.path))
    }

    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            seed: self.directory.seed.clone(),
            policy: self.store.consistency,
            events: self.event_logger(),
        }
    }

    /// Renders the config as TOML, for `init` to write out.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConsistencyPolicy;

    #[test]
    fn empty_config_uses_defaults() {
        let c = Config::parse("").unwrap();
        assert_eq!(c.store.path, "users_data.json");
        assert_eq!(c.store.consistency, ConsistencyPolicy::Repair);
        assert!(c.store.backup);
        assert_eq!(c.directory.seed.len(), 10);
        assert!(c.events.enabled);
    }

    #[test]
    fn sections_override_defaults() {
        let c = Config::parse(
            "[store]\nconsistency = \"strict\"\n[directory]\nseed = [\"Ama\", \"Siaw\"]\n[events]\nenabled = false\n",
        )
        .unwrap();
        assert_eq!(c.store.consistency, ConsistencyPolicy::Strict);
        assert_eq!(c.directory.seed, ["Ama", "Siaw"]);
        assert!(c.event_logger().is_none());
        assert_eq!(c.load_options().seed.len(), 2);
    }

    #[test]
    fn bad_policy_is_rejected() {
        assert!(Config::parse("[store]\nconsistency = \"maybe\"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let c = Config::new();
        let back = Config::parse(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back.directory.seed, c.directory.seed);
        assert_eq!(back.store.path, c.store.path);
    }
}
