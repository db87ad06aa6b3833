use crate::error::Result;
use crate::io;
use crate::paths;
use std::collections::BTreeMap;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub const ENABLED_KEY: &str = "followup.enabled";
/// The feature ships enabled; administrators opt out.
pub const ENABLED_DEFAULT: &str = "true";

// ---------------------------------------------------------------------------
// ConfigSource
// ---------------------------------------------------------------------------

/// Read side of the host's key-value configuration store.
///
/// Implementations must return the latest committed value on every call; the
/// decision path reads at message time and never caches.
pub trait ConfigSource {
    fn get(&self, key: &str, default: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Minimal YAML-backed key-value store at `.followup/config.yaml`.
/// Every read loads the file fresh.
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_map(&self) -> Result<BTreeMap<String, String>> {
        let path = paths::config_path(&self.root);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load_map()?;
        map.insert(key.to_string(), value.to_string());
        let data = serde_yaml::to_string(&map)?;
        io::atomic_write(&paths::config_path(&self.root), data.as_bytes())
    }
}

impl ConfigSource for ConfigStore {
    fn get(&self, key: &str, default: &str) -> Result<String> {
        let map = self.load_map()?;
        Ok(map.get(key).cloned().unwrap_or_else(|| default.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Feature flag
// ---------------------------------------------------------------------------

/// Read the feature flag, fail-closed: a config store that errors (access
/// denial included) reads as disabled.
pub fn feature_enabled(config: &dyn ConfigSource) -> bool {
    match config.get(ENABLED_KEY, ENABLED_DEFAULT) {
        Ok(value) => value == "true",
        Err(e) => {
            tracing::warn!(error = %e, "cannot read follow-up tracking config, treating as disabled");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
