//! # Shell Configuration
//!
//! Optional TOML file read at startup. Every field has a default, so an
//! absent file (or an empty one) yields a working configuration.
//!
//! ```toml
//! data_path = "flightpath.redb"
//! network_path = "network.json"
//!
//! [engine.weights]
//! assessment_percent = 70
//! tech_stack_percent = 30
//!
//! [engine.cache]
//! debounce_ms = 100
//! ```

use flightpath_core::{EngineConfig, FlightpathError, RouteNetwork, default_network};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the durable store.
pub const DEFAULT_DATA_PATH: &str = "flightpath.redb";

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "flightpath.toml";

/// Largest configuration or network file accepted (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// redb database file holding all persisted state.
    pub data_path: PathBuf,
    /// JSON route network; the built-in network when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_path: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            network_path: None,
            engine: EngineConfig::default(),
        }
    }
}

fn read_limited(path: &Path) -> Result<String, FlightpathError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        FlightpathError::IoError(format!("Cannot read '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(FlightpathError::InvalidConfig(format!(
            "'{}' is {} bytes, maximum is {}",
            path.display(),
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| FlightpathError::IoError(format!("Cannot read '{}': {}", path.display(), e)))
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, FlightpathError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }

        let config = Self::from_toml(&read_limited(path)?)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, FlightpathError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| FlightpathError::InvalidConfig(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Render as a TOML document.
    pub fn to_toml(&self) -> Result<String, FlightpathError> {
        toml::to_string_pretty(self).map_err(|e| FlightpathError::SerializationError(e.to_string()))
    }

    /// The route network: from `network_path` when set, else built in.
    pub fn load_network(&self) -> Result<RouteNetwork, FlightpathError> {
        match &self.network_path {
            Some(path) => RouteNetwork::from_json(&read_limited(path)?),
            None => default_network(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = AppConfig::from_toml("").expect("parse");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
data_path = "other.redb"

[engine.cache]
debounce_ms = 250
"#,
        )
        .expect("parse");

        assert_eq!(config.data_path, PathBuf::from("other.redb"));
        assert_eq!(config.engine.cache.debounce_ms, 250);
        assert_eq!(config.engine.weights.assessment_percent, 70);
        assert_eq!(config.engine.miles.per_unlocked_city, 250);
    }

    #[test]
    fn weights_must_sum_to_100() {
        let result = AppConfig::from_toml(
            r#"
[engine.weights]
assessment_percent = 60
tech_stack_percent = 30
"#,
        );
        assert!(matches!(result, Err(FlightpathError::InvalidConfig(_))));
    }

    #[test]
    fn default_renders_and_parses_back() {
        let rendered = AppConfig::default().to_toml().expect("render");
        assert!(rendered.contains("data_path"));
        assert_eq!(AppConfig::from_toml(&rendered).expect("parse"), AppConfig::default());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::load(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, AppConfig::default());
    }
}
