//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading an event
//! profile from a directory of YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EventProfile, EventTypesConfig, ProfileMetadata};

/// Loads and provides access to a statement-of-facts event profile.
///
/// # Directory structure
///
/// ```text
/// config/sof/
/// ├── profile.yaml      # Profile metadata
/// └── event_types.yaml  # Default counting behavior per event type
/// ```
///
/// # Example
///
/// ```no_run
/// use laytime_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sof").unwrap();
/// let behavior = loader.profile().default_behavior("rain_stoppage");
/// println!("Rain stoppages count as {:?}", behavior);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    profile: EventProfile,
}

impl ConfigLoader {
    /// Loads a profile from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if either required file is missing or contains
    /// invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata_path = path.join("profile.yaml");
        let metadata = Self::load_yaml::<ProfileMetadata>(&metadata_path)?;

        let event_types_path = path.join("event_types.yaml");
        let event_types_config = Self::load_yaml::<EventTypesConfig>(&event_types_path)?;

        Ok(Self {
            profile: EventProfile::new(metadata, event_types_config.event_types),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded event profile.
    pub fn profile(&self) -> &EventProfile {
        &self.profile
    }
}
