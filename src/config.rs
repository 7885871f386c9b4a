//! Configuration system

use crate::actor::EngineConfig;
use crate::error::{ConfigError, EngineError};
use crate::window::WindowProperties;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Configuration trait
///
/// Missing keys fall back to [`Default`]; unknown keys are ignored.
pub trait Config: DeserializeOwned + Default {
    /// Parse configuration from TOML text.
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

impl Config for EngineConfig {}

impl Config for WindowProperties {}

/// Load an [`EngineConfig`] from a TOML file.
pub fn load_engine_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, EngineError> {
    Ok(EngineConfig::load_from_file(path)?)
}
