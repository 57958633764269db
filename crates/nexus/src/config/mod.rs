//! Configuration files
//!
//! Settings are plain `serde` structs. The file format follows the path's
//! extension: `.toml` or `.ron`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::sys::{LoggerConfig, WindowSettings};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path)?;

        match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level settings of a nexus application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    /// Logger subsystem settings
    pub logger: LoggerConfig,
    /// Window subsystem settings
    pub window: WindowSettings,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::new("forge", "forge.log"),
            window: WindowSettings::default(),
        }
    }
}

impl Config for NexusConfig {}

impl NexusConfig {
    /// Reject values the subsystems would refuse at init time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logger.level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logger.level
            )));
        }
        if self.logger.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("log file path is empty".to_string()));
        }
        let size = self.window.dimensions;
        if size.width == 0 || size.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window dimensions {}x{} must be non-zero",
                size.width, size.height
            )));
        }
        Ok(())
    }
}
