//! Tabby Configuration
//!
//! Loads and saves the `config.toml` that tells the library where its
//! database lives, how to log, and which category naming rules apply.
//!
//! - Each section implements `ConfigSection` (validate, merge, name)
//! - A missing file yields defaults; a corrupted one is an error
//! - Writes are atomic, so a crash never leaves a half-written file
//!
//! ```rust,no_run
//! use tabby_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//! println!("Database: {}", config.app.database_path.display());
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

mod app_config;
mod library_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_env_overrides, ConfigManager};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use library_config::LibraryConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Category and library rules
    pub library: LibraryConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.library.validate() {
            errors.append(&mut e);
        }

        if self.version > CONFIG_VERSION {
            errors.push(ValidationError::with_value(
                "version",
                format!("is newer than supported version {}", CONFIG_VERSION),
                self.version,
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.library.merge(other.library);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            library: LibraryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_version_is_set() {
        assert_eq!(Config::default().version, CONFIG_VERSION);
    }

    #[test]
    fn test_future_version_rejected() {
        let mut config = Config::default();
        config.version = CONFIG_VERSION + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_errors_collected_across_sections() {
        let mut config = Config::default();
        config.app.max_connections = 0;
        config.library.max_category_name_length = 0;
        assert_eq!(config.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();
        override_config.library.max_category_name_length = 40;

        base.merge(override_config);
        assert_eq!(base.library.max_category_name_length, 40);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[library]\ntrim_category_names = false\n").unwrap();
        assert!(!config.library.trim_category_names);
        assert_eq!(config.app, AppConfig::default());
        assert_eq!(config.version, CONFIG_VERSION);
    }
}
