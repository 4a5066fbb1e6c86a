//! Config manager: where `config.toml` lives and how it is loaded and saved

use crate::persistence::ConfigFile;
use crate::{Config, ConfigError, ConfigResult, ValidationError};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";

type Override = fn(&mut Config, &str) -> Result<(), String>;

/// Environment variables that take precedence over the file
const ENV_OVERRIDES: &[(&str, Override)] = &[
    ("TABBY_APP_DATABASE_PATH", override_database_path),
    ("TABBY_APP_LOG_LEVEL", override_log_level),
    ("TABBY_APP_MAX_CONNECTIONS", override_max_connections),
    ("TABBY_APP_ENABLE_WAL", override_enable_wal),
];

fn override_database_path(config: &mut Config, value: &str) -> Result<(), String> {
    config.app.database_path = PathBuf::from(value);
    Ok(())
}

fn override_log_level(config: &mut Config, value: &str) -> Result<(), String> {
    config.app.log_level = value.parse().map_err(|e: ValidationError| e.to_string())?;
    Ok(())
}

fn override_max_connections(config: &mut Config, value: &str) -> Result<(), String> {
    config.app.max_connections = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a connection count", value))?;
    Ok(())
}

fn override_enable_wal(config: &mut Config, value: &str) -> Result<(), String> {
    config.app.enable_wal = match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => return Err(format!("'{}' is not a boolean", value)),
    };
    Ok(())
}

/// Applies every `TABBY_APP_*` variable that `lookup` knows about
///
/// A value that does not parse is skipped with a warning and the file value
/// stays. Returns how many overrides were applied.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> usize {
    let mut applied = 0;
    for &(name, apply) in ENV_OVERRIDES {
        let Some(value) = lookup(name) else {
            continue;
        };
        match apply(config, &value) {
            Ok(()) => {
                log::debug!("{} overrides the config file", name);
                applied += 1;
            }
            Err(reason) => log::warn!("Ignoring {}: {}", name, reason),
        }
    }
    applied
}

/// Entry point for everything config related
///
/// A missing file means defaults. Loading is lenient about invalid values so
/// a hand-edited file can still be opened and repaired; saving is not.
pub struct ConfigManager {
    config_dir: PathBuf,
    file: ConfigFile,
}

impl ConfigManager {
    /// Uses the platform's per-user config directory for `tabby`
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "tabby").ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_directory(dirs.config_dir()))
    }

    pub fn with_directory(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            file: ConfigFile::new(config_dir.join(CONFIG_FILE_NAME)),
            config_dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    /// Where the previous file is kept after each save
    pub fn backup_path(&self) -> PathBuf {
        self.file.backup_path()
    }

    pub fn load(&self) -> ConfigResult<Config> {
        let config = match self.file.read()? {
            Some(config) => config,
            None => {
                log::info!(
                    "No config at {}, using defaults",
                    self.config_path().display()
                );
                return Ok(Config::default());
            }
        };

        if let Err(errors) = config.validate() {
            log::warn!("{}", ConfigError::Invalid(errors));
        }
        Ok(config)
    }

    /// Never fails; a file that cannot be loaded is logged and ignored
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("{}, using defaults", e);
            Config::default()
        })
    }

    /// Loads the file, then lets `TABBY_APP_*` variables override it
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Writes `config` if every section is valid
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config.validate().map_err(ConfigError::Invalid)?;
        self.file.write(config)
    }

    /// Load, modify and save in one step
    ///
    /// ```rust,no_run
    /// # use tabby_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.library.trim_category_names = false;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes the defaults unless a file is already there
    ///
    /// Returns true when a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            return Ok(false);
        }
        self.file.write(&Config::default())?;
        Ok(true)
    }

    pub fn reset(&self) -> ConfigResult<()> {
        self.file.write(&Config::default())
    }

    /// Every invalid field in the file as it is now
    pub fn validate(&self) -> ConfigResult<Vec<ValidationError>> {
        Ok(self.load()?.validate().err().unwrap_or_default())
    }

    /// The database file `config` points at
    ///
    /// A relative path is taken relative to the config directory, so the
    /// library does not depend on the working directory it was started from.
    pub fn database_path(&self, config: &Config) -> PathBuf {
        let path = &config.app.database_path;
        if path.is_absolute() {
            path.clone()
        } else {
            self.config_dir.join(path)
        }
    }
}
