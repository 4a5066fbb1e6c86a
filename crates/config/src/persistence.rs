//! The `config.toml` file on disk
//!
//! A write never leaves a half-written file behind: the new contents go to a
//! sibling temp file that is then renamed over the old one. The file being
//! replaced is copied to `config.toml.backup` first.

use crate::{Config, ConfigError, ConfigResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reads and replaces one config file; knows nothing about validity
#[derive(Debug, Clone)]
pub(crate) struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("toml.backup")
    }

    /// Parses the file, or returns `None` when there is none yet
    pub fn read(&self) -> ConfigResult<Option<Config>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.path.clone(),
            });
        }

        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the file with `config`
    pub fn write(&self, config: &Config) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(config)?;
        let dir = self.directory();

        fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        if self.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|source| ConfigError::Backup {
                path: self.path.clone(),
                source,
            })?;
            log::debug!("Kept previous config as {}", backup.display());
        }

        let write_err = |source: io::Error| ConfigError::Write {
            path: self.path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged
            .write_all(contents.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(write_err)?;
        staged.persist(&self.path).map_err(|e| write_err(e.error))?;

        log::info!("Config written to {}", self.path.display());
        Ok(())
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}
