//! Configuration errors

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why `config.toml` could not be loaded, saved or used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot keep a backup of {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A present but blank file is treated as damaged, not as "use defaults"
    #[error("{} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("{} is not valid TOML: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {}", join_fields(.0))]
    Invalid(Vec<ValidationError>),

    #[error("This platform has no per-user config directory")]
    NoConfigDir,
}

impl ConfigError {
    /// The rejected fields, when the values themselves were the problem
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

fn join_fields(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One rejected field, addressed by its dotted TOML path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}{}", got(.value))]
pub struct ValidationError {
    /// e.g. `app.max_connections`
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

fn got(value: &Option<String>) -> String {
    value
        .as_ref()
        .map(|v| format!(" (got {})", v))
        .unwrap_or_default()
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}
