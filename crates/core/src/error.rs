//! Error types and recovery strategies for Tabby
//!
//! Storage-level errors are split into three severity tiers:
//! - **Recoverable**: Can be retried (locked database, interrupted write)
//! - **Degraded**: The failing operation is skipped but the app continues
//! - **Fatal**: Requires app restart or user intervention (corrupted database)
//!
//! Each error includes a recovery action so callers can decide between retrying,
//! showing a message, or shutting down.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recovery actions that can be taken when an error occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation immediately
    RetryImmediate,
    /// Retry with exponential backoff (e.g., database busy)
    RetryWithBackoff,
    /// Attempt to repair the database and retry
    RepairDatabase,
    /// Restore from the most recent backup
    RestoreBackup,
    /// Correct the input and try again
    CorrectInput,
    /// No automatic recovery - user intervention required
    UserIntervention,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryImmediate => write!(f, "Retrying immediately"),
            Self::RetryWithBackoff => write!(f, "Retrying with backoff"),
            Self::RepairDatabase => write!(f, "Repairing database"),
            Self::RestoreBackup => write!(f, "Restoring from backup"),
            Self::CorrectInput => write!(f, "Correct the input"),
            Self::UserIntervention => write!(f, "User intervention required"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be recovered from by retrying
    Recoverable,
    /// Operation failed but app can continue
    Degraded,
    /// Critical error requiring restart or user action
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Main error type for Tabby storage and entity operations
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Database Errors =====
    /// Database operation failed
    #[error("Database error: {message}")]
    DatabaseError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database is corrupted and needs repair
    #[error("Database corrupted: {details}")]
    DatabaseCorrupted { details: String },

    /// Database migration failed
    #[error("Migration failed: {version} - {reason}")]
    MigrationFailed { version: String, reason: String },

    /// Database is locked by another connection
    #[error("Database locked: {operation}")]
    DatabaseLocked { operation: String },

    /// Record not found in database
    #[error("Record not found: {entity} with {identifier}")]
    RecordNotFound { entity: String, identifier: String },

    /// Record already exists under a unique key
    #[error("Duplicate record: {entity} with {identifier}")]
    DuplicateRecord { entity: String, identifier: String },

    // ===== Entity Errors =====
    /// Entity is missing a required field or carries an invalid one
    #[error("Invalid {entity}: {reason}")]
    InvalidEntity { entity: String, reason: String },

    /// Invalid argument provided
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },

    // ===== File System Errors =====
    /// General I/O error
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    /// Permission denied for file operation
    #[error("Permission denied: {operation} on {path}")]
    PermissionDenied { operation: String, path: PathBuf },

    // ===== Generic Errors =====
    /// Generic internal error
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Operation cancelled by user
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },
}

impl AppError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DatabaseError { .. } | Self::DatabaseLocked { .. } | Self::IoError { .. } => {
                ErrorSeverity::Recoverable
            }

            Self::DatabaseCorrupted { .. }
            | Self::MigrationFailed { .. }
            | Self::PermissionDenied { .. } => ErrorSeverity::Fatal,

            _ => ErrorSeverity::Degraded,
        }
    }

    /// Returns the recommended recovery action for this error
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            Self::IoError { .. } => RecoveryAction::RetryImmediate,

            Self::DatabaseError { .. } | Self::DatabaseLocked { .. } => {
                RecoveryAction::RetryWithBackoff
            }

            Self::DatabaseCorrupted { .. } => RecoveryAction::RepairDatabase,

            Self::MigrationFailed { .. } => RecoveryAction::RestoreBackup,

            Self::DuplicateRecord { .. }
            | Self::InvalidEntity { .. }
            | Self::InvalidArgument { .. } => RecoveryAction::CorrectInput,

            _ => RecoveryAction::UserIntervention,
        }
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::DatabaseError { .. } | Self::DatabaseLocked { .. } => {
                "Your library is temporarily unavailable. Please try again.".to_string()
            }
            Self::DatabaseCorrupted { .. } => {
                "Your library data is damaged and needs repair.".to_string()
            }
            Self::MigrationFailed { .. } => {
                "Failed to update your library to the latest version.".to_string()
            }
            Self::RecordNotFound { entity, .. } => {
                format!("The requested {} was not found.", entity.to_lowercase())
            }
            Self::DuplicateRecord { entity, .. } => {
                format!("That {} already exists.", entity.to_lowercase())
            }
            Self::InvalidEntity { .. } => "This book is missing required information.".to_string(),
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
            Self::IoError { .. } => "A file operation failed. Please try again.".to_string(),
            Self::PermissionDenied { .. } => {
                "Permission denied. Please grant storage access in Settings.".to_string()
            }
            Self::InternalError { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            Self::Cancelled { .. } => "Operation was cancelled.".to_string(),
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Returns true if this error can be automatically retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.recovery_action(),
            RecoveryAction::RetryImmediate | RecoveryAction::RetryWithBackoff
        )
    }

    /// Helper to create a database error from any error type
    pub fn database<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Helper to create an invalid-entity error
    pub fn invalid_entity(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Helper to create a not-found error
    pub fn not_found(entity: impl Into<String>, identifier: impl fmt::Display) -> Self {
        Self::RecordNotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                operation: "file operation".to_string(),
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}
