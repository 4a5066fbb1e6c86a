//! Errors surfaced to the UI shell

use tabby_config::ConfigError;
use tabby_core::{AppError, BookId, CategoryName};
use thiserror::Error;

/// A selection that cannot be committed as it stands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select at least one category.")]
    NoCategorySelected,

    #[error("Please select at least one book.")]
    NoBookSelected,

    #[error("Category '{0}' no longer exists.")]
    UnknownCategory(CategoryName),
}

#[derive(Error, Debug)]
pub enum LibraryError {
    /// Every problem with the selection, all reported in one go
    #[error("Invalid selection: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The store could not be read; never the same thing as "empty"
    #[error("Failed to read the library: {0}")]
    RetrievalFailure(#[source] AppError),

    /// The commit write did not go through; the selection is still intact
    #[error("Failed to add books to categories: {0}")]
    PersistenceFailure(#[source] AppError),

    /// A candidate book broke the entity contract (no id)
    #[error("Invalid entity: {0}")]
    InvalidEntity(#[source] AppError),

    #[error("A commit is already in progress")]
    CommitInProgress,

    #[error("Category already exists: {0}")]
    DuplicateCategory(CategoryName),

    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryName),

    #[error("Invalid category name: {0}")]
    InvalidCategoryName(String),

    #[error("Rating {0} is out of range")]
    InvalidRating(u8),

    #[error("Book {book_id} is not in category {category}")]
    MembershipNotFound {
        book_id: BookId,
        category: CategoryName,
    },

    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl LibraryError {
    /// Text suitable for an inline message or toast
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => join_messages(errors),
            Self::RetrievalFailure(_) => {
                "Could not load your library. Please try again.".to_string()
            }
            Self::PersistenceFailure(_) => "Failed to add books to categories.".to_string(),
            Self::InvalidEntity(_) => "One of the selected books could not be added.".to_string(),
            Self::CommitInProgress => "Still adding your books, please wait.".to_string(),
            Self::DuplicateCategory(name) => {
                format!("A category named \"{}\" already exists.", name)
            }
            Self::CategoryNotFound(name) => format!("Category \"{}\" was not found.", name),
            Self::InvalidCategoryName(reason) => format!("Invalid category name: {}.", reason),
            Self::InvalidRating(_) => {
                format!("Ratings go from 0 to {}.", tabby_core::MAX_RATING)
            }
            Self::MembershipNotFound { category, .. } => {
                format!("That book is not in \"{}\".", category)
            }
            Self::Database(e) => e.user_message(),
            Self::Config(_) => "The configuration file could not be used.".to_string(),
        }
    }

    /// True when the caller can simply let the user try again
    ///
    /// Nothing in this crate is fatal to the host process; only storage
    /// corruption and broken configuration need more than a retry.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Database(e) => !e.is_critical(),
            Self::Config(_) | Self::InvalidEntity(_) => false,
            _ => true,
        }
    }

    /// The validation errors, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
