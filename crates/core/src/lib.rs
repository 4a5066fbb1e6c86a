//! Tabby core domain: books, categories and the shared error taxonomy.

pub mod error;
pub mod types;

pub use error::{AppError, ErrorSeverity, RecoveryAction, Result};
pub use types::{
    Book, BookId, Category, CategoryName, Membership, SessionId, Timestamp, Validator,
    MAX_RATING, UNRATED,
};
