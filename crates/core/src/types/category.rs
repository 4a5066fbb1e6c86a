//! Category and membership domain models

use crate::types::{BookId, Timestamp, Validator, UNRATED};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Name of a user-defined category
///
/// Names are case-sensitive and double as the storage key, so "Fiction" and
/// "fiction" are two different categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CategoryName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CategoryName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for CategoryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A user-defined category of books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: CategoryName,
    pub created_at: Timestamp,
}

impl Category {
    /// Creates a new category stamped with the current time
    pub fn new(name: impl Into<CategoryName>) -> Self {
        Self {
            name: name.into(),
            created_at: Timestamp::now(),
        }
    }
}

impl Validator for Category {
    fn validate(&self) -> Result<(), Vec<String>> {
        if self.name.as_str().trim().is_empty() {
            Err(vec!["Category name cannot be empty".to_string()])
        } else {
            Ok(())
        }
    }
}

/// A book's membership in one category, carrying its rating there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub book_id: BookId,
    pub category: CategoryName,
    pub rating: u8,
    pub added_at: Timestamp,
}

impl Membership {
    /// Creates a fresh, unrated membership
    pub fn new(book_id: BookId, category: CategoryName) -> Self {
        Self {
            book_id,
            category,
            rating: UNRATED,
            added_at: Timestamp::now(),
        }
    }
}
