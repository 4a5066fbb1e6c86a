//! Book domain model

use crate::error::AppError;
use crate::types::Validator;
use serde::{Deserialize, Deserializer, Serialize};

/// Rating value of a book that has not been rated yet
pub const UNRATED: u8 = 0;

/// Highest rating a user can give
pub const MAX_RATING: u8 = 5;

/// Stable identifier assigned by the search/scan provider
///
/// Providers hand out either string or numeric ids; both deserialize into the
/// same textual form. A blank id means the provider omitted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Creates a BookId from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the provider did not supply an id
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for BookId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for BookId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A book as discovered by search/scan and stored in the library
///
/// Everything except `rating` is descriptive pass-through data. `rating` is the
/// book's rating within one category; `None` means the source never set it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: BookId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Book {
    /// Creates a new book with required fields
    pub fn new(id: impl Into<BookId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            publisher: None,
            published_date: None,
            description: None,
            isbn: None,
            page_count: None,
            thumbnail_url: None,
            rating: None,
        }
    }

    /// Adds an author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Sets the rating
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Returns true if the book carries a non-zero rating
    pub fn is_rated(&self) -> bool {
        matches!(self.rating, Some(r) if r > UNRATED)
    }

    /// Returns a copy ready to enter a category: same identity and
    /// descriptive data, rating forced to [`UNRATED`]
    ///
    /// Fails with `InvalidEntity` if the book has no id.
    pub fn normalize_for_addition(&self) -> Result<Book, AppError> {
        if self.id.is_blank() {
            return Err(AppError::invalid_entity(
                "Book",
                format!("'{}' has no identifier", self.title),
            ));
        }

        Ok(Book {
            rating: Some(UNRATED),
            ..self.clone()
        })
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.id.is_blank() {
            errors.push("Book id cannot be empty".to_string());
        }

        if let Some(rating) = self.rating {
            if rating > MAX_RATING {
                errors.push(format!("Rating must be between 0 and {}", MAX_RATING));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
