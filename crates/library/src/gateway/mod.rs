//! Persistence Gateway
//!
//! The storage contract the library core depends on. Every call is async and
//! single-shot, and a failure is always an `Err`, never an empty success.

mod memory;
mod sqlite;

pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;

use async_trait::async_trait;
use std::sync::Arc;
use tabby_core::{AppError, Book, BookId, Category, CategoryName, Membership};

/// Everything one commit writes: normalized books plus their new memberships
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionBatch {
    pub books: Vec<Book>,
    pub memberships: Vec<Membership>,
}

impl AdditionBatch {
    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty()
    }
}

/// Local book store
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// All categories, in the store's order
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    /// Books in a category, each carrying its rating there
    async fn list_books_in_category(&self, category: &CategoryName)
        -> Result<Vec<Book>, AppError>;

    /// Every stored book, unrated
    async fn list_books(&self) -> Result<Vec<Book>, AppError>;

    /// True if the book already belongs to the category
    async fn is_member(&self, book_id: &BookId, category: &CategoryName)
        -> Result<bool, AppError>;

    /// Inserts or refreshes a book's descriptive fields
    async fn upsert_book(&self, book: &Book) -> Result<(), AppError>;

    /// Adds an unrated membership; a no-op if it already exists
    async fn associate(&self, book_id: &BookId, category: &CategoryName) -> Result<(), AppError>;

    /// Writes a whole batch
    ///
    /// The provided version issues the calls one by one. Stores that can
    /// scope them in a transaction should override it.
    async fn apply_additions(&self, batch: &AdditionBatch) -> Result<(), AppError> {
        for book in &batch.books {
            self.upsert_book(book).await?;
        }
        for membership in &batch.memberships {
            self.associate(&membership.book_id, &membership.category)
                .await?;
        }
        Ok(())
    }

    /// Fails with `DuplicateRecord` when the name is taken
    async fn create_category(&self, category: &Category) -> Result<(), AppError>;

    /// Fails with `RecordNotFound` when no such category exists
    async fn delete_category(&self, name: &CategoryName) -> Result<(), AppError>;

    async fn set_rating(
        &self,
        book_id: &BookId,
        category: &CategoryName,
        rating: u8,
    ) -> Result<(), AppError>;

    async fn remove_book_from_category(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<(), AppError>;
}

#[async_trait]
impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Arc<G> {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        (**self).list_categories().await
    }

    async fn list_books_in_category(
        &self,
        category: &CategoryName,
    ) -> Result<Vec<Book>, AppError> {
        (**self).list_books_in_category(category).await
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        (**self).list_books().await
    }

    async fn is_member(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<bool, AppError> {
        (**self).is_member(book_id, category).await
    }

    async fn upsert_book(&self, book: &Book) -> Result<(), AppError> {
        (**self).upsert_book(book).await
    }

    async fn associate(&self, book_id: &BookId, category: &CategoryName) -> Result<(), AppError> {
        (**self).associate(book_id, category).await
    }

    async fn apply_additions(&self, batch: &AdditionBatch) -> Result<(), AppError> {
        (**self).apply_additions(batch).await
    }

    async fn create_category(&self, category: &Category) -> Result<(), AppError> {
        (**self).create_category(category).await
    }

    async fn delete_category(&self, name: &CategoryName) -> Result<(), AppError> {
        (**self).delete_category(name).await
    }

    async fn set_rating(
        &self,
        book_id: &BookId,
        category: &CategoryName,
        rating: u8,
    ) -> Result<(), AppError> {
        (**self).set_rating(book_id, category, rating).await
    }

    async fn remove_book_from_category(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<(), AppError> {
        (**self).remove_book_from_category(book_id, category).await
    }
}
