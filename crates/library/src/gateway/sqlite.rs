//! SQLite-backed gateway

use super::{AdditionBatch, PersistenceGateway};
use async_trait::async_trait;
use tabby_core::{AppError, Book, BookId, Category, CategoryName};
use tabby_database::{queries, DbPool};

/// Gateway over a migrated `tabby-database` pool
///
/// Batches are written in a single transaction.
#[derive(Clone)]
pub struct SqliteGateway {
    pool: DbPool,
}

impl SqliteGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Waits for checked-out connections and closes the pool
    pub async fn close(&self) {
        tabby_database::connection::close(self.pool.clone()).await;
    }
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        queries::list_categories(&self.pool).await
    }

    async fn list_books_in_category(
        &self,
        category: &CategoryName,
    ) -> Result<Vec<Book>, AppError> {
        queries::list_books_in_category(&self.pool, category).await
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        queries::list_books(&self.pool).await
    }

    async fn is_member(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<bool, AppError> {
        queries::is_member(&self.pool, book_id, category).await
    }

    async fn upsert_book(&self, book: &Book) -> Result<(), AppError> {
        queries::upsert_book(&self.pool, book).await
    }

    async fn associate(&self, book_id: &BookId, category: &CategoryName) -> Result<(), AppError> {
        queries::associate(&self.pool, book_id, category).await
    }

    async fn apply_additions(&self, batch: &AdditionBatch) -> Result<(), AppError> {
        queries::apply_additions(&self.pool, &batch.books, &batch.memberships).await
    }

    async fn create_category(&self, category: &Category) -> Result<(), AppError> {
        queries::create_category(&self.pool, category).await
    }

    async fn delete_category(&self, name: &CategoryName) -> Result<(), AppError> {
        queries::delete_category(&self.pool, name).await
    }

    async fn set_rating(
        &self,
        book_id: &BookId,
        category: &CategoryName,
        rating: u8,
    ) -> Result<(), AppError> {
        queries::set_rating(&self.pool, book_id, category, rating).await
    }

    async fn remove_book_from_category(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<(), AppError> {
        queries::remove_book_from_category(&self.pool, book_id, category).await
    }
}
