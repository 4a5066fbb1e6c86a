//! Shared fixtures for library integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tabby_core::{AppError, Book, BookId, Category, CategoryName};
use tabby_library::{AdditionBatch, MemoryGateway, PersistenceGateway};
use tokio::sync::Notify;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Memory gateway with switchable failures and a record of every batch
#[derive(Default)]
pub struct FlakyGateway {
    inner: MemoryGateway,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    batches: Mutex<Vec<AdditionBatch>>,
    gate: Option<Arc<Notify>>,
}

impl FlakyGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches wait for one `notify_one` on `gate` before writing
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub async fn with_categories(names: &[&str]) -> Self {
        let gateway = Self::new();
        gateway.seed_categories(names).await;
        gateway
    }

    pub async fn seed_categories(&self, names: &[&str]) {
        for name in names {
            self.inner
                .create_category(&Category::new(*name))
                .await
                .expect("seed category");
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<AdditionBatch> {
        self.batches.lock().expect("batches lock").clone()
    }

    fn record(&self, batch: &AdditionBatch) {
        self.batches
            .lock()
            .expect("batches lock")
            .push(batch.clone());
    }

    fn check_read(&self, operation: &str) -> Result<(), AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseLocked {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, operation: &str) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseLocked {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for FlakyGateway {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.check_read("list_categories")?;
        self.inner.list_categories().await
    }

    async fn list_books_in_category(
        &self,
        category: &CategoryName,
    ) -> Result<Vec<Book>, AppError> {
        self.check_read("list_books_in_category")?;
        self.inner.list_books_in_category(category).await
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        self.check_read("list_books")?;
        self.inner.list_books().await
    }

    async fn is_member(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<bool, AppError> {
        self.check_read("is_member")?;
        self.inner.is_member(book_id, category).await
    }

    async fn upsert_book(&self, book: &Book) -> Result<(), AppError> {
        self.check_write("upsert_book")?;
        self.inner.upsert_book(book).await
    }

    async fn associate(&self, book_id: &BookId, category: &CategoryName) -> Result<(), AppError> {
        self.check_write("associate")?;
        self.inner.associate(book_id, category).await
    }

    async fn apply_additions(&self, batch: &AdditionBatch) -> Result<(), AppError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.check_write("apply_additions")?;
        self.record(batch);
        self.inner.apply_additions(batch).await
    }

    async fn create_category(&self, category: &Category) -> Result<(), AppError> {
        self.check_write("create_category")?;
        self.inner.create_category(category).await
    }

    async fn delete_category(&self, name: &CategoryName) -> Result<(), AppError> {
        self.check_write("delete_category")?;
        self.inner.delete_category(name).await
    }

    async fn set_rating(
        &self,
        book_id: &BookId,
        category: &CategoryName,
        rating: u8,
    ) -> Result<(), AppError> {
        self.check_write("set_rating")?;
        self.inner.set_rating(book_id, category, rating).await
    }

    async fn remove_book_from_category(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<(), AppError> {
        self.check_write("remove_book_from_category")?;
        self.inner.remove_book_from_category(book_id, category).await
    }
}
