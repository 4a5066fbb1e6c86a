//! Volatile in-process gateway

use super::{AdditionBatch, PersistenceGateway};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tabby_core::{AppError, Book, BookId, Category, CategoryName, Membership, MAX_RATING};

#[derive(Debug, Clone, Default)]
struct Store {
    categories: Vec<Category>,
    books: BTreeMap<BookId, Book>,
    memberships: Vec<Membership>,
}

impl Store {
    fn has_category(&self, name: &CategoryName) -> bool {
        self.categories.iter().any(|c| &c.name == name)
    }

    fn has_membership(&self, book_id: &BookId, category: &CategoryName) -> bool {
        self.memberships
            .iter()
            .any(|m| &m.book_id == book_id && &m.category == category)
    }

    fn membership_mut(
        &mut self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<&mut Membership, AppError> {
        self.memberships
            .iter_mut()
            .find(|m| &m.book_id == book_id && &m.category == category)
            .ok_or_else(|| {
                AppError::not_found("Membership", format!("{} in {}", book_id, category))
            })
    }

    fn upsert_book(&mut self, book: &Book) -> Result<(), AppError> {
        if book.id.is_blank() {
            return Err(AppError::invalid_entity("Book", "cannot store a book without an id"));
        }

        let stored = Book {
            rating: None,
            ..book.clone()
        };
        self.books.insert(stored.id.clone(), stored);
        Ok(())
    }

    fn associate(&mut self, book_id: &BookId, category: &CategoryName) -> Result<(), AppError> {
        if !self.has_category(category) {
            return Err(AppError::not_found("Category", category));
        }
        if !self.books.contains_key(book_id) {
            return Err(AppError::not_found("Book", book_id));
        }

        if !self.has_membership(book_id, category) {
            self.memberships
                .push(Membership::new(book_id.clone(), category.clone()));
        }
        Ok(())
    }
}

/// Gateway that keeps everything in memory
///
/// Same semantics as the SQLite store: ordered categories, case-sensitive
/// unique names, idempotent `associate`, per-membership ratings and
/// all-or-nothing batches. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: Mutex<Store>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut Store) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut store = self.store.lock().map_err(|_| AppError::InternalError {
            message: "memory store lock poisoned".to_string(),
        })?;
        f(&mut store)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.with_store(|store| Ok(store.categories.clone()))
    }

    async fn list_books_in_category(
        &self,
        category: &CategoryName,
    ) -> Result<Vec<Book>, AppError> {
        self.with_store(|store| {
            Ok(store
                .memberships
                .iter()
                .filter(|m| &m.category == category)
                .filter_map(|m| {
                    store.books.get(&m.book_id).map(|book| Book {
                        rating: Some(m.rating),
                        ..book.clone()
                    })
                })
                .collect())
        })
    }

    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        self.with_store(|store| {
            let mut books: Vec<Book> = store.books.values().cloned().collect();
            books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
            Ok(books)
        })
    }

    async fn is_member(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<bool, AppError> {
        self.with_store(|store| Ok(store.has_membership(book_id, category)))
    }

    async fn upsert_book(&self, book: &Book) -> Result<(), AppError> {
        self.with_store(|store| store.upsert_book(book))
    }

    async fn associate(&self, book_id: &BookId, category: &CategoryName) -> Result<(), AppError> {
        self.with_store(|store| store.associate(book_id, category))
    }

    async fn apply_additions(&self, batch: &AdditionBatch) -> Result<(), AppError> {
        self.with_store(|store| {
            let mut staged = store.clone();
            for book in &batch.books {
                staged.upsert_book(book)?;
            }
            for membership in &batch.memberships {
                staged.associate(&membership.book_id, &membership.category)?;
            }
            *store = staged;
            Ok(())
        })
    }

    async fn create_category(&self, category: &Category) -> Result<(), AppError> {
        self.with_store(|store| {
            if store.has_category(&category.name) {
                return Err(AppError::DuplicateRecord {
                    entity: "Category".to_string(),
                    identifier: category.name.to_string(),
                });
            }
            store.categories.push(category.clone());
            Ok(())
        })
    }

    async fn delete_category(&self, name: &CategoryName) -> Result<(), AppError> {
        self.with_store(|store| {
            if !store.has_category(name) {
                return Err(AppError::not_found("Category", name));
            }
            store.categories.retain(|c| &c.name != name);
            store.memberships.retain(|m| &m.category != name);
            Ok(())
        })
    }

    async fn set_rating(
        &self,
        book_id: &BookId,
        category: &CategoryName,
        rating: u8,
    ) -> Result<(), AppError> {
        if rating > MAX_RATING {
            return Err(AppError::InvalidArgument {
                argument: "rating".to_string(),
                reason: format!("must be between 0 and {}", MAX_RATING),
            });
        }

        self.with_store(|store| {
            store.membership_mut(book_id, category)?.rating = rating;
            Ok(())
        })
    }

    async fn remove_book_from_category(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> Result<(), AppError> {
        self.with_store(|store| {
            store.membership_mut(book_id, category)?;
            store
                .memberships
                .retain(|m| !(&m.book_id == book_id && &m.category == category));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabby_core::UNRATED;

    async fn setup() -> MemoryGateway {
        let gateway = MemoryGateway::new();
        gateway.create_category(&Category::new("Fiction")).await.unwrap();
        gateway.create_category(&Category::new("Classics")).await.unwrap();
        gateway
    }

    fn fiction() -> CategoryName {
        CategoryName::from("Fiction")
    }

    #[tokio::test]
    async fn test_categories_keep_insertion_order() {
        let gateway = setup().await;
        gateway.create_category(&Category::new("Abandoned")).await.unwrap();

        let names: Vec<String> = gateway
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(names, vec!["Fiction", "Classics", "Abandoned"]);
    }

    #[tokio::test]
    async fn test_duplicate_category_is_case_sensitive() {
        let gateway = setup().await;

        let duplicate = gateway.create_category(&Category::new("Fiction")).await;
        assert!(matches!(duplicate, Err(AppError::DuplicateRecord { .. })));

        gateway.create_category(&Category::new("fiction")).await.unwrap();
        assert_eq!(gateway.list_categories().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_associate_is_idempotent_and_keeps_rating() {
        let gateway = setup().await;
        let book = Book::new("b1", "Dune");
        gateway.upsert_book(&book).await.unwrap();
        gateway.associate(&book.id, &fiction()).await.unwrap();
        gateway.set_rating(&book.id, &fiction(), 3).await.unwrap();

        gateway.associate(&book.id, &fiction()).await.unwrap();

        let books = gateway.list_books_in_category(&fiction()).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].rating, Some(3));
        assert!(gateway.is_member(&book.id, &fiction()).await.unwrap());
        assert!(!gateway.is_member(&book.id, &"Classics".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_new_membership_is_unrated() {
        let gateway = setup().await;
        let book = Book::new("b1", "Dune").with_rating(5);
        gateway.upsert_book(&book).await.unwrap();
        gateway.associate(&book.id, &fiction()).await.unwrap();

        let books = gateway.list_books_in_category(&fiction()).await.unwrap();
        assert_eq!(books[0].rating, Some(UNRATED));
        assert_eq!(gateway.list_books().await.unwrap()[0].rating, None);
    }

    #[tokio::test]
    async fn test_associate_requires_category_and_book() {
        let gateway = setup().await;
        let book = Book::new("b1", "Dune");

        let no_book = gateway.associate(&book.id, &fiction()).await;
        assert!(matches!(no_book, Err(AppError::RecordNotFound { .. })));

        gateway.upsert_book(&book).await.unwrap();
        let no_category = gateway.associate(&book.id, &"Poetry".into()).await;
        assert!(matches!(no_category, Err(AppError::RecordNotFound { .. })));
    }

    #[tokio::test]
    async fn test_apply_additions_is_all_or_nothing() {
        let gateway = setup().await;
        let batch = AdditionBatch {
            books: vec![Book::new("b1", "Dune")],
            memberships: vec![
                Membership::new(BookId::new("b1"), fiction()),
                Membership::new(BookId::new("b1"), CategoryName::from("Missing")),
            ],
        };

        assert!(gateway.apply_additions(&batch).await.is_err());
        assert!(gateway.list_books().await.unwrap().is_empty());
        assert!(gateway
            .list_books_in_category(&fiction())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_category_drops_memberships() {
        let gateway = setup().await;
        let book = Book::new("b1", "Dune");
        gateway.upsert_book(&book).await.unwrap();
        gateway.associate(&book.id, &fiction()).await.unwrap();

        gateway.delete_category(&fiction()).await.unwrap();
        gateway.create_category(&Category::new("Fiction")).await.unwrap();

        assert!(gateway
            .list_books_in_category(&fiction())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(gateway.list_books().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rating_and_removal_need_membership() {
        let gateway = setup().await;
        let book = Book::new("b1", "Dune");
        gateway.upsert_book(&book).await.unwrap();

        let rate = gateway.set_rating(&book.id, &fiction(), 2).await;
        assert!(matches!(rate, Err(AppError::RecordNotFound { .. })));

        gateway.associate(&book.id, &fiction()).await.unwrap();
        let too_high = gateway.set_rating(&book.id, &fiction(), MAX_RATING + 1).await;
        assert!(matches!(too_high, Err(AppError::InvalidArgument { .. })));

        gateway
            .remove_book_from_category(&book.id, &fiction())
            .await
            .unwrap();
        let again = gateway.remove_book_from_category(&book.id, &fiction()).await;
        assert!(matches!(again, Err(AppError::RecordNotFound { .. })));
    }
}
