//! Selection Session
//!
//! The transient picks the user makes while the add flow is open. It lives
//! only in memory and is owned by whoever drives the UI; the add workflow
//! borrows it for a single commit.

use tabby_core::{Book, BookId, CategoryName, SessionId};

/// Books and categories currently picked for one add operation
///
/// Both sets keep the order in which items were first selected. Books are
/// keyed by id, so two candidates sharing an id are one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSession {
    id: SessionId,
    books: Vec<Book>,
    categories: Vec<CategoryName>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            books: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Selects the book if it is not selected, deselects it otherwise
    ///
    /// Returns whether the book is selected afterwards.
    pub fn toggle_book(&mut self, book: &Book) -> bool {
        if let Some(index) = self.books.iter().position(|b| b.id == book.id) {
            self.books.remove(index);
            false
        } else {
            self.books.push(book.clone());
            true
        }
    }

    /// Same toggle as [`toggle_book`](Self::toggle_book), keyed by exact name
    pub fn toggle_category(&mut self, name: impl Into<CategoryName>) -> bool {
        let name = name.into();
        if let Some(index) = self.categories.iter().position(|c| *c == name) {
            self.categories.remove(index);
            false
        } else {
            self.categories.push(name);
            true
        }
    }

    pub fn is_book_selected(&self, id: &BookId) -> bool {
        self.books.iter().any(|b| &b.id == id)
    }

    pub fn is_category_selected(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.as_str() == name)
    }

    pub fn selected_books(&self) -> &[Book] {
        &self.books
    }

    pub fn selected_categories(&self) -> &[CategoryName] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.categories.is_empty()
    }

    /// Empties both sets; the session id stays the same
    pub fn clear(&mut self) {
        self.books.clear();
        self.categories.clear();
    }

    /// Closes the add flow without writing anything
    pub fn cancel(self) {
        log::debug!(
            "Session {} cancelled with {} book(s) and {} category(ies) selected",
            self.id,
            self.books.len(),
            self.categories.len()
        );
    }
}

impl Default for SelectionSession {
    fn default() -> Self {
        Self::new()
    }
}
