//! Database query operations organized by entity

pub mod books;
pub mod categories;
pub mod memberships;

pub use books::{list_books, upsert_book};
pub use categories::{create_category, delete_category, list_categories};
pub use memberships::{
    apply_additions, associate, is_member, list_books_in_category, remove_book_from_category,
    set_rating,
};
