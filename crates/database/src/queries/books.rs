//! Book database operations

use crate::DbPool;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use tabby_core::{AppError, Book, BookId, Timestamp};

pub(crate) const BOOK_COLUMNS: &str = "b.id, b.title, b.authors, b.publisher, b.published_date, \
     b.description, b.isbn, b.page_count, b.thumbnail_url";

/// Inserts a book or refreshes its descriptive fields
///
/// Ratings are stored on memberships, so this never changes how a book is
/// rated in any category.
pub async fn upsert_book(pool: &DbPool, book: &Book) -> Result<(), AppError> {
    write_book(pool, book).await
}

/// Executor-generic upsert so batch writes can share a transaction
pub(crate) async fn write_book<'e, E>(executor: E, book: &Book) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    if book.id.is_blank() {
        return Err(AppError::invalid_entity("Book", "cannot store a book without an id"));
    }

    let authors_json = serde_json::to_string(&book.authors)
        .map_err(|e| AppError::database("Failed to serialize authors", e))?;
    let now = Timestamp::now().as_millis();

    sqlx::query(
        r#"
        INSERT INTO books (
            id, title, authors, publisher, published_date, description,
            isbn, page_count, thumbnail_url, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            authors = excluded.authors,
            publisher = excluded.publisher,
            published_date = excluded.published_date,
            description = excluded.description,
            isbn = excluded.isbn,
            page_count = excluded.page_count,
            thumbnail_url = excluded.thumbnail_url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(book.id.as_str())
    .bind(&book.title)
    .bind(authors_json)
    .bind(&book.publisher)
    .bind(&book.published_date)
    .bind(&book.description)
    .bind(&book.isbn)
    .bind(book.page_count.map(i64::from))
    .bind(&book.thumbnail_url)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(|e| AppError::database("Failed to upsert book", e))?;

    Ok(())
}

/// Lists every stored book, ordered by title
pub async fn list_books(pool: &DbPool) -> Result<Vec<Book>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {BOOK_COLUMNS} FROM books b ORDER BY b.title, b.id"
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list books", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Maps a row selected with [`BOOK_COLUMNS`] (plus an optional `rating`)
pub(crate) fn row_to_book(row: SqliteRow) -> Result<Book, AppError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing book ID", e))?;

    let authors_json: String = row
        .try_get("authors")
        .map_err(|e| AppError::database("Missing authors", e))?;
    let authors: Vec<String> = serde_json::from_str(&authors_json)
        .map_err(|e| AppError::database("Failed to deserialize authors", e))?;

    let page_count: Option<i64> = row
        .try_get("page_count")
        .map_err(|e| AppError::database("Missing page_count", e))?;

    // Only present when selected through a membership
    let rating: Option<i64> = row.try_get("rating").ok();

    Ok(Book {
        id: BookId::new(id),
        title: row
            .try_get("title")
            .map_err(|e| AppError::database("Missing title", e))?,
        authors,
        publisher: row.try_get("publisher").ok(),
        published_date: row.try_get("published_date").ok(),
        description: row.try_get("description").ok(),
        isbn: row.try_get("isbn").ok(),
        page_count: page_count.and_then(|p| u32::try_from(p).ok()),
        thumbnail_url: row.try_get("thumbnail_url").ok(),
        rating: rating.and_then(|r| u8::try_from(r).ok()),
    })
}
