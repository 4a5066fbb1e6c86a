//! Book-in-category membership operations

use crate::queries::books::{row_to_book, write_book, BOOK_COLUMNS};
use crate::DbPool;
use sqlx::Sqlite;
use tabby_core::{AppError, Book, BookId, CategoryName, Membership, MAX_RATING};

/// Adds a book to a category as an unrated member
///
/// Re-adding an existing member is a no-op that keeps its current rating.
/// Fails if the book or the category does not exist.
pub async fn associate(
    pool: &DbPool,
    book_id: &BookId,
    category: &CategoryName,
) -> Result<(), AppError> {
    write_membership(pool, &Membership::new(book_id.clone(), category.clone())).await
}

async fn write_membership<'e, E>(executor: E, membership: &Membership) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO category_books (category_name, book_id, rating, added_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(category_name, book_id) DO NOTHING
        "#,
    )
    .bind(membership.category.as_str())
    .bind(membership.book_id.as_str())
    .bind(i64::from(membership.rating))
    .bind(membership.added_at.as_millis())
    .execute(executor)
    .await
    .map_err(|e| {
        AppError::database(
            format!(
                "Failed to add book {} to category {}",
                membership.book_id, membership.category
            ),
            e,
        )
    })?;

    Ok(())
}

/// Upserts every book and inserts every membership in a single transaction
///
/// Either all rows are committed or none are.
pub async fn apply_additions(
    pool: &DbPool,
    books: &[Book],
    memberships: &[Membership],
) -> Result<(), AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to begin transaction", e))?;

    for book in books {
        write_book(&mut *tx, book).await?;
    }

    for membership in memberships {
        write_membership(&mut *tx, membership).await?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit additions", e))?;

    log::debug!(
        "Committed {} book(s) and {} membership(s)",
        books.len(),
        memberships.len()
    );
    Ok(())
}

/// Lists the books in a category, each carrying its rating there
pub async fn list_books_in_category(
    pool: &DbPool,
    category: &CategoryName,
) -> Result<Vec<Book>, AppError> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {BOOK_COLUMNS}, cb.rating
        FROM books b
        JOIN category_books cb ON b.id = cb.book_id
        WHERE cb.category_name = ?
        ORDER BY cb.added_at, b.title
        "#
    ))
    .bind(category.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list books in category", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Returns true if the book is a member of the category
pub async fn is_member(
    pool: &DbPool,
    book_id: &BookId,
    category: &CategoryName,
) -> Result<bool, AppError> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT rating FROM category_books WHERE category_name = ? AND book_id = ?",
    )
    .bind(category.as_str())
    .bind(book_id.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to check membership", e))?;

    Ok(found.is_some())
}

/// Sets the rating of one membership
pub async fn set_rating(
    pool: &DbPool,
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

    let result = sqlx::query(
        "UPDATE category_books SET rating = ? WHERE category_name = ? AND book_id = ?",
    )
    .bind(i64::from(rating))
    .bind(category.as_str())
    .bind(book_id.as_str())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to update rating", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(
            "Membership",
            format!("{} in {}", book_id, category),
        ));
    }

    Ok(())
}

/// Removes a book from a category; the book itself stays stored
pub async fn remove_book_from_category(
    pool: &DbPool,
    book_id: &BookId,
    category: &CategoryName,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM category_books WHERE category_name = ? AND book_id = ?")
        .bind(category.as_str())
        .bind(book_id.as_str())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to remove book from category", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(
            "Membership",
            format!("{} in {}", book_id, category),
        ));
    }

    Ok(())
}
