//! Category database operations

use crate::DbPool;
use sqlx::Row;
use tabby_core::{AppError, Category, CategoryName, Timestamp};

/// Creates a category at the end of the user's ordering
///
/// Fails with `DuplicateRecord` if a category with the exact same name exists.
pub async fn create_category(pool: &DbPool, category: &Category) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO categories (name, position, created_at)
        VALUES (?, (SELECT COALESCE(MAX(position) + 1, 0) FROM categories), ?)
        "#,
    )
    .bind(category.name.as_str())
    .bind(category.created_at.as_millis())
    .execute(pool)
    .await
    .map_err(|e| {
        let duplicate = e
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if duplicate {
            AppError::DuplicateRecord {
                entity: "Category".to_string(),
                identifier: category.name.to_string(),
            }
        } else {
            AppError::database("Failed to create category", e)
        }
    })?;

    Ok(())
}

/// Lists all categories in creation order
pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>, AppError> {
    let rows = sqlx::query("SELECT name, created_at FROM categories ORDER BY position")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list categories", e))?;

    rows.into_iter()
        .map(|row| {
            let name: String = row
                .try_get("name")
                .map_err(|e| AppError::database("Missing category name", e))?;
            let created_at: i64 = row
                .try_get("created_at")
                .map_err(|e| AppError::database("Missing created_at", e))?;

            Ok(Category {
                name: CategoryName::new(name),
                created_at: Timestamp::from_millis(created_at),
            })
        })
        .collect()
}

/// Deletes a category and its memberships; the books themselves stay
pub async fn delete_category(pool: &DbPool, name: &CategoryName) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE name = ?")
        .bind(name.as_str())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to delete category", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Category", name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::create_test_db;
    use crate::migrations::run_migrations;

    async fn setup() -> DbPool {
        let pool = create_test_db().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let pool = setup().await;
        assert!(list_categories(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_keep_creation_order() {
        let pool = setup().await;
        for name in ["To Read", "Fiction", "Abandoned"] {
            create_category(&pool, &Category::new(name)).await.unwrap();
        }

        let names: Vec<String> = list_categories(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(names, vec!["To Read", "Fiction", "Abandoned"]);
    }

    #[tokio::test]
    async fn test_duplicate_category_rejected() {
        let pool = setup().await;
        create_category(&pool, &Category::new("Fiction")).await.unwrap();

        let result = create_category(&pool, &Category::new("Fiction")).await;
        assert!(matches!(result, Err(AppError::DuplicateRecord { .. })));
    }

    #[tokio::test]
    async fn test_names_differing_in_case_are_distinct() {
        let pool = setup().await;
        create_category(&pool, &Category::new("Fiction")).await.unwrap();
        create_category(&pool, &Category::new("fiction")).await.unwrap();

        let names: Vec<String> = list_categories(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(names, vec!["Fiction", "fiction"]);
    }

    #[tokio::test]
    async fn test_delete_category() {
        let pool = setup().await;
        create_category(&pool, &Category::new("Fiction")).await.unwrap();

        delete_category(&pool, &"Fiction".into()).await.unwrap();
        assert!(list_categories(&pool).await.unwrap().is_empty());

        let missing = delete_category(&pool, &"Fiction".into()).await;
        assert!(matches!(missing, Err(AppError::RecordNotFound { .. })));
    }
}
