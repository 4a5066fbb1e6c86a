//! Category Store
//!
//! Read access to the user's categories, plus the startup question of
//! whether the user has any yet. A failed read is never reported as "no
//! categories".

use crate::error::{LibraryError, LibraryResult};
use crate::gateway::PersistenceGateway;
use std::sync::Arc;
use tabby_config::LibraryConfig;
use tabby_core::{AppError, Book, Category, CategoryName};

/// Where the shell should send the user on launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupRoute {
    /// No categories yet: show the welcome flow
    Onboarding,
    /// At least one category: go straight to the library
    Library,
}

/// Rules applied to new category names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPolicy {
    pub max_name_length: usize,
    pub trim_names: bool,
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self::from(&LibraryConfig::default())
    }
}

impl From<&LibraryConfig> for CategoryPolicy {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            max_name_length: config.max_category_name_length,
            trim_names: config.trim_category_names,
        }
    }
}

impl CategoryPolicy {
    /// Applies trimming and length rules; case is kept as typed
    pub fn normalize_name(&self, raw: &str) -> LibraryResult<CategoryName> {
        let name = if self.trim_names { raw.trim() } else { raw };

        if name.trim().is_empty() {
            return Err(LibraryError::InvalidCategoryName(
                "name cannot be empty".to_string(),
            ));
        }

        let length = name.chars().count();
        if length > self.max_name_length {
            return Err(LibraryError::InvalidCategoryName(format!(
                "name is {} characters, the limit is {}",
                length, self.max_name_length
            )));
        }

        Ok(CategoryName::new(name))
    }
}

/// Per-category counts for a library overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: CategoryName,
    pub book_count: usize,
    pub rated_count: usize,
}

pub struct CategoryStore<G> {
    gateway: Arc<G>,
    policy: CategoryPolicy,
}

impl<G: PersistenceGateway> CategoryStore<G> {
    pub fn new(gateway: Arc<G>, policy: CategoryPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> CategoryPolicy {
        self.policy
    }

    /// All categories in store order
    pub async fn list_categories(&self) -> LibraryResult<Vec<Category>> {
        self.gateway
            .list_categories()
            .await
            .map_err(LibraryError::RetrievalFailure)
    }

    pub async fn has_any_category(&self) -> LibraryResult<bool> {
        Ok(!self.list_categories().await?.is_empty())
    }

    /// Decides the launch screen; a read failure is an error, not onboarding
    pub async fn startup_route(&self) -> LibraryResult<StartupRoute> {
        let route = if self.has_any_category().await? {
            StartupRoute::Library
        } else {
            StartupRoute::Onboarding
        };
        log::debug!("Startup route: {:?}", route);
        Ok(route)
    }

    pub async fn create_category(&self, raw_name: &str) -> LibraryResult<Category> {
        let category = Category::new(self.policy.normalize_name(raw_name)?);

        match self.gateway.create_category(&category).await {
            Ok(()) => {
                log::info!("Created category '{}'", category.name);
                Ok(category)
            }
            Err(AppError::DuplicateRecord { .. }) => {
                Err(LibraryError::DuplicateCategory(category.name))
            }
            Err(e) => Err(LibraryError::Database(e)),
        }
    }

    /// Deletes the category and its memberships; the books stay stored
    pub async fn delete_category(&self, name: &CategoryName) -> LibraryResult<()> {
        match self.gateway.delete_category(name).await {
            Ok(()) => {
                log::info!("Deleted category '{}'", name);
                Ok(())
            }
            Err(AppError::RecordNotFound { .. }) => {
                Err(LibraryError::CategoryNotFound(name.clone()))
            }
            Err(e) => Err(LibraryError::Database(e)),
        }
    }

    /// Books in one category, each with its rating there
    pub async fn list_books(&self, name: &CategoryName) -> LibraryResult<Vec<Book>> {
        self.gateway
            .list_books_in_category(name)
            .await
            .map_err(LibraryError::RetrievalFailure)
    }

    pub async fn summaries(&self) -> LibraryResult<Vec<CategorySummary>> {
        let mut summaries = Vec::new();
        for category in self.list_categories().await? {
            let books = self.list_books(&category.name).await?;
            summaries.push(CategorySummary {
                rated_count: books.iter().filter(|b| b.is_rated()).count(),
                book_count: books.len(),
                name: category.name,
            });
        }
        Ok(summaries)
    }
}
