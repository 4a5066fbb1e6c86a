use crate::categories::{CategoryPolicy, CategoryStore, StartupRoute};
use crate::error::{LibraryError, LibraryResult};
use crate::gateway::{PersistenceGateway, SqliteGateway};
use crate::session::SelectionSession;
use crate::workflow::AddToLibrary;
use log::info;
use std::sync::Arc;
use tabby_config::{Config, ConfigError, ConfigManager, LibraryConfig};
use tabby_core::{AppError, Book, BookId, CategoryName, MAX_RATING};
use tabby_database::{
    connection::{connect, database_exists, DatabaseConfig},
    migrations::run_migrations,
};

/// High-level library management
///
/// Wires one gateway into the category store and the add workflow, and
/// offers the per-book operations the library screens need.
pub struct LibraryManager<G = SqliteGateway> {
    gateway: Arc<G>,
    categories: CategoryStore<G>,
}

impl LibraryManager<SqliteGateway> {
    /// Opens the library described by the user's `config.toml`
    ///
    /// `TABBY_APP_*` variables override the file. Unlike a plain load, an
    /// invalid config is refused here. A relative database path is placed
    /// under the config directory, which is created when missing.
    pub async fn open(configs: &ConfigManager) -> LibraryResult<Self> {
        let mut config = configs.load_with_env_overrides()?;
        config
            .validate()
            .map_err(|errors| LibraryError::Config(ConfigError::Invalid(errors)))?;

        config.app.database_path = configs.database_path(&config);
        if let Some(dir) = config.app.database_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| LibraryError::Database(e.into()))?;
        }

        Self::new(&config).await
    }

    /// Opens (or creates) the configured database and brings it up to date
    pub async fn new(config: &Config) -> LibraryResult<Self> {
        let path = config.app.database_path.to_string_lossy().into_owned();
        if database_exists(&path) {
            info!("Opening library at {}", path);
        } else {
            info!("Creating new library at {}", path);
        }

        let db_config = DatabaseConfig::new(path)
            .with_max_connections(config.app.max_connections)
            .with_wal(config.app.enable_wal);
        let pool = connect(db_config).await?;
        run_migrations(&pool).await?;

        Ok(Self::with_gateway(
            SqliteGateway::new(pool),
            &config.library,
        ))
    }

    /// Closes the pool once in-flight queries finish
    pub async fn close(self) {
        self.gateway.close().await;
        info!("Library closed");
    }
}

impl<G: PersistenceGateway> LibraryManager<G> {
    pub fn with_gateway(gateway: G, config: &LibraryConfig) -> Self {
        let gateway = Arc::new(gateway);
        Self {
            categories: CategoryStore::new(gateway.clone(), CategoryPolicy::from(config)),
            gateway,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn categories(&self) -> &CategoryStore<G> {
        &self.categories
    }

    /// A new add flow with its own in-flight flag
    ///
    /// The shell keeps one per add screen; flows never block each other.
    pub fn add_flow(&self) -> AddToLibrary<G> {
        AddToLibrary::new(self.gateway.clone())
    }

    pub async fn startup_route(&self) -> LibraryResult<StartupRoute> {
        self.categories.startup_route().await
    }

    /// Starts a fresh add flow
    pub fn begin_session(&self) -> SelectionSession {
        SelectionSession::new()
    }

    /// Every stored book, regardless of category
    pub async fn list_books(&self) -> LibraryResult<Vec<Book>> {
        self.gateway
            .list_books()
            .await
            .map_err(LibraryError::RetrievalFailure)
    }

    /// Rates a book within one category; other categories keep their rating
    pub async fn rate_book(
        &self,
        book_id: &BookId,
        category: &CategoryName,
        rating: u8,
    ) -> LibraryResult<()> {
        if rating > MAX_RATING {
            return Err(LibraryError::InvalidRating(rating));
        }

        self.gateway
            .set_rating(book_id, category, rating)
            .await
            .map_err(|e| membership_error(e, book_id, category))?;

        info!("Rated {} in '{}': {}", book_id, category, rating);
        Ok(())
    }

    /// Removes a book from one category; the book itself stays stored
    pub async fn remove_from_category(
        &self,
        book_id: &BookId,
        category: &CategoryName,
    ) -> LibraryResult<()> {
        self.gateway
            .remove_book_from_category(book_id, category)
            .await
            .map_err(|e| membership_error(e, book_id, category))?;

        info!("Removed {} from '{}'", book_id, category);
        Ok(())
    }
}

fn membership_error(e: AppError, book_id: &BookId, category: &CategoryName) -> LibraryError {
    match e {
        AppError::RecordNotFound { .. } => LibraryError::MembershipNotFound {
            book_id: book_id.clone(),
            category: category.clone(),
        },
        other => LibraryError::Database(other),
    }
}
