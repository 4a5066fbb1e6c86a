//! Tabby Library
//!
//! The book-library core the UI shell talks to:
//!
//! - [`SelectionSession`] tracks the books and categories picked in an add flow
//! - [`AddToLibrary`] validates a session and commits it as one batch
//! - [`CategoryStore`] reads and manages categories and answers the startup
//!   routing question
//! - [`PersistenceGateway`] is the storage seam, with SQLite and in-memory
//!   implementations
//! - [`LibraryManager`] wires all of the above to one gateway

pub mod categories;
pub mod error;
pub mod gateway;
pub mod manager;
pub mod session;
pub mod workflow;

pub use categories::{CategoryPolicy, CategoryStore, CategorySummary, StartupRoute};
pub use error::{LibraryError, LibraryResult, ValidationError};
pub use gateway::{AdditionBatch, MemoryGateway, PersistenceGateway, SqliteGateway};
pub use manager::LibraryManager;
pub use session::SelectionSession;
pub use workflow::{validate_selection, AddToLibrary, CommitReport};
