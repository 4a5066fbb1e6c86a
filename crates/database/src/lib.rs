//! Tabby Database Layer
//!
//! SQLite storage for books, categories and their memberships, using sqlx for
//! async queries. Ratings are stored per membership, so a book can be rated
//! differently in each category it belongs to.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::DbPool;
pub use migrations::{current_version, optimize, run_migrations, verify_integrity};
