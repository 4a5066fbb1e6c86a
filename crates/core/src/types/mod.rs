//! Domain types for Tabby
//!
//! This module contains the domain models organized by responsibility:
//! - `book`: Book and its identifier
//! - `category`: Categories and book memberships
//! - `common`: Shared traits and utilities

mod book;
mod category;
mod common;

pub use book::{Book, BookId, MAX_RATING, UNRATED};
pub use category::{Category, CategoryName, Membership};
pub use common::{SessionId, Timestamp, Validator};
