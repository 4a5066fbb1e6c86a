//! Add-to-Library Workflow
//!
//! Turns a selection session into stored memberships. The flow is:
//!
//! 1. take the in-flight flag (one commit at a time per workflow)
//! 2. validate the selection, reporting every problem at once
//! 3. normalize each selected book so it enters categories unrated
//! 4. look up each selected pair and skip the ones that already exist
//! 5. hand the remaining books and memberships to the gateway as one batch
//! 6. clear the session, but only once the gateway confirmed the write
//!
//! Any failure before step 6 leaves the session exactly as it was.

use crate::error::{LibraryError, LibraryResult, ValidationError};
use crate::gateway::{AdditionBatch, PersistenceGateway};
use crate::session::SelectionSession;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tabby_core::{Book, BookId, Category, Membership};

/// What a successful commit wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Books upserted because they gained at least one membership
    pub books_written: usize,
    pub memberships_added: usize,
    /// Selected pairs that were already stored and left untouched
    pub memberships_already_present: usize,
}

/// Holds the in-flight flag until dropped
struct CommitGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CommitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> LibraryResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LibraryError::CommitInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The checks that need nothing but the session
///
/// Both always run so the UI can show both messages.
fn check_not_empty(session: &SelectionSession) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if session.selected_categories().is_empty() {
        errors.push(ValidationError::NoCategorySelected);
    }
    if session.selected_books().is_empty() {
        errors.push(ValidationError::NoBookSelected);
    }

    errors
}

/// Checks a selection against the categories the user can pick from
pub fn validate_selection(
    session: &SelectionSession,
    available: &[Category],
) -> Vec<ValidationError> {
    let mut errors = check_not_empty(session);

    for name in session.selected_categories() {
        if !available.iter().any(|c| &c.name == name) {
            errors.push(ValidationError::UnknownCategory(name.clone()));
        }
    }

    errors
}

/// One add flow
///
/// The in-flight flag belongs to the flow, so each add screen gets its own
/// instance and independent flows never block each other.
pub struct AddToLibrary<G> {
    gateway: Arc<G>,
    in_flight: AtomicBool,
}

impl<G: PersistenceGateway> AddToLibrary<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            in_flight: AtomicBool::new(false),
        }
    }

    /// True while a commit is pending; the shell disables its trigger on this
    pub fn is_committing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Commits every selected book into every selected category
    ///
    /// On success the session is cleared. On any error it is left untouched
    /// so the user can fix the selection or retry.
    pub async fn commit(
        &self,
        session: &mut SelectionSession,
        available: &[Category],
    ) -> LibraryResult<CommitReport> {
        let _guard = CommitGuard::acquire(&self.in_flight)?;
        self.run(session, available).await
    }

    /// Commits against the categories currently in the store
    ///
    /// An empty selection is rejected before the store is touched. A failed
    /// category read fails the commit and keeps the session.
    pub async fn commit_current(
        &self,
        session: &mut SelectionSession,
    ) -> LibraryResult<CommitReport> {
        let _guard = CommitGuard::acquire(&self.in_flight)?;

        let errors = check_not_empty(session);
        if !errors.is_empty() {
            return Err(reject(session, errors));
        }

        let available = self.gateway.list_categories().await.map_err(|e| {
            log::warn!("Session {} could not read categories: {}", session.id(), e);
            LibraryError::PersistenceFailure(e)
        })?;

        self.run(session, &available).await
    }

    async fn run(
        &self,
        session: &mut SelectionSession,
        available: &[Category],
    ) -> LibraryResult<CommitReport> {
        let errors = validate_selection(session, available);
        if !errors.is_empty() {
            return Err(reject(session, errors));
        }

        let books = session
            .selected_books()
            .iter()
            .map(Book::normalize_for_addition)
            .collect::<Result<Vec<_>, _>>()
            .map_err(LibraryError::InvalidEntity)?;

        let (batch, already_present) = self.plan(session, books).await?;

        if !batch.is_empty() {
            self.gateway.apply_additions(&batch).await.map_err(|e| {
                log::warn!("Session {} commit failed: {}", session.id(), e);
                LibraryError::PersistenceFailure(e)
            })?;
        }

        let report = CommitReport {
            books_written: batch.books.len(),
            memberships_added: batch.memberships.len(),
            memberships_already_present: already_present,
        };
        log::info!(
            "Session {} committed: {} book(s), {} new membership(s), {} already present",
            session.id(),
            report.books_written,
            report.memberships_added,
            report.memberships_already_present
        );

        session.clear();
        Ok(report)
    }

    /// Builds the batch of pairs that do not exist yet
    ///
    /// Existing memberships are left out entirely, so their ratings survive
    /// even on a store whose `associate` is not idempotent.
    async fn plan(
        &self,
        session: &SelectionSession,
        books: Vec<Book>,
    ) -> LibraryResult<(AdditionBatch, usize)> {
        let mut memberships = Vec::new();
        let mut gaining: HashSet<BookId> = HashSet::new();
        let mut already_present = 0;

        for category in session.selected_categories() {
            for book in &books {
                let present = self
                    .gateway
                    .is_member(&book.id, category)
                    .await
                    .map_err(|e| {
                        log::warn!("Session {} could not read '{}': {}", session.id(), category, e);
                        LibraryError::PersistenceFailure(e)
                    })?;

                if present {
                    already_present += 1;
                } else {
                    memberships.push(Membership::new(book.id.clone(), category.clone()));
                    gaining.insert(book.id.clone());
                }
            }
        }

        let books: Vec<Book> = books
            .into_iter()
            .filter(|b| gaining.contains(&b.id))
            .collect();

        log::debug!(
            "Session {} plan: {} book(s), {} membership(s), {} skipped",
            session.id(),
            books.len(),
            memberships.len(),
            already_present
        );

        Ok((AdditionBatch { books, memberships }, already_present))
    }
}

fn reject(session: &SelectionSession, errors: Vec<ValidationError>) -> LibraryError {
    log::debug!("Session {} rejected: {:?}", session.id(), errors);
    LibraryError::Validation(errors)
}
