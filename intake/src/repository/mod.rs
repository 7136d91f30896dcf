//! Persistence seam for registrations.
//!
//! The workflow only needs three things from storage: grouped counts per
//! option, an insert, and a liveness ping. [`RegistrationRepository`] captures
//! exactly that, so the reducer can be driven against Postgres in production
//! and an in-memory table in tests.
//!
//! Methods return boxed futures instead of `async fn` so the trait stays
//! dyn-compatible and can be shared as `Arc<dyn RegistrationRepository>`.

mod memory;
mod postgres;

pub use memory::{InMemoryRegistrationRepository, StoredRegistration};
pub use postgres::PostgresRegistrationRepository;

use crate::registration::Registration;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Boxed future returned by repository methods.
pub type RepositoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage failures, split by whether the store could be reached at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store could not be reached or refused the connection.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but the statement failed.
    #[error("Database query failed: {0}")]
    Query(String),
}

impl RepositoryError {
    /// Whether the failure is a connectivity problem rather than a bad statement.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Registration storage.
pub trait RegistrationRepository: Send + Sync {
    /// Count registrations grouped by their stored `problem_selected` label.
    ///
    /// Labels with no rows are absent from the result. Labels outside the
    /// known option set may be present.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the query fails.
    fn count_by_problem(&self) -> RepositoryFuture<'_, Vec<(String, i64)>>;

    /// Insert one registration row.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or the insert fails.
    fn insert<'a>(&'a self, registration: &'a Registration) -> RepositoryFuture<'a, ()>;

    /// Check that the store answers.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be reached.
    fn ping(&self) -> RepositoryFuture<'_, ()>;
}
