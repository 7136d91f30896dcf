//! Application state shared by the HTTP handlers.

use crate::capacity::CapacityTracker;
use crate::options::ProblemOption;
use crate::repository::RegistrationRepository;
use crate::workflow::{RegistrationEnvironment, RegistrationReducer, RegistrationState};
use intake_runtime::Store;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply, via `Arc`) for each request. Holds no per-visitor data;
/// that lives in the session.
#[derive(Clone)]
pub struct AppState {
    /// Registration storage, also used by the readiness check
    pub repository: Arc<dyn RegistrationRepository>,

    /// Dependencies handed to every workflow store
    pub environment: RegistrationEnvironment,
}

impl AppState {
    /// Create state backed by `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn RegistrationRepository>) -> Self {
        Self {
            environment: RegistrationEnvironment::new(Arc::clone(&repository)),
            repository,
        }
    }

    /// Capacity reads for rendering the start page.
    #[must_use]
    pub const fn capacity(&self) -> &CapacityTracker {
        &self.environment.capacity
    }

    /// A fresh workflow store for one request, resumed from the visitor's
    /// pending option.
    #[must_use]
    pub fn store(&self, pending: Option<ProblemOption>) -> Store<RegistrationReducer> {
        Store::new(
            RegistrationState::resume(pending),
            RegistrationReducer::new(),
            self.environment.clone(),
        )
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
