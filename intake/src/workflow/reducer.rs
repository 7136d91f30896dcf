//! Registration workflow reducer.
//!
//! Commands are checked against the current stage and the details rules
//! synchronously. Anything that needs the database (both capacity checks and
//! the insert) is returned as an [`Effect::Future`] whose result comes back as
//! a feedback action.

use super::types::{Outcome, Rejection, RegistrationAction, RegistrationState, Stage};
use crate::capacity::{CapacitySnapshot, CapacityTracker};
use crate::options::ProblemOption;
use crate::registration::{DetailsForm, Registration};
use crate::repository::{RegistrationRepository, RepositoryError};
use intake_core::effect::Effect;
use intake_core::reducer::Reducer;
use intake_core::{smallvec, SmallVec};
use std::sync::Arc;

/// Dependencies of the registration workflow.
#[derive(Clone)]
pub struct RegistrationEnvironment {
    /// Capacity reads
    pub capacity: CapacityTracker,
    /// Registration storage
    pub repository: Arc<dyn RegistrationRepository>,
}

impl RegistrationEnvironment {
    /// Environment reading counts from and writing rows to `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn RegistrationRepository>) -> Self {
        Self {
            capacity: CapacityTracker::new(Arc::clone(&repository)),
            repository,
        }
    }
}

impl std::fmt::Debug for RegistrationEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationEnvironment")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

/// Effects returned by one reducer step.
type Effects = SmallVec<[Effect<RegistrationAction>; 4]>;

/// Reducer for the select → details → submit workflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationReducer;

impl RegistrationReducer {
    /// Creates a new registration reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Record a rejection, dropping the pending option when it sends the
    /// visitor back to the start.
    fn reject(state: &mut RegistrationState, rejection: Rejection) -> Effects {
        if rejection.returns_to_start() {
            state.stage = Stage::Start;
        }
        state.outcome = Some(Outcome::Rejected(rejection));
        smallvec![Effect::None]
    }

    /// Read counts, then hand them to `feedback`.
    fn check_capacity<F>(capacity: &CapacityTracker, feedback: F) -> Effect<RegistrationAction>
    where
        F: FnOnce(CapacitySnapshot) -> RegistrationAction + Send + 'static,
    {
        let capacity = capacity.clone();
        Effect::future(async move { Some(feedback(capacity.counts().await)) })
    }

    /// Store `registration`, reporting success or failure as feedback.
    fn persist(
        repository: &Arc<dyn RegistrationRepository>,
        registration: Registration,
    ) -> Effect<RegistrationAction> {
        let repository = Arc::clone(repository);
        Effect::future(async move {
            let option = registration.problem();
            let action = match repository.insert(&registration).await {
                Ok(()) => RegistrationAction::RegistrationPersisted { option },
                Err(error) => RegistrationAction::PersistenceFailed { option, error },
            };
            Some(action)
        })
    }

    // ========== Commands ==========

    fn select_option(
        state: &mut RegistrationState,
        problem: Option<&str>,
        env: &RegistrationEnvironment,
    ) -> Effects {
        // Any earlier pending option is abandoned
        state.stage = Stage::Start;
        state.outcome = None;

        let Some(option) = problem.and_then(|p| p.parse::<ProblemOption>().ok()) else {
            tracing::info!(problem = ?problem, "Selection names no known option");
            return Self::reject(state, Rejection::NoOptionSelected);
        };

        smallvec![Self::check_capacity(&env.capacity, move |snapshot| {
            RegistrationAction::SelectionCapacityChecked { option, snapshot }
        })]
    }

    fn submit_details(
        state: &mut RegistrationState,
        form: &DetailsForm,
        env: &RegistrationEnvironment,
    ) -> Effects {
        state.outcome = None;

        let Stage::OptionChosen(option) = state.stage else {
            tracing::info!(stage = ?state.stage, "Details submitted without a pending option");
            return Self::reject(state, Rejection::SessionExpired);
        };

        match Registration::new(option, form) {
            Ok(registration) => smallvec![Self::check_capacity(&env.capacity, move |snapshot| {
                RegistrationAction::SubmissionCapacityChecked {
                    registration,
                    snapshot,
                }
            })],
            Err(error) => {
                tracing::info!(option = %option, error = %error, "Details rejected");
                Self::reject(state, error.into())
            },
        }
    }

    // ========== Feedback ==========

    fn selection_checked(
        state: &mut RegistrationState,
        option: ProblemOption,
        snapshot: &CapacitySnapshot,
    ) -> Effects {
        if snapshot.is_full(option) {
            tracing::info!(
                option = %option,
                count = snapshot.count(option),
                "Selected option is full"
            );
            return Self::reject(state, Rejection::OptionFull);
        }

        tracing::debug!(
            option = %option,
            remaining = snapshot.remaining(option),
            "Option chosen"
        );
        state.stage = Stage::OptionChosen(option);
        state.outcome = Some(Outcome::Advanced(option));
        smallvec![Effect::None]
    }

    fn submission_checked(
        state: &mut RegistrationState,
        registration: Registration,
        snapshot: &CapacitySnapshot,
        env: &RegistrationEnvironment,
    ) -> Effects {
        let option = registration.problem();
        if snapshot.is_full(option) {
            tracing::warn!(
                option = %option,
                count = snapshot.count(option),
                "Option filled up before submission"
            );
            return Self::reject(state, Rejection::OptionNowFull);
        }

        smallvec![Self::persist(&env.repository, registration)]
    }

    fn persisted(state: &mut RegistrationState, option: ProblemOption) -> Effects {
        tracing::info!(option = %option, "Registration stored");
        state.stage = Stage::Submitted;
        state.outcome = Some(Outcome::Registered(option));
        smallvec![Effect::None]
    }

    fn persistence_failed(
        state: &mut RegistrationState,
        option: ProblemOption,
        error: &RepositoryError,
    ) -> Effects {
        tracing::error!(option = %option, error = %error, "Failed to store registration");
        Self::reject(state, Rejection::from(error))
    }
}

impl Reducer for RegistrationReducer {
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RegistrationAction::SelectOption { problem } => {
                Self::select_option(state, problem.as_deref(), env)
            },
            RegistrationAction::SubmitDetails(form) => Self::submit_details(state, &form, env),
            RegistrationAction::SelectionCapacityChecked { option, snapshot } => {
                Self::selection_checked(state, option, &snapshot)
            },
            RegistrationAction::SubmissionCapacityChecked {
                registration,
                snapshot,
            } => Self::submission_checked(state, registration, &snapshot, env),
            RegistrationAction::RegistrationPersisted { option } => Self::persisted(state, option),
            RegistrationAction::PersistenceFailed { option, error } => {
                Self::persistence_failed(state, option, &error)
            },
        }
    }
}
