//! # Intake Runtime
//!
//! The imperative shell around intake reducers.
//!
//! A [`Store`] owns one piece of state together with its reducer and
//! environment. [`Store::send`] feeds an action to the reducer and then
//! executes the returned effects in order, feeding every action they produce
//! back into the reducer until nothing is left to run. When `send` returns,
//! the state is settled and can be inspected or persisted by the caller.
//!
//! Stores are meant to be short-lived: the HTTP layer builds one per request
//! from the visitor's session, sends a single command, and drops it.

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while a Store settles an action
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The reducer kept producing follow-up actions past the configured limit.
        ///
        /// Usually a sign of two feedback actions triggering each other.
        #[error("Action limit of {limit} exceeded while settling the store")]
        ActionLimitExceeded {
            /// The limit that was hit
            limit: usize,
        },
    }
}

pub use error::StoreError;

use intake_core::effect::Effect;
use intake_core::reducer::Reducer;
use std::collections::VecDeque;
use std::fmt;

/// Default upper bound on actions processed by a single `send`.
pub const DEFAULT_ACTION_LIMIT: usize = 32;

/// Runs a reducer and its effects to completion for one unit of work.
pub struct Store<R>
where
    R: Reducer,
{
    state: R::State,
    reducer: R,
    environment: R::Environment,
    action_limit: usize,
}

impl<R> Store<R>
where
    R: Reducer,
    R::Action: fmt::Debug,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub const fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
            action_limit: DEFAULT_ACTION_LIMIT,
        }
    }

    /// Override the maximum number of actions a single `send` may process.
    #[must_use]
    pub fn with_action_limit(mut self, limit: usize) -> Self {
        self.action_limit = limit;
        self
    }

    /// Send an action and settle every effect it produces.
    ///
    /// Effects run sequentially in the order the reducer returned them; the
    /// effects of a fed-back action are queued behind any still pending.
    ///
    /// Returns the number of actions the reducer processed, including the
    /// initial one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ActionLimitExceeded`] if settling would process
    /// more actions than the store's limit. The state reflects every action
    /// processed before the limit was hit.
    pub async fn send(&mut self, action: R::Action) -> Result<usize, StoreError> {
        tracing::trace!(action = ?action, "Store received action");

        let mut pending: VecDeque<Effect<R::Action>> = self
            .reducer
            .reduce(&mut self.state, action, &self.environment)
            .into_iter()
            .collect();
        let mut processed = 1;

        while let Some(effect) = pending.pop_front() {
            let Effect::Future(future) = effect else {
                continue;
            };

            let Some(next) = future.await else {
                continue;
            };

            if processed >= self.action_limit {
                tracing::error!(
                    limit = self.action_limit,
                    action = ?next,
                    "Dropping feedback action: store action limit reached"
                );
                return Err(StoreError::ActionLimitExceeded {
                    limit: self.action_limit,
                });
            }

            tracing::trace!(action = ?next, "Store received feedback action");
            processed += 1;
            pending.extend(self.reducer.reduce(&mut self.state, next, &self.environment));
        }

        Ok(processed)
    }

    /// Read the current state.
    #[must_use]
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    /// Consume the store, returning its settled state.
    #[must_use]
    pub fn into_state(self) -> R::State {
        self.state
    }
}

impl<R> fmt::Debug for Store<R>
where
    R: Reducer,
    R::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("action_limit", &self.action_limit)
            .finish_non_exhaustive()
    }
}
