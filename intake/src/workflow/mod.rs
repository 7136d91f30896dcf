//! The capacity-gated registration workflow.
//!
//! A visitor selects an option, then submits contact details. Capacity is
//! checked at both steps; the second check narrows, but does not close, the
//! window in which two visitors can take the last place.
//!
//! Drive it with a per-request [`intake_runtime::Store`]:
//!
//! ```
//! use problem_intake::repository::InMemoryRegistrationRepository;
//! use problem_intake::workflow::{
//!     Outcome, RegistrationAction, RegistrationEnvironment, RegistrationReducer,
//!     RegistrationState,
//! };
//! use intake_runtime::Store;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = RegistrationEnvironment::new(Arc::new(InMemoryRegistrationRepository::new()));
//! let mut store = Store::new(RegistrationState::new(), RegistrationReducer::new(), env);
//!
//! store
//!     .send(RegistrationAction::SelectOption { problem: Some("Option 1".into()) })
//!     .await?;
//! assert!(matches!(store.state().outcome, Some(Outcome::Advanced(_))));
//! # Ok(())
//! # }
//! ```

mod reducer;
mod types;

#[cfg(test)]
mod tests;

pub use reducer::{RegistrationEnvironment, RegistrationReducer};
pub use types::{Outcome, RegistrationAction, RegistrationState, Rejection, Stage};
