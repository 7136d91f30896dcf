//! # Intake Testing
//!
//! Test helpers for reducers built on `intake-core`:
//!
//! - [`ReducerTest`]: Given/When/Then harness for a single reducer step
//! - [`assertions`]: checks over the effects a step returned
//! - [`resolve_effects`]: runs `Future` effects and collects the actions they yield,
//!   without feeding them back (use the runtime `Store` for that)
//!
//! ## Example
//!
//! ```ignore
//! use intake_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(RegistrationReducer::new())
//!     .with_env(test_environment())
//!     .given_state(RegistrationState::new())
//!     .when_action(RegistrationAction::SelectOption { problem: None })
//!     .then_state(|state| assert!(state.rejection().is_some()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

mod reducer_test;

pub use reducer_test::{assertions, resolve_effects, ReducerTest};
