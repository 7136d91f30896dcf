//! # Intake Core
//!
//! Reducer and effect primitives shared by the intake workspace.
//!
//! ## Core Concepts
//!
//! - **State**: what a workflow knows about one visitor
//! - **Action**: every input a reducer accepts (visitor commands and the results
//!   of effects fed back in)
//! - **Reducer**: `(State, Action, Environment) → Effects`, updating state in place
//! - **Effect**: a description of async work, executed by the runtime
//! - **Environment**: injected dependencies (repositories, trackers)
//!
//! Reducers never perform I/O themselves. When a decision needs data from the
//! outside world, the reducer returns an [`effect::Effect::Future`] whose output
//! action carries that data back in.
//!
//! ## Example
//!
//! ```
//! use intake_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Default)]
//! struct Tally {
//!     seen: u32,
//! }
//!
//! enum TallyAction {
//!     Seen,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = Tally;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Tally,
//!         action: TallyAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TallyAction>; 4]> {
//!         match action {
//!             TallyAction::Seen => state.seen += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut tally = Tally::default();
//! let effects = TallyReducer.reduce(&mut tally, TallyAction::Seen, &());
//! assert!(effects.is_empty());
//! assert_eq!(tally.seen, 1);
//! ```

pub use smallvec::{smallvec, SmallVec};

/// Reducer module - the trait every workflow implements.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Business logic as a pure transition function.
    ///
    /// A reducer validates the action against the current state, mutates the
    /// state in place and returns the effects the runtime should execute next.
    /// Most transitions produce zero or one effect, so the return type is a
    /// `SmallVec` that stays on the stack in the common case.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions.
///
/// Effects are values. Returning one from a reducer does nothing until the
/// runtime executes it.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// A boxed, sendable future producing an optional follow-up action.
    pub type EffectFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Effect type - describes a side effect to be executed.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// If it resolves to `Some(action)`, the action is fed back into the reducer.
        Future(EffectFuture<Action>),
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block as an effect.
        #[must_use]
        pub fn future<F>(future: F) -> Self
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Self::Future(Box::pin(future))
        }

        /// Whether this effect does nothing when executed.
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Self::None)
        }
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => write!(f, "Effect::None"),
                Self::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }
}
