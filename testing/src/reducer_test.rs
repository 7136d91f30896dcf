//! Given/When/Then harness for exercising one reducer step.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use intake_core::{effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Runs a single `reduce` call and checks what came out.
///
/// Effects are not executed; inspect them with [`assertions`] or run them with
/// [`resolve_effects`].
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    environment: Option<R::Environment>,
    initial_state: Option<R::State>,
    action: Option<R::Action>,
    state_checks: Vec<StateCheck<R::State>>,
    effect_checks: Vec<EffectCheck<R::Action>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Start a test for `reducer`.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            action: None,
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment handed to the reducer.
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// State before the action (Given).
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Action under test (When).
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Check the state after the action (Then).
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects returned by the action (Then).
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<R::Action>]) + 'static,
    {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Run the reducer once and apply every check.
    ///
    /// Returns the effects so callers can go on to resolve them.
    ///
    /// # Panics
    ///
    /// Panics if the state, action or environment was never set, or if any
    /// check fails.
    #[allow(clippy::expect_used)] // Missing setup is a bug in the test itself
    pub fn run(self) -> Vec<Effect<R::Action>> {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let action = self.action.expect("Action must be set with when_action()");
        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let effects = self.reducer.reduce(&mut state, action, &env).into_vec();

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&effects);
        }

        effects
    }
}

/// Execute every `Future` effect in order and collect the actions they yield.
pub async fn resolve_effects<A>(effects: Vec<Effect<A>>) -> Vec<A> {
    let mut actions = Vec::new();
    for effect in effects {
        if let Effect::Future(future) = effect {
            if let Some(action) = future.await {
                actions.push(action);
            }
        }
    }
    actions
}

/// Helper assertions for effects
pub mod assertions {
    use intake_core::effect::Effect;

    /// Assert that the step produced nothing to execute.
    ///
    /// # Panics
    ///
    /// Panics if any effect other than `Effect::None` is present.
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects.
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Assert that at least one `Future` effect was returned.
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "Expected at least one Future effect, but none found"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::{smallvec, SmallVec};

    #[derive(Debug, Default)]
    struct Gate {
        open: bool,
    }

    #[derive(Debug, PartialEq)]
    enum GateAction {
        Open,
        Opened,
    }

    struct GateReducer;

    impl Reducer for GateReducer {
        type State = Gate;
        type Action = GateAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Gate,
            action: GateAction,
            _env: &(),
        ) -> SmallVec<[Effect<GateAction>; 4]> {
            match action {
                GateAction::Open => {
                    smallvec![Effect::future(async { Some(GateAction::Opened) })]
                }
                GateAction::Opened => {
                    state.open = true;
                    SmallVec::new()
                }
            }
        }
    }

    #[test]
    fn run_applies_state_and_effect_checks() {
        ReducerTest::new(GateReducer)
            .with_env(())
            .given_state(Gate::default())
            .when_action(GateAction::Opened)
            .then_state(|state| assert!(state.open))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn resolve_effects_collects_feedback_actions() {
        let effects = ReducerTest::new(GateReducer)
            .with_env(())
            .given_state(Gate::default())
            .when_action(GateAction::Open)
            .then_state(|state| assert!(!state.open))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();

        assert_eq!(resolve_effects(effects).await, vec![GateAction::Opened]);
    }

    #[test]
    #[should_panic(expected = "Expected no effects")]
    fn assert_no_effects_rejects_futures() {
        let effects: Vec<Effect<GateAction>> =
            vec![Effect::future(async { Some(GateAction::Opened) })];
        assertions::assert_no_effects(&effects);
    }
}
