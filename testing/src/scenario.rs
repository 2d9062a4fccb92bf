//! Given/When/Then harness for reducers
//!
//! Runs a reducer over a sequence of actions without a Store, so the
//! effects it returns can be inspected rather than executed.

#![allow(clippy::module_name_repetitions)]

use slug_registry_core::{effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent reducer test
///
/// Every action passed to [`ReducerScenario::when`] is reduced in order.
/// State checks see the final state; effect checks see the effects returned
/// by the last action only.
///
/// ```ignore
/// ReducerScenario::new(SlugReducer, env)
///     .given(SlugState::default())
///     .when(SlugAction::Reset { request_id: 0 })
///     .then_state(|s| assert_eq!(s.pending_syncs, 1))
///     .then_effects(|e| assertions::assert_future_count(e, 1))
///     .run();
/// ```
pub struct ReducerScenario<R: Reducer> {
    reducer: R,
    environment: R::Environment,
    state: Option<R::State>,
    actions: Vec<R::Action>,
    state_checks: Vec<StateCheck<R::State>>,
    effect_checks: Vec<EffectCheck<R::Action>>,
}

impl<R: Reducer> ReducerScenario<R> {
    /// Start a scenario for `reducer` running in `environment`
    #[must_use]
    pub const fn new(reducer: R, environment: R::Environment) -> Self {
        Self {
            reducer,
            environment,
            state: None,
            actions: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Initial state (Given)
    #[must_use]
    pub fn given(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Append an action to reduce (When)
    #[must_use]
    pub fn when(mut self, action: R::Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Check the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<R::Action>]) + 'static,
    {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Reduce every action and run the checks, returning the final state
    ///
    /// # Panics
    ///
    /// Panics if no initial state was given, or if any check fails.
    #[allow(clippy::expect_used)] // Misuse of the harness is a test bug
    pub fn run(self) -> R::State {
        let mut state = self.state.expect("initial state must be set with given()");
        let mut last_effects = Vec::new();

        for action in self.actions {
            last_effects = self
                .reducer
                .reduce(&mut state, action, &self.environment)
                .into_vec();
        }

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&last_effects);
        }

        state
    }
}

/// Effect assertions for use with [`ReducerScenario::then_effects`]
pub mod assertions {
    use slug_registry_core::effect::Effect;

    /// Number of `Future` effects, counting inside `Parallel`
    #[must_use]
    pub fn future_count<A>(effects: &[Effect<A>]) -> usize {
        effects
            .iter()
            .map(|effect| match effect {
                Effect::None => 0,
                Effect::Future(_) => 1,
                Effect::Parallel(children) => future_count(children),
            })
            .sum()
    }

    /// Assert nothing will run
    ///
    /// # Panics
    ///
    /// Panics if any effect other than `Effect::None` is present.
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected no effects, found {effects:?}"
        );
    }

    /// Assert exactly `expected` background operations were started
    ///
    /// # Panics
    ///
    /// Panics if the number of `Future` effects differs.
    pub fn assert_future_count<A>(effects: &[Effect<A>], expected: usize) {
        let actual = future_count(effects);
        assert_eq!(actual, expected, "expected {expected} Future effects, found {actual}");
    }
}
