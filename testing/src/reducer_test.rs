//! Given-When-Then harness for reducers.
//!
//! Queued actions are folded in order against one state, so a settlement
//! sequence of racing requests can be replayed without a runtime. Actions a
//! fold returns as `Effect::Send` are folded right after it, as the store
//! does; futures are never run.

#![allow(clippy::module_name_repetitions)]

use catalog_sync_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Reducer test case.
///
/// ```ignore
/// use catalog_sync_testing::{assertions, ReducerTest};
///
/// ReducerTest::new(AuthReducer::new())
///     .with_env(test_environment())
///     .given_state(AuthState::default())
///     .when_action(AuthAction::LoginPending)
///     .then_state(|state| assert!(state.loading))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    env: Option<E>,
    given: Option<S>,
    when: Vec<A>,
    state_checks: Vec<StateCheck<S>>,
    effect_checks: Vec<EffectCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Test case for `reducer`.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            given: None,
            when: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment passed to every fold.
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.env = Some(env);
        self
    }

    /// Starting state.
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.given = Some(state);
        self
    }

    /// Fold `action` after any already queued.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.when.push(action);
        self
    }

    /// Fold `actions` in iteration order, after any already queued.
    #[must_use]
    pub fn when_actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        self.when.extend(actions);
        self
    }

    /// Check the state after the last fold.
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects of every fold, concatenated in fold order.
    ///
    /// Folds of sent actions count too.
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Fold the queued actions and run every check.
    ///
    /// # Panics
    ///
    /// Panics if the state, environment or actions are missing, or if a
    /// check fails.
    #[allow(clippy::expect_used)]
    pub fn run(self)
    where
        A: Clone,
    {
        let mut state = self.given.expect("given_state() was not called");
        let env = self.env.expect("with_env() was not called");
        assert!(!self.when.is_empty(), "no action queued with when_action()");

        let mut effects = Vec::new();
        for action in self.when {
            let mut queue = VecDeque::from([action]);
            while let Some(action) = queue.pop_front() {
                for effect in self.reducer.reduce(&mut state, action, &env) {
                    if let Effect::Send(next) = &effect {
                        queue.push_back(next.clone());
                    }
                    effects.push(effect);
                }
            }
        }

        for check in self.state_checks {
            check(&state);
        }
        for check in self.effect_checks {
            check(&effects);
        }
    }
}

/// Effect checks for [`ReducerTest::then_effects`].
pub mod assertions {
    use catalog_sync_core::effect::Effect;

    /// Every effect is `Effect::None`.
    ///
    /// # Panics
    ///
    /// Panics on any other effect.
    pub fn assert_no_effects<A>(effects: &[Effect<A>]) {
        let running = effects.iter().filter(|e| !e.is_none()).count();
        assert_eq!(running, 0, "expected only Effect::None, found {effects:?}");
    }

    /// Exactly `expected` effects, of any kind.
    ///
    /// # Panics
    ///
    /// Panics on a different count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected effects: {effects:?}");
    }

    /// The `Send` effects, in order, carry exactly `expected`.
    ///
    /// # Panics
    ///
    /// Panics on any other sequence of sent actions.
    pub fn assert_sent<A>(effects: &[Effect<A>], expected: &[A])
    where
        A: PartialEq + std::fmt::Debug,
    {
        let sent: Vec<&A> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Send(action) => Some(action),
                Effect::None | Effect::Future(_) => None,
            })
            .collect();
        let expected: Vec<&A> = expected.iter().collect();
        assert_eq!(sent, expected, "unexpected sent actions");
    }

    /// At least one effect is a `Future`.
    ///
    /// # Panics
    ///
    /// Panics if none is.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "expected a Future effect, found {effects:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_sync_core::{smallvec, SmallVec};

    /// Requests in flight and the ids that have settled.
    #[derive(Clone, Debug, Default)]
    struct Inbox {
        in_flight: usize,
        queued: usize,
        settled: Vec<u8>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum InboxAction {
        Request,
        Queued,
        Settled(u8),
    }

    struct InboxReducer;

    impl Reducer for InboxReducer {
        type State = Inbox;
        type Action = InboxAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                InboxAction::Request => {
                    state.in_flight += 1;
                    smallvec![
                        Effect::Send(InboxAction::Queued),
                        Effect::Future(Box::pin(async { None::<InboxAction> })),
                    ]
                },
                InboxAction::Queued => {
                    state.queued += 1;
                    smallvec![Effect::None]
                },
                InboxAction::Settled(id) => {
                    state.in_flight = state.in_flight.saturating_sub(1);
                    state.settled.push(id);
                    smallvec![Effect::None]
                },
            }
        }
    }

    #[test]
    fn test_single_fold() {
        ReducerTest::new(InboxReducer)
            .with_env(())
            .given_state(Inbox::default())
            .when_action(InboxAction::Request)
            .then_state(|state| {
                assert_eq!(state.in_flight, 1);
                assert_eq!(state.queued, 1);
            })
            .then_effects(|effects| {
                assertions::assert_has_future_effect(effects);
                assertions::assert_sent(effects, &[InboxAction::Queued]);
                // Send, Future, then the None of the sent fold
                assertions::assert_effects_count(effects, 3);
            })
            .run();
    }

    #[test]
    fn test_replays_settlement_order() {
        ReducerTest::new(InboxReducer)
            .with_env(())
            .given_state(Inbox::default())
            .when_actions([InboxAction::Request, InboxAction::Request])
            .when_actions([InboxAction::Settled(2), InboxAction::Settled(1)])
            .then_state(|state| {
                assert_eq!(state.in_flight, 0);
                assert_eq!(state.queued, 2);
                assert_eq!(state.settled, vec![2, 1]);
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 8))
            .run();
    }

    #[test]
    fn test_settle_only_yields_no_effects() {
        ReducerTest::new(InboxReducer)
            .with_env(())
            .given_state(Inbox {
                in_flight: 1,
                queued: 1,
                settled: vec![],
            })
            .when_action(InboxAction::Settled(7))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    #[should_panic(expected = "no action queued")]
    fn test_run_without_actions_panics() {
        ReducerTest::new(InboxReducer)
            .with_env(())
            .given_state(Inbox::default())
            .run();
    }

    #[test]
    #[should_panic(expected = "unexpected sent actions")]
    fn test_sent_assertion_rejects_missing_send() {
        assertions::assert_sent(&[Effect::None], &[InboxAction::Queued]);
    }

    #[test]
    #[should_panic(expected = "expected a Future effect")]
    fn test_future_assertion_rejects_none() {
        assertions::assert_has_future_effect::<InboxAction>(&[Effect::None]);
    }
}
