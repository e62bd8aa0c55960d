//! Scoping child reducers into a parent
//!
//! A feature is usually built from several child reducers, each owning one
//! slice of the root state and one family of actions. [`scope_reducer`]
//! lifts such a child into the parent's state and action types.
//!
//! # Examples
//!
//! ```
//! use catalog_sync_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//! use catalog_sync_core::composition::scope_reducer;
//!
//! #[derive(Clone, Default)]
//! struct BasketState {
//!     items: u32,
//! }
//!
//! #[derive(Clone)]
//! enum BasketAction {
//!     AddItem,
//! }
//!
//! #[derive(Clone)]
//! struct BasketReducer;
//!
//! impl Reducer for BasketReducer {
//!     type State = BasketState;
//!     type Action = BasketAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut BasketState, action: BasketAction, _env: &()) -> SmallVec<[Effect<BasketAction>; 4]> {
//!         match action {
//!             BasketAction::AddItem => state.items += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct ShopState {
//!     basket: BasketState,
//!     banner: String,
//! }
//!
//! #[derive(Clone)]
//! enum ShopAction {
//!     Basket(BasketAction),
//!     Retitle(String),
//! }
//!
//! let scoped = scope_reducer(
//!     BasketReducer,
//!     |shop: &ShopState| &shop.basket,
//!     |shop: &mut ShopState, basket| shop.basket = basket,
//!     |action: ShopAction| match action {
//!         ShopAction::Basket(action) => Some(action),
//!         ShopAction::Retitle(_) => None,
//!     },
//!     ShopAction::Basket,
//! );
//!
//! let mut state = ShopState::default();
//! let _ = scoped.reduce(&mut state, ShopAction::Basket(BasketAction::AddItem), &());
//! let _ = scoped.reduce(&mut state, ShopAction::Retitle("ignored".to_string()), &());
//! assert_eq!(state.basket.items, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Scopes a reducer to operate on a subset of a larger state and action.
///
/// The child reducer runs against a clone of its slice and the whole slice is
/// written back afterwards, so a snapshot is always replaced, never patched.
/// Parent actions that `extract_action` does not map to a child action leave
/// the slice untouched and produce no effects.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The child state type (subset of `S`)
/// - `A`: The parent action type
/// - `SubA`: The child action type
/// - `E`: The environment type (shared by parent and child)
pub fn scope_reducer<S, SubS, A, SubA, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    extract_action: fn(A) -> Option<SubA>,
    embed_action: fn(SubA) -> A,
) -> ScopedReducer<S, SubS, A, SubA, E, R>
where
    SubS: Clone,
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        extract_action,
        embed_action,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    extract_action: fn(A) -> Option<SubA>,
    embed_action: fn(SubA) -> A,
    _phantom: std::marker::PhantomData<fn() -> E>,
}

impl<S, SubS, A, SubA, E, R> Clone for ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E> + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            get_state: self.get_state,
            set_state: self.set_state,
            extract_action: self.extract_action,
            embed_action: self.embed_action,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<S, SubS, A, SubA, E, R> std::fmt::Debug for ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E> + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedReducer")
            .field("reducer", &self.reducer)
            .finish_non_exhaustive()
    }
}

impl<S, SubS, A, SubA, E, R> Reducer for ScopedReducer<S, SubS, A, SubA, E, R>
where
    SubS: Clone,
    SubA: Send + 'static,
    A: 'static,
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(action) = (self.extract_action)(action) else {
            return SmallVec::new();
        };

        // Fold into a copy of the slice, then swap the whole slice in
        let mut next = (self.get_state)(state).clone();
        let effects = self.reducer.reduce(&mut next, action, env);
        (self.set_state)(state, next);

        let embed = self.embed_action;
        effects.into_iter().map(|effect| effect.map(embed)).collect()
    }
}
