//! # Catalog Sync Core
//!
//! The vocabulary every catalog feature is written in. A reducer folds one
//! action into a state snapshot and returns descriptions of the work it
//! wants done; the runtime crate runs that work and folds whatever it
//! settles with.
//!
//! ## Pieces
//!
//! - **State**: one collection's snapshot (auth, products)
//! - **Action**: commands plus the phase events of remote calls
//! - **Reducer**: `(state, action, env) → effects`, mutating state in place
//! - **Effect**: a value describing async work, run later by the store
//! - **Environment**: injected collaborators (gateway, credentials, clock)
//!
//! ## Example
//!
//! ```
//! use catalog_sync_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CartState {
//!     items: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CartAction {
//!     Add,
//! }
//!
//! struct CartReducer;
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         match action {
//!             CartAction::Add => state.items += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = CartState::default();
//! let _ = CartReducer.reduce(&mut state, CartAction::Add, &());
//! assert_eq!(state.items, 1);
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Scoping and combining reducers
pub mod composition;

mod effect_macros;

/// The reducer trait
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// Folds actions into a state snapshot.
    ///
    /// `reduce` never awaits; anything asynchronous is returned as an
    /// [`Effect`] for the runtime to run. A short synchronous write to an
    /// injected collaborator (such as the durable credential slot) is allowed
    /// when it must change together with the snapshot; such writes happen in
    /// fold order.
    pub trait Reducer {
        /// Snapshot being folded into.
        type State;

        /// Input accepted by `reduce`.
        type Action;

        /// Collaborators the effects may call.
        type Environment;

        /// Apply `action` to `state` and describe follow-up work.
        ///
        /// Most actions yield a single `Effect::None`. Commands that reach a
        /// remote service yield an `Effect::Send` of their pending event
        /// followed by one `Effect::Future`.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect descriptions
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Work a reducer asks the store to run.
    ///
    /// Building an effect does nothing; the store starts it after the fold
    /// that produced it.
    pub enum Effect<Action> {
        /// Nothing to run.
        None,

        /// An action folded right after the one that returned it, before any
        /// `Future` of that fold starts. Observers see it like a settled
        /// action.
        Send(Action),

        /// An async call. A `Some` result is folded back into the same store
        /// once the call settles.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Send(_) => write!(f, "Effect::Send(<action>)"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action>
    where
        Action: Send + 'static,
    {
        /// Wrap the produced action, e.g. lift a child action into its parent
        /// enum.
        #[must_use]
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            F: FnOnce(Action) -> B + Send + 'static,
            B: 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Send(action) => Effect::Send(f(action)),
                Effect::Future(fut) => Effect::Future(Box::pin(async move { fut.await.map(f) })),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// `true` for [`Effect::None`].
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Injected collaborators shared by every feature
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Source of "now", swapped for a fixed clock in tests.
    pub trait Clock: Send + Sync {
        /// Current instant.
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
