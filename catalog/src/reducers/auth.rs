//! Credential collection reducer.
//!
//! # Rules
//!
//! | Event | Effect on [`AuthState`] |
//! |---|---|
//! | `login.pending` / `register.pending` | `loading = true`, `error` cleared |
//! | `login.fulfilled` | `token`, `user` set, durable token saved, `loading = false` |
//! | `login.rejected` / `register.rejected` | `loading = false`, `error` set |
//! | `register.fulfilled` | `loading = false`; signs in as for login iff a token came back |
//! | `logout` | `token`, `user` cleared, durable token purged |
//!
//! The durable slot is only written by folds, so it follows the same order
//! as `token`: a logout folded while a login is in flight is undone by the
//! later `login.fulfilled`, in state and in storage alike.

use crate::actions::AuthAction;
use crate::credentials::CredentialStore;
use crate::environment::CatalogEnvironment;
use crate::executor;
use crate::gateway::Gateway;
use crate::operation::Operation;
use crate::state::AuthState;
use crate::types::{AuthSession, Registered};
use catalog_sync_core::effect::Effect;
use catalog_sync_core::reducer::Reducer;
use catalog_sync_core::{smallvec, SmallVec};

/// Reducer for [`AuthAction`].
#[derive(Debug)]
pub struct AuthReducer<G> {
    _phantom: std::marker::PhantomData<fn() -> G>,
}

impl<G> AuthReducer<G> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }

    fn begin(state: &mut AuthState, operation: Operation) {
        executor::pending(operation);
        state.loading = true;
        state.error = None;
    }

    fn sign_in(state: &mut AuthState, session: AuthSession, credentials: &CredentialStore) {
        if let Err(error) = credentials.persist(&session.token) {
            tracing::warn!(%error, "signed in but token was not persisted");
        }
        state.token = Some(session.token);
        state.user = Some(session.user);
        state.loading = false;
        state.error = None;
    }

    fn fail(state: &mut AuthState, error: String) {
        state.loading = false;
        state.error = Some(error);
    }
}

impl<G> Default for AuthReducer<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for AuthReducer<G> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<G> Reducer for AuthReducer<G>
where
    G: Gateway,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = CatalogEnvironment<G>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Login { credentials } => {
                let gateway = env.gateway.clone();
                executor::start(
                    AuthAction::LoginPending,
                    executor::execute(
                        Operation::Login,
                        async move { gateway.login(&credentials).await },
                        |session| AuthAction::LoginFulfilled { session },
                        |error| AuthAction::LoginRejected { error },
                    ),
                )
            },

            AuthAction::LoginPending => {
                Self::begin(state, Operation::Login);
                smallvec![Effect::None]
            },

            AuthAction::LoginFulfilled { session } => {
                Self::sign_in(state, session, &env.credentials);
                smallvec![Effect::None]
            },

            AuthAction::LoginRejected { error } => {
                Self::fail(state, error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Register
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Register { registration } => {
                let gateway = env.gateway.clone();
                executor::start(
                    AuthAction::RegisterPending,
                    executor::execute(
                        Operation::Register,
                        async move { gateway.register(&registration).await },
                        |registered| AuthAction::RegisterFulfilled { registered },
                        |error| AuthAction::RegisterRejected { error },
                    ),
                )
            },

            AuthAction::RegisterPending => {
                Self::begin(state, Operation::Register);
                smallvec![Effect::None]
            },

            AuthAction::RegisterFulfilled { registered } => {
                match registered {
                    Registered::Session(session) => {
                        Self::sign_in(state, session, &env.credentials);
                    },
                    Registered::User(user) => {
                        tracing::debug!(user = %user.id, "account created without a session");
                        state.loading = false;
                        state.error = None;
                    },
                }
                smallvec![Effect::None]
            },

            AuthAction::RegisterRejected { error } => {
                Self::fail(state, error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Logout => {
                state.token = None;
                state.user = None;
                if let Err(error) = env.credentials.purge() {
                    tracing::warn!(%error, "could not purge durable token");
                }
                tracing::debug!("logged out");
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::credentials::CredentialStore;
    use crate::mocks::MockGateway;
    use crate::types::{Credentials, Registration, User, UserId};
    use catalog_sync_testing::{assertions, test_clock, ReducerTest};

    fn env() -> CatalogEnvironment<MockGateway> {
        let credentials = CredentialStore::in_memory();
        CatalogEnvironment::new(MockGateway::new(credentials.clone()), credentials)
            .with_clock(test_clock())
    }

    fn ada() -> User {
        User {
            id: UserId::new("u1"),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        }
    }

    fn session() -> AuthSession {
        AuthSession {
            token: "t-1".into(),
            user: ada(),
        }
    }

    #[test]
    fn test_login_command_applies_pending_and_spawns_call() {
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(AuthState {
                error: Some("old".into()),
                ..AuthState::default()
            })
            .when_action(AuthAction::Login {
                credentials: Credentials::new("ada@example.com", "secret1"),
            })
            .then_state(|state| {
                assert!(state.loading);
                assert!(state.error.is_none());
                assert!(state.token.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_sent(effects, &[AuthAction::LoginPending]);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_login_pending_sets_loading() {
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::LoginPending)
            .then_state(|state| assert!(state.loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_login_fulfilled_sets_token_and_user() {
        let env = env();
        let credentials = env.credentials.clone();

        ReducerTest::new(AuthReducer::new())
            .with_env(env)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::LoginPending,
                AuthAction::LoginFulfilled { session: session() },
            ])
            .then_state(|state| {
                assert_eq!(state.token.as_deref(), Some("t-1"));
                assert_eq!(state.user, Some(ada()));
                assert!(!state.loading);
            })
            .run();

        assert_eq!(credentials.token().unwrap().as_deref(), Some("t-1"));
    }

    #[test]
    fn test_login_settling_after_logout_saves_token_with_session() {
        let env = env();
        let credentials = env.credentials.clone();

        // Logout folds while the login call is still in flight
        ReducerTest::new(AuthReducer::new())
            .with_env(env)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::Login {
                    credentials: Credentials::new("ada@example.com", "secret1"),
                },
                AuthAction::Logout,
                AuthAction::LoginFulfilled { session: session() },
            ])
            .then_state(|state| {
                assert_eq!(state.token.as_deref(), Some("t-1"));
                assert_eq!(state.user, Some(ada()));
            })
            .run();

        assert_eq!(credentials.token().unwrap().as_deref(), Some("t-1"));
    }

    #[test]
    fn test_login_command_does_not_touch_storage() {
        let env = env();
        env.credentials.persist("t-0").unwrap();
        let credentials = env.credentials.clone();

        ReducerTest::new(AuthReducer::new())
            .with_env(env)
            .given_state(AuthState::default())
            .when_action(AuthAction::Login {
                credentials: Credentials::new("ada@example.com", "secret1"),
            })
            .run();

        assert_eq!(credentials.token().unwrap().as_deref(), Some("t-0"));
    }

    #[test]
    fn test_login_rejected_records_error_and_keeps_session() {
        let signed_in = AuthState {
            token: Some("t-0".into()),
            user: Some(ada()),
            ..AuthState::default()
        };
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(signed_in)
            .when_actions([
                AuthAction::LoginPending,
                AuthAction::LoginRejected {
                    error: "Invalid credentials".into(),
                },
            ])
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
                assert_eq!(state.token.as_deref(), Some("t-0"));
            })
            .run();
    }

    #[test]
    fn test_register_without_token_leaves_session_untouched() {
        let env = env();
        let credentials = env.credentials.clone();

        ReducerTest::new(AuthReducer::new())
            .with_env(env)
            .given_state(AuthState::default())
            .when_actions([
                AuthAction::RegisterPending,
                AuthAction::RegisterFulfilled {
                    registered: Registered::User(ada()),
                },
            ])
            .then_state(|state| {
                assert!(!state.loading);
                assert!(state.token.is_none());
                assert!(state.user.is_none());
            })
            .run();

        assert_eq!(credentials.token().unwrap(), None);
    }

    #[test]
    fn test_register_with_token_signs_in() {
        let env = env();
        let credentials = env.credentials.clone();

        ReducerTest::new(AuthReducer::new())
            .with_env(env)
            .given_state(AuthState::default())
            .when_action(AuthAction::RegisterFulfilled {
                registered: Registered::Session(session()),
            })
            .then_state(|state| {
                assert_eq!(state.token.as_deref(), Some("t-1"));
                assert_eq!(state.user, Some(ada()));
            })
            .run();

        assert_eq!(credentials.token().unwrap().as_deref(), Some("t-1"));
    }

    #[test]
    fn test_register_command_is_pending_then_future() {
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::Register {
                registration: Registration {
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                    password: "secret1".into(),
                },
            })
            .then_state(|state| assert!(state.loading))
            .then_effects(|effects| {
                assertions::assert_sent(effects, &[AuthAction::RegisterPending]);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_register_rejected() {
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(AuthState {
                loading: true,
                ..AuthState::default()
            })
            .when_action(AuthAction::RegisterRejected {
                error: "Email already registered".into(),
            })
            .then_state(|state| {
                assert!(!state.loading);
                assert_eq!(state.error.as_deref(), Some("Email already registered"));
            })
            .run();
    }

    #[test]
    fn test_logout_clears_session_and_purges_token() {
        let env = env();
        env.credentials.persist("t-1").unwrap();
        let credentials = env.credentials.clone();

        ReducerTest::new(AuthReducer::new())
            .with_env(env)
            .given_state(AuthState {
                token: Some("t-1".into()),
                user: Some(ada()),
                ..AuthState::default()
            })
            .when_action(AuthAction::Logout)
            .then_state(|state| {
                assert!(state.token.is_none());
                assert!(state.user.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert_eq!(credentials.token().unwrap(), None);
    }

    #[test]
    fn test_logout_when_signed_out_is_harmless() {
        ReducerTest::new(AuthReducer::new())
            .with_env(env())
            .given_state(AuthState::default())
            .when_action(AuthAction::Logout)
            .then_state(|state| assert_eq!(*state, AuthState::default()))
            .run();
    }
}
