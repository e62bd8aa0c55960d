//! State snapshots owned by the store.
//!
//! The store holds one [`CatalogState`] with two independent collections.
//! Every event touches exactly one of them.

use crate::credentials::CredentialStore;
use crate::types::{Product, ProductId, User};
use chrono::{DateTime, Utc};

/// Credential collection.
///
/// `user` is only ever set together with `token`; `token` may exist alone
/// after a restart, since only the token is durable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Bearer token of the signed-in user.
    pub token: Option<String>,
    /// Profile of the signed-in user.
    pub user: Option<User>,
    /// A login or register call is in flight.
    pub loading: bool,
    /// Message of the last failed login or register.
    pub error: Option<String>,
}

impl AuthState {
    /// Initial state seeded from durable storage: the token survives a
    /// restart, the profile does not.
    ///
    /// An unreadable store is treated as signed out.
    #[must_use]
    pub fn restore(credentials: &CredentialStore) -> Self {
        let token = credentials.token().unwrap_or_else(|error| {
            tracing::warn!(%error, "could not restore bearer token");
            None
        });
        Self {
            token,
            ..Self::default()
        }
    }

    /// Whether a bearer token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Product collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductsState {
    /// Products in server order, modified locally by create/update/delete.
    pub list: Vec<Product>,
    /// Product loaded by an explicit fetch-by-id.
    pub selected: Option<Product>,
    /// The list fetch is in flight.
    pub loading: bool,
    /// Message of the last failed product operation.
    pub error: Option<String>,
    /// When the list was last replaced by a full fetch.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl ProductsState {
    /// Find a product in the list.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.list.iter().find(|product| &product.id == id)
    }

    /// Identifiers in list order.
    #[must_use]
    pub fn ids(&self) -> Vec<ProductId> {
        self.list.iter().map(|product| product.id.clone()).collect()
    }
}

/// Root snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Credential collection.
    pub auth: AuthState,
    /// Product collection.
    pub products: ProductsState,
}

impl CatalogState {
    /// Initial state with credentials restored from durable storage.
    #[must_use]
    pub fn restore(credentials: &CredentialStore) -> Self {
        Self {
            auth: AuthState::restore(credentials),
            products: ProductsState::default(),
        }
    }
}
