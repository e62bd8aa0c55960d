//! Catalog reducers.
//!
//! [`AuthReducer`] and [`ProductsReducer`] each own one collection.
//! [`CatalogReducer`] routes root actions to them through
//! [`scope_reducer`], which folds the child against a copy of its snapshot
//! and writes the whole snapshot back.

mod auth;
mod products;

pub use auth::AuthReducer;
pub use products::ProductsReducer;

use crate::actions::{AuthAction, CatalogAction, ProductsAction};
use crate::environment::CatalogEnvironment;
use crate::gateway::Gateway;
use crate::state::{AuthState, CatalogState, ProductsState};
use catalog_sync_core::composition::{scope_reducer, ScopedReducer};
use catalog_sync_core::effect::Effect;
use catalog_sync_core::reducer::Reducer;
use catalog_sync_core::SmallVec;

type AuthScope<G> = ScopedReducer<
    CatalogState,
    AuthState,
    CatalogAction,
    AuthAction,
    CatalogEnvironment<G>,
    AuthReducer<G>,
>;

type ProductsScope<G> = ScopedReducer<
    CatalogState,
    ProductsState,
    CatalogAction,
    ProductsAction,
    CatalogEnvironment<G>,
    ProductsReducer<G>,
>;

fn auth_slice(state: &CatalogState) -> &AuthState {
    &state.auth
}

fn set_auth_slice(state: &mut CatalogState, auth: AuthState) {
    state.auth = auth;
}

fn products_slice(state: &CatalogState) -> &ProductsState {
    &state.products
}

fn set_products_slice(state: &mut CatalogState, products: ProductsState) {
    state.products = products;
}

/// Root reducer for the catalog store.
pub struct CatalogReducer<G>
where
    G: Gateway,
{
    auth: AuthScope<G>,
    products: ProductsScope<G>,
}

impl<G> CatalogReducer<G>
where
    G: Gateway,
{
    /// Create the root reducer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            auth: scope_reducer(
                AuthReducer::new(),
                auth_slice,
                set_auth_slice,
                CatalogAction::into_auth,
                CatalogAction::Auth,
            ),
            products: scope_reducer(
                ProductsReducer::new(),
                products_slice,
                set_products_slice,
                CatalogAction::into_products,
                CatalogAction::Products,
            ),
        }
    }
}

impl<G> Default for CatalogReducer<G>
where
    G: Gateway,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for CatalogReducer<G>
where
    G: Gateway,
{
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            products: self.products.clone(),
        }
    }
}

impl<G> std::fmt::Debug for CatalogReducer<G>
where
    G: Gateway,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReducer").finish_non_exhaustive()
    }
}

impl<G> Reducer for CatalogReducer<G>
where
    G: Gateway,
{
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment<G>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::Auth(_) => self.auth.reduce(state, action, env),
            CatalogAction::Products(_) => self.products.reduce(state, action, env),
        }
    }
}
