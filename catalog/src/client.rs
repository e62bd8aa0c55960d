//! Typed entry point over the catalog store.
//!
//! The store is the single owner of [`CatalogState`]; every component that
//! needs it receives a clone of the [`CatalogClient`] handle. Each method
//! dispatches one command. The returned [`EffectHandle`] resolves once the
//! command's terminal event has been folded.

use crate::actions::{AuthAction, CatalogAction, ProductsAction};
use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, FileTokenStorage};
use crate::environment::CatalogEnvironment;
use crate::error::ConfigError;
use crate::gateway::{Gateway, HttpGateway};
use crate::reducers::CatalogReducer;
use crate::state::CatalogState;
use crate::types::{Credentials, ProductDraft, ProductId, ProductUpdate, Registration};
use catalog_sync_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// The catalog store, fully typed.
pub type CatalogStore<G> =
    Store<CatalogState, CatalogAction, CatalogEnvironment<G>, CatalogReducer<G>>;

/// Cloneable handle to the catalog store.
#[derive(Clone)]
pub struct CatalogClient<G>
where
    G: Gateway,
{
    store: CatalogStore<G>,
}

impl CatalogClient<HttpGateway> {
    /// Client for the HTTP API in `config`, with file-backed credentials and
    /// the token restored from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is unusable.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConfigError> {
        let credentials = CredentialStore::new(
            Arc::new(FileTokenStorage::new(&config.token_path)),
            config.token_key.as_str(),
        );
        let gateway = HttpGateway::new(config, credentials.clone())?;
        Ok(Self::new(CatalogEnvironment::new(gateway, credentials)))
    }
}

impl<G> CatalogClient<G>
where
    G: Gateway,
{
    /// Client over `env`, with the initial state restored from its
    /// credential store.
    #[must_use]
    pub fn new(env: CatalogEnvironment<G>) -> Self {
        let state = CatalogState::restore(&env.credentials);
        Self {
            store: Store::new(state, CatalogReducer::new(), env),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &CatalogStore<G> {
        &self.store
    }

    /// Dispatch any catalog action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn send(&self, action: impl Into<CatalogAction>) -> Result<EffectHandle, StoreError> {
        self.store.send(action.into()).await
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn login(&self, credentials: Credentials) -> Result<EffectHandle, StoreError> {
        self.send(AuthAction::Login { credentials }).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn register(&self, registration: Registration) -> Result<EffectHandle, StoreError> {
        self.send(AuthAction::Register { registration }).await
    }

    /// Sign out and purge the durable token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn logout(&self) -> Result<EffectHandle, StoreError> {
        self.send(AuthAction::Logout).await
    }

    /// Reload the product list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn fetch_products(&self) -> Result<EffectHandle, StoreError> {
        self.send(ProductsAction::FetchProducts).await
    }

    /// Load one product into `selected`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn fetch_product(&self, id: ProductId) -> Result<EffectHandle, StoreError> {
        self.send(ProductsAction::FetchProductById { id }).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<EffectHandle, StoreError> {
        self.send(ProductsAction::CreateProduct { draft }).await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<EffectHandle, StoreError> {
        self.send(ProductsAction::UpdateProduct { id, update }).await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after shutdown began.
    pub async fn delete_product(&self, id: ProductId) -> Result<EffectHandle, StoreError> {
        self.send(ProductsAction::DeleteProduct { id }).await
    }

    /// Read a projection of the current snapshot.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&CatalogState) -> T,
    {
        self.store.state(f).await
    }

    /// Clone the current snapshot.
    pub async fn snapshot(&self) -> CatalogState {
        self.store.state(Clone::clone).await
    }

    /// Observe phase events as they are folded, in fold order: each
    /// command's pending event at once, terminal events in settlement order.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting commands and wait for in-flight calls to settle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if calls are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}
