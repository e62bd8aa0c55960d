//! # Catalog Sync
//!
//! Client-side engine for a catalog/auth API: remote operations run through a
//! uniform pending → fulfilled | rejected lifecycle, and their phase events
//! are folded into a single-owner store.
//!
//! ## Components
//!
//! - [`credentials`]: durable bearer-token slot
//! - [`gateway`]: transport boundary; attaches the bearer when present
//! - [`executor`]: publishes the pending event, then drives one remote call
//!   to exactly one terminal event
//! - [`reducers`]: fold phase events into the auth and product collections
//! - [`validation`]: pure field rules and form models
//! - [`client`]: typed handle over the store
//!
//! ## Example
//!
//! ```no_run
//! use catalog_sync::{CatalogClient, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::connect(&ClientConfig::from_env()?)?;
//!
//! let mut handle = client.fetch_products().await?;
//! handle.wait().await;
//!
//! let count = client.state(|s| s.products.list.len()).await;
//! println!("{count} products");
//! # Ok(())
//! # }
//! ```
//!
//! ## Ordering
//!
//! Any number of operations may be in flight at once. Their terminal events
//! are applied in the order they settle, not the order they were issued: a
//! delete that settles before a slower update of the same product makes the
//! update's fulfilled event a no-op.

pub mod actions;
pub mod client;
pub mod config;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod operation;
pub mod reducers;
pub mod state;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::{AuthAction, CatalogAction, ProductsAction};
pub use client::{CatalogClient, CatalogStore};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use environment::CatalogEnvironment;
pub use error::{ConfigError, GatewayError, StorageError};
pub use gateway::{Gateway, HttpGateway};
pub use operation::{Operation, Phase};
pub use reducers::{AuthReducer, CatalogReducer, ProductsReducer};
pub use state::{AuthState, CatalogState, ProductsState};
pub use types::{
    AuthSession, Credentials, Product, ProductDraft, ProductId, ProductUpdate, Registered,
    Registration, User, UserId,
};
pub use validation::{FieldError, FieldErrors, FieldKey, ProductForm, RegistrationForm, Touched};
