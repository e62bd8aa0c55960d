//! Catalog environment.
//!
//! Every external dependency the reducers reach is injected here, so tests
//! can substitute an in-memory gateway, storage and a fixed clock.

use crate::credentials::CredentialStore;
use crate::gateway::Gateway;
use catalog_sync_core::environment::{Clock, SystemClock};
use std::fmt;
use std::sync::Arc;

/// Dependencies of the catalog reducers.
///
/// # Type Parameters
///
/// - `G`: transport gateway
#[derive(Clone)]
pub struct CatalogEnvironment<G>
where
    G: Gateway,
{
    /// Remote API.
    pub gateway: G,

    /// Durable bearer-token slot (shared with the gateway).
    pub credentials: CredentialStore,

    /// Time source for fetch timestamps.
    pub clock: Arc<dyn Clock>,
}

impl<G> CatalogEnvironment<G>
where
    G: Gateway,
{
    /// Environment using the system clock.
    #[must_use]
    pub fn new(gateway: G, credentials: CredentialStore) -> Self {
        Self {
            gateway,
            credentials,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}

impl<G> fmt::Debug for CatalogEnvironment<G>
where
    G: Gateway + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEnvironment")
            .field("gateway", &self.gateway)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
