//! # Catalog Sync Testing
//!
//! Testing utilities and helpers for the catalog sync architecture.
//!
//! This crate provides:
//! - A fixed [`Clock`] for deterministic timestamps
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Effect assertion helpers
//! - Idempotent tracing setup for tests
//!
//! ## Example
//!
//! ```ignore
//! use catalog_sync_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(ProductsReducer::new())
//!     .with_env(test_environment())
//!     .given_state(ProductsState::default())
//!     .when_action(ProductsAction::FetchProductsPending)
//!     .then_state(|state| assert!(state.loading))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use catalog_sync_core::environment::Clock;

mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Deterministic stand-ins for environment collaborators
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Clock frozen at one instant, so fetch timestamps can be asserted.
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_sync_testing::mocks::FixedClock;
    /// use catalog_sync_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Clock frozen at `time`.
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock frozen at 2025-01-01T00:00:00Z.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Install a test-friendly tracing subscriber
///
/// Honours `RUST_LOG` and writes through the test writer so output is only
/// shown for failing tests. Safe to call from every test; only the first call
/// installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub use mocks::{test_clock, FixedClock};
