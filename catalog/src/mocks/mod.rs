//! Mock implementations for testing.
//!
//! These stand in for the remote catalog API so reducers and the store can
//! be exercised without a network.

pub mod gateway;

pub use gateway::{MockGateway, RecordedRequest};
