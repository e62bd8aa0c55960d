//! Transport gateway: the one facility every outbound call passes through.
//!
//! # Contract
//!
//! | Method | Endpoint | Bearer |
//! |---|---|---|
//! | [`Gateway::fetch_products`] | `GET /products` | if present |
//! | [`Gateway::fetch_product`] | `GET /products/{id}` | if present |
//! | [`Gateway::create_product`] | `POST /products` | required by server |
//! | [`Gateway::update_product`] | `PUT /products/{id}` | required by server |
//! | [`Gateway::delete_product`] | `DELETE /products/{id}` | required by server |
//! | [`Gateway::login`] | `POST /auth/login` | if present |
//! | [`Gateway::register`] | `POST /auth/register` | if present |
//!
//! Implementations read the current token immediately before issuing each
//! request and attach it as `Authorization: Bearer <token>` when one exists.
//! Without a token the request goes out unauthenticated and the server
//! decides.

mod http;

pub use http::HttpGateway;

use crate::error::GatewayError;
use crate::types::{
    AuthSession, Credentials, Product, ProductDraft, ProductId, ProductUpdate, Registered,
    Registration,
};
use std::future::Future;

/// Remote catalog/auth API.
pub trait Gateway: Clone + Send + Sync + 'static {
    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, error status, or an
    /// undecodable body.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, GatewayError>> + Send;

    /// Fetch one product. A missing product is an error status.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, error status, or an
    /// undecodable body.
    fn fetch_product(
        &self,
        id: &ProductId,
    ) -> impl Future<Output = Result<Product, GatewayError>> + Send;

    /// Create a product; the server assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, error status, or an
    /// undecodable body.
    fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, GatewayError>> + Send;

    /// Update a product, returning the full replacement record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, error status, or an
    /// undecodable body.
    fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> impl Future<Output = Result<Product, GatewayError>> + Send;

    /// Delete a product. The server answers with no content.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure or error status.
    fn delete_product(&self, id: &ProductId)
    -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, error status, or an
    /// undecodable body.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthSession, GatewayError>> + Send;

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure, error status, or an
    /// undecodable body.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<Registered, GatewayError>> + Send;
}

/// Extract the most specific message from an error response body.
///
/// JSON bodies are searched for a non-empty `message`, `error` or `msg`
/// string, in that order. Any other non-empty body is taken verbatim as plain
/// text. JSON without one of those fields yields `None`.
#[must_use]
pub fn server_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(fields)) => ["message", "error", "msg"]
            .iter()
            .filter_map(|key| fields.get(*key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .find(|detail| !detail.is_empty())
            .map(str::to_string),
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => {
            Some(text.trim().to_string())
        },
        Ok(_) => None,
        Err(_) => Some(body.to_string()),
    }
}
