//! `reqwest`-backed gateway.

use super::{server_detail, Gateway};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::{ConfigError, GatewayError};
use crate::types::{
    AuthSession, Credentials, Product, ProductDraft, ProductId, ProductUpdate, Registered,
    Registration,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// HTTP gateway to the catalog API.
///
/// Cloning shares the connection pool and the credential slot.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    root: Url,
    credentials: CredentialStore,
}

impl HttpGateway {
    /// Gateway for the API described by `config`, authenticating with
    /// whatever token `credentials` holds at request time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig, credentials: CredentialStore) -> Result<Self, ConfigError> {
        let root = config.api_root()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            root,
            credentials,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        // api_root() rejects URLs that cannot be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request, attaching the bearer token read right now.
    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.url(segments));
        match self.credentials.token() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(error) => {
                tracing::warn!(%error, "could not read bearer token; sending unauthenticated");
                builder
            },
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            detail: server_detail(&body),
        })
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, GatewayError> {
        let response = Self::send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

impl Gateway for HttpGateway {
    async fn fetch_products(&self) -> Result<Vec<Product>, GatewayError> {
        Self::send_json(self.request(Method::GET, &["products"])).await
    }

    async fn fetch_product(&self, id: &ProductId) -> Result<Product, GatewayError> {
        Self::send_json(self.request(Method::GET, &["products", id.as_str()])).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, GatewayError> {
        Self::send_json(self.request(Method::POST, &["products"]).json(draft)).await
    }

    async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, GatewayError> {
        Self::send_json(
            self.request(Method::PUT, &["products", id.as_str()])
                .json(update),
        )
        .await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), GatewayError> {
        Self::send(self.request(Method::DELETE, &["products", id.as_str()])).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, GatewayError> {
        Self::send_json(self.request(Method::POST, &["auth", "login"]).json(credentials)).await
    }

    async fn register(&self, registration: &Registration) -> Result<Registered, GatewayError> {
        Self::send_json(
            self.request(Method::POST, &["auth", "register"])
                .json(registration),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(
            &ClientConfig::default().with_base_url(base),
            CredentialStore::in_memory(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_joins_segments_under_root() {
        let gw = gateway("http://localhost:4000/api");
        assert_eq!(
            gw.url(&["products", "p1"]).as_str(),
            "http://localhost:4000/api/products/p1"
        );
    }

    #[test]
    fn test_url_tolerates_trailing_slash_and_escapes_ids() {
        let gw = gateway("http://localhost:4000/api/");
        assert_eq!(
            gw.url(&["products", "a/b"]).as_str(),
            "http://localhost:4000/api/products/a%2Fb"
        );
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        let result = HttpGateway::new(
            &ClientConfig::default().with_base_url("not a url"),
            CredentialStore::in_memory(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }
}
