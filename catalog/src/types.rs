//! Domain records exchanged with the catalog API.
//!
//! Identifiers are opaque server-assigned strings. On the wire the identifier
//! field is `_id`; `id` is accepted as an alias.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Product identifier (server-assigned, immutable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// User identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A catalog product as the server returns it.
///
/// Once placed in a list a product is never patched: a successful update
/// replaces the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Unit price, always positive.
    pub price: f64,
    /// Category name.
    pub category: String,
    /// Units in stock.
    pub stock: u32,
    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
}

/// Payload for creating a product (the server assigns the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Display title.
    pub title: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Category name.
    pub category: String,
    /// Units in stock.
    pub stock: u32,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductDraft {
    /// Attach a server-assigned identifier.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            stock: self.stock,
            images: self.images,
        }
    }
}

/// Partial update payload. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New stock level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Replacement image list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Apply the present fields to a product, producing the replacement record.
    #[must_use]
    pub fn apply_to(&self, product: &Product) -> Product {
        Product {
            id: product.id.clone(),
            title: self.title.clone().unwrap_or_else(|| product.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| product.description.clone()),
            price: self.price.unwrap_or(product.price),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| product.category.clone()),
            stock: self.stock.unwrap_or(product.stock),
            images: self.images.clone().unwrap_or_else(|| product.images.clone()),
        }
    }
}

impl From<ProductDraft> for ProductUpdate {
    fn from(draft: ProductDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            price: Some(draft.price),
            category: Some(draft.category),
            stock: Some(draft.stock),
            images: Some(draft.images),
        }
    }
}

/// Authenticated user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Login payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Email address.
    pub email: String,
    /// Plain-text password (never logged).
    pub password: String,
}

impl Credentials {
    /// Build a login payload.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration payload. The password confirmation never leaves the form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password (never logged).
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login reply.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Authenticated profile.
    pub user: User,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Register reply.
///
/// Servers answer either with the created user record or with a full
/// `{ token, user }` session; both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Registered {
    /// The server signed the new user in.
    Session(AuthSession),
    /// The server only created the account.
    User(User),
}

impl Registered {
    /// The created user.
    #[must_use]
    pub const fn user(&self) -> &User {
        match self {
            Self::Session(session) => &session.user,
            Self::User(user) => user,
        }
    }

    /// The session token, if the server issued one.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Session(session) => Some(&session.token),
            Self::User(_) => None,
        }
    }
}
