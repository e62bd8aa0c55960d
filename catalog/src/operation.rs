//! The fixed set of remote operations the executor drives.

use std::fmt;

/// A remote operation with a pending/fulfilled/rejected lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /auth/login`
    Login,
    /// `POST /auth/register`
    Register,
    /// `GET /products`
    FetchProducts,
    /// `GET /products/{id}`
    FetchProductById,
    /// `POST /products`
    CreateProduct,
    /// `PUT /products/{id}`
    UpdateProduct,
    /// `DELETE /products/{id}`
    DeleteProduct,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Login,
        Self::Register,
        Self::FetchProducts,
        Self::FetchProductById,
        Self::CreateProduct,
        Self::UpdateProduct,
        Self::DeleteProduct,
    ];

    /// Stable operation name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::FetchProducts => "fetchProducts",
            Self::FetchProductById => "fetchProductById",
            Self::CreateProduct => "createProduct",
            Self::UpdateProduct => "updateProduct",
            Self::DeleteProduct => "deleteProduct",
        }
    }

    /// Generic failure message used when the server reply carries no detail.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::FetchProducts => "Failed to fetch products",
            Self::FetchProductById => "Failed to fetch product",
            Self::CreateProduct => "Error creating product",
            Self::UpdateProduct => "Error updating product",
            Self::DeleteProduct => "Error deleting product",
        }
    }

    /// Whether the server requires a bearer token for this operation.
    #[must_use]
    pub const fn requires_bearer(self) -> bool {
        matches!(
            self,
            Self::CreateProduct | Self::UpdateProduct | Self::DeleteProduct
        )
    }
}

/// Lifecycle step of one operation invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Caller intent; not yet started.
    Command,
    /// Applied synchronously before the remote call is issued.
    Pending,
    /// The remote call succeeded.
    Fulfilled,
    /// The remote call failed.
    Rejected,
}

impl Phase {
    /// Whether this phase ends an invocation.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
