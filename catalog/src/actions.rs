//! Catalog actions.
//!
//! Each remote operation has a command (caller intent) and three phase
//! events: `Pending`, `Fulfilled` and `Rejected`. A command's arm sends its
//! `Pending` event and starts the call; only phase events change state.
//!
//! Actions are nested by collection so that routing alone guarantees an
//! event mutates at most one of the two collections.

use crate::operation::{Operation, Phase};
use crate::types::{
    AuthSession, Credentials, Product, ProductDraft, ProductId, ProductUpdate, Registered,
    Registration,
};

/// Credential collection actions.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════════
    /// Sign in with email and password.
    Login {
        /// Login payload.
        credentials: Credentials,
    },

    /// Login request issued.
    LoginPending,

    /// Login succeeded; the token has already been persisted.
    LoginFulfilled {
        /// Token and profile returned by the server.
        session: AuthSession,
    },

    /// Login failed.
    LoginRejected {
        /// User-facing message.
        error: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Register
    // ═══════════════════════════════════════════════════════════════════════
    /// Create an account.
    Register {
        /// Registration payload.
        registration: Registration,
    },

    /// Register request issued.
    RegisterPending,

    /// Account created.
    RegisterFulfilled {
        /// Created user, with a session token if the server issued one.
        registered: Registered,
    },

    /// Register failed.
    RegisterRejected {
        /// User-facing message.
        error: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Logout
    // ═══════════════════════════════════════════════════════════════════════
    /// Sign out: clears the session and purges the durable token.
    /// Synchronous; has no phases.
    Logout,
}

impl AuthAction {
    /// The operation and phase this action represents, if any.
    #[must_use]
    pub const fn lifecycle(&self) -> Option<(Operation, Phase)> {
        let step = match self {
            Self::Login { .. } => (Operation::Login, Phase::Command),
            Self::LoginPending => (Operation::Login, Phase::Pending),
            Self::LoginFulfilled { .. } => (Operation::Login, Phase::Fulfilled),
            Self::LoginRejected { .. } => (Operation::Login, Phase::Rejected),
            Self::Register { .. } => (Operation::Register, Phase::Command),
            Self::RegisterPending => (Operation::Register, Phase::Pending),
            Self::RegisterFulfilled { .. } => (Operation::Register, Phase::Fulfilled),
            Self::RegisterRejected { .. } => (Operation::Register, Phase::Rejected),
            Self::Logout => return None,
        };
        Some(step)
    }
}

/// Product collection actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductsAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Fetch list
    // ═══════════════════════════════════════════════════════════════════════
    /// Load the full product list.
    FetchProducts,

    /// List request issued.
    FetchProductsPending,

    /// List loaded; replaces the local list wholesale.
    FetchProductsFulfilled {
        /// Products in server order.
        products: Vec<Product>,
    },

    /// List request failed.
    FetchProductsRejected {
        /// User-facing message.
        error: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Fetch one
    // ═══════════════════════════════════════════════════════════════════════
    /// Load a single product into `selected`.
    FetchProductById {
        /// Product to load.
        id: ProductId,
    },

    /// Single-product request issued.
    FetchProductByIdPending {
        /// Product requested.
        id: ProductId,
    },

    /// Single product loaded.
    FetchProductByIdFulfilled {
        /// Loaded product.
        product: Product,
    },

    /// Single-product request failed.
    FetchProductByIdRejected {
        /// Product requested.
        id: ProductId,
        /// User-facing message.
        error: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Create
    // ═══════════════════════════════════════════════════════════════════════
    /// Create a product.
    CreateProduct {
        /// Validated payload.
        draft: ProductDraft,
    },

    /// Create request issued.
    CreateProductPending,

    /// Product created; appended to the list.
    CreateProductFulfilled {
        /// Created product with its server-assigned id.
        product: Product,
    },

    /// Create failed.
    CreateProductRejected {
        /// User-facing message.
        error: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Update
    // ═══════════════════════════════════════════════════════════════════════
    /// Update a product.
    UpdateProduct {
        /// Product to update.
        id: ProductId,
        /// Fields to change.
        update: ProductUpdate,
    },

    /// Update request issued.
    UpdateProductPending {
        /// Product being updated.
        id: ProductId,
    },

    /// Product updated; replaces the matching record in place.
    UpdateProductFulfilled {
        /// Full replacement record.
        product: Product,
    },

    /// Update failed.
    UpdateProductRejected {
        /// Product being updated.
        id: ProductId,
        /// User-facing message.
        error: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Delete
    // ═══════════════════════════════════════════════════════════════════════
    /// Delete a product.
    DeleteProduct {
        /// Product to delete.
        id: ProductId,
    },

    /// Delete request issued.
    DeleteProductPending {
        /// Product being deleted.
        id: ProductId,
    },

    /// Product deleted; every matching record is removed from the list.
    DeleteProductFulfilled {
        /// Deleted product.
        id: ProductId,
    },

    /// Delete failed.
    DeleteProductRejected {
        /// Product being deleted.
        id: ProductId,
        /// User-facing message.
        error: String,
    },
}

impl ProductsAction {
    /// The operation and phase this action represents.
    #[must_use]
    pub const fn lifecycle(&self) -> (Operation, Phase) {
        match self {
            Self::FetchProducts => (Operation::FetchProducts, Phase::Command),
            Self::FetchProductsPending => (Operation::FetchProducts, Phase::Pending),
            Self::FetchProductsFulfilled { .. } => (Operation::FetchProducts, Phase::Fulfilled),
            Self::FetchProductsRejected { .. } => (Operation::FetchProducts, Phase::Rejected),
            Self::FetchProductById { .. } => (Operation::FetchProductById, Phase::Command),
            Self::FetchProductByIdPending { .. } => (Operation::FetchProductById, Phase::Pending),
            Self::FetchProductByIdFulfilled { .. } => {
                (Operation::FetchProductById, Phase::Fulfilled)
            },
            Self::FetchProductByIdRejected { .. } => {
                (Operation::FetchProductById, Phase::Rejected)
            },
            Self::CreateProduct { .. } => (Operation::CreateProduct, Phase::Command),
            Self::CreateProductPending => (Operation::CreateProduct, Phase::Pending),
            Self::CreateProductFulfilled { .. } => (Operation::CreateProduct, Phase::Fulfilled),
            Self::CreateProductRejected { .. } => (Operation::CreateProduct, Phase::Rejected),
            Self::UpdateProduct { .. } => (Operation::UpdateProduct, Phase::Command),
            Self::UpdateProductPending { .. } => (Operation::UpdateProduct, Phase::Pending),
            Self::UpdateProductFulfilled { .. } => (Operation::UpdateProduct, Phase::Fulfilled),
            Self::UpdateProductRejected { .. } => (Operation::UpdateProduct, Phase::Rejected),
            Self::DeleteProduct { .. } => (Operation::DeleteProduct, Phase::Command),
            Self::DeleteProductPending { .. } => (Operation::DeleteProduct, Phase::Pending),
            Self::DeleteProductFulfilled { .. } => (Operation::DeleteProduct, Phase::Fulfilled),
            Self::DeleteProductRejected { .. } => (Operation::DeleteProduct, Phase::Rejected),
        }
    }
}

/// Root action accepted by the catalog store.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    /// Credential collection.
    Auth(AuthAction),
    /// Product collection.
    Products(ProductsAction),
}

impl CatalogAction {
    /// Credential action, if this is one.
    #[must_use]
    pub fn into_auth(self) -> Option<AuthAction> {
        match self {
            Self::Auth(action) => Some(action),
            Self::Products(_) => None,
        }
    }

    /// Product action, if this is one.
    #[must_use]
    pub fn into_products(self) -> Option<ProductsAction> {
        match self {
            Self::Products(action) => Some(action),
            Self::Auth(_) => None,
        }
    }

    /// The operation and phase this action represents, if any.
    #[must_use]
    pub const fn lifecycle(&self) -> Option<(Operation, Phase)> {
        match self {
            Self::Auth(action) => action.lifecycle(),
            Self::Products(action) => Some(action.lifecycle()),
        }
    }

    /// Whether this action ends an operation invocation.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self.lifecycle() {
            Some((_, phase)) => phase.is_terminal(),
            None => false,
        }
    }
}

impl From<AuthAction> for CatalogAction {
    fn from(action: AuthAction) -> Self {
        Self::Auth(action)
    }
}

impl From<ProductsAction> for CatalogAction {
    fn from(action: ProductsAction) -> Self {
        Self::Products(action)
    }
}
