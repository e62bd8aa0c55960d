//! Product collection reducer.
//!
//! # Rules
//!
//! | Event | Effect on [`ProductsState`] |
//! |---|---|
//! | `fetchProducts.pending` | `loading = true`, `error` cleared |
//! | `fetchProducts.fulfilled` | `list` replaced, `loading = false`, `error` cleared, fetch time stamped |
//! | `fetchProducts.rejected` | `loading = false`, `error` set |
//! | `fetchProductById.fulfilled` | `selected` set |
//! | `createProduct.fulfilled` | product appended (no dedup) |
//! | `updateProduct.fulfilled` | matching record replaced in place; no-op if missing |
//! | `deleteProduct.fulfilled` | every matching record removed |
//! | other `*.rejected` | `error` set |
//!
//! A product already in the list is never patched: updates swap the whole
//! record at its index.

use crate::actions::ProductsAction;
use crate::environment::CatalogEnvironment;
use crate::executor;
use crate::gateway::Gateway;
use crate::operation::Operation;
use crate::state::ProductsState;
use crate::types::{Product, ProductId};
use catalog_sync_core::effect::Effect;
use catalog_sync_core::reducer::Reducer;
use catalog_sync_core::{smallvec, SmallVec};

/// Reducer for [`ProductsAction`].
#[derive(Debug)]
pub struct ProductsReducer<G> {
    _phantom: std::marker::PhantomData<fn() -> G>,
}

impl<G> ProductsReducer<G> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<G> Default for ProductsReducer<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for ProductsReducer<G> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// Append a created product. Duplicates are kept and logged.
pub(crate) fn append(list: &mut Vec<Product>, product: Product) {
    if list.iter().any(|existing| existing.id == product.id) {
        tracing::warn!(id = %product.id, "created product id already present in list");
    }
    list.push(product);
}

/// Replace the first record with the same id. Returns whether one was found.
pub(crate) fn replace(list: &mut [Product], product: Product) -> bool {
    match list.iter_mut().find(|existing| existing.id == product.id) {
        Some(slot) => {
            *slot = product;
            true
        },
        None => {
            tracing::warn!(id = %product.id, "updated product is no longer in list");
            false
        },
    }
}

/// Remove every record with `id`. Returns how many were removed.
pub(crate) fn remove(list: &mut Vec<Product>, id: &ProductId) -> usize {
    let before = list.len();
    list.retain(|product| &product.id != id);
    before - list.len()
}

impl<G> Reducer for ProductsReducer<G>
where
    G: Gateway,
{
    type State = ProductsState;
    type Action = ProductsAction;
    type Environment = CatalogEnvironment<G>;

    #[allow(clippy::too_many_lines)] // One arm per operation phase
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Fetch list
            // ═══════════════════════════════════════════════════════════════
            ProductsAction::FetchProducts => {
                let gateway = env.gateway.clone();
                executor::start(
                    ProductsAction::FetchProductsPending,
                    executor::execute(
                        Operation::FetchProducts,
                        async move { gateway.fetch_products().await },
                        |products| ProductsAction::FetchProductsFulfilled { products },
                        |error| ProductsAction::FetchProductsRejected { error },
                    ),
                )
            },

            ProductsAction::FetchProductsPending => {
                executor::pending(Operation::FetchProducts);
                state.loading = true;
                state.error = None;
                smallvec![Effect::None]
            },

            ProductsAction::FetchProductsFulfilled { products } => {
                state.list = products;
                state.loading = false;
                state.error = None;
                state.last_fetched_at = Some(env.clock.now());
                smallvec![Effect::None]
            },

            ProductsAction::FetchProductsRejected { error } => {
                state.loading = false;
                state.error = Some(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Fetch one
            // ═══════════════════════════════════════════════════════════════
            ProductsAction::FetchProductById { id } => {
                let gateway = env.gateway.clone();
                let target = id.clone();
                executor::start(
                    ProductsAction::FetchProductByIdPending { id: id.clone() },
                    executor::execute(
                        Operation::FetchProductById,
                        async move { gateway.fetch_product(&target).await },
                        |product| ProductsAction::FetchProductByIdFulfilled { product },
                        move |error| ProductsAction::FetchProductByIdRejected { id, error },
                    ),
                )
            },

            ProductsAction::FetchProductByIdPending { .. } => {
                executor::pending(Operation::FetchProductById);
                smallvec![Effect::None]
            },

            ProductsAction::FetchProductByIdFulfilled { product } => {
                state.selected = Some(product);
                smallvec![Effect::None]
            },

            ProductsAction::FetchProductByIdRejected { error, .. } => {
                state.error = Some(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Create
            // ═══════════════════════════════════════════════════════════════
            ProductsAction::CreateProduct { draft } => {
                let gateway = env.gateway.clone();
                executor::start(
                    ProductsAction::CreateProductPending,
                    executor::execute(
                        Operation::CreateProduct,
                        async move { gateway.create_product(&draft).await },
                        |product| ProductsAction::CreateProductFulfilled { product },
                        |error| ProductsAction::CreateProductRejected { error },
                    ),
                )
            },

            ProductsAction::CreateProductPending => {
                executor::pending(Operation::CreateProduct);
                smallvec![Effect::None]
            },

            ProductsAction::CreateProductFulfilled { product } => {
                append(&mut state.list, product);
                smallvec![Effect::None]
            },

            ProductsAction::CreateProductRejected { error } => {
                state.error = Some(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Update
            // ═══════════════════════════════════════════════════════════════
            ProductsAction::UpdateProduct { id, update } => {
                let gateway = env.gateway.clone();
                let target = id.clone();
                executor::start(
                    ProductsAction::UpdateProductPending { id: id.clone() },
                    executor::execute(
                        Operation::UpdateProduct,
                        async move { gateway.update_product(&target, &update).await },
                        |product| ProductsAction::UpdateProductFulfilled { product },
                        move |error| ProductsAction::UpdateProductRejected { id, error },
                    ),
                )
            },

            ProductsAction::UpdateProductPending { .. } => {
                executor::pending(Operation::UpdateProduct);
                smallvec![Effect::None]
            },

            ProductsAction::UpdateProductFulfilled { product } => {
                replace(&mut state.list, product);
                smallvec![Effect::None]
            },

            ProductsAction::UpdateProductRejected { error, .. } => {
                state.error = Some(error);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Delete
            // ═══════════════════════════════════════════════════════════════
            ProductsAction::DeleteProduct { id } => {
                let gateway = env.gateway.clone();
                let target = id.clone();
                let failed = id.clone();
                executor::start(
                    ProductsAction::DeleteProductPending { id: id.clone() },
                    executor::execute(
                        Operation::DeleteProduct,
                        async move { gateway.delete_product(&target).await },
                        move |()| ProductsAction::DeleteProductFulfilled { id },
                        move |error| ProductsAction::DeleteProductRejected { id: failed, error },
                    ),
                )
            },

            ProductsAction::DeleteProductPending { .. } => {
                executor::pending(Operation::DeleteProduct);
                smallvec![Effect::None]
            },

            ProductsAction::DeleteProductFulfilled { id } => {
                let removed = remove(&mut state.list, &id);
                if removed == 0 {
                    tracing::debug!(%id, "deleted product was not in list");
                }
                smallvec![Effect::None]
            },

            ProductsAction::DeleteProductRejected { error, .. } => {
                state.error = Some(error);
                smallvec![Effect::None]
            },
        }
    }
}
