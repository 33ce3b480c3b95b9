//! Quantized stock-increment workflow.
//!
//! Restocking is the only stock mutation the storefront allows, and it
//! is deliberately rigid: increments come in fixed quanta, never below
//! a minimum, and never push a product past the ceiling. Validation
//! runs in a fixed order so the host UI always shows the most specific
//! applicable error.

use std::sync::Arc;

use thiserror::Error;

use vitrine_core::ProductId;

use crate::config::StoreConfig;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::Product;
use crate::services::catalog::CatalogQueryEngine;

/// Errors from the stock workflow, ordered by validation precedence.
#[derive(Debug, Error)]
pub enum StockError {
    /// The product does not exist or is inactive. The two cases are
    /// deliberately indistinguishable to the caller.
    #[error("product not available for restock")]
    ProductUnavailable,

    /// The increment is not a multiple of the quantum.
    #[error("increment must be a multiple of {quantum}")]
    InvalidIncrement { quantum: u32 },

    /// The increment is below the minimum.
    #[error("increment must be at least {minimum}")]
    BelowMinimum { minimum: u32 },

    /// The increment would push stock past the ceiling.
    #[error("increment would raise stock to {resulting}, exceeding the limit of {ceiling}")]
    ExceedsMaximum { resulting: u64, ceiling: u32 },

    /// Repository failure while applying a validated increment.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Applies validated stock increments and invalidates the catalog
/// cache afterwards.
pub struct StockWorkflow {
    products: Arc<ProductRepository>,
    catalog: Arc<CatalogQueryEngine>,
    config: Arc<StoreConfig>,
}

impl StockWorkflow {
    /// Create a workflow over `products`, invalidating `catalog` after
    /// each applied increment.
    #[must_use]
    pub fn new(
        products: Arc<ProductRepository>,
        catalog: Arc<CatalogQueryEngine>,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            products,
            catalog,
            config,
        }
    }

    /// Add `amount` units of stock to the product with `id`.
    ///
    /// Validation order: product availability, then quantum alignment,
    /// then minimum, then ceiling. Nothing is written unless every
    /// check passes.
    ///
    /// # Errors
    ///
    /// Returns the first violated [`StockError`] in precedence order,
    /// or a repository error if the persist fails.
    pub fn apply(&self, id: &ProductId, amount: u32) -> Result<Product, StockError> {
        let policy = &self.config.stock;

        let product = self
            .products
            .by_id(id)
            .filter(|p| p.active)
            .ok_or(StockError::ProductUnavailable)?;

        if policy.quantum == 0 || amount % policy.quantum != 0 {
            return Err(StockError::InvalidIncrement {
                quantum: policy.quantum,
            });
        }
        if amount < policy.min_increment {
            return Err(StockError::BelowMinimum {
                minimum: policy.min_increment,
            });
        }

        let resulting = u64::from(product.stock) + u64::from(amount);
        if resulting > u64::from(policy.max_stock) {
            return Err(StockError::ExceedsMaximum {
                resulting,
                ceiling: policy.max_stock,
            });
        }

        let updated = self
            .products
            .add_stock(id, amount)?
            .ok_or(StockError::ProductUnavailable)?;

        tracing::info!(
            product_id = %id,
            amount,
            stock = updated.stock,
            "stock increment applied"
        );
        self.catalog.invalidate_product(id);
        Ok(updated)
    }
}
