//! Product domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitrine_core::{Category, Price, ProductId};

/// A catalog product, as persisted.
///
/// Mutated only through [`ProductPatch`] application or the raw stock
/// increment in the repository; both stamp `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    /// Catalog handle (`p-001`, ...).
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Unit price; non-negative by construction.
    pub price: Price,
    /// Units on hand; never negative.
    pub stock: u32,
    /// Inactive products are invisible to customer-facing queries.
    pub active: bool,
    /// Placeholder image handle.
    pub image_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update to a [`Product`].
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Price>,
    pub stock: Option<u32>,
    pub active: Option<bool>,
    pub image_key: Option<String>,
}

impl ProductPatch {
    /// Apply this patch to `product` (without stamping `updated_at`).
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(active) = self.active {
            product.active = active;
        }
        if let Some(image_key) = self.image_key {
            product.image_key = image_key;
        }
    }
}

/// Aggregate catalog counters.
///
/// Pure derived view; recomputed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Active products strictly below the low-stock threshold.
    pub low_stock: usize,
    /// Active products with zero stock.
    pub out_of_stock: usize,
    pub categories: BTreeMap<Category, CategoryStats>,
}

/// Per-category counters.
///
/// `total` counts every product in the category; stock and value
/// aggregate active products only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStats {
    pub total: usize,
    pub active: usize,
    pub total_stock: u64,
    pub total_value: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_applies_only_set_fields() {
        let now = Utc::now();
        let mut product = Product {
            id: ProductId::new("p-001"),
            name: "Tênis Run Fast".to_owned(),
            description: "Tênis leve para corrida".to_owned(),
            category: Category::Calcados,
            price: Price::from_cents(29990),
            stock: 120,
            active: true,
            image_key: "calcados".to_owned(),
            created_at: now,
            updated_at: now,
        };

        ProductPatch {
            stock: Some(130),
            active: Some(false),
            ..ProductPatch::default()
        }
        .apply(&mut product);

        assert_eq!(product.stock, 130);
        assert!(!product.active);
        assert_eq!(product.name, "Tênis Run Fast");
        assert_eq!(product.price, Price::from_cents(29990));
    }
}
