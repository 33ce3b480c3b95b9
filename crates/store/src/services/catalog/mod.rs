//! Catalog query engine: search, filter, sort, paginate, cache.
//!
//! Queries run over the active-product set in a fixed pipeline
//! (search, then category filter, then sort, then pagination) with the
//! resolved result cached per normalized parameter set. Invalidation is
//! deliberately coarse: any stock mutation clears the whole cache.

pub mod cache;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use vitrine_core::{Category, ProductId};

use crate::config::{SortKey, StoreConfig};
use crate::db::ProductRepository;
use crate::models::product::Product;

pub use cache::{CacheKey, CacheValue, QueryCache};

/// Errors from catalog queries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product repository has not finished initializing.
    #[error("catalog is not ready")]
    NotReady,
}

/// Parameters for a catalog query. All optional; the default query is
/// page 1 of the unfiltered active set.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Free-text search over name and description. Terms shorter than
    /// the configured minimum are ignored, not rejected.
    pub search: Option<String>,
    /// Exact category filter.
    pub category: Option<Category>,
    /// Sort order; `None` keeps the repository order.
    pub sort: Option<SortKey>,
    /// 1-based page number. Zero is treated as page 1.
    pub page: u32,
    /// Page size override; defaults to the configured size.
    pub page_size: Option<u32>,
}

/// Pagination metadata for a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// The requested (clamped to >= 1) page.
    pub page: u32,
    /// Total pages; at least 1 even for an empty result set.
    pub total_pages: u32,
    /// Matching items across all pages.
    pub total_items: usize,
    pub page_size: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// A resolved catalog query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub items: Vec<Product>,
    pub pagination: Pagination,
}

/// Runs catalog queries against the product repository through the
/// cache.
pub struct CatalogQueryEngine {
    products: Arc<ProductRepository>,
    cache: QueryCache,
    config: Arc<StoreConfig>,
}

impl CatalogQueryEngine {
    /// Create an engine over `products`.
    #[must_use]
    pub fn new(
        products: Arc<ProductRepository>,
        cache: QueryCache,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            products,
            cache,
            config,
        }
    }

    /// Run `query` through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotReady`] if the repository has not been
    /// initialized.
    pub fn query(&self, query: &ProductQuery) -> Result<QueryResult, CatalogError> {
        if !self.products.is_ready() {
            return Err(CatalogError::NotReady);
        }

        let search = normalize_search(query.search.as_deref(), self.config.search.min_length);
        let page = query.page.max(1);
        let page_size = query
            .page_size
            .unwrap_or(self.config.pagination.page_size)
            .max(1);

        let key = CacheKey::Query {
            search: search.clone(),
            category: query.category,
            sort: query.sort,
            page,
            page_size,
        };
        if let Some(CacheValue::Result(result)) = self.cache.get(&key) {
            tracing::trace!(?key, "catalog query cache hit");
            return Ok(result);
        }

        let mut items = self.active_products();

        if let Some(term) = &search {
            items.retain(|p| {
                p.name.to_lowercase().contains(term)
                    || p.description.to_lowercase().contains(term)
            });
        }
        if let Some(category) = query.category {
            items.retain(|p| p.category == category);
        }
        if let Some(sort) = query.sort {
            sort_products(&mut items, sort);
        }

        let (items, pagination) = paginate(items, page, page_size);
        let result = QueryResult { items, pagination };

        self.cache.insert(key, CacheValue::Result(result.clone()));
        Ok(result)
    }

    /// Invalidate cached results after a mutation to `id`.
    ///
    /// Coarse by design: the whole cache is cleared, because any cached
    /// query may include the mutated product.
    pub fn invalidate_product(&self, id: &ProductId) {
        tracing::debug!(product_id = %id, "clearing catalog cache");
        self.cache.clear();
    }

    /// Direct cache access, for hosts that need to warm or inspect it.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn active_products(&self) -> Vec<Product> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&CacheKey::AllActive) {
            return products;
        }

        let products = self.products.active();
        self.cache
            .insert(CacheKey::AllActive, CacheValue::Products(products.clone()));
        products
    }
}

/// Lowercase and trim the search term; terms below `min_length` count
/// as no search at all.
fn normalize_search(raw: Option<&str>, min_length: usize) -> Option<String> {
    let term = raw?.trim().to_lowercase();
    if term.chars().count() < min_length {
        return None;
    }
    Some(term)
}

/// Stable sort so products that compare equal keep repository order.
fn sort_products(items: &mut [Product], sort: SortKey) {
    items.sort_by(|a, b| {
        let ordering = match sort {
            SortKey::NameAsc | SortKey::NameDesc => {
                a.name.to_lowercase().cmp(&b.name.to_lowercase())
            }
            SortKey::PriceAsc | SortKey::PriceDesc => a.price.cmp(&b.price),
            SortKey::StockAsc | SortKey::StockDesc => a.stock.cmp(&b.stock),
            SortKey::CreatedAsc | SortKey::CreatedDesc => a.created_at.cmp(&b.created_at),
        };
        match sort {
            SortKey::NameDesc
            | SortKey::PriceDesc
            | SortKey::StockDesc
            | SortKey::CreatedDesc => ordering.reverse(),
            _ => ordering,
        }
    });
}

fn paginate(items: Vec<Product>, page: u32, page_size: u32) -> (Vec<Product>, Pagination) {
    let total_items = items.len();
    let size = page_size as usize;
    let total_pages = u32::try_from(total_items.div_ceil(size))
        .unwrap_or(u32::MAX)
        .max(1);

    let start = (page.saturating_sub(1) as usize).saturating_mul(size);
    let page_items: Vec<Product> = items.into_iter().skip(start).take(size).collect();

    let pagination = Pagination {
        page,
        total_pages,
        total_items,
        page_size,
        has_next: page < total_pages,
        has_prev: page > 1 && total_items > 0,
    };
    (page_items, pagination)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn engine() -> (CatalogQueryEngine, Arc<ProductRepository>) {
        let config = Arc::new(StoreConfig::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let products = Arc::new(ProductRepository::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            Arc::clone(&config),
        ));
        products.initialize().unwrap();

        let cache = QueryCache::new(clock, config.cache);
        let engine = CatalogQueryEngine::new(Arc::clone(&products), cache, config);
        (engine, products)
    }

    #[test]
    fn test_not_ready_until_initialized() {
        let config = Arc::new(StoreConfig::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let products = Arc::new(ProductRepository::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            Arc::clone(&config),
        ));
        let engine = CatalogQueryEngine::new(
            products,
            QueryCache::new(clock, config.cache),
            config,
        );

        assert!(matches!(
            engine.query(&ProductQuery::default()),
            Err(CatalogError::NotReady)
        ));
    }

    #[test]
    fn test_default_query_excludes_inactive() {
        let (engine, _) = engine();
        let result = engine.query(&ProductQuery::default()).unwrap();

        assert_eq!(result.pagination.total_items, 16);
        assert_eq!(result.items.len(), 12);
        assert!(result.items.iter().all(|p| p.active));
        assert_eq!(result.pagination.total_pages, 2);
        assert!(result.pagination.has_next);
        assert!(!result.pagination.has_prev);
    }

    #[test]
    fn test_search_matches_name_and_description() {
        let (engine, _) = engine();

        let by_name = engine
            .query(&ProductQuery {
                search: Some("TÊNIS".to_owned()),
                ..ProductQuery::default()
            })
            .unwrap();
        assert!(
            by_name
                .items
                .iter()
                .any(|p| p.name == "Tênis Run Fast")
        );

        let by_description = engine
            .query(&ProductQuery {
                search: Some("porcelana".to_owned()),
                ..ProductQuery::default()
            })
            .unwrap();
        assert_eq!(by_description.items.len(), 1);
        assert_eq!(by_description.items[0].name, "Jogo de Pratos Premium");
    }

    #[test]
    fn test_short_search_term_is_ignored() {
        let (engine, _) = engine();
        let result = engine
            .query(&ProductQuery {
                search: Some(" x ".to_owned()),
                ..ProductQuery::default()
            })
            .unwrap();
        assert_eq!(result.pagination.total_items, 16);
    }

    #[test]
    fn test_category_filter() {
        let (engine, _) = engine();
        let result = engine
            .query(&ProductQuery {
                category: Some(Category::Calcados),
                ..ProductQuery::default()
            })
            .unwrap();
        assert_eq!(result.pagination.total_items, 4);
        assert!(result.items.iter().all(|p| p.category == Category::Calcados));
    }

    #[test]
    fn test_sort_price_asc() {
        let (engine, _) = engine();
        let result = engine
            .query(&ProductQuery {
                sort: Some(SortKey::PriceAsc),
                ..ProductQuery::default()
            })
            .unwrap();

        let prices: Vec<_> = result.items.iter().map(|p| p.price).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
        assert_eq!(result.items[0].name, "Camiseta Básica Premium");
    }

    #[test]
    fn test_sort_created_desc() {
        let (engine, _) = engine();
        let result = engine
            .query(&ProductQuery {
                sort: Some(SortKey::CreatedDesc),
                ..ProductQuery::default()
            })
            .unwrap();
        // p-016 is the newest seed (3 days old).
        assert_eq!(result.items[0].name, "Produto Esgotando");
    }

    #[test]
    fn test_out_of_range_page_is_empty_with_metadata() {
        let (engine, _) = engine();
        let result = engine
            .query(&ProductQuery {
                page: 9,
                ..ProductQuery::default()
            })
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.pagination.total_items, 16);
        assert_eq!(result.pagination.total_pages, 2);
        assert!(!result.pagination.has_next);
    }

    #[test]
    fn test_empty_result_still_has_one_page() {
        let (engine, _) = engine();
        let result = engine
            .query(&ProductQuery {
                search: Some("zzzz-no-match".to_owned()),
                ..ProductQuery::default()
            })
            .unwrap();

        assert!(result.items.is_empty());
        assert_eq!(result.pagination.total_pages, 1);
        assert!(!result.pagination.has_next);
        assert!(!result.pagination.has_prev);
    }

    #[test]
    fn test_page_zero_is_page_one() {
        let (engine, _) = engine();
        let zero = engine
            .query(&ProductQuery {
                page: 0,
                ..ProductQuery::default()
            })
            .unwrap();
        let one = engine
            .query(&ProductQuery {
                page: 1,
                ..ProductQuery::default()
            })
            .unwrap();
        assert_eq!(zero.items, one.items);
    }

    #[test]
    fn test_cache_hides_repository_changes_until_invalidated() {
        let (engine, products) = engine();
        let before = engine.query(&ProductQuery::default()).unwrap();

        let id = ProductId::new("p-001");
        products.add_stock(&id, 10).unwrap();

        let cached = engine.query(&ProductQuery::default()).unwrap();
        assert_eq!(cached, before, "stale by design until invalidation");

        engine.invalidate_product(&id);
        let fresh = engine.query(&ProductQuery::default()).unwrap();
        let updated = fresh.items.iter().find(|p| p.id == id).unwrap();
        assert_eq!(updated.stock, 130);
    }
}
