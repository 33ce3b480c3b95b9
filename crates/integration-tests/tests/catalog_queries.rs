//! Catalog query pipeline over the seeded demo catalog.

use chrono::Duration;
use vitrine_core::Category;
use vitrine_integration_tests::TestContext;
use vitrine_store::config::{SortKey, StoreConfig};
use vitrine_store::services::catalog::ProductQuery;

#[test]
fn test_seeded_catalog_paginates() {
    let ctx = TestContext::new();

    let page1 = ctx.state.catalog().query(&ProductQuery::default()).unwrap();
    assert_eq!(page1.items.len(), 12);
    assert_eq!(page1.pagination.total_items, 16);
    assert_eq!(page1.pagination.total_pages, 2);
    assert!(page1.pagination.has_next);

    let page2 = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            page: 2,
            ..ProductQuery::default()
        })
        .unwrap();
    assert_eq!(page2.items.len(), 4);
    assert!(!page2.pagination.has_next);
    assert!(page2.pagination.has_prev);

    // No product appears on both pages.
    for item in &page2.items {
        assert!(page1.items.iter().all(|p| p.id != item.id));
    }
}

#[test]
fn test_search_is_accent_and_case_sensitive_per_spec() {
    let ctx = TestContext::new();

    // Matches "Tênis Run Fast" via exact (lowercased) substring.
    let result = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            search: Some("tênis".to_owned()),
            ..ProductQuery::default()
        })
        .unwrap();
    assert!(result.items.iter().any(|p| p.name == "Tênis Run Fast"));

    // Plain "ten" (no accent) does not match "Tênis" but does not
    // error either.
    let unaccented = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            search: Some("ten".to_owned()),
            ..ProductQuery::default()
        })
        .unwrap();
    assert!(unaccented.items.iter().all(|p| p.name != "Tênis Run Fast"));
}

#[test]
fn test_combined_search_category_sort() {
    let ctx = TestContext::new();
    let result = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            search: Some("produto".to_owned()),
            category: Some(Category::Calcados),
            sort: Some(SortKey::PriceAsc),
            ..ProductQuery::default()
        })
        .unwrap();

    // "Produto Esgotando" is the only calçados product with "produto"
    // in name or description; "Produto Inativo" is filtered out before
    // search ever sees it.
    assert_eq!(result.pagination.total_items, 1);
    assert_eq!(result.items[0].id.as_str(), "p-016");
}

#[test]
fn test_sort_orders_whole_result_not_just_page() {
    let ctx = TestContext::new();
    let page1 = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            sort: Some(SortKey::PriceDesc),
            ..ProductQuery::default()
        })
        .unwrap();
    let page2 = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            sort: Some(SortKey::PriceDesc),
            page: 2,
            ..ProductQuery::default()
        })
        .unwrap();

    let cheapest_on_page1 = page1.items.last().unwrap().price;
    assert!(page2.items.iter().all(|p| p.price <= cheapest_on_page1));
    assert_eq!(page1.items[0].name, "Smartphone Galaxy Pro");
}

#[test]
fn test_query_cache_expires_with_ttl() {
    let ctx = TestContext::new();
    let first = ctx.state.catalog().query(&ProductQuery::default()).unwrap();

    // Mutate behind the cache's back.
    ctx.state
        .products()
        .add_stock(&first.items[0].id, 10)
        .unwrap();

    let cached = ctx.state.catalog().query(&ProductQuery::default()).unwrap();
    assert_eq!(cached.items[0].stock, first.items[0].stock);

    ctx.clock.advance(Duration::seconds(301));
    let fresh = ctx.state.catalog().query(&ProductQuery::default()).unwrap();
    assert_eq!(fresh.items[0].stock, first.items[0].stock + 10);
}

#[test]
fn test_page_size_override() {
    let ctx = TestContext::new();
    let result = ctx
        .state
        .catalog()
        .query(&ProductQuery {
            page_size: Some(5),
            ..ProductQuery::default()
        })
        .unwrap();

    assert_eq!(result.items.len(), 5);
    assert_eq!(result.pagination.total_pages, 4);
}

#[test]
fn test_custom_page_size_from_config() {
    let mut config = StoreConfig::default();
    config.pagination.page_size = 4;
    let ctx = TestContext::with_config(config);

    let result = ctx.state.catalog().query(&ProductQuery::default()).unwrap();
    assert_eq!(result.items.len(), 4);
    assert_eq!(result.pagination.total_pages, 4);
}
