//! Catalog browsing commands.

use vitrine_core::Category;
use vitrine_store::AppState;
use vitrine_store::config::{SortKey, category_info};
use vitrine_store::services::catalog::ProductQuery;

/// Run a catalog query and print one line per product.
///
/// # Errors
///
/// Returns an error on an unknown category or if the catalog is not
/// ready. An unrecognized sort name is ignored, matching the engine.
#[allow(clippy::print_stdout)]
pub fn list(
    state: &AppState,
    search: Option<String>,
    category: Option<&str>,
    sort: Option<&str>,
    page: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = category.map(str::parse::<Category>).transpose()?;
    let sort = sort.and_then(SortKey::parse);

    let result = state.catalog().query(&ProductQuery {
        search,
        category,
        sort,
        page,
        page_size: None,
    })?;

    for product in &result.items {
        let info = category_info(product.category);
        println!(
            "{}  {:<30} {} {:>12}  estoque: {}",
            product.id, product.name, info.icon, product.price, product.stock
        );
    }

    let p = result.pagination;
    println!(
        "page {}/{} ({} items{})",
        p.page,
        p.total_pages,
        p.total_items,
        if p.has_next { ", more available" } else { "" }
    );
    Ok(())
}

/// Print catalog counters, overall and per category.
#[allow(clippy::print_stdout)]
pub fn stats(state: &AppState) {
    let stats = state.products().stats();

    println!(
        "{} products ({} active, {} inactive)",
        stats.total, stats.active, stats.inactive
    );
    println!(
        "low stock: {}  out of stock: {}",
        stats.low_stock, stats.out_of_stock
    );

    for (category, entry) in &stats.categories {
        let info = category_info(*category);
        println!(
            "  {} {:<18} {:>2} products, {:>4} units, R$ {:.2}",
            info.icon, info.label, entry.total, entry.total_stock, entry.total_value
        );
    }
}
