//! Store configuration.
//!
//! Every limit and default lives here: pagination, stock policy, search,
//! cache and session timeouts, plus the fixed registries for sort options
//! and category display metadata. Values can be overridden from the
//! environment.
//!
//! # Environment Variables (all optional)
//!
//! - `VITRINE_PAGE_SIZE` - items per catalog page (default: 12)
//! - `VITRINE_MAX_STOCK` - per-product stock ceiling (default: 1000)
//! - `VITRINE_SEARCH_MIN_LENGTH` - minimum search term length (default: 2)
//! - `VITRINE_CACHE_TTL_SECONDS` - query cache TTL (default: 300)
//! - `VITRINE_CACHE_MAX_ENTRIES` - query cache capacity (default: 100)
//! - `VITRINE_SESSION_TIMEOUT_MINUTES` - session inactivity timeout
//!   (default: 30)

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitrine_core::Category;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog pagination settings.
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    /// Items per page.
    pub page_size: u32,
    /// Page links the host UI should render at most.
    pub max_visible_pages: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 12,
            max_visible_pages: 5,
        }
    }
}

/// Stock increment policy.
#[derive(Debug, Clone, Copy)]
pub struct StockConfig {
    /// Hard ceiling on a product's stock after any increment.
    pub max_stock: u32,
    /// Every increment must be a multiple of this quantum.
    pub quantum: u32,
    /// Smallest accepted increment.
    pub min_increment: u32,
    /// Active products strictly below this level count as low stock in
    /// [`stats`].
    ///
    /// [`stats`]: crate::db::products::ProductRepository::stats
    pub low_stock_threshold: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            max_stock: 1000,
            quantum: 10,
            min_increment: 10,
            low_stock_threshold: 20,
        }
    }
}

/// Catalog search settings.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Search terms shorter than this are ignored (the unfiltered active
    /// set is returned).
    pub min_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_length: 2 }
    }
}

/// Query cache settings.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Seconds a cached query result stays fresh.
    pub ttl_seconds: i64,
    /// Upper bound on cached entries; the oldest entry is evicted when
    /// the cache is full.
    pub max_entries: usize,
}

impl CacheConfig {
    /// TTL as a [`Duration`].
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_entries: 100,
        }
    }
}

/// Session validity settings.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// A session is valid while inactivity stays strictly below this.
    pub inactivity_timeout_minutes: i64,
}

impl SessionConfig {
    /// Inactivity timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::minutes(self.inactivity_timeout_minutes)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_minutes: 30,
        }
    }
}

/// Complete store configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    pub pagination: PaginationConfig,
    pub stock: StockConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
}

impl StoreConfig {
    /// Load the default configuration with environment overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if an override is set but
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = parse_env("VITRINE_PAGE_SIZE")? {
            config.pagination.page_size = v;
        }
        if let Some(v) = parse_env("VITRINE_MAX_STOCK")? {
            config.stock.max_stock = v;
        }
        if let Some(v) = parse_env("VITRINE_SEARCH_MIN_LENGTH")? {
            config.search.min_length = v;
        }
        if let Some(v) = parse_env("VITRINE_CACHE_TTL_SECONDS")? {
            config.cache.ttl_seconds = v;
        }
        if let Some(v) = parse_env("VITRINE_CACHE_MAX_ENTRIES")? {
            config.cache.max_entries = v;
        }
        if let Some(v) = parse_env("VITRINE_SESSION_TIMEOUT_MINUTES")? {
            config.session.inactivity_timeout_minutes = v;
        }

        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_owned(), e.to_string())),
        Err(_) => Ok(None),
    }
}

/// Named sort options for catalog queries.
///
/// The wire names (`name-asc`, `price-desc`, ...) are what the host UI
/// sends; an unknown name parses to `None` and the query engine keeps
/// the input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockAsc,
    StockDesc,
    CreatedAsc,
    CreatedDesc,
}

impl SortKey {
    /// Parse a wire name; unknown names yield `None` (sorting becomes a
    /// no-op, not an error).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name-asc" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "stock-asc" => Some(Self::StockAsc),
            "stock-desc" => Some(Self::StockDesc),
            "created-asc" => Some(Self::CreatedAsc),
            "created-desc" => Some(Self::CreatedDesc),
            _ => None,
        }
    }

    /// The wire name of this option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::StockAsc => "stock-asc",
            Self::StockDesc => "stock-desc",
            Self::CreatedAsc => "created-asc",
            Self::CreatedDesc => "created-desc",
        }
    }

    /// Display label for the host UI.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameAsc => "Nome (A-Z)",
            Self::NameDesc => "Nome (Z-A)",
            Self::PriceAsc => "Preço (Menor)",
            Self::PriceDesc => "Preço (Maior)",
            Self::StockAsc => "Estoque (Menor)",
            Self::StockDesc => "Estoque (Maior)",
            Self::CreatedAsc => "Mais Antigos",
            Self::CreatedDesc => "Mais Recentes",
        }
    }

    /// All sort options, in display order.
    #[must_use]
    pub const fn all() -> [Self; 8] {
        [
            Self::NameAsc,
            Self::NameDesc,
            Self::PriceAsc,
            Self::PriceDesc,
            Self::StockAsc,
            Self::StockDesc,
            Self::CreatedAsc,
            Self::CreatedDesc,
        ]
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display metadata for a product category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryInfo {
    pub label: &'static str,
    pub icon: &'static str,
}

/// Display metadata for `category`.
#[must_use]
pub const fn category_info(category: Category) -> CategoryInfo {
    match category {
        Category::Calcados => CategoryInfo {
            label: "Calçados",
            icon: "👟",
        },
        Category::Roupas => CategoryInfo {
            label: "Roupas",
            icon: "👕",
        },
        Category::Acessorios => CategoryInfo {
            label: "Acessórios",
            icon: "👜",
        },
        Category::Eletronicos => CategoryInfo {
            label: "Eletrônicos",
            icon: "📱",
        },
        Category::Casa => CategoryInfo {
            label: "Casa e Decoração",
            icon: "🏠",
        },
        Category::Esportes => CategoryInfo {
            label: "Esportes",
            icon: "⚽",
        },
    }
}

/// Placeholder image key for `category`.
#[must_use]
pub const fn image_key(category: Category) -> &'static str {
    category.as_str()
}
