//! Product repository with seed catalog.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::PoisonError;

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;

use vitrine_core::{Category, Price, ProductId};

use super::RepositoryError;
use crate::clock::Clock;
use crate::config::{StoreConfig, image_key};
use crate::models::product::{CatalogStats, CategoryStats, Product, ProductPatch};
use crate::storage::{KeyValueStore, KeyValueStoreExt};

/// Storage key for the product collection.
const PRODUCTS_KEY: &str = "products";

/// Repository for the product catalog.
///
/// Holds an in-memory mirror of the persisted collection so reads never
/// touch the store. Every mutation updates the mirror and persists the
/// whole collection back in one write; a failed persist leaves both the
/// mirror and the stored collection unchanged.
pub struct ProductRepository {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: Arc<StoreConfig>,
    products: RwLock<Vec<Product>>,
    ready: AtomicBool,
}

impl ProductRepository {
    /// Create a repository. Call [`initialize`](Self::initialize) before
    /// reading from it.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            products: RwLock::new(Vec::new()),
            ready: AtomicBool::new(false),
        }
    }

    /// Load the catalog from the store, seeding it on first run.
    ///
    /// Idempotent: a store that already holds at least one product is
    /// never reseeded, even if every product in it is inactive.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading or the initial persist fails.
    pub fn initialize(&self) -> Result<(), RepositoryError> {
        let stored: Vec<Product> = self.store.get_or(PRODUCTS_KEY, Vec::new)?;

        let products = if stored.is_empty() {
            let seeded = seed_catalog(self.clock.now());
            self.store.set(PRODUCTS_KEY, &seeded)?;
            tracing::info!(count = seeded.len(), "seeded product catalog");
            seeded
        } else {
            tracing::debug!(count = stored.len(), "loaded product catalog");
            stored
        };

        *self.write_guard() = products;
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Drop every product and reseed the catalog.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the reseed fails to persist.
    pub fn reset(&self) -> Result<(), RepositoryError> {
        self.ready.store(false, Ordering::Release);
        self.write_guard().clear();
        self.store.remove(PRODUCTS_KEY)?;
        self.initialize()
    }

    /// Whether [`initialize`](Self::initialize) has completed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// All products, active or not.
    #[must_use]
    pub fn all(&self) -> Vec<Product> {
        self.read_guard().clone()
    }

    /// Active products only.
    #[must_use]
    pub fn active(&self) -> Vec<Product> {
        self.read_guard()
            .iter()
            .filter(|p| p.active)
            .cloned()
            .collect()
    }

    /// Look up a product by id, active or not.
    #[must_use]
    pub fn by_id(&self, id: &ProductId) -> Option<Product> {
        self.read_guard().iter().find(|p| &p.id == id).cloned()
    }

    /// Apply `patch` to the product with `id`, stamping `updated_at`.
    ///
    /// Returns the updated record, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persist fails, in which case the
    /// in-memory mirror is unchanged.
    pub fn update_fields(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut products = self.write_guard();

        let Some(index) = products.iter().position(|p| &p.id == id) else {
            return Ok(None);
        };

        let mut updated = products[index].clone();
        patch.apply(&mut updated);
        updated.updated_at = self.clock.now();

        let mut next = products.clone();
        next[index] = updated.clone();
        self.store.set(PRODUCTS_KEY, &next)?;

        *products = next;
        Ok(Some(updated))
    }

    /// Raw stock increment: add `amount` units to an active product.
    ///
    /// Returns the updated record, or `None` if the id is unknown or the
    /// product is inactive. Policy checks (quantum, minimum, ceiling)
    /// belong to the workflow layer, not here.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persist fails.
    pub fn add_stock(
        &self,
        id: &ProductId,
        amount: u32,
    ) -> Result<Option<Product>, RepositoryError> {
        let current = match self.by_id(id) {
            Some(p) if p.active => p,
            _ => return Ok(None),
        };

        self.update_fields(
            id,
            ProductPatch {
                stock: Some(current.stock.saturating_add(amount)),
                ..ProductPatch::default()
            },
        )
    }

    /// Aggregate catalog counters.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        let products = self.read_guard();
        let threshold = self.config.stock.low_stock_threshold;

        let total = products.len();
        let active = products.iter().filter(|p| p.active).count();
        let low_stock = products
            .iter()
            .filter(|p| p.active && p.stock < threshold)
            .count();
        let out_of_stock = products
            .iter()
            .filter(|p| p.active && p.stock == 0)
            .count();

        let mut categories: BTreeMap<Category, CategoryStats> = BTreeMap::new();
        for product in products.iter() {
            let entry = categories.entry(product.category).or_default();
            entry.total += 1;
            if product.active {
                entry.active += 1;
                entry.total_stock += u64::from(product.stock);
                entry.total_value += product.price.inventory_value(product.stock);
            }
        }

        CatalogStats {
            total,
            active,
            inactive: total - active,
            low_stock,
            out_of_stock,
            categories,
        }
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Vec<Product>> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Product>> {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The demo catalog persisted on first run.
///
/// Creation dates are staggered backwards from `now` so date sorting has
/// something to bite on. `p-016` is a low-stock probe and `p-017` is
/// inactive; both are referenced by tests and the stats view.
fn seed_catalog(now: DateTime<Utc>) -> Vec<Product> {
    struct Seed {
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: Category,
        price: rust_decimal::Decimal,
        stock: u32,
        active: bool,
        age_days: i64,
    }

    let seeds = [
        Seed {
            id: "p-001",
            name: "Tênis Run Fast",
            description: "Tênis leve para corrida com tecnologia de amortecimento avançada",
            category: Category::Calcados,
            price: dec!(299.90),
            stock: 120,
            active: true,
            age_days: 30,
        },
        Seed {
            id: "p-002",
            name: "Sapato Social Elegance",
            description: "Sapato social em couro legítimo para ocasiões especiais",
            category: Category::Calcados,
            price: dec!(450.00),
            stock: 45,
            active: true,
            age_days: 25,
        },
        Seed {
            id: "p-003",
            name: "Sandália Comfort",
            description: "Sandália confortável para o dia a dia",
            category: Category::Calcados,
            price: dec!(89.90),
            stock: 200,
            active: true,
            age_days: 20,
        },
        Seed {
            id: "p-004",
            name: "Camiseta Básica Premium",
            description: "Camiseta 100% algodão com corte moderno",
            category: Category::Roupas,
            price: dec!(49.90),
            stock: 300,
            active: true,
            age_days: 28,
        },
        Seed {
            id: "p-005",
            name: "Jaqueta Jeans Vintage",
            description: "Jaqueta jeans com lavagem vintage e detalhes únicos",
            category: Category::Roupas,
            price: dec!(199.90),
            stock: 75,
            active: true,
            age_days: 22,
        },
        Seed {
            id: "p-006",
            name: "Vestido Elegante",
            description: "Vestido elegante para ocasiões especiais",
            category: Category::Roupas,
            price: dec!(350.00),
            stock: 30,
            active: true,
            age_days: 15,
        },
        Seed {
            id: "p-007",
            name: "Bolsa de Couro Artesanal",
            description: "Bolsa de couro legítimo com acabamento artesanal",
            category: Category::Acessorios,
            price: dec!(280.00),
            stock: 50,
            active: true,
            age_days: 18,
        },
        Seed {
            id: "p-008",
            name: "Relógio Smart Fitness",
            description: "Relógio inteligente com monitoramento de saúde",
            category: Category::Acessorios,
            price: dec!(599.90),
            stock: 25,
            active: true,
            age_days: 12,
        },
        Seed {
            id: "p-009",
            name: "Smartphone Galaxy Pro",
            description: "Smartphone com câmera profissional e tela 4K",
            category: Category::Eletronicos,
            price: dec!(1299.90),
            stock: 15,
            active: true,
            age_days: 10,
        },
        Seed {
            id: "p-010",
            name: "Fone Bluetooth Premium",
            description: "Fone sem fio com cancelamento de ruído",
            category: Category::Eletronicos,
            price: dec!(399.90),
            stock: 80,
            active: true,
            age_days: 8,
        },
        Seed {
            id: "p-011",
            name: "Tablet Pro 12",
            description: "Tablet profissional com tela retina",
            category: Category::Eletronicos,
            price: dec!(899.90),
            stock: 20,
            active: true,
            age_days: 5,
        },
        Seed {
            id: "p-012",
            name: "Luminária LED Moderna",
            description: "Luminária LED com controle de intensidade",
            category: Category::Casa,
            price: dec!(159.90),
            stock: 60,
            active: true,
            age_days: 14,
        },
        Seed {
            id: "p-013",
            name: "Jogo de Pratos Premium",
            description: "Jogo de pratos em porcelana de alta qualidade",
            category: Category::Casa,
            price: dec!(89.90),
            stock: 100,
            active: true,
            age_days: 7,
        },
        Seed {
            id: "p-014",
            name: "Bola de Futebol Oficial",
            description: "Bola de futebol oficial para competições",
            category: Category::Esportes,
            price: dec!(79.90),
            stock: 150,
            active: true,
            age_days: 16,
        },
        Seed {
            id: "p-015",
            name: "Kit Academia Completo",
            description: "Kit completo para treinos em casa",
            category: Category::Esportes,
            price: dec!(299.90),
            stock: 40,
            active: true,
            age_days: 6,
        },
        Seed {
            id: "p-016",
            name: "Produto Esgotando",
            description: "Produto com estoque baixo para testes",
            category: Category::Calcados,
            price: dec!(199.90),
            stock: 5,
            active: true,
            age_days: 3,
        },
        Seed {
            id: "p-017",
            name: "Produto Inativo",
            description: "Produto descontinuado (não deve aparecer na listagem)",
            category: Category::Eletronicos,
            price: dec!(99.90),
            stock: 0,
            active: false,
            age_days: 40,
        },
    ];

    seeds
        .into_iter()
        .map(|seed| {
            let timestamp = now - Duration::days(seed.age_days);
            Product {
                id: ProductId::new(seed.id),
                name: seed.name.to_owned(),
                description: seed.description.to_owned(),
                category: seed.category,
                price: Price::new(seed.price).unwrap_or(Price::ZERO),
                stock: seed.stock,
                active: seed.active,
                image_key: image_key(seed.category).to_owned(),
                created_at: timestamp,
                updated_at: timestamp,
            }
        })
        .collect()
}
