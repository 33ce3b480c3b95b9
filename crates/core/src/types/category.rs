//! Product categories.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Category`] from a string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid category: {0}")]
pub struct CategoryError(pub String);

/// Product category.
///
/// The set is fixed by store configuration; display metadata (label,
/// icon) lives in the store config, keyed by this enum. Serialized
/// values match the persisted catalog handles (`calcados`, `roupas`...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Footwear.
    Calcados,
    /// Clothing.
    Roupas,
    /// Accessories.
    Acessorios,
    /// Electronics.
    Eletronicos,
    /// Home and decoration.
    Casa,
    /// Sports.
    Esportes,
}

impl Category {
    /// The persisted handle for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calcados => "calcados",
            Self::Roupas => "roupas",
            Self::Acessorios => "acessorios",
            Self::Eletronicos => "eletronicos",
            Self::Casa => "casa",
            Self::Esportes => "esportes",
        }
    }

    /// All categories, in display order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Calcados,
            Self::Roupas,
            Self::Acessorios,
            Self::Eletronicos,
            Self::Casa,
            Self::Esportes,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
