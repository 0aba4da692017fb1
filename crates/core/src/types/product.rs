//! Product references as the cart sees them.
//!
//! The session layer never loads full catalog entries; it only needs enough
//! of a product to add it to a cart and to find it again among the cart's
//! line items.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, Sku};
use super::money::Money;

/// What kind of product a SKU refers to, and therefore which add-to-cart
/// mutation applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// A plain product added by its own SKU.
    Simple,
    /// A parent product added through one of its variants. Holds the SKU of
    /// the chosen variant; the parent SKU lives on the product itself.
    Configurable {
        /// SKU of the selected variant.
        variant_sku: Sku,
    },
    /// Grouped products cannot be added as a single line.
    Grouped,
    /// Bundle products require option selection the cart does not model.
    Bundle,
    /// Virtual products (no shipping).
    Virtual,
    /// Downloadable products.
    Downloadable,
}

impl ProductKind {
    /// Resolve a backend `type_id` string. For configurables the line's SKU
    /// is the chosen variant, so it becomes the `variant_sku`.
    #[must_use]
    pub fn from_type_id(type_id: &str, line_sku: &Sku) -> Option<Self> {
        match type_id {
            "simple" => Some(Self::Simple),
            "configurable" => Some(Self::Configurable {
                variant_sku: line_sku.clone(),
            }),
            "grouped" => Some(Self::Grouped),
            "bundle" => Some(Self::Bundle),
            "virtual" => Some(Self::Virtual),
            "downloadable" => Some(Self::Downloadable),
            _ => None,
        }
    }

    /// The backend's `type_id` string for this kind.
    #[must_use]
    pub const fn type_id(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Configurable { .. } => "configurable",
            Self::Grouped => "grouped",
            Self::Bundle => "bundle",
            Self::Virtual => "virtual",
            Self::Downloadable => "downloadable",
        }
    }
}

/// A product as selected for a cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Numeric catalog id. Line items are matched against this.
    pub id: ProductId,
    /// The product's SKU (the parent SKU for configurables).
    pub sku: Sku,
    /// Display name.
    pub name: String,
    /// Kind, deciding which add-to-cart mutation applies.
    pub kind: ProductKind,
    /// Unit price, when known at selection time.
    pub price: Option<Money>,
}

impl Product {
    /// Create a simple product reference.
    #[must_use]
    pub fn simple(id: ProductId, sku: Sku, name: impl Into<String>) -> Self {
        Self {
            id,
            sku,
            name: name.into(),
            kind: ProductKind::Simple,
            price: None,
        }
    }

    /// Create a configurable product reference with a chosen variant.
    #[must_use]
    pub fn configurable(
        id: ProductId,
        parent_sku: Sku,
        variant_sku: Sku,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            sku: parent_sku,
            name: name.into(),
            kind: ProductKind::Configurable { variant_sku },
            price: None,
        }
    }
}
