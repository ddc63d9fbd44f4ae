//! Product, category and variant records.
//!
//! # Invariants
//! - `Product::code` is unique across the catalog.
//! - Variants keep storage order (ascending id).
//! - Stored variant prices are never rewritten by the read path.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Surrogate identity of a product row. Monotonic, used for list ordering.
pub type ProductId = i64;
/// Surrogate identity of a category row.
pub type CategoryId = i64;
/// Surrogate identity of a variant row.
pub type VariantId = i64;

/// Category attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Owning product.
    pub product_id: ProductId,
    /// Globally unique opaque code.
    pub code: Uuid,
    /// Display name, matched exactly by the category filter.
    pub name: String,
}

/// Purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    /// Zero means the variant inherits its product price.
    pub price: Decimal,
}

impl Variant {
    /// Returns whether this variant carries its own price.
    pub fn has_own_price(&self) -> bool {
        !self.price.is_zero()
    }
}

/// Catalog product with its eagerly loaded relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub price: Decimal,
    /// `None` only when storage has no category row for this product.
    pub category: Option<Category>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Returns a presentation copy where every variant without its own price
    /// shows the product price instead.
    ///
    /// Variants with a non-zero price are returned unchanged.
    pub fn with_inherited_variant_prices(mut self) -> Self {
        let product_price = self.price;
        for variant in &mut self.variants {
            if !variant.has_own_price() {
                variant.price = product_price;
            }
        }
        self
    }
}
