//! Domain types for Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw GraphQL
//! response shapes in `storefront::queries`. Cart types live in
//! `shopfront_core` because the cart client shares them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{CollectionId, MerchandiseId, Price, ProductId};

// =============================================================================
// Image Types
// =============================================================================

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

// =============================================================================
// Product Types
// =============================================================================

/// A purchasable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant ID (the cart's merchandise ID).
    pub id: MerchandiseId,
    /// Variant title ("Default Title" for single-variant products).
    pub title: String,
    /// Unit price.
    pub price: Option<Price>,
    /// Whether the variant can currently be bought.
    pub available_for_sale: bool,
}

/// A product with its images and variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Shopify product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain-text description.
    pub description: String,
    /// Lowest variant price.
    pub min_price: Option<Price>,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// Product images, in display order.
    pub images: Vec<Image>,
    /// Variants, in display order.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// The variant added to the cart when the shopper doesn't pick one.
    #[must_use]
    pub fn default_variant_id(&self) -> Option<&MerchandiseId> {
        self.variants.first().map(|v| &v.id)
    }
}

/// Product as listed inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Shopify product ID.
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Featured image.
    pub featured_image: Option<Image>,
    /// First variant, used for quick add-to-cart.
    pub default_variant_id: Option<MerchandiseId>,
    /// First variant's price.
    pub price: Option<Price>,
}

// =============================================================================
// Collection Types
// =============================================================================

/// A collection of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Shopify collection ID.
    pub id: CollectionId,
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Plain-text description.
    pub description: String,
    /// Collection image URL.
    pub image: Option<String>,
    /// Products in the collection.
    pub products: Vec<ProductSummary>,
}

/// Variant price bounds for a collection's product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceFilter {
    /// Inclusive lower bound.
    pub min: Decimal,
    /// Inclusive upper bound.
    pub max: Decimal,
}

impl PriceFilter {
    /// Bounds used when the shopper sets none.
    pub const DEFAULT_MIN: Decimal = Decimal::ZERO;
    pub const DEFAULT_MAX: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

    /// Whether `price` falls within the bounds.
    #[must_use]
    pub fn contains(&self, price: &Price) -> bool {
        price.amount >= self.min && price.amount <= self.max
    }
}

impl Default for PriceFilter {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}
