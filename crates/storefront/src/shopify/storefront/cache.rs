//! Cache types for Storefront API responses.

use crate::shopify::types::{Collection, PriceFilter, Product};

/// Cache key for products and collections.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(String),
    Collections,
    Collection { handle: String, filter: PriceFilter },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Collections(Vec<Collection>),
    Collection(Box<Collection>),
}
