//! Shopify Storefront API access.
//!
//! # Architecture
//!
//! - Operations implement `graphql_client::GraphQLQuery` over static query
//!   documents; HTTP goes through `reqwest` directly
//! - Shopify is source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for product and collection reads (5 minute TTL)
//! - Route handlers depend on the [`StorefrontApi`] trait, not the client, so
//!   they can be exercised against an in-memory backend
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::shopify::{StorefrontApi, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify);
//!
//! let product = client.product_by_handle("pineapple-tee").await?;
//! let cart = client
//!     .create_cart(vec![CartLineInput {
//!         merchandise_id: product.default_variant_id().cloned().unwrap(),
//!         quantity: 1,
//!     }])
//!     .await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use types::*;

use std::fmt;

use async_trait::async_trait;
use shopfront_core::{Cart, CartId, CartLineInput, CartLineUpdate};
use thiserror::Error;

/// Failures talking to the Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Top-level `errors` in a GraphQL response, or a non-success status.
    #[error("GraphQL errors: {}", GraphQLErrors(.0))]
    GraphQL(Vec<GraphQLError>),

    #[error("Response body did not parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cart, product, or collection does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 429; seconds from `Retry-After`.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// `userErrors` from a cart mutation.
    #[error("User error: {0}")]
    UserError(String),
}

impl ShopifyError {
    /// Whether any error message mentions `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        match self {
            Self::GraphQL(errors) => errors.iter().any(|e| e.message.contains(needle)),
            Self::UserError(message) | Self::NotFound(message) => message.contains(needle),
            _ => false,
        }
    }
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    pub locations: Vec<GraphQLErrorLocation>,
    /// Response path, e.g. `["cartLinesUpdate", "cart"]`.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// 1-indexed position in the query document.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    pub line: i64,
    pub column: i64,
}

impl fmt::Display for GraphQLError {
    /// `message path: a.b.0 at line L:C`, omitting absent parts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        if !self.message.is_empty() {
            f.write_str(&self.message)?;
            sep = " ";
        }
        if !self.path.is_empty() {
            let segments: Vec<String> = self
                .path
                .iter()
                .map(|segment| {
                    segment
                        .as_str()
                        .map_or_else(|| segment.to_string(), str::to_string)
                })
                .collect();
            write!(f, "{sep}path: {}", segments.join("."))?;
            sep = " ";
        }
        if let Some(at) = self.locations.first() {
            write!(f, "{sep}at line {}:{}", at.line, at.column)?;
            sep = " ";
        }
        if sep.is_empty() {
            f.write_str("(no details)")?;
        }
        Ok(())
    }
}

/// `; `-separated display of an error list.
struct GraphQLErrors<'a>(&'a [GraphQLError]);

impl fmt::Display for GraphQLErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.0.split_first() else {
            return f.write_str("(no error details provided)");
        };
        write!(f, "{first}")?;
        for error in rest {
            write!(f, "; {error}")?;
        }
        Ok(())
    }
}

// =============================================================================
// StorefrontApi
// =============================================================================

/// The commerce operations the storefront's handlers depend on.
///
/// Cart mutations return the complete cart after the change. A cart that no
/// longer exists is reported as [`ShopifyError::NotFound`].
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// Read a cart.
    async fn fetch_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError>;

    /// Create a cart holding `lines`.
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError>;

    /// Add `lines` to a cart.
    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError>;

    /// Set absolute quantities on existing lines; zero removes a line.
    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, ShopifyError>;

    /// A product with its images and variants.
    async fn product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError>;

    /// The storefront's featured collections with a few products each.
    async fn collections(&self) -> Result<Vec<Collection>, ShopifyError>;

    /// A collection with its products filtered by variant price.
    async fn collection_by_handle(
        &self,
        handle: &str,
        filter: PriceFilter,
    ) -> Result<Collection, ShopifyError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_graphql_errors_joined() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError::message("Field 'cart' doesn't exist"),
            GraphQLError::message("Invalid global id"),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field 'cart' doesn't exist; Invalid global id"
        );
        assert_eq!(
            ShopifyError::GraphQL(vec![]).to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_graphql_error_with_path_and_location() {
        let error = GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 3, column: 7 }],
            path: vec![json!("cartLinesAdd"), json!("cart"), json!(0)],
        };
        assert_eq!(error.to_string(), "path: cartLinesAdd.cart.0 at line 3:7");

        let bare = GraphQLError::message("");
        assert_eq!(bare.to_string(), "(no details)");
    }

    #[test]
    fn test_mentions_searches_messages() {
        let err = ShopifyError::GraphQL(vec![GraphQLError::message(
            "Variable $cartId of type ID! was provided invalid value: Invalid global id",
        )]);
        assert!(err.mentions("Invalid global id"));
        let missing = ShopifyError::NotFound("Cart not found: gid://cart/1".into());
        assert!(missing.mentions("Cart not found"));
        assert!(!ShopifyError::RateLimited(3).mentions("Invalid global id"));
    }
}
