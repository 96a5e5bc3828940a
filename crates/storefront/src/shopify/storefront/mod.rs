//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` operation types with `reqwest` 0.13 for HTTP.
//! Caches products and collections using `moka` (5-minute TTL).

mod cache;
mod conversions;
pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphql_client::{GraphQLQuery, Response};
use moka::future::Cache;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{CART_NOT_FOUND, Cart, CartId, CartLineInput, CartLineUpdate};
use tracing::{debug, instrument};

use super::{GraphQLError, GraphQLErrorLocation, ShopifyError, StorefrontApi};
use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{Collection, PriceFilter, Product};

use cache::{CacheKey, CacheValue};
use conversions::{convert_cart, convert_collection, convert_product, convert_user_errors};
use queries::{
    AddCartLines, CartMutationPayload, CreateCart, UserError, GetCart, GetCollectionByHandle,
    GetCollections, GetProductByHandle, UpdateCartLines, add_cart_lines, create_cart, get_cart,
    get_collection_by_handle, get_collections, get_product_by_handle, update_cart_lines,
};

/// Input field Shopify names when the cart id itself resolves to nothing.
const CART_ID_FIELD: &str = "cartId";

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
///
/// Products and collections are cached for 5 minutes; carts never are.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    #[must_use]
    pub fn new(config: &ShopifyStorefrontConfig) -> Self {
        Self::with_endpoint(config.endpoint(), config.storefront_private_token.clone())
    }

    /// Create a client for an explicit GraphQL endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, access_token: SecretString) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(StorefrontClientInner {
                client: reqwest::Client::new(),
                endpoint: endpoint.into(),
                access_token,
                cache,
            }),
        }
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            // Private access tokens use a different header than public tokens
            .header(
                "Shopify-Storefront-Private-Token",
                self.inner.access_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                "HTTP {status}: {}",
                truncate(&response_text, 200)
            ))]));
        }

        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
                return Err(ShopifyError::Parse(e));
            }
        };

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.into_iter().map(convert_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %truncate(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")])
        })
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, handle: &str) {
        self.inner
            .cache
            .invalidate(&CacheKey::Product(handle.to_string()))
            .await;
    }
}

#[async_trait]
impl StorefrontApi for StorefrontClient {
    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn fetch_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let variables = get_cart::Variables {
            cart_id: cart_id.to_string(),
        };

        let data = self.execute::<GetCart>(variables).await?;

        data.cart
            .map(convert_cart)
            .ok_or_else(|| ShopifyError::NotFound(format!("{CART_NOT_FOUND}: {cart_id}")))
    }

    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let variables = create_cart::Variables {
            input: create_cart::CartInput {
                lines: lines.into_iter().map(line_input).collect(),
            },
        };

        let data = self.execute::<CreateCart>(variables).await?;
        settle_cart_mutation(data.cart_create, None, "create cart")
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let variables = add_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: lines.into_iter().map(line_input).collect(),
        };

        let data = self.execute::<AddCartLines>(variables).await?;
        settle_cart_mutation(data.cart_lines_add, Some(cart_id), "add to cart")
    }

    #[instrument(skip(self, lines), fields(cart_id = %cart_id, lines = lines.len()))]
    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, ShopifyError> {
        let variables = update_cart_lines::Variables {
            cart_id: cart_id.to_string(),
            lines: lines
                .into_iter()
                .map(|line| queries::CartLineUpdateInput {
                    id: line.id.into_inner(),
                    quantity: line.quantity,
                })
                .collect(),
        };

        let data = self.execute::<UpdateCartLines>(variables).await?;
        settle_cart_mutation(data.cart_lines_update, Some(cart_id), "update cart")
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    #[instrument(skip(self), fields(handle = %handle))]
    async fn product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        let cache_key = CacheKey::Product(handle.to_string());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let variables = get_product_by_handle::Variables {
            handle: handle.to_string(),
        };

        let data = self.execute::<GetProductByHandle>(variables).await?;

        let product = data
            .product
            .map(convert_product)
            .ok_or_else(|| ShopifyError::NotFound(format!("Product not found: {handle}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    #[instrument(skip(self))]
    async fn collections(&self) -> Result<Vec<Collection>, ShopifyError> {
        if let Some(CacheValue::Collections(collections)) =
            self.inner.cache.get(&CacheKey::Collections).await
        {
            debug!("Cache hit for collections");
            return Ok(collections);
        }

        let data = self
            .execute::<GetCollections>(get_collections::Variables {})
            .await?;

        let collections: Vec<Collection> =
            data.collections.into_nodes().map(convert_collection).collect();

        self.inner
            .cache
            .insert(
                CacheKey::Collections,
                CacheValue::Collections(collections.clone()),
            )
            .await;

        Ok(collections)
    }

    #[instrument(skip(self), fields(handle = %handle, min = %filter.min, max = %filter.max))]
    async fn collection_by_handle(
        &self,
        handle: &str,
        filter: PriceFilter,
    ) -> Result<Collection, ShopifyError> {
        let cache_key = CacheKey::Collection {
            handle: handle.to_string(),
            filter,
        };

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let variables = get_collection_by_handle::Variables {
            handle: handle.to_string(),
            min_price: decimal_to_f64(filter.min),
            max_price: decimal_to_f64(filter.max),
        };

        let data = self.execute::<GetCollectionByHandle>(variables).await?;

        let collection = data
            .collection
            .map(convert_collection)
            .ok_or_else(|| ShopifyError::NotFound(format!("Collection not found: {handle}")))?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn line_input(line: CartLineInput) -> queries::CartLineInput {
    queries::CartLineInput {
        merchandise_id: line.merchandise_id.into_inner(),
        quantity: line.quantity,
    }
}

/// Unwrap a cart mutation payload.
///
/// A missing cart on an existing-cart mutation, or a user error on the
/// `cartId` field, becomes `NotFound` so callers can evict the id. User
/// errors on lines or merchandise stay `UserError`; the cart is still valid.
fn settle_cart_mutation(
    payload: Option<CartMutationPayload>,
    cart_id: Option<&CartId>,
    what: &str,
) -> Result<Cart, ShopifyError> {
    let Some(payload) = payload else {
        return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
            "Failed to {what}"
        ))]));
    };

    if !payload.user_errors.is_empty() {
        let cart_missing = cart_id.is_some() && payload.user_errors.iter().any(names_cart_id);
        let message = convert_user_errors(payload.user_errors);
        if cart_missing {
            return Err(ShopifyError::NotFound(format!("{CART_NOT_FOUND}: {message}")));
        }
        return Err(ShopifyError::UserError(message));
    }

    match (payload.cart, cart_id) {
        (Some(cart), _) => Ok(convert_cart(cart)),
        (None, Some(cart_id)) => Err(ShopifyError::NotFound(format!(
            "{CART_NOT_FOUND}: {cart_id}"
        ))),
        (None, None) => Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
            "Failed to {what}"
        ))])),
    }
}

fn names_cart_id(error: &UserError) -> bool {
    matches!(error.field.as_deref(), Some([field]) if field == CART_ID_FIELD)
}

fn convert_graphql_error(e: graphql_client::Error) -> GraphQLError {
    GraphQLError {
        message: e.message,
        locations: e.locations.map_or_else(Vec::new, |locs| {
            locs.into_iter()
                .map(|l| GraphQLErrorLocation {
                    line: i64::from(l.line),
                    column: i64::from(l.column),
                })
                .collect()
        }),
        path: e.path.map_or_else(Vec::new, |p| {
            p.into_iter()
                .map(|fragment| match fragment {
                    graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                    graphql_client::PathFragment::Index(i) => serde_json::Value::Number(i.into()),
                })
                .collect()
        }),
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
