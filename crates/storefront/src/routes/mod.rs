//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//!
//! # Cart (JSON contract shared with shopfront-cart-sync)
//! GET  /api/cart?cartId=<id>            - Read a cart
//! POST /api/cart                        - createCart | addToCart | updateCart | addLineItem
//!
//! # Catalog
//! GET  /api/products/{handle}           - Product with images and variants
//! GET  /api/collections                 - Featured collections
//! GET  /api/collections/{handle}        - Collection, ?minPrice=&maxPrice=
//!
//! # Support
//! POST /api/support/tickets             - File a ticket (form)
//! GET  /api/support/tickets             - List, ?q= or ?orderNumber=
//! GET  /api/support/tickets/{id}        - One ticket
//! POST /api/support/tickets/{id}/description - Replace description (form)
//! ```

pub mod cart;
pub mod collections;
pub mod products;
pub mod support;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{handle}", get(products::show))
        .route("/collections", get(collections::index))
        .route("/collections/{handle}", get(collections::show))
}

/// Create the support routes router.
pub fn support_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(support::index).post(support::create))
        .route("/tickets/{id}", get(support::show))
        .route(
            "/tickets/{id}/description",
            post(support::update_description),
        )
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(cart::show).post(cart::mutate))
        .nest("/api", catalog_routes())
        .nest("/api/support", support_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! In-memory `StorefrontApi` and request helpers for route tests.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use rust_decimal::Decimal;
    use serde_json::Value;
    use shopfront_core::{
        Cart, CartId, CartItem, CartLineInput, CartLineUpdate, CollectionId, LineId, Merchandise,
        MerchandiseId, Price, ProductId,
    };
    use tower::ServiceExt;

    use crate::db::InMemoryTicketRepository;
    use crate::shopify::{
        Collection, GraphQLError, PriceFilter, Product, ProductSummary, ProductVariant,
        ShopifyError, StorefrontApi,
    };
    use crate::state::AppState;

    /// How the fake answers cart calls.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CartBehavior {
        Ok,
        Missing,
        InvalidGlobalId,
        Down,
    }

    /// One recorded cart call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Fetch(CartId),
        Create(Vec<CartLineInput>),
        Add(CartId, Vec<CartLineInput>),
        Update(CartId, Vec<CartLineUpdate>),
        Collection(String, PriceFilter),
    }

    pub struct FakeStorefront {
        pub behavior: Mutex<CartBehavior>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeStorefront {
        pub fn new(behavior: CartBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior: Mutex::new(behavior),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: Call) -> Result<Cart, ShopifyError> {
            self.calls.lock().unwrap().push(call);
            match *self.behavior.lock().unwrap() {
                CartBehavior::Ok => Ok(sample_cart()),
                CartBehavior::Missing => {
                    Err(ShopifyError::NotFound("Cart not found: gid://cart/9".to_string()))
                }
                CartBehavior::InvalidGlobalId => Err(ShopifyError::GraphQL(vec![
                    GraphQLError::message("Variable $lines of type [CartLineUpdateInput!]! was provided invalid value for 0.id (Invalid global id)"),
                ])),
                CartBehavior::Down => Err(ShopifyError::GraphQL(vec![GraphQLError::message(
                    "HTTP 503 Service Unavailable: upstream connect error",
                )])),
            }
        }
    }

    #[async_trait]
    impl StorefrontApi for FakeStorefront {
        async fn fetch_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
            self.answer(Call::Fetch(cart_id.clone()))
        }

        async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
            self.answer(Call::Create(lines))
        }

        async fn add_cart_lines(
            &self,
            cart_id: &CartId,
            lines: Vec<CartLineInput>,
        ) -> Result<Cart, ShopifyError> {
            self.answer(Call::Add(cart_id.clone(), lines))
        }

        async fn update_cart_lines(
            &self,
            cart_id: &CartId,
            lines: Vec<CartLineUpdate>,
        ) -> Result<Cart, ShopifyError> {
            self.answer(Call::Update(cart_id.clone(), lines))
        }

        async fn product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
            if handle == "pineapple-tee" {
                Ok(sample_product())
            } else {
                Err(ShopifyError::NotFound(format!("Product not found: {handle}")))
            }
        }

        async fn collections(&self) -> Result<Vec<Collection>, ShopifyError> {
            Ok(vec![sample_collection()])
        }

        async fn collection_by_handle(
            &self,
            handle: &str,
            filter: PriceFilter,
        ) -> Result<Collection, ShopifyError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Collection(handle.to_string(), filter));
            if handle == "summer" {
                Ok(sample_collection())
            } else {
                Err(ShopifyError::NotFound(format!("Collection not found: {handle}")))
            }
        }
    }

    pub fn sample_cart() -> Cart {
        Cart {
            id: CartId::new("gid://cart/9"),
            checkout_url: "https://shop.example/c/9".to_string(),
            items: vec![CartItem {
                id: LineId::new("line1"),
                quantity: 2,
                merchandise: Merchandise {
                    id: MerchandiseId::new("gid://var/1"),
                    title: Some("Small".to_string()),
                    product_handle: Some("pineapple-tee".to_string()),
                    product_title: Some("Pineapple Tee".to_string()),
                    price_amount: Some(Decimal::new(2500, 2)),
                    currency_code: Some("USD".to_string()),
                },
            }],
        }
    }

    pub fn sample_product() -> Product {
        Product {
            id: ProductId::new("gid://shopify/Product/1"),
            handle: "pineapple-tee".to_string(),
            title: "Pineapple Tee".to_string(),
            description: "Soft cotton.".to_string(),
            min_price: Price::parse("25.00", "USD"),
            featured_image: None,
            images: vec![],
            variants: vec![ProductVariant {
                id: MerchandiseId::new("gid://var/1"),
                title: "Small".to_string(),
                price: Price::parse("25.00", "USD"),
                available_for_sale: true,
            }],
        }
    }

    pub fn sample_collection() -> Collection {
        Collection {
            id: CollectionId::new("gid://shopify/Collection/1"),
            handle: "summer".to_string(),
            title: "Summer".to_string(),
            description: String::new(),
            image: None,
            products: vec![ProductSummary {
                id: ProductId::new("gid://shopify/Product/1"),
                handle: "pineapple-tee".to_string(),
                title: "Pineapple Tee".to_string(),
                featured_image: None,
                default_variant_id: Some(MerchandiseId::new("gid://var/1")),
                price: Price::parse("25.00", "USD"),
            }],
        }
    }

    pub fn state_with(storefront: Arc<FakeStorefront>) -> AppState {
        AppState::new(storefront, Arc::new(InMemoryTicketRepository::new()))
    }

    pub fn form_body(pairs: &[(&str, &str)]) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    pub async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(state: AppState, uri: &str, pairs: &[(&str, &str)]) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_body(pairs)))
            .unwrap();
        send(state, request).await
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = crate::app(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}
