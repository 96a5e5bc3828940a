//! Integration test support for Shopfront.
//!
//! Runs the real storefront router on a loopback port in front of an
//! in-memory commerce backend, so `shopfront-cart-sync` can be driven over
//! actual HTTP.
//!
//! - [`InMemoryShop`]: a `StorefrontApi` that keeps carts in memory
//! - [`spawn_storefront`]: serve the storefront app and return its address

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shopfront_core::{
    Cart, CartId, CartItem, CartLineInput, CartLineUpdate, LineId, Merchandise, MerchandiseId,
};
use shopfront_storefront::db::InMemoryTicketRepository;
use shopfront_storefront::shopify::{
    Collection, GraphQLError, PriceFilter, Product, ShopifyError, StorefrontApi,
};
use shopfront_storefront::state::AppState;
use url::Url;

/// A cart call the shop received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopCall {
    Fetch(CartId),
    Create(Vec<CartLineInput>),
    Add(CartId, Vec<CartLineInput>),
    Update(CartId, Vec<CartLineUpdate>),
}

#[derive(Default)]
struct ShopState {
    carts: HashMap<CartId, Cart>,
    next_cart: u64,
    next_line: u64,
    discontinued: HashSet<MerchandiseId>,
    calls: Vec<ShopCall>,
}

/// Commerce backend holding carts in memory.
///
/// Cart IDs are `gid://cart/<n>` and line IDs `line<n>`, both counting up.
/// Adding merchandise already in the cart merges into its line; updating a
/// line to zero removes it. Unknown line IDs fail the way Shopify rejects a
/// malformed global ID; discontinued merchandise fails as a user error.
pub struct InMemoryShop {
    state: Mutex<ShopState>,
}

impl InMemoryShop {
    /// A shop whose first created cart is `gid://cart/<first_cart>`.
    #[must_use]
    pub fn new(first_cart: u64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ShopState {
                next_cart: first_cart,
                next_line: 1,
                ..ShopState::default()
            }),
        })
    }

    /// Store `cart` as if a shopper had built it earlier.
    pub fn seed(&self, cart: Cart) {
        let mut state = self.state.lock().unwrap();
        state.next_line += cart.items.len() as u64;
        state.carts.insert(cart.id.clone(), cart);
    }

    /// Make later adds of `merchandise_id` fail.
    pub fn discontinue(&self, merchandise_id: &MerchandiseId) {
        self.state
            .lock()
            .unwrap()
            .discontinued
            .insert(merchandise_id.clone());
    }

    /// Drop a cart, as Shopify does once it expires or checks out.
    pub fn expire(&self, cart_id: &CartId) {
        self.state.lock().unwrap().carts.remove(cart_id);
    }

    /// Current server-side state of a cart.
    #[must_use]
    pub fn cart(&self, cart_id: &CartId) -> Option<Cart> {
        self.state.lock().unwrap().carts.get(cart_id).cloned()
    }

    /// Cart calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<ShopCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn missing(cart_id: &CartId) -> ShopifyError {
        ShopifyError::NotFound(format!("Cart not found: {cart_id}"))
    }
}

impl ShopState {
    fn push_line(&mut self, cart_id: &CartId, line: &CartLineInput) -> Result<(), ShopifyError> {
        if self.discontinued.contains(&line.merchandise_id) {
            return Err(ShopifyError::UserError(format!(
                "The merchandise with id {} does not exist. (lines.0.merchandiseId)",
                line.merchandise_id
            )));
        }

        let id = LineId::new(format!("line{}", self.next_line));
        let cart = self
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| InMemoryShop::missing(cart_id))?;

        if let Some(item) = cart
            .items
            .iter_mut()
            .find(|item| item.merchandise.id == line.merchandise_id)
        {
            item.quantity += line.quantity;
            return Ok(());
        }

        cart.items.push(CartItem {
            id,
            quantity: line.quantity,
            merchandise: merchandise(&line.merchandise_id),
        });
        self.next_line += 1;
        Ok(())
    }
}

/// Merchandise as the shop describes it in cart lines.
#[must_use]
pub fn merchandise(id: &MerchandiseId) -> Merchandise {
    Merchandise {
        id: id.clone(),
        title: Some("Default Title".to_string()),
        product_handle: Some("pineapple-tee".to_string()),
        product_title: Some("Pineapple Tee".to_string()),
        price_amount: Some(rust_decimal::Decimal::new(2500, 2)),
        currency_code: Some("USD".to_string()),
    }
}

#[async_trait]
impl StorefrontApi for InMemoryShop {
    async fn fetch_cart(&self, cart_id: &CartId) -> Result<Cart, ShopifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShopCall::Fetch(cart_id.clone()));
        state
            .carts
            .get(cart_id)
            .cloned()
            .ok_or_else(|| Self::missing(cart_id))
    }

    async fn create_cart(&self, lines: Vec<CartLineInput>) -> Result<Cart, ShopifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShopCall::Create(lines.clone()));

        let id = CartId::new(format!("gid://cart/{}", state.next_cart));
        state.next_cart += 1;
        let checkout_url = format!("https://shop.example/checkout/{}", state.next_cart - 1);
        state.carts.insert(
            id.clone(),
            Cart {
                id: id.clone(),
                checkout_url,
                items: Vec::new(),
            },
        );
        for line in &lines {
            state.push_line(&id, line)?;
        }
        Ok(state.carts[&id].clone())
    }

    async fn add_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineInput>,
    ) -> Result<Cart, ShopifyError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ShopCall::Add(cart_id.clone(), lines.clone()));
        for line in &lines {
            state.push_line(cart_id, line)?;
        }
        state
            .carts
            .get(cart_id)
            .cloned()
            .ok_or_else(|| Self::missing(cart_id))
    }

    async fn update_cart_lines(
        &self,
        cart_id: &CartId,
        lines: Vec<CartLineUpdate>,
    ) -> Result<Cart, ShopifyError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(ShopCall::Update(cart_id.clone(), lines.clone()));
        let cart = state
            .carts
            .get_mut(cart_id)
            .ok_or_else(|| Self::missing(cart_id))?;

        for line in &lines {
            let Some(pos) = cart.items.iter().position(|item| item.id == line.id) else {
                return Err(ShopifyError::GraphQL(vec![GraphQLError::message(format!(
                    "Variable $lines was provided invalid value for 0.id (Invalid global id) {}",
                    line.id
                ))]));
            };
            if line.quantity == 0 {
                cart.items.remove(pos);
            } else {
                cart.items[pos].quantity = line.quantity;
            }
        }
        Ok(cart.clone())
    }

    async fn product_by_handle(&self, handle: &str) -> Result<Product, ShopifyError> {
        Err(ShopifyError::NotFound(format!("Product not found: {handle}")))
    }

    async fn collections(&self) -> Result<Vec<Collection>, ShopifyError> {
        Ok(Vec::new())
    }

    async fn collection_by_handle(
        &self,
        handle: &str,
        _filter: PriceFilter,
    ) -> Result<Collection, ShopifyError> {
        Err(ShopifyError::NotFound(format!(
            "Collection not found: {handle}"
        )))
    }
}

/// A storefront server running on a loopback port.
pub struct TestStorefront {
    pub addr: SocketAddr,
    pub shop: Arc<InMemoryShop>,
}

impl TestStorefront {
    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    /// The `/api/cart` endpoint.
    #[must_use]
    pub fn cart_endpoint(&self) -> Url {
        self.url("/api/cart")
    }
}

/// Serve the storefront app over `shop` on `127.0.0.1:0`.
pub async fn spawn_storefront(shop: Arc<InMemoryShop>) -> TestStorefront {
    let state = AppState::new(shop.clone(), Arc::new(InMemoryTicketRepository::new()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, shopfront_storefront::app(state))
            .await
            .unwrap();
    });

    TestStorefront { addr, shop }
}
