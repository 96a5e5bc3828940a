//! Cart API route handlers.
//!
//! `/api/cart` is the only cart surface. Every response, success or failure,
//! is a [`CartPayload`]: `{"cart": <Cart|null>, "error"?: "..."}`. Cart ids
//! live on the client (see `shopfront-cart-sync`); the server is stateless.

use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shopfront_core::{
    CART_NOT_FOUND, Cart, CartAction, CartId, CartLineInput, CartLineUpdate, CartPayload,
    INVALID_GLOBAL_ID, MerchandiseId,
};
use thiserror::Error;
use tracing::instrument;

use crate::shopify::ShopifyError;
use crate::state::AppState;

const INVALID_LINE_MESSAGE: &str =
    "Invalid cart line ID. The item may have been removed or the cart was modified elsewhere.";

// =============================================================================
// Request Types
// =============================================================================

/// `GET /api/cart` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    pub cart_id: Option<String>,
}

/// `POST /api/cart` form. Which fields are required depends on `action`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartForm {
    pub action: Option<String>,
    pub cart_id: Option<String>,
    pub merchandise_id: Option<String>,
    pub quantity: Option<String>,
    /// JSON-encoded line array.
    pub lines: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Failure of a cart request, rendered as `{"cart": null, "error": ...}`.
#[derive(Debug, Error)]
pub enum CartRouteError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(&'static str),

    /// The referenced cart no longer exists.
    #[error("Cart not found: {0}")]
    CartNotFound(#[source] ShopifyError),

    /// A line id Shopify could not resolve.
    #[error("Invalid cart line: {0}")]
    InvalidLine(#[source] ShopifyError),

    /// Any other upstream failure.
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: ShopifyError,
    },
}

impl CartRouteError {
    /// Classify a failed mutation.
    fn from_mutation(err: ShopifyError, failure: &'static str, line_ids: bool) -> Self {
        if matches!(err, ShopifyError::NotFound(_)) {
            Self::CartNotFound(err)
        } else if line_ids && err.mentions(INVALID_GLOBAL_ID) {
            Self::InvalidLine(err)
        } else {
            Self::Upstream {
                message: failure,
                source: err,
            }
        }
    }
}

impl IntoResponse for CartRouteError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, *message),
            Self::CartNotFound(_) => (StatusCode::NOT_FOUND, CART_NOT_FOUND),
            Self::InvalidLine(_) => (StatusCode::BAD_REQUEST, INVALID_LINE_MESSAGE),
            Self::Upstream { message, .. } => (StatusCode::INTERNAL_SERVER_ERROR, *message),
        };

        match &self {
            Self::Upstream { .. } => crate::error::capture(&self),
            Self::CartNotFound(_) | Self::InvalidLine(_) => {
                tracing::warn!(error = %self, "Stale cart reference");
            }
            Self::BadRequest(_) => {}
        }

        (status, Json(CartPayload::failure(message))).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Read a cart.
///
/// GET /api/cart?cartId=<id>
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartPayload>, CartRouteError> {
    let Some(cart_id) = present(query.cart_id) else {
        return Ok(Json(CartPayload::empty()));
    };

    let cart = state
        .storefront()
        .fetch_cart(&CartId::new(cart_id))
        .await
        .map_err(|err| {
            // A malformed id can never resolve, so it is as gone as a deleted cart.
            if matches!(err, ShopifyError::NotFound(_)) || err.mentions(INVALID_GLOBAL_ID) {
                CartRouteError::CartNotFound(err)
            } else {
                CartRouteError::Upstream {
                    message: "Failed to fetch cart",
                    source: err,
                }
            }
        })?;

    Ok(Json(CartPayload::success(cart)))
}

/// Apply a cart action.
///
/// POST /api/cart
#[instrument(skip(state, form), fields(action = form.action.as_deref().unwrap_or("")))]
pub async fn mutate(
    State(state): State<AppState>,
    Form(form): Form<CartForm>,
) -> Result<Json<CartPayload>, CartRouteError> {
    let action = present(form.action.clone())
        .and_then(|a| a.parse::<CartAction>().ok())
        .ok_or(CartRouteError::BadRequest("Invalid action"))?;

    let cart = match action {
        CartAction::CreateCart => create_cart(&state, form).await?,
        CartAction::AddToCart => add_to_cart(&state, form).await?,
        CartAction::UpdateCart => update_cart(&state, form).await?,
        CartAction::AddLineItem => add_line_item(&state, form).await?,
    };

    Ok(Json(CartPayload::success(cart)))
}

async fn create_cart(state: &AppState, form: CartForm) -> Result<Cart, CartRouteError> {
    let raw = present(form.lines).ok_or(CartRouteError::BadRequest("Lines data is required"))?;
    let lines: Vec<CartLineInput> = parse_lines(&raw)?;

    state
        .storefront()
        .create_cart(lines)
        .await
        .map_err(|source| CartRouteError::Upstream {
            message: "Failed to create cart",
            source,
        })
}

async fn add_to_cart(state: &AppState, form: CartForm) -> Result<Cart, CartRouteError> {
    let (Some(cart_id), Some(merchandise_id)) =
        (present(form.cart_id), present(form.merchandise_id))
    else {
        return Err(CartRouteError::BadRequest(
            "Cart ID and merchandise ID are required",
        ));
    };

    let line = CartLineInput {
        merchandise_id: MerchandiseId::new(merchandise_id),
        quantity: parse_quantity(form.quantity.as_deref()),
    };

    state
        .storefront()
        .add_cart_lines(&CartId::new(cart_id), vec![line])
        .await
        .map_err(|err| CartRouteError::from_mutation(err, "Failed to add item to cart", false))
}

async fn update_cart(state: &AppState, form: CartForm) -> Result<Cart, CartRouteError> {
    let (cart_id, raw) = cart_id_and_lines(form)?;
    let lines: Vec<CartLineUpdate> = parse_lines(&raw)?;

    state
        .storefront()
        .update_cart_lines(&cart_id, lines)
        .await
        .map_err(|err| CartRouteError::from_mutation(err, "Failed to update cart", true))
}

async fn add_line_item(state: &AppState, form: CartForm) -> Result<Cart, CartRouteError> {
    let (cart_id, raw) = cart_id_and_lines(form)?;
    let lines: Vec<CartLineInput> = parse_lines(&raw)?;

    state
        .storefront()
        .add_cart_lines(&cart_id, lines)
        .await
        .map_err(|err| CartRouteError::from_mutation(err, "Failed to update cart", true))
}

// =============================================================================
// Helpers
// =============================================================================

/// Treat empty form values as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn cart_id_and_lines(form: CartForm) -> Result<(CartId, String), CartRouteError> {
    match (present(form.cart_id), present(form.lines)) {
        (Some(cart_id), Some(lines)) => Ok((CartId::new(cart_id), lines)),
        _ => Err(CartRouteError::BadRequest("Cart ID and lines are required")),
    }
}

fn parse_lines<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, CartRouteError> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::debug!(error = %e, "Rejected lines payload");
        CartRouteError::BadRequest("Invalid lines data")
    })
}

/// Quantity for `addToCart`; missing, unparseable or zero means 1.
fn parse_quantity(raw: Option<&str>) -> u32 {
    raw.and_then(|q| q.trim().parse::<u32>().ok())
        .filter(|q| *q > 0)
        .unwrap_or(1)
}
