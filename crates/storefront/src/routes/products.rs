//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::error::Result;
use crate::shopify::types::Product;
use crate::state::AppState;

/// Product detail with images and variants.
///
/// GET /api/products/{handle}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Product>> {
    let product = state.storefront().product_by_handle(&handle).await?;
    Ok(Json(product))
}
