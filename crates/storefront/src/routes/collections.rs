//! Collection route handlers.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::shopify::types::{Collection, PriceFilter};
use crate::state::AppState;

/// Price filter query parameters. Values are decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFilterQuery {
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl PriceFilterQuery {
    /// Resolve the filter, falling back to the default bounds.
    fn resolve(&self) -> Result<PriceFilter> {
        let filter = PriceFilter {
            min: parse_bound(self.min_price.as_deref(), "minPrice")?
                .unwrap_or(PriceFilter::DEFAULT_MIN),
            max: parse_bound(self.max_price.as_deref(), "maxPrice")?
                .unwrap_or(PriceFilter::DEFAULT_MAX),
        };

        if filter.min > filter.max {
            return Err(AppError::BadRequest(
                "minPrice must not exceed maxPrice".to_string(),
            ));
        }
        Ok(filter)
    }
}

fn parse_bound(raw: Option<&str>, name: &str) -> Result<Option<Decimal>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    match Decimal::from_str(raw) {
        Ok(value) if !value.is_sign_negative() => Ok(Some(value)),
        _ => Err(AppError::BadRequest(format!(
            "{name} must be a non-negative number"
        ))),
    }
}

/// Featured collections with a few products each.
///
/// GET /api/collections
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Collection>>> {
    let collections = state.storefront().collections().await?;
    Ok(Json(collections))
}

/// One collection, products filtered by variant price.
///
/// GET /api/collections/{handle}?minPrice=&maxPrice=
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Query(query): Query<PriceFilterQuery>,
) -> Result<Json<Collection>> {
    let filter = query.resolve()?;
    let collection = state
        .storefront()
        .collection_by_handle(&handle, filter)
        .await?;
    Ok(Json(collection))
}
