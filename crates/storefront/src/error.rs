//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. JSON route handlers return `Result<T, AppError>`;
//! the cart endpoint has its own error type in `routes::cart` because its
//! body shape is fixed by the cart API contract.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::TicketError;
use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Ticket input failed validation.
    #[error(transparent)]
    Ticket(#[from] TicketError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Repository(RepositoryError::NotFound) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(ShopifyError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Shopify(ShopifyError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::Ticket(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            capture(&self);
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Shopify(ShopifyError::NotFound(message)) | Self::NotFound(message) => {
                message.clone()
            }
            Self::Shopify(ShopifyError::RateLimited(_)) => {
                "Too many requests, please retry shortly".to_string()
            }
            Self::Shopify(_) => "External service error".to_string(),
            Self::Ticket(err) => err.to_string(),
            Self::BadRequest(message) => message.clone(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Send an error to Sentry and log it with the event id.
pub fn capture(err: &(dyn std::error::Error + 'static)) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        sentry_event_id = %event_id,
        "Request error"
    );
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
