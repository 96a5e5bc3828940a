//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction) - added in `main`
//! 2. `TraceLayer` (request span via [`make_request_span`])
//! 3. Request ID (record on span, tag Sentry scope, echo header)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, make_request_span, request_id_middleware};
