//! Persistence for storefront-local data.
//!
//! Shopify is the source of truth for products, collections and carts; the
//! only data the storefront owns is support tickets.
//!
//! # Repositories
//!
//! - [`TicketRepository`] - support tickets, injected into `AppState` as a
//!   trait object. [`InMemoryTicketRepository`] is the default backing.

pub mod tickets;

pub use tickets::{InMemoryTicketRepository, TicketRepository};

use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate id).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),
}
