//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::{InMemoryTicketRepository, TicketRepository};
use crate::shopify::{StorefrontApi, StorefrontClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The commerce backend and the ticket store
/// are trait objects so tests can substitute in-memory versions.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    storefront: Arc<dyn StorefrontApi>,
    tickets: Arc<dyn TicketRepository>,
}

impl AppState {
    /// Create application state from its collaborators.
    #[must_use]
    pub fn new(storefront: Arc<dyn StorefrontApi>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                storefront,
                tickets,
            }),
        }
    }

    /// State backed by the Shopify Storefront API and an in-memory ticket store.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(
            Arc::new(StorefrontClient::new(&config.shopify)),
            Arc::new(InMemoryTicketRepository::new()),
        )
    }

    /// The commerce backend.
    #[must_use]
    pub fn storefront(&self) -> &dyn StorefrontApi {
        self.inner.storefront.as_ref()
    }

    /// The support ticket store.
    #[must_use]
    pub fn tickets(&self) -> &dyn TicketRepository {
        self.inner.tickets.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
