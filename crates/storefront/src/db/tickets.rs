//! Support ticket repository.
//!
//! Handlers hold an `Arc<dyn TicketRepository>`; the id counter belongs to
//! the backing store, so two stores never share a sequence.

use async_trait::async_trait;
use chrono::Utc;
use shopfront_core::TicketId;
use tokio::sync::RwLock;
use tracing::instrument;

use super::RepositoryError;
use crate::models::ticket::{NewTicket, Ticket};

/// Storage for support tickets.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Store a ticket and assign its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the ticket cannot be stored.
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError>;

    /// Get a ticket by id.
    async fn get_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, RepositoryError>;

    /// Tickets whose subject or description contains `query`, ignoring case.
    async fn search(&self, query: &str) -> Result<Vec<Ticket>, RepositoryError>;

    /// Tickets filed against `order_number` (exact match).
    async fn list_by_order(&self, order_number: &str) -> Result<Vec<Ticket>, RepositoryError>;

    /// All tickets, oldest first.
    async fn list_all(&self) -> Result<Vec<Ticket>, RepositoryError>;

    /// Replace a ticket's description. The caller validates it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket doesn't exist.
    async fn update_description(
        &self,
        id: &TicketId,
        description: &str,
    ) -> Result<Ticket, RepositoryError>;
}

/// Process-local ticket store. Ids run `TICKET-1`, `TICKET-2`, ...
#[derive(Debug, Default)]
pub struct InMemoryTicketRepository {
    inner: RwLock<TicketStore>,
}

#[derive(Debug, Default)]
struct TicketStore {
    last_id: u64,
    tickets: Vec<Ticket>,
}

impl InMemoryTicketRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, keep: impl Fn(&Ticket) -> bool + Send) -> Vec<Ticket> {
        self.inner
            .read()
            .await
            .tickets
            .iter()
            .filter(|t| keep(t))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    #[instrument(skip(self, ticket))]
    async fn create(&self, ticket: NewTicket) -> Result<Ticket, RepositoryError> {
        let mut store = self.inner.write().await;

        let next = store.last_id + 1;
        let id = TicketId::new(format!("TICKET-{next}"));
        if store.tickets.iter().any(|t| t.id == id) {
            return Err(RepositoryError::Conflict(format!("duplicate ticket id {id}")));
        }

        let ticket = ticket.into_ticket(id, Utc::now());
        store.last_id = next;
        store.tickets.push(ticket.clone());

        tracing::info!(ticket_id = %ticket.id, "Support ticket created");
        Ok(ticket)
    }

    async fn get_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .iter()
            .find(|t| &t.id == id)
            .cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<Ticket>, RepositoryError> {
        let needle = query.to_lowercase();
        Ok(self.filtered(|t| t.matches(&needle)).await)
    }

    async fn list_by_order(&self, order_number: &str) -> Result<Vec<Ticket>, RepositoryError> {
        Ok(self
            .filtered(|t| t.order_number.as_deref() == Some(order_number))
            .await)
    }

    async fn list_all(&self) -> Result<Vec<Ticket>, RepositoryError> {
        Ok(self.inner.read().await.tickets.clone())
    }

    #[instrument(skip(self, description))]
    async fn update_description(
        &self,
        id: &TicketId,
        description: &str,
    ) -> Result<Ticket, RepositoryError> {
        let mut store = self.inner.write().await;
        let ticket = store
            .tickets
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or(RepositoryError::NotFound)?;

        ticket.description = description.to_string();
        tracing::info!(ticket_id = %ticket.id, "Support ticket description updated");
        Ok(ticket.clone())
    }
}
