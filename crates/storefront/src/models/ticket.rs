//! Support ticket domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::TicketId;
use thiserror::Error;

/// Validation errors for new tickets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("Subject is required")]
    MissingSubject,
    #[error("Description is required")]
    MissingDescription,
}

/// A support request submitted by a shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// `TICKET-<n>`, assigned by the repository.
    pub id: TicketId,
    pub subject: String,
    pub description: String,
    /// Order the request refers to, if any.
    pub order_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// One-line summary, e.g. `Ticket TICKET-1: "Late delivery" (Order: 1042)`.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.order_number {
            Some(order) => format!("Ticket {}: \"{}\" (Order: {order})", self.id, self.subject),
            None => format!("Ticket {}: \"{}\"", self.id, self.subject),
        }
    }

    /// Whether `needle` (already lowercased) occurs in the subject or description.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.subject.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// A validated ticket that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    subject: String,
    description: String,
    order_number: Option<String>,
}

impl NewTicket {
    /// Validate ticket input. Surrounding whitespace is trimmed and a blank
    /// order number counts as none.
    ///
    /// # Errors
    ///
    /// Returns `TicketError` if the subject or description is blank.
    pub fn new(
        subject: &str,
        description: &str,
        order_number: Option<&str>,
    ) -> Result<Self, TicketError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TicketError::MissingSubject);
        }
        let description = clean_description(description)?;

        Ok(Self {
            subject: subject.to_string(),
            description,
            order_number: order_number
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from),
        })
    }

    /// Assign an id and creation time.
    #[must_use]
    pub fn into_ticket(self, id: TicketId, created_at: DateTime<Utc>) -> Ticket {
        Ticket {
            id,
            subject: self.subject,
            description: self.description,
            order_number: self.order_number,
            created_at,
        }
    }
}

/// Trimmed description, rejecting blank input.
///
/// # Errors
///
/// Returns `TicketError::MissingDescription` if nothing is left after trimming.
pub fn clean_description(description: &str) -> Result<String, TicketError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(TicketError::MissingDescription);
    }
    Ok(description.to_string())
}
