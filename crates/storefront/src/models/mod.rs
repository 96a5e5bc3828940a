//! Domain models for storefront-local data.

pub mod ticket;

pub use ticket::{NewTicket, Ticket, TicketError};
