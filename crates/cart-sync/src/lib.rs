//! Shopfront cart synchronization client.
//!
//! Keeps a local view of one remote cart consistent with the storefront's
//! `/api/cart` endpoint while the shopper adds, updates and removes items.
//!
//! # Architecture
//!
//! ```text
//! intent ──► PendingOperations ──► dispatcher::plan ──► CartApi ──► reconciler
//!   │          (dedup, flags)        (at queue head)     (HTTP)       │
//!   │                                                                 ▼
//!   └──────────────────── CartStore (snapshot + watch) ◄──── CartIdStorage
//! ```
//!
//! - Accepted intents go onto a channel drained by one worker task, so
//!   exchanges run in call order and a follow-up mutation sees the cart ID
//!   produced by an earlier create.
//! - Cart ID storage is read and written on the blocking pool, never under
//!   the snapshot lock.
//! - Duplicate intents for the same merchandise or line are dropped while
//!   the first one is still in flight.
//! - Every server response replaces the whole cart snapshot; stale cart
//!   references evict the persisted ID.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopfront_cart_sync::{CartSync, CartSyncConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sync = CartSync::from_config(&CartSyncConfig::from_env()?)?;
//! if let Some(done) = sync.load_initial() {
//!     done.await?;
//! }
//! if let Some(done) = sync.add_to_cart("gid://shopify/ProductVariant/1", 2) {
//!     done.await?;
//! }
//! println!("{:?}", sync.snapshot().cart);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pending;
pub mod reconciler;
pub mod storage;
pub mod store;
pub mod transport;

pub use client::{CartSync, Settlement};
pub use config::CartSyncConfig;
pub use dispatcher::{CartMutation, Intent};
pub use error::{ConfigError, StorageError, TransportError};
pub use pending::{Exchange, PendingKey, PendingOperations, SettlementPolicy};
pub use reconciler::Outcome;
pub use storage::{CartIdStorage, FileCartIdStorage, MemoryCartIdStorage};
pub use store::{CartSnapshot, CartStore};
pub use transport::{CartApi, HttpCartApi};
