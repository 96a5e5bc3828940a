//! Shopfront Core - Shared types library.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `storefront` - HTTP server fronting the Shopify Storefront API
//! - `cart-sync` - Client-side cart state synchronization
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! Both sides of the `/api/cart` contract depend on the same definitions, so
//! the wire format cannot drift between server and client.
//!
//! # Modules
//!
//! - [`types`] - Newtype identifiers, prices, cart model and cart API payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
