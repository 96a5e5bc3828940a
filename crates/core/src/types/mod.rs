//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod api;
pub mod cart;
pub mod id;
pub mod price;

pub use api::{
    CART_ID_STORAGE_KEY, CART_NOT_FOUND, CartAction, CartLineInput, CartLineUpdate, CartPayload,
    INVALID_GLOBAL_ID, UnknownCartAction,
};
pub use cart::{Cart, CartItem, Merchandise};
pub use id::*;
pub use price::Price;
