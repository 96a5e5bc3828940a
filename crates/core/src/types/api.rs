//! The `/api/cart` contract between the storefront server and cart clients.
//!
//! # Wire Format
//!
//! ```text
//! GET  /api/cart?cartId=<id>
//! POST /api/cart   (form: action=<CartAction>, cartId, merchandiseId, quantity, lines=<JSON>)
//!
//! response: {"cart": <Cart|null>, "error"?: "<message>"}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::id::{LineId, MerchandiseId};

/// Key under which clients persist the current cart ID.
pub const CART_ID_STORAGE_KEY: &str = "shopify-cart-id";

/// Error text for a cart that no longer exists remotely.
pub const CART_NOT_FOUND: &str = "Cart not found";

/// Shopify's error text for a malformed or unknown global ID.
pub const INVALID_GLOBAL_ID: &str = "Invalid global id";

/// Response body of every `/api/cart` exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartPayload {
    /// The complete cart after the operation, if one was produced.
    pub cart: Option<Cart>,
    /// Human-readable error, present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CartPayload {
    /// A successful payload carrying the full cart.
    #[must_use]
    pub const fn success(cart: Cart) -> Self {
        Self {
            cart: Some(cart),
            error: None,
        }
    }

    /// A payload with neither cart nor error (no cart requested).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            cart: None,
            error: None,
        }
    }

    /// A failed payload.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            cart: None,
            error: Some(message.into()),
        }
    }

    /// Whether the error refers to a cart or ID that no longer exists.
    ///
    /// Clients drop their persisted cart ID when this is true.
    #[must_use]
    pub fn is_stale_reference(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.contains(CART_NOT_FOUND) || e.contains(INVALID_GLOBAL_ID))
    }
}

/// A line to add to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    /// Product variant ID.
    pub merchandise_id: MerchandiseId,
    /// Quantity to add.
    pub quantity: u32,
}

/// An absolute quantity change for an existing cart line.
///
/// A quantity of zero removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineUpdate {
    /// Cart line ID.
    pub id: LineId,
    /// New quantity.
    pub quantity: u32,
}

/// The `action` field of a `POST /api/cart` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartAction {
    /// Create a new cart from `lines`.
    CreateCart,
    /// Add a single `merchandiseId` x `quantity` to `cartId`.
    AddToCart,
    /// Apply `lines` quantity updates to `cartId`.
    UpdateCart,
    /// Add `lines` to `cartId`.
    AddLineItem,
}

impl CartAction {
    /// The form value for this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateCart => "createCart",
            Self::AddToCart => "addToCart",
            Self::UpdateCart => "updateCart",
            Self::AddLineItem => "addLineItem",
        }
    }
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown cart action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cart action: {0}")]
pub struct UnknownCartAction(pub String);

impl FromStr for CartAction {
    type Err = UnknownCartAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createCart" => Ok(Self::CreateCart),
            "addToCart" => Ok(Self::AddToCart),
            "updateCart" => Ok(Self::UpdateCart),
            "addLineItem" => Ok(Self::AddLineItem),
            other => Err(UnknownCartAction(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse_known() {
        for action in [
            CartAction::CreateCart,
            CartAction::AddToCart,
            CartAction::UpdateCart,
            CartAction::AddLineItem,
        ] {
            assert_eq!(action.as_str().parse::<CartAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_action_parse_unknown() {
        let err = "removeCart".parse::<CartAction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown cart action: removeCart");
    }

    #[test]
    fn test_stale_reference_detection() {
        assert!(CartPayload::failure("Cart not found").is_stale_reference());
        assert!(
            CartPayload::failure("Variable $cartId: Invalid global id 'abc'").is_stale_reference()
        );
        assert!(!CartPayload::failure("Failed to update cart").is_stale_reference());
        assert!(!CartPayload::empty().is_stale_reference());
    }

    #[test]
    fn test_payload_omits_missing_error() {
        let json = serde_json::to_string(&CartPayload::empty()).unwrap();
        assert_eq!(json, r#"{"cart":null}"#);
    }

    #[test]
    fn test_line_input_wire_names() {
        let lines: Vec<CartLineInput> =
            serde_json::from_str(r#"[{"merchandiseId":"gid://var/1","quantity":2}]"#).unwrap();
        assert_eq!(lines[0].merchandise_id.as_str(), "gid://var/1");
        assert_eq!(lines[0].quantity, 2);
    }
}
