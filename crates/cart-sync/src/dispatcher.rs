//! Translation of shopper intents into concrete cart requests.
//!
//! Planning is pure: given the intent, the persisted cart ID and the last
//! known cart, decide which `/api/cart` action to send.
//!
//! | Intent  | No cart ID         | Variant already in cart          | Otherwise        |
//! |---------|--------------------|----------------------------------|------------------|
//! | add     | `createCart`       | `updateCart` (summed quantity)   | `addLineItem`    |
//! | update  | dropped            | `updateCart`                     | `updateCart`     |
//! | remove  | dropped            | `updateCart` (quantity 0)        | `updateCart`     |

use shopfront_core::{
    Cart, CartAction, CartId, CartLineInput, CartLineUpdate, LineId, MerchandiseId,
};

use crate::error::TransportError;
use crate::pending::PendingKey;

/// Something the shopper asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Add `quantity` units of a variant.
    Add {
        merchandise_id: MerchandiseId,
        quantity: u32,
    },
    /// Set a line's quantity.
    Update { line_id: LineId, quantity: u32 },
    /// Remove a line.
    Remove { line_id: LineId },
}

impl Intent {
    /// The key this intent is deduplicated on.
    #[must_use]
    pub fn pending_key(&self) -> PendingKey {
        match self {
            Self::Add { merchandise_id, .. } => PendingKey::Add(merchandise_id.clone()),
            Self::Update { line_id, .. } => PendingKey::Update(line_id.clone()),
            Self::Remove { line_id } => PendingKey::Remove(line_id.clone()),
        }
    }

    /// Whether the intent is meaningless without an existing cart.
    #[must_use]
    pub const fn requires_cart(&self) -> bool {
        !matches!(self, Self::Add { .. })
    }
}

/// A state-changing request against `/api/cart`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMutation {
    /// Create a new cart holding `lines`.
    CreateCart { lines: Vec<CartLineInput> },
    /// Add `lines` to an existing cart.
    AddLines {
        cart_id: CartId,
        lines: Vec<CartLineInput>,
    },
    /// Set absolute quantities on existing lines.
    UpdateLines {
        cart_id: CartId,
        lines: Vec<CartLineUpdate>,
    },
}

impl CartMutation {
    /// The form `action` this mutation is sent as.
    #[must_use]
    pub const fn action(&self) -> CartAction {
        match self {
            Self::CreateCart { .. } => CartAction::CreateCart,
            Self::AddLines { .. } => CartAction::AddLineItem,
            Self::UpdateLines { .. } => CartAction::UpdateCart,
        }
    }

    #[must_use]
    pub const fn cart_id(&self) -> Option<&CartId> {
        match self {
            Self::CreateCart { .. } => None,
            Self::AddLines { cart_id, .. } | Self::UpdateLines { cart_id, .. } => Some(cart_id),
        }
    }

    /// Form fields for `POST /api/cart`, with `lines` JSON-encoded.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Encode` if the lines cannot be serialized.
    pub fn form_fields(&self) -> Result<Vec<(&'static str, String)>, TransportError> {
        let lines = match self {
            Self::CreateCart { lines } | Self::AddLines { lines, .. } => {
                serde_json::to_string(lines)
            }
            Self::UpdateLines { lines, .. } => serde_json::to_string(lines),
        }
        .map_err(TransportError::Encode)?;

        let mut fields = vec![("action", self.action().as_str().to_string())];
        if let Some(cart_id) = self.cart_id() {
            fields.push(("cartId", cart_id.to_string()));
        }
        fields.push(("lines", lines));
        Ok(fields)
    }
}

/// Decide the request for `intent`.
///
/// Returns `None` when there is nothing to send: a zero-quantity add, or an
/// update/remove with no cart to apply it to.
#[must_use]
pub fn plan(
    intent: &Intent,
    cart_id: Option<&CartId>,
    cart: Option<&Cart>,
) -> Option<CartMutation> {
    match intent {
        Intent::Add { quantity: 0, .. } => None,
        Intent::Add {
            merchandise_id,
            quantity,
        } => {
            let Some(cart_id) = cart_id else {
                return Some(CartMutation::CreateCart {
                    lines: vec![CartLineInput {
                        merchandise_id: merchandise_id.clone(),
                        quantity: *quantity,
                    }],
                });
            };

            let existing = cart.and_then(|c| c.find_by_merchandise(merchandise_id));
            Some(match existing {
                Some(item) => CartMutation::UpdateLines {
                    cart_id: cart_id.clone(),
                    lines: vec![CartLineUpdate {
                        id: item.id.clone(),
                        quantity: item.quantity.saturating_add(*quantity),
                    }],
                },
                None => CartMutation::AddLines {
                    cart_id: cart_id.clone(),
                    lines: vec![CartLineInput {
                        merchandise_id: merchandise_id.clone(),
                        quantity: *quantity,
                    }],
                },
            })
        }
        Intent::Update { line_id, quantity } => Some(CartMutation::UpdateLines {
            cart_id: cart_id?.clone(),
            lines: vec![CartLineUpdate {
                id: line_id.clone(),
                quantity: *quantity,
            }],
        }),
        Intent::Remove { line_id } => Some(CartMutation::UpdateLines {
            cart_id: cart_id?.clone(),
            lines: vec![CartLineUpdate {
                id: line_id.clone(),
                quantity: 0,
            }],
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::{CartItem, Merchandise};

    use super::*;

    fn cart_with(line: &str, variant: &str, quantity: u32) -> Cart {
        Cart {
            id: CartId::new("gid://cart/9"),
            checkout_url: "https://shop.example/c/9".to_string(),
            items: vec![CartItem {
                id: LineId::new(line),
                quantity,
                merchandise: Merchandise {
                    id: MerchandiseId::new(variant),
                    title: None,
                    product_handle: None,
                    product_title: None,
                    price_amount: None,
                    currency_code: None,
                },
            }],
        }
    }

    fn add(variant: &str, quantity: u32) -> Intent {
        Intent::Add {
            merchandise_id: MerchandiseId::new(variant),
            quantity,
        }
    }

    #[test]
    fn test_add_without_cart_creates_one() {
        let mutation = plan(&add("gid://var/1", 2), None, None).unwrap();
        assert_eq!(
            mutation,
            CartMutation::CreateCart {
                lines: vec![CartLineInput {
                    merchandise_id: MerchandiseId::new("gid://var/1"),
                    quantity: 2,
                }],
            }
        );
    }

    #[test]
    fn test_add_existing_variant_sums_quantity() {
        let cart_id = CartId::new("gid://cart/9");
        let cart = cart_with("line1", "gid://var/1", 2);

        let mutation = plan(&add("gid://var/1", 3), Some(&cart_id), Some(&cart)).unwrap();

        assert_eq!(
            mutation,
            CartMutation::UpdateLines {
                cart_id,
                lines: vec![CartLineUpdate {
                    id: LineId::new("line1"),
                    quantity: 5,
                }],
            }
        );
    }

    #[test]
    fn test_add_new_variant_adds_line() {
        let cart_id = CartId::new("gid://cart/9");
        let cart = cart_with("line1", "gid://var/1", 2);

        let mutation = plan(&add("gid://var/2", 1), Some(&cart_id), Some(&cart)).unwrap();

        assert_eq!(mutation.action(), CartAction::AddLineItem);
        assert_eq!(mutation.cart_id(), Some(&cart_id));
    }

    #[test]
    fn test_add_with_id_but_unknown_cart_adds_line() {
        let cart_id = CartId::new("gid://cart/9");
        let mutation = plan(&add("gid://var/1", 1), Some(&cart_id), None).unwrap();
        assert_eq!(mutation.action(), CartAction::AddLineItem);
    }

    #[test]
    fn test_zero_quantity_add_is_dropped() {
        assert!(plan(&add("gid://var/1", 0), None, None).is_none());
    }

    #[test]
    fn test_remove_is_zero_quantity_update() {
        let cart_id = CartId::new("gid://cart/9");
        let intent = Intent::Remove {
            line_id: LineId::new("line1"),
        };

        let mutation = plan(&intent, Some(&cart_id), None).unwrap();

        assert_eq!(
            mutation,
            CartMutation::UpdateLines {
                cart_id,
                lines: vec![CartLineUpdate {
                    id: LineId::new("line1"),
                    quantity: 0,
                }],
            }
        );
    }

    #[test]
    fn test_update_without_cart_is_dropped() {
        let intent = Intent::Update {
            line_id: LineId::new("line1"),
            quantity: 4,
        };
        assert!(plan(&intent, None, None).is_none());
        assert!(intent.requires_cart());
    }

    #[test]
    fn test_form_fields_for_create() {
        let fields = plan(&add("gid://var/1", 2), None, None)
            .unwrap()
            .form_fields()
            .unwrap();
        assert_eq!(
            fields,
            vec![
                ("action", "createCart".to_string()),
                (
                    "lines",
                    r#"[{"merchandiseId":"gid://var/1","quantity":2}]"#.to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_form_fields_for_update_carry_cart_id() {
        let mutation = CartMutation::UpdateLines {
            cart_id: CartId::new("gid://cart/9"),
            lines: vec![CartLineUpdate {
                id: LineId::new("line1"),
                quantity: 0,
            }],
        };
        let fields = mutation.form_fields().unwrap();
        assert_eq!(fields[0], ("action", "updateCart".to_string()));
        assert_eq!(fields[1], ("cartId", "gid://cart/9".to_string()));
        assert_eq!(fields[2], ("lines", r#"[{"id":"line1","quantity":0}]"#.to_string()));
    }
}
