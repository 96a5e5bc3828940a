//! Cart model shared by the storefront server and the cart client.
//!
//! This is the normalized shape of a Shopify cart as it travels over
//! `/api/cart`: the raw GraphQL connection/edge nesting is flattened into an
//! ordered item list, and the variant price is a single `priceAmount` field
//! whichever mutation produced it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CartId, LineId, MerchandiseId};
use super::price::Price;

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart ID.
    pub id: CartId,
    /// Hosted checkout URL.
    pub checkout_url: String,
    /// Cart lines, in the order Shopify returns them.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Cart line ID.
    pub id: LineId,
    /// Quantity (always positive; a zero-quantity line is removed remotely).
    pub quantity: u32,
    /// Product variant on this line.
    pub merchandise: Merchandise,
}

/// Merchandise in a cart line (simplified product variant info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchandise {
    /// Variant ID.
    pub id: MerchandiseId,
    /// Variant title.
    #[serde(default)]
    pub title: Option<String>,
    /// Parent product handle.
    #[serde(default)]
    pub product_handle: Option<String>,
    /// Parent product title.
    #[serde(default)]
    pub product_title: Option<String>,
    /// Unit price amount.
    #[serde(default)]
    pub price_amount: Option<Decimal>,
    /// ISO 4217 currency code for `price_amount`.
    #[serde(default)]
    pub currency_code: Option<String>,
}

impl Merchandise {
    /// Unit price, if both amount and currency are known.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        match (self.price_amount, &self.currency_code) {
            (Some(amount), Some(code)) => Some(Price::new(amount, code.clone())),
            _ => None,
        }
    }
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Option<Price> {
        self.merchandise.price().map(|p| p.times(self.quantity))
    }
}

impl Cart {
    /// Find the line holding the given merchandise.
    #[must_use]
    pub fn find_by_merchandise(&self, merchandise_id: &MerchandiseId) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| &item.merchandise.id == merchandise_id)
    }

    /// Find a line by its ID.
    #[must_use]
    pub fn find_line(&self, line_id: &LineId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == line_id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line prices.
    ///
    /// Returns `None` for an empty cart, when any line has no price, or when
    /// lines are priced in different currencies.
    #[must_use]
    pub fn subtotal(&self) -> Option<Price> {
        let mut prices = self.items.iter().map(CartItem::line_price);
        let mut total = prices.next()??;
        for price in prices {
            let price = price?;
            if price.currency_code != total.currency_code {
                return None;
            }
            total.amount += price.amount;
        }
        Some(total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(line: &str, variant: &str, quantity: u32, amount: Option<&str>) -> CartItem {
        CartItem {
            id: LineId::new(line),
            quantity,
            merchandise: Merchandise {
                id: MerchandiseId::new(variant),
                title: Some("Default Title".to_string()),
                product_handle: Some("pineapple-tee".to_string()),
                product_title: Some("Pineapple Tee".to_string()),
                price_amount: amount.map(|a| a.parse().unwrap()),
                currency_code: Some("USD".to_string()),
            },
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new("gid://shopify/Cart/9"),
            checkout_url: "https://shop.example/checkouts/9".to_string(),
            items,
        }
    }

    #[test]
    fn test_find_by_merchandise() {
        let cart = cart(vec![
            item("line1", "gid://var/1", 2, Some("10.00")),
            item("line2", "gid://var/2", 1, Some("5.00")),
        ]);
        let found = cart
            .find_by_merchandise(&MerchandiseId::new("gid://var/2"))
            .unwrap();
        assert_eq!(found.id.as_str(), "line2");
        assert!(
            cart.find_by_merchandise(&MerchandiseId::new("gid://var/3"))
                .is_none()
        );
    }

    #[test]
    fn test_total_quantity_and_subtotal() {
        let cart = cart(vec![
            item("line1", "gid://var/1", 2, Some("10.00")),
            item("line2", "gid://var/2", 1, Some("5.50")),
        ]);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal().unwrap().amount, Decimal::new(2550, 2));
    }

    #[test]
    fn test_subtotal_unknown_when_price_missing() {
        let cart = cart(vec![
            item("line1", "gid://var/1", 2, Some("10.00")),
            item("line2", "gid://var/2", 1, None),
        ]);
        assert!(cart.subtotal().is_none());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let cart = cart(vec![item("line1", "gid://var/1", 2, Some("10.00"))]);
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["checkoutUrl"], "https://shop.example/checkouts/9");
        assert_eq!(json["items"][0]["merchandise"]["productHandle"], "pineapple-tee");
        assert_eq!(json["items"][0]["merchandise"]["priceAmount"], "10.00");
    }

    #[test]
    fn test_deserializes_sparse_merchandise() {
        let json = r#"{
            "id": "gid://cart/9",
            "checkoutUrl": "https://shop.example/c",
            "items": [{"id": "line1", "quantity": 2, "merchandise": {"id": "gid://var/1"}}]
        }"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert!(cart.items[0].merchandise.title.is_none());
        assert!(cart.items[0].line_price().is_none());
    }
}
