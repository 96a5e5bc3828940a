//! Cart type conversion functions.
//!
//! All four cart operations select the same `CartFields` fragment, so one
//! conversion serves them all and every cart leaves here in the same shape.

use shopfront_core::{Cart, CartId, CartItem, LineId, Merchandise, MerchandiseId};
use tracing::warn;

use super::super::queries::{CartFields, CartLineFields, UserError};

pub fn convert_cart(cart: CartFields) -> Cart {
    Cart {
        id: CartId::new(cart.id),
        checkout_url: cart.checkout_url,
        items: cart.lines.into_nodes().filter_map(convert_cart_line).collect(),
    }
}

fn convert_cart_line(line: CartLineFields) -> Option<CartItem> {
    let merchandise = line.merchandise;
    let Some(merchandise_id) = merchandise.id else {
        warn!(line_id = %line.id, "Skipping cart line whose merchandise is not a product variant");
        return None;
    };

    let (price_amount, currency_code) = merchandise
        .price
        .and_then(super::convert_money)
        .map_or((None, None), |p| (Some(p.amount), Some(p.currency_code)));
    let (product_handle, product_title) = merchandise
        .product
        .map_or((None, None), |p| (p.handle, p.title));

    Some(CartItem {
        id: LineId::new(line.id),
        quantity: line.quantity,
        merchandise: Merchandise {
            id: MerchandiseId::new(merchandise_id),
            title: merchandise.title,
            product_handle,
            product_title,
            price_amount,
            currency_code,
        },
    })
}

/// Join mutation user errors into one message.
pub fn convert_user_errors(errors: Vec<UserError>) -> String {
    errors
        .into_iter()
        .map(|e| match e.field {
            Some(field) if !field.is_empty() => format!("{} ({})", e.message, field.join(".")),
            _ => e.message,
        })
        .collect::<Vec<_>>()
        .join("; ")
}
