//! Type conversion functions for Shopify Storefront API responses.

pub mod cart;
pub mod collections;
pub mod products;

pub use cart::{convert_cart, convert_user_errors};
pub use collections::convert_collection;
pub use products::convert_product;

use shopfront_core::Price;

use super::queries::{ImageFields, MoneyV2};
use crate::shopify::types::Image;

/// Parse a `MoneyV2`; amounts that aren't decimals are dropped.
pub(crate) fn convert_money(money: MoneyV2) -> Option<Price> {
    let price = Price::parse(&money.amount, money.currency_code);
    if price.is_none() {
        tracing::warn!(amount = %money.amount, "unparseable money amount from Shopify");
    }
    price
}

pub(crate) fn convert_image(image: ImageFields) -> Image {
    Image {
        url: image.url,
        alt_text: image.alt_text.filter(|a| !a.is_empty()),
    }
}
