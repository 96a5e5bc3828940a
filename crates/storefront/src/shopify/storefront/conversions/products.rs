//! Product type conversion functions.

use shopfront_core::{MerchandiseId, ProductId};

use super::super::queries::get_product_by_handle::{ProductFields, VariantFields};
use super::{convert_image, convert_money};
use crate::shopify::types::{Product, ProductVariant};

pub fn convert_product(product: ProductFields) -> Product {
    Product {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        description: product.description,
        min_price: convert_money(product.price_range.min_variant_price),
        featured_image: product.featured_image.map(convert_image),
        images: product.images.into_nodes().map(convert_image).collect(),
        variants: product.variants.into_nodes().map(convert_variant).collect(),
    }
}

fn convert_variant(variant: VariantFields) -> ProductVariant {
    ProductVariant {
        id: MerchandiseId::new(variant.id),
        title: variant.title,
        price: convert_money(variant.price),
        available_for_sale: variant.available_for_sale,
    }
}
