//! Collection type conversion functions.

use shopfront_core::{CollectionId, MerchandiseId, ProductId};

use super::super::queries::ProductSummaryFields;
use super::super::queries::get_collections::CollectionFields;
use super::{convert_image, convert_money};
use crate::shopify::types::{Collection, ProductSummary};

pub fn convert_collection(collection: CollectionFields) -> Collection {
    Collection {
        id: CollectionId::new(collection.id),
        handle: collection.handle,
        title: collection.title,
        description: collection.description,
        image: collection.image.map(|i| i.url),
        products: collection
            .products
            .into_nodes()
            .map(convert_product_summary)
            .collect(),
    }
}

fn convert_product_summary(product: ProductSummaryFields) -> ProductSummary {
    let first_variant = product.variants.into_nodes().next();
    let (default_variant_id, price) = first_variant.map_or((None, None), |v| {
        (Some(MerchandiseId::new(v.id)), convert_money(v.price))
    });

    ProductSummary {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        featured_image: product.featured_image.map(convert_image),
        default_variant_id,
        price,
    }
}
