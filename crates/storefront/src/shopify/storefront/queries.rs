//! GraphQL operation definitions for Shopify Storefront API.
//!
//! Each operation implements [`GraphQLQuery`] over a query document in
//! `graphql/storefront/queries/`. Response types mirror the selection sets
//! exactly; `conversions` turns them into domain types.

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

const CART_DOCUMENT: &str = include_str!("../../../graphql/storefront/queries/cart.graphql");
const PRODUCTS_DOCUMENT: &str =
    include_str!("../../../graphql/storefront/queries/products.graphql");
const COLLECTIONS_DOCUMENT: &str =
    include_str!("../../../graphql/storefront/queries/collections.graphql");

macro_rules! operation {
    ($name:ident, $module:ident, $document:expr) => {
        pub struct $name;

        impl GraphQLQuery for $name {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $document,
                    operation_name: stringify!($name),
                }
            }
        }
    };
}

operation!(GetCart, get_cart, CART_DOCUMENT);
operation!(CreateCart, create_cart, CART_DOCUMENT);
operation!(AddCartLines, add_cart_lines, CART_DOCUMENT);
operation!(UpdateCartLines, update_cart_lines, CART_DOCUMENT);
operation!(GetProductByHandle, get_product_by_handle, PRODUCTS_DOCUMENT);
operation!(GetCollections, get_collections, COLLECTIONS_DOCUMENT);
operation!(GetCollectionByHandle, get_collection_by_handle, COLLECTIONS_DOCUMENT);

// =============================================================================
// Shared selections
// =============================================================================

/// `{ edges { node } }` connection wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|e| e.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserError {
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// `fragment CartFields on Cart`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartFields {
    pub id: String,
    pub checkout_url: String,
    pub lines: Connection<CartLineFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFields {
    pub id: String,
    pub quantity: u32,
    pub merchandise: MerchandiseFields,
}

/// `merchandise { ... on ProductVariant }`; fields are absent for other types.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseFields {
    pub id: Option<String>,
    pub title: Option<String>,
    pub product: Option<MerchandiseProduct>,
    pub price: Option<MoneyV2>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchandiseProduct {
    pub handle: Option<String>,
    pub title: Option<String>,
}

/// `{ cart { ...CartFields } userErrors { field message } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMutationPayload {
    pub cart: Option<CartFields>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

/// `input CartLineInput`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: u32,
}

/// `input CartLineUpdateInput`
#[derive(Debug, Clone, Serialize)]
pub struct CartLineUpdateInput {
    pub id: String,
    pub quantity: u32,
}

/// `fragment ProductSummaryFields on Product`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub featured_image: Option<ImageFields>,
    pub variants: Connection<SummaryVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryVariant {
    pub id: String,
    pub price: MoneyV2,
}

// =============================================================================
// Cart operations
// =============================================================================

pub mod get_cart {
    use super::{CartFields, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartFields>,
    }
}

pub mod create_cart {
    use super::{CartLineInput, CartMutationPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    /// `input CartInput` (lines only)
    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartMutationPayload>,
    }
}

pub mod add_cart_lines {
    use super::{CartLineInput, CartMutationPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartMutationPayload>,
    }
}

pub mod update_cart_lines {
    use super::{CartLineUpdateInput, CartMutationPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdateInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartMutationPayload>,
    }
}

// =============================================================================
// Product operations
// =============================================================================

pub mod get_product_by_handle {
    use super::{Connection, Deserialize, ImageFields, MoneyV2, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProductFields {
        pub id: String,
        pub handle: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub price_range: PriceRange,
        pub featured_image: Option<ImageFields>,
        pub images: Connection<ImageFields>,
        pub variants: Connection<VariantFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PriceRange {
        pub min_variant_price: MoneyV2,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct VariantFields {
        pub id: String,
        pub title: String,
        pub available_for_sale: bool,
        pub price: MoneyV2,
    }
}

// =============================================================================
// Collection operations
// =============================================================================

pub mod get_collections {
    use super::{Connection, Deserialize, ProductSummaryFields, Serialize};

    /// The operation takes no variables; serializes as `{}`.
    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: Connection<CollectionFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionFields {
        pub id: String,
        pub handle: String,
        pub title: String,
        #[serde(default)]
        pub description: String,
        pub image: Option<CollectionImage>,
        pub products: Connection<ProductSummaryFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionImage {
        pub url: String,
    }
}

pub mod get_collection_by_handle {
    use super::{Deserialize, Serialize};
    pub use super::get_collections::CollectionFields;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub min_price: f64,
        pub max_price: f64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<CollectionFields>,
    }
}
