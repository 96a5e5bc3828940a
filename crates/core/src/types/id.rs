//! Newtype IDs for type-safe entity references.
//!
//! Shopify identifies everything with opaque global ids
//! (`gid://shopify/ProductVariant/123`). Use the `define_id!` macro to create
//! wrappers that prevent passing a cart line id where a merchandise id is
//! expected.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_id;
/// define_id!(OrderId);
/// define_id!(RefundId);
///
/// let order_id = OrderId::new("gid://shopify/Order/1");
/// let refund_id = RefundId::new("gid://shopify/Order/1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = refund_id;
/// assert_eq!(order_id.as_str(), refund_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Remote cart (`gid://shopify/Cart/...`)
define_id!(CartId);
// Line within a cart (`gid://shopify/CartLine/...`)
define_id!(LineId);
// Purchasable product variant (`gid://shopify/ProductVariant/...`)
define_id!(MerchandiseId);
define_id!(ProductId);
define_id!(CollectionId);
// Support ticket (`TICKET-1`)
define_id!(TicketId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_is_raw_value() {
        let id = CartId::new("gid://shopify/Cart/9");
        assert_eq!(id.to_string(), "gid://shopify/Cart/9");
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = LineId::from("gid://shopify/CartLine/1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gid://shopify/CartLine/1\"");
    }

    #[test]
    fn test_id_deserializes_from_string() {
        let id: MerchandiseId =
            serde_json::from_str("\"gid://shopify/ProductVariant/7\"").unwrap();
        assert_eq!(id.as_str(), "gid://shopify/ProductVariant/7");
    }

    #[test]
    fn test_id_round_trips_into_string() {
        let raw = String::from("TICKET-3");
        let id = TicketId::from(raw.clone());
        assert_eq!(String::from(id), raw);
    }
}
