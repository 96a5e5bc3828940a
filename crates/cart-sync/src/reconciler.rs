//! Folding server responses into local cart state.
//!
//! A response touches two places: the in-memory snapshot and the persisted
//! cart ID. [`Persist::for_payload`] decides the storage change up front so
//! the caller can write it without holding the snapshot lock; [`reconcile`]
//! then updates the snapshot.

use shopfront_core::{Cart, CartId, CartPayload};
use tracing::{debug, info, warn};

use crate::storage::CartIdStorage;

/// What a settled response did to the local cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The snapshot was replaced and the cart ID persisted.
    Replaced,
    /// The remote cart is gone; the snapshot and persisted ID were dropped.
    Evicted,
    /// The request failed for another reason; nothing changed.
    Failed,
    /// No cart in the response and no error; nothing changed.
    Unchanged,
}

/// Change to the persisted cart ID implied by a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persist {
    Save(CartId),
    Clear,
    Keep,
}

impl Persist {
    #[must_use]
    pub fn for_payload(payload: &CartPayload) -> Self {
        match &payload.cart {
            Some(cart) => Self::Save(cart.id.clone()),
            None if payload.is_stale_reference() => Self::Clear,
            None => Self::Keep,
        }
    }

    /// Write the change to `storage`. Failures are logged, not returned.
    pub fn write(&self, storage: &dyn CartIdStorage) {
        match self {
            Self::Save(cart_id) => {
                if let Err(e) = storage.save(cart_id) {
                    warn!(error = %e, %cart_id, "failed to persist cart id");
                }
            }
            Self::Clear => {
                if let Err(e) = storage.clear() {
                    warn!(error = %e, "failed to clear persisted cart id");
                }
            }
            Self::Keep => {}
        }
    }
}

/// Apply `payload` to the local snapshot.
///
/// A returned cart wholesale-replaces `cart`. A stale-reference error clears
/// it. Anything else leaves it alone. Storage is handled by [`Persist`].
pub fn reconcile(cart: &mut Option<Cart>, payload: CartPayload) -> Outcome {
    let stale = payload.is_stale_reference();
    let CartPayload { cart: returned, error } = payload;

    if let Some(next) = returned {
        debug!(cart_id = %next.id, lines = next.items.len(), "cart snapshot replaced");
        *cart = Some(next);
        return Outcome::Replaced;
    }

    let Some(message) = error else {
        return Outcome::Unchanged;
    };

    if stale {
        info!(error = %message, "remote cart no longer exists, dropping cart id");
        *cart = None;
        Outcome::Evicted
    } else {
        warn!(error = %message, "cart request failed");
        Outcome::Failed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryCartIdStorage;

    fn cart(id: &str) -> Cart {
        Cart {
            id: CartId::new(id),
            checkout_url: format!("https://shop.example/checkouts/{id}"),
            items: Vec::new(),
        }
    }

    /// Persist, then reconcile, the way the client settles an exchange.
    fn settle(
        current: &mut Option<Cart>,
        storage: &MemoryCartIdStorage,
        payload: CartPayload,
    ) -> Outcome {
        Persist::for_payload(&payload).write(storage);
        reconcile(current, payload)
    }

    #[test]
    fn test_cart_replaces_snapshot_and_persists_id() {
        let storage = MemoryCartIdStorage::with_cart_id("gid://cart/1");
        let mut current = Some(cart("gid://cart/1"));

        let outcome = settle(
            &mut current,
            &storage,
            CartPayload::success(cart("gid://cart/2")),
        );

        assert_eq!(outcome, Outcome::Replaced);
        assert_eq!(current.unwrap().id, CartId::new("gid://cart/2"));
        assert_eq!(storage.load().unwrap(), Some(CartId::new("gid://cart/2")));
    }

    #[test]
    fn test_not_found_evicts() {
        let storage = MemoryCartIdStorage::with_cart_id("gid://cart/1");
        let mut current = Some(cart("gid://cart/1"));

        let outcome = settle(&mut current, &storage, CartPayload::failure("Cart not found"));

        assert_eq!(outcome, Outcome::Evicted);
        assert!(current.is_none());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_invalid_global_id_evicts() {
        let storage = MemoryCartIdStorage::with_cart_id("garbage");
        let mut current = None;

        let outcome = settle(
            &mut current,
            &storage,
            CartPayload::failure("Invalid global id 'garbage'"),
        );

        assert_eq!(outcome, Outcome::Evicted);
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_transient_error_keeps_state() {
        let storage = MemoryCartIdStorage::with_cart_id("gid://cart/1");
        let mut current = Some(cart("gid://cart/1"));

        let outcome = settle(
            &mut current,
            &storage,
            CartPayload::failure("Failed to update cart"),
        );

        assert_eq!(outcome, Outcome::Failed);
        assert!(current.is_some());
        assert_eq!(storage.load().unwrap(), Some(CartId::new("gid://cart/1")));
    }

    #[test]
    fn test_empty_payload_is_unchanged() {
        let storage = MemoryCartIdStorage::new();
        let mut current = None;
        assert_eq!(
            settle(&mut current, &storage, CartPayload::empty()),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_persist_decided_from_payload_alone() {
        assert_eq!(
            Persist::for_payload(&CartPayload::success(cart("gid://cart/4"))),
            Persist::Save(CartId::new("gid://cart/4"))
        );
        assert_eq!(
            Persist::for_payload(&CartPayload::failure("Cart not found")),
            Persist::Clear
        );
        assert_eq!(
            Persist::for_payload(&CartPayload::failure("Failed to update cart")),
            Persist::Keep
        );
        assert_eq!(Persist::for_payload(&CartPayload::empty()), Persist::Keep);
    }
}
