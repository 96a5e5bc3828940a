//! Observable cart state.
//!
//! [`CartStore`] owns the local snapshot and publishes every change on a
//! `tokio::sync::watch` channel so views can re-render from the latest
//! [`CartSnapshot`] without polling.

use std::sync::{Arc, Mutex, PoisonError};

use shopfront_core::{Cart, CartId, LineId, MerchandiseId};
use tokio::sync::watch;
use tracing::warn;

use crate::pending::PendingOperations;
use crate::reconciler::Persist;
use crate::storage::CartIdStorage;

/// Everything a cart view renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSnapshot {
    /// Last cart the server returned.
    pub cart: Option<Cart>,
    /// Whether the cart panel is shown.
    pub is_open: bool,
    /// In-flight exchanges.
    pub pending: PendingOperations,
}

impl CartSnapshot {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.pending.is_loading()
    }

    #[must_use]
    pub fn is_adding_item(&self, merchandise_id: &MerchandiseId) -> bool {
        self.pending.is_adding(merchandise_id)
    }

    #[must_use]
    pub fn is_updating_item(&self, line_id: &LineId) -> bool {
        self.pending.is_updating(line_id)
    }

    #[must_use]
    pub fn is_removing_item(&self, line_id: &LineId) -> bool {
        self.pending.is_removing(line_id)
    }
}

/// Shared snapshot plus the persisted cart ID.
pub struct CartStore {
    state: Mutex<CartSnapshot>,
    updates: watch::Sender<CartSnapshot>,
    storage: Arc<dyn CartIdStorage>,
}

impl CartStore {
    #[must_use]
    pub fn new(storage: Arc<dyn CartIdStorage>) -> Self {
        let (updates, _) = watch::channel(CartSnapshot::default());
        Self {
            state: Mutex::new(CartSnapshot::default()),
            updates,
            storage,
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Receive every state change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.updates.subscribe()
    }

    /// The persisted cart ID.
    ///
    /// A storage failure is logged and reads as "no cart".
    #[must_use]
    pub fn cart_id(&self) -> Option<CartId> {
        read_cart_id(self.storage.as_ref())
    }

    /// [`Self::cart_id`] on the blocking pool.
    pub async fn load_cart_id(&self) -> Option<CartId> {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || read_cart_id(storage.as_ref()))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "cart id read task failed");
                None
            })
    }

    /// Write a persistence change on the blocking pool.
    ///
    /// Runs outside the snapshot lock; readers of the snapshot never wait
    /// on storage.
    pub async fn persist(&self, change: Persist) {
        if change == Persist::Keep {
            return;
        }
        let storage = Arc::clone(&self.storage);
        if let Err(e) = tokio::task::spawn_blocking(move || change.write(storage.as_ref())).await {
            warn!(error = %e, "cart id write task failed");
        }
    }

    /// Mutate the state and publish the result.
    pub fn update<R>(&self, f: impl FnOnce(&mut CartSnapshot) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        self.updates.send_replace(state.clone());
        result
    }
}

fn read_cart_id(storage: &dyn CartIdStorage) -> Option<CartId> {
    storage.load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to read persisted cart id");
        None
    })
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pending::PendingKey;
    use crate::storage::{FileCartIdStorage, MemoryCartIdStorage};

    #[test]
    fn test_update_publishes_to_subscribers() {
        let store = CartStore::new(Arc::new(MemoryCartIdStorage::new()));
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.update(|s| {
            s.is_open = true;
            s.pending
                .begin(PendingKey::Add(MerchandiseId::new("gid://var/1")));
        });

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert!(seen.is_open);
        assert!(seen.is_adding_item(&MerchandiseId::new("gid://var/1")));
        assert_eq!(seen, store.snapshot());
    }

    #[test]
    fn test_cart_id_reads_storage() {
        let store = CartStore::new(Arc::new(MemoryCartIdStorage::with_cart_id("gid://cart/3")));
        assert_eq!(store.cart_id(), Some(CartId::new("gid://cart/3")));
    }

    #[tokio::test]
    async fn test_persist_writes_through_blocking_pool() {
        let storage = Arc::new(MemoryCartIdStorage::new());
        let store = CartStore::new(storage.clone());

        store.persist(Persist::Save(CartId::new("gid://cart/5"))).await;
        assert_eq!(storage.load().unwrap(), Some(CartId::new("gid://cart/5")));
        assert_eq!(store.load_cart_id().await, Some(CartId::new("gid://cart/5")));

        store.persist(Persist::Keep).await;
        assert_eq!(store.load_cart_id().await, Some(CartId::new("gid://cart/5")));

        store.persist(Persist::Clear).await;
        assert_eq!(store.load_cart_id().await, None);
    }

    #[tokio::test]
    #[allow(clippy::await_holding_lock)]
    async fn test_persist_does_not_hold_snapshot_lock() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileCartIdStorage::new(dir.path().join("cart-id")));
        let store = CartStore::new(storage.clone());

        let guard = store.state.lock().unwrap();
        store.persist(Persist::Save(CartId::new("gid://cart/6"))).await;
        drop(guard);

        assert_eq!(storage.load().unwrap(), Some(CartId::new("gid://cart/6")));
    }
}
