//! The cart synchronization handle.
//!
//! [`CartSync`] is what a UI binds to. Intents are accepted synchronously
//! (pending flags flip before the call returns) and queued for a single
//! worker task that runs the remote exchanges in acceptance order. Callers
//! decide whether to await the returned [`Settlement`].

use std::sync::{Arc, Mutex, PoisonError, Weak};

use shopfront_core::{Cart, CartPayload, LineId, MerchandiseId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument, warn};

use crate::config::CartSyncConfig;
use crate::dispatcher::{self, Intent};
use crate::error::TransportError;
use crate::pending::{Exchange, SettlementPolicy};
use crate::reconciler::{self, Outcome, Persist};
use crate::storage::{CartIdStorage, FileCartIdStorage};
use crate::store::{CartSnapshot, CartStore};
use crate::transport::{CartApi, HttpCartApi};

/// Handle to a queued exchange; resolves once local state is updated.
///
/// Dropping it does not cancel the exchange.
pub type Settlement = oneshot::Receiver<Outcome>;

/// Client-side cart state kept in sync with `/api/cart`.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartSync {
    inner: Arc<CartSyncInner>,
}

struct CartSyncInner {
    api: Arc<dyn CartApi>,
    store: CartStore,
    policy: SettlementPolicy,
    jobs: mpsc::UnboundedSender<Job>,
    // Taken by the first enqueue, which spawns the worker.
    worker: Mutex<Option<mpsc::UnboundedReceiver<Job>>>,
}

#[derive(Debug)]
enum Work {
    Intent(Intent),
    Refresh,
}

struct Job {
    work: Work,
    done: oneshot::Sender<Outcome>,
}

impl CartSync {
    #[must_use]
    pub fn new(
        api: Arc<dyn CartApi>,
        storage: Arc<dyn CartIdStorage>,
        policy: SettlementPolicy,
    ) -> Self {
        let (jobs, worker) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(CartSyncInner {
                api,
                store: CartStore::new(storage),
                policy,
                jobs,
                worker: Mutex::new(Some(worker)),
            }),
        }
    }

    /// Build an HTTP-backed client persisting to a file.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the HTTP client cannot be constructed.
    pub fn from_config(config: &CartSyncConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::new(
            Arc::new(HttpCartApi::with_client(client, config.api_url.clone())),
            Arc::new(FileCartIdStorage::new(&config.storage_path)),
            config.settlement,
        ))
    }

    // =========================================================================
    // Observation
    // =========================================================================

    #[must_use]
    pub fn store(&self) -> &CartStore {
        &self.inner.store
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.store.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.store.subscribe()
    }

    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.snapshot().cart
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    #[must_use]
    pub fn is_cart_open(&self) -> bool {
        self.snapshot().is_open
    }

    #[must_use]
    pub fn is_adding_item(&self, merchandise_id: &MerchandiseId) -> bool {
        self.snapshot().is_adding_item(merchandise_id)
    }

    #[must_use]
    pub fn is_updating_item(&self, line_id: &LineId) -> bool {
        self.snapshot().is_updating_item(line_id)
    }

    #[must_use]
    pub fn is_removing_item(&self, line_id: &LineId) -> bool {
        self.snapshot().is_removing_item(line_id)
    }

    // =========================================================================
    // Panel visibility
    // =========================================================================

    /// Show the cart panel and refresh the cart if one exists.
    pub fn open_cart(&self) -> Option<Settlement> {
        self.inner.store.update(|s| s.is_open = true);
        self.refresh()
    }

    pub fn close_cart(&self) {
        self.inner.store.update(|s| s.is_open = false);
    }

    // =========================================================================
    // Intents
    // =========================================================================

    /// Add `quantity` units of a variant, opening the cart panel.
    ///
    /// Returns `None` if an add of the same variant is already in flight.
    pub fn add_to_cart(
        &self,
        merchandise_id: impl Into<MerchandiseId>,
        quantity: u32,
    ) -> Option<Settlement> {
        self.dispatch(Intent::Add {
            merchandise_id: merchandise_id.into(),
            quantity,
        })
    }

    /// Set a line's quantity.
    ///
    /// Returns `None` if there is no cart or the line is already updating.
    pub fn update_cart_item(
        &self,
        line_id: impl Into<LineId>,
        quantity: u32,
    ) -> Option<Settlement> {
        self.dispatch(Intent::Update {
            line_id: line_id.into(),
            quantity,
        })
    }

    /// Remove a line.
    ///
    /// Returns `None` if there is no cart or the line is already being removed.
    pub fn remove_cart_item(&self, line_id: impl Into<LineId>) -> Option<Settlement> {
        self.dispatch(Intent::Remove {
            line_id: line_id.into(),
        })
    }

    /// Re-read the cart from the server.
    ///
    /// Returns `None` if no cart ID is persisted.
    pub fn refresh(&self) -> Option<Settlement> {
        self.inner.store.cart_id()?;
        self.inner.store.update(|s| s.pending.begin_refresh());
        Some(self.enqueue(Work::Refresh))
    }

    /// Load the persisted cart at startup.
    pub fn load_initial(&self) -> Option<Settlement> {
        self.refresh()
    }

    fn dispatch(&self, intent: Intent) -> Option<Settlement> {
        if intent.requires_cart() && self.inner.store.cart_id().is_none() {
            debug!(?intent, "no cart, intent dropped");
            return None;
        }

        let key = intent.pending_key();
        let opens_panel = !intent.requires_cart();
        let accepted = self.inner.store.update(|s| {
            if !s.pending.begin(key) {
                return false;
            }
            if opens_panel {
                s.is_open = true;
            }
            true
        });
        if !accepted {
            debug!(?intent, "duplicate intent dropped while in flight");
            return None;
        }

        Some(self.enqueue(Work::Intent(intent)))
    }

    // =========================================================================
    // Queue
    // =========================================================================

    fn enqueue(&self, work: Work) -> Settlement {
        self.start_worker();

        let (done, settlement) = oneshot::channel();
        if let Err(mpsc::error::SendError(job)) = self.inner.jobs.send(Job { work, done }) {
            warn!(work = ?job.work, "cart sync worker is gone, exchange dropped");
        }
        settlement
    }

    /// Spawn the worker on first use so `new` works outside a runtime.
    fn start_worker(&self) {
        let Some(mut jobs) = self
            .inner
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(job) = jobs.recv().await {
                let Some(sync) = upgrade(&inner) else {
                    break;
                };
                let outcome = sync.run(job.work).await;
                // The caller may have dropped its settlement.
                let _ = job.done.send(outcome);
            }
            debug!("cart sync worker stopped");
        });
    }

    async fn run(&self, work: Work) -> Outcome {
        match work {
            Work::Intent(intent) => self.run_intent(intent).await,
            Work::Refresh => self.run_refresh().await,
        }
    }

    // =========================================================================
    // Exchanges
    // =========================================================================

    #[instrument(skip(self))]
    async fn run_intent(&self, intent: Intent) -> Outcome {
        // Planned at the head of the queue so a preceding create is visible.
        let cart_id = self.inner.store.load_cart_id().await;
        let cart = self.inner.store.snapshot().cart;
        let payload = match dispatcher::plan(&intent, cart_id.as_ref(), cart.as_ref()) {
            Some(mutation) => {
                debug!(action = %mutation.action(), "submitting cart mutation");
                fold(self.inner.api.submit(&mutation).await)
            }
            None => CartPayload::empty(),
        };

        self.settle(&Exchange::Intent(intent.pending_key()), payload).await
    }

    #[instrument(skip(self))]
    async fn run_refresh(&self) -> Outcome {
        // The ID may have been replaced or evicted while queued.
        let payload = match self.inner.store.load_cart_id().await {
            Some(cart_id) => fold(self.inner.api.fetch(&cart_id).await),
            None => CartPayload::empty(),
        };

        self.settle(&Exchange::Refresh, payload).await
    }

    /// Persist first, then publish, so a subscriber never sees a snapshot
    /// ahead of storage.
    async fn settle(&self, exchange: &Exchange, payload: CartPayload) -> Outcome {
        self.inner
            .store
            .persist(Persist::for_payload(&payload))
            .await;

        let policy = self.inner.policy;
        self.inner.store.update(|s| {
            let outcome = reconciler::reconcile(&mut s.cart, payload);
            s.pending.settle(exchange, policy);
            outcome
        })
    }
}

fn upgrade(inner: &Weak<CartSyncInner>) -> Option<CartSync> {
    inner.upgrade().map(|inner| CartSync { inner })
}

impl std::fmt::Debug for CartSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSync")
            .field("store", &self.inner.store)
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

/// Fold transport failures into a failed payload.
fn fold(result: Result<CartPayload, TransportError>) -> CartPayload {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "cart request failed in transport");
        CartPayload::failure(e.to_string())
    })
}
