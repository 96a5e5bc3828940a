//! Pending-operation tracking.
//!
//! Each in-flight mutation is keyed by what it targets: an add by its
//! merchandise ID, an update or removal by its line ID. A second intent
//! with the same key is rejected until the first settles, which is what
//! keeps a double-click from issuing two remote requests.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use shopfront_core::{LineId, MerchandiseId};

/// What an in-flight mutation is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PendingKey {
    /// Adding the given variant.
    Add(MerchandiseId),
    /// Changing the quantity of the given line.
    Update(LineId),
    /// Removing the given line.
    Remove(LineId),
}

/// A request that has been issued and will eventually settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// A shopper-initiated mutation.
    Intent(PendingKey),
    /// A read of the current cart.
    Refresh,
}

/// How pending flags are cleared when an exchange settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementPolicy {
    /// Clear only the settled exchange's own entry.
    #[default]
    PerOperation,
    /// Clear every pending entry whenever any exchange settles.
    ClearAll,
}

impl SettlementPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerOperation => "per-operation",
            Self::ClearAll => "clear-all",
        }
    }
}

impl fmt::Display for SettlementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettlementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-operation" => Ok(Self::PerOperation),
            "clear-all" => Ok(Self::ClearAll),
            other => Err(format!(
                "expected 'per-operation' or 'clear-all', got '{other}'"
            )),
        }
    }
}

/// Sets of targets with a mutation in flight, plus outstanding refreshes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingOperations {
    adding: BTreeSet<MerchandiseId>,
    updating: BTreeSet<LineId>,
    removing: BTreeSet<LineId>,
    refreshing: usize,
}

impl PendingOperations {
    /// Mark `key` as in flight.
    ///
    /// Returns `false` without changing anything if it already was.
    pub fn begin(&mut self, key: PendingKey) -> bool {
        match key {
            PendingKey::Add(id) => self.adding.insert(id),
            PendingKey::Update(id) => self.updating.insert(id),
            PendingKey::Remove(id) => self.removing.insert(id),
        }
    }

    /// Record an outstanding refresh.
    pub const fn begin_refresh(&mut self) {
        self.refreshing += 1;
    }

    /// Clear the flags for a settled exchange according to `policy`.
    pub fn settle(&mut self, exchange: &Exchange, policy: SettlementPolicy) {
        match (policy, exchange) {
            (SettlementPolicy::ClearAll, _) => self.clear(),
            (SettlementPolicy::PerOperation, Exchange::Refresh) => {
                self.refreshing = self.refreshing.saturating_sub(1);
            }
            (SettlementPolicy::PerOperation, Exchange::Intent(key)) => {
                match key {
                    PendingKey::Add(id) => self.adding.remove(id),
                    PendingKey::Update(id) => self.updating.remove(id),
                    PendingKey::Remove(id) => self.removing.remove(id),
                };
            }
        }
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.adding.clear();
        self.updating.clear();
        self.removing.clear();
        self.refreshing = 0;
    }

    #[must_use]
    pub fn contains(&self, key: &PendingKey) -> bool {
        match key {
            PendingKey::Add(id) => self.adding.contains(id),
            PendingKey::Update(id) => self.updating.contains(id),
            PendingKey::Remove(id) => self.removing.contains(id),
        }
    }

    #[must_use]
    pub fn is_adding(&self, merchandise_id: &MerchandiseId) -> bool {
        self.adding.contains(merchandise_id)
    }

    #[must_use]
    pub fn is_updating(&self, line_id: &LineId) -> bool {
        self.updating.contains(line_id)
    }

    #[must_use]
    pub fn is_removing(&self, line_id: &LineId) -> bool {
        self.removing.contains(line_id)
    }

    /// Whether any exchange, mutation or refresh, is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.refreshing > 0
            || !self.adding.is_empty()
            || !self.updating.is_empty()
            || !self.removing.is_empty()
    }

    /// Variants currently being added.
    pub fn adding(&self) -> impl Iterator<Item = &MerchandiseId> {
        self.adding.iter()
    }

    /// Lines currently being updated.
    pub fn updating(&self) -> impl Iterator<Item = &LineId> {
        self.updating.iter()
    }

    /// Lines currently being removed.
    pub fn removing(&self) -> impl Iterator<Item = &LineId> {
        self.removing.iter()
    }
}
