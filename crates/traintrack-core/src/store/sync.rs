//! Per-entity synchronization state.
//!
//! Every local mutation moves its entity through
//! `Clean -> Pending -> Reconciled | Failed`. Each transition into
//! `Pending` or `Reconciled` is stamped with a revision from a monotonic
//! clock. A load captures the clock when it is issued; when its snapshot
//! is applied, entities with a newer revision keep their local copy.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identifies one cached entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Athlete(i64),
    Group(i64),
    Schedule(i64),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Athlete(id) => write!(f, "athlete #{}", id),
            EntityKey::Group(id) => write!(f, "group #{}", id),
            EntityKey::Schedule(id) => write!(f, "schedule #{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Local copy matches the last applied snapshot.
    #[default]
    Clean,
    /// A request for this entity is in flight.
    Pending,
    /// The server acknowledged the mutation; the local copy holds its
    /// result until the next reload.
    Reconciled,
    /// The request failed. The local copy is left as it was.
    Failed(String),
}

impl SyncState {
    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Clean => "synced",
            SyncState::Pending => "saving...",
            SyncState::Reconciled => "saved",
            SyncState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    state: SyncState,
    revision: u64,
}

#[derive(Debug, Default)]
pub struct SyncLedger {
    clock: u64,
    entries: HashMap<EntityKey, Entry>,
}

impl SyncLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value. Entities stamped after this value are newer
    /// than anything a load issued now can return.
    pub fn checkpoint(&self) -> u64 {
        self.clock
    }

    pub fn state(&self, key: EntityKey) -> SyncState {
        self.entries
            .get(&key)
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    fn stamp(&mut self, key: EntityKey, state: SyncState) -> u64 {
        self.clock += 1;
        let revision = self.clock;
        self.entries.insert(key, Entry { state, revision });
        revision
    }

    /// A request for `key` was sent.
    pub fn mark_pending(&mut self, key: EntityKey) -> u64 {
        self.stamp(key, SyncState::Pending)
    }

    /// The request for `key` succeeded and its result was applied locally.
    /// Also used for entities created by the server, which have no pending
    /// phase on the client.
    pub fn mark_reconciled(&mut self, key: EntityKey) -> u64 {
        self.stamp(key, SyncState::Reconciled)
    }

    /// The request for `key` failed. Keeps the revision of the pending
    /// stamp since the local copy did not change.
    pub fn mark_failed(&mut self, key: EntityKey, reason: impl Into<String>) {
        let reason = reason.into();
        match self.entries.get_mut(&key) {
            Some(entry) => entry.state = SyncState::Failed(reason),
            None => {
                self.stamp(key, SyncState::Failed(reason));
            }
        }
    }

    /// Keys changed locally after `since`, in any state.
    pub fn newer_than(&self, since: u64) -> HashSet<EntityKey> {
        self.entries
            .iter()
            .filter(|(_, e)| e.revision > since)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Forget entries covered by a snapshot issued at `since`. Pending
    /// entries stay until their request completes.
    pub fn settle(&mut self, since: u64) {
        self.entries
            .retain(|_, e| e.revision > since || e.state == SyncState::Pending);
    }

    /// Entities whose last request failed and that no load has replaced yet.
    pub fn failed_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.state, SyncState::Failed(_)))
            .count()
    }
}
