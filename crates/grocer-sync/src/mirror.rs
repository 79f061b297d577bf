//! # Table Mirror
//!
//! Local, decoded copy of one store table, fed by subscription snapshots.
//!
//! ## Snapshot Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    apply(snapshot)                                      │
//! │                                                                         │
//! │  nothing applied yet? ──yes──► replace                                 │
//! │          │ no                                                           │
//! │          ▼                                                              │
//! │  snapshot.revision > applied? ──no──► ignore (stale or duplicate)      │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │  decode every row (undecodable rows skipped with a warning)            │
//! │  sort, replace the whole collection (no merge)                         │
//! │  publish the revision on the watch channel                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read-Your-Writes
//! A writer gets the new revision back from the store and calls
//! [`TableMirror::wait_for`]; it resolves once the subscription has applied
//! that revision (or a later one). Local state is never changed
//! optimistically.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, warn};

use grocer_store::{subscribe, Snapshot, Subscription, Table, TableStore};

/// Comparator applied after every replace.
pub type RowOrder<T> = fn(&T, &T) -> Ordering;

#[derive(Debug)]
struct MirrorState<T> {
    revision: Option<u64>,
    rows: Vec<T>,
}

/// Revision-guarded mirror of one table.
#[derive(Debug)]
pub struct TableMirror<T> {
    table: Table,
    state: RwLock<MirrorState<T>>,
    applied: watch::Sender<Option<u64>>,
    order: Option<RowOrder<T>>,
}

impl<T> TableMirror<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(table: Table) -> Self {
        TableMirror {
            table,
            state: RwLock::new(MirrorState {
                revision: None,
                rows: Vec::new(),
            }),
            applied: watch::channel(None).0,
            order: None,
        }
    }

    /// Keeps rows sorted by `order`.
    pub fn with_order(mut self, order: RowOrder<T>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Applies a snapshot unless it is older than what is already held.
    /// Returns whether the mirror changed.
    pub fn apply(&self, snapshot: Snapshot) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = state.revision {
            if snapshot.revision <= current {
                debug!(
                    table = %self.table,
                    current,
                    incoming = snapshot.revision,
                    "Ignoring stale snapshot"
                );
                return false;
            }
        }

        let total = snapshot.rows.len();
        let mut rows: Vec<T> = snapshot
            .rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<T>(row.data) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(table = %self.table, id = %row.id, error = %e, "Skipping undecodable row");
                    None
                }
            })
            .collect();

        if let Some(order) = self.order {
            rows.sort_by(order);
        }

        debug!(
            table = %self.table,
            revision = snapshot.revision,
            rows = rows.len(),
            skipped = total - rows.len(),
            "Snapshot applied"
        );

        state.revision = Some(snapshot.revision);
        state.rows = rows;
        drop(state);

        self.applied.send_replace(Some(snapshot.revision));
        true
    }

    /// Revision of the last applied snapshot; `None` before the first one.
    pub fn revision(&self) -> Option<u64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .revision
    }

    /// Whether at least one snapshot has arrived.
    pub fn is_loaded(&self) -> bool {
        self.revision().is_some()
    }

    pub fn rows(&self) -> Vec<T> {
        self.read(|rows| rows.to_vec())
    }

    /// Runs `f` against the current rows without cloning them.
    pub fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state.rows)
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.read(|rows| rows.iter().find(|row| predicate(row)).cloned())
    }

    /// Waits until `revision` (or later) has been applied. Returns `false`
    /// on timeout.
    pub async fn wait_for(&self, revision: u64, timeout: Duration) -> bool {
        let mut applied = self.applied.subscribe();
        let reached = applied.wait_for(|current| current.is_some_and(|applied| applied >= revision));

        let outcome = match tokio::time::timeout(timeout, reached).await {
            Ok(Ok(_)) => true,
            Ok(Err(_)) => false,
            Err(_) => {
                debug!(table = %self.table, revision, "Timed out waiting for revision");
                false
            }
        };
        outcome
    }

    /// Waits for the first snapshot. Returns `false` on timeout.
    pub async fn wait_loaded(&self, timeout: Duration) -> bool {
        let mut applied = self.applied.subscribe();
        let loaded = applied.wait_for(Option::is_some);

        let outcome = matches!(tokio::time::timeout(timeout, loaded).await, Ok(Ok(_)));
        outcome
    }

    /// Subscribes the mirror to its table.
    pub fn attach(self: &Arc<Self>, store: Arc<dyn TableStore>) -> Subscription {
        let mirror = Arc::clone(self);
        subscribe(store, self.table, move |snapshot| {
            mirror.apply(snapshot);
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
