//! # Table Store
//!
//! The persistence collaborator every other layer talks to: a set of named
//! tables of JSON records keyed by id, with change notification.
//!
//! ## Subscription Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       subscribe(store, table, handler)                  │
//! │                                                                         │
//! │   changes(table) ──► broadcast::Receiver   (taken first, so no write   │
//! │                                             between fetch and listen   │
//! │                                             is missed)                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   fetch_all(table) ──► handler(snapshot)        initial delivery       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   loop {                                                                │
//! │     ChangeEvent { revision } ──► fetch_all ──► handler(snapshot)       │
//! │   }                                                                     │
//! │                                                                         │
//! │   Subscription::unsubscribe() / drop ──► task aborted                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fetch failures never reach the handler as errors: they are logged and an
//! empty snapshot at revision 0 is delivered instead.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Tables
// =============================================================================

/// The tables the storefront uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Users,
    Shops,
    Orders,
    Config,
    Wishlist,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Users,
        Table::Shops,
        Table::Orders,
        Table::Config,
        Table::Wishlist,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Shops => "shops",
            Table::Orders => "orders",
            Table::Config => "config",
            Table::Wishlist => "wishlist",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// One stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    /// The record, always a JSON object whose `id` equals [`Row::id`].
    pub data: Value,
}

/// Every row of a table as of one revision.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Per-table write counter. 0 means "nothing known", used for the empty
    /// snapshot delivered after a failed fetch.
    pub revision: u64,
    pub rows: Vec<Row>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Snapshot::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Emitted after every successful write to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub revision: u64,
}

/// Forces the record's `id` field to the row key, as an upsert does.
pub(crate) fn with_id(id: &str, mut record: Value) -> StoreResult<Value> {
    match record.as_object_mut() {
        Some(object) => {
            object.insert("id".to_string(), Value::String(id.to_string()));
            Ok(record)
        }
        None => Err(StoreError::Serialization(format!(
            "record {} is not a JSON object",
            id
        ))),
    }
}

// =============================================================================
// TableStore Trait
// =============================================================================

/// A key-value table store with change notification.
///
/// ## Contract
/// - `save` upserts; the stored record's `id` field is forced to `id`
/// - every successful write bumps the table's revision and emits one
///   [`ChangeEvent`] carrying it
/// - removing a missing id succeeds and returns the current revision
/// - writes are not serialized against each other; last writer wins
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Reads every row of a table.
    async fn fetch_all(&self, table: Table) -> StoreResult<Snapshot>;

    /// Upserts a record. Returns the table revision after the write.
    async fn save(&self, table: Table, id: &str, record: Value) -> StoreResult<u64>;

    /// Deletes a record. Returns the table revision after the write.
    async fn remove(&self, table: Table, id: &str) -> StoreResult<u64>;

    /// Change notifications for one table.
    fn changes(&self, table: Table) -> broadcast::Receiver<ChangeEvent>;
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Handle to a running subscription. Dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    table: Table,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn table(&self) -> Table {
        self.table
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops delivery. No handler call starts after this returns.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn fetch_or_empty(store: &dyn TableStore, table: Table) -> Snapshot {
    match store.fetch_all(table).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(table = %table, error = %e, "Fetch failed, delivering empty snapshot");
            Snapshot::empty()
        }
    }
}

/// Delivers the current rows of `table` to `handler` right away and again
/// after every change.
///
/// Must be called inside a Tokio runtime.
pub fn subscribe<F>(store: Arc<dyn TableStore>, table: Table, mut handler: F) -> Subscription
where
    F: FnMut(Snapshot) + Send + 'static,
{
    let mut changes = store.changes(table);

    let handle = tokio::spawn(async move {
        handler(fetch_or_empty(store.as_ref(), table).await);

        loop {
            match changes.recv().await {
                Ok(event) => {
                    debug!(table = %table, revision = event.revision, "Change received");
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Every fetch is a full snapshot, so skipped events need no replay
                    debug!(table = %table, skipped, "Subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
            handler(fetch_or_empty(store.as_ref(), table).await);
        }

        debug!(table = %table, "Subscription ended");
    });

    Subscription { table, handle }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_names() {
        let names: Vec<&str> = Table::ALL.iter().map(Table::as_str).collect();
        assert_eq!(names, vec!["users", "shops", "orders", "config", "wishlist"]);
    }

    #[test]
    fn test_with_id_overrides_record_id() {
        let record = with_id("u1", json!({ "id": "other", "fullName": "A" })).unwrap();
        assert_eq!(record["id"], "u1");
        assert_eq!(record["fullName"], "A");

        let record = with_id("u2", json!({ "fullName": "B" })).unwrap();
        assert_eq!(record["id"], "u2");
    }

    #[test]
    fn test_with_id_rejects_non_objects() {
        assert!(matches!(
            with_id("x", json!([1, 2])),
            Err(StoreError::Serialization(_))
        ));
    }
}
