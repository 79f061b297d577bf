//! # Memory Table Store
//!
//! Process-local [`TableStore`]. Used by tests and by the `memory` backend.
//!
//! `set_available(false)` makes every call fail with
//! [`StoreError::Unavailable`], which is how connectivity loss is simulated.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::table::{with_id, ChangeEvent, Row, Snapshot, Table, TableStore};

/// Buffered change events per table before slow subscribers lag.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct TableData {
    revision: u64,
    rows: BTreeMap<String, Value>,
}

/// In-memory table store.
#[derive(Debug)]
pub struct MemoryTableStore {
    tables: Mutex<HashMap<Table, TableData>>,
    channels: HashMap<Table, broadcast::Sender<ChangeEvent>>,
    available: AtomicBool,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        let channels = Table::ALL
            .iter()
            .map(|&table| (table, broadcast::channel(CHANGE_CHANNEL_CAPACITY).0))
            .collect();

        MemoryTableStore {
            tables: Mutex::new(HashMap::new()),
            channels,
            available: AtomicBool::new(true),
        }
    }

    /// Switches the store on- or offline.
    pub fn set_available(&self, available: bool) {
        debug!(available, "Memory store availability changed");
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut HashMap<Table, TableData>) -> R) -> StoreResult<R> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".to_string()))?;
        Ok(f(&mut tables))
    }

    fn notify(&self, table: Table, revision: u64) {
        if let Some(sender) = self.channels.get(&table) {
            // No receivers is fine
            let _ = sender.send(ChangeEvent { table, revision });
        }
    }
}

impl Default for MemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn fetch_all(&self, table: Table) -> StoreResult<Snapshot> {
        self.ensure_available()?;

        self.with_tables(|tables| match tables.get(&table) {
            Some(data) => Snapshot {
                revision: data.revision,
                rows: data
                    .rows
                    .iter()
                    .map(|(id, data)| Row {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect(),
            },
            None => Snapshot::empty(),
        })
    }

    async fn save(&self, table: Table, id: &str, record: Value) -> StoreResult<u64> {
        self.ensure_available()?;
        let record = with_id(id, record)?;

        let revision = self.with_tables(|tables| {
            let data = tables.entry(table).or_default();
            data.rows.insert(id.to_string(), record);
            data.revision += 1;
            data.revision
        })?;

        debug!(table = %table, id, revision, "Record saved");
        self.notify(table, revision);
        Ok(revision)
    }

    async fn remove(&self, table: Table, id: &str) -> StoreResult<u64> {
        self.ensure_available()?;

        let (revision, removed) = self.with_tables(|tables| {
            let data = tables.entry(table).or_default();
            if data.rows.remove(id).is_some() {
                data.revision += 1;
                (data.revision, true)
            } else {
                (data.revision, false)
            }
        })?;

        if removed {
            debug!(table = %table, id, revision, "Record removed");
            self.notify(table, revision);
        }
        Ok(revision)
    }

    fn changes(&self, table: Table) -> broadcast::Receiver<ChangeEvent> {
        match self.channels.get(&table) {
            Some(sender) => sender.subscribe(),
            // Every table gets a channel in new(); this arm is unreachable
            None => broadcast::channel(1).1,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::subscribe;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_save_and_fetch() {
        let store = MemoryTableStore::new();

        let rev = store.save(Table::Shops, "1", json!({ "name": "Grocery Shop" })).await.unwrap();
        assert_eq!(rev, 1);

        let snapshot = store.fetch_all(Table::Shops).await.unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].data["id"], "1");
        assert_eq!(snapshot.rows[0].data["name"], "Grocery Shop");
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = MemoryTableStore::new();
        store.save(Table::Users, "u1", json!({ "fullName": "A" })).await.unwrap();
        let rev = store.save(Table::Users, "u1", json!({ "fullName": "B" })).await.unwrap();

        let snapshot = store.fetch_all(Table::Users).await.unwrap();
        assert_eq!(rev, 2);
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].data["fullName"], "B");
    }

    #[tokio::test]
    async fn test_remove_missing_does_not_bump_revision() {
        let store = MemoryTableStore::new();
        store.save(Table::Orders, "o1", json!({})).await.unwrap();

        assert_eq!(store.remove(Table::Orders, "nope").await.unwrap(), 1);
        assert_eq!(store.remove(Table::Orders, "o1").await.unwrap(), 2);
        assert!(store.fetch_all(Table::Orders).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_revisions_are_per_table() {
        let store = MemoryTableStore::new();
        store.save(Table::Orders, "o1", json!({})).await.unwrap();
        store.save(Table::Orders, "o2", json!({})).await.unwrap();
        let rev = store.save(Table::Config, "main_config", json!({})).await.unwrap();
        assert_eq!(rev, 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryTableStore::new();
        store.set_available(false);

        assert!(matches!(
            store.save(Table::Users, "u1", json!({})).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.fetch_all(Table::Users).await.is_err());
        assert!(store.remove(Table::Users, "u1").await.is_err());

        store.set_available(true);
        assert!(store.save(Table::Users, "u1", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_and_changes() {
        let store = Arc::new(MemoryTableStore::new());
        store.save(Table::Shops, "1", json!({ "name": "A" })).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = subscribe(store.clone(), Table::Shops, move |snapshot| {
            let _ = tx.send(snapshot);
        });

        let initial = rx.recv().await.unwrap();
        assert_eq!(initial.revision, 1);
        assert_eq!(initial.rows.len(), 1);

        store.save(Table::Shops, "2", json!({ "name": "B" })).await.unwrap();
        let next = rx.recv().await.unwrap();
        assert_eq!(next.revision, 2);
        assert_eq!(next.rows.len(), 2);

        subscription.unsubscribe();
        store.save(Table::Shops, "3", json!({ "name": "C" })).await.unwrap();
        let after = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
        // Either nothing arrives or the sender was dropped with the task
        assert!(!matches!(after, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_subscribe_delivers_empty_snapshot_when_offline() {
        let store = Arc::new(MemoryTableStore::new());
        store.save(Table::Users, "u1", json!({})).await.unwrap();
        store.set_available(false);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = subscribe(store.clone(), Table::Users, move |snapshot| {
            let _ = tx.send(snapshot);
        });

        let initial = rx.recv().await.unwrap();
        assert_eq!(initial, Snapshot::empty());
    }
}
