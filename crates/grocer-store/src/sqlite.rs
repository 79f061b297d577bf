//! # SQLite Table Store
//!
//! Durable [`TableStore`] backed by one SQLite file.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  records                               table_revisions                  │
//! │  ┌────────┬──────┬──────────────┐      ┌────────┬──────────┐           │
//! │  │ tbl    │ id   │ data (JSON)  │      │ tbl    │ revision │           │
//! │  ├────────┼──────┼──────────────┤      ├────────┼──────────┤           │
//! │  │ shops  │ 1    │ {"id":"1",…} │      │ shops  │ 4        │           │
//! │  │ orders │ ORD… │ {…}          │      │ orders │ 17       │           │
//! │  └────────┴──────┴──────────────┘      └────────┴──────────┘           │
//! │                                                                         │
//! │  save/remove: one transaction touching both tables, then a             │
//! │  ChangeEvent with the new revision is broadcast.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL is enabled so subscription refetches don't block writers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::table::{with_id, ChangeEvent, Row, Snapshot, Table, TableStore};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

// =============================================================================
// Configuration
// =============================================================================

/// SQLite store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("/path/to/grocer.db").max_connections(4);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// `None` keeps idle connections forever.
    pub idle_timeout: Option<Duration>,

    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// In-memory database for tests.
    ///
    /// A single connection that never idles out, since closing it would
    /// discard the database.
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Store
// =============================================================================

/// SQLite-backed table store.
#[derive(Debug)]
pub struct SqliteTableStore {
    pool: SqlitePool,
    channels: HashMap<Table, broadcast::Sender<ChangeEvent>>,
}

impl SqliteTableStore {
    /// Opens (creating if needed) the database and runs migrations.
    pub async fn connect(config: SqliteConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening SQLite table store"
        );

        let connect_url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(if config.is_in_memory() { None } else { Some(Duration::from_secs(1800)) })
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "SQLite pool created");

        if config.run_migrations {
            migrations::run_migrations(&pool).await?;
        }

        let channels = Table::ALL
            .iter()
            .map(|&table| (table, broadcast::channel(CHANGE_CHANNEL_CAPACITY).0))
            .collect();

        Ok(SqliteTableStore { pool, channels })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        info!("Closing SQLite table store");
        self.pool.close().await;
    }

    fn notify(&self, table: Table, revision: u64) {
        if let Some(sender) = self.channels.get(&table) {
            let _ = sender.send(ChangeEvent { table, revision });
        }
    }
}

fn to_revision(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

#[async_trait]
impl TableStore for SqliteTableStore {
    async fn fetch_all(&self, table: Table) -> StoreResult<Snapshot> {
        // One transaction so rows and revision describe the same state
        let mut tx = self.pool.begin().await?;

        let revision: Option<i64> =
            sqlx::query_scalar("SELECT revision FROM table_revisions WHERE tbl = ?1")
                .bind(table.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let raw_rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, data FROM records WHERE tbl = ?1 ORDER BY id")
                .bind(table.as_str())
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        let rows = raw_rows
            .into_iter()
            .map(|(id, data)| {
                Ok(Row {
                    id,
                    data: serde_json::from_str(&data)?,
                })
            })
            .collect::<StoreResult<Vec<Row>>>()?;

        Ok(Snapshot {
            revision: revision.map(to_revision).unwrap_or(0),
            rows,
        })
    }

    async fn save(&self, table: Table, id: &str, record: Value) -> StoreResult<u64> {
        let record = with_id(id, record)?;
        let data = serde_json::to_string(&record)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO records (tbl, id, data, updated_at)
            VALUES (?1, ?2, ?3, CAST(strftime('%s', 'now') AS INTEGER))
            ON CONFLICT (tbl, id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(table.as_str())
        .bind(id)
        .bind(&data)
        .execute(&mut *tx)
        .await?;

        let revision: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO table_revisions (tbl, revision) VALUES (?1, 1)
            ON CONFLICT (tbl) DO UPDATE SET revision = revision + 1
            RETURNING revision
            "#,
        )
        .bind(table.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let revision = to_revision(revision);
        debug!(table = %table, id, revision, "Record saved");
        self.notify(table, revision);
        Ok(revision)
    }

    async fn remove(&self, table: Table, id: &str) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM records WHERE tbl = ?1 AND id = ?2")
            .bind(table.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let revision: i64 = if deleted > 0 {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO table_revisions (tbl, revision) VALUES (?1, 1)
                ON CONFLICT (tbl) DO UPDATE SET revision = revision + 1
                RETURNING revision
                "#,
            )
            .bind(table.as_str())
            .fetch_one(&mut *tx)
            .await?
        } else {
            sqlx::query_scalar::<_, i64>("SELECT revision FROM table_revisions WHERE tbl = ?1")
                .bind(table.as_str())
                .fetch_optional(&mut *tx)
                .await?
                .unwrap_or(0)
        };

        tx.commit().await?;

        let revision = to_revision(revision);
        if deleted > 0 {
            debug!(table = %table, id, revision, "Record removed");
            self.notify(table, revision);
        }
        Ok(revision)
    }

    fn changes(&self, table: Table) -> broadcast::Receiver<ChangeEvent> {
        match self.channels.get(&table) {
            Some(sender) => sender.subscribe(),
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
    use serde_json::json;

    async fn store() -> SqliteTableStore {
        SqliteTableStore::connect(SqliteConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = store().await;
        assert!(store.health_check().await);

        // Already applied on connect; running again is a no-op
        migrations::run_migrations(store.pool()).await.unwrap();
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_save_fetch_and_upsert() {
        let store = store().await;

        store
            .save(Table::Shops, "1", json!({ "id": "ignored", "name": "Grocery Shop" }))
            .await
            .unwrap();
        let rev = store
            .save(Table::Shops, "1", json!({ "name": "Grocery Store" }))
            .await
            .unwrap();
        assert_eq!(rev, 2);

        let snapshot = store.fetch_all(Table::Shops).await.unwrap();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].data, json!({ "id": "1", "name": "Grocery Store" }));
    }

    #[tokio::test]
    async fn test_remove_and_revision() {
        let store = store().await;
        store.save(Table::Orders, "ORD-1", json!({ "total": 10 })).await.unwrap();

        assert_eq!(store.remove(Table::Orders, "missing").await.unwrap(), 1);
        assert_eq!(store.remove(Table::Orders, "ORD-1").await.unwrap(), 2);

        let snapshot = store.fetch_all(Table::Orders).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.revision, 2);
    }

    #[tokio::test]
    async fn test_empty_table_has_revision_zero() {
        let store = store().await;
        assert_eq!(store.fetch_all(Table::Wishlist).await.unwrap(), Snapshot::empty());
    }

    #[tokio::test]
    async fn test_save_emits_change_event() {
        let store = store().await;
        let mut changes = store.changes(Table::Config);

        store.save(Table::Config, "main_config", json!({})).await.unwrap();

        let event = changes.recv().await.unwrap();
        assert_eq!(event, ChangeEvent { table: Table::Config, revision: 1 });
    }

    #[tokio::test]
    async fn test_tables_are_isolated() {
        let store = store().await;
        store.save(Table::Users, "x", json!({})).await.unwrap();
        store.save(Table::Wishlist, "x", json!({ "items": [] })).await.unwrap();

        assert_eq!(store.fetch_all(Table::Users).await.unwrap().rows.len(), 1);
        assert_eq!(store.fetch_all(Table::Wishlist).await.unwrap().revision, 1);
    }
}
