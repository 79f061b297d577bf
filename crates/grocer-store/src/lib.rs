//! # grocer-store: Table Store for Grocer
//!
//! Named tables of JSON records keyed by id, with per-table revisions and
//! change notification.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Grocer Data Flow                                 │
//! │                                                                         │
//! │  Storefront facade ── save / remove ──┐                                │
//! │                                        ▼                                │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   grocer-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌──────────────────┐  ┌────────────────┐  │   │
//! │  │   │  TableStore   │  │ MemoryTableStore │  │SqliteTableStore│  │   │
//! │  │   │  (table.rs)   │◄─│   (memory.rs)    │  │  (sqlite.rs)   │  │   │
//! │  │   │  subscribe()  │◄─┼──────────────────┼──│  migrations    │  │   │
//! │  │   └───────┬───────┘  └──────────────────┘  └────────────────┘  │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              │ Snapshot { revision, rows }                              │
//! │              ▼                                                          │
//! │  grocer-sync mirrors (decode + stale guard)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`table`] - `TableStore` trait, records, `subscribe`
//! - [`memory`] - In-process backend
//! - [`sqlite`] - SQLite backend
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grocer_store::{subscribe, MemoryTableStore, Table, TableStore};
//!
//! let store: Arc<dyn TableStore> = Arc::new(MemoryTableStore::new());
//! let subscription = subscribe(store.clone(), Table::Shops, |snapshot| {
//!     println!("{} shops at revision {}", snapshot.rows.len(), snapshot.revision);
//! });
//! store.save(Table::Shops, "1", serde_json::json!({ "name": "Grocery Shop" })).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod table;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use memory::MemoryTableStore;
pub use sqlite::{SqliteConfig, SqliteTableStore};
pub use table::{subscribe, ChangeEvent, Row, Snapshot, Subscription, Table, TableStore};
