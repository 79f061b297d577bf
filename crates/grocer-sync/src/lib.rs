//! # grocer-sync: Local State for Grocer
//!
//! Keeps decoded copies of store tables in step with the store, and records
//! writes that have not (yet) landed.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   TableStore ──change event──► subscribe task ──fetch_all──► Snapshot   │
//! │       ▲                                                       │         │
//! │       │ save/remove → revision                                ▼         │
//! │   Storefront ◄──── wait_for(revision) ────────────── TableMirror<T>     │
//! │       │                                                                 │
//! │       └── begin / succeed / fail ──► SyncTracker ──► sync issues        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`mirror`] - Revision-guarded table mirrors
//! - [`tracker`] - Pending and failed writes per entity
//! - [`config`] - Process settings (backend, timeouts)
//! - [`error`] - Sync error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod mirror;
pub mod tracker;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{Backend, SessionSettings, StoreSettings, StorefrontSettings};
pub use error::{SyncError, SyncResult};
pub use mirror::{RowOrder, TableMirror};
pub use tracker::{SyncIssue, SyncState, SyncTracker, WriteOperation};
