//! # Sync Tracker
//!
//! Per-entity record of writes that are in flight or have failed.
//!
//! Store writes never fail loudly: the facade reports them as "not saved".
//! This tracker is where that state lives, so the presentation layer can
//! show an indicator next to the affected record.
//!
//! ```text
//! begin(orders, ORD-1, Save)  ──►  Pending
//!        │
//!        ├── succeed ──►  entry removed
//!        └── fail    ──►  Failed { error, retryable }
//!                                  (kept until the next write of the
//!                                   same entity succeeds)
//! ```

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use ts_rs::TS;

use grocer_store::Table;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum WriteOperation {
    Save,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SyncState {
    Pending,
    /// `retryable` is set when the store was unreachable, so sending the
    /// same write again may succeed.
    Failed { error: String, retryable: bool },
}

/// A write the presentation layer should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SyncIssue {
    pub table: String,
    pub id: String,
    pub operation: WriteOperation,
    pub state: SyncState,
}

impl SyncIssue {
    pub fn is_failed(&self) -> bool {
        matches!(self.state, SyncState::Failed { .. })
    }
}

/// Tracks in-flight and failed writes keyed by (table, id).
#[derive(Debug, Default)]
pub struct SyncTracker {
    entries: Mutex<BTreeMap<(Table, String), SyncIssue>>,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<R>(&self, f: impl FnOnce(&mut BTreeMap<(Table, String), SyncIssue>) -> R) -> R {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut entries)
    }

    pub fn begin(&self, table: Table, id: &str, operation: WriteOperation) {
        self.update(|entries| {
            entries.insert(
                (table, id.to_string()),
                SyncIssue {
                    table: table.as_str().to_string(),
                    id: id.to_string(),
                    operation,
                    state: SyncState::Pending,
                },
            );
        });
    }

    pub fn succeed(&self, table: Table, id: &str) {
        self.update(|entries| {
            entries.remove(&(table, id.to_string()));
        });
    }

    pub fn fail(&self, table: Table, id: &str, operation: WriteOperation, error: &SyncError) {
        let retryable = error.is_retryable();
        let error = error.to_string();
        self.update(|entries| {
            entries.insert(
                (table, id.to_string()),
                SyncIssue {
                    table: table.as_str().to_string(),
                    id: id.to_string(),
                    operation,
                    state: SyncState::Failed { error, retryable },
                },
            );
        });
    }

    /// Every pending or failed write, ordered by table then id.
    pub fn issues(&self) -> Vec<SyncIssue> {
        self.update(|entries| entries.values().cloned().collect())
    }

    pub fn issue_for(&self, table: Table, id: &str) -> Option<SyncIssue> {
        self.update(|entries| entries.get(&(table, id.to_string())).cloned())
    }

    pub fn has_failures(&self) -> bool {
        self.update(|entries| entries.values().any(SyncIssue::is_failed))
    }

    /// Forgets failures the user has acknowledged.
    pub fn clear_failures(&self) {
        self.update(|entries| entries.retain(|_, issue| !issue.is_failed()));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_store::StoreError;

    fn offline() -> SyncError {
        SyncError::Store(StoreError::Unavailable("offline".to_string()))
    }

    #[test]
    fn test_success_clears_pending() {
        let tracker = SyncTracker::new();
        tracker.begin(Table::Orders, "ORD-1", WriteOperation::Save);
        assert_eq!(tracker.issues().len(), 1);
        assert_eq!(tracker.issues()[0].state, SyncState::Pending);

        tracker.succeed(Table::Orders, "ORD-1");
        assert!(tracker.issues().is_empty());
    }

    #[test]
    fn test_failure_is_kept_until_next_success() {
        let tracker = SyncTracker::new();
        tracker.begin(Table::Shops, "1", WriteOperation::Remove);
        tracker.fail(Table::Shops, "1", WriteOperation::Remove, &offline());

        assert!(tracker.has_failures());
        let issue = tracker.issue_for(Table::Shops, "1").unwrap();
        assert_eq!(issue.operation, WriteOperation::Remove);
        assert_eq!(
            issue.state,
            SyncState::Failed {
                error: "Store error: Store unavailable: offline".to_string(),
                retryable: true,
            }
        );

        tracker.begin(Table::Shops, "1", WriteOperation::Save);
        tracker.succeed(Table::Shops, "1");
        assert!(!tracker.has_failures());
    }

    #[test]
    fn test_clear_failures_keeps_pending() {
        let tracker = SyncTracker::new();
        tracker.fail(Table::Users, "u1", WriteOperation::Save, &offline());
        tracker.begin(Table::Users, "u2", WriteOperation::Save);

        tracker.clear_failures();
        let issues = tracker.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "u2");
    }

    #[test]
    fn test_issue_serialization() {
        let tracker = SyncTracker::new();
        let rejected = SyncError::Store(StoreError::Serialization("not an object".to_string()));
        tracker.fail(Table::Config, "main_config", WriteOperation::Save, &rejected);

        let value = serde_json::to_value(&tracker.issues()[0]).unwrap();
        assert_eq!(value["table"], "config");
        assert_eq!(value["operation"], "save");
        assert_eq!(value["state"]["state"], "failed");
        assert_eq!(value["state"]["retryable"], false);
        assert!(value["state"]["error"].as_str().unwrap().contains("not an object"));
    }
}
