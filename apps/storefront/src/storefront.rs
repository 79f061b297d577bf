//! # Storefront Facade
//!
//! The single entry point a presentation layer talks to. Owns the session
//! state, one mirror per store table and the store handle.
//!
//! ## Read / Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  READ   users() / shops() / orders() / config() / wishlist()            │
//! │         └── served from TableMirror<T> (no store round trip)            │
//! │                                                                         │
//! │  WRITE  validate (grocer-core) ──► store.save / store.remove            │
//! │              │ Err                     │ Ok(revision)     │ Err         │
//! │              ▼                         ▼                  ▼             │
//! │         Err(ApiError)         mirror.wait_for(rev)   tracker.fail       │
//! │         nothing written       WriteStatus::Saved     WriteStatus::      │
//! │                                                      NotSaved           │
//! │                                                                         │
//! │  Local state only changes when the store's change notification is       │
//! │  applied to the mirror.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The operations themselves live in [`crate::commands`], grouped by area.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use grocer_core::catalog::starter_shops;
use grocer_core::{AppConfig, Order, Shop, User, Wishlist, CONFIG_ROW_ID};
use grocer_store::{Subscription, Table, TableStore};
use grocer_sync::{
    StorefrontSettings, SyncError, SyncIssue, SyncResult, SyncTracker, TableMirror, WriteOperation,
};

use crate::state::{AppState, Clock, SystemClock};

// =============================================================================
// Write Status
// =============================================================================

/// Outcome of a mutating operation that got past validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteStatus {
    /// The store accepted the write.
    Saved,
    /// The store rejected the write or was unreachable. Local state is
    /// unchanged and the failure is listed in `sync_issues()`.
    NotSaved,
    /// Nothing to write (unknown id, or no change).
    Skipped,
}

impl WriteStatus {
    pub fn is_saved(&self) -> bool {
        *self == WriteStatus::Saved
    }
}

// =============================================================================
// Stored Row Shapes
// =============================================================================

/// A config row; only [`CONFIG_ROW_ID`] is ever read.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConfigRow {
    pub id: String,
    #[serde(flatten)]
    pub config: AppConfig,
}

/// A wishlist row, keyed by the owning user's id.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WishlistRow {
    pub id: String,
    #[serde(flatten)]
    pub wishlist: Wishlist,
}

fn newest_first(a: &Order, b: &Order) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

// =============================================================================
// Storefront
// =============================================================================

pub struct Storefront {
    pub(crate) store: Arc<dyn TableStore>,
    pub(crate) state: AppState,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) tracker: SyncTracker,

    pub(crate) users: Arc<TableMirror<User>>,
    pub(crate) shops: Arc<TableMirror<Shop>>,
    pub(crate) orders: Arc<TableMirror<Order>>,
    pub(crate) config: Arc<TableMirror<ConfigRow>>,
    pub(crate) wishlists: Arc<TableMirror<WishlistRow>>,

    pub(crate) write_ack_timeout: Duration,
    pub(crate) countdown_tick: Duration,

    _subscriptions: Vec<Subscription>,
}

impl fmt::Debug for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("state", &self.state)
            .field("write_ack_timeout", &self.write_ack_timeout)
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Opens a storefront on `store` using the wall clock.
    ///
    /// Must be called inside a Tokio runtime: every table gets a
    /// subscription task right away.
    pub fn new(store: Arc<dyn TableStore>, settings: &StorefrontSettings) -> Self {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn TableStore>,
        settings: &StorefrontSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let users: Arc<TableMirror<User>> = Arc::new(TableMirror::new(Table::Users));
        let shops: Arc<TableMirror<Shop>> = Arc::new(TableMirror::new(Table::Shops));
        let orders: Arc<TableMirror<Order>> =
            Arc::new(TableMirror::new(Table::Orders).with_order(newest_first));
        let config: Arc<TableMirror<ConfigRow>> = Arc::new(TableMirror::new(Table::Config));
        let wishlists: Arc<TableMirror<WishlistRow>> = Arc::new(TableMirror::new(Table::Wishlist));

        let subscriptions = vec![
            users.attach(store.clone()),
            shops.attach(store.clone()),
            orders.attach(store.clone()),
            config.attach(store.clone()),
            wishlists.attach(store.clone()),
        ];

        info!(
            write_ack_timeout_ms = settings.session.write_ack_timeout_ms,
            "Storefront opened"
        );

        Storefront {
            store,
            state: AppState::new(),
            clock,
            tracker: SyncTracker::new(),
            users,
            shops,
            orders,
            config,
            wishlists,
            write_ack_timeout: settings.write_ack_timeout(),
            countdown_tick: settings.countdown_tick(),
            _subscriptions: subscriptions,
        }
    }

    /// Waits until every table has delivered its first snapshot.
    pub async fn ready(&self, timeout: Duration) -> bool {
        let (users, shops, orders, config, wishlists) = tokio::join!(
            self.users.wait_loaded(timeout),
            self.shops.wait_loaded(timeout),
            self.orders.wait_loaded(timeout),
            self.config.wait_loaded(timeout),
            self.wishlists.wait_loaded(timeout),
        );
        users && shops && orders && config && wishlists
    }

    /// Whether every table has delivered its first snapshot.
    pub fn is_loaded(&self) -> bool {
        self.users.is_loaded()
            && self.shops.is_loaded()
            && self.orders.is_loaded()
            && self.config.is_loaded()
            && self.wishlists.is_loaded()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn users(&self) -> Vec<User> {
        self.users.rows()
    }

    /// Shops from the store, or the starter catalog while the table is empty.
    pub fn shops(&self) -> Vec<Shop> {
        let shops = self.shops.rows();
        if shops.is_empty() {
            return starter_shops();
        }
        shops
    }

    /// Every order, newest first.
    pub fn orders(&self) -> Vec<Order> {
        self.orders.rows()
    }

    /// One customer's orders, newest first.
    pub fn orders_for(&self, customer_id: &str) -> Vec<Order> {
        self.orders.read(|orders| {
            orders
                .iter()
                .filter(|order| order.customer_id == customer_id)
                .cloned()
                .collect()
        })
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.orders.find(|order| order.id == order_id)
    }

    /// Stored config, or the defaults until one has been saved.
    pub fn config(&self) -> AppConfig {
        self.config
            .find(|row| row.id == CONFIG_ROW_ID)
            .map(|row| row.config)
            .unwrap_or_default()
    }

    pub fn wishlist(&self, user_id: &str) -> Wishlist {
        self.wishlists
            .find(|row| row.id == user_id)
            .map(|row| row.wishlist)
            .unwrap_or_default()
    }

    /// True while a store write is in flight.
    pub fn is_syncing(&self) -> bool {
        self.state.is_syncing()
    }

    /// Writes that are in flight or did not reach the store.
    pub fn sync_issues(&self) -> Vec<SyncIssue> {
        self.tracker.issues()
    }

    /// Forgets failed writes the user has seen.
    pub fn dismiss_sync_failures(&self) {
        self.tracker.clear_failures();
    }

    // =========================================================================
    // Store Writes
    // =========================================================================

    /// Upserts `record` under `id` and waits for the mirror to catch up.
    pub(crate) async fn persist<T, R>(&self, mirror: &TableMirror<T>, id: &str, record: &R) -> WriteStatus
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
        R: Serialize,
    {
        let table = mirror.table();
        let _syncing = self.state.begin_sync();
        self.tracker.begin(table, id, WriteOperation::Save);

        let result: SyncResult<u64> = match serde_json::to_value(record) {
            Ok(value) => self.store.save(table, id, value).await.map_err(SyncError::from),
            Err(e) => Err(e.into()),
        };

        self.settle(mirror, id, WriteOperation::Save, result).await
    }

    /// Deletes `id` and waits for the mirror to catch up.
    pub(crate) async fn erase<T>(&self, mirror: &TableMirror<T>, id: &str) -> WriteStatus
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let table = mirror.table();
        let _syncing = self.state.begin_sync();
        self.tracker.begin(table, id, WriteOperation::Remove);

        let result = self.store.remove(table, id).await.map_err(SyncError::from);
        self.settle(mirror, id, WriteOperation::Remove, result).await
    }

    async fn settle<T>(
        &self,
        mirror: &TableMirror<T>,
        id: &str,
        operation: WriteOperation,
        result: SyncResult<u64>,
    ) -> WriteStatus
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let table = mirror.table();
        match result {
            Ok(revision) => {
                self.tracker.succeed(table, id);
                if !mirror.wait_for(revision, self.write_ack_timeout).await {
                    let err = SyncError::AckTimeout {
                        table,
                        revision,
                        timeout_ms: self.write_ack_timeout.as_millis() as u64,
                    };
                    warn!(error = %err, id, "Write saved but not yet visible");
                }
                debug!(table = %table, id, ?operation, revision, "Write saved");
                WriteStatus::Saved
            }
            Err(e) => {
                error!(
                    table = %table,
                    id,
                    ?operation,
                    retryable = e.is_retryable(),
                    error = %e,
                    "Write failed"
                );
                self.tracker.fail(table, id, operation, &e);
                WriteStatus::NotSaved
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
