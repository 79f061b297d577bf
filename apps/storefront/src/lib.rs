//! # Grocer Storefront
//!
//! Session and store facade for the Grocer neighborhood grocery storefront.
//! A presentation layer (web, desktop, CLI) drives everything through
//! [`Storefront`].
//!
//! ## Module Organization
//! ```text
//! grocer_storefront/
//! ├── lib.rs          ◄─── You are here (tracing init, store opening)
//! ├── storefront.rs   ◄─── Storefront: mirrors, reads, store writes
//! ├── state/
//! │   ├── session.rs  ◄─── AppState (current user, syncing flag)
//! │   ├── basket.rs   ◄─── BasketState
//! │   ├── countdown.rs◄─── Edit-window countdown
//! │   └── clock.rs    ◄─── Clock, SystemClock, ManualClock
//! ├── commands/       ◄─── Operations, grouped by area
//! └── error.rs        ◄─── ApiError for operations
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! use grocer_storefront::{init_tracing, open_store, Storefront};
//! use grocer_sync::StorefrontSettings;
//!
//! init_tracing();
//! let settings = StorefrontSettings::load_or_default(None);
//! let store = open_store(&settings).await?;
//! let storefront = Storefront::new(store, &settings);
//! storefront.ready(settings.write_ack_timeout()).await;
//! ```

pub mod commands;
pub mod error;
pub mod state;
pub mod storefront;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use grocer_store::{MemoryTableStore, SqliteConfig, SqliteTableStore, StoreError, StoreResult, TableStore};
use grocer_sync::{Backend, StorefrontSettings};

pub use error::{ApiError, ApiResult, ErrorCode};
pub use storefront::{Storefront, WriteStatus};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=grocer_sync=trace` - Trace one crate only
/// - Default: INFO, DEBUG for grocer crates, WARN for sqlx
///
/// Calling it again is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,grocer=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Opens the table store the settings ask for.
///
/// ## Backends
/// - `memory`: process-local, empty on every start
/// - `sqlite`: file at [`StorefrontSettings::database_path`], created along
///   with its directory on first use, migrations applied
pub async fn open_store(settings: &StorefrontSettings) -> StoreResult<Arc<dyn TableStore>> {
    match settings.backend() {
        Backend::Memory => {
            info!("Using in-memory table store");
            Ok(Arc::new(MemoryTableStore::new()))
        }
        Backend::Sqlite => {
            let path = settings.database_path();
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
            }

            info!(?path, "Using SQLite table store");
            let store = SqliteTableStore::connect(SqliteConfig::new(path)).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_store::Table;

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store(&StorefrontSettings::default()).await.unwrap();
        assert_eq!(store.fetch_all(Table::Shops).await.unwrap().revision, 0);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
