//! Seeds a store with the starter catalog and the default delivery policy.
//!
//! ```text
//! GROCER_BACKEND=sqlite GROCER_DB_PATH=grocer.db cargo run --bin seed
//! ```
//!
//! Existing shops with the same ids are overwritten; the config row is only
//! written when none exists yet.

use std::process::ExitCode;

use tracing::{error, info};

use grocer_core::catalog::starter_shops;
use grocer_core::{AppConfig, CONFIG_ROW_ID};
use grocer_store::{StoreResult, Table, TableStore};
use grocer_storefront::{init_tracing, open_store};
use grocer_sync::StorefrontSettings;

async fn seed(store: &dyn TableStore) -> StoreResult<()> {
    for shop in starter_shops() {
        let record = serde_json::to_value(&shop)?;
        store.save(Table::Shops, &shop.id, record).await?;
        info!(shop_id = %shop.id, name = %shop.name, items = shop.items.len(), "Seeded shop");
    }

    let config = store.fetch_all(Table::Config).await?;
    if config.rows.iter().any(|row| row.id == CONFIG_ROW_ID) {
        info!("Config already present, leaving it");
    } else {
        let record = serde_json::to_value(AppConfig::default())?;
        store.save(Table::Config, CONFIG_ROW_ID, record).await?;
        info!("Seeded default config");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let settings = StorefrontSettings::load_or_default(None);
    info!(backend = %settings.backend(), "Seeding store");

    let store = match open_store(&settings).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Could not open store");
            return ExitCode::FAILURE;
        }
    };

    match seed(store.as_ref()).await {
        Ok(()) => {
            info!(shops = starter_shops().len(), "Seed complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Seed failed");
            ExitCode::FAILURE
        }
    }
}
