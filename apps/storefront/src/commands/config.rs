//! # Delivery Policy Operations
//!
//! Admin edits to the single `main_config` row.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current config (mirror, or defaults) ──► apply change ──► validate     │
//! │                                                               │         │
//! │                          Err(VALIDATION_ERROR) ◄── invalid ───┤         │
//! │                                                               ▼         │
//! │                                                   save whole row        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write stores the complete config, so concurrent admin edits are
//! last-writer-wins.

use tracing::info;

use grocer_core::validation::{validate_edit_window, validate_street_charge, validate_timing};
use grocer_core::{
    street_key, AppConfig, AppConfigPatch, Sector, SectorTiming, ValidationError, ZoneGroup,
    CONFIG_ROW_ID,
};

use crate::error::ApiResult;
use crate::storefront::{Storefront, WriteStatus};

fn validate_config(config: &AppConfig) -> Result<(), ValidationError> {
    validate_edit_window(config.edit_window_seconds)?;
    for timing in config.delivery_timings.values() {
        validate_timing(timing)?;
    }
    for charge in config.street_charges.values() {
        validate_street_charge(*charge)?;
    }
    if config.logo.trim().is_empty() {
        return Err(ValidationError::required("logo"));
    }
    Ok(())
}

impl Storefront {
    async fn save_config(&self, config: &AppConfig) -> ApiResult<WriteStatus> {
        validate_config(config)?;
        Ok(self.persist(&self.config, CONFIG_ROW_ID, config).await)
    }

    /// Replaces every field the patch sets.
    pub async fn update_config(&self, patch: AppConfigPatch) -> ApiResult<WriteStatus> {
        let config = self.config().merged(patch);
        info!("Updating config");
        self.save_config(&config).await
    }

    /// Pins the base charge for one street of one sector.
    pub async fn set_street_charge(
        &self,
        sector: &Sector,
        street_number: &str,
        charge: i64,
    ) -> ApiResult<WriteStatus> {
        let street_number = street_number.trim();
        if street_number.is_empty() {
            return Err(ValidationError::required("streetNumber").into());
        }
        validate_street_charge(charge)?;

        let key = street_key(sector, street_number);
        let mut config = self.config();
        config.street_charges.insert(key.clone(), charge);

        info!(key = %key, charge, "Setting street charge");
        self.save_config(&config).await
    }

    /// Drops a street override by its `"{sector}|{street}"` key.
    pub async fn remove_street_charge(&self, key: &str) -> WriteStatus {
        let mut config = self.config();
        if config.street_charges.remove(key).is_none() {
            return WriteStatus::Skipped;
        }

        info!(key, "Removing street charge");
        self.persist(&self.config, CONFIG_ROW_ID, &config).await
    }

    pub async fn update_timing(&self, group: ZoneGroup, timing: SectorTiming) -> ApiResult<WriteStatus> {
        validate_timing(&timing)?;

        let mut config = self.config();
        config.delivery_timings.insert(group.key().to_string(), timing);

        info!(group = %group, base_charge = timing.base_charge, "Updating delivery timing");
        self.save_config(&config).await
    }

    /// Sets the post-checkout edit window. Orders already placed keep the
    /// window they were placed with.
    pub async fn set_edit_window(&self, seconds: i64) -> ApiResult<WriteStatus> {
        validate_edit_window(seconds)?;

        let mut config = self.config();
        config.edit_window_seconds = seconds;

        info!(seconds, "Setting edit window");
        self.save_config(&config).await
    }

    pub async fn set_logo(&self, logo: &str) -> ApiResult<WriteStatus> {
        let mut config = self.config();
        config.logo = logo.trim().to_string();
        self.save_config(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{item, signed_in_customer};
    use crate::error::ErrorCode;
    use grocer_core::Money;

    #[tokio::test]
    async fn test_defaults_until_saved() {
        let h = signed_in_customer().await;
        assert_eq!(h.storefront.config(), AppConfig::default());
        assert_eq!(h.storefront.remove_street_charge("Sector 1|5").await, WriteStatus::Skipped);
    }

    #[tokio::test]
    async fn test_street_charge_overrides_zone() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        sf.add_to_basket(&item("a", 100, "per piece"), 1).unwrap();

        let status = sf.set_street_charge(&Sector::Sector1, " 5 ", 75).await.unwrap();
        assert_eq!(status, WriteStatus::Saved);
        assert_eq!(sf.config().street_charges.get("Sector 1|5"), Some(&75));
        assert_eq!(sf.basket_quote().unwrap().base_charge, Money::from_units(75));

        sf.remove_street_charge("Sector 1|5").await;
        assert_eq!(sf.basket_quote().unwrap().base_charge, Money::from_units(100));
    }

    #[tokio::test]
    async fn test_timing_and_window_validation() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;

        let bad = SectorTiming {
            base_charge: 100,
            base_min: 20,
            base_max: 10,
            threshold: 4,
            additional_per_item: 2,
        };
        let err = sf.update_timing(ZoneGroup::Sector3, bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(sf.set_edit_window(-1).await.is_err());
        assert!(sf.set_logo("  ").await.is_err());
        assert_eq!(sf.config(), AppConfig::default());

        let timing = SectorTiming {
            base_charge: 120,
            base_min: 12,
            base_max: 18,
            threshold: 4,
            additional_per_item: 2,
        };
        sf.update_timing(ZoneGroup::Sectors1And2, timing).await.unwrap();
        sf.set_edit_window(60).await.unwrap();

        let config = sf.config();
        assert_eq!(config.delivery_timings.get("Sectors 1 & 2"), Some(&timing));
        assert_eq!(config.edit_window_seconds, 60);
    }

    #[tokio::test]
    async fn test_new_window_applies_to_next_order() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        sf.set_edit_window(10).await.unwrap();

        sf.add_to_basket(&item("a", 100, "per piece"), 1).unwrap();
        let order = sf.place_order().await.unwrap().order;
        assert_eq!(order.editable_until, Some(order.created_at + 10_000));
    }

    #[tokio::test]
    async fn test_update_config_patch() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;

        let patch = AppConfigPatch {
            logo: Some("https://example.com/logo.png".to_string()),
            ..Default::default()
        };
        sf.update_config(patch).await.unwrap();

        let config = sf.config();
        assert_eq!(config.logo, "https://example.com/logo.png");
        assert_eq!(config.edit_window_seconds, 45);
    }
}
