//! # Pricing Engine
//!
//! Delivery charge and ETA for an address and a basket.
//!
//! ## Charge Calculation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Delivery Charge                                      │
//! │                                                                         │
//! │  "Sector 1|5" in streetCharges? ──yes──► override (verbatim)           │
//! │          │ no                                 │                         │
//! │          ▼                                    │                         │
//! │  zone group of sector                         │                         │
//! │  deliveryTimings[group].baseCharge            │                         │
//! │  (missing → 200)                              │                         │
//! │          │                                    │                         │
//! │          └──────────────► base charge ◄───────┘                         │
//! │                               +                                         │
//! │  service charge = (total quantity − 1) × 10, never below 0             │
//! │                               =                                         │
//! │                      deliveryCharges                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## ETA Calculation
//! The window starts at the group's `baseMin-baseMax`. Every *distinct* item
//! beyond `threshold` adds `additionalPerItem` minutes to both bounds. The
//! charge counts summed quantity while the ETA counts product lines; the two
//! must not be unified.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::basket::Basket;
use crate::money::Money;
use crate::types::{street_key, Address, AppConfig, Sector, SectorTiming};
use crate::{DEFAULT_BASE_CHARGE, SERVICE_CHARGE_PER_EXTRA_UNIT};

// =============================================================================
// Zone Groups
// =============================================================================

/// A named bucket of sectors sharing one delivery policy.
///
/// The sector → group mapping is fixed policy; only each group's timing is
/// admin-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneGroup {
    Sectors1And2,
    Sector3,
    Sector4,
    Vip,
}

impl ZoneGroup {
    pub const ALL: [ZoneGroup; 4] = [
        ZoneGroup::Sectors1And2,
        ZoneGroup::Sector3,
        ZoneGroup::Sector4,
        ZoneGroup::Vip,
    ];

    /// Key of this group in `AppConfig::delivery_timings`.
    pub const fn key(&self) -> &'static str {
        match self {
            ZoneGroup::Sectors1And2 => "Sectors 1 & 2",
            ZoneGroup::Sector3 => "Sector 3",
            ZoneGroup::Sector4 => "Sector 4",
            ZoneGroup::Vip => "VIP Sectors",
        }
    }

    /// Timing shipped with a fresh install, also used when the configured
    /// entry for the group is missing.
    pub const fn default_timing(&self) -> SectorTiming {
        match self {
            ZoneGroup::Sectors1And2 => SectorTiming {
                base_charge: 100,
                base_min: 10,
                base_max: 15,
                threshold: 4,
                additional_per_item: 2,
            },
            ZoneGroup::Sector3 => SectorTiming {
                base_charge: 150,
                base_min: 15,
                base_max: 20,
                threshold: 4,
                additional_per_item: 3,
            },
            ZoneGroup::Sector4 | ZoneGroup::Vip => SectorTiming {
                base_charge: 200,
                base_min: 20,
                base_max: 30,
                threshold: 4,
                additional_per_item: 4,
            },
        }
    }
}

impl fmt::Display for ZoneGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Maps a sector to its zone group. Every sector not listed explicitly,
/// including unknown ones, falls into the VIP group.
pub fn resolve_zone_group(sector: &Sector) -> ZoneGroup {
    match sector {
        Sector::Sector1 | Sector::Sector2 => ZoneGroup::Sectors1And2,
        Sector::Sector3 => ZoneGroup::Sector3,
        Sector::Sector4 => ZoneGroup::Sector4,
        _ => ZoneGroup::Vip,
    }
}

// =============================================================================
// Charges
// =============================================================================

/// Base delivery charge for a destination.
///
/// 1. A street override for `sector|street` wins unconditionally.
/// 2. Otherwise the zone group's `baseCharge`.
/// 3. Missing (or zero) group charge falls back to [`DEFAULT_BASE_CHARGE`].
pub fn base_charge(sector: &Sector, street_number: &str, config: &AppConfig) -> Money {
    if let Some(&charge) = config.street_charges.get(&street_key(sector, street_number)) {
        return Money::from_units(charge);
    }

    let group = resolve_zone_group(sector);
    let charge = config
        .delivery_timings
        .get(group.key())
        .map(|timing| timing.base_charge)
        .filter(|&charge| charge != 0)
        .unwrap_or(DEFAULT_BASE_CHARGE);

    Money::from_units(charge)
}

/// Per-unit handling fee: the first unit is free, every further unit costs
/// [`SERVICE_CHARGE_PER_EXTRA_UNIT`]. `total_quantity` is summed over all
/// basket lines.
///
/// ```rust
/// use grocer_core::pricing::service_charge;
///
/// assert_eq!(service_charge(0).units(), 0);
/// assert_eq!(service_charge(1).units(), 0);
/// assert_eq!(service_charge(5).units(), 40);
/// ```
pub fn service_charge(total_quantity: i64) -> Money {
    if total_quantity <= 1 {
        return Money::zero();
    }
    Money::from_units((total_quantity - 1) * SERVICE_CHARGE_PER_EXTRA_UNIT)
}

// =============================================================================
// Delivery Window
// =============================================================================

/// Estimated delivery time range in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryWindow {
    pub min_minutes: i64,
    pub max_minutes: i64,
}

impl fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} mins", self.min_minutes, self.max_minutes)
    }
}

/// Estimates the delivery window from the number of distinct basket lines.
pub fn estimate_delivery_window(
    sector: &Sector,
    distinct_item_count: usize,
    config: &AppConfig,
) -> DeliveryWindow {
    let group = resolve_zone_group(sector);
    let timing = config
        .delivery_timings
        .get(group.key())
        .copied()
        .unwrap_or_else(|| group.default_timing());

    let count = i64::try_from(distinct_item_count).unwrap_or(i64::MAX);
    let extra = if count > timing.threshold {
        (count - timing.threshold) * timing.additional_per_item
    } else {
        0
    };

    DeliveryWindow {
        min_minutes: timing.base_min + extra,
        max_minutes: timing.base_max + extra,
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Everything the basket summary shows about delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuote {
    pub base_charge: Money,
    pub service_charge: Money,
    /// `base_charge + service_charge`.
    pub delivery_charges: Money,
    pub window: DeliveryWindow,
}

/// Prices delivery of `basket` to `address`.
pub fn quote_delivery(address: &Address, basket: &Basket, config: &AppConfig) -> DeliveryQuote {
    let base = base_charge(&address.sector, &address.street_number, config);
    let service = service_charge(basket.total_quantity());

    DeliveryQuote {
        base_charge: base,
        service_charge: service,
        delivery_charges: base + service,
        window: estimate_delivery_window(&address.sector, basket.distinct_count(), config),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
