//! # Domain Types
//!
//! Core domain types used throughout Grocer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Shop       │   │      Order      │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id  "ORD-…"    │   │  id             │       │
//! │  │  name, type     │   │  customerId     │   │  mobileNumber   │       │
//! │  │  items: Item[]  │   │  items: copies  │   │  address        │       │
//! │  └────────┬────────┘   │  status         │   │  role           │       │
//! │           │            │  editableUntil  │   └─────────────────┘       │
//! │           ▼            └────────┬────────┘                              │
//! │  ┌─────────────────┐            │            ┌─────────────────┐       │
//! │  │      Item       │◄── copy ───┘            │   AppConfig     │       │
//! │  │  price (units)  │   OrderItem =           │  editWindow     │       │
//! │  │  unit/category  │   Item + qty + status   │  deliveryTimings│       │
//! │  └─────────────────┘                         │  streetCharges  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Compatibility
//! Every record is stored as JSON in the external table store, so field names
//! are camelCase and enum values keep their stored spelling (including
//! `"VIP Affilation"`). Timestamps are epoch milliseconds.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::money::Money;
use crate::{DEFAULT_EDIT_WINDOW_SECONDS, DEFAULT_LOGO};

// =============================================================================
// Sector
// =============================================================================

/// Named geographic zone a customer lives in.
///
/// Values outside the known set are kept verbatim in [`Sector::Other`] so a
/// record written by a newer client still round-trips and still prices (via
/// the VIP zone group).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sector {
    Sector1,
    Sector2,
    Sector3,
    Sector4,
    VipProper,
    VipAffiliation,
    VipExtensions,
    Other(String),
}

impl Sector {
    /// All sectors offered at signup, in display order.
    pub const KNOWN: [Sector; 7] = [
        Sector::Sector1,
        Sector::Sector2,
        Sector::Sector3,
        Sector::Sector4,
        Sector::VipProper,
        Sector::VipAffiliation,
        Sector::VipExtensions,
    ];

    /// Stored spelling of the sector.
    pub fn as_str(&self) -> &str {
        match self {
            Sector::Sector1 => "Sector 1",
            Sector::Sector2 => "Sector 2",
            Sector::Sector3 => "Sector 3",
            Sector::Sector4 => "Sector 4",
            Sector::VipProper => "VIP Proper",
            Sector::VipAffiliation => "VIP Affilation",
            Sector::VipExtensions => "VIP Extensions",
            Sector::Other(raw) => raw,
        }
    }

    /// Sector 4 addresses carry a block and lane.
    pub fn uses_block_and_lane(&self) -> bool {
        matches!(self, Sector::Sector4)
    }
}

impl Default for Sector {
    fn default() -> Self {
        Sector::Sector1
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Sector 1" => Sector::Sector1,
            "Sector 2" => Sector::Sector2,
            "Sector 3" => Sector::Sector3,
            "Sector 4" => Sector::Sector4,
            "VIP Proper" => Sector::VipProper,
            "VIP Affilation" => Sector::VipAffiliation,
            "VIP Extensions" => Sector::VipExtensions,
            other => Sector::Other(other.to_string()),
        })
    }
}

impl Serialize for Sector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Infallible: unknown names become Sector::Other
        Ok(raw.parse().unwrap_or_default())
    }
}

/// Blocks offered for Sector 4 addresses.
pub const BLOCKS: [&str; 11] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K"];

/// Highest lane number offered for Sector 4 addresses (lanes start at 1).
pub const MAX_LANE: u32 = 21;

// =============================================================================
// Address
// =============================================================================

/// A delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[ts(type = "string")]
    pub sector: Sector,
    pub house_number: String,
    pub street_number: String,
    /// Sector 4 only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// Sector 4 only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<String>,
}

impl Address {
    /// Key used for per-street charge overrides: `"{sector}|{street}"`.
    pub fn street_key(&self) -> String {
        street_key(&self.sector, &self.street_number)
    }
}

/// Builds the street override key for a sector and street number.
pub fn street_key(sector: &Sector, street_number: &str) -> String {
    format!("{}|{}", sector.as_str(), street_number)
}

// =============================================================================
// Users
// =============================================================================

/// Role of a registered user.
///
/// Only `Admin` and `Customer` are ever assigned; the other two exist in
/// stored records and must deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
    Purchaser,
    Rider,
}

/// A registered user.
///
/// `mobile_number` is the login identifier and is unique across users.
/// `password` is stored and compared as plaintext; see
/// `grocer_storefront::commands::auth` before deploying anywhere real.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    pub address: Address,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Measurement family an item's unit label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum UnitCategory {
    #[serde(rename = "Liquid (ml/L)")]
    Liquid,
    #[serde(rename = "Solid (mg/kg)")]
    Solid,
    #[serde(rename = "Count (pcs/dozen)")]
    Count,
    #[default]
    #[serde(rename = "Other")]
    Other,
}

/// A product sold by a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    /// Price in the smallest currency unit.
    pub price: i64,
    pub unit: String,
    #[serde(default)]
    pub unit_category: UnitCategory,
    #[serde(default)]
    pub image: String,
}

impl Item {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_units(self.price)
    }
}

/// A shop and its ordered item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub shop_type: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

// =============================================================================
// Orders
// =============================================================================

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Purchasing,
    ReadyForDelivery,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Per-item fulfillment may only change in these states.
    pub fn allows_item_updates(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Purchasing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Purchasing => "PURCHASING",
            OrderStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Admin-set outcome for one order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    #[default]
    Pending,
    Collected,
    Unavailable,
}

/// A line of a placed order.
///
/// Uses the snapshot pattern: the item is copied at checkout, so later
/// catalog edits never reach placed orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(flatten)]
    pub item: Item,
    pub quantity: i64,
    #[serde(default)]
    pub status: FulfillmentStatus,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.item.price().multiply_quantity(self.quantity)
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    /// Base delivery charge plus per-unit service charge.
    pub delivery_charges: i64,
    pub total: i64,
    pub status: OrderStatus,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; `None` means the order was never editable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable_until: Option<i64>,
    /// Display string such as `"10-15 mins"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_purchaser_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_rider_id: Option<String>,
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Delivery policy for one zone group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SectorTiming {
    pub base_charge: i64,
    pub base_min: i64,
    pub base_max: i64,
    /// Distinct item count included in the base window.
    pub threshold: i64,
    /// Minutes added per distinct item beyond the threshold.
    pub additional_per_item: i64,
}

/// Process-wide, admin-mutable configuration.
///
/// Persisted as the single row [`crate::CONFIG_ROW_ID`] of the config table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub logo: String,
    #[serde(default = "default_edit_window")]
    pub edit_window_seconds: i64,
    /// Zone-group key → timing.
    #[serde(default)]
    pub delivery_timings: BTreeMap<String, SectorTiming>,
    /// `"{sector}|{street}"` → fixed base charge.
    #[serde(default)]
    pub street_charges: BTreeMap<String, i64>,
}

fn default_edit_window() -> i64 {
    DEFAULT_EDIT_WINDOW_SECONDS
}

impl Default for AppConfig {
    /// Policy shipped with a fresh install.
    fn default() -> Self {
        let delivery_timings = crate::pricing::ZoneGroup::ALL
            .iter()
            .map(|group| (group.key().to_string(), group.default_timing()))
            .collect();

        AppConfig {
            logo: DEFAULT_LOGO.to_string(),
            edit_window_seconds: DEFAULT_EDIT_WINDOW_SECONDS,
            delivery_timings,
            street_charges: BTreeMap::new(),
        }
    }
}

/// Partial update applied by `update_config`; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigPatch {
    pub logo: Option<String>,
    pub edit_window_seconds: Option<i64>,
    pub delivery_timings: Option<BTreeMap<String, SectorTiming>>,
    pub street_charges: Option<BTreeMap<String, i64>>,
}

impl AppConfig {
    /// Returns a copy with every `Some` field of the patch replacing ours.
    pub fn merged(&self, patch: AppConfigPatch) -> AppConfig {
        AppConfig {
            logo: patch.logo.unwrap_or_else(|| self.logo.clone()),
            edit_window_seconds: patch.edit_window_seconds.unwrap_or(self.edit_window_seconds),
            delivery_timings: patch
                .delivery_timings
                .unwrap_or_else(|| self.delivery_timings.clone()),
            street_charges: patch
                .street_charges
                .unwrap_or_else(|| self.street_charges.clone()),
        }
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// Wishlist record, stored under the owning user's id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Wishlist {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Wishlist {
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id == item_id)
    }

    /// Adds the item if absent, removes it if present. Returns whether the
    /// item is now in the wishlist.
    pub fn toggle(&mut self, item: Item) -> bool {
        if self.contains(&item.id) {
            self.items.retain(|i| i.id != item.id);
            false
        } else {
            self.items.push(item);
            true
        }
    }

    /// Removes by id; returns whether anything was removed.
    pub fn remove(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != before
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
