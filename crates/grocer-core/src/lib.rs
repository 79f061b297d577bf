//! # grocer-core: Pure Business Logic for Grocer
//!
//! Everything the storefront decides, with no I/O: delivery pricing, the
//! basket, the order lifecycle and catalog rules.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Grocer Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront facade (apps/storefront)             │   │
//! │  │    login ──► add_to_basket ──► place_order ──► modify_order    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ grocer-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ pricing  │ │  basket  │ │  order   │ │ catalog  │          │   │
//! │  │   │ charge   │ │  lines   │ │ checkout │ │  units   │          │   │
//! │  │   │ ETA      │ │  totals  │ │ window   │ │  shops   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORE • NO CLOCK • PURE FUNCTIONS                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            grocer-store / grocer-sync (persistence)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Shop, Item, Order, User, AppConfig)
//! - [`money`] - Integer money
//! - [`pricing`] - Delivery charge and ETA
//! - [`basket`] - Pre-checkout basket
//! - [`order`] - Checkout, edit window, fulfillment
//! - [`catalog`] - Unit coupling, shop editing, starter shops
//! - [`validation`] - Form validation rules
//! - [`error`] - Domain error types
//!
//! Time is always passed in as epoch milliseconds; nothing here reads a
//! clock.
//!
//! ## Example Usage
//!
//! ```rust
//! use grocer_core::pricing::{base_charge, service_charge};
//! use grocer_core::{AppConfig, Sector};
//!
//! let config = AppConfig::default();
//! let charge = base_charge(&Sector::Sector1, "5", &config) + service_charge(5);
//! assert_eq!(charge.units(), 140);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::{Basket, BasketLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{DeliveryQuote, DeliveryWindow, ZoneGroup};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Base charge used when neither a street override nor a zone-group charge
/// is configured.
pub const DEFAULT_BASE_CHARGE: i64 = 200;

/// Service charge per unit beyond the first.
pub const SERVICE_CHARGE_PER_EXTRA_UNIT: i64 = 10;

/// Seconds after placement during which a customer may modify an order.
pub const DEFAULT_EDIT_WINDOW_SECONDS: i64 = 45;

/// Logo shown until an admin uploads one.
pub const DEFAULT_LOGO: &str = "https://via.placeholder.com/150?text=Ji+Kya+Chahiye";

/// Row id of the single configuration record.
pub const CONFIG_ROW_ID: &str = "main_config";

/// Prefix of generated order ids.
pub const ORDER_ID_PREFIX: &str = "ORD-";
