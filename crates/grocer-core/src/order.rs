//! # Order Lifecycle
//!
//! Checkout, the post-checkout edit window and per-item fulfillment.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Status Flow                                │
//! │                                                                         │
//! │   checkout()                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────┐  admin  ┌────────────┐  all items  ┌────────────────────┐  │
//! │  │ PENDING │───────►│ PURCHASING │─processed──►│ READY_FOR_DELIVERY │  │
//! │  └────┬────┘        └────────────┘  (auto)     └─────────┬──────────┘  │
//! │       │                                                   │ admin       │
//! │       │ modify (inside window)                            ▼             │
//! │       ▼                                         ┌──────────────────┐    │
//! │   order deleted,                                │ OUT_FOR_DELIVERY │    │
//! │   items back in basket                          └────────┬─────────┘    │
//! │                                                          ▼              │
//! │                                                   ┌───────────┐         │
//! │  CANCELLED (terminal, admin only)                 │ DELIVERED │         │
//! │                                                   └───────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Admin status assignment is an open setter: any status may be set at any
//! time. Only the PURCHASING → READY_FOR_DELIVERY step happens on its own,
//! and only from PURCHASING. Marking every item while still PENDING leaves
//! the order PENDING.

use uuid::Uuid;

use crate::basket::Basket;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::quote_delivery;
use crate::types::{AppConfig, FulfillmentStatus, Order, OrderItem, OrderStatus, User};
use crate::ORDER_ID_PREFIX;

// =============================================================================
// Checkout
// =============================================================================

/// Turns the basket into a new PENDING order for `customer`.
///
/// The basket itself is not touched; clearing it after the order is saved
/// is the caller's job.
///
/// ## Errors
/// - [`CoreError::EmptyBasket`] if there is nothing to order
pub fn checkout(customer: &User, basket: &Basket, config: &AppConfig, now_ms: i64) -> CoreResult<Order> {
    if basket.is_empty() {
        return Err(CoreError::EmptyBasket);
    }

    let items: Vec<OrderItem> = basket
        .lines
        .iter()
        .map(|line| OrderItem {
            item: line.item.clone(),
            quantity: line.quantity,
            status: FulfillmentStatus::Pending,
        })
        .collect();

    let subtotal: Money = items.iter().map(OrderItem::line_total).sum();
    let quote = quote_delivery(&customer.address, basket, config);

    Ok(Order {
        id: format!("{}{}", ORDER_ID_PREFIX, Uuid::new_v4()),
        customer_id: customer.id.clone(),
        items,
        subtotal: subtotal.units(),
        delivery_charges: quote.delivery_charges.units(),
        total: (subtotal + quote.delivery_charges).units(),
        status: OrderStatus::Pending,
        created_at: now_ms,
        editable_until: Some(now_ms + config.edit_window_seconds * 1000),
        estimated_delivery_time: Some(quote.window.to_string()),
        assigned_purchaser_id: None,
        assigned_rider_id: None,
    })
}

// =============================================================================
// Edit Window
// =============================================================================

impl Order {
    /// Whether the customer may still modify the order at `now_ms`.
    ///
    /// Always derived from timestamps; a countdown display is never
    /// authoritative.
    pub fn is_editable(&self, now_ms: i64) -> bool {
        self.status == OrderStatus::Pending
            && self.editable_until.map(|until| now_ms < until).unwrap_or(false)
    }

    /// Whole seconds left in the edit window, rounded up. 0 once closed.
    pub fn seconds_remaining(&self, now_ms: i64) -> i64 {
        if !self.is_editable(now_ms) {
            return 0;
        }
        let remaining_ms = self.editable_until.unwrap_or(now_ms) - now_ms;
        (remaining_ms + 999) / 1000
    }

    /// Basket to restore when the customer modifies the order.
    ///
    /// ## Errors
    /// - [`CoreError::OrderNotEditable`] outside the edit window
    pub fn restore_basket(&self, now_ms: i64) -> CoreResult<Basket> {
        if !self.is_editable(now_ms) {
            return Err(CoreError::OrderNotEditable {
                order_id: self.id.clone(),
            });
        }
        Ok(Basket::from_order_items(&self.items))
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Fulfillment
// =============================================================================

/// Outcome of [`Order::mark_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemUpdate {
    /// No line with that item id.
    NotFound,
    /// The line already had the requested status; nothing to save.
    Unchanged,
    /// The line changed. `auto_advanced` is set when the order moved to
    /// READY_FOR_DELIVERY as a result.
    Updated { auto_advanced: bool },
}

impl ItemUpdate {
    /// Whether the order must be written back.
    pub fn is_modified(&self) -> bool {
        matches!(self, ItemUpdate::Updated { .. })
    }
}

impl Order {
    /// Sets the fulfillment status of one line.
    ///
    /// ## Errors
    /// - [`CoreError::ItemsLocked`] unless the order is PENDING or PURCHASING
    pub fn mark_item(&mut self, item_id: &str, status: FulfillmentStatus) -> CoreResult<ItemUpdate> {
        if !self.status.allows_item_updates() {
            return Err(CoreError::ItemsLocked {
                order_id: self.id.clone(),
                status: self.status,
            });
        }

        let Some(line) = self.items.iter_mut().find(|line| line.item.id == item_id) else {
            return Ok(ItemUpdate::NotFound);
        };

        if line.status == status {
            return Ok(ItemUpdate::Unchanged);
        }
        line.status = status;

        let all_processed = self
            .items
            .iter()
            .all(|line| line.status != FulfillmentStatus::Pending);

        let auto_advanced = all_processed && self.status == OrderStatus::Purchasing;
        if auto_advanced {
            self.status = OrderStatus::ReadyForDelivery;
        }

        Ok(ItemUpdate::Updated { auto_advanced })
    }

    /// Admin status override. Any status, any time.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
