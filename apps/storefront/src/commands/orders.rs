//! # Order Operations
//!
//! Checkout, the customer's edit window, and admin fulfillment.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  place_order ──► PENDING ──► PURCHASING ──► READY_FOR_DELIVERY          │
//! │                     │             │                 │                   │
//! │          modify_order             │ all items       ▼                   │
//! │          (edit window only)       │ collected or  OUT_FOR_DELIVERY      │
//! │                     │             │ unavailable     │                   │
//! │                     ▼             └──── auto ───►   ▼                   │
//! │           order deleted,                          DELIVERED             │
//! │           items back in basket                                          │
//! │                                                                         │
//! │  change_order_status: any status, any time (CANCELLED included)         │
//! │  delete_order:        any status, any time                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use grocer_core::order::{checkout, ItemUpdate};
use grocer_core::{Basket, CoreError, FulfillmentStatus, Order, OrderStatus};

use crate::error::ApiResult;
use crate::state::Countdown;
use crate::storefront::{Storefront, WriteStatus};

/// A freshly placed order and whether it reached the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    pub status: WriteStatus,
}

impl Storefront {
    // =========================================================================
    // Customer
    // =========================================================================

    /// Turns the basket into a PENDING order for the signed-in user.
    ///
    /// Once the store accepts the order the basket is cleared and the
    /// edit-window countdown starts. If the write fails the basket is kept
    /// so the customer can try again.
    ///
    /// ## Errors
    /// - `NOT_SIGNED_IN` without a current user
    /// - `BASKET_ERROR` for an empty basket
    pub async fn place_order(&self) -> ApiResult<PlacedOrder> {
        let user = self.require_user()?;
        let config = self.config();
        let basket = self.state.basket().snapshot();

        let order = checkout(&user, &basket, &config, self.clock.now_ms())?;
        info!(
            order_id = %order.id,
            customer_id = %user.id,
            total = order.total,
            eta = order.estimated_delivery_time.as_deref().unwrap_or(""),
            "Placing order"
        );

        let status = self.persist(&self.orders, &order.id, &order).await;
        if status.is_saved() {
            self.state.basket().with_basket_mut(Basket::clear);
            self.state.set_countdown(Some(Countdown::start(
                &order,
                self.clock.clone(),
                self.countdown_tick,
            )));
        }

        Ok(PlacedOrder { order, status })
    }

    /// Cancels a PENDING order inside its edit window and puts its items
    /// back in the basket, replacing whatever was there.
    ///
    /// Editability is checked against the clock now, not against the
    /// countdown display. The basket is only restored once the order is
    /// gone from the store.
    ///
    /// ## Errors
    /// - `NOT_SIGNED_IN` without a current user
    /// - `NOT_EDITABLE` when the window has closed, the order has left
    ///   PENDING, or it belongs to someone else
    pub async fn modify_order(&self, order_id: &str) -> ApiResult<WriteStatus> {
        let user = self.require_user()?;
        let Some(order) = self.order(order_id) else {
            debug!(order_id, "modify_order: unknown order");
            return Ok(WriteStatus::Skipped);
        };

        if order.customer_id != user.id {
            return Err(CoreError::OrderNotEditable {
                order_id: order.id,
            }
            .into());
        }

        let basket = order.restore_basket(self.clock.now_ms())?;
        let status = self.erase(&self.orders, order_id).await;
        if status.is_saved() {
            info!(order_id, lines = basket.distinct_count(), "Order returned to basket");
            self.state.basket().replace(basket);
            self.state.stop_countdown_for(order_id);
        }

        Ok(status)
    }

    /// Whole seconds left to modify an order; 0 for unknown or closed
    /// orders.
    pub fn edit_seconds_remaining(&self, order_id: &str) -> i64 {
        self.order(order_id)
            .map(|order| order.seconds_remaining(self.clock.now_ms()))
            .unwrap_or(0)
    }

    /// Countdown of the most recently placed order, if one is running.
    pub fn edit_countdown(&self) -> Option<watch::Receiver<i64>> {
        self.state
            .with_countdown(|countdown| countdown.map(Countdown::subscribe))
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Records the fulfillment outcome of one line.
    ///
    /// Setting a line to the status it already has writes nothing. When the
    /// order is PURCHASING and no line is left pending, it moves to
    /// READY_FOR_DELIVERY in the same write.
    ///
    /// ## Errors
    /// - `ITEMS_LOCKED` unless the order is PENDING or PURCHASING
    pub async fn update_item_status(
        &self,
        order_id: &str,
        item_id: &str,
        status: FulfillmentStatus,
    ) -> ApiResult<WriteStatus> {
        let Some(mut order) = self.order(order_id) else {
            debug!(order_id, "update_item_status: unknown order");
            return Ok(WriteStatus::Skipped);
        };

        match order.mark_item(item_id, status)? {
            ItemUpdate::NotFound => {
                debug!(order_id, item_id, "update_item_status: unknown item");
                Ok(WriteStatus::Skipped)
            }
            ItemUpdate::Unchanged => Ok(WriteStatus::Skipped),
            ItemUpdate::Updated { auto_advanced } => {
                if auto_advanced {
                    info!(order_id, "All items processed, order ready for delivery");
                }
                Ok(self.persist(&self.orders, order_id, &order).await)
            }
        }
    }

    /// Sets an order's status. No transition rules apply.
    pub async fn change_order_status(&self, order_id: &str, status: OrderStatus) -> WriteStatus {
        let Some(mut order) = self.order(order_id) else {
            debug!(order_id, "change_order_status: unknown order");
            return WriteStatus::Skipped;
        };
        if order.status == status {
            return WriteStatus::Skipped;
        }

        info!(order_id, from = %order.status, to = %status, "Order status changed");
        order.set_status(status);
        self.persist(&self.orders, order_id, &order).await
    }

    /// Hard-deletes an order at any status.
    pub async fn delete_order(&self, order_id: &str) -> WriteStatus {
        if self.order(order_id).is_none() {
            debug!(order_id, "delete_order: unknown order");
            return WriteStatus::Skipped;
        }

        let status = self.erase(&self.orders, order_id).await;
        if status.is_saved() {
            self.state.stop_countdown_for(order_id);
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{item, signed_in_customer, Harness};
    use crate::error::ErrorCode;
    use grocer_sync::SyncState;

    async fn place_three_lines(h: &Harness) -> Order {
        let sf = &h.storefront;
        sf.add_to_basket(&item("a", 100, "per piece"), 2).unwrap();
        sf.add_to_basket(&item("b", 50, "per dozen"), 2).unwrap();
        sf.add_to_basket(&item("c", 30, "per pack"), 1).unwrap();

        let placed = sf.place_order().await.unwrap();
        assert_eq!(placed.status, WriteStatus::Saved);
        placed.order
    }

    #[tokio::test]
    async fn test_place_order() {
        let h = signed_in_customer().await;
        let order = place_three_lines(&h).await;

        assert_eq!(order.subtotal, 330);
        assert_eq!(order.delivery_charges, 140);
        assert_eq!(order.total, 470);
        assert_eq!(order.estimated_delivery_time.as_deref(), Some("10-15 mins"));
        assert!(order.items.iter().all(|i| i.status == FulfillmentStatus::Pending));

        let sf = &h.storefront;
        assert!(sf.basket().lines.is_empty());
        assert_eq!(sf.orders().len(), 1);
        assert_eq!(sf.edit_seconds_remaining(&order.id), 45);
        assert!(sf.edit_countdown().is_some());
    }

    #[tokio::test]
    async fn test_empty_basket_is_rejected() {
        let h = signed_in_customer().await;
        let err = h.storefront.place_order().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BasketError);
        assert!(h.storefront.orders().is_empty());
    }

    #[tokio::test]
    async fn test_modify_restores_identical_basket() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        sf.add_to_basket(&item("a", 100, "per piece"), 2).unwrap();
        sf.add_to_basket(&item("b", 50, "per dozen"), 3).unwrap();
        let before = sf.basket();

        let order = sf.place_order().await.unwrap().order;
        h.clock.advance_secs(44);

        assert_eq!(sf.modify_order(&order.id).await.unwrap(), WriteStatus::Saved);
        assert_eq!(sf.basket(), before);
        assert!(sf.order(&order.id).is_none());
        assert!(sf.edit_countdown().is_none());
    }

    #[tokio::test]
    async fn test_modify_after_window_is_rejected() {
        let h = signed_in_customer().await;
        let order = place_three_lines(&h).await;
        h.clock.advance_secs(46);

        let err = h.storefront.modify_order(&order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotEditable);
        assert!(h.storefront.order(&order.id).is_some());
        assert_eq!(h.storefront.edit_seconds_remaining(&order.id), 0);
    }

    #[tokio::test]
    async fn test_modify_after_purchasing_started_is_rejected() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        let order = place_three_lines(&h).await;

        sf.change_order_status(&order.id, OrderStatus::Purchasing).await;
        let err = sf.modify_order(&order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotEditable);
    }

    #[tokio::test]
    async fn test_collected_twice_is_a_no_op() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        let order = place_three_lines(&h).await;

        let first = sf
            .update_item_status(&order.id, "a", FulfillmentStatus::Collected)
            .await
            .unwrap();
        assert_eq!(first, WriteStatus::Saved);
        let after_first = sf.order(&order.id).unwrap();

        let second = sf
            .update_item_status(&order.id, "a", FulfillmentStatus::Collected)
            .await
            .unwrap();
        assert_eq!(second, WriteStatus::Skipped);
        assert_eq!(sf.order(&order.id).unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_auto_advance_only_from_purchasing() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;

        // PENDING: every line processed, status stays
        let pending = place_three_lines(&h).await;
        for id in ["a", "b", "c"] {
            sf.update_item_status(&pending.id, id, FulfillmentStatus::Collected)
                .await
                .unwrap();
        }
        assert_eq!(sf.order(&pending.id).unwrap().status, OrderStatus::Pending);

        // PURCHASING: last processed line advances the order
        let purchasing = place_three_lines(&h).await;
        sf.change_order_status(&purchasing.id, OrderStatus::Purchasing).await;
        sf.update_item_status(&purchasing.id, "a", FulfillmentStatus::Collected)
            .await
            .unwrap();
        sf.update_item_status(&purchasing.id, "b", FulfillmentStatus::Unavailable)
            .await
            .unwrap();
        assert_eq!(sf.order(&purchasing.id).unwrap().status, OrderStatus::Purchasing);

        sf.update_item_status(&purchasing.id, "c", FulfillmentStatus::Collected)
            .await
            .unwrap();
        assert_eq!(
            sf.order(&purchasing.id).unwrap().status,
            OrderStatus::ReadyForDelivery
        );

        let err = sf
            .update_item_status(&purchasing.id, "c", FulfillmentStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ItemsLocked);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_skipped() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        let order = place_three_lines(&h).await;

        assert_eq!(
            sf.update_item_status(&order.id, "zzz", FulfillmentStatus::Collected)
                .await
                .unwrap(),
            WriteStatus::Skipped
        );
        assert_eq!(
            sf.update_item_status("ORD-missing", "a", FulfillmentStatus::Collected)
                .await
                .unwrap(),
            WriteStatus::Skipped
        );
        assert_eq!(sf.delete_order("ORD-missing").await, WriteStatus::Skipped);
        assert_eq!(
            sf.change_order_status("ORD-missing", OrderStatus::Delivered).await,
            WriteStatus::Skipped
        );
    }

    #[tokio::test]
    async fn test_admin_status_and_delete() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        let order = place_three_lines(&h).await;

        // Open setter: straight to DELIVERED, then back to PENDING
        sf.change_order_status(&order.id, OrderStatus::Delivered).await;
        sf.change_order_status(&order.id, OrderStatus::Pending).await;
        assert_eq!(sf.order(&order.id).unwrap().status, OrderStatus::Pending);

        assert_eq!(sf.delete_order(&order.id).await, WriteStatus::Saved);
        assert!(sf.orders().is_empty());
    }

    #[tokio::test]
    async fn test_orders_newest_first() {
        let h = signed_in_customer().await;
        let first = place_three_lines(&h).await;
        h.clock.advance_secs(60);
        let second = place_three_lines(&h).await;

        let ids: Vec<String> = h.storefront.orders().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id.clone()]);

        let customer = h.storefront.current_user().unwrap();
        assert_eq!(h.storefront.orders_for(&customer.id).len(), 2);
        assert!(h.storefront.orders_for("someone-else").is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_is_reported_not_thrown() {
        let h = signed_in_customer().await;
        let sf = &h.storefront;
        sf.add_to_basket(&item("a", 100, "per piece"), 1).unwrap();

        h.store.set_available(false);
        let placed = sf.place_order().await.unwrap();

        assert_eq!(placed.status, WriteStatus::NotSaved);
        assert!(sf.orders().is_empty());
        assert_eq!(sf.basket().total_quantity, 1);
        assert!(!sf.is_syncing());

        let issues = sf.sync_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].table, "orders");
        assert_eq!(issues[0].id, placed.order.id);
        assert!(matches!(
            issues[0].state,
            SyncState::Failed { retryable: true, .. }
        ));

        h.store.set_available(true);
        sf.dismiss_sync_failures();
        assert!(sf.sync_issues().is_empty());
    }
}
