//! # Basket Operations
//!
//! Session-only basket manipulation plus the delivery quote shown under it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BASKET                                            3 lines, qty 5      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Milk (per liter)           x2                      560                 │
//! │  Eggs (per dozen)           x1                      390                 │
//! │  Roghni Naan (per piece)    x2                       80                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  Subtotal                                          1030                 │
//! │  Delivery (base 100 + service 40)                   140                 │
//! │  Estimated: 10-15 mins                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use grocer_core::pricing::quote_delivery;
use grocer_core::{Basket, BasketLine, DeliveryQuote, Item};

use crate::error::ApiResult;
use crate::storefront::Storefront;

/// Basket contents with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketResponse {
    pub lines: Vec<BasketLine>,
    pub subtotal: i64,
    pub total_quantity: i64,
    pub distinct_count: usize,
}

impl From<&Basket> for BasketResponse {
    fn from(basket: &Basket) -> Self {
        BasketResponse {
            lines: basket.lines.clone(),
            subtotal: basket.subtotal().units(),
            total_quantity: basket.total_quantity(),
            distinct_count: basket.distinct_count(),
        }
    }
}

impl Storefront {
    pub fn basket(&self) -> BasketResponse {
        self.state.basket().with_basket(|basket| BasketResponse::from(basket))
    }

    /// Adds `quantity` of an item, merging with an existing line. The item's
    /// price is frozen at this point.
    pub fn add_to_basket(&self, item: &Item, quantity: i64) -> ApiResult<BasketResponse> {
        debug!(item_id = %item.id, quantity, "add_to_basket");
        self.state.basket().with_basket_mut(|basket| -> ApiResult<BasketResponse> {
            basket.add_item(item, quantity)?;
            Ok(BasketResponse::from(&*basket))
        })
    }

    /// Changes a line's quantity by `delta`; a line that reaches zero is
    /// removed.
    pub fn update_basket_quantity(&self, item_id: &str, delta: i64) -> ApiResult<BasketResponse> {
        debug!(item_id, delta, "update_basket_quantity");
        self.state.basket().with_basket_mut(|basket| -> ApiResult<BasketResponse> {
            basket.update_quantity(item_id, delta)?;
            Ok(BasketResponse::from(&*basket))
        })
    }

    pub fn remove_from_basket(&self, item_id: &str) -> ApiResult<BasketResponse> {
        debug!(item_id, "remove_from_basket");
        self.state.basket().with_basket_mut(|basket| -> ApiResult<BasketResponse> {
            basket.remove_item(item_id)?;
            Ok(BasketResponse::from(&*basket))
        })
    }

    pub fn clear_basket(&self) {
        debug!("clear_basket");
        self.state.basket().with_basket_mut(Basket::clear);
    }

    /// Delivery charge and ETA for the current basket at the signed-in
    /// user's address.
    ///
    /// ## Errors
    /// - `NOT_SIGNED_IN` without a current user
    pub fn basket_quote(&self) -> ApiResult<DeliveryQuote> {
        let user = self.require_user()?;
        let config = self.config();
        Ok(self
            .state
            .basket()
            .with_basket(|basket| quote_delivery(&user.address, basket, &config)))
    }
}
