//! # Basket
//!
//! The customer's pre-checkout basket.
//!
//! ## Basket Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Basket Operations                                    │
//! │                                                                         │
//! │  Customer Action          Facade                  Basket Change         │
//! │  ───────────────          ──────                  ─────────────         │
//! │                                                                         │
//! │  Tap item ───────────────► add_to_basket() ─────► qty += 1 / push      │
//! │                                                                         │
//! │  − / + ──────────────────► update_quantity() ───► qty += delta         │
//! │                                                 (≤ 0 drops the line)   │
//! │                                                                         │
//! │  Remove ─────────────────► remove_from_basket() ► lines.retain(..)     │
//! │                                                                         │
//! │  Place order ────────────► checkout() ──────────► lines.clear()        │
//! │                                                                         │
//! │  Modify order ───────────► restore_basket() ────► lines = order items  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Item, OrderItem};

/// Upper bound on one line's quantity.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// A basket line: a frozen copy of the catalog item plus a quantity.
///
/// The copy is taken when the item is first added, so a later price edit in
/// the catalog does not change what the customer saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BasketLine {
    #[serde(flatten)]
    pub item: Item,
    pub quantity: i64,
}

impl BasketLine {
    pub fn line_total(&self) -> Money {
        self.item.price().multiply_quantity(self.quantity)
    }
}

/// The basket.
///
/// ## Invariants
/// - Lines are unique by item id (adding again increases quantity)
/// - Every line has quantity ≥ 1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Basket {
    pub lines: Vec<BasketLine>,
}

impl Basket {
    pub fn new() -> Self {
        Basket { lines: Vec::new() }
    }

    /// Adds `quantity` of an item, merging with an existing line.
    pub fn add_item(&mut self, item: &Item, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            let new_qty = line.quantity.saturating_add(quantity);
            if new_qty > MAX_LINE_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 1,
                    max: MAX_LINE_QUANTITY,
                }
                .into());
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_LINE_QUANTITY,
            }
            .into());
        }

        self.lines.push(BasketLine {
            item: item.clone(),
            quantity,
        });
        Ok(())
    }

    /// Changes a line's quantity by `delta`. Reaching zero removes the line.
    ///
    /// Returns the new quantity (0 when the line was dropped).
    pub fn update_quantity(&mut self, item_id: &str, delta: i64) -> CoreResult<i64> {
        let index = self
            .lines
            .iter()
            .position(|l| l.item.id == item_id)
            .ok_or_else(|| CoreError::ItemNotInBasket(item_id.to_string()))?;

        let new_qty = self.lines[index]
            .quantity
            .saturating_add(delta)
            .min(MAX_LINE_QUANTITY);
        if new_qty <= 0 {
            self.lines.remove(index);
            return Ok(0);
        }

        self.lines[index].quantity = new_qty;
        Ok(new_qty)
    }

    /// Removes a line by item id.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.item.id != item_id);

        if self.lines.len() == initial_len {
            Err(CoreError::ItemNotInBasket(item_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines; drives the delivery ETA.
    pub fn distinct_count(&self) -> usize {
        self.lines.len()
    }

    /// Summed quantity over all lines; drives the service charge.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(BasketLine::line_total).sum()
    }

    pub fn quantity_of(&self, item_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|l| l.item.id == item_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Rebuilds a basket from placed order lines, dropping fulfillment state.
    pub fn from_order_items(items: &[OrderItem]) -> Self {
        Basket {
            lines: items
                .iter()
                .map(|line| BasketLine {
                    item: line.item.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FulfillmentStatus, UnitCategory};

    fn test_item(id: &str, price: i64) -> Item {
        Item {
            id: id.to_string(),
            shop_id: "1".to_string(),
            name: format!("Item {}", id),
            price,
            unit: "per kg".to_string(),
            unit_category: UnitCategory::Solid,
            image: String::new(),
        }
    }

    #[test]
    fn test_add_item() {
        let mut basket = Basket::new();
        basket.add_item(&test_item("g3", 320), 2).unwrap();

        assert_eq!(basket.distinct_count(), 1);
        assert_eq!(basket.total_quantity(), 2);
        assert_eq!(basket.subtotal().units(), 640);
    }

    #[test]
    fn test_add_same_item_increases_quantity() {
        let mut basket = Basket::new();
        let item = test_item("g1", 280);

        basket.add_item(&item, 1).unwrap();
        basket.add_item(&item, 1).unwrap();

        assert_eq!(basket.distinct_count(), 1);
        assert_eq!(basket.quantity_of("g1"), 2);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut basket = Basket::new();
        let err = basket.add_item(&test_item("g1", 280), 0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(basket.is_empty());
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut basket = Basket::new();
        basket.add_item(&test_item("n1", 25), 2).unwrap();

        assert_eq!(basket.update_quantity("n1", 3).unwrap(), 5);
        assert_eq!(basket.update_quantity("n1", -5).unwrap(), 0);
        assert!(basket.is_empty());
    }

    #[test]
    fn test_update_quantity_extreme_deltas() {
        let mut basket = Basket::new();
        basket.add_item(&test_item("n1", 25), 2).unwrap();
        assert!(basket.add_item(&test_item("n1", 25), i64::MAX).is_err());
        assert_eq!(basket.quantity_of("n1"), 2);

        assert_eq!(basket.update_quantity("n1", i64::MAX).unwrap(), MAX_LINE_QUANTITY);
        assert_eq!(basket.update_quantity("n1", i64::MIN).unwrap(), 0);
        assert!(basket.is_empty());
    }

    #[test]
    fn test_update_quantity_unknown_item() {
        let mut basket = Basket::new();
        let err = basket.update_quantity("missing", 1).unwrap_err();
        assert!(matches!(err, CoreError::ItemNotInBasket(id) if id == "missing"));
    }

    #[test]
    fn test_remove_item() {
        let mut basket = Basket::new();
        basket.add_item(&test_item("a", 10), 1).unwrap();
        basket.add_item(&test_item("b", 10), 1).unwrap();

        basket.remove_item("a").unwrap();
        assert_eq!(basket.distinct_count(), 1);
        assert!(basket.remove_item("a").is_err());
    }

    #[test]
    fn test_from_order_items_keeps_item_fidelity() {
        let item = test_item("m1", 650);
        let lines = vec![OrderItem {
            item: item.clone(),
            quantity: 3,
            status: FulfillmentStatus::Collected,
        }];

        let basket = Basket::from_order_items(&lines);
        assert_eq!(basket.lines[0].item, item);
        assert_eq!(basket.lines[0].quantity, 3);
    }
}
