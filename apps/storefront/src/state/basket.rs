//! # Basket State
//!
//! The signed-in customer's basket. Session-only; never written to the
//! store.
//!
//! ## Basket Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Basket State Operations                              │
//! │                                                                         │
//! │  Customer Action         Storefront Op              Basket Change       │
//! │  ───────────────         ─────────────              ─────────────       │
//! │                                                                         │
//! │  Tap Item ─────────────► add_to_basket() ─────────► line += qty        │
//! │                                                                         │
//! │  +/- Buttons ──────────► update_basket_quantity() ► line += delta      │
//! │                                                     (≤ 0 removes)       │
//! │                                                                         │
//! │  Remove ───────────────► remove_from_basket() ────► line removed       │
//! │                                                                         │
//! │  Place Order ──────────► place_order() ───────────► cleared once saved │
//! │                                                                         │
//! │  Modify Order ─────────► modify_order() ──────────► replaced by the    │
//! │                                                     order's items       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use grocer_core::Basket;

/// Shared handle to the session basket.
#[derive(Debug, Clone, Default)]
pub struct BasketState {
    basket: Arc<Mutex<Basket>>,
}

impl BasketState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the basket.
    pub fn with_basket<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Basket) -> R,
    {
        let basket = self.basket.lock().unwrap_or_else(PoisonError::into_inner);
        f(&basket)
    }

    /// Executes a function with write access to the basket.
    ///
    /// ```rust,ignore
    /// basket_state.with_basket_mut(|basket| basket.add_item(&item, 1))?;
    /// ```
    pub fn with_basket_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Basket) -> R,
    {
        let mut basket = self.basket.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut basket)
    }

    pub fn snapshot(&self) -> Basket {
        self.with_basket(Basket::clone)
    }

    /// Swaps in a whole basket (used when an order is modified).
    pub fn replace(&self, basket: Basket) {
        self.with_basket_mut(|current| *current = basket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_core::{Item, UnitCategory};

    fn naan() -> Item {
        Item {
            id: "i11".to_string(),
            shop_id: "4".to_string(),
            name: "Roghni Naan".to_string(),
            price: 40,
            unit: "per piece".to_string(),
            unit_category: UnitCategory::Count,
            image: String::new(),
        }
    }

    #[test]
    fn test_shared_between_clones() {
        let state = BasketState::new();
        let handle = state.clone();

        handle.with_basket_mut(|b| b.add_item(&naan(), 2)).unwrap();
        assert_eq!(state.with_basket(|b| b.total_quantity()), 2);
    }

    #[test]
    fn test_replace() {
        let state = BasketState::new();
        state.with_basket_mut(|b| b.add_item(&naan(), 1)).unwrap();

        state.replace(Basket::new());
        assert!(state.snapshot().is_empty());
    }
}
