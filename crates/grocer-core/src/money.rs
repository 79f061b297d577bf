//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices, delivery charges and totals are whole amounts of the smallest │
//! │  currency unit (Rs. 280, Rs. 10 per extra unit, ...).                  │
//! │                                                                         │
//! │  Keeping them as i64 means:                                            │
//! │    • subtotal = Σ price × quantity is exact                            │
//! │    • stored records compare byte-for-byte after a round trip           │
//! │    • no float formatting surprises in the basket summary               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use grocer_core::money::Money;
//!
//! let price = Money::from_units(280);
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.units(), 840);
//! assert_eq!(line.to_string(), "Rs. 840");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Item.price ──► OrderItem.line_total ──► Order.subtotal ─┐
///                                                         ├──► Order.total
/// pricing::base_charge + pricing::service_charge ─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from smallest currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in smallest currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use grocer_core::money::Money;
    ///
    /// let naan = Money::from_units(35);
    /// assert_eq!(naan.multiply_quantity(4).units(), 140);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-Rs. {}", self.0.abs())
        } else {
            write!(f, "Rs. {}", self.0)
        }
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(units)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(100);
        let b = Money::from_units(40);

        assert_eq!((a + b).units(), 140);
        assert_eq!((a - b).units(), 60);

        let mut c = a;
        c += b;
        assert_eq!(c.units(), 140);
    }

    #[test]
    fn test_sum() {
        let total: Money = [280, 550, 320].into_iter().map(Money::from_units).sum();
        assert_eq!(total.units(), 1150);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(200).to_string(), "Rs. 200");
        assert_eq!(Money::from_units(-15).to_string(), "-Rs. 15");
        assert_eq!(Money::zero().to_string(), "Rs. 0");
    }

    #[test]
    fn test_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Money::from_units(140)).unwrap(), "140");
    }
}
