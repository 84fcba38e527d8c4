//! # Money Module
//!
//! Integer-cents money used for order line subtotals read from the order
//! store.
//!
//! ## Where Money Meets the Report
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  order_lines.price_subtotal_cents (i64)                                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  Money ── summed per order, per hour (exact, no drift)                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  HourlySales.total (f64, currency units) ← only converted at the edge   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The upstream report engine emits floating-point currency amounts; those
//! stay `f64` in [`crate::report`]. Sums we compute ourselves from raw lines
//! are done in cents and converted once.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Signed: refund lines carry negative subtotals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use zreport_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Converts to major currency units for the report document.
    ///
    /// ## Example
    /// ```rust
    /// use zreport_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1050).to_major(), 10.5);
    /// assert_eq!(Money::from_cents(-550).to_major(), -5.5);
    /// ```
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
