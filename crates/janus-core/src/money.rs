//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A document with 40 lines summed in floats drifts by fractions of a    │
//! │  cent, and the persisted net/tax/gross no longer reconcile.             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every line amount is rounded to whole cents ONCE, then all sums     │
//! │    are exact integer additions.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use janus_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//!
//! // User-typed text never fails: garbage becomes zero
//! assert_eq!(Money::parse_lenient("1,250.50").cents(), 125050);
//! assert_eq!(Money::parse_lenient("abc"), Money::zero());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::quantity::Quantity;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (grand total − amount paid) may go
///   negative before they are floored
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Ord**: allocation clamping is plain `min` / `max`
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.unit_price ──► LineItem.amount ──► LineItem.tax_amount        │
/// │                                 │                    │                  │
/// │                                 └──────► LineItem.total_amount          │
/// │                                                 │                       │
/// │  OtherFees.amount ──────────► DocumentTotals.grand_total ──► balance   │
/// │                                                                         │
/// │  Payment.amount_received ──► AllocationEngine ──► Allocation rows      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use janus_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses user-entered text into money, never failing.
    ///
    /// Accepts an optional leading `$`, thousands separators and
    /// surrounding whitespace. Values are rounded half away from zero to
    /// whole cents. Text that does not parse yields zero: a half-typed
    /// field must never block the form.
    ///
    /// ```rust
    /// use janus_core::money::Money;
    ///
    /// assert_eq!(Money::parse_lenient(" $10.005 ").cents(), 1001);
    /// assert_eq!(Money::parse_lenient("").cents(), 0);
    /// assert_eq!(Money::parse_lenient("12.3.4").cents(), 0);
    ///
    /// // Out of range is unparseable too
    /// assert_eq!(Money::parse_lenient("1000000000000000000000000000").cents(), 0);
    /// ```
    pub fn parse_lenient(text: &str) -> Money {
        parse_scaled(text, 2).map(Money).unwrap_or_default()
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Floors the value at zero.
    ///
    /// ```rust
    /// use janus_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-1).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(42).non_negative().cents(), 42);
    /// ```
    #[inline]
    pub fn non_negative(self) -> Money {
        self.max(Money::zero())
    }

    /// Calculates tax at `rate`, rounding half up to whole cents.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use janus_core::money::Money;
    /// use janus_core::types::TaxRate;
    ///
    /// let amount = Money::from_cents(20000); // $200.00
    /// let tax = amount.calculate_tax(TaxRate::from_bps(500)); // 5%
    /// assert_eq!(tax.cents(), 1000); // $10.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large amounts from overflowing
        let tax_cents = round_div(self.0 as i128 * rate.bps() as i128, 10_000);
        Money::from_cents(saturate(tax_cents))
    }

    /// Extends a unit price by a (possibly fractional) quantity.
    ///
    /// The product is rounded half up to whole cents. Whole-unit
    /// quantities are exact. Products beyond the i64 range saturate.
    ///
    /// ```rust
    /// use janus_core::money::Money;
    /// use janus_core::quantity::Quantity;
    ///
    /// let price = Money::from_cents(1000); // $10.00
    /// assert_eq!(price.times(Quantity::from_units(20)).cents(), 20000);
    /// assert_eq!(price.times(Quantity::from_milli(2_500)).cents(), 2500);
    /// ```
    pub fn times(&self, qty: Quantity) -> Money {
        let cents = round_div(
            self.0 as i128 * qty.milli() as i128,
            Quantity::SCALE as i128,
        );
        Money::from_cents(saturate(cents))
    }
}

/// Narrows to i64, pinning out-of-range values at the bounds.
fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Divides rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// Parses decimal text and returns it scaled to `dp` fixed decimal places.
///
/// Shared by [`Money`], [`Quantity`] and [`TaxRate`] so every numeric field
/// on the form tolerates the same input shapes.
pub(crate) fn parse_scaled(text: &str, dp: u32) -> Option<i64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value: Decimal = cleaned.parse().ok()?;
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::from(10_i64.pow(dp)))?
        .to_i64()
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. The form layer formats through
/// the session configuration (currency symbol, decimals).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Integer summation, so totals do not depend on line order.
///
/// Additions saturate at the i64 bounds instead of wrapping.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
