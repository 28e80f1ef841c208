//! # Quantity Module
//!
//! Fixed-point quantities for line items.
//!
//! Goods are counted in pieces but also weighed (`kg`) and measured (`l`),
//! so a quantity must hold fractions exactly. `Quantity` stores thousandths
//! of a unit in an `i64`: `2.5 kg` is `2500`.
//!
//! ```rust
//! use janus_core::quantity::Quantity;
//!
//! let q = Quantity::parse_lenient("2.5");
//! assert_eq!(q.milli(), 2_500);
//! assert_eq!(q.to_string(), "2.5");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::parse_scaled;

/// A quantity in thousandths of a unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Thousandths per whole unit.
    pub const SCALE: i64 = 1_000;

    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * Self::SCALE)
    }

    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Raw value in thousandths.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Parses user-entered text, never failing.
    ///
    /// Rounds to three decimal places. Unparseable text is zero, and so is
    /// anything negative: a quantity field has no meaningful negative value.
    ///
    /// ```rust
    /// use janus_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::parse_lenient("50"), Quantity::from_units(50));
    /// assert_eq!(Quantity::parse_lenient("-3"), Quantity::zero());
    /// assert_eq!(Quantity::parse_lenient("lots"), Quantity::zero());
    /// ```
    pub fn parse_lenient(text: &str) -> Quantity {
        parse_scaled(text, 3)
            .map(|milli| Quantity(milli.max(0)))
            .unwrap_or_default()
    }

    /// Clamps into `[0, ceiling]`.
    ///
    /// A negative ceiling is treated as zero so the result is always a
    /// valid quantity.
    ///
    /// ```rust
    /// use janus_core::quantity::Quantity;
    ///
    /// let ceiling = Quantity::from_units(50);
    /// assert_eq!(Quantity::from_units(999).clamp_to(ceiling), ceiling);
    /// assert_eq!(Quantity::from_units(20).clamp_to(ceiling), Quantity::from_units(20));
    /// ```
    pub fn clamp_to(self, ceiling: Quantity) -> Quantity {
        let ceiling = ceiling.max(Quantity::zero());
        self.max(Quantity::zero()).min(ceiling)
    }
}

/// Shows the shortest exact decimal form: `50`, `2.5`, `0.125`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = (self.0 / Self::SCALE).abs();
        let frac = (self.0 % Self::SCALE).abs();
        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }
        let digits = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Quantity::parse_lenient("2.5").milli(), 2_500);
        assert_eq!(Quantity::parse_lenient("0.0005").milli(), 1);
        assert_eq!(Quantity::parse_lenient("1,000").milli(), 1_000_000);
        assert_eq!(Quantity::parse_lenient("").milli(), 0);
    }

    #[test]
    fn test_parse_out_of_range_is_zero() {
        assert_eq!(Quantity::parse_lenient("100000000000000000000000000"), Quantity::zero());
        assert_eq!(Quantity::parse_lenient("10000000000000000"), Quantity::zero());
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let ceiling = Quantity::from_units(50);
        let once = Quantity::from_units(75).clamp_to(ceiling);
        assert_eq!(once.clamp_to(ceiling), once);

        let inside = Quantity::from_units(10);
        assert_eq!(inside.clamp_to(ceiling), inside);
    }

    #[test]
    fn test_clamp_negative() {
        let ceiling = Quantity::from_units(5);
        assert_eq!(Quantity::from_milli(-1).clamp_to(ceiling), Quantity::zero());
        assert_eq!(
            Quantity::from_units(3).clamp_to(Quantity::from_milli(-10)),
            Quantity::zero()
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_units(50).to_string(), "50");
        assert_eq!(Quantity::from_milli(2_500).to_string(), "2.5");
        assert_eq!(Quantity::from_milli(125).to_string(), "0.125");
    }
}
