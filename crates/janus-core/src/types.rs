//! # Domain Types
//!
//! Small value types shared by every document kind.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │     LineId      │   │ SourceDocument  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │      Ref        │       │
//! │  │  bps (u32)      │   │  UUID v4        │   │  ─────────────  │       │
//! │  │  500 = 5%       │   │  draft-local    │   │  id + number    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PaymentTerms   │   │ PaymentMethod   │   │   OtherFees     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Net15 .. Net60 │   │  Cash, Check,   │   │  description    │       │
//! │  │  DueOnReceipt   │   │  CreditCard ... │   │  amount (Money) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Documents referenced from another document carry both:
//! - `id`: the store-assigned identifier, used for relations
//! - `number`: the human-readable document number shown on the form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{parse_scaled, Money};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 500 bps = 5%, 825 bps = 8.25%
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole percentage.
    #[inline]
    pub const fn from_percent(pct: u32) -> Self {
        TaxRate(pct * 100)
    }

    /// Parses a percentage typed by the user (`"5"`, `"8.25"`, `"7.5 %"`).
    ///
    /// Never fails: garbage and negative values become zero.
    ///
    /// ```rust
    /// use janus_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::parse_percent_lenient("8.25").bps(), 825);
    /// assert_eq!(TaxRate::parse_percent_lenient("7.5 %").bps(), 750);
    /// assert_eq!(TaxRate::parse_percent_lenient("n/a"), TaxRate::zero());
    /// ```
    pub fn parse_percent_lenient(text: &str) -> Self {
        let text = text.trim().trim_end_matches('%');
        parse_scaled(text, 2)
            .map(|bps| TaxRate(bps.clamp(0, u32::MAX as i64) as u32))
            .unwrap_or_default()
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Draft-local identifier of a line item.
///
/// Assigned when the line is created (authored or imported) and never
/// reused, even after the line is removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineId(String);

impl LineId {
    pub fn new() -> Self {
        LineId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductRef(pub String);

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to the customer or supplier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartyRef(pub String);

impl fmt::Display for PartyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provenance of an imported line: which document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SourceDocumentRef {
    /// Store identifier of the source document.
    pub id: String,
    /// Display number (`PO-2503-001`), frozen at import time.
    pub number: String,
}

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// Product defaults as resolved by the catalog collaborator.
///
/// The engine never looks products up itself; the caller resolves the
/// product and hands these values in as part of a line patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDefaults {
    pub product_ref: ProductRef,
    pub description: String,
    pub default_price: Money,
    pub default_unit: String,
    pub default_tax_rate: TaxRate,
}

// =============================================================================
// Other Fees
// =============================================================================

/// A single document-level fee (shipping, handling).
///
/// Added once to the grand total; never taxed, never per-line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OtherFees {
    pub description: String,
    pub amount: Money,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    CreditCard,
    BankTransfer,
    Other,
}

// =============================================================================
// Payment Terms
// =============================================================================

/// Invoice payment terms.
///
/// ## Due Date Rules
/// ```text
/// ┌───────────────┬──────────────────────────────────────┐
/// │ Terms         │ Due date                             │
/// ├───────────────┼──────────────────────────────────────┤
/// │ DueOnReceipt  │ invoice date                         │
/// │ Net15 .. 60   │ invoice date + N days                │
/// │ Custom        │ entered by the user                  │
/// └───────────────┴──────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    DueOnReceipt,
    Net15,
    #[default]
    Net30,
    Net45,
    Net60,
    Custom,
}

impl PaymentTerms {
    /// Days between invoice date and due date, `None` for custom terms.
    pub const fn days(&self) -> Option<i64> {
        match self {
            PaymentTerms::DueOnReceipt => Some(0),
            PaymentTerms::Net15 => Some(15),
            PaymentTerms::Net30 => Some(30),
            PaymentTerms::Net45 => Some(45),
            PaymentTerms::Net60 => Some(60),
            PaymentTerms::Custom => None,
        }
    }

    /// Computes the due date for an invoice dated `invoice_date`.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use janus_core::types::PaymentTerms;
    ///
    /// let issued = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    /// assert_eq!(
    ///     PaymentTerms::Net30.due_date(issued),
    ///     NaiveDate::from_ymd_opt(2025, 3, 31)
    /// );
    /// assert_eq!(PaymentTerms::Custom.due_date(issued), None);
    /// ```
    pub fn due_date(&self, invoice_date: NaiveDate) -> Option<NaiveDate> {
        self.days()
            .and_then(|days| invoice_date.checked_add_signed(Duration::days(days)))
    }

    /// Parses a configuration value (`net_30`, `Net 30`, `due_on_receipt`).
    pub fn parse(text: &str) -> Option<Self> {
        let normalized: String = text
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "due_on_receipt" => Some(PaymentTerms::DueOnReceipt),
            "net_15" | "net15" => Some(PaymentTerms::Net15),
            "net_30" | "net30" => Some(PaymentTerms::Net30),
            "net_45" | "net45" => Some(PaymentTerms::Net45),
            "net_60" | "net60" => Some(PaymentTerms::Net60),
            "custom" => Some(PaymentTerms::Custom),
            _ => None,
        }
    }
}

// =============================================================================
// Party Role
// =============================================================================

/// Which side of the trade the document's party is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    Customer,
    Supplier,
}

impl fmt::Display for PartyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyRole::Customer => f.write_str("customer"),
            PartyRole::Supplier => f.write_str("supplier"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
        assert_eq!(TaxRate::from_percent(5).bps(), 500);
    }

    #[test]
    fn test_tax_rate_parse_negative_is_zero() {
        assert_eq!(TaxRate::parse_percent_lenient("-5"), TaxRate::zero());
        assert_eq!(
            TaxRate::parse_percent_lenient("99999999999999999999999999999"),
            TaxRate::zero()
        );
    }

    #[test]
    fn test_line_ids_are_unique() {
        assert_ne!(LineId::new(), LineId::new());
    }

    #[test]
    fn test_terms_due_dates() {
        let issued = date(2025, 3, 1);
        assert_eq!(PaymentTerms::DueOnReceipt.due_date(issued), Some(issued));
        assert_eq!(PaymentTerms::Net15.due_date(issued), Some(date(2025, 3, 16)));
        assert_eq!(PaymentTerms::Net45.due_date(issued), Some(date(2025, 4, 15)));
        assert_eq!(PaymentTerms::Net60.due_date(issued), Some(date(2025, 4, 30)));
    }

    #[test]
    fn test_terms_parse() {
        assert_eq!(PaymentTerms::parse("Net 15"), Some(PaymentTerms::Net15));
        assert_eq!(PaymentTerms::parse("due_on_receipt"), Some(PaymentTerms::DueOnReceipt));
        assert_eq!(PaymentTerms::parse("net-60"), Some(PaymentTerms::Net60));
        assert_eq!(PaymentTerms::parse("eventually"), None);
    }

    #[test]
    fn test_terms_default() {
        assert_eq!(PaymentTerms::default(), PaymentTerms::Net30);
    }
}
