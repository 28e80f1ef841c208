//! # Document Totals
//!
//! Pure derivation of document-level figures from the current lines.
//!
//! ```text
//! net_total   = Σ amount
//! tax_total   = Σ tax_amount
//! gross_total = Σ total_amount
//! grand_total = gross_total + other_fees
//! balance_due = max(0, grand_total − amount_paid)   (balance kinds only)
//! ```
//!
//! Sums are integer additions over already-rounded line figures, so the
//! result does not depend on line order and `gross == net + tax` exactly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::line_items::LineItem;
use crate::money::Money;
use crate::types::OtherFees;

/// Read-only snapshot of a document's aggregate figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentTotals {
    pub line_count: usize,
    pub net_total: Money,
    pub tax_total: Money,
    pub gross_total: Money,
    pub other_fees: Money,
    pub grand_total: Money,
    /// `None` for kinds that do not track a balance.
    pub balance_due: Option<Money>,
}

/// Computes totals for `lines`.
///
/// `amount_paid` is `Some` only for documents that carry a balance; the
/// balance due is floored at zero (an overpayment is not a negative debt).
///
/// ## Example
/// ```rust
/// use janus_core::line_items::LineItem;
/// use janus_core::money::Money;
/// use janus_core::totals::compute_totals;
/// use janus_core::types::OtherFees;
///
/// let fees = OtherFees { description: "Freight".into(), amount: Money::from_cents(2500) };
/// let totals = compute_totals(&[LineItem::blank()], &fees, Some(Money::from_cents(100)));
/// assert_eq!(totals.grand_total.cents(), 2500);
/// assert_eq!(totals.balance_due, Some(Money::from_cents(2400)));
/// ```
pub fn compute_totals(
    lines: &[LineItem],
    other_fees: &OtherFees,
    amount_paid: Option<Money>,
) -> DocumentTotals {
    let net_total: Money = lines.iter().map(LineItem::amount).sum();
    let tax_total: Money = lines.iter().map(LineItem::tax_amount).sum();
    let gross_total: Money = lines.iter().map(LineItem::total_amount).sum();
    let grand_total = gross_total + other_fees.amount;

    DocumentTotals {
        line_count: lines.len(),
        net_total,
        tax_total,
        gross_total,
        other_fees: other_fees.amount,
        grand_total,
        balance_due: amount_paid.map(|paid| (grand_total - paid).non_negative()),
    }
}
