//! # Document Kinds
//!
//! The closed set of financial documents the engine computes, and the
//! fields that only some of them carry.
//!
//! ## Capability Matrix
//! ```text
//! ┌───────────────┬──────────┬───────┬─────────┬──────────┬─────────────────┐
//! │ Kind          │ Party    │ Lines │ Balance │ Allocate │ Imports from    │
//! ├───────────────┼──────────┼───────┼─────────┼──────────┼─────────────────┤
//! │ Invoice       │ customer │  yes  │   yes   │    -     │ -               │
//! │ SalesReceipt  │ customer │  yes  │    -    │    -     │ -               │
//! │ RefundReceipt │ customer │  yes  │    -    │    -     │ INV, SR         │
//! │ Estimate      │ customer │  yes  │    -    │    -     │ -               │
//! │ PurchaseOrder │ supplier │  yes  │    -    │    -     │ -               │
//! │ Purchase      │ supplier │  yes  │   yes   │    -     │ PO              │
//! │ Payment       │ customer │   -   │    -    │   yes    │ -               │
//! │ CreditNote    │ customer │  yes  │    -    │    -     │ INV, SR         │
//! └───────────────┴──────────┴───────┴─────────┴──────────┴─────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PartyRole, PaymentMethod, PaymentTerms};

// =============================================================================
// Document Kind
// =============================================================================

/// Discriminant of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    SalesReceipt,
    RefundReceipt,
    Estimate,
    PurchaseOrder,
    Purchase,
    Payment,
    CreditNote,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 8] = [
        DocumentKind::Invoice,
        DocumentKind::SalesReceipt,
        DocumentKind::RefundReceipt,
        DocumentKind::Estimate,
        DocumentKind::PurchaseOrder,
        DocumentKind::Purchase,
        DocumentKind::Payment,
        DocumentKind::CreditNote,
    ];

    pub const fn party_role(&self) -> PartyRole {
        match self {
            DocumentKind::PurchaseOrder | DocumentKind::Purchase => PartyRole::Supplier,
            _ => PartyRole::Customer,
        }
    }

    /// Payments move money against open balances and carry no lines.
    pub const fn carries_lines(&self) -> bool {
        !matches!(self, DocumentKind::Payment)
    }

    pub const fn bears_allocations(&self) -> bool {
        matches!(self, DocumentKind::Payment)
    }

    /// Whether the totals expose a balance due.
    pub const fn tracks_balance(&self) -> bool {
        matches!(self, DocumentKind::Invoice | DocumentKind::Purchase)
    }

    pub const fn requires_payment_method(&self) -> bool {
        matches!(
            self,
            DocumentKind::SalesReceipt | DocumentKind::RefundReceipt | DocumentKind::Payment
        )
    }

    /// Whether lines can be imported from a document of `source` kind.
    pub fn accepts_imports_from(&self, source: DocumentKind) -> bool {
        match self {
            DocumentKind::Purchase => source == DocumentKind::PurchaseOrder,
            DocumentKind::RefundReceipt | DocumentKind::CreditNote => matches!(
                source,
                DocumentKind::Invoice | DocumentKind::SalesReceipt
            ),
            _ => false,
        }
    }

    /// Prefix of the document number series.
    pub const fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::SalesReceipt => "SR",
            DocumentKind::RefundReceipt => "RR",
            DocumentKind::Estimate => "EST",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::Purchase => "PUR",
            DocumentKind::Payment => "PMT",
            DocumentKind::CreditNote => "CN",
        }
    }

    /// Indefinite article for the kind's display name.
    pub const fn article(&self) -> &'static str {
        match self {
            DocumentKind::Invoice | DocumentKind::Estimate => "an",
            _ => "a",
        }
    }

    /// Article + name of the transaction date, as used in messages.
    pub const fn date_label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "an invoice date",
            DocumentKind::SalesReceipt => "a receipt date",
            DocumentKind::RefundReceipt => "a refund date",
            DocumentKind::Estimate => "an estimate date",
            DocumentKind::PurchaseOrder => "an order date",
            DocumentKind::Purchase => "a purchase date",
            DocumentKind::Payment => "a payment date",
            DocumentKind::CreditNote => "a credit note date",
        }
    }

    /// Builds a document number: `<PREFIX>-<YYMM>-<NNN>`.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use janus_core::DocumentKind;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
    /// assert_eq!(DocumentKind::RefundReceipt.format_number(date, 7), "RR-2503-007");
    /// ```
    pub fn format_number(&self, date: NaiveDate, sequence: u32) -> String {
        format!(
            "{}-{}-{:03}",
            self.number_prefix(),
            date.format("%y%m"),
            sequence
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::SalesReceipt => "sales receipt",
            DocumentKind::RefundReceipt => "refund receipt",
            DocumentKind::Estimate => "estimate",
            DocumentKind::PurchaseOrder => "purchase order",
            DocumentKind::Purchase => "purchase",
            DocumentKind::Payment => "payment",
            DocumentKind::CreditNote => "credit note",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Document Details
// =============================================================================

/// Kind-specific header fields.
///
/// One variant per [`DocumentKind`], so a due date can only exist on an
/// invoice and an amount received only on a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DocumentDetails {
    Invoice {
        terms: PaymentTerms,
        #[ts(as = "Option<String>")]
        due_date: Option<NaiveDate>,
    },
    SalesReceipt {
        payment_method: Option<PaymentMethod>,
    },
    RefundReceipt {
        payment_method: Option<PaymentMethod>,
    },
    Estimate {
        #[ts(as = "Option<String>")]
        expiration_date: Option<NaiveDate>,
    },
    PurchaseOrder {
        #[ts(as = "Option<String>")]
        expected_date: Option<NaiveDate>,
    },
    Purchase {
        amount_paid: Money,
    },
    Payment {
        payment_method: Option<PaymentMethod>,
        amount_received: Money,
    },
    CreditNote,
}

impl DocumentDetails {
    /// Blank details for a freshly opened form.
    pub fn blank(kind: DocumentKind, terms: PaymentTerms) -> Self {
        match kind {
            DocumentKind::Invoice => DocumentDetails::Invoice {
                terms,
                due_date: None,
            },
            DocumentKind::SalesReceipt => DocumentDetails::SalesReceipt {
                payment_method: None,
            },
            DocumentKind::RefundReceipt => DocumentDetails::RefundReceipt {
                payment_method: None,
            },
            DocumentKind::Estimate => DocumentDetails::Estimate {
                expiration_date: None,
            },
            DocumentKind::PurchaseOrder => DocumentDetails::PurchaseOrder {
                expected_date: None,
            },
            DocumentKind::Purchase => DocumentDetails::Purchase {
                amount_paid: Money::zero(),
            },
            DocumentKind::Payment => DocumentDetails::Payment {
                payment_method: None,
                amount_received: Money::zero(),
            },
            DocumentKind::CreditNote => DocumentDetails::CreditNote,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentDetails::Invoice { .. } => DocumentKind::Invoice,
            DocumentDetails::SalesReceipt { .. } => DocumentKind::SalesReceipt,
            DocumentDetails::RefundReceipt { .. } => DocumentKind::RefundReceipt,
            DocumentDetails::Estimate { .. } => DocumentKind::Estimate,
            DocumentDetails::PurchaseOrder { .. } => DocumentKind::PurchaseOrder,
            DocumentDetails::Purchase { .. } => DocumentKind::Purchase,
            DocumentDetails::Payment { .. } => DocumentKind::Payment,
            DocumentDetails::CreditNote => DocumentKind::CreditNote,
        }
    }

    /// Amount already paid, for kinds that track a balance.
    ///
    /// An invoice is issued unpaid, so its balance due is the grand total.
    pub fn amount_paid(&self) -> Option<Money> {
        match self {
            DocumentDetails::Invoice { .. } => Some(Money::zero()),
            DocumentDetails::Purchase { amount_paid } => Some(*amount_paid),
            _ => None,
        }
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        match self {
            DocumentDetails::SalesReceipt { payment_method }
            | DocumentDetails::RefundReceipt { payment_method }
            | DocumentDetails::Payment { payment_method, .. } => *payment_method,
            _ => None,
        }
    }

    pub fn amount_received(&self) -> Option<Money> {
        match self {
            DocumentDetails::Payment {
                amount_received, ..
            } => Some(*amount_received),
            _ => None,
        }
    }
}
