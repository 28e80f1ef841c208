//! # Draft Commands and Views
//!
//! The wire surface between a form and its session. Numeric fields arrive
//! as the text the user typed and are parsed leniently; the session never
//! rejects a keystroke.
//!
//! ## Command Shape
//! ```json
//! { "command": "edit_line", "lineId": "…", "quantity": "20", "unitPrice": "10.00" }
//! { "command": "set_allocation", "targetId": "inv-1", "amount": "250" }
//! { "command": "undo" }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use janus_core::{
    Allocation, DocumentDetails, DocumentKind, DocumentTotals, LineId, LineItem, LinePatch, Money,
    OpenBalanceTarget, OtherFees, PaymentMethod, PaymentTerms,
};

/// One user action on the open draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "command", rename_all = "snake_case", rename_all_fields = "camelCase")]
#[ts(export)]
pub enum DraftCommand {
    // -- header ---------------------------------------------------------------
    SetNumber {
        number: Option<String>,
    },
    SetParty {
        party_id: Option<String>,
    },
    SetTransactionDate {
        #[ts(as = "Option<String>")]
        date: Option<NaiveDate>,
    },
    SetTerms {
        terms: PaymentTerms,
    },
    SetDueDate {
        #[ts(as = "Option<String>")]
        date: Option<NaiveDate>,
    },
    SetPaymentMethod {
        method: Option<PaymentMethod>,
    },
    SetExpirationDate {
        #[ts(as = "Option<String>")]
        date: Option<NaiveDate>,
    },
    SetExpectedDate {
        #[ts(as = "Option<String>")]
        date: Option<NaiveDate>,
    },
    SetLocation {
        location_id: Option<String>,
    },
    SetSalesRep {
        sales_rep: Option<String>,
    },
    SetMessage {
        message: String,
    },
    SetOtherFees {
        description: String,
        amount: String,
    },
    SetAmountPaid {
        amount: String,
    },

    // -- lines ----------------------------------------------------------------
    AddLine,
    /// Picks a catalog product; its defaults overwrite the line.
    PickProduct {
        line_id: LineId,
        product_id: String,
    },
    EditLine {
        line_id: LineId,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        unit_of_measure: Option<String>,
        #[serde(default)]
        quantity: Option<String>,
        #[serde(default)]
        unit_price: Option<String>,
        #[serde(default)]
        tax_percent: Option<String>,
    },
    /// Received / returned quantity of an imported line.
    SetConsumableQuantity {
        line_id: LineId,
        quantity: String,
    },
    RemoveLine {
        line_id: LineId,
    },
    ClearLines,

    // -- imports --------------------------------------------------------------
    SelectSource {
        source_id: String,
    },
    DeselectSource {
        source_id: String,
    },
    ImportSources {
        source_ids: Vec<String>,
    },

    // -- payment allocation ---------------------------------------------------
    SetAmountReceived {
        amount: String,
    },
    /// Reloads the party's open balances from the ledger.
    RefreshOpenBalances,
    AutoAllocate,
    SetAllocation {
        target_id: String,
        amount: String,
    },
    AutoFillAllocation {
        target_id: String,
    },
    ClearAllocations,

    // -- history --------------------------------------------------------------
    Undo,
    Redo,
}

impl DraftCommand {
    /// Builds the line patch for an `EditLine` command.
    pub(crate) fn line_patch(
        description: Option<String>,
        unit_of_measure: Option<String>,
        quantity: Option<String>,
        unit_price: Option<String>,
        tax_percent: Option<String>,
    ) -> LinePatch {
        let mut patch = LinePatch::new();
        if let Some(description) = description {
            patch = patch.description(description);
        }
        if let Some(unit) = unit_of_measure {
            patch = patch.unit_of_measure(unit);
        }
        if let Some(quantity) = quantity {
            patch = patch.quantity_text(&quantity);
        }
        if let Some(price) = unit_price {
            patch = patch.unit_price_text(&price);
        }
        if let Some(tax) = tax_percent {
            patch = patch.tax_percent_text(&tax);
        }
        patch
    }
}

/// Display strings for the totals block, in the tenant's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormattedTotals {
    pub net_total: String,
    pub tax_total: String,
    pub other_fees: String,
    pub grand_total: String,
    pub balance_due: Option<String>,
    pub unallocated: String,
}

/// Everything the form renders after a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DraftView {
    pub kind: DocumentKind,
    pub currency_code: String,
    pub number: Option<String>,
    #[ts(as = "Option<String>")]
    pub transaction_date: Option<NaiveDate>,
    pub party_id: Option<String>,
    pub location_id: Option<String>,
    pub sales_rep: Option<String>,
    pub message: String,
    pub details: DocumentDetails,
    pub lines: Vec<LineItem>,
    pub other_fees: OtherFees,
    pub totals: DocumentTotals,
    pub open_balances: Vec<OpenBalanceTarget>,
    pub allocations: Vec<Allocation>,
    pub total_allocated: Money,
    pub unallocated: Money,
    pub imported_source_ids: Vec<String>,
    pub formatted: FormattedTotals,
    pub can_undo: bool,
    pub can_redo: bool,
}
