//! # Document Draft
//!
//! The in-memory document behind an open form. Every operation the form
//! calls goes through here.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          DocumentDraft                                  │
//! │                                                                         │
//! │  header: kind details · number · date · party · location · rep · memo  │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │  LineItemEngine  │  │ CrossDocument    │  │ AllocationEngine │      │
//! │  │  owns the lines  │◄─│ Linker           │  │ payments only    │      │
//! │  └────────┬─────────┘  │ produces lines   │  └──────────────────┘      │
//! │           │            └──────────────────┘                            │
//! │           ▼                                                             │
//! │  compute_totals() ──► totals snapshot (refreshed on every mutation)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! 1. `DocumentDraft::new(kind)` when the form opens (one blank line)
//! 2. Mutations while the user edits; totals never go stale
//! 3. `to_submission()` produces the persisted shape, or the first
//!    validation failure with the draft untouched
//!
//! The draft is a plain value (`Clone + PartialEq`), so callers can keep
//! whole snapshots for undo and compare them to skip re-renders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::allocation::{Allocation, AllocationEngine, OpenBalanceTarget};
use crate::document::{DocumentDetails, DocumentKind};
use crate::error::{CoreError, CoreResult, SubmissionError};
use crate::line_items::{LineItem, LineItemEngine, LinePatch};
use crate::linker::{CrossDocumentLinker, SelectionState, SourceDocument};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::totals::{compute_totals, DocumentTotals};
use crate::types::{
    LineId, OtherFees, PartyRef, PaymentMethod, PaymentTerms, ProductRef, SourceDocumentRef,
    TaxRate,
};
use crate::validation::validate_draft;

// =============================================================================
// Draft Defaults
// =============================================================================

/// Tenant-level presets applied when a draft is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDefaults {
    /// Terms preselected on new invoices.
    pub terms: PaymentTerms,
    /// Tax rate preset on every new line.
    pub tax_rate: TaxRate,
}

// =============================================================================
// Document Draft
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDraft {
    details: DocumentDetails,
    number: Option<String>,
    transaction_date: Option<NaiveDate>,
    party: Option<PartyRef>,
    /// Receiving / ship-to location.
    location: Option<String>,
    sales_rep: Option<String>,
    message: String,
    lines: LineItemEngine,
    other_fees: OtherFees,
    linker: CrossDocumentLinker,
    /// Present only for kinds that bear allocations.
    allocation: Option<AllocationEngine>,
    defaults: DraftDefaults,
    totals: DocumentTotals,
}

impl DocumentDraft {
    pub fn new(kind: DocumentKind) -> Self {
        Self::with_defaults(kind, DraftDefaults::default())
    }

    /// Opens a fresh draft. Line-carrying kinds start with one blank line.
    pub fn with_defaults(kind: DocumentKind, defaults: DraftDefaults) -> Self {
        let mut lines = LineItemEngine::new();
        if kind.carries_lines() {
            lines.add_line_with_tax(defaults.tax_rate);
        }
        let allocation = kind
            .bears_allocations()
            .then(|| AllocationEngine::new(Money::zero(), Vec::new()));

        let mut draft = DocumentDraft {
            details: DocumentDetails::blank(kind, defaults.terms),
            number: None,
            transaction_date: None,
            party: None,
            location: None,
            sales_rep: None,
            message: String::new(),
            lines,
            other_fees: OtherFees::default(),
            linker: CrossDocumentLinker::new(kind),
            allocation,
            defaults,
            totals: DocumentTotals::default(),
        };
        draft.refresh();
        debug!(%kind, "draft opened");
        draft
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn kind(&self) -> DocumentKind {
        self.details.kind()
    }

    pub fn details(&self) -> &DocumentDetails {
        &self.details
    }

    pub fn defaults(&self) -> DraftDefaults {
        self.defaults
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn transaction_date(&self) -> Option<NaiveDate> {
        self.transaction_date
    }

    pub fn party(&self) -> Option<&PartyRef> {
        self.party.as_ref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn sales_rep(&self) -> Option<&str> {
        self.sales_rep.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn lines(&self) -> &[LineItem] {
        self.lines.lines()
    }

    pub fn line(&self, id: &LineId) -> Option<&LineItem> {
        self.lines.get(id)
    }

    pub fn other_fees(&self) -> &OtherFees {
        &self.other_fees
    }

    /// Always current: recomputed before every mutation returns.
    pub fn totals(&self) -> &DocumentTotals {
        &self.totals
    }

    pub fn source_state(&self, source_id: &str) -> SelectionState {
        self.linker.state(source_id)
    }

    pub fn imported_source_ids(&self) -> Vec<String> {
        self.linker.imported_ids()
    }

    pub fn open_balances(&self) -> &[OpenBalanceTarget] {
        self.allocation.as_ref().map(|a| a.targets()).unwrap_or(&[])
    }

    pub fn allocations(&self) -> &[Allocation] {
        self.allocation
            .as_ref()
            .map(|a| a.allocations())
            .unwrap_or(&[])
    }

    pub fn total_allocated(&self) -> Money {
        self.allocation
            .as_ref()
            .map_or(Money::zero(), AllocationEngine::total_allocated)
    }

    pub fn unallocated(&self) -> Money {
        self.allocation
            .as_ref()
            .map_or(Money::zero(), AllocationEngine::unallocated)
    }

    // =========================================================================
    // Header
    // =========================================================================

    pub fn set_number(&mut self, number: Option<String>) {
        self.number = number;
    }

    /// Changes the party.
    ///
    /// Sources and open balances belong to the previous party, so a real
    /// change drops imported lines, resets the linker and clears the
    /// loaded balances. Authored lines stay.
    pub fn set_party(&mut self, party: Option<PartyRef>) {
        if self.party == party {
            return;
        }
        let removed = self.lines.remove_where(LineItem::is_imported);
        self.linker.reset();
        if let Some(allocation) = self.allocation.as_mut() {
            allocation.replace_targets(Vec::new());
        }
        debug!(party = ?party, removed_imported = removed, "party changed");
        self.party = party;
        self.refresh();
    }

    /// Sets the transaction date. An invoice on fixed terms gets its due
    /// date recomputed.
    pub fn set_transaction_date(&mut self, date: Option<NaiveDate>) {
        self.transaction_date = date;
        self.apply_terms();
    }

    pub fn set_terms(&mut self, new_terms: PaymentTerms) -> CoreResult<()> {
        match &mut self.details {
            DocumentDetails::Invoice { terms, .. } => *terms = new_terms,
            _ => return Err(self.not_applicable("payment terms")),
        }
        self.apply_terms();
        Ok(())
    }

    /// Sets the invoice due date by hand. A date that differs from what
    /// the current terms would give switches the terms to custom.
    pub fn set_due_date(&mut self, date: Option<NaiveDate>) -> CoreResult<()> {
        let computed = self.computed_due_date();
        match &mut self.details {
            DocumentDetails::Invoice { terms, due_date } => {
                if date != computed {
                    *terms = PaymentTerms::Custom;
                }
                *due_date = date;
                Ok(())
            }
            _ => Err(self.not_applicable("due date")),
        }
    }

    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) -> CoreResult<()> {
        match &mut self.details {
            DocumentDetails::SalesReceipt { payment_method }
            | DocumentDetails::RefundReceipt { payment_method }
            | DocumentDetails::Payment { payment_method, .. } => {
                *payment_method = method;
                Ok(())
            }
            _ => Err(self.not_applicable("payment method")),
        }
    }

    pub fn set_expiration_date(&mut self, date: Option<NaiveDate>) -> CoreResult<()> {
        match &mut self.details {
            DocumentDetails::Estimate { expiration_date } => {
                *expiration_date = date;
                Ok(())
            }
            _ => Err(self.not_applicable("expiration date")),
        }
    }

    pub fn set_expected_date(&mut self, date: Option<NaiveDate>) -> CoreResult<()> {
        match &mut self.details {
            DocumentDetails::PurchaseOrder { expected_date } => {
                *expected_date = date;
                Ok(())
            }
            _ => Err(self.not_applicable("expected date")),
        }
    }

    /// Amount already paid on a purchase. Negative input is floored.
    pub fn set_amount_paid(&mut self, amount: Money) -> CoreResult<()> {
        match &mut self.details {
            DocumentDetails::Purchase { amount_paid } => *amount_paid = amount.non_negative(),
            _ => return Err(self.not_applicable("amount paid")),
        }
        self.refresh();
        Ok(())
    }

    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
    }

    pub fn set_sales_rep(&mut self, sales_rep: Option<String>) {
        self.sales_rep = sales_rep.filter(|rep| !rep.trim().is_empty());
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Replaces the document-level fee. Negative amounts are floored.
    pub fn set_other_fees(&mut self, fees: OtherFees) {
        self.other_fees = OtherFees {
            description: fees.description,
            amount: fees.amount.non_negative(),
        };
        self.refresh();
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Appends a blank line preset to the default tax rate.
    pub fn add_line(&mut self) -> LineItem {
        let line = self.lines.add_line_with_tax(self.defaults.tax_rate).clone();
        self.refresh();
        line
    }

    pub fn update_line(&mut self, id: &LineId, patch: LinePatch) -> CoreResult<LineItem> {
        let line = self.lines.update_line(id, patch)?.clone();
        self.refresh();
        Ok(line)
    }

    /// Sets a received / returned quantity; returns the clamped value.
    pub fn update_consumable_quantity(
        &mut self,
        id: &LineId,
        requested: Quantity,
    ) -> CoreResult<Quantity> {
        let applied = self.lines.update_consumable_quantity(id, requested)?;
        self.refresh();
        Ok(applied)
    }

    pub fn remove_line(&mut self, id: &LineId) -> CoreResult<LineItem> {
        let removed = self.lines.remove_line(id)?;
        self.refresh();
        Ok(removed)
    }

    pub fn clear_lines(&mut self) {
        self.lines.clear();
        self.refresh();
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// Ticks one source document; returns how many lines were appended.
    ///
    /// A source issued to another party is rejected.
    pub fn select_source(&mut self, source: &SourceDocument) -> CoreResult<usize> {
        self.check_source_party(source)?;
        let imported = self.linker.select(source)?;
        Ok(self.append_imported(imported))
    }

    pub fn deselect_source(&mut self, source_id: &str) {
        self.linker.deselect(source_id);
    }

    /// Imports every given source not yet imported in this session.
    ///
    /// All sources are checked before any is imported.
    pub fn import_sources(&mut self, sources: &[SourceDocument]) -> CoreResult<usize> {
        for source in sources {
            self.check_source_party(source)?;
        }
        let imported = self.linker.import_from(sources)?;
        Ok(self.append_imported(imported))
    }

    fn check_source_party(&self, source: &SourceDocument) -> CoreResult<()> {
        match &source.party_ref {
            Some(owner) if self.party.as_ref() != Some(owner) => Err(CoreError::ForeignSource {
                number: source.number.clone(),
                role: self.kind().party_role(),
            }),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Payment Allocation
    // =========================================================================

    /// Sets the amount received and re-runs oldest-first allocation.
    pub fn set_amount_received(&mut self, amount: Money) -> CoreResult<()> {
        let amount = amount.non_negative();
        match &mut self.details {
            DocumentDetails::Payment {
                amount_received, ..
            } => *amount_received = amount,
            _ => return Err(CoreError::NotAllocationDocument(self.kind())),
        }
        self.allocation_mut()?.set_amount_available(amount);
        Ok(())
    }

    /// Loads the party's open balances and allocates oldest-first.
    pub fn load_open_balances(&mut self, targets: Vec<OpenBalanceTarget>) -> CoreResult<()> {
        let engine = self.allocation_mut()?;
        engine.replace_targets(targets);
        engine.auto_allocate();
        Ok(())
    }

    pub fn auto_allocate(&mut self) -> CoreResult<()> {
        self.allocation_mut()?.auto_allocate();
        Ok(())
    }

    /// Manual per-target amount; returns the clamped value applied.
    pub fn set_allocation(&mut self, target_id: &str, amount: Money) -> CoreResult<Money> {
        self.allocation_mut()?.set_manual(target_id, amount)
    }

    pub fn auto_fill_allocation(&mut self, target_id: &str) -> CoreResult<Money> {
        self.allocation_mut()?.auto_fill(target_id)
    }

    pub fn clear_allocations(&mut self) -> CoreResult<()> {
        self.allocation_mut()?.clear_allocations();
        Ok(())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Reports the first rule the draft violates, if any.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        validate_draft(self)
    }

    /// Builds the shape handed to persistence. Fails with the first
    /// validation error; the draft itself is never modified.
    pub fn to_submission(&self) -> Result<DocumentSubmission, SubmissionError> {
        self.validate()?;

        let kind = self.kind();
        let transaction_date = self
            .transaction_date
            .ok_or(SubmissionError::MissingTransactionDate {
                label: kind.date_label(),
            })?;
        let party_id = self
            .party
            .clone()
            .ok_or(SubmissionError::MissingParty(kind.party_role()))?;

        Ok(DocumentSubmission {
            kind,
            number: self.number.clone(),
            transaction_date,
            party_id,
            location_id: self.location.clone(),
            sales_rep: self.sales_rep.clone(),
            message: self.message.clone(),
            details: self.details.clone(),
            lines: self.lines().iter().map(SubmittedLine::from).collect(),
            net_total: self.totals.net_total,
            tax_total: self.totals.tax_total,
            other_fees_description: self.other_fees.description.clone(),
            other_fees_amount: self.totals.other_fees,
            gross_total: self.totals.gross_total,
            grand_total: self.totals.grand_total,
            balance_due: self.totals.balance_due,
            allocations: self
                .allocation
                .as_ref()
                .map(AllocationEngine::nonzero_allocations)
                .unwrap_or_default(),
            source_document_ids: self.linker.imported_ids(),
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn refresh(&mut self) {
        self.totals = compute_totals(
            self.lines.lines(),
            &self.other_fees,
            self.details.amount_paid(),
        );
    }

    fn computed_due_date(&self) -> Option<NaiveDate> {
        match &self.details {
            DocumentDetails::Invoice { terms, .. } => {
                self.transaction_date.and_then(|date| terms.due_date(date))
            }
            _ => None,
        }
    }

    /// Re-derives the invoice due date from its terms. Custom terms keep
    /// whatever the user entered.
    fn apply_terms(&mut self) {
        let computed = self.computed_due_date();
        if let DocumentDetails::Invoice { terms, due_date } = &mut self.details {
            if *terms != PaymentTerms::Custom {
                *due_date = computed;
            }
        }
    }

    /// Appends imported lines, first dropping the untouched placeholder
    /// line a fresh form starts with.
    fn append_imported(&mut self, imported: Vec<LineItem>) -> usize {
        let count = imported.len();
        if count > 0 {
            self.lines.remove_where(LineItem::is_untouched);
            self.lines.append(imported);
            self.refresh();
        }
        count
    }

    fn allocation_mut(&mut self) -> CoreResult<&mut AllocationEngine> {
        let kind = self.kind();
        self.allocation
            .as_mut()
            .ok_or(CoreError::NotAllocationDocument(kind))
    }

    fn not_applicable(&self, field: &'static str) -> CoreError {
        CoreError::NotApplicable {
            kind: self.kind(),
            field,
        }
    }
}

// =============================================================================
// Submission Shape
// =============================================================================

/// One persisted line. `quantity` is the consumable quantity, the amount
/// actually counted on this document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubmittedLine {
    pub product_ref: Option<ProductRef>,
    pub description: String,
    pub quantity: Quantity,
    pub original_quantity: Quantity,
    pub unit_of_measure: String,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
    pub amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub source: Option<SourceDocumentRef>,
}

impl From<&LineItem> for SubmittedLine {
    fn from(line: &LineItem) -> Self {
        SubmittedLine {
            product_ref: line.product_ref.clone(),
            description: line.description.clone(),
            quantity: line.consumable_quantity,
            original_quantity: line.original_quantity,
            unit_of_measure: line.unit_of_measure.clone(),
            unit_price: line.unit_price,
            tax_rate: line.tax_rate,
            amount: line.amount(),
            tax_amount: line.tax_amount(),
            total_amount: line.total_amount(),
            source: line.source.clone(),
        }
    }
}

/// A validated draft, ready for the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocumentSubmission {
    pub kind: DocumentKind,
    pub number: Option<String>,
    #[ts(as = "String")]
    pub transaction_date: NaiveDate,
    pub party_id: PartyRef,
    pub location_id: Option<String>,
    pub sales_rep: Option<String>,
    pub message: String,
    pub details: DocumentDetails,
    pub lines: Vec<SubmittedLine>,
    pub net_total: Money,
    pub tax_total: Money,
    pub other_fees_description: String,
    pub other_fees_amount: Money,
    pub gross_total: Money,
    pub grand_total: Money,
    pub balance_due: Option<Money>,
    /// Non-zero rows only.
    pub allocations: Vec<Allocation>,
    pub source_document_ids: Vec<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
