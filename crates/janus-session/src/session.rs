//! # Draft Session
//!
//! One open form: the draft, its undo history, and the collaborators it
//! consults. Every command is permission-checked, applied atomically and
//! answered with a fresh [`DraftView`].
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        DraftSession::apply                              │
//! │                                                                         │
//! │  command ──► PermissionGate(Edit) ──denied──► FORBIDDEN                 │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  snapshot = draft.clone()                                               │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  execute (catalog / ledger lookups, core engines)                       │
//! │        │                          │                                     │
//! │     error ──► draft = snapshot   ok ──► changed? history.record()       │
//! │                                                                         │
//! │  ──► DraftView (lines, totals, allocations, formatted amounts)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submit
//! `submit()` checks `Submit(kind)`, validates, and makes the single call to
//! the [`DocumentStore`]. On success the session starts over with a fresh
//! draft; on failure the draft stays as it was so the user can correct it.

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use janus_core::{
    CoreError, DocumentDraft, DocumentKind, DocumentSubmission, LinePatch, Money, OtherFees,
    PartyRef, ProductRef, Quantity, SourceDocument, SubmissionError,
};

use crate::command::{DraftCommand, DraftView, FormattedTotals};
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::history::History;
use crate::ports::{
    Action, CatalogProvider, DocumentId, DocumentLedger, DocumentStore, PermissionGate,
};

// =============================================================================
// Collaborators
// =============================================================================

/// The ports a session is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: Arc<dyn CatalogProvider>,
    pub gate: Arc<dyn PermissionGate>,
    pub ledger: Arc<dyn DocumentLedger>,
    pub store: Arc<dyn DocumentStore>,
}

impl Collaborators {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        gate: Arc<dyn PermissionGate>,
        ledger: Arc<dyn DocumentLedger>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Collaborators {
            catalog,
            gate,
            ledger,
            store,
        }
    }
}

/// What a successful submit returns to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubmitReceipt {
    pub document_id: DocumentId,
    pub submission: DocumentSubmission,
}

// =============================================================================
// Draft Session
// =============================================================================

pub struct DraftSession {
    config: SessionConfig,
    collaborators: Collaborators,
    draft: DocumentDraft,
    history: History<DocumentDraft>,
}

impl DraftSession {
    /// Opens a form for `kind`, dated today.
    pub fn new(kind: DocumentKind, config: SessionConfig, collaborators: Collaborators) -> Self {
        let draft = fresh_draft(kind, &config);
        let history = History::new(config.history_limit);
        DraftSession {
            config,
            collaborators,
            draft,
            history,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.draft.kind()
    }

    pub fn draft(&self) -> &DocumentDraft {
        &self.draft
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of everything the form renders.
    pub fn view(&self) -> DraftView {
        let draft = &self.draft;
        let totals = *draft.totals();
        let fmt = |amount: Money| self.config.format_currency(amount);

        DraftView {
            kind: draft.kind(),
            currency_code: self.config.currency_code.clone(),
            number: draft.number().map(str::to_string),
            transaction_date: draft.transaction_date(),
            party_id: draft.party().map(|p| p.0.clone()),
            location_id: draft.location().map(str::to_string),
            sales_rep: draft.sales_rep().map(str::to_string),
            message: draft.message().to_string(),
            details: draft.details().clone(),
            lines: draft.lines().to_vec(),
            other_fees: draft.other_fees().clone(),
            totals,
            open_balances: draft.open_balances().to_vec(),
            allocations: draft.allocations().to_vec(),
            total_allocated: draft.total_allocated(),
            unallocated: draft.unallocated(),
            imported_source_ids: draft.imported_source_ids(),
            formatted: FormattedTotals {
                net_total: fmt(totals.net_total),
                tax_total: fmt(totals.tax_total),
                other_fees: fmt(totals.other_fees),
                grand_total: fmt(totals.grand_total),
                balance_due: totals.balance_due.map(fmt),
                unallocated: fmt(draft.unallocated()),
            },
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Applies one command. A failed command leaves the draft untouched.
    pub fn apply(&mut self, command: DraftCommand) -> Result<DraftView, ApiError> {
        let kind = self.kind();
        debug!(%kind, ?command, "apply command");
        self.authorize(Action::Edit(kind))?;

        match command {
            DraftCommand::Undo => {
                if let Ok(previous) = self.history.undo(self.draft.clone()) {
                    self.draft = previous;
                }
            }
            DraftCommand::Redo => {
                if let Ok(next) = self.history.redo(self.draft.clone()) {
                    self.draft = next;
                }
            }
            command => {
                let snapshot = self.draft.clone();
                if let Err(err) = self.execute(command) {
                    self.draft = snapshot;
                    return Err(err);
                }
                if self.draft != snapshot {
                    self.history.record(snapshot);
                }
            }
        }

        Ok(self.view())
    }

    /// Validates and persists the draft.
    pub fn submit(&mut self) -> Result<SubmitReceipt, ApiError> {
        let kind = self.kind();
        self.authorize(Action::Submit(kind))?;

        let submission = self.draft.to_submission().map_err(|e| {
            warn!(%kind, error = %e, "submission rejected by validation");
            ApiError::from(e)
        })?;

        let document_id = self
            .collaborators
            .store
            .submit(&self.config.tenant_id, &submission)
            .map_err(|e| {
                error!(%kind, error = %e, "document store failed");
                ApiError::from(e)
            })?;

        info!(
            %kind,
            %document_id,
            grand_total = submission.grand_total.cents(),
            lines = submission.lines.len(),
            "document submitted"
        );

        self.reset();
        Ok(SubmitReceipt {
            document_id,
            submission,
        })
    }

    /// Throws the draft away and starts over.
    pub fn discard(&mut self) -> DraftView {
        debug!(kind = %self.kind(), "draft discarded");
        self.reset();
        self.view()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn reset(&mut self) {
        self.draft = fresh_draft(self.kind(), &self.config);
        self.history.clear();
    }

    fn authorize(&self, action: Action) -> Result<(), ApiError> {
        if self.collaborators.gate.is_allowed(action) {
            Ok(())
        } else {
            warn!(%action, "permission denied");
            Err(ApiError::forbidden(format!(
                "You do not have permission to {}",
                action
            )))
        }
    }

    fn execute(&mut self, command: DraftCommand) -> Result<(), ApiError> {
        let draft = &mut self.draft;

        match command {
            // -- header -------------------------------------------------------
            DraftCommand::SetNumber { number } => {
                draft.set_number(number.filter(|n| !n.trim().is_empty()))
            }
            DraftCommand::SetParty { party_id } => self.set_party(party_id)?,
            DraftCommand::SetTransactionDate { date } => draft.set_transaction_date(date),
            DraftCommand::SetTerms { terms } => draft.set_terms(terms)?,
            DraftCommand::SetDueDate { date } => draft.set_due_date(date)?,
            DraftCommand::SetPaymentMethod { method } => draft.set_payment_method(method)?,
            DraftCommand::SetExpirationDate { date } => draft.set_expiration_date(date)?,
            DraftCommand::SetExpectedDate { date } => draft.set_expected_date(date)?,
            DraftCommand::SetLocation { location_id } => {
                if let Some(id) = &location_id {
                    if self.collaborators.catalog.resolve_location(id).is_none() {
                        return Err(ApiError::not_found("Location", id));
                    }
                }
                self.draft.set_location(location_id);
            }
            DraftCommand::SetSalesRep { sales_rep } => draft.set_sales_rep(sales_rep),
            DraftCommand::SetMessage { message } => draft.set_message(message),
            DraftCommand::SetOtherFees {
                description,
                amount,
            } => draft.set_other_fees(OtherFees {
                description,
                amount: Money::parse_lenient(&amount),
            }),
            DraftCommand::SetAmountPaid { amount } => {
                draft.set_amount_paid(Money::parse_lenient(&amount))?
            }

            // -- lines --------------------------------------------------------
            DraftCommand::AddLine => {
                draft.add_line();
            }
            DraftCommand::PickProduct {
                line_id,
                product_id,
            } => {
                let defaults = self
                    .collaborators
                    .catalog
                    .resolve_product(&ProductRef(product_id.clone()))
                    .ok_or_else(|| ApiError::not_found("Product", &product_id))?;
                self.draft
                    .update_line(&line_id, LinePatch::from_product(&defaults))?;
            }
            DraftCommand::EditLine {
                line_id,
                description,
                unit_of_measure,
                quantity,
                unit_price,
                tax_percent,
            } => {
                let patch = DraftCommand::line_patch(
                    description,
                    unit_of_measure,
                    quantity,
                    unit_price,
                    tax_percent,
                );
                draft.update_line(&line_id, patch)?;
            }
            DraftCommand::SetConsumableQuantity { line_id, quantity } => {
                draft.update_consumable_quantity(&line_id, Quantity::parse_lenient(&quantity))?;
            }
            DraftCommand::RemoveLine { line_id } => {
                draft.remove_line(&line_id)?;
            }
            DraftCommand::ClearLines => draft.clear_lines(),

            // -- imports ------------------------------------------------------
            DraftCommand::SelectSource { source_id } => {
                let source = self.source_document(&source_id)?;
                let added = self.draft.select_source(&source)?;
                debug!(%source_id, added, "source selected");
            }
            DraftCommand::DeselectSource { source_id } => draft.deselect_source(&source_id),
            DraftCommand::ImportSources { source_ids } => {
                let sources = source_ids
                    .iter()
                    .map(|id| self.source_document(id))
                    .collect::<Result<Vec<_>, _>>()?;
                let added = self.draft.import_sources(&sources)?;
                debug!(sources = sources.len(), added, "sources imported");
            }

            // -- payment allocation -------------------------------------------
            DraftCommand::SetAmountReceived { amount } => {
                draft.set_amount_received(Money::parse_lenient(&amount))?
            }
            DraftCommand::RefreshOpenBalances => self.refresh_open_balances()?,
            DraftCommand::AutoAllocate => draft.auto_allocate()?,
            DraftCommand::SetAllocation { target_id, amount } => {
                let applied = draft.set_allocation(&target_id, Money::parse_lenient(&amount))?;
                debug!(%target_id, applied = applied.cents(), "allocation set");
            }
            DraftCommand::AutoFillAllocation { target_id } => {
                draft.auto_fill_allocation(&target_id)?;
            }
            DraftCommand::ClearAllocations => draft.clear_allocations()?,

            DraftCommand::Undo | DraftCommand::Redo => {}
        }

        Ok(())
    }

    /// Resolves the party and checks it can stand on this kind of document.
    fn set_party(&mut self, party_id: Option<String>) -> Result<(), ApiError> {
        let Some(party_id) = party_id else {
            self.draft.set_party(None);
            return Ok(());
        };

        let kind = self.kind();
        let party_ref = PartyRef(party_id);
        let party = self
            .collaborators
            .catalog
            .resolve_party(&party_ref)
            .ok_or_else(|| ApiError::not_found("Party", &party_ref.0))?;

        let role = kind.party_role();
        if !party.acts_as(role) {
            return Err(ApiError::validation(format!(
                "{} is not a {}",
                party.name, role
            )));
        }

        if self.draft.party() == Some(&party_ref) {
            return Ok(());
        }

        self.draft.set_party(Some(party_ref));
        if kind.bears_allocations() {
            self.refresh_open_balances()?;
        }
        Ok(())
    }

    fn refresh_open_balances(&mut self) -> Result<(), ApiError> {
        let kind = self.kind();
        if !kind.bears_allocations() {
            return Err(CoreError::NotAllocationDocument(kind).into());
        }
        let party = self
            .draft
            .party()
            .cloned()
            .ok_or(SubmissionError::MissingParty(kind.party_role()))?;

        let targets = self.collaborators.ledger.open_balances(&party);
        debug!(party = %party.0, targets = targets.len(), "open balances loaded");
        self.draft.load_open_balances(targets)?;
        Ok(())
    }

    fn source_document(&self, source_id: &str) -> Result<SourceDocument, ApiError> {
        self.collaborators
            .ledger
            .source_document(source_id)
            .ok_or_else(|| ApiError::not_found("Source document", source_id))
    }
}

fn fresh_draft(kind: DocumentKind, config: &SessionConfig) -> DocumentDraft {
    let mut draft = DocumentDraft::with_defaults(kind, config.draft_defaults());
    draft.set_transaction_date(Some(Local::now().date_naive()));
    draft
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, StoreError};
    use crate::memory::{InMemoryCatalog, InMemoryLedger, InMemoryStore, RoleGate};
    use crate::ports::{Location, PartySummary};
    use chrono::NaiveDate;
    use janus_core::{
        DocumentDetails, OpenBalanceTarget, PartyRole, PaymentMethod, ProductDefaults,
        SelectionState, SourceLine, TaxRate,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_party(PartySummary {
                party_ref: PartyRef("c-1".into()),
                name: "Northwind Traders".into(),
                roles: vec![PartyRole::Customer],
            })
            .with_party(PartySummary {
                party_ref: PartyRef("s-1".into()),
                name: "Acme Supplies".into(),
                roles: vec![PartyRole::Supplier],
            })
            .with_product(ProductDefaults {
                product_ref: ProductRef("p-1".into()),
                description: "Copy Paper A4".into(),
                default_unit: "ream".into(),
                default_price: Money::from_cents(650),
                default_tax_rate: TaxRate::from_percent(10),
            })
            .with_location(Location {
                id: "wh-1".into(),
                name: "Main Warehouse".into(),
            })
    }

    fn target(id: &str, issued: NaiveDate, open: i64) -> OpenBalanceTarget {
        OpenBalanceTarget {
            target_id: id.into(),
            display_number: id.to_uppercase(),
            issued_date: issued,
            due_date: None,
            original_amount: None,
            open_balance: Money::from_cents(open),
        }
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new()
            .with_source(SourceDocument {
                id: "po-1".into(),
                number: "PO-2503-001".into(),
                kind: DocumentKind::PurchaseOrder,
                issued_date: Some(date(2025, 3, 1)),
                party_ref: None,
                lines: vec![SourceLine {
                    product_ref: None,
                    description: "Packaging Material".into(),
                    unit_of_measure: "pcs".into(),
                    quantity: Quantity::from_units(100),
                    unit_price: Money::from_cents(700),
                    tax_rate: TaxRate::zero(),
                }],
            })
            .with_open_balances(
                &PartyRef("c-1".into()),
                vec![
                    target("inv-b", date(2025, 2, 1), 50_000),
                    target("inv-a", date(2025, 1, 1), 75_000),
                ],
            )
    }

    fn session_with(kind: DocumentKind, gate: RoleGate) -> (DraftSession, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let collaborators = Collaborators::new(
            Arc::new(catalog()),
            Arc::new(gate),
            Arc::new(ledger()),
            store.clone(),
        );
        (
            DraftSession::new(kind, SessionConfig::default(), collaborators),
            store,
        )
    }

    fn session(kind: DocumentKind) -> (DraftSession, Arc<InMemoryStore>) {
        session_with(kind, RoleGate::admin())
    }

    fn first_line(session: &DraftSession) -> janus_core::LineId {
        session.draft().lines()[0].id.clone()
    }

    #[test]
    fn test_new_session_is_dated_today() {
        let (session, _) = session(DocumentKind::Invoice);
        let view = session.view();

        assert_eq!(view.transaction_date, Some(Local::now().date_naive()));
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.formatted.grand_total, "$0.00");
        assert!(!view.can_undo);
    }

    #[test]
    fn test_pick_product_and_edit_quantity() {
        let (mut session, _) = session(DocumentKind::Invoice);
        let line_id = first_line(&session);

        session
            .apply(DraftCommand::PickProduct {
                line_id: line_id.clone(),
                product_id: "p-1".into(),
            })
            .unwrap();
        let view = session
            .apply(DraftCommand::EditLine {
                line_id,
                description: None,
                unit_of_measure: None,
                quantity: Some("4".into()),
                unit_price: None,
                tax_percent: None,
            })
            .unwrap();

        assert_eq!(view.lines[0].description, "Copy Paper A4");
        assert_eq!(view.totals.net_total.cents(), 2600);
        assert_eq!(view.totals.tax_total.cents(), 260);
        assert_eq!(view.formatted.grand_total, "$28.60");
    }

    #[test]
    fn test_unknown_product_is_not_found() {
        let (mut session, _) = session(DocumentKind::Invoice);
        let err = session
            .apply(DraftCommand::PickProduct {
                line_id: first_line(&session),
                product_id: "nope".into(),
            })
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: nope");
    }

    #[test]
    fn test_party_role_is_checked() {
        let (mut session, _) = session(DocumentKind::Invoice);
        let err = session
            .apply(DraftCommand::SetParty {
                party_id: Some("s-1".into()),
            })
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Acme Supplies is not a customer");
        assert!(session.draft().party().is_none());
    }

    #[test]
    fn test_unknown_location_is_rejected() {
        let (mut session, _) = session(DocumentKind::PurchaseOrder);
        let err = session
            .apply(DraftCommand::SetLocation {
                location_id: Some("wh-9".into()),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let view = session
            .apply(DraftCommand::SetLocation {
                location_id: Some("wh-1".into()),
            })
            .unwrap();
        assert_eq!(view.location_id.as_deref(), Some("wh-1"));
    }

    #[test]
    fn test_wrong_kind_field_leaves_draft_untouched() {
        let (mut session, _) = session(DocumentKind::Estimate);
        let before = session.draft().clone();

        let err = session
            .apply(DraftCommand::SetPaymentMethod {
                method: Some(PaymentMethod::Cash),
            })
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(session.draft(), &before);
        assert!(!session.view().can_undo);
    }

    #[test]
    fn test_undo_redo() {
        let (mut session, _) = session(DocumentKind::Invoice);
        session
            .apply(DraftCommand::SetMessage {
                message: "Thanks!".into(),
            })
            .unwrap();
        session.apply(DraftCommand::AddLine).unwrap();
        assert_eq!(session.draft().lines().len(), 2);

        let view = session.apply(DraftCommand::Undo).unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.message, "Thanks!");
        assert!(view.can_redo);

        let view = session.apply(DraftCommand::Redo).unwrap();
        assert_eq!(view.lines.len(), 2);
        assert!(!view.can_redo);
    }

    #[test]
    fn test_noop_command_records_nothing() {
        let (mut session, _) = session(DocumentKind::Invoice);
        let view = session
            .apply(DraftCommand::SetMessage {
                message: String::new(),
            })
            .unwrap();
        assert!(!view.can_undo);
    }

    #[test]
    fn test_payment_party_loads_open_balances() {
        let (mut session, _) = session(DocumentKind::Payment);
        session
            .apply(DraftCommand::SetParty {
                party_id: Some("c-1".into()),
            })
            .unwrap();
        let view = session
            .apply(DraftCommand::SetAmountReceived {
                amount: "1,000.00".into(),
            })
            .unwrap();

        assert_eq!(view.open_balances.len(), 2);
        assert_eq!(
            session.draft().allocations()[1].allocated_amount.cents(),
            75_000
        );
        assert_eq!(
            session.draft().allocations()[0].allocated_amount.cents(),
            25_000
        );
        assert_eq!(view.unallocated, Money::zero());
    }

    #[test]
    fn test_refresh_requires_payment_and_party() {
        let (mut invoice, _) = session(DocumentKind::Invoice);
        let err = invoice.apply(DraftCommand::RefreshOpenBalances).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let (mut payment, _) = session(DocumentKind::Payment);
        let err = payment.apply(DraftCommand::RefreshOpenBalances).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Please select a customer");
    }

    #[test]
    fn test_import_purchase_order_into_purchase() {
        let (mut session, _) = session(DocumentKind::Purchase);
        session
            .apply(DraftCommand::SelectSource {
                source_id: "po-1".into(),
            })
            .unwrap();
        let view = session
            .apply(DraftCommand::ImportSources {
                source_ids: vec!["po-1".into()],
            })
            .unwrap();

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.totals.net_total.cents(), 70_000);
        assert_eq!(view.imported_source_ids, vec!["po-1".to_string()]);
        assert_eq!(session.draft().source_state("po-1"), SelectionState::Imported);
    }

    #[test]
    fn test_unknown_source_rolls_back_whole_import() {
        let (mut session, _) = session(DocumentKind::Purchase);
        let before = session.draft().clone();

        let err = session
            .apply(DraftCommand::ImportSources {
                source_ids: vec!["po-1".into(), "po-404".into()],
            })
            .unwrap_err();

        assert_eq!(err.message, "Source document not found: po-404");
        assert_eq!(session.draft(), &before);
    }

    #[test]
    fn test_edit_denied_by_gate() {
        let (mut session, _) = session_with(DocumentKind::Purchase, RoleGate::sales());
        let err = session.apply(DraftCommand::AddLine).unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.message, "You do not have permission to edit a purchase");
    }

    #[test]
    fn test_submit_denied_for_viewer() {
        let (mut session, store) = session_with(DocumentKind::Invoice, RoleGate::viewer());
        assert!(session.apply(DraftCommand::AddLine).is_ok());

        let err = session.submit().unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(store.is_empty());
    }

    fn fill_invoice(session: &mut DraftSession) {
        let line_id = first_line(session);
        let commands = vec![
            DraftCommand::SetParty {
                party_id: Some("c-1".into()),
            },
            DraftCommand::SetTransactionDate {
                date: Some(date(2025, 3, 8)),
            },
            DraftCommand::PickProduct {
                line_id: line_id.clone(),
                product_id: "p-1".into(),
            },
            DraftCommand::EditLine {
                line_id,
                description: None,
                unit_of_measure: None,
                quantity: Some("10".into()),
                unit_price: None,
                tax_percent: None,
            },
        ];
        for command in commands {
            session.apply(command).unwrap();
        }
    }

    #[test]
    fn test_submit_persists_and_resets() {
        let (mut session, store) = session(DocumentKind::Invoice);
        fill_invoice(&mut session);

        let receipt = session.submit().unwrap();

        assert_eq!(receipt.submission.grand_total.cents(), 7150);
        assert_eq!(
            receipt.submission.details,
            DocumentDetails::Invoice {
                terms: janus_core::PaymentTerms::Net30,
                due_date: Some(date(2025, 4, 7)),
            }
        );
        let stored = store.get(&receipt.document_id).unwrap();
        assert_eq!(stored.number, "INV-2503-001");
        assert_eq!(stored.tenant_id, janus_core::DEFAULT_TENANT_ID);

        // Fresh form afterwards
        assert!(session.draft().party().is_none());
        assert!(!session.view().can_undo);
    }

    #[test]
    fn test_validation_failure_keeps_draft() {
        let (mut session, store) = session(DocumentKind::Invoice);
        session
            .apply(DraftCommand::SetParty {
                party_id: Some("c-1".into()),
            })
            .unwrap();

        let err = session.submit().unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Please complete all item fields (line 1)");
        assert_eq!(session.draft().party(), Some(&PartyRef("c-1".into())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_failure_keeps_draft() {
        let (mut session, store) = session(DocumentKind::Invoice);
        fill_invoice(&mut session);
        store.fail_next(StoreError::Unavailable("database is offline".into()));

        let err = session.submit().unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert_eq!(err.message, "database is offline");
        assert_eq!(session.draft().lines()[0].description, "Copy Paper A4");

        // Retry succeeds
        assert!(session.submit().is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_discard_starts_over() {
        let (mut session, _) = session(DocumentKind::Invoice);
        fill_invoice(&mut session);

        let view = session.discard();
        assert!(view.party_id.is_none());
        assert_eq!(view.totals.grand_total, Money::zero());
        assert!(!view.can_undo);
    }
}
