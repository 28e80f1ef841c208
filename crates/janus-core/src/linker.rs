//! # Cross-Document Linking
//!
//! Brings lines from earlier documents into the one being edited: a
//! purchase order into a purchase, invoices and receipts into a refund or
//! credit note.
//!
//! ## Selection State Machine
//! ```text
//!                 select (first time)
//!   Unselected ─────────────────────────► Selected ──(import)──► Imported
//!       ▲                                                          │
//!       └──────────────────────── deselect ────────────────────────┘
//!                        (imported lines stay in the draft)
//!
//!   select again after deselect ──► Imported, no new lines
//! ```
//!
//! The linker only produces lines. Appending them to the draft is the
//! caller's job, so the draft stays the single owner of its line list.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::document::DocumentKind;
use crate::error::{CoreError, CoreResult};
use crate::line_items::LineItem;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{PartyRef, ProductRef, SourceDocumentRef, TaxRate};

// =============================================================================
// Source Documents
// =============================================================================

/// A previously issued document offered for import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SourceDocument {
    pub id: String,
    pub number: String,
    pub kind: DocumentKind,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub issued_date: Option<NaiveDate>,
    /// The customer or supplier the document was issued to, when known.
    #[serde(default)]
    pub party_ref: Option<PartyRef>,
    pub lines: Vec<SourceLine>,
}

impl SourceDocument {
    pub fn reference(&self) -> SourceDocumentRef {
        SourceDocumentRef {
            id: self.id.clone(),
            number: self.number.clone(),
        }
    }
}

/// One line of a source document, as the store reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SourceLine {
    #[serde(default)]
    pub product_ref: Option<ProductRef>,
    pub description: String,
    pub unit_of_measure: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    pub tax_rate: TaxRate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected,
    Imported,
}

// =============================================================================
// Linker
// =============================================================================

/// Tracks which sources this draft has pulled lines from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossDocumentLinker {
    target: DocumentKind,
    states: BTreeMap<String, SelectionState>,
    /// Sources whose lines are already in the draft. Survives deselection.
    imported: BTreeSet<String>,
}

impl CrossDocumentLinker {
    pub fn new(target: DocumentKind) -> Self {
        CrossDocumentLinker {
            target,
            states: BTreeMap::new(),
            imported: BTreeSet::new(),
        }
    }

    pub fn target(&self) -> DocumentKind {
        self.target
    }

    pub fn state(&self, source_id: &str) -> SelectionState {
        self.states.get(source_id).copied().unwrap_or_default()
    }

    pub fn is_imported(&self, source_id: &str) -> bool {
        self.imported.contains(source_id)
    }

    /// Ids of every source imported during this session, sorted.
    pub fn imported_ids(&self) -> Vec<String> {
        self.imported.iter().cloned().collect()
    }

    /// Selects one source and returns the lines to append.
    ///
    /// A source already imported in this session yields no lines, whether
    /// it is still selected or was deselected in between.
    pub fn select(&mut self, source: &SourceDocument) -> CoreResult<Vec<LineItem>> {
        self.check_kind(source)?;

        if self.imported.contains(&source.id) {
            self.states.insert(source.id.clone(), SelectionState::Imported);
            debug!(source = %source.number, "source already imported");
            return Ok(Vec::new());
        }

        self.states.insert(source.id.clone(), SelectionState::Selected);
        let lines = Self::build_lines(source);
        self.imported.insert(source.id.clone());
        self.states.insert(source.id.clone(), SelectionState::Imported);

        debug!(source = %source.number, lines = lines.len(), "source imported");
        Ok(lines)
    }

    /// Unticks a source. Its imported lines are left alone.
    pub fn deselect(&mut self, source_id: &str) {
        if self.states.remove(source_id).is_some() {
            debug!(source_id, "source deselected");
        }
    }

    /// Imports every source in `sources`, in order.
    ///
    /// All kinds are checked before anything is imported, so one bad
    /// source leaves the linker untouched.
    pub fn import_from(&mut self, sources: &[SourceDocument]) -> CoreResult<Vec<LineItem>> {
        for source in sources {
            self.check_kind(source)?;
        }
        let mut lines = Vec::new();
        for source in sources {
            lines.extend(self.select(source)?);
        }
        Ok(lines)
    }

    /// Forgets every selection (the draft's party changed).
    pub fn reset(&mut self) {
        self.states.clear();
        self.imported.clear();
    }

    fn check_kind(&self, source: &SourceDocument) -> CoreResult<()> {
        if self.target.accepts_imports_from(source.kind) {
            Ok(())
        } else {
            Err(CoreError::IncompatibleSource {
                target: self.target,
                source_kind: source.kind,
            })
        }
    }

    fn build_lines(source: &SourceDocument) -> Vec<LineItem> {
        let reference = source.reference();
        source
            .lines
            .iter()
            .map(|line| {
                LineItem::imported(
                    reference.clone(),
                    line.product_ref.clone(),
                    line.description.clone(),
                    line.unit_of_measure.clone(),
                    line.quantity,
                    line.unit_price,
                    line.tax_rate,
                )
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase_order(id: &str, line_count: usize) -> SourceDocument {
        SourceDocument {
            id: id.to_string(),
            number: format!("PO-2503-{}", id),
            kind: DocumentKind::PurchaseOrder,
            issued_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            party_ref: None,
            lines: (0..line_count)
                .map(|i| SourceLine {
                    product_ref: Some(ProductRef(i.to_string())),
                    description: format!("Material {}", i),
                    unit_of_measure: "kg".to_string(),
                    quantity: Quantity::from_units(50),
                    unit_price: Money::from_cents(1000),
                    tax_rate: TaxRate::from_percent(5),
                })
                .collect(),
        }
    }

    #[test]
    fn test_import_stamps_provenance() {
        let mut linker = CrossDocumentLinker::new(DocumentKind::Purchase);
        let source = purchase_order("001", 2);

        let lines = linker.select(&source).unwrap();

        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert_eq!(line.source, Some(source.reference()));
            assert_eq!(line.original_quantity, line.consumable_quantity);
            assert_eq!(line.amount().cents(), 50_000);
        }
        assert_ne!(lines[0].id, lines[1].id);
        assert_eq!(linker.state("001"), SelectionState::Imported);
    }

    #[test]
    fn test_reselect_does_not_duplicate() {
        let mut linker = CrossDocumentLinker::new(DocumentKind::Purchase);
        let source = purchase_order("001", 3);

        assert_eq!(linker.select(&source).unwrap().len(), 3);
        assert!(linker.select(&source).unwrap().is_empty());
        assert!(linker.import_from(&[source]).unwrap().is_empty());
    }

    #[test]
    fn test_deselect_then_reselect() {
        let mut linker = CrossDocumentLinker::new(DocumentKind::Purchase);
        let source = purchase_order("001", 1);
        linker.select(&source).unwrap();

        linker.deselect("001");
        assert_eq!(linker.state("001"), SelectionState::Unselected);
        assert!(linker.is_imported("001"));

        assert!(linker.select(&source).unwrap().is_empty());
        assert_eq!(linker.state("001"), SelectionState::Imported);
    }

    #[test]
    fn test_only_new_sources_import() {
        let mut linker = CrossDocumentLinker::new(DocumentKind::Purchase);
        let first = purchase_order("001", 2);
        let second = purchase_order("002", 1);
        linker.select(&first).unwrap();

        let lines = linker.import_from(&[first, second]).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(linker.imported_ids(), vec!["001".to_string(), "002".to_string()]);
    }

    #[test]
    fn test_incompatible_source_imports_nothing() {
        let mut linker = CrossDocumentLinker::new(DocumentKind::RefundReceipt);
        let mut invoice = purchase_order("INV", 1);
        invoice.kind = DocumentKind::Invoice;
        let order = purchase_order("001", 1);

        let err = linker.import_from(&[invoice, order]).unwrap_err();
        assert_eq!(
            err,
            CoreError::IncompatibleSource {
                target: DocumentKind::RefundReceipt,
                source_kind: DocumentKind::PurchaseOrder,
            }
        );
        assert!(linker.imported_ids().is_empty());
    }

    #[test]
    fn test_reset_forgets_imports() {
        let mut linker = CrossDocumentLinker::new(DocumentKind::Purchase);
        let source = purchase_order("001", 1);
        linker.select(&source).unwrap();

        linker.reset();
        assert_eq!(linker.state("001"), SelectionState::Unselected);
        assert_eq!(linker.select(&source).unwrap().len(), 1);
    }
}
