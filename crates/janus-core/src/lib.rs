//! # janus-core: Pure Business Logic for Janus Documents
//!
//! This crate is the computation engine behind every financial document
//! form: invoices, receipts, refunds, estimates, purchase orders,
//! purchases, payments and credit notes. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Janus Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Form Layer (external)                        │   │
//! │  │    Invoice form ──► Purchase form ──► Payment form ──► ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ DraftCommand / DraftView               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    janus-session                                │   │
//! │  │    permission gate, catalog lookup, undo/redo, submit          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ janus-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │line_items │  │allocation │  │  linker   │  │   │
//! │  │   │ Money Qty │  │  engine   │  │  oldest   │  │  imports  │  │   │
//! │  │   │  TaxRate  │  │  totals   │  │  first    │  │ PO → PUR  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                        draft + validation                       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] / [`quantity`] - Fixed-point amounts and quantities
//! - [`types`] - Shared value types (TaxRate, LineId, PaymentTerms, ...)
//! - [`document`] - Document kinds and their kind-specific fields
//! - [`line_items`] - Line ledger with proration of imported quantities
//! - [`totals`] - Document totals
//! - [`allocation`] - Payment allocation over open balances
//! - [`linker`] - Importing lines from source documents
//! - [`draft`] - The document under edit
//! - [`validation`] - Submission rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: cents (i64) and thousandths of a unit, never floats
//! 2. **Clamp, Don't Reject**: edits never fail on user input
//! 3. **One Hard Gate**: validation runs only at submission
//! 4. **Always Fresh**: totals are recomputed on every mutation
//!
//! ## Example Usage
//!
//! ```rust
//! use janus_core::line_items::LinePatch;
//! use janus_core::{DocumentDraft, DocumentKind};
//!
//! let mut draft = DocumentDraft::new(DocumentKind::Invoice);
//! let id = draft.lines()[0].id.clone();
//!
//! draft
//!     .update_line(
//!         &id,
//!         LinePatch::new()
//!             .quantity_text("3")
//!             .unit_price_text("10.00")
//!             .tax_percent_text("8.25"),
//!     )
//!     .unwrap();
//!
//! // 30.00 + 2.475 tax, rounded half away from zero
//! assert_eq!(draft.totals().grand_total.cents(), 3248);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod document;
pub mod draft;
pub mod error;
pub mod line_items;
pub mod linker;
pub mod money;
pub mod quantity;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allocation::{Allocation, AllocationEngine, OpenBalanceTarget};
pub use document::{DocumentDetails, DocumentKind};
pub use draft::{DocumentDraft, DocumentSubmission, DraftDefaults, SubmittedLine};
pub use error::{CoreError, CoreResult, SubmissionError};
pub use line_items::{LineItem, LineItemEngine, LinePatch};
pub use linker::{CrossDocumentLinker, SelectionState, SourceDocument, SourceLine};
pub use money::Money;
pub use quantity::Quantity;
pub use totals::{compute_totals, DocumentTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID when none is configured.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";
