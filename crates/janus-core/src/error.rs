//! # Error Types
//!
//! Domain-specific error types for janus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  janus-core errors (this file)                                         │
//! │  ├── CoreError        - Caller mistakes (unknown ids, wrong kind)      │
//! │  └── SubmissionError  - Draft not ready to hand to persistence         │
//! │                                                                         │
//! │  janus-session errors (separate crate)                                 │
//! │  ├── StoreError       - Persistence collaborator failures              │
//! │  └── ApiError         - What the form layer sees (serialized)          │
//! │                                                                         │
//! │  Flow: SubmissionError → CoreError → ApiError → Form                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What is NOT an error
//! Unparseable numbers and out-of-range quantities or allocations are
//! clamped while the user edits. They never surface here.

use thiserror::Error;

use crate::document::DocumentKind;
use crate::types::PartyRole;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No line with this id exists in the draft.
    ///
    /// ## When This Occurs
    /// - The form holds a stale id for a line that was already removed
    /// - An undo restored a snapshot that predates the line
    #[error("Line not found: {0}")]
    LineNotFound(String),

    /// No open balance with this id was loaded into the allocation.
    #[error("Open balance not found: {0}")]
    TargetNotFound(String),

    /// The draft cannot import lines from a document of this kind.
    ///
    /// ## Example
    /// Importing a purchase order into a refund receipt.
    #[error("Cannot import {} {source_kind} into {} {target}", .source_kind.article(), .target.article())]
    IncompatibleSource {
        target: DocumentKind,
        source_kind: DocumentKind,
    },

    /// The source document was issued to a different party than the one
    /// selected on the draft.
    #[error("{number} does not belong to the selected {role}")]
    ForeignSource { number: String, role: PartyRole },

    /// Allocation operations were called on a document without allocations.
    #[error("Open balances cannot be allocated on {} {0}", .0.article())]
    NotAllocationDocument(DocumentKind),

    /// A header field was set on a kind that does not carry it.
    #[error("Field '{field}' does not apply to {} {kind}", .kind.article())]
    NotApplicable {
        kind: DocumentKind,
        field: &'static str,
    },

    /// Submission validation failed (wraps SubmissionError).
    #[error("{0}")]
    Submission(#[from] SubmissionError),
}

// =============================================================================
// Submission Error
// =============================================================================

/// Why a draft cannot be handed to persistence yet.
///
/// Only the first violation found is reported. Each message is shown to
/// the user as-is, and the draft stays intact for correction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please select a {0}")]
    MissingParty(PartyRole),

    /// `label` is the kind-specific date name ("invoice date").
    #[error("Please select {label}")]
    MissingTransactionDate { label: &'static str },

    #[error("Please select a due date")]
    MissingDueDate,

    #[error("Please select a payment method")]
    MissingPaymentMethod,

    #[error("Please enter a valid amount received")]
    InvalidAmountReceived,

    #[error("Please add at least one item")]
    NoLines,

    /// `position` is 1-based, matching the row number on the form.
    #[error("Please complete all item fields (line {position})")]
    IncompleteLine { position: usize },

    #[error("Please allocate payment to at least one invoice")]
    NothingAllocated,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
