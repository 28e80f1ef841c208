//! # Submission Validation
//!
//! The only hard gate in the engine. Edits are clamped and coerced while
//! the form is open; these checks run once, when the user presses save.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. party selected                                                     │
//! │  2. transaction date set                                               │
//! │  3. due date set                       (invoice)                       │
//! │  4. payment method chosen              (receipts, refunds, payments)   │
//! │  5. amount received > 0                (payment)                       │
//! │  6. at least one line                  (every kind except payment)     │
//! │  7. every line complete                                                │
//! │  8. something allocated                (payment)                       │
//! │                                                                         │
//! │  First failure wins. The draft is never modified.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::document::DocumentDetails;
use crate::draft::DocumentDraft;
use crate::error::SubmissionError;
use crate::line_items::LineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, SubmissionError>;

/// Checks a draft against every submission rule and reports the first
/// violation.
pub fn validate_draft(draft: &DocumentDraft) -> ValidationResult<()> {
    let kind = draft.kind();

    if draft.party().is_none() {
        return Err(SubmissionError::MissingParty(kind.party_role()));
    }
    if draft.transaction_date().is_none() {
        return Err(SubmissionError::MissingTransactionDate {
            label: kind.date_label(),
        });
    }
    if let DocumentDetails::Invoice { due_date: None, .. } = draft.details() {
        return Err(SubmissionError::MissingDueDate);
    }
    if kind.requires_payment_method() && draft.details().payment_method().is_none() {
        return Err(SubmissionError::MissingPaymentMethod);
    }
    if let Some(received) = draft.details().amount_received() {
        if !received.is_positive() {
            return Err(SubmissionError::InvalidAmountReceived);
        }
    }
    if kind.carries_lines() {
        validate_lines(draft.lines())?;
    }
    if kind.bears_allocations() && !draft.total_allocated().is_positive() {
        return Err(SubmissionError::NothingAllocated);
    }

    Ok(())
}

/// Checks that there is at least one line and that every line is complete.
///
/// ## Example
/// ```rust
/// use janus_core::error::SubmissionError;
/// use janus_core::line_items::LineItem;
/// use janus_core::validation::validate_lines;
///
/// assert_eq!(validate_lines(&[]), Err(SubmissionError::NoLines));
/// assert_eq!(
///     validate_lines(&[LineItem::blank()]),
///     Err(SubmissionError::IncompleteLine { position: 1 })
/// );
/// ```
pub fn validate_lines(lines: &[LineItem]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(SubmissionError::NoLines);
    }
    match lines.iter().position(|line| !line.is_complete()) {
        Some(index) => Err(SubmissionError::IncompleteLine { position: index + 1 }),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
