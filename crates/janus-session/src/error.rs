//! # API Error Type
//!
//! What the form layer receives when a session operation fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in a Draft Session                        │
//! │                                                                         │
//! │  Form                        Session                                    │
//! │  ────                        ───────                                    │
//! │                                                                         │
//! │  session.apply(cmd) / submit()                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Permission denied? ─── FORBIDDEN ─────────────────────┐        │  │
//! │  │         │                                               │        │  │
//! │  │         ▼                                               ▼        │  │
//! │  │  Core error? ──── CoreError / SubmissionError ──── ApiError ───►│  │
//! │  │         │                                               ▲        │  │
//! │  │         ▼                                               │        │  │
//! │  │  Store failed? ── StoreError (message kept verbatim) ───┘        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "VALIDATION_ERROR", "message": "Please add at least one item" }
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use janus_core::{CoreError, SubmissionError};

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by the document store.
///
/// The message is written by the store and shown to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store refused the document (duplicate number, closed period).
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached; the user may retry.
    #[error("{0}")]
    Unavailable(String),
}

// =============================================================================
// API Error
// =============================================================================

/// API error returned from session operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 42"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Referenced product, party, line or document does not exist
    NotFound,

    /// Submission rules failed; the draft is kept for correction
    ValidationError,

    /// The permission gate refused the action
    Forbidden,

    /// The document store failed
    PersistenceError,

    /// The operation does not apply to this document kind
    BusinessLogic,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound(id) => ApiError::not_found("Line", &id),
            CoreError::TargetNotFound(id) => ApiError::not_found("Open balance", &id),
            CoreError::Submission(e) => ApiError::from(e),
            e @ (CoreError::IncompatibleSource { .. }
            | CoreError::ForeignSource { .. }
            | CoreError::NotAllocationDocument(_)
            | CoreError::NotApplicable { .. }) => {
                ApiError::new(ErrorCode::BusinessLogic, e.to_string())
            }
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Store errors keep their message exactly as the store wrote it.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::new(ErrorCode::PersistenceError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
