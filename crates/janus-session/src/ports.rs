//! # Collaborator Ports
//!
//! Everything a session needs from outside the engine, as traits.
//!
//! ```text
//! ┌─────────────────────┬──────────────────────────────────────────────────┐
//! │ Port                │ Used for                                         │
//! ├─────────────────────┼──────────────────────────────────────────────────┤
//! │ CatalogProvider     │ product defaults, party and location lookups     │
//! │ PermissionGate      │ yes/no before every edit and before submit       │
//! │ DocumentLedger      │ importable source documents, open balances       │
//! │ DocumentStore       │ the single terminal submit call                  │
//! └─────────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! All ports are read-only from the session's point of view except
//! [`DocumentStore::submit`].

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use janus_core::{
    DocumentKind, DocumentSubmission, OpenBalanceTarget, PartyRef, PartyRole, ProductDefaults,
    ProductRef, SourceDocument,
};

use crate::error::StoreError;

// =============================================================================
// Shared Types
// =============================================================================

/// Identifier the store assigns to a saved document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A customer or supplier as the catalog knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PartySummary {
    pub party_ref: PartyRef,
    pub name: String,
    /// A party can be both customer and supplier.
    pub roles: Vec<PartyRole>,
}

impl PartySummary {
    pub fn acts_as(&self, role: PartyRole) -> bool {
        self.roles.contains(&role)
    }
}

/// A warehouse or site goods are received at or shipped from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Location {
    pub id: String,
    pub name: String,
}

/// What the permission gate is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Action {
    Edit(DocumentKind),
    Submit(DocumentKind),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Edit(kind) => write!(f, "edit {} {}", kind.article(), kind),
            Action::Submit(kind) => write!(f, "submit {} {}", kind.article(), kind),
        }
    }
}

// =============================================================================
// Ports
// =============================================================================

/// Read-only lookups for catalog data.
pub trait CatalogProvider: Send + Sync {
    fn resolve_product(&self, product: &ProductRef) -> Option<ProductDefaults>;

    fn resolve_party(&self, party: &PartyRef) -> Option<PartySummary>;

    fn resolve_location(&self, location_id: &str) -> Option<Location>;
}

/// Authorization, consulted before an operation is allowed.
pub trait PermissionGate: Send + Sync {
    fn is_allowed(&self, action: Action) -> bool;
}

/// Previously issued documents and the balances still open on them.
pub trait DocumentLedger: Send + Sync {
    fn source_document(&self, id: &str) -> Option<SourceDocument>;

    /// Snapshot of the party's unpaid obligations.
    fn open_balances(&self, party: &PartyRef) -> Vec<OpenBalanceTarget>;
}

/// Durable storage for finished documents.
pub trait DocumentStore: Send + Sync {
    /// Persists a validated document and returns its identifier.
    fn submit(
        &self,
        tenant_id: &str,
        submission: &DocumentSubmission,
    ) -> Result<DocumentId, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Edit(DocumentKind::Invoice).to_string(), "edit an invoice");
        assert_eq!(
            Action::Submit(DocumentKind::PurchaseOrder).to_string(),
            "submit a purchase order"
        );
    }

    #[test]
    fn test_action_serde() {
        let json = serde_json::to_value(Action::Submit(DocumentKind::Payment)).unwrap();
        assert_eq!(json["action"], "submit");
        assert_eq!(json["kind"], "payment");
    }
}
