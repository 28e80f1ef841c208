//! # In-Memory Collaborators
//!
//! Implementations of every port backed by plain collections. Used by the
//! replay tool and the tests; a real deployment plugs in its own.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use janus_core::{
    DocumentKind, DocumentSubmission, OpenBalanceTarget, PartyRef, ProductDefaults, ProductRef,
    SourceDocument,
};

use crate::error::StoreError;
use crate::ports::{
    Action, CatalogProvider, DocumentId, DocumentLedger, DocumentStore, Location,
    PartySummary, PermissionGate,
};

// =============================================================================
// Catalog
// =============================================================================

/// Catalog seeded up front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryCatalog {
    #[serde(default)]
    pub products: Vec<ProductDefaults>,
    #[serde(default)]
    pub parties: Vec<PartySummary>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, product: ProductDefaults) -> Self {
        self.products.push(product);
        self
    }

    pub fn with_party(mut self, party: PartySummary) -> Self {
        self.parties.push(party);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn resolve_product(&self, product: &ProductRef) -> Option<ProductDefaults> {
        self.products.iter().find(|p| &p.product_ref == product).cloned()
    }

    fn resolve_party(&self, party: &PartyRef) -> Option<PartySummary> {
        self.parties.iter().find(|p| &p.party_ref == party).cloned()
    }

    fn resolve_location(&self, location_id: &str) -> Option<Location> {
        self.locations.iter().find(|l| l.id == location_id).cloned()
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryLedger {
    #[serde(default)]
    pub sources: Vec<SourceDocument>,
    /// Open balances keyed by party id.
    #[serde(default)]
    pub open_balances: HashMap<String, Vec<OpenBalanceTarget>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: SourceDocument) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_open_balances(mut self, party: &PartyRef, targets: Vec<OpenBalanceTarget>) -> Self {
        self.open_balances.insert(party.0.clone(), targets);
        self
    }
}

impl DocumentLedger for InMemoryLedger {
    fn source_document(&self, id: &str) -> Option<SourceDocument> {
        self.sources.iter().find(|s| s.id == id).cloned()
    }

    fn open_balances(&self, party: &PartyRef) -> Vec<OpenBalanceTarget> {
        self.open_balances.get(&party.0).cloned().unwrap_or_default()
    }
}

// =============================================================================
// Permission Gate
// =============================================================================

/// A role with a fixed set of allowed actions.
#[derive(Debug, Clone)]
pub struct RoleGate {
    role: String,
    allowed: HashSet<Action>,
}

impl RoleGate {
    pub fn new(role: impl Into<String>, allowed: impl IntoIterator<Item = Action>) -> Self {
        RoleGate {
            role: role.into(),
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Every action on every kind.
    pub fn admin() -> Self {
        Self::new("admin", Self::edit_and_submit(&DocumentKind::ALL))
    }

    /// Sales documents and customer payments.
    pub fn sales() -> Self {
        let kinds = DocumentKind::ALL
            .into_iter()
            .filter(|k| k.party_role() == janus_core::PartyRole::Customer)
            .collect::<Vec<_>>();
        Self::new("sales", Self::edit_and_submit(&kinds))
    }

    /// Purchase orders and purchases.
    pub fn purchasing() -> Self {
        Self::new(
            "purchasing",
            Self::edit_and_submit(&[DocumentKind::PurchaseOrder, DocumentKind::Purchase]),
        )
    }

    /// May edit any draft but submit nothing.
    pub fn viewer() -> Self {
        Self::new("viewer", DocumentKind::ALL.into_iter().map(Action::Edit))
    }

    /// Looks a built-in role up by name.
    pub fn named(role: &str) -> Option<Self> {
        match role {
            "admin" => Some(Self::admin()),
            "sales" => Some(Self::sales()),
            "purchasing" => Some(Self::purchasing()),
            "viewer" => Some(Self::viewer()),
            _ => None,
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    fn edit_and_submit(kinds: &[DocumentKind]) -> Vec<Action> {
        kinds
            .iter()
            .flat_map(|&k| [Action::Edit(k), Action::Submit(k)])
            .collect()
    }
}

impl PermissionGate for RoleGate {
    fn is_allowed(&self, action: Action) -> bool {
        self.allowed.contains(&action)
    }
}

// =============================================================================
// Store
// =============================================================================

/// A saved document as the in-memory store keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: DocumentId,
    pub tenant_id: String,
    /// Assigned from the per-kind sequence when the draft had none.
    pub number: String,
    pub submission: DocumentSubmission,
}

#[derive(Debug, Default)]
struct StoreInner {
    documents: Vec<StoredDocument>,
    sequences: HashMap<DocumentKind, u32>,
    fail_next: Option<StoreError>,
}

/// Document store holding everything in a `Mutex<Vec<_>>`.
///
/// Numbers are unique per tenant; a duplicate is rejected the way a
/// unique index would reject it.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `submit` fail with `error`.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().fail_next = Some(error);
    }

    pub fn documents(&self) -> Vec<StoredDocument> {
        self.lock().documents.clone()
    }

    pub fn get(&self, id: &DocumentId) -> Option<StoredDocument> {
        self.lock().documents.iter().find(|d| &d.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for InMemoryStore {
    fn submit(
        &self,
        tenant_id: &str,
        submission: &DocumentSubmission,
    ) -> Result<DocumentId, StoreError> {
        let mut inner = self.lock();

        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }

        let number = match &submission.number {
            Some(number) => number.clone(),
            None => {
                let sequence = inner.sequences.entry(submission.kind).or_insert(0);
                *sequence += 1;
                submission
                    .kind
                    .format_number(submission.transaction_date, *sequence)
            }
        };

        let duplicate = inner
            .documents
            .iter()
            .any(|d| d.tenant_id == tenant_id && d.number == number);
        if duplicate {
            return Err(StoreError::Rejected(format!(
                "Document number {} already exists",
                number
            )));
        }

        let id = DocumentId(Uuid::new_v4().to_string());
        debug!(%id, %number, kind = %submission.kind, "document stored");
        inner.documents.push(StoredDocument {
            id: id.clone(),
            tenant_id: tenant_id.to_string(),
            number,
            submission: submission.clone(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use janus_core::{DocumentDraft, LinePatch, PartyRole};

    fn submission(number: Option<&str>) -> DocumentSubmission {
        let mut draft = DocumentDraft::new(DocumentKind::PurchaseOrder);
        draft.set_party(Some(PartyRef("s-1".into())));
        draft.set_transaction_date(chrono::NaiveDate::from_ymd_opt(2025, 3, 8));
        draft.set_number(number.map(str::to_string));
        let id = draft.lines()[0].id.clone();
        draft
            .update_line(
                &id,
                LinePatch::new()
                    .description("Packaging Material")
                    .unit_of_measure("pcs")
                    .quantity_text("100")
                    .unit_price_text("7"),
            )
            .unwrap();
        draft.to_submission().unwrap()
    }

    #[test]
    fn test_store_assigns_numbers() {
        let store = InMemoryStore::new();
        let first = store.submit("t", &submission(None)).unwrap();
        store.submit("t", &submission(None)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&first).unwrap().number, "PO-2503-001");
        assert_eq!(store.documents()[1].number, "PO-2503-002");
    }

    #[test]
    fn test_store_rejects_duplicate_number() {
        let store = InMemoryStore::new();
        store.submit("t", &submission(Some("PO-7"))).unwrap();

        let err = store.submit("t", &submission(Some("PO-7"))).unwrap_err();
        assert_eq!(err.to_string(), "Document number PO-7 already exists");

        // Other tenants have their own number space
        assert!(store.submit("other", &submission(Some("PO-7"))).is_ok());
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let store = InMemoryStore::new();
        store.fail_next(StoreError::Unavailable("offline".into()));

        assert!(store.submit("t", &submission(None)).is_err());
        assert!(store.submit("t", &submission(None)).is_ok());
    }

    #[test]
    fn test_role_gate() {
        let sales = RoleGate::sales();
        assert!(sales.is_allowed(Action::Submit(DocumentKind::Invoice)));
        assert!(!sales.is_allowed(Action::Edit(DocumentKind::Purchase)));

        let viewer = RoleGate::named("viewer").unwrap();
        assert!(viewer.is_allowed(Action::Edit(DocumentKind::Payment)));
        assert!(!viewer.is_allowed(Action::Submit(DocumentKind::Payment)));
        assert!(RoleGate::named("root").is_none());
    }

    #[test]
    fn test_catalog_lookups() {
        let catalog = InMemoryCatalog::new()
            .with_party(PartySummary {
                party_ref: PartyRef("s-1".into()),
                name: "Acme Supplies".into(),
                roles: vec![PartyRole::Supplier],
            })
            .with_location(Location {
                id: "wh-1".into(),
                name: "Main Warehouse".into(),
            });

        assert_eq!(
            catalog.resolve_party(&PartyRef("s-1".into())).unwrap().name,
            "Acme Supplies"
        );
        assert!(catalog.resolve_location("wh-1").is_some());
        assert!(catalog.resolve_product(&ProductRef("1".into())).is_none());
    }
}
