//! # Janus Session
//!
//! The layer a document form talks to. A [`DraftSession`] owns one draft,
//! its undo history and the collaborators behind it; the form sends
//! [`DraftCommand`]s and renders the [`DraftView`] that comes back.
//!
//! ## Module Organization
//! ```text
//! janus_session/
//! ├── lib.rs          ◄─── You are here (exports & tracing setup)
//! ├── session.rs      ◄─── DraftSession: gate, apply, undo/redo, submit
//! ├── command.rs      ◄─── DraftCommand (wire input), DraftView (output)
//! ├── ports.rs        ◄─── Catalog / Gate / Ledger / Store traits
//! ├── memory.rs       ◄─── In-memory implementations of every port
//! ├── history.rs      ◄─── Bounded snapshot undo stack
//! ├── config.rs       ◄─── Tenant settings (JANUS_* env vars)
//! ├── error.rs        ◄─── ApiError returned to the form
//! └── bin/
//!     └── draft_replay.rs  ◄─── Replays a JSON command script
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use janus_core::DocumentKind;
//! use janus_session::{
//!     Collaborators, DraftCommand, DraftSession, InMemoryCatalog, InMemoryLedger,
//!     InMemoryStore, RoleGate, SessionConfig,
//! };
//!
//! let collaborators = Collaborators::new(
//!     Arc::new(InMemoryCatalog::new()),
//!     Arc::new(RoleGate::admin()),
//!     Arc::new(InMemoryLedger::new()),
//!     Arc::new(InMemoryStore::new()),
//! );
//! let mut session = DraftSession::new(DocumentKind::Estimate, SessionConfig::default(), collaborators);
//!
//! let view = session.apply(DraftCommand::AddLine).unwrap();
//! assert_eq!(view.lines.len(), 2);
//! assert!(view.can_undo);
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod history;
pub mod memory;
pub mod ports;
pub mod session;

use tracing_subscriber::EnvFilter;

pub use command::{DraftCommand, DraftView, FormattedTotals};
pub use config::SessionConfig;
pub use error::{ApiError, ErrorCode, StoreError};
pub use history::History;
pub use memory::{InMemoryCatalog, InMemoryLedger, InMemoryStore, RoleGate, StoredDocument};
pub use ports::{
    Action, CatalogProvider, DocumentId, DocumentLedger, DocumentStore, Location, PartySummary,
    PermissionGate,
};
pub use session::{Collaborators, DraftSession, SubmitReceipt};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=janus_core=trace` - Trace the engines only
/// - Default: INFO, DEBUG for janus crates
///
/// Output goes to stderr so stdout stays free for JSON.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,janus_core=debug,janus_session=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
