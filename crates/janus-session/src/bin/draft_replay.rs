//! # Draft Replay
//!
//! Runs a recorded form session against in-memory collaborators and prints
//! the resulting view as JSON. Handy for reproducing a bug report or
//! checking totals without a UI.
//!
//! ## Usage
//! ```bash
//! # Replay a script
//! cargo run -p janus-session --bin draft-replay -- session.json
//!
//! # Read the script from stdin, pretty-print the report
//! cat session.json | cargo run -p janus-session --bin draft-replay -- - --pretty
//! ```
//!
//! ## Script Format
//! ```json
//! {
//!   "kind": "invoice",
//!   "role": "sales",
//!   "catalog": { "parties": [...], "products": [...], "locations": [...] },
//!   "ledger": { "sources": [...], "openBalances": { "c-1": [...] } },
//!   "commands": [
//!     { "command": "set_party", "partyId": "c-1" },
//!     { "command": "add_line" }
//!   ],
//!   "submit": true
//! }
//! ```
//!
//! A failing command is reported and the replay carries on, the same way
//! the form would show the error and let the user keep typing.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use janus_core::DocumentKind;
use janus_session::{
    init_tracing, ApiError, Collaborators, DraftCommand, DraftSession, DraftView, InMemoryCatalog,
    InMemoryLedger, InMemoryStore, RoleGate, SessionConfig, SubmitReceipt,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplayScript {
    kind: DocumentKind,
    #[serde(default = "default_role")]
    role: String,
    #[serde(default)]
    catalog: InMemoryCatalog,
    #[serde(default)]
    ledger: InMemoryLedger,
    #[serde(default)]
    commands: Vec<DraftCommand>,
    #[serde(default)]
    submit: bool,
}

fn default_role() -> String {
    "admin".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepFailure {
    /// 1-based position in the script.
    step: usize,
    error: ApiError,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayReport {
    view: DraftView,
    failures: Vec<StepFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<SubmitReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    submit_error: Option<ApiError>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut script_path: Option<String> = None;
    let mut pretty = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pretty" | "-p" => pretty = true,
            "--help" | "-h" => {
                println!("Janus Draft Replay");
                println!();
                println!("Usage: draft-replay [OPTIONS] <SCRIPT>");
                println!();
                println!("Arguments:");
                println!("  <SCRIPT>        JSON script path, or - for stdin");
                println!();
                println!("Options:");
                println!("  -p, --pretty    Pretty-print the JSON report");
                println!("  -h, --help      Show this help message");
                println!();
                println!("Environment:");
                println!("  JANUS_*         Session configuration (see SessionConfig)");
                println!("  RUST_LOG        Log filter, logs go to stderr");
                return Ok(());
            }
            other => script_path = Some(other.to_string()),
        }
        i += 1;
    }

    let script_path = script_path.ok_or("missing script path (try --help)")?;

    init_tracing();

    let raw = if script_path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(&script_path)?
    };
    let script: ReplayScript = serde_json::from_str(&raw)?;

    let gate = RoleGate::named(&script.role)
        .ok_or_else(|| format!("unknown role '{}'", script.role))?;
    let config = SessionConfig::from_env();

    info!(
        kind = %script.kind,
        role = gate.role(),
        commands = script.commands.len(),
        "replaying draft session"
    );

    let collaborators = Collaborators::new(
        Arc::new(script.catalog),
        Arc::new(gate),
        Arc::new(script.ledger),
        Arc::new(InMemoryStore::new()),
    );
    let mut session = DraftSession::new(script.kind, config, collaborators);

    let mut failures = Vec::new();
    for (index, command) in script.commands.into_iter().enumerate() {
        if let Err(error) = session.apply(command) {
            failures.push(StepFailure {
                step: index + 1,
                error,
            });
        }
    }

    // Captured before submit, which resets the session on success
    let view = session.view();

    let (receipt, submit_error) = if script.submit {
        match session.submit() {
            Ok(receipt) => (Some(receipt), None),
            Err(error) => (None, Some(error)),
        }
    } else {
        (None, None)
    };

    let report = ReplayReport {
        view,
        failures,
        receipt,
        submit_error,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);

    Ok(())
}
