// crates/policy-ledger-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Policy Ledger configuration. The output is
//! deterministic and spells out every default.

/// Returns a canonical example `policy-ledger.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[policy]
allowed_roots = ["projects/mcp"]
sandbox_root = "."
max_file_bytes = 512000
max_dir_entries = 200

[decision_log]
enabled = true
path = "runtime_data/policy_decisions.jsonl"
fsync = false
mirror_to_ledger = false

[ledger]
path = "runtime_data/events.jsonl"
chain = "chained"
fsync = false
event_types = []

[lifecycle]
identity_path = "runtime_data/system_identity.json"
session_id = "policy-ledger"

[server]
max_line_bytes = 1048576
diagnostics = "stderr"
# diagnostics_path = "runtime_data/server_diagnostics.jsonl"

[[actors]]
context = "lifecycle"
kind = "system"
id = "policy-ledger-lifecycle"
source = "policy-ledger"

[[actors]]
context = "resource_server"
kind = "runtime"
id = "policy-ledger-resource-server"
source = "policy-ledger"
"#,
    )
}
