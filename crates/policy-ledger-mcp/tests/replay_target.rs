// crates/policy-ledger-mcp/tests/replay_target.rs
// ============================================================================
// Module: Replay Target Tests
// Description: Compile decision logs and replay them against a live server.
// ============================================================================
//! ## Overview
//! A plan compiled from the server's own decision log must pass against the
//! same roots and report drift once the allowlist changes.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use policy_ledger_core::DecisionLogger;
use policy_ledger_core::GateLimits;
use policy_ledger_core::JsonlDecisionSink;
use policy_ledger_core::MemoryDecisionSink;
use policy_ledger_core::PlanFilters;
use policy_ledger_core::PolicySnapshot;
use policy_ledger_core::ReplayStatus;
use policy_ledger_core::ReplayTarget;
use policy_ledger_core::ResourceGate;
use policy_ledger_core::TargetError;
use policy_ledger_core::Decision;
use policy_ledger_core::runtime::compile_file;
use policy_ledger_core::runtime::run_replay;
use policy_ledger_mcp::ResourceServer;

fn sandbox() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("repo");
    fs::create_dir_all(root.join("projects/mcp")).expect("mkdir");
    fs::create_dir_all(root.join("docs")).expect("mkdir docs");
    fs::write(root.join(".gitignore"), "target\n").expect("gitignore");
    fs::write(root.join("projects/mcp/readme.md"), "# mcp\n").expect("readme");
    fs::write(root.join("docs/guide.md"), "guide\n").expect("guide");
    dir
}

fn server(root: &Path, roots: &[&str], log: &Path) -> ResourceServer {
    let policy = PolicySnapshot::new(roots).expect("policy");
    let gate = ResourceGate::open(policy, root, GateLimits::default()).expect("gate");
    let sink = JsonlDecisionSink::open(log, false).expect("sink");
    ResourceServer::new(gate, DecisionLogger::new(Arc::new(sink)), log.display().to_string())
}

const URIS: [&str; 4] = [
    "mcpfs://repo/file/projects%2Fmcp%2Freadme.md",
    "mcpfs://repo/file/.gitignore",
    "mcpfs://repo/dir/projects%2Fmcp",
    "mcpfs://repo/file/docs%2Fguide.md",
];

#[test]
fn compiled_log_replays_clean_then_drifts() {
    let dir = sandbox();
    let root = dir.path().join("repo");
    let log = dir.path().join("decisions.jsonl");
    let live = server(&root, &["projects/mcp"], &log);
    for uri in URIS {
        live.read(uri).expect("read");
    }

    let compiled = compile_file(&log, &PlanFilters::default()).expect("compile");
    assert_eq!(compiled.plan.steps.len(), 4);
    assert_eq!(compiled.plan.roots_hash.as_deref(), Some(live.policy().roots_hash()));

    let replay_log = dir.path().join("replay.jsonl");
    let same = server(&root, &["projects/mcp"], &replay_log);
    let report = run_replay(&compiled.plan, &same).expect("replay");
    assert_eq!(report.status, ReplayStatus::Pass);
    assert_eq!(report.stats.allow, 2);
    assert_eq!(report.stats.deny, 2);
    let replayed = fs::read_to_string(&replay_log).expect("replay log");
    assert_eq!(replayed.lines().count(), 4, "replay reads are logged too");

    let widened = server(&root, &["projects/mcp", "docs"], &dir.path().join("wide.jsonl"));
    let report = run_replay(&compiled.plan, &widened).expect("replay");
    assert_eq!(report.status, ReplayStatus::Drift);
    assert_eq!(report.stats.mismatch, 1);
}

#[test]
fn observe_rejects_ungated_uris() {
    let dir = sandbox();
    let root = dir.path().join("repo");
    let policy = PolicySnapshot::new(["projects/mcp"]).expect("policy");
    let gate = ResourceGate::open(policy, &root, GateLimits::default()).expect("gate");
    let records = Arc::new(MemoryDecisionSink::new());
    let server = ResourceServer::new(gate, DecisionLogger::new(records.clone()), "memory");
    assert!(matches!(server.observe("mcpfs://repo/policy"), Err(TargetError::InvalidUri(_))));
    assert!(matches!(server.observe("file:///etc/passwd"), Err(TargetError::InvalidUri(_))));
    let observed = server.observe("mcpfs://repo/file/.gitignore").expect("observe");
    assert_eq!(observed.error_code.as_deref(), Some("FORBIDDEN"));
    assert_eq!(records.records().len(), 1);
}

#[test]
fn allowed_json_bodies_replay_as_their_logged_decision() {
    let dir = sandbox();
    let root = dir.path().join("repo");
    fs::write(root.join("projects/mcp/fixture.json"), r#"{"ok":false,"error":{"code":"X"}}"#)
        .expect("fixture");
    let log = dir.path().join("decisions.jsonl");
    let live = server(&root, &["projects/mcp"], &log);
    let read = live.read("mcpfs://repo/file/projects%2Fmcp%2Ffixture.json").expect("read");
    assert_eq!(read.record.as_ref().map(|record| record.decision), Some(Decision::Allow));

    let compiled = compile_file(&log, &PlanFilters::default()).expect("compile");
    let same = server(&root, &["projects/mcp"], &dir.path().join("replay.jsonl"));
    let report = run_replay(&compiled.plan, &same).expect("replay");
    assert_eq!(report.status, ReplayStatus::Pass, "{:?}", report.steps);
    assert_eq!(report.steps[0].observed.decision, Decision::Allow);
    assert_eq!(report.steps[0].observed.error_code, None);
}
