// crates/policy-ledger-core/tests/decision_log.rs
// ============================================================================
// Module: Decision Logger Tests
// Description: One persisted record per gate invocation.
// ============================================================================
//! ## Overview
//! Records are written for every outcome, in order, before the caller gets a
//! response; sink failures surface as errors and mirrored records land in the
//! event ledger as `policy.decision` envelopes.

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

use policy_ledger_core::AccessRequest;
use policy_ledger_core::Actor;
use policy_ledger_core::ActorContext;
use policy_ledger_core::ActorKind;
use policy_ledger_core::Decision;
use policy_ledger_core::DecisionLogError;
use policy_ledger_core::DecisionLogger;
use policy_ledger_core::DecisionRecord;
use policy_ledger_core::DecisionSink;
use policy_ledger_core::EventPayload;
use policy_ledger_core::GateLimits;
use policy_ledger_core::GateOutcome;
use policy_ledger_core::JsonlDecisionSink;
use policy_ledger_core::LedgerError;
use policy_ledger_core::LedgerMirror;
use policy_ledger_core::LedgerOptions;
use policy_ledger_core::LedgerWriter;
use policy_ledger_core::MemoryDecisionSink;
use policy_ledger_core::PolicySnapshot;
use policy_ledger_core::RequestId;
use policy_ledger_core::ResourceGate;
use policy_ledger_core::ResourceKind;
use policy_ledger_core::SessionId;
use policy_ledger_core::StaticActorResolver;
use policy_ledger_core::uri::raw_resource_uri;

struct FailingSink;

impl DecisionSink for FailingSink {
    fn write(&self, _record: &DecisionRecord) -> Result<(), LedgerError> {
        Err(LedgerError::Write("disk full".to_string()))
    }
}

fn gate(root: &Path) -> ResourceGate {
    fs::create_dir_all(root.join("projects/mcp")).expect("mkdir");
    fs::write(root.join("projects/mcp/readme.md"), "hello").expect("write");
    let policy = PolicySnapshot::new(["projects/mcp"]).expect("policy");
    ResourceGate::open(policy, root, GateLimits::default()).expect("gate")
}

fn access(gate: &ResourceGate, raw: &str) -> (AccessRequest, GateOutcome) {
    let request = AccessRequest {
        request_id: RequestId::generate(),
        uri: raw_resource_uri(ResourceKind::File, raw),
        resource_kind: ResourceKind::File,
        path_param_raw: raw.to_string(),
    };
    let outcome = gate.resolve(ResourceKind::File, raw);
    (request, outcome)
}

#[test]
fn every_read_produces_one_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(dir.path());
    let sink = Arc::new(MemoryDecisionSink::new());
    let logger = DecisionLogger::new(sink.clone());

    let (request, outcome) = access(&gate, "projects%2Fmcp%2Freadme.md");
    let allow = logger.record(&request, &outcome).expect("allow record");
    let (request, outcome) = access(&gate, ".gitignore");
    let deny = logger.record(&request, &outcome).expect("deny record");

    assert_eq!(allow.decision, Decision::Allow);
    assert_eq!(allow.reason.code, "OK");
    assert_eq!(allow.path_decoded, "projects/mcp/readme.md");
    assert_eq!(deny.decision, Decision::Deny);
    assert_eq!(deny.reason.code, "FORBIDDEN");
    assert_eq!(deny.policy.allowed_roots, vec!["projects/mcp".to_string()]);
    assert_eq!(sink.records(), vec![allow, deny]);
}

#[test]
fn filesystem_denials_are_recorded_with_their_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(dir.path());
    let sink = Arc::new(MemoryDecisionSink::new());
    let logger = DecisionLogger::new(sink.clone());
    let (request, outcome) = access(&gate, "projects%2Fmcp%2Fmissing.md");
    let record = logger.record(&request, &outcome).expect("record");
    assert_eq!(record.decision, Decision::Deny);
    assert_eq!(record.reason.code, "NOT_FOUND");
    assert_eq!(record.path_param_raw, "projects%2Fmcp%2Fmissing.md");
}

#[test]
fn jsonl_sink_appends_one_line_per_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(&dir.path().join("repo"));
    let log_path = dir.path().join("logs/decisions.jsonl");
    let logger = DecisionLogger::new(Arc::new(JsonlDecisionSink::open(&log_path, false).expect("sink")));
    for raw in ["projects%2Fmcp%2Freadme.md", "projects%2Fmcp%2Freadme.md"] {
        let (request, outcome) = access(&gate, raw);
        logger.record(&request, &outcome).expect("record");
    }
    let text = fs::read_to_string(&log_path).expect("read");
    let rows: Vec<DecisionRecord> =
        text.lines().map(|line| serde_json::from_str(line).expect("row")).collect();
    assert_eq!(rows.len(), 2);
    assert_ne!(rows[0].request_id, rows[1].request_id);
    assert!(rows.iter().all(|row| row.schema == "mcp-policy-decision/v1"));
}

#[test]
fn disabled_logger_still_returns_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(dir.path());
    let logger = DecisionLogger::disabled();
    assert!(!logger.enabled());
    let (request, outcome) = access(&gate, "projects%2Fmcp%2Freadme.md");
    assert_eq!(logger.record(&request, &outcome).expect("record").decision, Decision::Allow);
}

#[test]
fn sink_failure_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(dir.path());
    let logger = DecisionLogger::new(Arc::new(FailingSink));
    let (request, outcome) = access(&gate, "projects%2Fmcp%2Freadme.md");
    let err = logger.record(&request, &outcome).unwrap_err();
    assert!(matches!(err, DecisionLogError::Sink(LedgerError::Write(_))));
}

#[test]
fn mirror_appends_policy_decision_envelopes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(&dir.path().join("repo"));
    let ledger = Arc::new(
        LedgerWriter::open(&dir.path().join("events.jsonl"), LedgerOptions::default()).expect("ledger"),
    );
    let actors = StaticActorResolver::new()
        .with(ActorContext::resource_server(), Actor::new(ActorKind::Runtime, "mcp-policy-server"))
        .expect("bind");
    let mirror = LedgerMirror::new(Arc::clone(&ledger), Arc::new(actors), SessionId::new("policy-ledger"));
    let logger = DecisionLogger::new(Arc::new(MemoryDecisionSink::new())).with_mirror(mirror);

    let (request, outcome) = access(&gate, "projects%2Fmcp%2Freadme.md");
    let record = logger.record(&request, &outcome).expect("record");

    let snapshot = ledger.read().expect("read");
    assert_eq!(snapshot.envelopes.len(), 1);
    let envelope = &snapshot.envelopes[0];
    assert_eq!(envelope.event_type, "policy.decision");
    assert_eq!(envelope.trace_id.as_str(), record.request_id.as_str());
    assert_eq!(envelope.actor.id, "mcp-policy-server");
    let EventPayload::PolicyDecision(mirrored) = envelope.typed_payload(ledger.registry()).expect("payload")
    else {
        panic!("expected decision payload");
    };
    assert_eq!(mirrored, record);
}

#[test]
fn mirror_without_actor_fails_closed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gate = gate(&dir.path().join("repo"));
    let ledger = Arc::new(
        LedgerWriter::open(&dir.path().join("events.jsonl"), LedgerOptions::default()).expect("ledger"),
    );
    let mirror = LedgerMirror::new(
        Arc::clone(&ledger),
        Arc::new(StaticActorResolver::new()),
        SessionId::new("policy-ledger"),
    );
    let records = Arc::new(MemoryDecisionSink::new());
    let logger = DecisionLogger::new(Arc::clone(&records) as Arc<dyn DecisionSink>).with_mirror(mirror);
    let (request, outcome) = access(&gate, "projects%2Fmcp%2Freadme.md");
    assert!(matches!(logger.record(&request, &outcome), Err(DecisionLogError::Actor(_))));
    assert!(ledger.read().expect("read").envelopes.is_empty());
    assert!(records.records().is_empty(), "failed mirror leaves the decision log untouched");
}
