// crates/policy-ledger-core/tests/ledger.rs
// ============================================================================
// Module: Ledger Writer Tests
// Description: Append, chaining, snapshot reads, and verification.
// ============================================================================
//! ## Overview
//! Exercises the JSONL ledger end to end on temporary files: chain heads per
//! session, reseeding on reopen, torn tails, corruption, and the verifier.

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
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use policy_ledger_core::Actor;
use policy_ledger_core::ActorKind;
use policy_ledger_core::ChainMode;
use policy_ledger_core::EnvelopeDraft;
use policy_ledger_core::ErrorCode;
use policy_ledger_core::EventPayload;
use policy_ledger_core::EventTimestamp;
use policy_ledger_core::LedgerError;
use policy_ledger_core::LedgerOptions;
use policy_ledger_core::LedgerWriter;
use policy_ledger_core::PayloadRegistry;
use policy_ledger_core::SessionId;
use policy_ledger_core::TraceId;
use policy_ledger_core::envelope::encode;
use policy_ledger_core::runtime::read_ledger;
use policy_ledger_core::runtime::verify_ledger;
use serde_json::Value;
use serde_json::json;

fn registry() -> PayloadRegistry {
    let mut registry = PayloadRegistry::builtin();
    registry.register_opaque("test.note").expect("register");
    registry
}

fn options(chain: ChainMode) -> LedgerOptions {
    LedgerOptions {
        chain,
        fsync: false,
        registry: registry(),
    }
}

fn note(session: &str, text: &str) -> EnvelopeDraft {
    EnvelopeDraft {
        ts: EventTimestamp::now(),
        session_id: SessionId::new(session),
        trace_id: TraceId::new("trace_test"),
        span_id: None,
        actor: Actor::new(ActorKind::Agent, "agent-7"),
        payload: EventPayload::Opaque {
            event_type: "test.note".to_string(),
            body: json!({"text": text}).as_object().cloned().expect("object"),
        },
    }
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).expect("read").lines().count()
}

#[test]
fn hash_chain_links_within_each_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("runtime_data/events.jsonl");
    let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");

    let a1 = ledger.emit(note("s-a", "one")).expect("a1");
    let b1 = ledger.emit(note("s-b", "two")).expect("b1");
    let a2 = ledger.emit(note("s-a", "three")).expect("a2");

    assert_eq!(a1.prev_envelope_hash, None);
    assert_eq!(b1.prev_envelope_hash, None);
    assert_eq!(a2.prev_envelope_hash, a1.envelope_hash);
    assert!(a2.envelope_hash.is_some());
    assert_eq!(line_count(&path), 3);

    let report = verify_ledger(&path, &registry(), ChainMode::Chained).expect("verify");
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.envelopes, 3);
}

#[test]
fn reopening_seeds_chain_heads_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let first = {
        let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");
        ledger.emit(note("s-a", "one")).expect("first")
    };
    let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("reopen");
    assert_eq!(ledger.head(&SessionId::new("s-a")), first.envelope_hash);
    let second = ledger.emit(note("s-a", "two")).expect("second");
    assert_eq!(second.prev_envelope_hash, first.envelope_hash);
}

#[test]
fn unchained_ledger_leaves_chain_fields_unset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let ledger = LedgerWriter::open(&path, options(ChainMode::None)).expect("open");
    let written = ledger.emit(note("s-a", "one")).expect("emit");
    assert_eq!(written.prev_envelope_hash, None);
    assert_eq!(written.envelope_hash, None);
    let text = fs::read_to_string(&path).expect("read");
    assert!(!text.contains("envelope_hash"));
}

#[test]
fn append_rejects_preset_chain_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");
    let mut envelope = encode(note("s-a", "one"), &registry()).expect("encode");
    envelope.envelope_hash = Some("ab".repeat(32));
    assert!(matches!(ledger.append(envelope), Err(LedgerError::Codec(_))));
    assert_eq!(line_count(&path), 0);
}

#[test]
fn lines_are_canonical_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");
    ledger.emit(note("s-a", "one")).expect("emit");
    let text = fs::read_to_string(&path).expect("read");
    let line = text.lines().next().expect("line");
    let value: Value = serde_json::from_str(line).expect("json");
    let canonical = policy_ledger_core::hashing::canonical_json_bytes(&value).expect("jcs");
    assert_eq!(line.as_bytes(), canonical.as_slice());
    assert!(text.ends_with('\n'));
}

#[test]
fn partial_tail_is_ignored_and_corrupt_line_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");
    ledger.emit(note("s-a", "one")).expect("emit");
    {
        let mut file = OpenOptions::new().append(true).open(&path).expect("open");
        file.write_all(b"{\"schema_version\":\"1.1\"").expect("torn write");
    }
    let snapshot = read_ledger(&path, &registry()).expect("read");
    assert_eq!(snapshot.envelopes.len(), 1);
    assert_eq!(snapshot.partial_tail_bytes, 23);

    {
        let mut file = OpenOptions::new().append(true).open(&path).expect("open");
        file.write_all(b"\n").expect("finish torn line");
    }
    let err = read_ledger(&path, &registry()).unwrap_err();
    assert!(matches!(err, LedgerError::Corrupt { line: 2, .. }), "{err:?}");
}

#[test]
fn verifier_reports_tampering_without_stopping() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");
    ledger.emit(note("s-a", "one")).expect("one");
    ledger.emit(note("s-a", "two")).expect("two");
    ledger.emit(note("s-a", "three")).expect("three");
    drop(ledger);

    let text = fs::read_to_string(&path).expect("read");
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    lines[1] = lines[1].replace("\"two\"", "\"2wo\"");
    fs::write(&path, lines.join("\n") + "\n").expect("rewrite");

    let report = verify_ledger(&path, &registry(), ChainMode::Chained).expect("verify");
    assert_eq!(report.lines, 3);
    assert_eq!(report.envelopes, 2);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].line, 2);
    assert_eq!(report.issues[0].code, ErrorCode::HashMismatch);
}

#[test]
fn concurrent_appends_never_interleave() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let ledger = Arc::new(LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open"));
    let workers: Vec<_> = (0 .. 4)
        .map(|worker| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for index in 0 .. 25 {
                    ledger.emit(note("s-shared", &format!("{worker}-{index}"))).expect("emit");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("join");
    }
    let snapshot = read_ledger(&path, &registry()).expect("read");
    assert_eq!(snapshot.envelopes.len(), 100);
    let report = verify_ledger(&path, &registry(), ChainMode::Chained).expect("verify");
    assert!(report.is_clean(), "{:?}", report.issues);
}

#[test]
fn writers_sharing_a_ledger_keep_one_chain() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let server = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open server");
    let lifecycle = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open lifecycle");

    let one = server.emit(note("policy-ledger", "one")).expect("one");
    let two = lifecycle.emit(note("policy-ledger", "two")).expect("two");
    let three = server.emit(note("policy-ledger", "three")).expect("three");
    assert_eq!(two.prev_envelope_hash, one.envelope_hash);
    assert_eq!(three.prev_envelope_hash, two.envelope_hash);
    assert_eq!(server.head(&SessionId::new("policy-ledger")), three.envelope_hash);

    let report = verify_ledger(&path, &registry(), ChainMode::Chained).expect("verify");
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.envelopes, 3);
}

#[test]
fn concurrent_writers_on_one_file_verify_clean() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("events.jsonl");
    let workers: Vec<_> = (0 .. 3)
        .map(|worker| {
            let ledger = LedgerWriter::open(&path, options(ChainMode::Chained)).expect("open");
            thread::spawn(move || {
                for index in 0 .. 20 {
                    ledger.emit(note("s-shared", &format!("{worker}-{index}"))).expect("emit");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("join");
    }
    let report = verify_ledger(&path, &registry(), ChainMode::Chained).expect("verify");
    assert_eq!(report.envelopes, 60);
    assert!(report.is_clean(), "{:?}", report.issues);
}
