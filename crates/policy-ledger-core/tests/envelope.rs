// crates/policy-ledger-core/tests/envelope.rs
// ============================================================================
// Module: Envelope Codec Tests
// Description: Encode/decode validation of event envelopes.
// ============================================================================
//! ## Overview
//! Covers payload hash verification, actor checks, timestamp shape, the
//! payload registry, and the envelope hash projection.

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

use policy_ledger_core::Actor;
use policy_ledger_core::ActorKind;
use policy_ledger_core::BootMode;
use policy_ledger_core::BootPayload;
use policy_ledger_core::CodecError;
use policy_ledger_core::EnvelopeDraft;
use policy_ledger_core::ErrorCode;
use policy_ledger_core::EventPayload;
use policy_ledger_core::EventTimestamp;
use policy_ledger_core::PayloadRegistry;
use policy_ledger_core::ProcessId;
use policy_ledger_core::RunId;
use policy_ledger_core::SessionId;
use policy_ledger_core::SystemId;
use policy_ledger_core::TraceId;
use policy_ledger_core::envelope::canonical_line;
use policy_ledger_core::envelope::compute_envelope_hash;
use policy_ledger_core::envelope::decode;
use policy_ledger_core::envelope::encode;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

fn boot_draft() -> EnvelopeDraft {
    let run_id = RunId::new("run_0001");
    let ts = EventTimestamp::parse("2026-01-02T03:04:05.678Z").expect("ts");
    EnvelopeDraft {
        ts: ts.clone(),
        session_id: SessionId::new("policy-ledger"),
        trace_id: run_id.as_trace(),
        span_id: None,
        actor: Actor::new(ActorKind::System, "policy-ledger-lifecycle"),
        payload: EventPayload::SystemBoot(BootPayload {
            system_id: SystemId::new("sys_a"),
            process_id: ProcessId::new("proc_a"),
            run_id,
            boot_mode: BootMode::Cold,
            started_at: ts,
            recovered_from_run_id: None,
        }),
    }
}

fn encoded_value() -> Map<String, Value> {
    let registry = PayloadRegistry::builtin();
    let envelope = encode(boot_draft(), &registry).expect("encode");
    match serde_json::to_value(&envelope).expect("value") {
        Value::Object(map) => map,
        other => panic!("unexpected {other}"),
    }
}

fn decode_value(value: &Map<String, Value>) -> Result<(), CodecError> {
    let bytes = serde_json::to_vec(value).expect("bytes");
    decode(&bytes, &PayloadRegistry::builtin()).map(|_| ())
}

#[test]
fn encode_then_decode_preserves_envelope() {
    let registry = PayloadRegistry::builtin();
    let envelope = encode(boot_draft(), &registry).expect("encode");
    assert_eq!(envelope.event_type, "system.boot");
    assert_eq!(envelope.schema_version, "1.1");
    assert_eq!(envelope.payload["recovered_from_run_id"], Value::Null);
    let line = canonical_line(&envelope).expect("line");
    let decoded = decode(&line, &registry).expect("decode");
    assert_eq!(decoded, envelope);
}

#[test]
fn tampered_payload_is_hash_mismatch() {
    let mut value = encoded_value();
    value["payload"]["process_id"] = json!("proc_b");
    let err = decode_value(&value).unwrap_err();
    assert_eq!(err.code(), ErrorCode::HashMismatch);
}

#[test]
fn unknown_or_empty_actor_is_missing_actor() {
    for id in ["", "unknown", "  "] {
        let mut value = encoded_value();
        value["actor"]["id"] = json!(id);
        let err = decode_value(&value).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingActor, "id {id:?}");
    }
    let mut value = encoded_value();
    value["actor"]["kind"] = Value::Null;
    assert_eq!(decode_value(&value).unwrap_err().code(), ErrorCode::MissingActor);
    let mut value = encoded_value();
    value.remove("actor");
    assert_eq!(decode_value(&value).unwrap_err().code(), ErrorCode::MissingActor);
}

#[test]
fn timestamps_must_be_utc_with_milliseconds() {
    for ts in ["2026-01-02T03:04:05Z", "2026-01-02T03:04:05.678+01:00", "yesterday"] {
        let mut value = encoded_value();
        value["ts"] = json!(ts);
        let err = decode_value(&value).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SchemaInvalid, "ts {ts}");
    }
}

#[test]
fn unknown_session_is_rejected() {
    let mut value = encoded_value();
    value["session_id"] = json!("unknown");
    assert!(matches!(decode_value(&value), Err(CodecError::SchemaInvalid(_))));
}

#[test]
fn missing_fields_are_parse_errors() {
    let mut value = encoded_value();
    value.remove("payload_hash");
    assert!(matches!(decode_value(&value), Err(CodecError::Parse(_))));
    assert!(matches!(
        decode(b"{not json", &PayloadRegistry::builtin()),
        Err(CodecError::Parse(_))
    ));
}

#[test]
fn non_object_payload_is_schema_invalid() {
    let mut value = encoded_value();
    value["payload"] = json!([1, 2, 3]);
    assert!(matches!(decode_value(&value), Err(CodecError::SchemaInvalid(_))));
}

#[test]
fn opaque_types_require_registration_and_reject_trace_keys() {
    let mut registry = PayloadRegistry::builtin();
    let mut draft = boot_draft();
    draft.payload = EventPayload::Opaque {
        event_type: "agent.note".to_string(),
        body: json!({"text": "hello"}).as_object().cloned().expect("object"),
    };
    let err = encode(draft.clone(), &registry).unwrap_err();
    assert!(matches!(err, CodecError::SchemaInvalid(_)));

    registry.register_opaque("agent.note").expect("register");
    let envelope = encode(draft.clone(), &registry).expect("encode");
    assert_eq!(envelope.event_type, "agent.note");

    draft.payload = EventPayload::Opaque {
        event_type: "agent.note".to_string(),
        body: json!({"trace_id": "t"}).as_object().cloned().expect("object"),
    };
    assert!(matches!(encode(draft, &registry), Err(CodecError::SchemaInvalid(_))));
    assert!(registry.register_opaque("system.boot").is_err());
    assert!(registry.register_opaque("Bad Type").is_err());
}

#[test]
fn typed_payload_schema_is_enforced() {
    let mut value = encoded_value();
    let payload = json!({"system_id": "sys_a"});
    let payload_hash = policy_ledger_core::canonical_hash(&payload).expect("hash");
    value["payload"] = payload;
    value["payload_hash"] = json!(payload_hash);
    assert!(matches!(decode_value(&value), Err(CodecError::SchemaInvalid(_))));
}

#[test]
fn envelope_hash_covers_header_but_not_itself() {
    let registry = PayloadRegistry::builtin();
    let mut envelope = encode(boot_draft(), &registry).expect("encode");
    let base = compute_envelope_hash(&envelope).expect("hash");
    envelope.envelope_hash = Some("ff".repeat(32));
    assert_eq!(compute_envelope_hash(&envelope).expect("hash"), base);
    envelope.trace_id = TraceId::new("run_other");
    assert_ne!(compute_envelope_hash(&envelope).expect("hash"), base);
    envelope.trace_id = TraceId::new("run_0001");
    envelope.prev_envelope_hash = Some("00".repeat(32));
    assert_ne!(compute_envelope_hash(&envelope).expect("hash"), base);
}
