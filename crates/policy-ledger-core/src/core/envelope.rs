// crates/policy-ledger-core/src/core/envelope.rs
// ============================================================================
// Module: Event Envelope Codec
// Description: Canonical event envelope, payload registry, and validation.
// Purpose: Encode, decode, and verify every recorded fact before it is trusted.
// Dependencies: serde, serde_json, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! The envelope is the fixed wrapper around every recorded fact: who
//! (`actor`), when (`ts`), what (`event_type`, `payload`), and a content hash
//! (`payload_hash`). Payloads are a tagged union keyed by `event_type` and
//! validated per variant through a [`PayloadRegistry`].
//!
//! ## Envelope hash contract (`envelope-hash/v1`)
//! `envelope_hash` is the lowercase hex SHA-256 of the RFC 8785 canonical
//! bytes of this projection:
//!
//! ```text
//! { "hash_contract": "envelope-hash/v1", "schema_version", "event_type",
//!   "ts", "session_id", "trace_id", "span_id"?, "actor", "payload_hash",
//!   "prev_envelope_hash"? }
//! ```
//!
//! Optional members are omitted when absent. The payload is covered through
//! `payload_hash`, `envelope_hash` never hashes itself, and unknown
//! extension fields are excluded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::actor::Actor;
use crate::core::actor::UNKNOWN_IDENTITY;
use crate::core::decision::DecisionRecord;
use crate::core::decision::POLICY_DECISION_EVENT;
use crate::core::error_code::ErrorCode;
use crate::core::hashing::HashError;
use crate::core::hashing::canonical_hash;
use crate::core::hashing::canonical_json_bytes;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::SpanId;
use crate::core::identifiers::TraceId;
use crate::core::lifecycle::BootPayload;
use crate::core::lifecycle::SYSTEM_BOOT_EVENT;
use crate::core::lifecycle::SYSTEM_SHUTDOWN_EVENT;
use crate::core::lifecycle::ShutdownPayload;
use crate::core::time::EventTimestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Envelope schema version written by this codec.
pub const ENVELOPE_SCHEMA_VERSION: &str = "1.1";
/// Identifier of the envelope hash derivation.
pub const ENVELOPE_HASH_CONTRACT: &str = "envelope-hash/v1";
/// Payload keys reserved for envelope-level tracing context.
pub const FORBIDDEN_PAYLOAD_KEYS: &[&str] = &["trace_id", "span_id", "parent_span_id"];
/// Maximum event type length.
const MAX_EVENT_TYPE_LENGTH: usize = 128;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Envelope codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Bytes are not a well-formed envelope.
    #[error("envelope parse error: {0}")]
    Parse(String),
    /// Envelope fails schema validation.
    #[error("envelope schema invalid: {0}")]
    SchemaInvalid(String),
    /// Payload hash does not verify.
    #[error("payload hash mismatch: expected {expected}, found {found}")]
    HashMismatch {
        /// Recomputed hash.
        expected: String,
        /// Hash carried by the envelope.
        found: String,
    },
    /// Actor is missing or not a concrete identity.
    #[error("missing actor: {0}")]
    MissingActor(String),
}

impl CodecError {
    /// Returns the stable reason code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) | Self::SchemaInvalid(_) => ErrorCode::SchemaInvalid,
            Self::HashMismatch {
                ..
            } => ErrorCode::HashMismatch,
            Self::MissingActor(_) => ErrorCode::MissingActor,
        }
    }
}

impl From<HashError> for CodecError {
    fn from(err: HashError) -> Self {
        Self::SchemaInvalid(err.to_string())
    }
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Canonical event record.
///
/// # Invariants
/// - `payload_hash == canonical_hash(payload)`.
/// - `session_id` is never empty or `unknown`.
/// - Immutable once appended to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Envelope schema version.
    pub schema_version: String,
    /// Event type selecting the payload variant.
    pub event_type: String,
    /// Event time.
    pub ts: EventTimestamp,
    /// Session identifier.
    pub session_id: SessionId,
    /// Trace identifier.
    pub trace_id: TraceId,
    /// Optional span identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<SpanId>,
    /// Accountable actor.
    pub actor: Actor,
    /// Event payload object.
    pub payload: Map<String, Value>,
    /// Canonical hash of `payload`.
    pub payload_hash: String,
    /// Envelope hash of the previous envelope in the same session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_envelope_hash: Option<String>,
    /// Hash of this envelope under `envelope-hash/v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envelope_hash: Option<String>,
}

impl EventEnvelope {
    /// Returns the typed payload view.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaInvalid`] when the payload does not match
    /// its registered variant.
    pub fn typed_payload(&self, registry: &PayloadRegistry) -> Result<EventPayload, CodecError> {
        registry.parse_payload(&self.event_type, &self.payload)
    }
}

/// Inputs for a new envelope. The event type comes from the payload variant.
#[derive(Debug, Clone)]
pub struct EnvelopeDraft {
    /// Event time.
    pub ts: EventTimestamp,
    /// Session identifier.
    pub session_id: SessionId,
    /// Trace identifier.
    pub trace_id: TraceId,
    /// Optional span identifier.
    pub span_id: Option<SpanId>,
    /// Accountable actor.
    pub actor: Actor,
    /// Typed payload.
    pub payload: EventPayload,
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Payload variants keyed by `event_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// `system.boot`.
    SystemBoot(BootPayload),
    /// `system.shutdown`.
    SystemShutdown(ShutdownPayload),
    /// `policy.decision`.
    PolicyDecision(DecisionRecord),
    /// An event type registered as opaque.
    Opaque {
        /// Registered event type.
        event_type: String,
        /// Payload object.
        body: Map<String, Value>,
    },
}

impl EventPayload {
    /// Returns the event type for the variant.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::SystemBoot(_) => SYSTEM_BOOT_EVENT,
            Self::SystemShutdown(_) => SYSTEM_SHUTDOWN_EVENT,
            Self::PolicyDecision(_) => POLICY_DECISION_EVENT,
            Self::Opaque {
                event_type, ..
            } => event_type,
        }
    }

    /// Serializes the payload into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaInvalid`] when the variant does not
    /// serialize to an object.
    pub fn to_object(&self) -> Result<Map<String, Value>, CodecError> {
        let value = match self {
            Self::SystemBoot(payload) => serde_json::to_value(payload),
            Self::SystemShutdown(payload) => serde_json::to_value(payload),
            Self::PolicyDecision(record) => serde_json::to_value(record),
            Self::Opaque {
                body, ..
            } => return Ok(body.clone()),
        }
        .map_err(|err| CodecError::SchemaInvalid(err.to_string()))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(CodecError::SchemaInvalid("payload must be a json object".to_string())),
        }
    }
}

/// Registry of accepted event types.
///
/// # Invariants
/// - Built-in types are always registered and always typed.
/// - Other types must be registered explicitly; unregistered types fail
///   validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadRegistry {
    /// Event types accepted with an opaque object payload.
    opaque: BTreeSet<String>,
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PayloadRegistry {
    /// Returns a registry with only the built-in typed variants.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            opaque: BTreeSet::new(),
        }
    }

    /// Registers an additional event type with an opaque payload.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaInvalid`] for malformed or built-in names.
    pub fn register_opaque(&mut self, event_type: impl Into<String>) -> Result<(), CodecError> {
        let event_type = event_type.into();
        validate_event_type(&event_type)?;
        if is_builtin(&event_type) {
            return Err(CodecError::SchemaInvalid(format!(
                "event type '{event_type}' is built in and cannot be registered as opaque"
            )));
        }
        self.opaque.insert(event_type);
        Ok(())
    }

    /// Returns true when the event type is accepted.
    #[must_use]
    pub fn is_registered(&self, event_type: &str) -> bool {
        is_builtin(event_type) || self.opaque.contains(event_type)
    }

    /// Parses a payload object into its typed variant.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::SchemaInvalid`] for unregistered types or
    /// payloads that do not match their variant.
    pub fn parse_payload(
        &self,
        event_type: &str,
        payload: &Map<String, Value>,
    ) -> Result<EventPayload, CodecError> {
        let value = Value::Object(payload.clone());
        let invalid = |err: serde_json::Error| {
            CodecError::SchemaInvalid(format!("{event_type} payload: {err}"))
        };
        match event_type {
            SYSTEM_BOOT_EVENT => serde_json::from_value(value)
                .map(EventPayload::SystemBoot)
                .map_err(invalid),
            SYSTEM_SHUTDOWN_EVENT => serde_json::from_value(value)
                .map(EventPayload::SystemShutdown)
                .map_err(invalid),
            POLICY_DECISION_EVENT => serde_json::from_value(value)
                .map(EventPayload::PolicyDecision)
                .map_err(invalid),
            other if self.opaque.contains(other) => Ok(EventPayload::Opaque {
                event_type: other.to_string(),
                body: payload.clone(),
            }),
            other => Err(CodecError::SchemaInvalid(format!("unregistered event type '{other}'"))),
        }
    }
}

/// Returns true for built-in event types.
fn is_builtin(event_type: &str) -> bool {
    matches!(event_type, SYSTEM_BOOT_EVENT | SYSTEM_SHUTDOWN_EVENT | POLICY_DECISION_EVENT)
}

/// Validates an event type label.
fn validate_event_type(event_type: &str) -> Result<(), CodecError> {
    let valid = !event_type.is_empty()
        && event_type.len() <= MAX_EVENT_TYPE_LENGTH
        && event_type.bytes().all(|byte| {
            byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'.' || byte == b'_'
        });
    if valid {
        Ok(())
    } else {
        Err(CodecError::SchemaInvalid(format!("invalid event type '{event_type}'")))
    }
}

// ============================================================================
// SECTION: Encode / Decode
// ============================================================================

/// Builds and validates an envelope from a draft.
///
/// Chain fields are left unset; the ledger writer assigns them.
///
/// # Errors
///
/// Returns [`CodecError`] when the draft fails validation.
pub fn encode(draft: EnvelopeDraft, registry: &PayloadRegistry) -> Result<EventEnvelope, CodecError> {
    let payload = draft.payload.to_object()?;
    let payload_hash = canonical_hash(&payload)?;
    let envelope = EventEnvelope {
        schema_version: ENVELOPE_SCHEMA_VERSION.to_string(),
        event_type: draft.payload.event_type().to_string(),
        ts: draft.ts,
        session_id: draft.session_id,
        trace_id: draft.trace_id,
        span_id: draft.span_id,
        actor: draft.actor,
        payload,
        payload_hash,
        prev_envelope_hash: None,
        envelope_hash: None,
    };
    validate(&envelope, registry)?;
    Ok(envelope)
}

/// Parses and validates one serialized envelope.
///
/// # Errors
///
/// Returns [`CodecError`] when the bytes are malformed or fail validation.
pub fn decode(bytes: &[u8], registry: &PayloadRegistry) -> Result<EventEnvelope, CodecError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| CodecError::Parse(err.to_string()))?;
    let Value::Object(object) = &value else {
        return Err(CodecError::Parse("envelope must be a json object".to_string()));
    };
    check_raw_actor(object)?;
    if object.get("payload").is_some_and(|payload| !payload.is_object()) {
        return Err(CodecError::SchemaInvalid("payload must be a json object".to_string()));
    }
    let envelope: EventEnvelope =
        serde_json::from_value(value).map_err(|err| CodecError::Parse(err.to_string()))?;
    validate(&envelope, registry)?;
    Ok(envelope)
}

/// Reports a missing or unset actor before typed deserialization.
fn check_raw_actor(object: &Map<String, Value>) -> Result<(), CodecError> {
    let Some(actor) = object.get("actor").and_then(Value::as_object) else {
        return Err(CodecError::MissingActor("envelope has no actor object".to_string()));
    };
    if actor.get("kind").is_none_or(Value::is_null) {
        return Err(CodecError::MissingActor("actor.kind is unset".to_string()));
    }
    match actor.get("id").and_then(Value::as_str).map(str::trim) {
        None | Some("") => Err(CodecError::MissingActor("actor.id is missing".to_string())),
        Some(UNKNOWN_IDENTITY) => {
            Err(CodecError::MissingActor("actor.id must not be 'unknown'".to_string()))
        }
        Some(_) => Ok(()),
    }
}

/// Validates every envelope invariant the codec owns.
///
/// # Errors
///
/// Returns the first [`CodecError`] found.
pub fn validate(envelope: &EventEnvelope, registry: &PayloadRegistry) -> Result<(), CodecError> {
    if envelope.schema_version != ENVELOPE_SCHEMA_VERSION {
        return Err(CodecError::SchemaInvalid(format!(
            "unsupported schema_version '{}'",
            envelope.schema_version
        )));
    }
    validate_event_type(&envelope.event_type)?;
    EventTimestamp::parse(envelope.ts.as_str())
        .map_err(|err| CodecError::SchemaInvalid(err.to_string()))?;
    let session = envelope.session_id.as_str().trim();
    if session.is_empty() || session == UNKNOWN_IDENTITY {
        return Err(CodecError::SchemaInvalid(
            "session_id must be a concrete, non-empty identifier".to_string(),
        ));
    }
    if envelope.trace_id.as_str().trim().is_empty() {
        return Err(CodecError::SchemaInvalid("trace_id must be non-empty".to_string()));
    }
    envelope.actor.validate().map_err(|err| CodecError::MissingActor(err.to_string()))?;
    if let Some(key) = FORBIDDEN_PAYLOAD_KEYS.iter().find(|key| envelope.payload.contains_key(**key))
    {
        return Err(CodecError::SchemaInvalid(format!(
            "payload key '{key}' is reserved for the envelope"
        )));
    }
    let expected = canonical_hash(&envelope.payload)?;
    if expected != envelope.payload_hash {
        return Err(CodecError::HashMismatch {
            expected,
            found: envelope.payload_hash.clone(),
        });
    }
    registry.parse_payload(&envelope.event_type, &envelope.payload)?;
    Ok(())
}

/// Returns the canonical JSONL line bytes (without the trailing newline).
///
/// # Errors
///
/// Returns [`CodecError::SchemaInvalid`] when canonicalization fails.
pub fn canonical_line(envelope: &EventEnvelope) -> Result<Vec<u8>, CodecError> {
    Ok(canonical_json_bytes(envelope)?)
}

// ============================================================================
// SECTION: Envelope Hash
// ============================================================================

/// Projection hashed under `envelope-hash/v1`.
#[derive(Serialize)]
struct EnvelopeHashInput<'a> {
    /// Contract identifier.
    hash_contract: &'static str,
    /// Envelope schema version.
    schema_version: &'a str,
    /// Event type.
    event_type: &'a str,
    /// Event time.
    ts: &'a str,
    /// Session identifier.
    session_id: &'a str,
    /// Trace identifier.
    trace_id: &'a str,
    /// Optional span identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    span_id: Option<&'a str>,
    /// Actor record.
    actor: &'a Actor,
    /// Payload hash.
    payload_hash: &'a str,
    /// Previous envelope hash in the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    prev_envelope_hash: Option<&'a str>,
}

/// Computes `envelope_hash` for an envelope under `envelope-hash/v1`.
///
/// # Errors
///
/// Returns [`CodecError::SchemaInvalid`] when canonicalization fails.
pub fn compute_envelope_hash(envelope: &EventEnvelope) -> Result<String, CodecError> {
    let input = EnvelopeHashInput {
        hash_contract: ENVELOPE_HASH_CONTRACT,
        schema_version: &envelope.schema_version,
        event_type: &envelope.event_type,
        ts: envelope.ts.as_str(),
        session_id: envelope.session_id.as_str(),
        trace_id: envelope.trace_id.as_str(),
        span_id: envelope.span_id.as_ref().map(SpanId::as_str),
        actor: &envelope.actor,
        payload_hash: &envelope.payload_hash,
        prev_envelope_hash: envelope.prev_envelope_hash.as_deref(),
    };
    Ok(canonical_hash(&input)?)
}
