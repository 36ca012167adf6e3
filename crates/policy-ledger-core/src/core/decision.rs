// crates/policy-ledger-core/src/core/decision.rs
// ============================================================================
// Module: Policy Decision Records
// Description: ALLOW/DENY decision records produced for every gate invocation.
// Purpose: Define the replayable evidence format of the decision log.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`DecisionRecord`] is the logged outcome of one resource access. Records
//! are written one per line under schema tag [`DECISION_SCHEMA`] and are the
//! only input the replay compiler reads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::RequestId;
use crate::core::time::EventTimestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schema tag carried by every decision record.
pub const DECISION_SCHEMA: &str = "mcp-policy-decision/v1";
/// Envelope event type used when decisions are mirrored into the ledger.
pub const POLICY_DECISION_EVENT: &str = "policy.decision";
/// Reason code recorded for ALLOW decisions.
pub const ALLOW_REASON_CODE: &str = "OK";
/// Reason message recorded for ALLOW decisions.
pub const ALLOW_REASON_MESSAGE: &str = "allowed";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Access granted.
    Allow,
    /// Access denied.
    Deny,
}

impl Decision {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Deny => "DENY",
        }
    }

    /// Parses a decision label, ignoring ASCII case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ALLOW" => Some(Self::Allow),
            "DENY" => Some(Self::Deny),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of resource requested through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Single file read.
    File,
    /// Directory listing.
    Dir,
}

impl ResourceKind {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }
}

/// Machine-readable reason plus human message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionReason {
    /// Reason code (`OK` for ALLOW, an error code for DENY).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Policy snapshot reference pinned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRef {
    /// Allowed roots in effect.
    pub allowed_roots: Vec<String>,
    /// Content hash of the allowed roots.
    pub roots_hash: String,
}

/// One resource access as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    /// Request identifier.
    pub request_id: RequestId,
    /// Requested URI.
    pub uri: String,
    /// Requested resource kind.
    pub resource_kind: ResourceKind,
    /// Encoded path segment exactly as received.
    pub path_param_raw: String,
}

/// Logged outcome of one resource access.
///
/// # Invariants
/// - `decision` is a pure function of `path_decoded`, the policy snapshot,
///   and the sandbox contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Schema tag, always [`DECISION_SCHEMA`].
    pub schema: String,
    /// Decision time.
    pub ts: EventTimestamp,
    /// Request identifier.
    pub request_id: RequestId,
    /// Requested URI.
    pub uri: String,
    /// Requested resource kind.
    pub resource_kind: ResourceKind,
    /// Encoded path segment as received.
    pub path_param_raw: String,
    /// Decoded path segment.
    pub path_decoded: String,
    /// Decision.
    pub decision: Decision,
    /// Reason for the decision.
    pub reason: DecisionReason,
    /// Policy snapshot in effect.
    pub policy: PolicyRef,
}
