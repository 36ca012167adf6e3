// crates/policy-ledger-core/src/core/identifiers.rs
// ============================================================================
// Module: Policy Ledger Identifiers
// Description: Opaque string identifiers for sessions, traces, runs, and requests.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: rand, serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings on the wire. Generated identifiers use a
//! short type prefix followed by 128 bits of OS randomness in lowercase hex
//! (for example `run_3f2a...`), so they never collide across processes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::hex_encode;

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Number of random bytes in a generated identifier.
const RANDOM_ID_BYTES: usize = 16;

/// Returns `<prefix>_<32 lowercase hex chars>` using OS randomness.
#[must_use]
pub fn random_token(prefix: &str) -> String {
    let mut bytes = [0u8; RANDOM_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    format!("{prefix}_{}", hex_encode(&bytes))
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Declares a transparent string identifier with the shared helper impls.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier!(
    /// Session identifier grouping envelopes (and chain heads) in a ledger.
    SessionId
);
string_identifier!(
    /// Trace identifier correlating envelopes that belong to one operation.
    TraceId
);
string_identifier!(
    /// Optional span identifier within a trace.
    SpanId
);
string_identifier!(
    /// Permanent system identifier, stable across process restarts.
    SystemId
);
string_identifier!(
    /// Identifier of a single process start.
    ProcessId
);
string_identifier!(
    /// Identifier of one boot-to-shutdown interval.
    ///
    /// # Invariants
    /// - Equal to the `trace_id` of the run's boot and shutdown envelopes.
    RunId
);
string_identifier!(
    /// Identifier of one resource request handled by the gate.
    RequestId
);

impl SystemId {
    /// Generates a fresh system identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token("sys"))
    }
}

impl ProcessId {
    /// Generates a fresh process identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token("proc"))
    }
}

impl RunId {
    /// Generates a fresh run identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token("run"))
    }

    /// Returns the trace identifier carried by this run's envelopes.
    #[must_use]
    pub fn as_trace(&self) -> TraceId {
        TraceId::new(self.0.clone())
    }
}

impl RequestId {
    /// Generates a fresh request identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token("req"))
    }
}
