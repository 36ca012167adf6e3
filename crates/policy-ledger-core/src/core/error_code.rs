// crates/policy-ledger-core/src/core/error_code.rs
// ============================================================================
// Module: Policy Ledger Error Codes
// Description: Machine-readable reason codes shared by every component.
// Purpose: Keep denial and integrity codes stable across logs and responses.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every denial or integrity failure carries one of these codes plus a human
//! message. Wire forms are `SCREAMING_SNAKE_CASE` and frozen once shipped.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Stable reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed path, traversal, absolute marker, or sandbox escape.
    BadPath,
    /// Path is outside the allowlist (or empty).
    Forbidden,
    /// Resource does not exist.
    NotFound,
    /// Directory listing requested for a non-directory.
    NotADir,
    /// File exceeds the configured size cap.
    TooLarge,
    /// Envelope failed codec validation.
    SchemaInvalid,
    /// Payload hash does not verify.
    HashMismatch,
    /// Envelope or context has no accountable actor.
    MissingActor,
    /// A prior boot has no matching shutdown.
    IncompleteRun,
    /// Filesystem failure not covered by a more specific code.
    IoError,
}

impl ErrorCode {
    /// Returns the wire label for the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadPath => "BAD_PATH",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::NotADir => "NOT_A_DIR",
            Self::TooLarge => "TOO_LARGE",
            Self::SchemaInvalid => "SCHEMA_INVALID",
            Self::HashMismatch => "HASH_MISMATCH",
            Self::MissingActor => "MISSING_ACTOR",
            Self::IncompleteRun => "INCOMPLETE_RUN",
            Self::IoError => "IO_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
