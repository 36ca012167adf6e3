// crates/policy-ledger-core/src/core/policy.rs
// ============================================================================
// Module: Policy Snapshot
// Description: Normalized allowlist of roots and the pure path decision.
// Purpose: Decide path authorization deterministically, without filesystem access.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`PolicySnapshot`] is the ordered, de-duplicated list of allowed roots
//! plus its `roots_hash`. [`PolicySnapshot::decide`] implements path
//! normalization and allowlist matching as a pure, total function: the same
//! `(path, snapshot)` pair always yields the same answer and never touches
//! the filesystem.
//!
//! ## Invariants
//! - Roots carry no leading or trailing slash and use `/` separators.
//! - `roots_hash` is the lowercase hex SHA-256 of the compact JSON array of
//!   roots in order (`["a","b"]`), with non-ASCII left unescaped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::decision::PolicyRef;
use crate::core::error_code::ErrorCode;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::hash_bytes;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Conservative default root used when no allowlist is configured.
pub const DEFAULT_ALLOWED_ROOT: &str = "projects/mcp";

// ============================================================================
// SECTION: Denials
// ============================================================================

/// Structured gate denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDenial {
    /// Reason code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// File size for `TOO_LARGE` denials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

impl GateDenial {
    /// Creates a denial without a size annotation.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            bytes: None,
        }
    }

    /// Shorthand for a `BAD_PATH` denial.
    #[must_use]
    pub fn bad_path(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadPath, message)
    }

    /// Shorthand for a `FORBIDDEN` denial.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }
}

impl fmt::Display for GateDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building a policy snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No usable roots were provided.
    #[error("allowed_roots must contain at least one root")]
    Empty,
    /// A root is malformed.
    #[error("invalid allowed root '{root}': {reason}")]
    InvalidRoot {
        /// Offending root as provided.
        root: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Hashing the roots failed.
    #[error("failed to hash allowed roots: {0}")]
    Hash(String),
}

// ============================================================================
// SECTION: Path Normalization
// ============================================================================

/// Normalizes a decoded, repo-relative request path.
///
/// Backslashes become `/`. Repeated leading `./` is stripped, empty and `.`
/// segments are dropped, and the result carries no leading or trailing
/// slash.
///
/// # Errors
///
/// - `BAD_PATH` for `..` segments, absolute markers (leading `/` or `\`, a
///   drive prefix such as `C:`), or control characters.
/// - `FORBIDDEN` when nothing remains after normalization.
pub fn normalize_request_path(decoded: &str) -> Result<String, GateDenial> {
    if decoded.chars().any(char::is_control) {
        return Err(GateDenial::bad_path("control characters are not allowed"));
    }
    let unified = decoded.replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(GateDenial::bad_path("absolute paths are not allowed"));
    }
    let mut rest = unified.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    let mut segments = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(GateDenial::bad_path("path traversal is not allowed")),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(GateDenial::forbidden("empty path is not allowed"));
    }
    Ok(segments.join("/"))
}

/// Returns true for `X:` drive prefixes.
fn has_drive_prefix(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Computes the roots hash for an ordered list of normalized roots.
///
/// # Errors
///
/// Returns [`PolicyError::Hash`] when serialization fails.
pub fn compute_roots_hash(roots: &[String]) -> Result<String, PolicyError> {
    let bytes = serde_json::to_vec(roots).map_err(|err| PolicyError::Hash(err.to_string()))?;
    Ok(hash_bytes(DEFAULT_HASH_ALGORITHM, &bytes).value)
}

// ============================================================================
// SECTION: Policy Snapshot
// ============================================================================

/// Immutable, hashed allowlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySnapshot {
    /// Normalized roots in configuration order.
    allowed_roots: Vec<String>,
    /// Hash pinning this exact list.
    roots_hash: String,
}

impl PolicySnapshot {
    /// Builds a snapshot from raw roots.
    ///
    /// Blank entries are ignored and duplicates keep their first position.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a root is malformed or none remain.
    pub fn new<I, S>(roots: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed_roots: Vec<String> = Vec::new();
        for root in roots {
            let raw = root.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            let normalized = normalize_request_path(raw).map_err(|denial| {
                PolicyError::InvalidRoot {
                    root: raw.to_string(),
                    reason: denial.message,
                }
            })?;
            if !allowed_roots.contains(&normalized) {
                allowed_roots.push(normalized);
            }
        }
        if allowed_roots.is_empty() {
            return Err(PolicyError::Empty);
        }
        let roots_hash = compute_roots_hash(&allowed_roots)?;
        Ok(Self {
            allowed_roots,
            roots_hash,
        })
    }

    /// Returns the normalized roots.
    #[must_use]
    pub fn allowed_roots(&self) -> &[String] {
        &self.allowed_roots
    }

    /// Returns the roots hash.
    #[must_use]
    pub fn roots_hash(&self) -> &str {
        &self.roots_hash
    }

    /// Returns a serializable reference for decision records.
    #[must_use]
    pub fn to_ref(&self) -> PolicyRef {
        PolicyRef {
            allowed_roots: self.allowed_roots.clone(),
            roots_hash: self.roots_hash.clone(),
        }
    }

    /// Returns true when a normalized path equals or descends from a root.
    #[must_use]
    pub fn is_allowed(&self, normalized: &str) -> bool {
        self.allowed_roots.iter().any(|root| {
            normalized == root
                || normalized
                    .strip_prefix(root.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Normalizes a decoded path and checks it against the allowlist.
    ///
    /// # Errors
    ///
    /// Returns the `BAD_PATH` or `FORBIDDEN` denial for the path.
    pub fn decide(&self, decoded: &str) -> Result<String, GateDenial> {
        let normalized = normalize_request_path(decoded)?;
        if !self.is_allowed(&normalized) {
            return Err(GateDenial::forbidden("path is outside allowed_roots"));
        }
        Ok(normalized)
    }
}
