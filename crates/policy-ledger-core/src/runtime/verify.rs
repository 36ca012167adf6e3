// crates/policy-ledger-core/src/runtime/verify.rs
// ============================================================================
// Module: Ledger Verification
// Description: Non-fatal audit of envelope, chain, and run invariants.
// Purpose: Report every integrity issue in a ledger instead of stopping at the first.
// Dependencies: crate::{core, interfaces, runtime::ledger}
// ============================================================================

//! ## Overview
//! [`verify_ledger`] walks every complete line and collects issues:
//! decoding and schema failures, broken chain links, and lifecycle run
//! violations (duplicate boots, orphan or repeated shutdowns). Runs that
//! were booted but never shut down are listed separately; the last one is
//! normally the run that is still live.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::envelope::PayloadRegistry;
use crate::core::envelope::decode;
use crate::core::error_code::ErrorCode;
use crate::core::identifiers::RunId;
use crate::core::identifiers::SessionId;
use crate::core::lifecycle::SYSTEM_BOOT_EVENT;
use crate::core::lifecycle::SYSTEM_SHUTDOWN_EVENT;
use crate::interfaces::ChainMode;
use crate::interfaces::LedgerError;
use crate::runtime::chain::chain_strategy;
use crate::runtime::ledger::read_line_snapshot;

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// One integrity issue found during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationIssue {
    /// 1-based line number.
    pub line: usize,
    /// Stable reason code.
    pub code: ErrorCode,
    /// Description.
    pub message: String,
}

/// Result of verifying a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerVerification {
    /// Chain mode checked.
    pub chain: ChainMode,
    /// Complete lines examined.
    pub lines: usize,
    /// Envelopes that decoded.
    pub envelopes: usize,
    /// Bytes ignored after the last complete line.
    pub partial_tail_bytes: u64,
    /// Issues found, in line order.
    pub issues: Vec<VerificationIssue>,
    /// Runs with a boot and no shutdown, in ledger order.
    pub incomplete_runs: Vec<RunId>,
}

impl LedgerVerification {
    /// Returns true when no issues were found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies a ledger file.
///
/// # Errors
///
/// Returns [`LedgerError::Io`] only when the file cannot be read; integrity
/// problems are reported as issues.
pub fn verify_ledger(
    path: &Path,
    registry: &PayloadRegistry,
    mode: ChainMode,
) -> Result<LedgerVerification, LedgerError> {
    let snapshot = read_line_snapshot(path)?;
    let strategy = chain_strategy(mode);
    let mut heads: BTreeMap<SessionId, String> = BTreeMap::new();
    let mut booted: Vec<RunId> = Vec::new();
    let mut closed: BTreeSet<RunId> = BTreeSet::new();
    let mut issues = Vec::new();
    let mut envelopes = 0;

    for line in &snapshot.lines {
        let envelope = match decode(&line.bytes, registry) {
            Ok(envelope) => envelope,
            Err(err) => {
                issues.push(VerificationIssue {
                    line: line.number,
                    code: err.code(),
                    message: err.to_string(),
                });
                advance_raw_head(&mut heads, &line.bytes);
                continue;
            }
        };
        envelopes += 1;

        let head = heads.get(&envelope.session_id).map(String::as_str);
        if let Err(err) = strategy.check(&envelope, head) {
            issues.push(VerificationIssue {
                line: line.number,
                code: ErrorCode::HashMismatch,
                message: err.to_string(),
            });
        }
        if let Some(hash) = &envelope.envelope_hash {
            heads.insert(envelope.session_id.clone(), hash.clone());
        }

        let run_id = RunId::new(envelope.trace_id.as_str());
        match envelope.event_type.as_str() {
            SYSTEM_BOOT_EVENT => {
                if booted.contains(&run_id) {
                    issues.push(VerificationIssue {
                        line: line.number,
                        code: ErrorCode::SchemaInvalid,
                        message: format!("run {run_id} has more than one boot"),
                    });
                } else {
                    booted.push(run_id);
                }
            }
            SYSTEM_SHUTDOWN_EVENT => {
                if !booted.contains(&run_id) {
                    issues.push(VerificationIssue {
                        line: line.number,
                        code: ErrorCode::SchemaInvalid,
                        message: format!("shutdown for run {run_id} has no prior boot"),
                    });
                } else if !closed.insert(run_id.clone()) {
                    issues.push(VerificationIssue {
                        line: line.number,
                        code: ErrorCode::SchemaInvalid,
                        message: format!("run {run_id} has more than one shutdown"),
                    });
                }
            }
            _ => {}
        }
    }

    let incomplete_runs = booted.into_iter().filter(|run| !closed.contains(run)).collect();
    Ok(LedgerVerification {
        chain: mode,
        lines: snapshot.lines.len(),
        envelopes,
        partial_tail_bytes: snapshot.partial_tail_bytes,
        issues,
        incomplete_runs,
    })
}

/// Advances a session head over a line that failed to decode.
fn advance_raw_head(heads: &mut BTreeMap<SessionId, String>, bytes: &[u8]) {
    let Ok(Value::Object(raw)) = serde_json::from_slice::<Value>(bytes) else {
        return;
    };
    let session = raw.get("session_id").and_then(Value::as_str);
    let hash = raw.get("envelope_hash").and_then(Value::as_str);
    if let (Some(session), Some(hash)) = (session, hash) {
        heads.insert(SessionId::new(session), hash.to_string());
    }
}
