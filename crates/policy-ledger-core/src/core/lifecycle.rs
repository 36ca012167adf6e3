// crates/policy-ledger-core/src/core/lifecycle.rs
// ============================================================================
// Module: Lifecycle Model
// Description: Boot/shutdown payloads and the pure boot classification.
// Purpose: Describe run continuity as derived facts over ledger history.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A run is the interval between a `system.boot` and its matching
//! `system.shutdown`; both envelopes carry `trace_id == run_id`. Boot modes
//! are not run states but a classification computed once per boot from the
//! ledger:
//! - no prior boot: `cold`
//! - latest boot closed by a matching shutdown: `warm`
//! - otherwise: `recover`, naming the dangling run
//!
//! Recovery is never folded into `warm`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::envelope::EventEnvelope;
use crate::core::identifiers::ProcessId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::SystemId;
use crate::core::time::EventTimestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Event type of boot envelopes.
pub const SYSTEM_BOOT_EVENT: &str = "system.boot";
/// Event type of shutdown envelopes.
pub const SYSTEM_SHUTDOWN_EVENT: &str = "system.shutdown";
/// Exit reason recorded when none is supplied.
pub const DEFAULT_EXIT_REASON: &str = "normal";
/// Schema version of the system identity file.
pub const SYSTEM_IDENTITY_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Boot classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootMode {
    /// First boot recorded in the ledger.
    Cold,
    /// Previous run closed cleanly.
    Warm,
    /// Previous run has no matching shutdown.
    Recover,
}

impl BootMode {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
            Self::Recover => "recover",
        }
    }
}

/// Payload of a `system.boot` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootPayload {
    /// Permanent system identifier.
    pub system_id: SystemId,
    /// Process identifier.
    pub process_id: ProcessId,
    /// Run identifier (equal to the envelope trace id).
    pub run_id: RunId,
    /// Boot classification.
    pub boot_mode: BootMode,
    /// Boot time.
    pub started_at: EventTimestamp,
    /// Dangling run being recovered from, when `boot_mode` is `recover`.
    #[serde(default)]
    pub recovered_from_run_id: Option<RunId>,
}

/// Payload of a `system.shutdown` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownPayload {
    /// Permanent system identifier.
    pub system_id: SystemId,
    /// Process identifier.
    pub process_id: ProcessId,
    /// Run identifier being closed.
    pub run_id: RunId,
    /// Reason for the shutdown.
    pub exit_reason: String,
}

/// Result of classifying ledger history for a new boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootClassification {
    /// Computed boot mode.
    pub boot_mode: BootMode,
    /// Dangling run id when the mode is `recover`.
    pub recovered_from_run_id: Option<RunId>,
}

/// Persistent identity of a system across processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIdentity {
    /// Identity file schema version.
    pub schema_version: u32,
    /// Permanent system identifier.
    pub system_id: SystemId,
    /// Creation time.
    pub created_at: EventTimestamp,
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies the next boot from ledger history.
///
/// Only `system.boot` and `system.shutdown` envelopes are considered, in
/// ledger order. A shutdown matches a boot when their trace ids are equal and
/// the shutdown appears after the boot.
#[must_use]
pub fn classify_boot(history: &[EventEnvelope]) -> BootClassification {
    let latest_boot = history
        .iter()
        .enumerate()
        .rev()
        .find(|(_, envelope)| envelope.event_type == SYSTEM_BOOT_EVENT);
    let Some((boot_index, boot)) = latest_boot else {
        return BootClassification {
            boot_mode: BootMode::Cold,
            recovered_from_run_id: None,
        };
    };
    let closed = history[boot_index + 1 ..].iter().any(|envelope| {
        envelope.event_type == SYSTEM_SHUTDOWN_EVENT && envelope.trace_id == boot.trace_id
    });
    if closed {
        BootClassification {
            boot_mode: BootMode::Warm,
            recovered_from_run_id: None,
        }
    } else {
        BootClassification {
            boot_mode: BootMode::Recover,
            recovered_from_run_id: Some(RunId::new(boot.trace_id.as_str())),
        }
    }
}
