// crates/policy-ledger-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: Lifecycle Manager
// Description: Boot and shutdown recording on top of the event ledger.
// Purpose: Track run continuity and surface incomplete runs explicitly.
// Dependencies: crate::{core, interfaces, runtime::ledger}, serde_json
// ============================================================================

//! ## Overview
//! [`LifecycleManager::boot`] reads the ledger, classifies the boot, and
//! appends a `system.boot` envelope whose `trace_id` is the new run id. A
//! `recover` boot is always explicit in the payload and in the returned
//! [`BootReceipt`]. [`LifecycleManager::shutdown`] closes a run exactly once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::actor::ActorContext;
use crate::core::actor::ActorError;
use crate::core::envelope::CodecError;
use crate::core::envelope::EnvelopeDraft;
use crate::core::envelope::EventEnvelope;
use crate::core::envelope::EventPayload;
use crate::core::error_code::ErrorCode;
use crate::core::identifiers::ProcessId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::SystemId;
use crate::core::lifecycle::BootClassification;
use crate::core::lifecycle::BootMode;
use crate::core::lifecycle::BootPayload;
use crate::core::lifecycle::DEFAULT_EXIT_REASON;
use crate::core::lifecycle::SYSTEM_BOOT_EVENT;
use crate::core::lifecycle::SYSTEM_IDENTITY_SCHEMA_VERSION;
use crate::core::lifecycle::SYSTEM_SHUTDOWN_EVENT;
use crate::core::lifecycle::ShutdownPayload;
use crate::core::lifecycle::SystemIdentity;
use crate::core::lifecycle::classify_boot;
use crate::core::time::EventTimestamp;
use crate::interfaces::ActorResolver;
use crate::interfaces::LedgerError;
use crate::runtime::ledger::LedgerWriter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a system identity file.
const MAX_IDENTITY_BYTES: u64 = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Ledger read or write failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// No actor is bound for the lifecycle context.
    #[error(transparent)]
    Actor(#[from] ActorError),
    /// A stored envelope did not match its payload schema.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Shutdown names a run with no boot.
    #[error("unknown run: {0}")]
    UnknownRun(String),
    /// Shutdown names a run that is already closed.
    #[error("run already closed: {0}")]
    AlreadyClosed(String),
    /// System identity file is unreadable or malformed.
    #[error("system identity error: {0}")]
    Identity(String),
}

impl LifecycleError {
    /// Returns the stable reason code, when one applies.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Actor(err) => Some(err.code()),
            Self::Codec(err) => Some(err.code()),
            Self::Ledger(LedgerError::Codec(err)) => Some(err.code()),
            Self::Ledger(_) | Self::Identity(_) => Some(ErrorCode::IoError),
            Self::UnknownRun(_) | Self::AlreadyClosed(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Receipts
// ============================================================================

/// Explicit notice that the previous run never shut down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteRun {
    /// Run left without a shutdown.
    pub run_id: RunId,
}

impl IncompleteRun {
    /// Returns the stable reason code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::IncompleteRun
    }
}

impl fmt::Display for IncompleteRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: run {} has no shutdown", self.code(), self.run_id)
    }
}

/// Result of a boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootReceipt {
    /// New run identifier.
    pub run_id: RunId,
    /// Computed boot mode.
    pub boot_mode: BootMode,
    /// Dangling run, when recovering.
    pub recovered_from_run_id: Option<RunId>,
    /// Incomplete-run notice, when recovering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_run: Option<IncompleteRun>,
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Records process lifecycle facts in the ledger.
pub struct LifecycleManager {
    /// Shared ledger.
    ledger: Arc<LedgerWriter>,
    /// Actor source.
    actors: Arc<dyn ActorResolver>,
    /// Session used for lifecycle envelopes.
    session_id: SessionId,
}

impl LifecycleManager {
    /// Creates a manager over a ledger.
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerWriter>,
        actors: Arc<dyn ActorResolver>,
        session_id: SessionId,
    ) -> Self {
        Self {
            ledger,
            actors,
            session_id,
        }
    }

    /// Classifies the next boot without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Ledger`] when the ledger cannot be read.
    pub fn classify(&self) -> Result<BootClassification, LifecycleError> {
        let snapshot = self.ledger.read()?;
        Ok(classify_boot(&snapshot.envelopes))
    }

    /// Records a boot and returns its receipt.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when the ledger cannot be read or written,
    /// or no lifecycle actor is bound.
    pub fn boot(
        &self,
        system_id: &SystemId,
        process_id: &ProcessId,
    ) -> Result<BootReceipt, LifecycleError> {
        let classification = self.classify()?;
        let actor = self.actors.resolve(&ActorContext::lifecycle())?;
        let run_id = RunId::generate();
        let started_at = EventTimestamp::now();
        let payload = BootPayload {
            system_id: system_id.clone(),
            process_id: process_id.clone(),
            run_id: run_id.clone(),
            boot_mode: classification.boot_mode,
            started_at: started_at.clone(),
            recovered_from_run_id: classification.recovered_from_run_id.clone(),
        };
        self.ledger.emit(EnvelopeDraft {
            ts: started_at,
            session_id: self.session_id.clone(),
            trace_id: run_id.as_trace(),
            span_id: None,
            actor,
            payload: EventPayload::SystemBoot(payload),
        })?;
        let incomplete_run = classification.recovered_from_run_id.clone().map(|run_id| IncompleteRun {
            run_id,
        });
        Ok(BootReceipt {
            run_id,
            boot_mode: classification.boot_mode,
            recovered_from_run_id: classification.recovered_from_run_id,
            incomplete_run,
        })
    }

    /// Records the shutdown of a run.
    ///
    /// System and process ids are taken from the run's boot envelope.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::UnknownRun`] or
    /// [`LifecycleError::AlreadyClosed`] when the run cannot be closed, and
    /// other variants when the ledger or actor lookup fails.
    pub fn shutdown(
        &self,
        run_id: &RunId,
        exit_reason: Option<&str>,
    ) -> Result<EventEnvelope, LifecycleError> {
        let snapshot = self.ledger.read()?;
        let in_run = |envelope: &&EventEnvelope, event_type: &str| {
            envelope.event_type == event_type && envelope.trace_id.as_str() == run_id.as_str()
        };
        let boot = snapshot
            .envelopes
            .iter()
            .find(|envelope| in_run(envelope, SYSTEM_BOOT_EVENT))
            .ok_or_else(|| LifecycleError::UnknownRun(run_id.to_string()))?;
        if snapshot.envelopes.iter().any(|envelope| in_run(&envelope, SYSTEM_SHUTDOWN_EVENT)) {
            return Err(LifecycleError::AlreadyClosed(run_id.to_string()));
        }
        let EventPayload::SystemBoot(boot_payload) = boot.typed_payload(self.ledger.registry())?
        else {
            return Err(LifecycleError::Codec(CodecError::SchemaInvalid(
                "boot envelope does not carry a boot payload".to_string(),
            )));
        };
        let actor = self.actors.resolve(&ActorContext::lifecycle())?;
        let payload = ShutdownPayload {
            system_id: boot_payload.system_id,
            process_id: boot_payload.process_id,
            run_id: run_id.clone(),
            exit_reason: exit_reason.unwrap_or(DEFAULT_EXIT_REASON).to_string(),
        };
        Ok(self.ledger.emit(EnvelopeDraft {
            ts: EventTimestamp::now(),
            session_id: self.session_id.clone(),
            trace_id: run_id.as_trace(),
            span_id: None,
            actor,
            payload: EventPayload::SystemShutdown(payload),
        })?)
    }
}

// ============================================================================
// SECTION: System Identity
// ============================================================================

impl SystemIdentity {
    /// Loads the identity at `path`, creating it on first use.
    ///
    /// An existing file is never rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Identity`] when the file cannot be created,
    /// read, or parsed.
    pub fn load_or_create(path: &Path) -> Result<Self, LifecycleError> {
        match read_identity(path) {
            Ok(identity) => return Ok(identity),
            Err(IdentityRead::Missing) => {}
            Err(IdentityRead::Failed(message)) => return Err(LifecycleError::Identity(message)),
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|err| LifecycleError::Identity(format!("{}: {err}", parent.display())))?;
        }
        let identity = Self {
            schema_version: SYSTEM_IDENTITY_SCHEMA_VERSION,
            system_id: SystemId::generate(),
            created_at: EventTimestamp::now(),
        };
        let mut body = serde_json::to_vec_pretty(&identity)
            .map_err(|err| LifecycleError::Identity(err.to_string()))?;
        body.push(b'\n');
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(mut file) => {
                file.write_all(&body)
                    .and_then(|()| file.sync_all())
                    .map_err(|err| LifecycleError::Identity(format!("{}: {err}", path.display())))?;
                Ok(identity)
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => read_identity(path)
                .map_err(|_| LifecycleError::Identity(format!("{}: unreadable", path.display()))),
            Err(err) => Err(LifecycleError::Identity(format!("{}: {err}", path.display()))),
        }
    }
}

/// Identity read failure.
enum IdentityRead {
    /// File does not exist.
    Missing,
    /// File exists but is unusable.
    Failed(String),
}

/// Reads and validates an identity file.
fn read_identity(path: &Path) -> Result<SystemIdentity, IdentityRead> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(IdentityRead::Missing),
        Err(err) => return Err(IdentityRead::Failed(format!("{}: {err}", path.display()))),
    };
    if metadata.len() > MAX_IDENTITY_BYTES {
        return Err(IdentityRead::Failed(format!("{}: file too large", path.display())));
    }
    let bytes =
        fs::read(path).map_err(|err| IdentityRead::Failed(format!("{}: {err}", path.display())))?;
    let identity: SystemIdentity = serde_json::from_slice(&bytes)
        .map_err(|err| IdentityRead::Failed(format!("{}: {err}", path.display())))?;
    if identity.schema_version != SYSTEM_IDENTITY_SCHEMA_VERSION {
        return Err(IdentityRead::Failed(format!(
            "{}: unsupported schema_version {}",
            path.display(),
            identity.schema_version
        )));
    }
    if identity.system_id.as_str().trim().is_empty() {
        return Err(IdentityRead::Failed(format!("{}: empty system_id", path.display())));
    }
    Ok(identity)
}
