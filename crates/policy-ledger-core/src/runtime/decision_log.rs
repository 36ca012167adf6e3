// crates/policy-ledger-core/src/runtime/decision_log.rs
// ============================================================================
// Module: Decision Logger
// Description: One decision record per gate invocation, persisted before responding.
// Purpose: Turn every access decision into replayable evidence.
// Dependencies: serde_json, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`DecisionLogger::record`] builds exactly one [`DecisionRecord`] from a
//! request and its [`GateOutcome`] and writes it through a
//! [`DecisionSink`]. A sink failure is returned to the caller; the request
//! must then fail rather than be served unlogged. With a [`LedgerMirror`]
//! the record is also appended to the event ledger as a `policy.decision`
//! envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;

use crate::core::actor::ActorContext;
use crate::core::actor::ActorError;
use crate::core::decision::ALLOW_REASON_CODE;
use crate::core::decision::ALLOW_REASON_MESSAGE;
use crate::core::decision::AccessRequest;
use crate::core::decision::DECISION_SCHEMA;
use crate::core::decision::Decision;
use crate::core::decision::DecisionReason;
use crate::core::decision::DecisionRecord;
use crate::core::envelope::EnvelopeDraft;
use crate::core::envelope::EventPayload;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::TraceId;
use crate::core::time::EventTimestamp;
use crate::interfaces::ActorResolver;
use crate::interfaces::DecisionSink;
use crate::interfaces::LedgerError;
use crate::runtime::appender::JsonlAppender;
use crate::runtime::gate::GateOutcome;
use crate::runtime::ledger::LedgerWriter;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Decision sink appending one JSON line per record.
#[derive(Debug)]
pub struct JsonlDecisionSink {
    /// Shared appender.
    appender: JsonlAppender,
}

impl JsonlDecisionSink {
    /// Opens (or creates) a decision log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file cannot be opened.
    pub fn open(path: &Path, fsync: bool) -> Result<Self, LedgerError> {
        Ok(Self {
            appender: JsonlAppender::open(path, fsync)?,
        })
    }

    /// Returns the log path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.appender.path()
    }
}

impl DecisionSink for JsonlDecisionSink {
    fn write(&self, record: &DecisionRecord) -> Result<(), LedgerError> {
        let line = serde_json::to_vec(record).map_err(|err| LedgerError::Write(err.to_string()))?;
        self.appender.append_line(&line)
    }
}

/// Sink used when decision logging is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledDecisionSink;

impl DecisionSink for DisabledDecisionSink {
    fn write(&self, _record: &DecisionRecord) -> Result<(), LedgerError> {
        Ok(())
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// In-memory sink for tests and in-process replay.
#[derive(Debug, Default)]
pub struct MemoryDecisionSink {
    /// Captured records.
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemoryDecisionSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the captured records.
    #[must_use]
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

impl DecisionSink for MemoryDecisionSink {
    fn write(&self, record: &DecisionRecord) -> Result<(), LedgerError> {
        self.records
            .lock()
            .map_err(|_| LedgerError::Write("memory sink mutex poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Decision logging failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionLogError {
    /// The decision sink rejected the record.
    #[error("decision log write failed: {0}")]
    Sink(LedgerError),
    /// Mirroring the record into the ledger failed.
    #[error("decision mirror failed: {0}")]
    Mirror(LedgerError),
    /// No actor is bound for mirrored records.
    #[error("decision mirror actor: {0}")]
    Actor(#[from] ActorError),
}

// ============================================================================
// SECTION: Logger
// ============================================================================

/// Mirrors decision records into the event ledger.
pub struct LedgerMirror {
    /// Target ledger.
    ledger: Arc<LedgerWriter>,
    /// Actor source for the `resource_server` context.
    actors: Arc<dyn ActorResolver>,
    /// Session for mirrored envelopes.
    session_id: SessionId,
}

impl LedgerMirror {
    /// Creates a mirror.
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

    /// Appends a record as a `policy.decision` envelope.
    fn append(&self, record: &DecisionRecord) -> Result<(), DecisionLogError> {
        let actor = self.actors.resolve(&ActorContext::resource_server())?;
        self.ledger
            .emit(EnvelopeDraft {
                ts: record.ts.clone(),
                session_id: self.session_id.clone(),
                trace_id: TraceId::new(record.request_id.as_str()),
                span_id: None,
                actor,
                payload: EventPayload::PolicyDecision(record.clone()),
            })
            .map(|_| ())
            .map_err(DecisionLogError::Mirror)
    }
}

/// Writes a decision record for every gate invocation.
pub struct DecisionLogger {
    /// Primary sink.
    sink: Arc<dyn DecisionSink>,
    /// Optional ledger mirror.
    mirror: Option<LedgerMirror>,
}

impl DecisionLogger {
    /// Creates a logger over a sink.
    #[must_use]
    pub fn new(sink: Arc<dyn DecisionSink>) -> Self {
        Self {
            sink,
            mirror: None,
        }
    }

    /// Creates a logger that never persists records.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledDecisionSink))
    }

    /// Adds a ledger mirror.
    #[must_use]
    pub fn with_mirror(mut self, mirror: LedgerMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Returns true when records are persisted.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.sink.enabled()
    }

    /// Builds, persists, and returns the record for one gate invocation.
    ///
    /// The ledger mirror is written before the sink, so a failed mirror
    /// leaves no record in the decision log and replay plans never include
    /// a read that was not served.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionLogError`] when the mirror or sink fails.
    pub fn record(
        &self,
        request: &AccessRequest,
        outcome: &GateOutcome,
    ) -> Result<DecisionRecord, DecisionLogError> {
        let record = build_record(request, outcome, EventTimestamp::now());
        if let Some(mirror) = &self.mirror {
            mirror.append(&record)?;
        }
        self.sink.write(&record).map_err(DecisionLogError::Sink)?;
        Ok(record)
    }
}

/// Builds the decision record for a request and its outcome.
#[must_use]
pub fn build_record(
    request: &AccessRequest,
    outcome: &GateOutcome,
    ts: EventTimestamp,
) -> DecisionRecord {
    let (decision, reason) = match &outcome.result {
        Ok(_) => (
            Decision::Allow,
            DecisionReason {
                code: ALLOW_REASON_CODE.to_string(),
                message: ALLOW_REASON_MESSAGE.to_string(),
            },
        ),
        Err(denial) => (
            Decision::Deny,
            DecisionReason {
                code: denial.code.as_str().to_string(),
                message: denial.message.clone(),
            },
        ),
    };
    DecisionRecord {
        schema: DECISION_SCHEMA.to_string(),
        ts,
        request_id: request.request_id.clone(),
        uri: request.uri.clone(),
        resource_kind: request.resource_kind,
        path_param_raw: request.path_param_raw.clone(),
        path_decoded: outcome.path_decoded.clone(),
        decision,
        reason,
        policy: outcome.policy.clone(),
    }
}
