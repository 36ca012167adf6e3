// crates/policy-ledger-core/src/interfaces/mod.rs
// ============================================================================
// Module: Policy Ledger Interfaces
// Description: Seams for actor resolution, chaining, decision sinks, and replay targets.
// Purpose: Define the contract surfaces the runtime is wired through.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces keep the runtime independent of where actors come from, how
//! envelopes are linked, where decision records land, and what a replay is
//! run against. Implementations must fail closed on missing data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::actor::Actor;
use crate::core::actor::ActorContext;
use crate::core::actor::ActorError;
use crate::core::decision::DecisionRecord;
use crate::core::envelope::CodecError;
use crate::core::envelope::EventEnvelope;
use crate::core::policy::PolicySnapshot;
use crate::core::replay::ObservedOutcome;

// ============================================================================
// SECTION: Actor Resolution
// ============================================================================

/// Maps an execution context to the accountable actor.
///
/// Resolution never inspects payloads.
pub trait ActorResolver: Send + Sync {
    /// Resolves the actor for a context.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Missing`] when no actor is configured.
    fn resolve(&self, context: &ActorContext) -> Result<Actor, ActorError>;
}

// ============================================================================
// SECTION: Chaining
// ============================================================================

/// Ledger chaining mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMode {
    /// Envelopes are not linked.
    None,
    /// Envelopes are hash-linked per session.
    #[default]
    Chained,
}

impl ChainMode {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Chained => "chained",
        }
    }
}

/// Chain verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// `prev_envelope_hash` does not match the session head.
    #[error("broken link: expected previous hash {expected:?}, found {found:?}")]
    BrokenLink {
        /// Session head before this envelope.
        expected: Option<String>,
        /// Value carried by the envelope.
        found: Option<String>,
    },
    /// `envelope_hash` does not recompute.
    #[error("envelope hash mismatch: expected {expected}, found {found:?}")]
    HashMismatch {
        /// Recomputed hash.
        expected: String,
        /// Value carried by the envelope.
        found: Option<String>,
    },
    /// Chain fields present where the mode forbids them.
    #[error("unexpected chain fields: {0}")]
    Unexpected(String),
    /// Hash computation failed.
    #[error("chain hash error: {0}")]
    Codec(String),
}

/// Strategy that links envelopes within a session.
pub trait ChainStrategy: Send + Sync {
    /// Returns the mode implemented by this strategy.
    fn mode(&self) -> ChainMode;

    /// Assigns chain fields to an envelope given the current session head.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when hashing fails.
    fn seal(&self, envelope: &mut EventEnvelope, head: Option<&str>) -> Result<(), CodecError>;

    /// Checks the chain fields of a stored envelope against the session head.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] when the link or hash does not verify.
    fn check(&self, envelope: &EventEnvelope, head: Option<&str>) -> Result<(), ChainError>;
}

// ============================================================================
// SECTION: Ledger Errors
// ============================================================================

/// Ledger and appender errors.
///
/// # Invariants
/// - Write failures are never swallowed; callers must surface them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Opening or reading the ledger failed.
    #[error("ledger io error: {0}")]
    Io(String),
    /// Appending a line failed.
    #[error("ledger write failed: {0}")]
    Write(String),
    /// A complete line could not be decoded.
    #[error("ledger corrupt at line {line}: {message}")]
    Corrupt {
        /// 1-based line number.
        line: usize,
        /// Decode failure.
        message: String,
    },
    /// Envelope failed codec validation.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

// ============================================================================
// SECTION: Decision Sinks
// ============================================================================

/// Destination for decision records.
pub trait DecisionSink: Send + Sync {
    /// Persists one record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the record cannot be written.
    fn write(&self, record: &DecisionRecord) -> Result<(), LedgerError>;

    /// Returns true when records are actually persisted.
    fn enabled(&self) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Replay Targets
// ============================================================================

/// Replay target errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The step URI is not a readable resource.
    #[error("invalid replay uri: {0}")]
    InvalidUri(String),
    /// The target failed to serve the read.
    #[error("replay target failed: {0}")]
    Failed(String),
}

/// Live system a replay plan is run against.
pub trait ReplayTarget {
    /// Returns the live policy snapshot.
    fn live_policy(&self) -> &PolicySnapshot;

    /// Reads a resource and classifies the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] when the read cannot be performed at all.
    fn observe(&self, uri: &str) -> Result<ObservedOutcome, TargetError>;
}
