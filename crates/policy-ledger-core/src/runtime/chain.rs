// crates/policy-ledger-core/src/runtime/chain.rs
// ============================================================================
// Module: Chain Strategies
// Description: Unlinked and per-session hash-linked envelope chaining.
// Purpose: Make ledger tampering evident when chaining is enabled.
// Dependencies: crate::core::envelope
// ============================================================================

//! ## Overview
//! [`HashChain`] links each envelope to the previous envelope of the same
//! session through `prev_envelope_hash` and seals it with `envelope_hash`.
//! [`NoChain`] leaves both fields unset. Chaining gives tamper evidence, not
//! tamper proofing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::envelope::CodecError;
use crate::core::envelope::EventEnvelope;
use crate::core::envelope::compute_envelope_hash;
use crate::interfaces::ChainError;
use crate::interfaces::ChainMode;
use crate::interfaces::ChainStrategy;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Strategy that never links envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChain;

impl ChainStrategy for NoChain {
    fn mode(&self) -> ChainMode {
        ChainMode::None
    }

    fn seal(&self, envelope: &mut EventEnvelope, _head: Option<&str>) -> Result<(), CodecError> {
        envelope.prev_envelope_hash = None;
        envelope.envelope_hash = None;
        Ok(())
    }

    fn check(&self, envelope: &EventEnvelope, _head: Option<&str>) -> Result<(), ChainError> {
        if envelope.prev_envelope_hash.is_some() || envelope.envelope_hash.is_some() {
            return Err(ChainError::Unexpected(
                "chain fields are set on an unchained ledger".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-session SHA-256 hash chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashChain;

impl ChainStrategy for HashChain {
    fn mode(&self) -> ChainMode {
        ChainMode::Chained
    }

    fn seal(&self, envelope: &mut EventEnvelope, head: Option<&str>) -> Result<(), CodecError> {
        envelope.prev_envelope_hash = head.map(str::to_string);
        envelope.envelope_hash = None;
        envelope.envelope_hash = Some(compute_envelope_hash(envelope)?);
        Ok(())
    }

    fn check(&self, envelope: &EventEnvelope, head: Option<&str>) -> Result<(), ChainError> {
        if envelope.prev_envelope_hash.as_deref() != head {
            return Err(ChainError::BrokenLink {
                expected: head.map(str::to_string),
                found: envelope.prev_envelope_hash.clone(),
            });
        }
        let expected =
            compute_envelope_hash(envelope).map_err(|err| ChainError::Codec(err.to_string()))?;
        if envelope.envelope_hash.as_deref() != Some(expected.as_str()) {
            return Err(ChainError::HashMismatch {
                expected,
                found: envelope.envelope_hash.clone(),
            });
        }
        Ok(())
    }
}

/// Returns the strategy for a mode.
#[must_use]
pub fn chain_strategy(mode: ChainMode) -> Box<dyn ChainStrategy> {
    match mode {
        ChainMode::None => Box::new(NoChain),
        ChainMode::Chained => Box::new(HashChain),
    }
}
