// crates/policy-ledger-core/src/lib.rs
// ============================================================================
// Module: Policy Ledger Core Library
// Description: Public API surface for the Policy Ledger core.
// Purpose: Expose envelope, policy, lifecycle, and replay types plus runtimes.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Policy Ledger core turns accountable actions into hash-verifiable facts.
//! It provides the canonical event envelope, an append-only JSONL ledger with
//! optional hash chaining, a resource policy gate with a replayable decision
//! log, a lifecycle manager that classifies boots from ledger history, and a
//! compiler that derives regression plans purely from recorded decisions.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ActorResolver;
pub use interfaces::ChainError;
pub use interfaces::ChainMode;
pub use interfaces::ChainStrategy;
pub use interfaces::DecisionSink;
pub use interfaces::LedgerError;
pub use interfaces::ReplayTarget;
pub use interfaces::TargetError;
pub use runtime::BootReceipt;
pub use runtime::DecisionLogError;
pub use runtime::DecisionLogger;
pub use runtime::DisabledDecisionSink;
pub use runtime::GateError;
pub use runtime::GateLimits;
pub use runtime::GateOutcome;
pub use runtime::HashChain;
pub use runtime::IncompleteRun;
pub use runtime::JsonlAppender;
pub use runtime::JsonlDecisionSink;
pub use runtime::LedgerMirror;
pub use runtime::LedgerOptions;
pub use runtime::LedgerWriter;
pub use runtime::LifecycleError;
pub use runtime::LifecycleManager;
pub use runtime::MemoryDecisionSink;
pub use runtime::NoChain;
pub use runtime::ReplayError;
pub use runtime::ResolvedAccess;
pub use runtime::ResourceGate;
pub use runtime::StaticActorResolver;
