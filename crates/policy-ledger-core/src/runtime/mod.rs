// crates/policy-ledger-core/src/runtime/mod.rs
// ============================================================================
// Module: Policy Ledger Runtime
// Description: Ledger, gate, decision log, lifecycle, and replay runtimes.
// Purpose: Perform the I/O-bearing operations over the pure core types.
// Dependencies: crate::{core, interfaces}, cap-std
// ============================================================================

//! ## Overview
//! The runtime owns every file the system touches: the event ledger and the
//! decision log (both append-only JSONL), the sandboxed resource tree, the
//! system identity file, and replay artifacts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actors;
pub mod appender;
pub mod baseline;
pub mod chain;
pub mod decision_log;
pub mod gate;
pub mod ledger;
pub mod lifecycle;
pub mod replay;
pub mod replay_runner;
pub mod verify;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actors::StaticActorResolver;
pub use appender::JsonlAppender;
pub use baseline::check_baseline;
pub use chain::HashChain;
pub use chain::NoChain;
pub use chain::chain_strategy;
pub use decision_log::DecisionLogError;
pub use decision_log::DecisionLogger;
pub use decision_log::DisabledDecisionSink;
pub use decision_log::JsonlDecisionSink;
pub use decision_log::LedgerMirror;
pub use decision_log::MemoryDecisionSink;
pub use gate::DirEntryInfo;
pub use gate::GateError;
pub use gate::GateLimits;
pub use gate::GateOutcome;
pub use gate::ResolvedAccess;
pub use gate::ResourceGate;
pub use ledger::LedgerOptions;
pub use ledger::LedgerSnapshot;
pub use ledger::LedgerWriter;
pub use ledger::read_ledger;
pub use lifecycle::BootReceipt;
pub use lifecycle::IncompleteRun;
pub use lifecycle::LifecycleError;
pub use lifecycle::LifecycleManager;
pub use replay::CompiledPlan;
pub use replay::ReplayError;
pub use replay::compile;
pub use replay::compile_file;
pub use replay::load_plan;
pub use replay::write_plan;
pub use replay_runner::run_replay;
pub use verify::LedgerVerification;
pub use verify::verify_ledger;
