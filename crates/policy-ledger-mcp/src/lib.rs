// crates/policy-ledger-mcp/src/lib.rs
// ============================================================================
// Module: Policy Ledger MCP
// Description: MCP resource server over the policy gate and decision log.
// Purpose: Expose gated filesystem resources to MCP clients over stdio.
// Dependencies: policy-ledger-core, policy-ledger-config, tokio
// ============================================================================

//! ## Overview
//! Policy Ledger MCP serves `mcpfs://repo/...` resources through the
//! [`policy_ledger_core::ResourceGate`]. Every gated read is logged before
//! its body is returned, and the same reader doubles as the live target for
//! replay plans.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod resources;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::DiagnosticSink;
pub use audit::FileDiagnosticSink;
pub use audit::NoopDiagnosticSink;
pub use audit::RpcMethod;
pub use audit::RpcOutcome;
pub use audit::ServerDiagnostic;
pub use audit::StderrDiagnosticSink;
pub use resources::DecisionLogInfo;
pub use resources::ResourceContent;
pub use server::PolicyServer;
pub use server::ReadError;
pub use server::ReadResult;
pub use server::ResourceServer;
pub use server::ServerError;
