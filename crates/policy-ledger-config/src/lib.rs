// crates/policy-ledger-config/src/lib.rs
// ============================================================================
// Module: Policy Ledger Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for policy-ledger.toml semantics.
// Dependencies: policy-ledger-core, serde, toml
// ============================================================================

//! ## Overview
//! `policy-ledger-config` defines the configuration model shared by the
//! resource server and the CLI. It provides strict, fail-closed validation
//! and builders for the runtime pieces the config drives: the policy
//! snapshot, gate limits, payload registry, ledger options, and actor
//! bindings.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
