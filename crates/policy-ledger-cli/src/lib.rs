// crates/policy-ledger-cli/src/lib.rs
// ============================================================================
// Module: Policy Ledger CLI Library
// Description: Shared helpers for the Policy Ledger command-line binary.
// Purpose: Expose the localized message catalog to the binary and its tests.
// Dependencies: crate::i18n
// ============================================================================

//! ## Overview
//! The library half of the CLI only carries the message catalog. Command
//! dispatch lives in the binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
