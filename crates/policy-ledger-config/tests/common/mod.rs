// crates/policy-ledger-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for policy-ledger-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::BTreeMap;

use policy_ledger_config::ConfigError;
use policy_ledger_config::PolicyLedgerConfig;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `PolicyLedgerConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<PolicyLedgerConfig, String> {
    PolicyLedgerConfig::from_toml_str(toml_str).map_err(|err| err.to_string())
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<PolicyLedgerConfig, String> {
    config_from_toml("")
}

/// Asserts that validation failed with a message containing `needle`.
pub fn assert_invalid(result: Result<(), ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(()) => Err("expected invalid config".to_string()),
    }
}

/// Builds an environment lookup from fixed pairs.
pub fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: BTreeMap<String, String> =
        pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect();
    move |key| map.get(key).cloned()
}
