// crates/policy-ledger-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Path resolution, file limits, and environment overrides.
// Purpose: Ensure config loading fails closed and overrides apply predictably.
// =============================================================================
//! ## Overview
//! Validates path resolution, file limits, and environment overrides.

use std::fs;

use policy_ledger_config::ConfigError;
use policy_ledger_config::PolicyLedgerConfig;

mod common;

use common::TestResult;
use common::env_from;

#[test]
fn missing_default_file_uses_defaults() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let config_path = dir.path().join("absent.toml");
    let env = env_from(&[("POLICY_LEDGER_CONFIG", "")]);
    let config = PolicyLedgerConfig::load_with_env(None, env).map_err(|err| err.to_string())?;
    if config.source_path.is_some() {
        return Err("no file should have been read".to_string());
    }
    match PolicyLedgerConfig::load_with_env(Some(&config_path), env_from(&[])) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("unexpected error {err}")),
        Ok(_) => Err("explicit missing file should fail".to_string()),
    }
}

#[test]
fn env_named_file_must_exist() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("missing.toml");
    let missing = missing.to_string_lossy().to_string();
    let env = env_from(&[("POLICY_LEDGER_CONFIG", missing.as_str())]);
    match PolicyLedgerConfig::load_with_env(None, env) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("unexpected error {err}")),
        Ok(_) => Err("env-named missing file should fail".to_string()),
    }
}

#[test]
fn file_is_parsed_and_validated() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("policy-ledger.toml");
    fs::write(&path, "[policy]\nallowed_roots = [\"docs\", \"projects/mcp\"]\n[ledger]\nchain = \"none\"\n")
        .map_err(|err| err.to_string())?;
    let config =
        PolicyLedgerConfig::load_with_env(Some(&path), env_from(&[])).map_err(|err| err.to_string())?;
    if config.policy.allowed_roots.len() != 2 {
        return Err("roots should come from the file".to_string());
    }
    if config.source_path.as_deref() != Some(path.as_path()) {
        return Err("source path should be recorded".to_string());
    }

    fs::write(&path, "[policy]\nallowed_roots = [\"/etc\"]\n").map_err(|err| err.to_string())?;
    match PolicyLedgerConfig::load_with_env(Some(&path), env_from(&[])) {
        Err(ConfigError::Invalid(_)) => Ok(()),
        Err(err) => Err(format!("unexpected error {err}")),
        Ok(_) => Err("absolute root should be rejected".to_string()),
    }
}

#[test]
fn unknown_fields_and_bad_toml_are_parse_errors() -> TestResult {
    for content in ["[policy]\nallowed_rots = []\n", "[policy\n", "[server]\ndiagnostics = \"syslog\"\n"] {
        match PolicyLedgerConfig::from_toml_str(content) {
            Err(ConfigError::Parse(_)) => {}
            Err(err) => return Err(format!("unexpected error {err}")),
            Ok(_) => return Err(format!("content should fail to parse: {content}")),
        }
    }
    Ok(())
}

#[test]
fn oversized_and_non_utf8_files_are_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let big = dir.path().join("big.toml");
    fs::write(&big, vec![b'#'; 1024 * 1024 + 1]).map_err(|err| err.to_string())?;
    common::assert_invalid(
        PolicyLedgerConfig::load_with_env(Some(&big), env_from(&[])).map(|_| ()),
        "size limit",
    )?;
    let binary = dir.path().join("binary.toml");
    fs::write(&binary, [0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    common::assert_invalid(
        PolicyLedgerConfig::load_with_env(Some(&binary), env_from(&[])).map(|_| ()),
        "utf-8",
    )
}

#[test]
fn environment_overrides_apply_after_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("policy-ledger.toml");
    fs::write(&path, "[policy]\nallowed_roots = [\"projects/mcp\"]\n").map_err(|err| err.to_string())?;
    let env = env_from(&[
        ("POLICY_LEDGER_ROOTS", " docs , projects/other ,"),
        ("POLICY_LEDGER_DECISION_LOG", "logs/decisions.jsonl"),
        ("POLICY_LEDGER_DECISION_LOG_ENABLED", "No"),
    ]);
    let config = PolicyLedgerConfig::load_with_env(Some(&path), env).map_err(|err| err.to_string())?;
    if config.policy.allowed_roots != ["docs".to_string(), "projects/other".to_string()] {
        return Err("roots override should replace file roots".to_string());
    }
    if config.decision_log.path != "logs/decisions.jsonl" {
        return Err("decision log path override should apply".to_string());
    }
    if config.decision_log.enabled {
        return Err("decision log should be disabled".to_string());
    }
    Ok(())
}

#[test]
fn empty_overrides_keep_configured_values() -> TestResult {
    let mut config = common::minimal_config()?;
    config.apply_env_overrides(env_from(&[
        ("POLICY_LEDGER_ROOTS", " , "),
        ("POLICY_LEDGER_DECISION_LOG", ""),
        ("POLICY_LEDGER_DECISION_LOG_ENABLED", ""),
    ]));
    if config != PolicyLedgerConfig::default() {
        return Err("empty overrides should change nothing".to_string());
    }
    config.apply_env_overrides(env_from(&[("POLICY_LEDGER_DECISION_LOG_ENABLED", "1")]));
    if !config.decision_log.enabled {
        return Err("truthy flag should keep logging enabled".to_string());
    }
    Ok(())
}
