// crates/policy-ledger-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for the command helpers behind each subcommand.
// Purpose: Exercise plan, replay, baseline, ledger, and lifecycle flows end to end.
// Dependencies: policy-ledger-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Each test writes a config into a temp directory and drives the same
//! helpers the subcommands call, checking the artifacts they leave behind.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use policy_ledger_cli::i18n::Locale;
use policy_ledger_core::BootMode;
use policy_ledger_core::ReplayStatus;
use policy_ledger_core::replay::Attribution;
use policy_ledger_core::runtime::load_plan;
use policy_ledger_mcp::ResourceServer;

use super::BaselineCheckCommand;
use super::BaselineSnapshotCommand;
use super::Cli;
use super::Commands;
use super::ConfigArgs;
use super::DedupeArg;
use super::LangArg;
use super::LedgerVerifyCommand;
use super::LifecycleShutdownCommand;
use super::PlanBuildCommand;
use super::PlanCommand;
use super::PlanReplayCommand;
use super::boot;
use super::build_plan;
use super::compare_baseline;
use super::load_config;
use super::replay_plan;
use super::resolve_locale;
use super::shutdown;
use super::snapshot_baseline;
use super::verify;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const URIS: [&str; 3] = [
    "mcpfs://repo/file/projects%2Fmcp%2Freadme.md",
    "mcpfs://repo/file/docs%2Fguide.md",
    "mcpfs://repo/dir/projects%2Fmcp",
];

fn write_config(dir: &Path, roots: &[&str]) -> ConfigArgs {
    let root = dir.join("repo");
    fs::create_dir_all(root.join("projects/mcp")).expect("mkdir");
    fs::create_dir_all(root.join("docs")).expect("mkdir docs");
    fs::write(root.join("projects/mcp/readme.md"), "# mcp\n").expect("readme");
    fs::write(root.join("docs/guide.md"), "guide\n").expect("guide");
    let roots = roots.iter().map(|root| format!("'{root}'")).collect::<Vec<_>>().join(", ");
    let toml = format!(
        "[policy]\nallowed_roots = [{roots}]\nsandbox_root = '{root}'\n\n[decision_log]\npath = \
         '{log}'\n\n[ledger]\npath = '{ledger}'\n\n[lifecycle]\nidentity_path = \
         '{identity}'\n\n[server]\ndiagnostics = 'none'\n",
        root = root.display(),
        log = dir.join("out/decisions.jsonl").display(),
        ledger = dir.join("out/events.jsonl").display(),
        identity = dir.join("out/identity.json").display(),
    );
    let path = dir.join("policy-ledger.toml");
    fs::write(&path, toml).expect("config");
    ConfigArgs {
        config: Some(path),
    }
}

fn seed_decisions(args: &ConfigArgs) {
    let config = load_config(args).expect("config");
    let server = ResourceServer::from_config(&config).expect("server");
    for uri in URIS {
        server.read(uri).expect("read");
    }
}

fn plan_command(dir: &Path) -> PlanBuildCommand {
    PlanBuildCommand {
        input: dir.join("out/decisions.jsonl"),
        out: dir.join("out/plan.json"),
        roots_hash: None,
        last_n: None,
        dedupe: DedupeArg::None,
    }
}

fn replay_command(dir: &Path, args: ConfigArgs, out: &str) -> PlanReplayCommand {
    PlanReplayCommand {
        plan: dir.join("out/plan.json"),
        out: Some(dir.join(out)),
        config: args,
    }
}

// ============================================================================
// SECTION: Plan and Baseline Tests
// ============================================================================

#[test]
fn build_plan_writes_plan_and_reports_skipped_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = write_config(dir.path(), &["projects/mcp"]);
    seed_decisions(&args);
    let log = dir.path().join("out/decisions.jsonl");
    let mut text = fs::read_to_string(&log).expect("log");
    text.push_str("{\"decision\":\"ALLOW\"}\n");
    fs::write(&log, text).expect("append");

    let compiled = build_plan(&plan_command(dir.path())).expect("build");
    assert_eq!(compiled.stats.steps, 3);
    assert_eq!(compiled.skipped.len(), 1);
    assert_eq!(compiled.skipped[0].line, 4);
    let plan = load_plan(&dir.path().join("out/plan.json")).expect("plan");
    assert_eq!(plan.steps.len(), 3);
    assert_eq!(plan.allowed_roots, vec!["projects/mcp".to_string()]);
}

#[test]
fn build_plan_reports_missing_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = build_plan(&plan_command(dir.path())).expect_err("missing log");
    assert!(err.to_string().contains("decisions.jsonl"), "{err}");
}

#[test]
fn replay_and_baseline_attribute_policy_changes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = write_config(dir.path(), &["projects/mcp"]);
    seed_decisions(&args);
    build_plan(&plan_command(dir.path())).expect("build");

    let report = replay_plan(&replay_command(dir.path(), args, "out/report.json")).expect("replay");
    assert_eq!(report.status, ReplayStatus::Pass);
    assert_eq!(report.stats.allow, 2);
    assert_eq!(report.stats.deny, 1);

    let baseline = snapshot_baseline(&BaselineSnapshotCommand {
        report: dir.path().join("out/report.json"),
        out: dir.path().join("out/baseline.json"),
    })
    .expect("snapshot");
    assert_eq!(baseline.steps.len(), 3);
    let same = compare_baseline(&BaselineCheckCommand {
        baseline: dir.path().join("out/baseline.json"),
        report: dir.path().join("out/report.json"),
    })
    .expect("check");
    assert!(same.is_unchanged());

    let widened = write_config(dir.path(), &["projects/mcp", "docs"]);
    let report =
        replay_plan(&replay_command(dir.path(), widened, "out/report-wide.json")).expect("replay");
    assert_eq!(report.status, ReplayStatus::Drift);
    let check = compare_baseline(&BaselineCheckCommand {
        baseline: dir.path().join("out/baseline.json"),
        report: dir.path().join("out/report-wide.json"),
    })
    .expect("check");
    assert_eq!(check.attribution, Attribution::PolicyChanged);
    assert_eq!(check.changes.len(), 1);
    assert_eq!(check.changes[0].uri, URIS[1]);
}

#[test]
fn baseline_check_reports_unreadable_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("baseline.json"), "not json").expect("write");
    let err = compare_baseline(&BaselineCheckCommand {
        baseline: dir.path().join("baseline.json"),
        report: dir.path().join("report.json"),
    })
    .expect_err("invalid baseline");
    assert!(err.to_string().starts_with("Failed to read baseline"), "{err}");
}

// ============================================================================
// SECTION: Lifecycle and Ledger Tests
// ============================================================================

#[test]
fn lifecycle_boot_recovers_and_ledger_verifies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = write_config(dir.path(), &["projects/mcp"]);

    let first = boot(&args).expect("boot");
    assert_eq!(first.boot_mode, BootMode::Cold);
    let second = boot(&args).expect("boot");
    assert_eq!(second.boot_mode, BootMode::Recover);
    assert_eq!(second.incomplete_run.as_ref().map(|run| &run.run_id), Some(&first.run_id));

    let envelope = shutdown(&LifecycleShutdownCommand {
        run_id: second.run_id.to_string(),
        reason: Some("maintenance".to_string()),
        config: args.clone(),
    })
    .expect("shutdown");
    assert_eq!(envelope.payload["exit_reason"], "maintenance");

    let third = boot(&args).expect("boot");
    assert_eq!(third.boot_mode, BootMode::Warm);
    let identity = fs::read_to_string(dir.path().join("out/identity.json")).expect("identity");
    assert!(identity.contains("system_id"));

    let (path, report) = verify(&LedgerVerifyCommand {
        path: None,
        config: args,
    })
    .expect("verify");
    assert_eq!(path, dir.path().join("out/events.jsonl"));
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.envelopes, 4);
    assert_eq!(report.incomplete_runs, vec![first.run_id, third.run_id]);
}

#[test]
fn shutdown_rejects_unknown_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = write_config(dir.path(), &["projects/mcp"]);
    let err = shutdown(&LifecycleShutdownCommand {
        run_id: "run-missing".to_string(),
        reason: None,
        config: args,
    })
    .expect_err("unknown run");
    assert!(err.to_string().contains("run-missing"), "{err}");
}

#[test]
fn verify_flags_tampered_envelopes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = write_config(dir.path(), &["projects/mcp"]);
    boot(&args).expect("boot");
    let ledger: PathBuf = dir.path().join("out/events.jsonl");
    let text = fs::read_to_string(&ledger).expect("ledger");
    fs::write(&ledger, text.replace("\"cold\"", "\"warm\"")).expect("tamper");
    let (_, report) = verify(&LedgerVerifyCommand {
        path: Some(ledger),
        config: args,
    })
    .expect("verify");
    assert!(!report.is_clean());
    assert_eq!(report.issues[0].line, 1);
}

// ============================================================================
// SECTION: Argument Tests
// ============================================================================

#[test]
fn load_config_rejects_missing_explicit_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_config(&ConfigArgs {
        config: Some(dir.path().join("absent.toml")),
    })
    .expect_err("missing config");
    assert!(err.to_string().starts_with("Failed to load config"), "{err}");
}

#[test]
fn resolve_locale_prefers_flag_then_env() {
    assert_eq!(resolve_locale(Some(LangArg::Ca), Some("en")).expect("flag"), Locale::Ca);
    assert_eq!(resolve_locale(None, Some("ca-ES")).expect("env"), Locale::Ca);
    assert_eq!(resolve_locale(None, None).expect("default"), Locale::En);
    let err = resolve_locale(None, Some("xx")).expect_err("invalid env");
    assert!(err.to_string().contains("POLICY_LEDGER_LANG"), "{err}");
}

#[test]
fn plan_build_arguments_parse() {
    let cli = Cli::try_parse_from([
        "policy-ledger",
        "plan",
        "build",
        "--in",
        "log.jsonl",
        "--out",
        "plan.json",
        "--last-n",
        "5",
        "--dedupe",
        "uri-keep-last",
    ])
    .expect("parse");
    let Some(Commands::Plan {
        command: PlanCommand::Build(command),
    }) = cli.command
    else {
        panic!("expected plan build");
    };
    assert_eq!(command.input, PathBuf::from("log.jsonl"));
    assert_eq!(command.last_n, Some(5));
    assert_eq!(command.dedupe, DedupeArg::UriKeepLast);
    assert!(Cli::try_parse_from(["policy-ledger", "plan", "build", "--dedupe", "sometimes"]).is_err());
}
