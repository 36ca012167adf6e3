// crates/policy-ledger-cli/src/main.rs
// ============================================================================
// Module: Policy Ledger CLI Entry Point
// Description: Command dispatcher for the resource server and ledger tooling.
// Purpose: Provide a localized CLI for serving, replaying, and auditing.
// Dependencies: clap, policy-ledger-config, policy-ledger-core, policy-ledger-mcp, tokio.
// ============================================================================

//! ## Overview
//! The Policy Ledger CLI starts the stdio resource server and runs the
//! offline workflows around it: compiling replay plans from the decision
//! log, replaying them, pinning baselines, verifying the ledger, and
//! recording process lifecycle facts. All user-facing strings are routed
//! through the i18n catalog.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use policy_ledger_cli::i18n::Locale;
use policy_ledger_cli::i18n::set_locale;
use policy_ledger_cli::t;
use policy_ledger_config::PolicyLedgerConfig;
use policy_ledger_core::Baseline;
use policy_ledger_core::BaselineCheck;
use policy_ledger_core::BootReceipt;
use policy_ledger_core::DedupeMode;
use policy_ledger_core::EventEnvelope;
use policy_ledger_core::LedgerWriter;
use policy_ledger_core::LifecycleManager;
use policy_ledger_core::PlanFilters;
use policy_ledger_core::ProcessId;
use policy_ledger_core::ReplayReport;
use policy_ledger_core::ReplayStatus;
use policy_ledger_core::RunId;
use policy_ledger_core::SystemIdentity;
use policy_ledger_core::runtime::CompiledPlan;
use policy_ledger_core::runtime::LedgerVerification;
use policy_ledger_core::runtime::check_baseline;
use policy_ledger_core::runtime::compile_file;
use policy_ledger_core::runtime::load_plan;
use policy_ledger_core::runtime::replay::read_json_artifact;
use policy_ledger_core::runtime::replay::write_json_artifact;
use policy_ledger_core::runtime::run_replay;
use policy_ledger_core::runtime::verify_ledger;
use policy_ledger_core::runtime::write_plan;
use policy_ledger_mcp::PolicyServer;
use policy_ledger_mcp::ResourceServer;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "POLICY_LEDGER_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "policy-ledger", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `POLICY_LEDGER_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve gated `mcpfs://` resources over stdio.
    Serve(ConfigArgs),
    /// Replay plan utilities.
    Plan {
        /// Selected plan subcommand.
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Policy baseline utilities.
    Baseline {
        /// Selected baseline subcommand.
        #[command(subcommand)]
        command: BaselineCommand,
    },
    /// Ledger integrity utilities.
    Ledger {
        /// Selected ledger subcommand.
        #[command(subcommand)]
        command: LedgerCommand,
    },
    /// Process lifecycle recording.
    Lifecycle {
        /// Selected lifecycle subcommand.
        #[command(subcommand)]
        command: LifecycleCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Shared `--config` flag.
#[derive(Args, Debug, Clone, Default)]
struct ConfigArgs {
    /// Config file path (defaults to `POLICY_LEDGER_CONFIG` or policy-ledger.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Replay plan subcommands.
#[derive(Subcommand, Debug)]
enum PlanCommand {
    /// Compile a replay plan from a decision log.
    Build(PlanBuildCommand),
    /// Replay a plan against the configured policy.
    Replay(PlanReplayCommand),
}

/// Arguments for `plan build`.
#[derive(Args, Debug)]
struct PlanBuildCommand {
    /// Decision log to compile.
    #[arg(long = "in", value_name = "PATH")]
    input: PathBuf,
    /// Plan output path.
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
    /// Keep only decisions pinned to this roots hash.
    #[arg(long, value_name = "HASH")]
    roots_hash: Option<String>,
    /// Keep only the last N decisions.
    #[arg(long, value_name = "N")]
    last_n: Option<usize>,
    /// Step de-duplication mode.
    #[arg(long, value_enum, default_value_t = DedupeArg::None)]
    dedupe: DedupeArg,
}

/// Arguments for `plan replay`.
#[derive(Args, Debug)]
struct PlanReplayCommand {
    /// Plan to replay.
    #[arg(long, value_name = "PATH")]
    plan: PathBuf,
    /// Optional report output path.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
    /// Config selection.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Baseline subcommands.
#[derive(Subcommand, Debug)]
enum BaselineCommand {
    /// Pin a replay report as a baseline.
    Snapshot(BaselineSnapshotCommand),
    /// Compare a replay report against a baseline.
    Check(BaselineCheckCommand),
}

/// Arguments for `baseline snapshot`.
#[derive(Args, Debug)]
struct BaselineSnapshotCommand {
    /// Replay report to pin.
    #[arg(long, value_name = "PATH")]
    report: PathBuf,
    /// Baseline output path.
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
}

/// Arguments for `baseline check`.
#[derive(Args, Debug)]
struct BaselineCheckCommand {
    /// Baseline to compare against.
    #[arg(long, value_name = "PATH")]
    baseline: PathBuf,
    /// Replay report to compare.
    #[arg(long, value_name = "PATH")]
    report: PathBuf,
}

/// Ledger subcommands.
#[derive(Subcommand, Debug)]
enum LedgerCommand {
    /// Verify envelope hashes, chain links, and run closure.
    Verify(LedgerVerifyCommand),
}

/// Arguments for `ledger verify`.
#[derive(Args, Debug)]
struct LedgerVerifyCommand {
    /// Ledger path (defaults to the configured ledger).
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,
    /// Config selection.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Lifecycle subcommands.
#[derive(Subcommand, Debug)]
enum LifecycleCommand {
    /// Record a boot and print its receipt.
    Boot(ConfigArgs),
    /// Record the shutdown of a run.
    Shutdown(LifecycleShutdownCommand),
}

/// Arguments for `lifecycle shutdown`.
#[derive(Args, Debug)]
struct LifecycleShutdownCommand {
    /// Run to close.
    #[arg(long, value_name = "RUN_ID")]
    run_id: String,
    /// Exit reason recorded in the shutdown payload.
    #[arg(long, value_name = "REASON")]
    reason: Option<String>,
    /// Config selection.
    #[command(flatten)]
    config: ConfigArgs,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Policy Ledger configuration file.
    Validate(ConfigArgs),
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

/// Step de-duplication selections.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum DedupeArg {
    /// One step per recorded decision.
    None,
    /// Keep the last occurrence of each URI.
    UriKeepLast,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        write_stdout_line(&t!("main.version", version = env!("CARGO_PKG_VERSION")))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(&command).await,
        Commands::Plan {
            command,
        } => command_plan(&command),
        Commands::Baseline {
            command,
        } => command_baseline(&command),
        Commands::Ledger {
            command,
        } => command_ledger(&command),
        Commands::Lifecycle {
            command,
        } => command_lifecycle(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(command)?;
    let server = PolicyServer::from_config(&config)
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    server.serve().await.map_err(|err| CliError::new(t!("serve.failed", error = err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Plan Commands
// ============================================================================

/// Dispatches plan subcommands.
fn command_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    match command {
        PlanCommand::Build(command) => command_plan_build(command),
        PlanCommand::Replay(command) => command_plan_replay(command),
    }
}

/// Executes `plan build`.
fn command_plan_build(command: &PlanBuildCommand) -> CliResult<ExitCode> {
    let compiled = build_plan(command)?;
    let mut output = String::new();
    for row in &compiled.skipped {
        output.push_str(&t!("plan.build.skipped", line = row.line, reason = row.reason));
        output.push('\n');
    }
    output.push_str(&t!(
        "plan.build.ok",
        path = command.out.display(),
        steps = compiled.stats.steps,
        rows = compiled.stats.rows,
        skipped = compiled.stats.skipped,
        filtered = compiled.stats.filtered_out
    ));
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Compiles the decision log named by `command` and writes the plan.
fn build_plan(command: &PlanBuildCommand) -> CliResult<CompiledPlan> {
    let filters = PlanFilters {
        roots_hash: command.roots_hash.clone(),
        last_n: command.last_n,
        dedupe: command.dedupe.into(),
    };
    let compiled = compile_file(&command.input, &filters).map_err(|err| {
        CliError::new(t!("plan.build.failed", path = command.input.display(), error = err))
    })?;
    write_plan(&command.out, &compiled.plan).map_err(|err| {
        CliError::new(t!("plan.build.write_failed", path = command.out.display(), error = err))
    })?;
    Ok(compiled)
}

/// Executes `plan replay`; anything but a pass exits non-zero.
fn command_plan_replay(command: &PlanReplayCommand) -> CliResult<ExitCode> {
    let report = replay_plan(command)?;
    let mut output = t!(
        "plan.replay.summary",
        status = report.status.as_str(),
        total = report.stats.total,
        allow = report.stats.allow,
        deny = report.stats.deny,
        mismatch = report.stats.mismatch
    );
    for step in report.steps.iter().filter(|step| step.mismatch) {
        output.push('\n');
        output.push_str(&t!(
            "plan.replay.mismatch",
            index = step.index,
            uri = step.uri,
            expected = outcome_label(step.expect.decision.as_str(), step.expect.error_code.as_deref()),
            observed =
                outcome_label(step.observed.decision.as_str(), step.observed.error_code.as_deref())
        ));
    }
    if let Some(path) = &command.out {
        output.push('\n');
        output.push_str(&t!("plan.replay.report_written", path = path.display()));
    }
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(exit_code(report.status == ReplayStatus::Pass))
}

/// Replays a plan against a server built from configuration.
fn replay_plan(command: &PlanReplayCommand) -> CliResult<ReplayReport> {
    let plan = load_plan(&command.plan).map_err(|err| {
        CliError::new(t!("plan.replay.load_failed", path = command.plan.display(), error = err))
    })?;
    let config = load_config(&command.config)?;
    let target = ResourceServer::from_config(&config)
        .map_err(|err| CliError::new(t!("plan.replay.target_failed", error = err)))?;
    let report = run_replay(&plan, &target)
        .map_err(|err| CliError::new(t!("plan.replay.failed", error = err)))?;
    if let Some(path) = &command.out {
        write_json_artifact(path, &report).map_err(|err| {
            CliError::new(t!("plan.replay.write_failed", path = path.display(), error = err))
        })?;
    }
    Ok(report)
}

/// Renders a decision with its optional code.
fn outcome_label(decision: &str, error_code: Option<&str>) -> String {
    error_code.map_or_else(|| decision.to_string(), |code| format!("{decision}/{code}"))
}

// ============================================================================
// SECTION: Baseline Commands
// ============================================================================

/// Dispatches baseline subcommands.
fn command_baseline(command: &BaselineCommand) -> CliResult<ExitCode> {
    match command {
        BaselineCommand::Snapshot(command) => command_baseline_snapshot(command),
        BaselineCommand::Check(command) => command_baseline_check(command),
    }
}

/// Executes `baseline snapshot`.
fn command_baseline_snapshot(command: &BaselineSnapshotCommand) -> CliResult<ExitCode> {
    let baseline = snapshot_baseline(command)?;
    write_stdout_line(&t!(
        "baseline.snapshot.ok",
        path = command.out.display(),
        steps = baseline.steps.len()
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Pins the report named by `command` and writes the baseline.
fn snapshot_baseline(command: &BaselineSnapshotCommand) -> CliResult<Baseline> {
    let report: ReplayReport = read_artifact(&command.report, &t!("artifact.kind.report"))?;
    let baseline = Baseline::from_report(&report);
    write_json_artifact(&command.out, &baseline).map_err(|err| {
        CliError::new(t!(
            "baseline.snapshot.write_failed",
            path = command.out.display(),
            error = err
        ))
    })?;
    Ok(baseline)
}

/// Executes `baseline check`; any change exits non-zero.
fn command_baseline_check(command: &BaselineCheckCommand) -> CliResult<ExitCode> {
    let check = compare_baseline(command)?;
    let output = if check.is_unchanged() {
        t!("baseline.check.unchanged")
    } else {
        let mut output = t!(
            "baseline.check.changed",
            attribution = check.attribution.as_str(),
            count = check.changes.len()
        );
        for change in &check.changes {
            output.push('\n');
            output.push_str(&t!("baseline.check.change", kind = change.kind.as_str(), uri = change.uri));
        }
        output
    };
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(exit_code(check.is_unchanged()))
}

/// Compares the report named by `command` against its baseline.
fn compare_baseline(command: &BaselineCheckCommand) -> CliResult<BaselineCheck> {
    let baseline: Baseline = read_artifact(&command.baseline, &t!("artifact.kind.baseline"))?;
    let report: ReplayReport = read_artifact(&command.report, &t!("artifact.kind.report"))?;
    Ok(check_baseline(&baseline, &report))
}

/// Reads a JSON artifact with a localized error.
fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path, kind: &str) -> CliResult<T> {
    read_json_artifact(path).map_err(|err| {
        CliError::new(t!("artifact.read_failed", kind = kind, path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Ledger Commands
// ============================================================================

/// Dispatches ledger subcommands.
fn command_ledger(command: &LedgerCommand) -> CliResult<ExitCode> {
    match command {
        LedgerCommand::Verify(command) => command_ledger_verify(command),
    }
}

/// Executes `ledger verify`; integrity issues exit non-zero.
fn command_ledger_verify(command: &LedgerVerifyCommand) -> CliResult<ExitCode> {
    let (path, report) = verify(command)?;
    let mut output = if report.is_clean() {
        t!(
            "ledger.verify.ok",
            path = path.display(),
            envelopes = report.envelopes,
            lines = report.lines,
            chain = report.chain.as_str()
        )
    } else {
        t!("ledger.verify.issues", path = path.display(), count = report.issues.len())
    };
    for issue in &report.issues {
        output.push('\n');
        output.push_str(&t!(
            "ledger.verify.issue",
            line = issue.line,
            code = issue.code,
            message = issue.message
        ));
    }
    if report.partial_tail_bytes > 0 {
        output.push('\n');
        output.push_str(&t!("ledger.verify.partial_tail", bytes = report.partial_tail_bytes));
    }
    for run_id in &report.incomplete_runs {
        output.push('\n');
        output.push_str(&t!("ledger.verify.incomplete", run_id = run_id));
    }
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(exit_code(report.is_clean()))
}

/// Verifies the ledger named by the flag or the configuration.
fn verify(command: &LedgerVerifyCommand) -> CliResult<(PathBuf, LedgerVerification)> {
    let config = load_config(&command.config)?;
    let path = command.path.clone().unwrap_or_else(|| PathBuf::from(&config.ledger.path));
    let registry =
        config.payload_registry().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let report = verify_ledger(&path, &registry, config.ledger.chain).map_err(|err| {
        CliError::new(t!("ledger.verify.failed", path = path.display(), error = err))
    })?;
    Ok((path, report))
}

// ============================================================================
// SECTION: Lifecycle Commands
// ============================================================================

/// Dispatches lifecycle subcommands.
fn command_lifecycle(command: &LifecycleCommand) -> CliResult<ExitCode> {
    match command {
        LifecycleCommand::Boot(command) => command_lifecycle_boot(command),
        LifecycleCommand::Shutdown(command) => command_lifecycle_shutdown(command),
    }
}

/// Executes `lifecycle boot`, printing the receipt as JSON.
fn command_lifecycle_boot(command: &ConfigArgs) -> CliResult<ExitCode> {
    let receipt = boot(command)?;
    if let Some(notice) = &receipt.incomplete_run {
        write_stderr_line(&t!("lifecycle.boot.incomplete", notice = notice))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    write_json_line(&receipt)?;
    Ok(ExitCode::SUCCESS)
}

/// Records a boot for this process.
fn boot(command: &ConfigArgs) -> CliResult<BootReceipt> {
    let config = load_config(command)?;
    let identity = SystemIdentity::load_or_create(Path::new(&config.lifecycle.identity_path))
        .map_err(|err| CliError::new(t!("lifecycle.identity_failed", error = err)))?;
    let manager = open_lifecycle(&config)?;
    manager
        .boot(&identity.system_id, &ProcessId::generate())
        .map_err(|err| CliError::new(t!("lifecycle.boot.failed", error = err)))
}

/// Executes `lifecycle shutdown`.
fn command_lifecycle_shutdown(command: &LifecycleShutdownCommand) -> CliResult<ExitCode> {
    let envelope = shutdown(command)?;
    let reason = envelope
        .payload
        .get("exit_reason")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    write_stdout_line(&t!("lifecycle.shutdown.ok", run_id = command.run_id, reason = reason))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Records the shutdown of the run named by `command`.
fn shutdown(command: &LifecycleShutdownCommand) -> CliResult<EventEnvelope> {
    let config = load_config(&command.config)?;
    let manager = open_lifecycle(&config)?;
    manager
        .shutdown(&RunId::new(command.run_id.as_str()), command.reason.as_deref())
        .map_err(|err| CliError::new(t!("lifecycle.shutdown.failed", error = err)))
}

/// Builds a lifecycle manager over the configured ledger.
fn open_lifecycle(config: &PolicyLedgerConfig) -> CliResult<LifecycleManager> {
    let options =
        config.ledger_options().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let actors = config
        .build_actor_resolver()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let ledger = LedgerWriter::open(Path::new(&config.ledger.path), options)
        .map_err(|err| CliError::new(t!("lifecycle.open_failed", error = err)))?;
    Ok(LifecycleManager::new(Arc::new(ledger), Arc::new(actors), config.session_id()))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => {
            load_config(command)?;
            write_stdout_line(&t!("config.validate.ok"))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Loads and validates configuration.
fn load_config(args: &ConfigArgs) -> CliResult<PolicyLedgerConfig> {
    PolicyLedgerConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Maps a success flag onto a process exit code.
const fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

impl From<DedupeArg> for DedupeMode {
    fn from(value: DedupeArg) -> Self {
        match value {
            DedupeArg::None => Self::None,
            DedupeArg::UriKeepLast => Self::UriKeepLast,
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a value as one JSON line to stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
