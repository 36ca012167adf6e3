// crates/policy-ledger-core/src/runtime/replay.rs
// ============================================================================
// Module: Replay Plan Compiler
// Description: Derives deterministic replay plans from decision history.
// Purpose: Compile JSONL decision logs into regression plans without guessing.
// Dependencies: serde_json, crate::core::replay
// ============================================================================

//! ## Overview
//! The compiler reads decision rows, extracts fields through an ordered
//! strategy ([`RecordExtractor`]), and applies a fixed pipeline:
//! filter by `roots_hash`, keep the last `n` rows, then de-duplicate.
//! Rows lacking a URI or decision are skipped and counted; decisions other
//! than ALLOW/DENY are errors. Nothing is ever invented: a DENY step carries
//! an error code only when one was recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::decision::Decision;
use crate::core::decision::POLICY_DECISION_EVENT;
use crate::core::replay::DECISION_LOG_SOURCE;
use crate::core::replay::DedupeMode;
use crate::core::replay::PLAN_SCHEMA_VERSION;
use crate::core::replay::PlanFilters;
use crate::core::replay::PlanSource;
use crate::core::replay::ReplayPlan;
use crate::core::replay::ReplayStep;
use crate::core::replay::StepExpectation;
use crate::runtime::ledger::RawLine;
use crate::runtime::ledger::read_line_snapshot;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum size of a plan, report, or baseline file.
pub const MAX_ARTIFACT_BYTES: u64 = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Compiler and artifact errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// Reading or writing a file failed.
    #[error("replay io error: {0}")]
    Io(String),
    /// A non-blank line is not JSON.
    #[error("invalid json at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Parse failure.
        message: String,
    },
    /// A row is valid JSON but not an object.
    #[error("row at line {line} is not a json object")]
    NotAnObject {
        /// 1-based line number.
        line: usize,
    },
    /// A recorded decision is neither ALLOW nor DENY.
    #[error("invalid decision '{value}' at line {line}")]
    InvalidDecision {
        /// 1-based line number.
        line: usize,
        /// Recorded value.
        value: String,
    },
    /// An artifact does not match its schema.
    #[error("invalid replay artifact: {0}")]
    Schema(String),
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// A JSON path: keys walked from the row root.
type FieldPath = &'static [&'static str];

/// Ordered field lookup strategy for decision rows.
///
/// Each field is read from the first source that holds a value of the right
/// type; later sources are never consulted once one matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordExtractor {
    /// URI sources.
    pub uri: &'static [FieldPath],
    /// Decision sources.
    pub decision: &'static [FieldPath],
    /// Error code sources.
    pub error_code: &'static [FieldPath],
    /// Roots hash sources.
    pub roots_hash: &'static [FieldPath],
    /// Allowed roots sources.
    pub allowed_roots: &'static [FieldPath],
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self {
            uri: &[&["uri"], &["request", "uri"], &["resource", "uri"]],
            decision: &[&["decision"], &["result", "decision"]],
            error_code: &[&["error_code"], &["result", "error_code"], &["reason", "code"]],
            roots_hash: &[&["roots_hash"], &["roots", "hash"], &["policy", "roots_hash"]],
            allowed_roots: &[&["allowed_roots"], &["policy", "allowed_roots"]],
        }
    }
}

impl RecordExtractor {
    /// Extracts a row, or explains why it was skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::InvalidDecision`] for decisions other than
    /// ALLOW/DENY.
    fn extract(
        &self,
        line: usize,
        row: &Map<String, Value>,
    ) -> Result<Result<ExtractedRow, SkippedRow>, ReplayError> {
        let row = unwrap_envelope(row);
        let Some(uri) = first_str(row, self.uri) else {
            return Ok(Err(SkippedRow {
                line,
                reason: "missing uri".to_string(),
            }));
        };
        let Some(raw_decision) = first_str(row, self.decision) else {
            return Ok(Err(SkippedRow {
                line,
                reason: "missing decision".to_string(),
            }));
        };
        let decision = Decision::parse(raw_decision).ok_or_else(|| ReplayError::InvalidDecision {
            line,
            value: raw_decision.to_string(),
        })?;
        Ok(Ok(ExtractedRow {
            uri: uri.to_string(),
            decision,
            error_code: first_str(row, self.error_code).map(str::to_string),
            roots_hash: first_str(row, self.roots_hash).map(str::to_string),
            allowed_roots: first_string_list(row, self.allowed_roots),
        }))
    }
}

/// Unwraps a `policy.decision` envelope to its payload.
fn unwrap_envelope(row: &Map<String, Value>) -> &Map<String, Value> {
    let is_envelope = row.get("event_type").and_then(Value::as_str) == Some(POLICY_DECISION_EVENT);
    match row.get("payload") {
        Some(Value::Object(payload)) if is_envelope => payload,
        _ => row,
    }
}

/// Walks a path from the row root.
fn lookup<'a>(row: &'a Map<String, Value>, path: FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut value = row.get(*first)?;
    for key in rest {
        value = value.as_object()?.get(*key)?;
    }
    Some(value)
}

/// Returns the first string value among the paths.
fn first_str<'a>(row: &'a Map<String, Value>, paths: &[FieldPath]) -> Option<&'a str> {
    paths.iter().find_map(|path| lookup(row, path).and_then(Value::as_str))
}

/// Returns the first all-string array among the paths.
fn first_string_list(row: &Map<String, Value>, paths: &[FieldPath]) -> Option<Vec<String>> {
    paths.iter().find_map(|path| {
        let items = lookup(row, path)?.as_array()?;
        items.iter().map(|item| item.as_str().map(str::to_string)).collect()
    })
}

/// Row fields used to build a step.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtractedRow {
    /// Resource URI.
    uri: String,
    /// Recorded decision.
    decision: Decision,
    /// Recorded error code.
    error_code: Option<String>,
    /// Recorded roots hash.
    roots_hash: Option<String>,
    /// Recorded allowed roots.
    allowed_roots: Option<Vec<String>>,
}

// ============================================================================
// SECTION: Compilation
// ============================================================================

/// A row that could not produce a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number.
    pub line: usize,
    /// Reason.
    pub reason: String,
}

/// Compilation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileStats {
    /// Non-blank rows read.
    pub rows: usize,
    /// Rows skipped for missing fields.
    pub skipped: usize,
    /// Rows dropped by the roots hash filter.
    pub filtered_out: usize,
    /// Steps emitted.
    pub steps: usize,
}

/// Plan plus compilation diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPlan {
    /// Compiled plan.
    pub plan: ReplayPlan,
    /// Counts.
    pub stats: CompileStats,
    /// Skipped rows.
    pub skipped: Vec<SkippedRow>,
}

/// Compiles decision rows into a plan.
///
/// # Errors
///
/// Returns [`ReplayError`] for invalid JSON, non-object rows, or invalid
/// decisions.
pub fn compile(
    lines: &[RawLine],
    source_path: &str,
    filters: &PlanFilters,
) -> Result<CompiledPlan, ReplayError> {
    let extractor = RecordExtractor::default();
    let mut stats = CompileStats::default();
    let mut skipped = Vec::new();
    let mut rows = Vec::new();
    for line in lines {
        stats.rows += 1;
        let value: Value =
            serde_json::from_slice(&line.bytes).map_err(|err| ReplayError::InvalidJson {
                line: line.number,
                message: err.to_string(),
            })?;
        let Value::Object(object) = value else {
            return Err(ReplayError::NotAnObject {
                line: line.number,
            });
        };
        match extractor.extract(line.number, &object)? {
            Ok(row) => rows.push(row),
            Err(skip) => skipped.push(skip),
        }
    }
    stats.skipped = skipped.len();

    if let Some(roots_hash) = &filters.roots_hash {
        let before = rows.len();
        rows.retain(|row| row.roots_hash.as_deref() == Some(roots_hash.as_str()));
        stats.filtered_out = before - rows.len();
    }
    if let Some(last_n) = filters.last_n {
        let start = rows.len().saturating_sub(last_n);
        rows.drain(.. start);
    }
    if filters.dedupe == DedupeMode::UriKeepLast {
        rows = dedupe_keep_last(rows);
    }

    let latest = rows.last();
    let roots_hash =
        filters.roots_hash.clone().or_else(|| latest.and_then(|row| row.roots_hash.clone()));
    let allowed_roots = latest.and_then(|row| row.allowed_roots.clone()).unwrap_or_default();
    let steps: Vec<ReplayStep> = rows
        .into_iter()
        .map(|row| ReplayStep {
            uri: row.uri,
            expect: StepExpectation::new(row.decision, row.error_code),
        })
        .collect();
    stats.steps = steps.len();
    Ok(CompiledPlan {
        plan: ReplayPlan {
            schema_version: PLAN_SCHEMA_VERSION.to_string(),
            source: PlanSource {
                kind: DECISION_LOG_SOURCE.to_string(),
                path: source_path.to_string(),
                filters: filters.clone(),
            },
            roots_hash,
            allowed_roots,
            steps,
        },
        stats,
        skipped,
    })
}

/// Keeps the last row per URI, ordered by last appearance.
fn dedupe_keep_last(rows: Vec<ExtractedRow>) -> Vec<ExtractedRow> {
    let mut seen = BTreeSet::new();
    let mut kept: Vec<ExtractedRow> = rows
        .into_iter()
        .rev()
        .filter(|row| seen.insert(row.uri.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Compiles a decision log file into a plan.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] when the log is missing or unreadable, and
/// other variants as for [`compile`].
pub fn compile_file(path: &Path, filters: &PlanFilters) -> Result<CompiledPlan, ReplayError> {
    if !path.is_file() {
        return Err(ReplayError::Io(format!("decision log not found: {}", path.display())));
    }
    let snapshot = read_line_snapshot(path).map_err(|err| ReplayError::Io(err.to_string()))?;
    compile(&snapshot.lines, &path.display().to_string(), filters)
}

// ============================================================================
// SECTION: Artifact Files
// ============================================================================

/// Writes an artifact as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] when the file cannot be written.
pub fn write_json_artifact<T: Serialize>(path: &Path, value: &T) -> Result<(), ReplayError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| ReplayError::Io(format!("{}: {err}", parent.display())))?;
    }
    let mut body =
        serde_json::to_vec_pretty(value).map_err(|err| ReplayError::Schema(err.to_string()))?;
    body.push(b'\n');
    fs::write(path, body).map_err(|err| ReplayError::Io(format!("{}: {err}", path.display())))
}

/// Reads a JSON artifact with a size limit.
///
/// # Errors
///
/// Returns [`ReplayError`] when the file is unreadable, too large, or does
/// not match `T`.
pub fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ReplayError> {
    let file =
        fs::File::open(path).map_err(|err| ReplayError::Io(format!("{}: {err}", path.display())))?;
    let mut bytes = Vec::new();
    file.take(MAX_ARTIFACT_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|err| ReplayError::Io(format!("{}: {err}", path.display())))?;
    if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_ARTIFACT_BYTES {
        return Err(ReplayError::Schema(format!("{}: file exceeds size limit", path.display())));
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| ReplayError::Schema(format!("{}: {err}", path.display())))
}

/// Writes a compiled plan.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] when the file cannot be written.
pub fn write_plan(path: &Path, plan: &ReplayPlan) -> Result<(), ReplayError> {
    write_json_artifact(path, plan)
}

/// Loads a plan and checks its schema version.
///
/// # Errors
///
/// Returns [`ReplayError`] when the plan is unreadable or has an
/// unsupported schema version.
pub fn load_plan(path: &Path) -> Result<ReplayPlan, ReplayError> {
    let plan: ReplayPlan = read_json_artifact(path)?;
    if plan.schema_version != PLAN_SCHEMA_VERSION {
        return Err(ReplayError::Schema(format!(
            "unsupported plan schema_version '{}'",
            plan.schema_version
        )));
    }
    Ok(plan)
}
