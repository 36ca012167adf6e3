// crates/policy-ledger-core/src/core/replay.rs
// ============================================================================
// Module: Replay Artifacts
// Description: Replay plans, replay reports, and policy baselines.
// Purpose: Define the derived regression artifacts produced from decision history.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ReplayPlan`] is compiled from the decision log and never authored by
//! hand. Running a plan against a live server yields a [`ReplayReport`]; a
//! [`Baseline`] pins a report so later runs can be attributed to a policy
//! change or an implementation change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::decision::Decision;
use crate::core::decision::DecisionRecord;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schema version of compiled replay plans.
pub const PLAN_SCHEMA_VERSION: &str = "policy-ledger.plan.v1";
/// Schema version of replay reports.
pub const REPORT_SCHEMA_VERSION: &str = "policy-ledger.replay-report.v1";
/// Schema version of baselines.
pub const BASELINE_SCHEMA_VERSION: &str = "policy-ledger.baseline.v1";
/// Source kind recorded for plans compiled from a decision log.
pub const DECISION_LOG_SOURCE: &str = "decision_log";

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Step de-duplication mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupeMode {
    /// One step per recorded decision.
    #[default]
    None,
    /// Keep the last occurrence of each URI, in order of last appearance.
    UriKeepLast,
}

impl DedupeMode {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::UriKeepLast => "uri-keep-last",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "uri-keep-last" => Some(Self::UriKeepLast),
            _ => None,
        }
    }
}

impl fmt::Display for DedupeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler filters, applied in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanFilters {
    /// Keep only rows pinned to this roots hash.
    #[serde(default)]
    pub roots_hash: Option<String>,
    /// Keep only the last `n` rows.
    #[serde(default)]
    pub last_n: Option<usize>,
    /// De-duplication mode.
    #[serde(default)]
    pub dedupe: DedupeMode,
}

/// Provenance of a compiled plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSource {
    /// Source kind.
    pub kind: String,
    /// Source path as given to the compiler.
    pub path: String,
    /// Filters used.
    pub filters: PlanFilters,
}

/// Expected outcome of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExpectation {
    /// Expected decision.
    pub decision: Decision,
    /// Expected error code; present only for DENY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl StepExpectation {
    /// Builds an expectation, dropping the code unless the decision is DENY.
    #[must_use]
    pub fn new(decision: Decision, error_code: Option<String>) -> Self {
        let error_code = match decision {
            Decision::Deny => error_code,
            Decision::Allow => None,
        };
        Self {
            decision,
            error_code,
        }
    }
}

/// One replayable resource read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayStep {
    /// Resource URI to read.
    pub uri: String,
    /// Expected outcome.
    pub expect: StepExpectation,
}

/// Deterministic regression plan derived from decision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayPlan {
    /// Plan schema version.
    pub schema_version: String,
    /// Provenance.
    pub source: PlanSource,
    /// Roots hash the plan is pinned to.
    #[serde(default)]
    pub roots_hash: Option<String>,
    /// Allowed roots of the latest retained record.
    #[serde(default)]
    pub allowed_roots: Vec<String>,
    /// Ordered steps.
    pub steps: Vec<ReplayStep>,
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Overall replay status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStatus {
    /// Every step matched under the same roots hash.
    Pass,
    /// At least one step mismatched.
    Mismatch,
    /// The live roots hash differs from the plan's.
    Drift,
}

impl ReplayStatus {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Mismatch => "mismatch",
            Self::Drift => "drift",
        }
    }
}

/// Outcome observed when replaying a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedOutcome {
    /// Observed decision.
    pub decision: Decision,
    /// Observed error code for DENY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl From<&DecisionRecord> for ObservedOutcome {
    fn from(record: &DecisionRecord) -> Self {
        let error_code = match record.decision {
            Decision::Allow => None,
            Decision::Deny => Some(record.reason.code.clone()),
        };
        Self {
            decision: record.decision,
            error_code,
        }
    }
}

/// Result of one replayed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Step position in the plan.
    pub index: usize,
    /// Resource URI.
    pub uri: String,
    /// Expected outcome.
    pub expect: StepExpectation,
    /// Observed outcome.
    pub observed: ObservedOutcome,
    /// True when observed and expected disagree.
    pub mismatch: bool,
}

/// Aggregate counts for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplayStats {
    /// Steps replayed.
    pub total: usize,
    /// Steps observed as ALLOW.
    pub allow: usize,
    /// Steps observed as DENY.
    pub deny: usize,
    /// Steps that mismatched.
    pub mismatch: usize,
}

/// Result of replaying a plan against a live target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report schema version.
    pub schema_version: String,
    /// Overall status.
    pub status: ReplayStatus,
    /// Roots hash pinned by the plan.
    pub plan_roots_hash: Option<String>,
    /// Roots hash of the live policy.
    pub live_roots_hash: String,
    /// Allowed roots of the live policy.
    #[serde(default)]
    pub live_allowed_roots: Vec<String>,
    /// Per-step results.
    pub steps: Vec<StepResult>,
    /// Aggregate counts.
    pub stats: ReplayStats,
}

// ============================================================================
// SECTION: Baselines
// ============================================================================

/// Pinned outcome of one URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineStep {
    /// Resource URI.
    pub uri: String,
    /// Observed decision.
    pub decision: Decision,
    /// Observed error code for DENY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Snapshot of a replay report used for later comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Baseline schema version.
    pub schema_version: String,
    /// Live roots hash at snapshot time.
    pub roots_hash: String,
    /// Live allowed roots at snapshot time.
    pub allowed_roots: Vec<String>,
    /// Pinned steps, one per URI.
    pub steps: Vec<BaselineStep>,
}

/// Kind of baseline difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// URI appears only in the new report.
    Added,
    /// URI appears only in the baseline.
    Removed,
    /// URI outcome differs.
    Changed,
}

impl ChangeKind {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Removed => "REMOVED",
            Self::Changed => "CHANGED",
        }
    }
}

/// One baseline difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineChange {
    /// Difference kind.
    pub kind: ChangeKind,
    /// Resource URI.
    pub uri: String,
    /// Baseline outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<BaselineStep>,
    /// New outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<BaselineStep>,
}

/// Cause assigned to a set of baseline differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Attribution {
    /// Nothing changed.
    NoChange,
    /// The allowlist changed.
    PolicyChanged,
    /// Outcomes changed under the same allowlist.
    ImplementationChanged,
}

impl Attribution {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoChange => "NO_CHANGE",
            Self::PolicyChanged => "POLICY_CHANGED",
            Self::ImplementationChanged => "IMPLEMENTATION_CHANGED",
        }
    }
}

/// Comparison of a report against a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineCheck {
    /// Attributed cause.
    pub attribution: Attribution,
    /// Differences, sorted by URI.
    pub changes: Vec<BaselineChange>,
}

impl BaselineCheck {
    /// Returns true when the report matches the baseline.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.attribution == Attribution::NoChange
    }
}
