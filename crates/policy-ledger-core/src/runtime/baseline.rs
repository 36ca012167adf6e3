// crates/policy-ledger-core/src/runtime/baseline.rs
// ============================================================================
// Module: Baseline Manager
// Description: Snapshots replay reports and attributes later differences.
// Purpose: Separate allowlist changes from implementation regressions.
// Dependencies: crate::core::replay
// ============================================================================

//! ## Overview
//! A baseline pins one outcome per URI (the last observation wins). Checking
//! a newer report lists added, removed, and changed URIs and attributes the
//! difference: a changed allowlist is `POLICY_CHANGED`, any other difference
//! is `IMPLEMENTATION_CHANGED`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::replay::Attribution;
use crate::core::replay::BASELINE_SCHEMA_VERSION;
use crate::core::replay::Baseline;
use crate::core::replay::BaselineChange;
use crate::core::replay::BaselineCheck;
use crate::core::replay::BaselineStep;
use crate::core::replay::ChangeKind;
use crate::core::replay::ReplayReport;

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// Collapses report steps to one outcome per URI, sorted by URI.
fn steps_by_uri(report: &ReplayReport) -> BTreeMap<String, BaselineStep> {
    report
        .steps
        .iter()
        .map(|step| {
            (step.uri.clone(), BaselineStep {
                uri: step.uri.clone(),
                decision: step.observed.decision,
                error_code: step.observed.error_code.clone(),
            })
        })
        .collect()
}

impl Baseline {
    /// Snapshots a replay report.
    #[must_use]
    pub fn from_report(report: &ReplayReport) -> Self {
        Self {
            schema_version: BASELINE_SCHEMA_VERSION.to_string(),
            roots_hash: report.live_roots_hash.clone(),
            allowed_roots: report.live_allowed_roots.clone(),
            steps: steps_by_uri(report).into_values().collect(),
        }
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Compares a report against a baseline.
#[must_use]
pub fn check_baseline(baseline: &Baseline, report: &ReplayReport) -> BaselineCheck {
    let before: BTreeMap<&str, &BaselineStep> =
        baseline.steps.iter().map(|step| (step.uri.as_str(), step)).collect();
    let after = steps_by_uri(report);
    let mut changes = Vec::new();
    for (uri, old) in &before {
        match after.get(*uri) {
            None => changes.push(BaselineChange {
                kind: ChangeKind::Removed,
                uri: (*uri).to_string(),
                before: Some((*old).clone()),
                after: None,
            }),
            Some(new) if new != *old => changes.push(BaselineChange {
                kind: ChangeKind::Changed,
                uri: (*uri).to_string(),
                before: Some((*old).clone()),
                after: Some(new.clone()),
            }),
            Some(_) => {}
        }
    }
    for (uri, new) in &after {
        if !before.contains_key(uri.as_str()) {
            changes.push(BaselineChange {
                kind: ChangeKind::Added,
                uri: uri.clone(),
                before: None,
                after: Some(new.clone()),
            });
        }
    }
    changes.sort_by(|left, right| left.uri.cmp(&right.uri));

    let policy_changed = baseline.roots_hash != report.live_roots_hash
        || baseline.allowed_roots != report.live_allowed_roots;
    let attribution = if policy_changed {
        Attribution::PolicyChanged
    } else if changes.is_empty() {
        Attribution::NoChange
    } else {
        Attribution::ImplementationChanged
    };
    BaselineCheck {
        attribution,
        changes,
    }
}
