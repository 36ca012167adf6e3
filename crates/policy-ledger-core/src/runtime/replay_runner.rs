// crates/policy-ledger-core/src/runtime/replay_runner.rs
// ============================================================================
// Module: Replay Runner
// Description: Executes replay plans against a live target.
// Purpose: Detect drift and mismatches between recorded and live decisions.
// Dependencies: serde_json, crate::{core::replay, interfaces}
// ============================================================================

//! ## Overview
//! Steps run in plan order through a [`ReplayTarget`]. A step mismatches
//! when the decision differs or, for DENY, when the expected code differs.
//! The report is `drift` whenever the live roots hash differs from the
//! plan's, even if every step matched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::decision::Decision;
use crate::core::replay::ObservedOutcome;
use crate::core::replay::REPORT_SCHEMA_VERSION;
use crate::core::replay::ReplayPlan;
use crate::core::replay::ReplayReport;
use crate::core::replay::ReplayStats;
use crate::core::replay::ReplayStatus;
use crate::core::replay::StepExpectation;
use crate::core::replay::StepResult;
use crate::interfaces::ReplayTarget;
use crate::interfaces::TargetError;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies a resource body as observed by a client.
///
/// A JSON object with `ok: false` is a DENY carrying `error.code`; any other
/// body is an ALLOW.
#[must_use]
pub fn classify_body(text: &str) -> ObservedOutcome {
    let Ok(Value::Object(body)) = serde_json::from_str::<Value>(text) else {
        return ObservedOutcome {
            decision: Decision::Allow,
            error_code: None,
        };
    };
    if body.get("ok").and_then(Value::as_bool) == Some(false) {
        let error_code = body
            .get("error")
            .and_then(|error| error.get("code"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return ObservedOutcome {
            decision: Decision::Deny,
            error_code,
        };
    }
    ObservedOutcome {
        decision: Decision::Allow,
        error_code: None,
    }
}

/// Returns true when an observation disagrees with an expectation.
#[must_use]
pub fn is_mismatch(expect: &StepExpectation, observed: &ObservedOutcome) -> bool {
    if expect.decision != observed.decision {
        return true;
    }
    match (&expect.decision, &expect.error_code) {
        (Decision::Deny, Some(code)) => observed.error_code.as_deref() != Some(code.as_str()),
        _ => false,
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs every step of a plan against a target.
///
/// # Errors
///
/// Returns [`TargetError`] when the target cannot serve a step at all.
pub fn run_replay(
    plan: &ReplayPlan,
    target: &dyn ReplayTarget,
) -> Result<ReplayReport, TargetError> {
    let live = target.live_policy();
    let mut stats = ReplayStats::default();
    let mut steps = Vec::with_capacity(plan.steps.len());
    for (index, step) in plan.steps.iter().enumerate() {
        let observed = target.observe(&step.uri)?;
        let mismatch = is_mismatch(&step.expect, &observed);
        stats.total += 1;
        match observed.decision {
            Decision::Allow => stats.allow += 1,
            Decision::Deny => stats.deny += 1,
        }
        if mismatch {
            stats.mismatch += 1;
        }
        steps.push(StepResult {
            index,
            uri: step.uri.clone(),
            expect: step.expect.clone(),
            observed,
            mismatch,
        });
    }
    let drift = plan.roots_hash.as_deref().is_some_and(|hash| hash != live.roots_hash());
    let status = if drift {
        ReplayStatus::Drift
    } else if stats.mismatch > 0 {
        ReplayStatus::Mismatch
    } else {
        ReplayStatus::Pass
    };
    Ok(ReplayReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        status,
        plan_roots_hash: plan.roots_hash.clone(),
        live_roots_hash: live.roots_hash().to_string(),
        live_allowed_roots: live.allowed_roots().to_vec(),
        steps,
        stats,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
