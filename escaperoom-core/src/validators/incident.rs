//! Incident-response validator for the outage-simulation mission.

use serde::{Deserialize, Serialize};

use crate::constants::{
    INCIDENT_EXECUTION_FLOOR, INCIDENT_EXECUTION_TIERS, INCIDENT_RESOLVE_WEIGHT,
    INCIDENT_RESPONSE_FLOOR, INCIDENT_RESPONSE_TIERS,
};
use crate::missions::IncidentSpec;

use super::{ValidationDetail, ValidationInputError, ValidationResult, clamp_score};

/// Outcome of the player's run through the outage scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSubmission {
    /// Id of the chosen recovery strategy.
    pub strategy: String,
    /// Time from incident start to choosing a strategy.
    pub response_time_ms: u64,
    /// Time spent executing the chosen strategy.
    pub execution_time_ms: u64,
    /// Incidents the player brought back to healthy.
    pub resolved: u32,
}

fn tiered(elapsed_ms: u64, tiers: &[(u64, i32)], floor: i32) -> i32 {
    tiers
        .iter()
        .find(|(limit, _)| elapsed_ms <= *limit)
        .map_or(floor, |(_, points)| *points)
}

pub(super) fn validate(
    submission: &IncidentSubmission,
    spec: &IncidentSpec,
) -> Result<ValidationResult, ValidationInputError> {
    let strategy = spec
        .strategy(&submission.strategy)
        .ok_or_else(|| ValidationInputError::UnknownStrategy(submission.strategy.clone()))?;

    let response_points = tiered(
        submission.response_time_ms,
        &INCIDENT_RESPONSE_TIERS,
        INCIDENT_RESPONSE_FLOOR,
    );
    let execution_points = tiered(
        submission.execution_time_ms,
        &INCIDENT_EXECUTION_TIERS,
        INCIDENT_EXECUTION_FLOOR,
    );
    let strategy_points = strategy.risk.points();

    let resolved = submission.resolved.min(spec.incident_count);
    let resolve_points = if spec.incident_count == 0 {
        INCIDENT_RESOLVE_WEIGHT
    } else {
        INCIDENT_RESOLVE_WEIGHT * resolved as f32 / spec.incident_count as f32
    };

    let raw = response_points + strategy_points + execution_points + resolve_points.round() as i32;
    let score = clamp_score(raw);

    let mut feedback = vec![
        format!(
            "Responded in {}s, executed `{}` in {}s",
            submission.response_time_ms / 1_000,
            strategy.id,
            submission.execution_time_ms / 1_000
        ),
        format!("Resolved {resolved} of {} incidents", spec.incident_count),
    ];
    match strategy.risk {
        crate::missions::RiskTier::Low => {
            feedback.push(format!("`{}` was a safe call", strategy.id));
        }
        crate::missions::RiskTier::Medium => {
            feedback.push(format!("`{}` carried moderate risk", strategy.id));
        }
        crate::missions::RiskTier::High => {
            feedback.push(format!("`{}` is a risky move on production", strategy.id));
        }
    }
    if resolved < spec.incident_count {
        feedback.push("Some incidents are still burning".to_string());
    }

    Ok(ValidationResult {
        score,
        success: score >= spec.pass_threshold,
        feedback,
        detail: ValidationDetail::IncidentResponse {
            response_points,
            strategy_points,
            execution_points,
            resolved,
            incident_count: spec.incident_count,
        },
    })
}
