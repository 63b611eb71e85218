//! Log-error validator for the log-analysis mission.
//!
//! The canonical error set comes from the spec's needle search over the
//! fixed log lines; the player marks lines as found and fixed by index.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{LOG_FIXED_WEIGHT, LOG_VISIBLE_WEIGHT};
use crate::missions::LogErrorsSpec;

use super::{ValidationDetail, ValidationInputError, ValidationResult, clamp_score};

/// Line indices the player flagged. Marks on non-error lines are ignored
/// for scoring; out-of-range indices are malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogErrorsSubmission {
    pub found: BTreeSet<usize>,
    pub fixed: BTreeSet<usize>,
}

pub(super) fn validate(
    submission: &LogErrorsSubmission,
    spec: &LogErrorsSpec,
) -> Result<ValidationResult, ValidationInputError> {
    for idx in submission.found.iter().chain(submission.fixed.iter()) {
        if *idx >= spec.log_lines.len() {
            return Err(ValidationInputError::LineOutOfRange(*idx));
        }
    }

    let canonical: BTreeSet<usize> = spec.canonical_errors().into_iter().collect();
    let total = canonical.len();
    let fixed = canonical.intersection(&submission.fixed).count();

    if total == 0 {
        // A log with no errors is a trivially solved scenario.
        return Ok(ValidationResult {
            score: 100,
            success: true,
            feedback: vec!["No errors present in this log".to_string()],
            detail: ValidationDetail::LogErrors { fixed: 0, total: 0 },
        });
    }

    // All errors are visible in the log panel, so the visibility weight is
    // granted outright; the real work is fixing them.
    let raw = LOG_VISIBLE_WEIGHT
        + (LOG_FIXED_WEIGHT * fixed as f32 / total as f32).round() as i32;

    let mut feedback = vec![format!("Fixed {fixed} of {total} errors")];
    for idx in canonical.difference(&submission.fixed) {
        feedback.push(format!("Line {}: still broken", idx + 1));
    }
    let stray = submission.fixed.difference(&canonical).count();
    if stray > 0 {
        feedback.push(format!("{stray} fixed line(s) were not actual errors"));
    }

    Ok(ValidationResult {
        score: clamp_score(raw),
        success: fixed == total,
        feedback,
        detail: ValidationDetail::LogErrors { fixed, total },
    })
}
