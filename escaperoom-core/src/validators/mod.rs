//! Mission validators.
//!
//! One pure function per mission kind. Validators never touch global
//! state and are deterministic for identical inputs; getting the puzzle
//! wrong is a normal `success: false` result, never an error. Errors are
//! reserved for malformed submissions (spec/submission mismatch, dangling
//! references), which must never coerce into a passing score.

mod buildmetrics;
mod deploy;
mod incident;
mod jobgraph;
mod logscan;
mod ordered;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::DifficultySettings;
use crate::missions::ValidationSpec;

pub use buildmetrics::BuildMetricsSubmission;
pub use deploy::DeployConfig;
pub use incident::IncidentSubmission;
pub use jobgraph::{JobGraphSubmission, JobSubmission};
pub use logscan::LogErrorsSubmission;
pub use ordered::{OrderedBlocksSubmission, classify_instruction};

/// A player's submitted arrangement for one mission, one variant per
/// mission kind. The pairing with [`ValidationSpec`] is checked by
/// [`validate`]; a mismatch is an input error, never a silent coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Submission {
    OrderedBlocks(OrderedBlocksSubmission),
    BuildMetrics(BuildMetricsSubmission),
    JobGraph(JobGraphSubmission),
    LogErrors(LogErrorsSubmission),
    ConfigFields(DeployConfig),
    IncidentResponse(IncidentSubmission),
}

impl Submission {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Submission::OrderedBlocks(_) => "ordered_blocks",
            Submission::BuildMetrics(_) => "build_metrics",
            Submission::JobGraph(_) => "job_graph",
            Submission::LogErrors(_) => "log_errors",
            Submission::ConfigFields(_) => "config_fields",
            Submission::IncidentResponse(_) => "incident_response",
        }
    }
}

/// Mission-specific diagnostics carried alongside the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationDetail {
    OrderedBlocks {
        correct: usize,
        total: usize,
        all_filled: bool,
        extras: usize,
    },
    BuildMetrics {
        manifest_before_code: bool,
        install_before_code: bool,
        build_time_s: u32,
        image_size_mb: u32,
    },
    JobGraph {
        missing_jobs: Vec<String>,
        dependency_ok: bool,
        unconfigured_jobs: Vec<String>,
    },
    LogErrors {
        fixed: usize,
        total: usize,
    },
    ConfigFields {
        invalid_fields: Vec<String>,
        bonus_points: i32,
    },
    IncidentResponse {
        response_points: i32,
        strategy_points: i32,
        execution_points: i32,
        resolved: u32,
        incident_count: u32,
    },
}

/// Outcome of scoring one submission. `success` is always the documented
/// predicate for the mission kind, never inferred from the score alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Clamped to 0..=100.
    pub score: u8,
    pub success: bool,
    /// Human-readable lines for the UI; non-empty whenever score < 100.
    pub feedback: Vec<String>,
    pub detail: ValidationDetail,
}

/// Malformed submission data reaching a validator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationInputError {
    #[error("submission kind `{got}` does not match mission spec `{expected}`")]
    SpecMismatch {
        expected: &'static str,
        got: &'static str,
    },
    #[error("unknown optimization id `{0}`")]
    UnknownOptimization(String),
    #[error("job `{job}` depends on undeclared job `{needs}`")]
    UnknownJobReference { job: String, needs: String },
    #[error("duplicate job name `{0}`")]
    DuplicateJob(String),
    #[error("log line index {0} is out of range")]
    LineOutOfRange(usize),
    #[error("unknown recovery strategy `{0}`")]
    UnknownStrategy(String),
}

/// Score a submission against a mission spec. Dispatch is by the
/// (submission, spec) variant pair; mismatched pairs are rejected.
///
/// # Errors
///
/// Returns [`ValidationInputError`] when the submission shape does not
/// match the spec or references data the spec does not define.
pub fn validate(
    submission: &Submission,
    spec: &ValidationSpec,
    settings: &DifficultySettings,
) -> Result<ValidationResult, ValidationInputError> {
    match (submission, spec) {
        (Submission::OrderedBlocks(sub), ValidationSpec::OrderedBlocks(spec)) => {
            Ok(ordered::validate(sub, spec))
        }
        (Submission::BuildMetrics(sub), ValidationSpec::BuildMetrics(spec)) => {
            buildmetrics::validate(sub, spec, settings)
        }
        (Submission::JobGraph(sub), ValidationSpec::JobGraph(spec)) => {
            jobgraph::validate(sub, spec)
        }
        (Submission::LogErrors(sub), ValidationSpec::LogErrors(spec)) => {
            logscan::validate(sub, spec)
        }
        (Submission::ConfigFields(sub), ValidationSpec::ConfigFields(spec)) => {
            Ok(deploy::validate(sub, spec))
        }
        (Submission::IncidentResponse(sub), ValidationSpec::IncidentResponse(spec)) => {
            incident::validate(sub, spec)
        }
        (sub, spec) => Err(ValidationInputError::SpecMismatch {
            expected: spec.kind(),
            got: sub.kind(),
        }),
    }
}

/// Clamp a raw point total into the 0..=100 score range.
pub(crate) fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}
