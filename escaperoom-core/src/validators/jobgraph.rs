//! Job-graph validator for the pipeline-assembly mission.
//!
//! Job names match case-insensitively. The build job must reach the test
//! job through the recorded dependency edges, not just directly.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constants::{
    JOB_DEPENDENCY_WEIGHT, JOB_MISSING_PENALTY, JOB_PRESENCE_WEIGHT, JOB_YAML_WEIGHT,
};
use crate::missions::JobGraphSpec;

use super::{ValidationDetail, ValidationInputError, ValidationResult, clamp_score};

/// One named CI job with its dependency edges and YAML body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSubmission {
    pub name: String,
    /// Names of jobs this one depends on.
    pub needs: Vec<String>,
    /// Whether the player marked the job as configured in the editor.
    pub configured: bool,
    /// Free-text YAML body, checked for required substrings.
    pub yaml: String,
}

/// The assembled pipeline: a set of jobs with dependency edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobGraphSubmission {
    pub jobs: Vec<JobSubmission>,
}

pub(super) fn validate(
    submission: &JobGraphSubmission,
    spec: &JobGraphSpec,
) -> Result<ValidationResult, ValidationInputError> {
    // Case-insensitive name index; duplicates and dangling edges are
    // malformed input, not a scoring matter.
    let mut by_name: BTreeMap<String, &JobSubmission> = BTreeMap::new();
    for job in &submission.jobs {
        let key = job.name.trim().to_lowercase();
        if by_name.insert(key, job).is_some() {
            return Err(ValidationInputError::DuplicateJob(job.name.clone()));
        }
    }
    for job in &submission.jobs {
        for needs in &job.needs {
            if !by_name.contains_key(&needs.trim().to_lowercase()) {
                return Err(ValidationInputError::UnknownJobReference {
                    job: job.name.clone(),
                    needs: needs.clone(),
                });
            }
        }
    }

    let required: Vec<String> = spec.required_jobs.iter().map(|j| j.to_lowercase()).collect();
    let missing_jobs: Vec<String> = spec
        .required_jobs
        .iter()
        .filter(|j| !by_name.contains_key(&j.to_lowercase()))
        .cloned()
        .collect();
    let present = required.len() - missing_jobs.len();
    let present_fraction = fraction(present, required.len());

    let test_key = spec.test_job.to_lowercase();
    let build_key = spec.build_job.to_lowercase();
    let test_has_dependent = submission.jobs.iter().any(|job| {
        job.needs
            .iter()
            .any(|needs| needs.trim().to_lowercase() == test_key)
    });
    let build_reaches_test = depends_transitively(&by_name, &build_key, &test_key);
    let dependency_ok = test_has_dependent && build_reaches_test;

    // YAML snippet score averages over all required jobs; a missing job
    // contributes zero to the fraction.
    let mut yaml_fraction = 0.0f32;
    if !required.is_empty() && !spec.required_snippets.is_empty() {
        let mut total = 0.0f32;
        for key in &required {
            if let Some(job) = by_name.get(key) {
                let hits = spec
                    .required_snippets
                    .iter()
                    .filter(|snippet| job.yaml.contains(snippet.as_str()))
                    .count();
                total += fraction(hits, spec.required_snippets.len());
            }
        }
        yaml_fraction = total / required.len() as f32;
    }

    let unconfigured_jobs: Vec<String> = submission
        .jobs
        .iter()
        .filter(|job| !job.configured)
        .map(|job| job.name.clone())
        .collect();

    let raw = JOB_PRESENCE_WEIGHT * present_fraction
        + JOB_DEPENDENCY_WEIGHT * f32::from(u8::from(dependency_ok))
        + JOB_YAML_WEIGHT * yaml_fraction
        - JOB_MISSING_PENALTY * missing_jobs.len() as f32;

    let mut feedback = Vec::new();
    for job in &missing_jobs {
        feedback.push(format!("Required job `{job}` is missing from the pipeline"));
    }
    if !test_has_dependent {
        feedback.push(format!(
            "Nothing depends on `{}`; downstream jobs should wait for tests",
            spec.test_job
        ));
    }
    if !build_reaches_test {
        feedback.push(format!(
            "`{}` must depend on `{}` (directly or through other jobs)",
            spec.build_job, spec.test_job
        ));
    }
    for job in &unconfigured_jobs {
        feedback.push(format!("Job `{job}` is not configured yet"));
    }
    if feedback.is_empty() && yaml_fraction < 1.0 {
        feedback.push("Some jobs are missing a runner, checkout step or steps section".to_string());
    }
    if feedback.is_empty() {
        feedback.push("Pipeline graph looks good".to_string());
    }

    let success = missing_jobs.is_empty() && dependency_ok && unconfigured_jobs.is_empty();

    Ok(ValidationResult {
        score: clamp_score(raw.round() as i32),
        success,
        feedback,
        detail: ValidationDetail::JobGraph {
            missing_jobs,
            dependency_ok,
            unconfigured_jobs,
        },
    })
}

fn fraction(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 / whole as f32
    }
}

/// Breadth-first walk of the `needs` edges from `from`, looking for `to`.
fn depends_transitively(
    by_name: &BTreeMap<String, &JobSubmission>,
    from: &str,
    to: &str,
) -> bool {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(from.to_string());
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(job) = by_name.get(&current) else {
            continue;
        };
        for needs in &job.needs {
            let key = needs.trim().to_lowercase();
            if key == to {
                return true;
            }
            queue.push_back(key);
        }
    }
    false
}
