//! Build-metric validator for the layer-caching mission.
//!
//! The build is simulated, not run: applied optimizations subtract fixed
//! deltas from the base metrics, clamped at realistic floors so no toggle
//! combination can produce a 0-second build.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BUILD_CHECK_POINTS, BUILD_OPT_BONUS, BUILD_SIZE_FLOOR_MB, BUILD_TIME_FLOOR_S,
};
use crate::difficulty::DifficultySettings;
use crate::missions::{BlockCategory, BuildMetricsSpec};

use super::{
    ValidationDetail, ValidationInputError, ValidationResult, clamp_score, classify_instruction,
};

/// Instruction ordering plus the set of optimization toggles the player
/// switched on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetricsSubmission {
    /// Raw instruction strings in the order the player arranged them.
    pub blocks: Vec<String>,
    /// Ids of applied optimizations, resolved against the spec table.
    pub applied_optimizations: Vec<String>,
}

pub(super) fn validate(
    submission: &BuildMetricsSubmission,
    spec: &BuildMetricsSpec,
    settings: &DifficultySettings,
) -> Result<ValidationResult, ValidationInputError> {
    let categories: Vec<BlockCategory> = submission
        .blocks
        .iter()
        .map(|raw| classify_instruction(raw))
        .collect();
    let position = |cat: BlockCategory| categories.iter().position(|c| *c == cat);

    let manifest_pos = position(BlockCategory::CopyManifest);
    let install_pos = position(BlockCategory::InstallDeps);
    let source_pos = position(BlockCategory::CopySource);

    let manifest_before_code = matches!((manifest_pos, source_pos), (Some(m), Some(s)) if m < s);
    let install_before_code = matches!((install_pos, source_pos), (Some(i), Some(s)) if i < s);

    let mut time_saved = 0u32;
    let mut size_saved = 0u32;
    for id in &submission.applied_optimizations {
        let opt = spec
            .optimization(id)
            .ok_or_else(|| ValidationInputError::UnknownOptimization(id.clone()))?;
        time_saved += opt.time_saved_s;
        size_saved += opt.size_saved_mb;
    }
    let build_time_s = spec.base_time_s.saturating_sub(time_saved).max(BUILD_TIME_FLOOR_S);
    let image_size_mb = spec
        .base_size_mb
        .saturating_sub(size_saved)
        .max(BUILD_SIZE_FLOOR_MB);

    let time_ok = build_time_s <= settings.build_time_target_s;
    let size_ok = image_size_mb <= settings.image_size_target_mb;

    let opt_count = i32::try_from(submission.applied_optimizations.len()).unwrap_or(i32::MAX);
    let raw_score = i32::from(manifest_before_code) * BUILD_CHECK_POINTS
        + i32::from(install_before_code) * BUILD_CHECK_POINTS
        + opt_count.saturating_mul(BUILD_OPT_BONUS);

    let mut feedback = Vec::new();
    feedback.push(if manifest_before_code {
        "Dependency manifest is copied before the app code".to_string()
    } else {
        "Copy the dependency manifest before the app code to reuse cached layers".to_string()
    });
    feedback.push(if install_before_code {
        "Dependencies install before the app code changes the layer".to_string()
    } else {
        "Install dependencies before copying the app code".to_string()
    });
    feedback.push(format!(
        "Simulated build: {build_time_s}s (target {}s), image {image_size_mb}MB (target {}MB)",
        settings.build_time_target_s, settings.image_size_target_mb
    ));
    if !time_ok {
        feedback.push("Build time is still above the target".to_string());
    }
    if !size_ok {
        feedback.push("Image size is still above the target".to_string());
    }

    Ok(ValidationResult {
        score: clamp_score(raw_score),
        success: manifest_before_code && install_before_code && time_ok && size_ok,
        feedback,
        detail: ValidationDetail::BuildMetrics {
            manifest_before_code,
            install_before_code,
            build_time_s,
            image_size_mb,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::missions::{ValidationSpec, mission};

    fn spec() -> &'static BuildMetricsSpec {
        match &mission(2).expect("mission 2 exists").validation {
            ValidationSpec::BuildMetrics(spec) => spec,
            other => panic!("mission 2 must be build metrics, got {}", other.kind()),
        }
    }

    fn good_blocks() -> Vec<String> {
        [
            "FROM node:20-slim",
            "WORKDIR /app",
            "COPY package.json ./",
            "RUN npm ci",
            "COPY . .",
        ]
        .iter()
        .map(ToString::to_string)
        .collect()
    }

    #[test]
    fn all_optimizations_meet_advanced_targets() {
        let submission = BuildMetricsSubmission {
            blocks: good_blocks(),
            applied_optimizations: spec()
                .optimizations
                .iter()
                .map(|o| o.id.clone())
                .collect(),
        };
        let result =
            validate(&submission, spec(), Difficulty::Advanced.settings()).expect("valid input");
        let ValidationDetail::BuildMetrics {
            build_time_s,
            image_size_mb,
            ..
        } = result.detail
        else {
            panic!("wrong detail variant");
        };
        // 120 - 90 = 30s, 1200 - 1000 = 200MB; floors not reached here
        assert_eq!(build_time_s, 30);
        assert_eq!(image_size_mb, 200);
        assert!(result.success, "advanced targets are 30s/400MB: {result:?}");
    }

    #[test]
    fn unknown_optimization_is_an_input_error() {
        let submission = BuildMetricsSubmission {
            blocks: good_blocks(),
            applied_optimizations: vec!["warp-drive".to_string()],
        };
        let err = validate(&submission, spec(), Difficulty::Beginner.settings())
            .expect_err("unknown id must be rejected");
        assert_eq!(
            err,
            ValidationInputError::UnknownOptimization("warp-drive".to_string())
        );
    }

    #[test]
    fn bad_ordering_fails_even_with_fast_build() {
        let submission = BuildMetricsSubmission {
            blocks: vec![
                "FROM node:20-slim".to_string(),
                "COPY . .".to_string(),
                "COPY package.json ./".to_string(),
                "RUN npm ci".to_string(),
            ],
            applied_optimizations: spec()
                .optimizations
                .iter()
                .map(|o| o.id.clone())
                .collect(),
        };
        let result =
            validate(&submission, spec(), Difficulty::Beginner.settings()).expect("valid input");
        assert!(!result.success);
        assert!(result.feedback.iter().any(|l| l.contains("manifest")));
    }
}
