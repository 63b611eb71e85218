//! Config-field validator for the deployment-configuration mission.
//!
//! Success is threshold-based: a config scoring at or above the spec's
//! threshold passes even if a non-essential field is off.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_FIELD_POINTS, CONFIG_HEALTH_BONUS, CONFIG_MAX_PORT, CONFIG_REPLICA_BONUS,
    CONFIG_SECRET_BONUS,
};
use crate::missions::ConfigFieldsSpec;

use super::{ValidationDetail, ValidationResult, clamp_score};

/// Structured deployment config as assembled in the UI form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    /// Service name; lowercase alphanumerics and dashes.
    pub name: String,
    /// Image reference; must carry an explicit tag.
    pub image: String,
    pub port: u32,
    pub environment: String,
    pub replicas: u32,
    #[serde(default)]
    pub health_check: bool,
    /// Secrets injected as environment variables rather than baked in.
    #[serde(default)]
    pub secret_env: bool,
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

fn valid_image(image: &str) -> bool {
    match image.rsplit_once(':') {
        Some((repo, tag)) => !repo.is_empty() && !tag.is_empty() && !tag.contains('/'),
        None => false,
    }
}

pub(super) fn validate(config: &DeployConfig, spec: &ConfigFieldsSpec) -> ValidationResult {
    let mut invalid_fields = Vec::new();
    let mut feedback = Vec::new();
    let mut raw = 0i32;

    let mut check = |ok: bool, field: &str, hint: &str| {
        if ok {
            raw += CONFIG_FIELD_POINTS;
        } else {
            invalid_fields.push(field.to_string());
            feedback.push(hint.to_string());
        }
    };

    check(
        valid_name(&config.name),
        "name",
        "Service name must be lowercase alphanumerics and dashes",
    );
    check(
        valid_image(&config.image),
        "image",
        "Image reference needs an explicit tag (e.g. web-api:1.4.2)",
    );
    check(
        config.port >= 1 && config.port <= CONFIG_MAX_PORT,
        "port",
        "Port must be between 1 and 65535",
    );
    check(
        spec.allowed_environments
            .iter()
            .any(|e| e == &config.environment),
        "environment",
        "Environment must be one of development, staging or production",
    );
    check(
        config.replicas >= spec.min_replicas,
        "replicas",
        "At least one replica is required",
    );

    // Best-practice bonuses
    let mut bonus_points = 0i32;
    if config.replicas >= 2 {
        bonus_points += CONFIG_REPLICA_BONUS;
        feedback.push("Bonus: multiple replicas keep the service available".to_string());
    }
    if config.health_check {
        bonus_points += CONFIG_HEALTH_BONUS;
        feedback.push("Bonus: health check enabled".to_string());
    }
    if config.secret_env {
        bonus_points += CONFIG_SECRET_BONUS;
        feedback.push("Bonus: secrets injected via environment".to_string());
    }
    raw += bonus_points;

    let score = clamp_score(raw);
    if feedback.is_empty() {
        feedback.push("Config is valid but misses every best practice".to_string());
    }

    ValidationResult {
        score,
        success: score >= spec.pass_threshold,
        feedback,
        detail: ValidationDetail::ConfigFields {
            invalid_fields,
            bonus_points,
        },
    }
}
