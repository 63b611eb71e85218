//! Cross-cutting validator contracts: clamped scores, deterministic
//! verdicts and non-empty feedback on anything short of a perfect run.

use std::collections::BTreeSet;

use escaperoom_core::{
    BlockCategory, BuildMetricsSubmission, DeployConfig, Difficulty, IncidentSubmission,
    JobGraphSubmission, JobSubmission, LogErrorsSubmission, OrderedBlocksSubmission, Submission,
    ValidationSpec, catalog, mission, validate,
};

/// The canonical correct Dockerfile arrangement for mission 1.
fn canonical_dockerfile() -> Vec<&'static str> {
    vec![
        "FROM node:20-alpine",
        "WORKDIR /app",
        "COPY package.json package-lock.json ./",
        "RUN npm ci",
        "COPY . .",
    ]
}

fn job(name: &str, needs: &[&str], configured: bool) -> JobSubmission {
    JobSubmission {
        name: name.to_string(),
        needs: needs.iter().map(ToString::to_string).collect(),
        configured,
        yaml: "runs-on: ubuntu-latest\nsteps:\n  - uses: actions/checkout@v4\n".to_string(),
    }
}

/// A spread of submissions per mission: perfect, partial and poor.
fn submissions_for(mission_id: u8) -> Vec<Submission> {
    match mission_id {
        1 => vec![
            Submission::OrderedBlocks(OrderedBlocksSubmission::from_instructions(
                canonical_dockerfile(),
            )),
            Submission::OrderedBlocks(OrderedBlocksSubmission {
                slots: vec![Some("CMD [\"npm\", \"start\"]".to_string()), None, None],
            }),
            Submission::OrderedBlocks(OrderedBlocksSubmission::default()),
        ],
        2 => vec![
            Submission::BuildMetrics(BuildMetricsSubmission {
                blocks: canonical_dockerfile().iter().map(ToString::to_string).collect(),
                applied_optimizations: vec![
                    "slim-base".to_string(),
                    "multi-stage".to_string(),
                    "dockerignore".to_string(),
                    "combine-run".to_string(),
                ],
            }),
            Submission::BuildMetrics(BuildMetricsSubmission {
                blocks: vec!["COPY . .".to_string(), "RUN npm install".to_string()],
                applied_optimizations: vec![],
            }),
            Submission::BuildMetrics(BuildMetricsSubmission::default()),
        ],
        3 => vec![
            Submission::JobGraph(JobGraphSubmission {
                jobs: vec![
                    job("lint", &[], true),
                    job("test", &["lint"], true),
                    job("build", &["test"], true),
                    job("deploy", &["build"], true),
                ],
            }),
            Submission::JobGraph(JobGraphSubmission {
                jobs: vec![job("test", &[], false), job("build", &[], false)],
            }),
            Submission::JobGraph(JobGraphSubmission::default()),
        ],
        4 => {
            let ValidationSpec::LogErrors(spec) = &mission(4).unwrap().validation else {
                panic!("mission 4 must be the log mission");
            };
            let canonical: BTreeSet<usize> = spec.canonical_errors().into_iter().collect();
            vec![
                Submission::LogErrors(LogErrorsSubmission {
                    found: canonical.clone(),
                    fixed: canonical.clone(),
                }),
                Submission::LogErrors(LogErrorsSubmission {
                    found: canonical.clone(),
                    fixed: canonical.into_iter().take(1).collect(),
                }),
                Submission::LogErrors(LogErrorsSubmission::default()),
            ]
        }
        5 => vec![
            Submission::ConfigFields(DeployConfig {
                name: "web-api".to_string(),
                image: "web-api:2.0".to_string(),
                port: 8080,
                environment: "staging".to_string(),
                replicas: 2,
                health_check: true,
                secret_env: true,
            }),
            Submission::ConfigFields(DeployConfig {
                name: "Web API!".to_string(),
                image: "web-api".to_string(),
                port: 0,
                environment: "prod".to_string(),
                replicas: 0,
                health_check: false,
                secret_env: false,
            }),
            Submission::ConfigFields(DeployConfig::default()),
        ],
        6 => vec![
            Submission::IncidentResponse(IncidentSubmission {
                strategy: "rollback".to_string(),
                response_time_ms: 15_000,
                execution_time_ms: 40_000,
                resolved: 3,
            }),
            Submission::IncidentResponse(IncidentSubmission {
                strategy: "debug-live".to_string(),
                response_time_ms: 500_000,
                execution_time_ms: 400_000,
                resolved: 0,
            }),
            Submission::IncidentResponse(IncidentSubmission {
                strategy: "restart".to_string(),
                response_time_ms: 90_000,
                execution_time_ms: 90_000,
                resolved: 2,
            }),
        ],
        _ => panic!("unknown mission {mission_id}"),
    }
}

#[test]
fn scores_clamp_and_verdicts_are_deterministic() {
    for difficulty in [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ] {
        let settings = difficulty.settings();
        for def in catalog() {
            for submission in submissions_for(def.id) {
                let first = validate(&submission, &def.validation, settings)
                    .unwrap_or_else(|e| panic!("mission {}: {e}", def.id));
                let second = validate(&submission, &def.validation, settings).unwrap();
                assert_eq!(first, second, "mission {} must be deterministic", def.id);
                assert!(first.score <= 100);
                if first.score < 100 {
                    assert!(
                        !first.feedback.is_empty(),
                        "mission {} must explain a non-perfect score",
                        def.id
                    );
                }
            }
        }
    }
}

#[test]
fn canonical_dockerfile_order_is_perfect() {
    let def = mission(1).unwrap();
    let submission = Submission::OrderedBlocks(OrderedBlocksSubmission::from_instructions(
        canonical_dockerfile(),
    ));
    let result = validate(
        &submission,
        &def.validation,
        Difficulty::Beginner.settings(),
    )
    .unwrap();
    assert!(result.success);
    assert_eq!(result.score, 100);
}

#[test]
fn swapping_the_first_two_steps_fails() {
    let def = mission(1).unwrap();
    let mut blocks = canonical_dockerfile();
    blocks.swap(0, 1);
    let submission =
        Submission::OrderedBlocks(OrderedBlocksSubmission::from_instructions(blocks));
    let result = validate(
        &submission,
        &def.validation,
        Difficulty::Beginner.settings(),
    )
    .unwrap();
    assert!(!result.success);
    let escaperoom_core::ValidationDetail::OrderedBlocks { correct, total, .. } = result.detail
    else {
        panic!("wrong detail variant");
    };
    assert!(correct < total);
}

#[test]
fn copy_variants_classify_to_the_same_category() {
    use escaperoom_core::validators::classify_instruction;
    assert_eq!(
        classify_instruction("COPY . ."),
        classify_instruction("COPY .")
    );
    assert_eq!(
        classify_instruction("COPY . ."),
        BlockCategory::CopySource
    );
}
