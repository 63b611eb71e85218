//! Static mission catalog.
//!
//! Six missions, ids 1..=6, dense, loaded once at process start and never
//! mutated. Each carries the validation spec its validator scores against;
//! the validator is chosen by the spec variant, never by inspecting the
//! submission at runtime.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Number of missions in the catalog. `PlayerRecord::current_mission`
/// saturates here.
pub const MISSION_COUNT: u8 = 6;

/// Canonical category a raw Dockerfile instruction classifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockCategory {
    From,
    Workdir,
    CopyManifest,
    InstallDeps,
    CopySource,
    Expose,
    Cmd,
    Extra,
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BlockCategory::From => "FROM (base image)",
            BlockCategory::Workdir => "WORKDIR",
            BlockCategory::CopyManifest => "COPY (dependency manifest)",
            BlockCategory::InstallDeps => "RUN (install dependencies)",
            BlockCategory::CopySource => "COPY (application code)",
            BlockCategory::Expose => "EXPOSE",
            BlockCategory::Cmd => "CMD",
            BlockCategory::Extra => "unrecognized instruction",
        };
        write!(f, "{label}")
    }
}

/// Spec for the Dockerfile ordering mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedBlocksSpec {
    /// Required category at each graded slot, in order.
    pub required: Vec<BlockCategory>,
}

/// One toggleable optimization in the layer-caching mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationDef {
    pub id: String,
    pub label: String,
    /// Seconds shaved off the simulated build time when applied.
    pub time_saved_s: u32,
    /// Megabytes shaved off the simulated image size when applied.
    pub size_saved_mb: u32,
}

/// Spec for the layer-caching mission. Targets come from the difficulty
/// settings, not from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetricsSpec {
    pub base_time_s: u32,
    pub base_size_mb: u32,
    pub optimizations: Vec<OptimizationDef>,
}

impl BuildMetricsSpec {
    #[must_use]
    pub fn optimization(&self, id: &str) -> Option<&OptimizationDef> {
        self.optimizations.iter().find(|o| o.id == id)
    }
}

/// Spec for the pipeline-assembly mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobGraphSpec {
    /// Job names the pipeline must declare (matched case-insensitively).
    pub required_jobs: Vec<String>,
    /// Job that must have at least one dependent.
    pub test_job: String,
    /// Job that must depend (transitively) on `test_job`.
    pub build_job: String,
    /// Substrings each job's YAML body is scored for.
    pub required_snippets: Vec<String>,
}

/// Spec for the log-analysis mission. The canonical error set is derived
/// by substring search of the needles over the log lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogErrorsSpec {
    pub log_lines: Vec<String>,
    pub error_needles: Vec<String>,
}

impl LogErrorsSpec {
    /// Indices of log lines that contain any error needle
    /// (case-insensitive).
    #[must_use]
    pub fn canonical_errors(&self) -> Vec<usize> {
        self.log_lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                let lower = line.to_lowercase();
                self.error_needles
                    .iter()
                    .any(|needle| lower.contains(&needle.to_lowercase()))
            })
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Spec for the deployment-configuration mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFieldsSpec {
    /// Allowed values for the environment field.
    pub allowed_environments: Vec<String>,
    /// Minimum replica count for the field to be considered valid.
    pub min_replicas: u32,
    /// Score at or above which the submission passes.
    pub pass_threshold: u8,
}

/// Risk tier of an incident-recovery strategy. Lower risk scores higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub(crate) const fn points(self) -> i32 {
        match self {
            RiskTier::Low => 25,
            RiskTier::Medium => 15,
            RiskTier::High => 5,
        }
    }
}

/// One selectable recovery strategy in the outage mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDef {
    pub id: String,
    pub label: String,
    pub risk: RiskTier,
}

/// Spec for the outage-simulation mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentSpec {
    pub strategies: Vec<StrategyDef>,
    /// Incidents the scenario raises; the resolved fraction is scored
    /// against this.
    pub incident_count: u32,
    pub pass_threshold: u8,
}

impl IncidentSpec {
    #[must_use]
    pub fn strategy(&self, id: &str) -> Option<&StrategyDef> {
        self.strategies.iter().find(|s| s.id == id)
    }
}

/// Closed set of validation spec shapes, one variant per mission kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSpec {
    OrderedBlocks(OrderedBlocksSpec),
    BuildMetrics(BuildMetricsSpec),
    JobGraph(JobGraphSpec),
    LogErrors(LogErrorsSpec),
    ConfigFields(ConfigFieldsSpec),
    IncidentResponse(IncidentSpec),
}

impl ValidationSpec {
    /// Short kind label used in spec-mismatch diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            ValidationSpec::OrderedBlocks(_) => "ordered_blocks",
            ValidationSpec::BuildMetrics(_) => "build_metrics",
            ValidationSpec::JobGraph(_) => "job_graph",
            ValidationSpec::LogErrors(_) => "log_errors",
            ValidationSpec::ConfigFields(_) => "config_fields",
            ValidationSpec::IncidentResponse(_) => "incident_response",
        }
    }
}

/// Immutable definition of one mission, built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDefinition {
    /// 1-based, dense, defines unlock order.
    pub id: u8,
    pub title: String,
    /// One-line description of the DevOps concept being taught.
    pub concept: String,
    pub validation: ValidationSpec,
}

/// The full catalog, ids 1..=6 in order.
pub fn catalog() -> &'static [MissionDefinition] {
    static CATALOG: OnceLock<Vec<MissionDefinition>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// Look up a mission by id.
#[must_use]
pub fn mission(id: u8) -> Option<&'static MissionDefinition> {
    catalog().iter().find(|m| m.id == id)
}

fn build_catalog() -> Vec<MissionDefinition> {
    vec![
        MissionDefinition {
            id: 1,
            title: "Dockerfile Detective".to_string(),
            concept: "Order Dockerfile instructions for a working build".to_string(),
            validation: ValidationSpec::OrderedBlocks(OrderedBlocksSpec {
                required: vec![
                    BlockCategory::From,
                    BlockCategory::Workdir,
                    BlockCategory::CopyManifest,
                    BlockCategory::InstallDeps,
                    BlockCategory::CopySource,
                ],
            }),
        },
        MissionDefinition {
            id: 2,
            title: "Layer Cache Heist".to_string(),
            concept: "Exploit layer caching to cut build time and image size".to_string(),
            validation: ValidationSpec::BuildMetrics(BuildMetricsSpec {
                base_time_s: 120,
                base_size_mb: 1_200,
                optimizations: vec![
                    OptimizationDef {
                        id: "slim-base".to_string(),
                        label: "Use a slim base image".to_string(),
                        time_saved_s: 20,
                        size_saved_mb: 500,
                    },
                    OptimizationDef {
                        id: "dockerignore".to_string(),
                        label: "Add a .dockerignore".to_string(),
                        time_saved_s: 15,
                        size_saved_mb: 120,
                    },
                    OptimizationDef {
                        id: "multi-stage".to_string(),
                        label: "Multi-stage build".to_string(),
                        time_saved_s: 25,
                        size_saved_mb: 300,
                    },
                    OptimizationDef {
                        id: "combine-run".to_string(),
                        label: "Combine RUN layers".to_string(),
                        time_saved_s: 30,
                        size_saved_mb: 80,
                    },
                ],
            }),
        },
        MissionDefinition {
            id: 3,
            title: "Pipeline Plumber".to_string(),
            concept: "Wire CI jobs into a valid dependency graph".to_string(),
            validation: ValidationSpec::JobGraph(JobGraphSpec {
                required_jobs: vec![
                    "lint".to_string(),
                    "test".to_string(),
                    "build".to_string(),
                    "deploy".to_string(),
                ],
                test_job: "test".to_string(),
                build_job: "build".to_string(),
                required_snippets: vec![
                    "runs-on".to_string(),
                    "actions/checkout".to_string(),
                    "steps:".to_string(),
                ],
            }),
        },
        MissionDefinition {
            id: 4,
            title: "Log Sleuth".to_string(),
            concept: "Find and fix the errors hiding in the deploy logs".to_string(),
            validation: ValidationSpec::LogErrors(LogErrorsSpec {
                log_lines: vec![
                    "2024-03-01T09:12:01Z INFO  starting deploy of web-api v1.4.2".to_string(),
                    "2024-03-01T09:12:02Z INFO  pulling image registry.local/web-api:1.4.2"
                        .to_string(),
                    "2024-03-01T09:12:09Z ERROR image pull failed: manifest unknown".to_string(),
                    "2024-03-01T09:12:10Z INFO  retrying pull with tag 1.4.1".to_string(),
                    "2024-03-01T09:12:18Z WARN  liveness probe slow (1.9s)".to_string(),
                    "2024-03-01T09:12:21Z ERROR connection refused: postgres:5432".to_string(),
                    "2024-03-01T09:12:22Z INFO  restarting pod web-api-7d4f".to_string(),
                    "2024-03-01T09:12:30Z FATAL OOMKilled: container exceeded memory limit"
                        .to_string(),
                    "2024-03-01T09:12:31Z INFO  rollout paused".to_string(),
                ],
                error_needles: vec![
                    "error".to_string(),
                    "fatal".to_string(),
                    "failed".to_string(),
                ],
            }),
        },
        MissionDefinition {
            id: 5,
            title: "Config Conjurer".to_string(),
            concept: "Write a deployment config that would actually ship".to_string(),
            validation: ValidationSpec::ConfigFields(ConfigFieldsSpec {
                allowed_environments: vec![
                    "development".to_string(),
                    "staging".to_string(),
                    "production".to_string(),
                ],
                min_replicas: 1,
                pass_threshold: 80,
            }),
        },
        MissionDefinition {
            id: 6,
            title: "Midnight Pager".to_string(),
            concept: "Respond to a production outage under time pressure".to_string(),
            validation: ValidationSpec::IncidentResponse(IncidentSpec {
                strategies: vec![
                    StrategyDef {
                        id: "rollback".to_string(),
                        label: "Roll back to the last good release".to_string(),
                        risk: RiskTier::Low,
                    },
                    StrategyDef {
                        id: "scale-up".to_string(),
                        label: "Scale out the healthy replicas".to_string(),
                        risk: RiskTier::Low,
                    },
                    StrategyDef {
                        id: "hotfix".to_string(),
                        label: "Patch forward with a hotfix".to_string(),
                        risk: RiskTier::Medium,
                    },
                    StrategyDef {
                        id: "restart".to_string(),
                        label: "Restart the crashing pods".to_string(),
                        risk: RiskTier::Medium,
                    },
                    StrategyDef {
                        id: "debug-live".to_string(),
                        label: "Debug directly on production".to_string(),
                        risk: RiskTier::High,
                    },
                ],
                incident_count: 3,
                pass_threshold: 70,
            }),
        },
    ]
}
