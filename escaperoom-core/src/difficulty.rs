//! Difficulty levels and the settings table keyed by them.

use serde::{Deserialize, Serialize};

/// Difficulty chosen once at player creation. Immutable after the first
/// mission starts; hint budgets and build-metric targets key off it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Settings for this difficulty level.
    #[must_use]
    pub const fn settings(self) -> &'static DifficultySettings {
        match self {
            Difficulty::Beginner => &BEGINNER,
            Difficulty::Intermediate => &INTERMEDIATE,
            Difficulty::Advanced => &ADVANCED,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

/// Per-difficulty tuning applied by the validators and the hint system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Hints the player may consume across the whole run.
    pub hint_budget: u32,
    /// Simulated build time the caching mission must reach, in seconds.
    pub build_time_target_s: u32,
    /// Simulated image size the caching mission must reach, in megabytes.
    pub image_size_target_mb: u32,
}

const BEGINNER: DifficultySettings = DifficultySettings {
    hint_budget: 5,
    build_time_target_s: 60,
    image_size_target_mb: 800,
};

const INTERMEDIATE: DifficultySettings = DifficultySettings {
    hint_budget: 3,
    build_time_target_s: 45,
    image_size_target_mb: 600,
};

const ADVANCED: DifficultySettings = DifficultySettings {
    hint_budget: 1,
    build_time_target_s: 30,
    image_size_target_mb: 400,
};
