//! Ordered-block validator for the Dockerfile ordering mission.
//!
//! Raw instruction strings are mapped to canonical categories by prefix
//! classification before any comparison, so textual variants of the same
//! instruction (`COPY . .` vs `COPY .`) grade identically.

use serde::{Deserialize, Serialize};

use crate::constants::{ORDER_ALL_FILLED_BONUS, ORDER_POINTS_PER_SLOT};
use crate::missions::{BlockCategory, OrderedBlocksSpec};

use super::{ValidationDetail, ValidationResult, clamp_score};

/// Positional sequence of raw instruction strings. `None` is an empty
/// slot the player never filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedBlocksSubmission {
    pub slots: Vec<Option<String>>,
}

impl OrderedBlocksSubmission {
    /// Convenience constructor from raw instruction text.
    #[must_use]
    pub fn from_instructions<I, S>(instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: instructions
                .into_iter()
                .map(|raw| Some(raw.into()))
                .collect(),
        }
    }
}

const MANIFEST_FILES: [&str; 8] = [
    "package.json",
    "package-lock.json",
    "requirements.txt",
    "cargo.toml",
    "go.mod",
    "go.sum",
    "pom.xml",
    "gemfile",
];

const INSTALL_MARKERS: [&str; 7] = [
    "npm install",
    "npm ci",
    "yarn install",
    "pip install",
    "apt-get install",
    "apk add",
    "cargo fetch",
];

/// Classify a raw Dockerfile instruction into its canonical category.
///
/// Classification is whitespace-insensitive and case-insensitive on the
/// instruction word. Anything unrecognized is [`BlockCategory::Extra`].
#[must_use]
pub fn classify_instruction(raw: &str) -> BlockCategory {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let lower = normalized.to_lowercase();
    let Some(word) = lower.split(' ').next() else {
        return BlockCategory::Extra;
    };
    match word {
        "from" => BlockCategory::From,
        "workdir" => BlockCategory::Workdir,
        "expose" => BlockCategory::Expose,
        "cmd" | "entrypoint" => BlockCategory::Cmd,
        "copy" | "add" => {
            if MANIFEST_FILES.iter().any(|f| lower.contains(f)) {
                BlockCategory::CopyManifest
            } else {
                BlockCategory::CopySource
            }
        }
        "run" => {
            if INSTALL_MARKERS.iter().any(|m| lower.contains(m)) {
                BlockCategory::InstallDeps
            } else {
                BlockCategory::Extra
            }
        }
        _ => BlockCategory::Extra,
    }
}

/// Score a positional arrangement against the required category sequence.
/// 20 points per matching slot, +10 when every slot is filled; success
/// requires every slot to match.
pub(super) fn validate(
    submission: &OrderedBlocksSubmission,
    spec: &OrderedBlocksSpec,
) -> ValidationResult {
    let total = spec.required.len();
    let mut correct = 0usize;
    let mut filled = 0usize;
    let mut feedback = Vec::new();

    for (idx, required) in spec.required.iter().enumerate() {
        let step = idx + 1;
        match submission.slots.get(idx).and_then(Option::as_deref) {
            Some(raw) => {
                filled += 1;
                let got = classify_instruction(raw);
                if got == *required {
                    correct += 1;
                    feedback.push(format!("Step {step}: Correct"));
                } else {
                    feedback.push(format!("Step {step}: Expected {required}, got {got}"));
                }
            }
            None => feedback.push(format!("Step {step}: Missing {required}")),
        }
    }

    let extras = submission.slots.len().saturating_sub(total);
    if extras > 0 {
        feedback.push(format!(
            "{extras} extra block(s) placed beyond the {total} required steps"
        ));
    }

    let all_filled = filled == total;
    let raw_score = to_i32(correct) * ORDER_POINTS_PER_SLOT
        + if all_filled { ORDER_ALL_FILLED_BONUS } else { 0 };

    ValidationResult {
        score: clamp_score(raw_score),
        success: correct == total && all_filled,
        feedback,
        detail: ValidationDetail::OrderedBlocks {
            correct,
            total,
            all_filled,
            extras,
        },
    }
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_copy_variants_identically() {
        assert_eq!(
            classify_instruction("COPY . ."),
            classify_instruction("COPY .")
        );
        assert_eq!(classify_instruction("COPY . ."), BlockCategory::CopySource);
        assert_eq!(
            classify_instruction("copy   package.json   ./"),
            BlockCategory::CopyManifest
        );
    }

    #[test]
    fn run_without_install_is_extra() {
        assert_eq!(
            classify_instruction("RUN echo hello"),
            BlockCategory::Extra
        );
        assert_eq!(
            classify_instruction("RUN npm install"),
            BlockCategory::InstallDeps
        );
    }

    #[test]
    fn entrypoint_counts_as_cmd() {
        assert_eq!(
            classify_instruction("ENTRYPOINT [\"node\", \"server.js\"]"),
            BlockCategory::Cmd
        );
    }
}
