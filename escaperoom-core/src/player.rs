//! Player records and the authoritative progress store.
//!
//! `ProgressStore` owns the current player's in-memory state. Every
//! mutation persists synchronously (single-player save plus the shared
//! namespace) before returning; persistence failures are logged and
//! swallowed so the session keeps working when the durable store is
//! unavailable.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::Difficulty;
use crate::missions::MISSION_COUNT;
use crate::persist::{self, SaveFile};
use crate::validators::ValidationResult;
use crate::{Clock, ProgressStorage};

/// Progress on one mission. Updated by partial merge; a later quiz-score
/// merge never resets earlier fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionProgress {
    pub mission_id: u8,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub time_spent_ms: u64,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub quiz_score: Option<u8>,
}

impl MissionProgress {
    #[must_use]
    pub fn new(mission_id: u8) -> Self {
        Self {
            mission_id,
            completed: false,
            time_spent_ms: 0,
            hints_used: 0,
            score: 0,
            quiz_score: None,
        }
    }
}

/// Partial update merged into a [`MissionProgress`]; only provided fields
/// overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub completed: Option<bool>,
    /// Absolute time spent on the mission so far, not a delta.
    pub time_spent_ms: Option<u64>,
    pub hints_used: Option<u32>,
    pub score: Option<u8>,
    pub quiz_score: Option<u8>,
}

/// The mutable aggregate root for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Opaque stable identifier, generated once and immutable.
    pub id: String,
    pub name: String,
    /// Chosen at creation; immutable afterwards.
    pub difficulty: Difficulty,
    /// Highest mission the player may access; monotone, capped at
    /// [`MISSION_COUNT`].
    pub current_mission: u8,
    #[serde(default)]
    pub progress: BTreeMap<u8, MissionProgress>,
    /// Always equals the sum of per-mission `time_spent_ms`; strictly
    /// recomputed after every merge rather than incremented.
    #[serde(default)]
    pub total_time_ms: u64,
}

impl PlayerRecord {
    /// Fresh record at mission 1 with empty progress.
    #[must_use]
    pub fn new(id: String, name: String, difficulty: Difficulty) -> Self {
        Self {
            id,
            name,
            difficulty,
            current_mission: 1,
            progress: BTreeMap::new(),
            total_time_ms: 0,
        }
    }

    /// Number of completed missions.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.progress.values().filter(|p| p.completed).count()
    }

    /// Sorted ids of completed missions.
    #[must_use]
    pub fn completed_missions(&self) -> Vec<u8> {
        self.progress
            .values()
            .filter(|p| p.completed)
            .map(|p| p.mission_id)
            .collect()
    }

    /// Recompute the aggregate time from the per-mission entries. Keeps
    /// the sum invariant under replayed or out-of-order updates.
    pub fn recompute_total_time(&mut self) {
        self.total_time_ms = self.progress.values().map(|p| p.time_spent_ms).sum();
    }

    /// Whether the aggregate-time invariant currently holds.
    #[must_use]
    pub fn time_invariant_holds(&self) -> bool {
        self.total_time_ms == self.progress.values().map(|p| p.time_spent_ms).sum::<u64>()
    }
}

/// Errors from progress-store operations. Poor puzzle performance is
/// never an error; these cover malformed requests only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("mission id {0} is not in the catalog")]
    UnknownMission(u8),
    #[error("no player has been created yet")]
    NoPlayer,
}

/// Single authoritative in-memory representation of the current player.
pub struct ProgressStore<S: ProgressStorage, C: Clock> {
    storage: S,
    clock: C,
    player: Option<PlayerRecord>,
}

impl<S: ProgressStorage, C: Clock> ProgressStore<S, C> {
    pub const fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            player: None,
        }
    }

    /// The current player, if one exists.
    #[must_use]
    pub const fn player(&self) -> Option<&PlayerRecord> {
        self.player.as_ref()
    }

    /// Rehydrate the store from the single-player save, if present.
    /// Returns whether a player was restored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. Corrupt JSON is
    /// logged and treated as no save.
    pub fn load_existing(&mut self) -> anyhow::Result<bool> {
        match persist::load_save(&self.storage) {
            Ok(Some(SaveFile {
                player: Some(mut player),
                ..
            })) => {
                // A hand-edited save can carry an out-of-range pointer.
                player.current_mission = player.current_mission.clamp(1, MISSION_COUNT);
                self.player = Some(player);
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(persist::PersistError::Json(err)) => {
                log::warn!("save file is corrupt, starting fresh: {err}");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Create a fresh player at mission 1. The name must be non-empty
    /// after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::EmptyName`] for a blank name.
    pub fn create_player(
        &mut self,
        name: &str,
        difficulty: Difficulty,
    ) -> Result<&PlayerRecord, PlayerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PlayerError::EmptyName);
        }
        let record = PlayerRecord::new(generate_player_id(), trimmed.to_string(), difficulty);
        self.player = Some(record);
        self.persist();
        self.player.as_ref().ok_or(PlayerError::NoPlayer)
    }

    /// Merge a partial update into the mission's progress entry, creating
    /// a default entry if none exists, then strictly recompute the
    /// aggregate time.
    ///
    /// # Errors
    ///
    /// Returns an error if no player exists or the mission id is not in
    /// the catalog.
    pub fn update_mission_progress(
        &mut self,
        mission_id: u8,
        update: &ProgressUpdate,
    ) -> Result<(), PlayerError> {
        let player = self.player.as_mut().ok_or(PlayerError::NoPlayer)?;
        if mission_id == 0 || mission_id > MISSION_COUNT {
            return Err(PlayerError::UnknownMission(mission_id));
        }
        let entry = player
            .progress
            .entry(mission_id)
            .or_insert_with(|| MissionProgress::new(mission_id));
        if let Some(completed) = update.completed {
            entry.completed = completed;
        }
        if let Some(time_spent_ms) = update.time_spent_ms {
            entry.time_spent_ms = time_spent_ms;
        }
        if let Some(hints_used) = update.hints_used {
            entry.hints_used = hints_used;
        }
        if let Some(score) = update.score {
            entry.score = score.min(100);
        }
        if let Some(quiz_score) = update.quiz_score {
            entry.quiz_score = Some(quiz_score.min(100));
        }
        player.recompute_total_time();
        self.persist();
        Ok(())
    }

    /// The sanctioned path for marking a mission completed: carries a
    /// validator's verdict into the progress entry. Completion and best
    /// score are monotone; a later failed attempt does not un-complete.
    ///
    /// # Errors
    ///
    /// Returns an error if no player exists or the mission id is unknown.
    pub fn apply_validation(
        &mut self,
        mission_id: u8,
        result: &ValidationResult,
    ) -> Result<(), PlayerError> {
        let existing = self
            .player
            .as_ref()
            .ok_or(PlayerError::NoPlayer)?
            .progress
            .get(&mission_id);
        let completed = result.success || existing.is_some_and(|p| p.completed);
        let score = existing
            .map_or(result.score, |p| p.score.max(result.score));
        self.update_mission_progress(
            mission_id,
            &ProgressUpdate {
                completed: Some(completed),
                score: Some(score),
                ..ProgressUpdate::default()
            },
        )
    }

    /// Hint-usage event from the UI; bumps the mission's counter.
    ///
    /// # Errors
    ///
    /// Returns an error if no player exists or the mission id is unknown.
    pub fn record_hint_used(&mut self, mission_id: u8) -> Result<(), PlayerError> {
        let hints = self
            .player
            .as_ref()
            .ok_or(PlayerError::NoPlayer)?
            .progress
            .get(&mission_id)
            .map_or(0, |p| p.hints_used)
            .saturating_add(1);
        self.update_mission_progress(
            mission_id,
            &ProgressUpdate {
                hints_used: Some(hints),
                ..ProgressUpdate::default()
            },
        )
    }

    /// Record the knowledge-quiz score for a mission without touching any
    /// other field.
    ///
    /// # Errors
    ///
    /// Returns an error if no player exists or the mission id is unknown.
    pub fn record_quiz_score(&mut self, mission_id: u8, score: u8) -> Result<(), PlayerError> {
        self.update_mission_progress(
            mission_id,
            &ProgressUpdate {
                quiz_score: Some(score),
                ..ProgressUpdate::default()
            },
        )
    }

    /// Advance the unlock pointer, saturating at the mission count.
    /// Idempotent at the ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if no player exists.
    pub fn unlock_next_mission(&mut self) -> Result<u8, PlayerError> {
        let player = self.player.as_mut().ok_or(PlayerError::NoPlayer)?;
        player.current_mission = player.current_mission.saturating_add(1).min(MISSION_COUNT);
        let unlocked = player.current_mission;
        self.persist();
        Ok(unlocked)
    }

    /// Change the display name. Identity and difficulty stay fixed.
    ///
    /// # Errors
    ///
    /// Returns an error if no player exists or the name is blank.
    pub fn rename_player(&mut self, name: &str) -> Result<(), PlayerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PlayerError::EmptyName);
        }
        let player = self.player.as_mut().ok_or(PlayerError::NoPlayer)?;
        player.name = trimmed.to_string();
        self.persist();
        Ok(())
    }

    /// Clear to a fresh unnamed state. The old record is removed from the
    /// shared namespace; the next `create_player` assigns a new id.
    pub fn reset_player(&mut self) {
        if let Some(player) = self.player.take() {
            if let Err(err) = persist::remove_from_shared(&self.storage, &player.id) {
                log::warn!("failed to remove player from shared namespace: {err}");
            }
        }
        if let Err(err) = persist::clear_save(&self.storage) {
            log::warn!("failed to clear save: {err}");
        }
    }

    /// Write-through of the current player to both the single-player save
    /// and the shared namespace. Failures are logged and swallowed; the
    /// in-memory state stays authoritative.
    fn persist(&self) {
        let Some(player) = &self.player else {
            return;
        };
        if let Err(err) = persist::save_player(&self.storage, player) {
            log::warn!("progress save failed (continuing in memory): {err}");
        }
        if let Err(err) =
            persist::save_player_to_shared(&self.storage, player, self.clock.now_ms())
        {
            log::warn!("shared-namespace save failed (continuing in memory): {err}");
        }
    }
}

fn generate_player_id() -> String {
    let n: u32 = rand::thread_rng().r#gen();
    format!("player-{n:08x}")
}
