//! Instructor aggregator: a read model over the shared namespace.
//!
//! The board never writes player records on its own; token import is the
//! one trusted upsert (last received token wins, no merging of concurrent
//! partial updates). Polling cadence and timer teardown belong to the UI
//! layer; `refresh` is just the poll body.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ProgressStorage;
use crate::constants::STALENESS_THRESHOLD_MS;
use crate::missions::MISSION_COUNT;
use crate::persist::{self, PersistError, SharedEntry};
use crate::token::{self, TokenError};

/// Derived per-player statistics, computed at read time and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub completed: usize,
    /// Completed missions as a percentage of the catalog.
    pub completion_pct: u8,
    /// Average score across completed missions; 0 when none completed.
    pub avg_score: u8,
    /// Average quiz score across missions that reported one; 0 otherwise.
    pub avg_quiz: u8,
    pub active: bool,
}

/// Token import failure; nothing is written on any error path.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Read model over the shared namespace, refreshed by polling.
pub struct InstructorBoard<S: ProgressStorage> {
    storage: S,
    roster: BTreeMap<String, SharedEntry>,
}

impl<S: ProgressStorage> InstructorBoard<S> {
    pub const fn new(storage: S) -> Self {
        Self {
            storage,
            roster: BTreeMap::new(),
        }
    }

    /// Re-read the shared namespace. Call this on the UI's polling
    /// interval; the board holds no timer of its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read; the previous
    /// roster snapshot is kept in that case.
    pub fn refresh(&mut self) -> Result<(), PersistError> {
        self.roster = persist::load_shared(&self.storage)?;
        Ok(())
    }

    /// All known players, most recently updated first. Ties break by
    /// player id so the ordering is deterministic.
    #[must_use]
    pub fn players(&self) -> Vec<&SharedEntry> {
        let mut entries: Vec<&SharedEntry> = self.roster.values().collect();
        entries.sort_by(|a, b| {
            b.last_update
                .cmp(&a.last_update)
                .then_with(|| a.player.id.cmp(&b.player.id))
        });
        entries
    }

    /// Decode a pasted token and upsert the player it describes into the
    /// shared namespace. Malformed tokens are rejected with no partial
    /// write. Returns the imported player's id.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed tokens or a failed backend write.
    pub fn import_token(&mut self, token: &str, now_ms: u64) -> Result<String, ImportError> {
        let player = token::decode_token(token)?.into_player();
        let player_id = player.id.clone();
        persist::save_player_to_shared(&self.storage, &player, now_ms)?;
        self.roster.insert(
            player_id.clone(),
            SharedEntry {
                player,
                last_update: now_ms,
            },
        );
        Ok(player_id)
    }

    /// Explicit instructor delete: drops the player from the shared
    /// namespace and the local snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn remove_player(&mut self, player_id: &str) -> Result<(), PersistError> {
        persist::remove_from_shared(&self.storage, player_id)?;
        self.roster.remove(player_id);
        Ok(())
    }

    /// Whether a player counts as active at `now_ms`.
    #[must_use]
    pub fn is_active(entry: &SharedEntry, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.last_update) < STALENESS_THRESHOLD_MS
    }

    /// Derived statistics for one roster entry.
    #[must_use]
    pub fn summary(entry: &SharedEntry, now_ms: u64) -> PlayerSummary {
        let player = &entry.player;
        let completed = player.completed_count();
        let completion_pct = (completed * 100 / usize::from(MISSION_COUNT)) as u8;

        let completed_scores: Vec<u32> = player
            .progress
            .values()
            .filter(|p| p.completed)
            .map(|p| u32::from(p.score))
            .collect();
        let avg_score = average(&completed_scores);

        let quiz_scores: Vec<u32> = player
            .progress
            .values()
            .filter_map(|p| p.quiz_score.map(u32::from))
            .collect();
        let avg_quiz = average(&quiz_scores);

        PlayerSummary {
            completed,
            completion_pct,
            avg_score,
            avg_quiz,
            active: Self::is_active(entry, now_ms),
        }
    }

    /// Export the roster as CSV with a fixed column order, one row per
    /// player in the same order as [`Self::players`].
    #[must_use]
    pub fn export_csv(&self, now_ms: u64) -> String {
        let mut out = String::from(
            "player_id,name,difficulty,current_mission,completed,completion_pct,avg_score,avg_quiz,total_minutes,active\n",
        );
        for entry in self.players() {
            let player = &entry.player;
            let stats = Self::summary(entry, now_ms);
            let row = [
                csv_field(&player.id),
                csv_field(&player.name),
                player.difficulty.to_string(),
                player.current_mission.to_string(),
                stats.completed.to_string(),
                stats.completion_pct.to_string(),
                stats.avg_score.to_string(),
                stats.avg_quiz.to_string(),
                (player.total_time_ms / 60_000).to_string(),
                stats.active.to_string(),
            ];
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

/// Integer average rounded to nearest; defined as 0 over zero elements.
fn average(values: &[u32]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let sum: u32 = values.iter().sum();
    let count = values.len() as u32;
    ((sum + count / 2) / count).min(100) as u8
}

/// Quote a field when it contains CSV metacharacters.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
