//! Persistence and sync layer.
//!
//! Two conceptual keys on the durable medium: the single-player save and
//! the shared namespace the instructor polls. Each player only ever
//! writes their own entry in the shared map, so cross-player writes never
//! conflict; concurrent tabs for the same player are last-writer-wins by
//! design.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{SAVE_KEY, SHARED_KEY};
use crate::difficulty::Difficulty;
use crate::player::PlayerRecord;
use crate::{Clock, ProgressStorage};

/// Layout of the single-player save key. The top-level `player_id` and
/// `difficulty` mirror the record for cheap reads by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFile {
    pub player_id: String,
    pub difficulty: Difficulty,
    pub player: Option<PlayerRecord>,
}

/// One entry in the shared namespace: the player record plus the epoch
/// millis of its last write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEntry {
    pub player: PlayerRecord,
    pub last_update: u64,
}

/// Errors from the persistence layer. Mutation paths log and swallow
/// these; explicit save/load APIs surface them.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn backend_err(err: impl std::error::Error) -> PersistError {
    PersistError::Backend(err.to_string())
}

/// Write the single-player save.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save_player<S: ProgressStorage>(
    storage: &S,
    player: &PlayerRecord,
) -> Result<(), PersistError> {
    let save = SaveFile {
        player_id: player.id.clone(),
        difficulty: player.difficulty,
        player: Some(player.clone()),
    };
    let json = serde_json::to_string(&save)?;
    storage.write(SAVE_KEY, &json).map_err(backend_err)
}

/// Read the single-player save, if any.
///
/// # Errors
///
/// Returns an error if the backend read fails or the JSON is corrupt.
pub fn load_save<S: ProgressStorage>(storage: &S) -> Result<Option<SaveFile>, PersistError> {
    match storage.read(SAVE_KEY).map_err(backend_err)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Remove the single-player save.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub fn clear_save<S: ProgressStorage>(storage: &S) -> Result<(), PersistError> {
    storage.remove(SAVE_KEY).map_err(backend_err)
}

/// Upsert one player into the shared namespace, stamped with `now_ms`.
/// A corrupt shared map is logged and replaced rather than blocking the
/// write.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn save_player_to_shared<S: ProgressStorage>(
    storage: &S,
    player: &PlayerRecord,
    now_ms: u64,
) -> Result<(), PersistError> {
    let mut map = load_shared(storage)?;
    map.insert(
        player.id.clone(),
        SharedEntry {
            player: player.clone(),
            last_update: now_ms,
        },
    );
    let json = serde_json::to_string(&map)?;
    storage.write(SHARED_KEY, &json).map_err(backend_err)
}

/// Read the whole shared namespace. Corrupt JSON degrades to an empty
/// map (logged) so one bad writer cannot take down the dashboard.
///
/// # Errors
///
/// Returns an error if the backend read fails.
pub fn load_shared<S: ProgressStorage>(
    storage: &S,
) -> Result<BTreeMap<String, SharedEntry>, PersistError> {
    match storage.read(SHARED_KEY).map_err(backend_err)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(map) => Ok(map),
            Err(err) => {
                log::warn!("shared namespace is corrupt, treating as empty: {err}");
                Ok(BTreeMap::new())
            }
        },
        None => Ok(BTreeMap::new()),
    }
}

/// Remove one player from the shared namespace.
///
/// # Errors
///
/// Returns an error if serialization or the backend write fails.
pub fn remove_from_shared<S: ProgressStorage>(
    storage: &S,
    player_id: &str,
) -> Result<(), PersistError> {
    let mut map = load_shared(storage)?;
    if map.remove(player_id).is_none() {
        return Ok(());
    }
    let json = serde_json::to_string(&map)?;
    storage.write(SHARED_KEY, &json).map_err(backend_err)
}

/// In-memory storage backend. The default for tests and native tooling;
/// clones share the same underlying map, mirroring how two stores in one
/// browser session share `localStorage`.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl ProgressStorage for MemoryStorage {
    type Error = Infallible;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Settable clock for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Rc<std::cell::Cell<u64>>,
}

impl FixedClock {
    #[must_use]
    pub fn new(now_ms: u64) -> Self {
        let clock = Self::default();
        clock.set(now_ms);
        clock
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> PlayerRecord {
        PlayerRecord::new(id.to_string(), format!("Player {id}"), Difficulty::Beginner)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let storage = MemoryStorage::default();
        let record = player("p1");
        save_player(&storage, &record).unwrap();
        let save = load_save(&storage).unwrap().expect("save exists");
        assert_eq!(save.player_id, "p1");
        assert_eq!(save.player, Some(record));
    }

    #[test]
    fn shared_upsert_keeps_other_players() {
        let storage = MemoryStorage::default();
        save_player_to_shared(&storage, &player("p1"), 100).unwrap();
        save_player_to_shared(&storage, &player("p2"), 200).unwrap();
        save_player_to_shared(&storage, &player("p1"), 300).unwrap();
        let map = load_shared(&storage).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["p1"].last_update, 300);
        assert_eq!(map["p2"].last_update, 200);
    }

    #[test]
    fn corrupt_shared_map_degrades_to_empty() {
        let storage = MemoryStorage::default();
        storage.write(SHARED_KEY, "{not json").unwrap();
        assert!(load_shared(&storage).unwrap().is_empty());
        // And a following write heals the key.
        save_player_to_shared(&storage, &player("p1"), 100).unwrap();
        assert_eq!(load_shared(&storage).unwrap().len(), 1);
    }

    #[test]
    fn remove_from_shared_is_idempotent() {
        let storage = MemoryStorage::default();
        save_player_to_shared(&storage, &player("p1"), 100).unwrap();
        remove_from_shared(&storage, "p1").unwrap();
        remove_from_shared(&storage, "p1").unwrap();
        assert!(load_shared(&storage).unwrap().is_empty());
    }
}
