//! Progress tokens: portable base64(JSON) snapshots of a player's state
//! for manual transfer to the instructor view.
//!
//! Decoding is schema-checked and never panics; malformed input comes
//! back as a typed error the caller must handle before use. Tokens are a
//! summary, not a full backup: exactly the fields in [`TokenPayload`]
//! survive a round trip.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::Difficulty;
use crate::missions::MISSION_COUNT;
use crate::player::{MissionProgress, PlayerRecord};

/// The fields a token carries. Field names stay camelCase so tokens are
/// exchangeable with the original browser app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub player_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub completed_missions: Vec<u8>,
    /// Full per-mission entries when the producer has them; summary
    /// tokens may carry only `completed_missions`.
    #[serde(default)]
    pub progress: Vec<MissionProgress>,
    #[serde(default, rename = "timeSpent", alias = "totalTimeSpent")]
    pub total_time_ms: u64,
}

/// Malformed token input.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token is missing a player id")]
    MissingPlayerId,
    #[error("token references mission id {0}, which is not in the catalog")]
    InvalidMissionId(u8),
}

/// Encode a player's state as a portable token.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized (not expected
/// for well-formed records).
pub fn encode_token(player: &PlayerRecord) -> Result<String, TokenError> {
    let payload = TokenPayload {
        player_id: player.id.clone(),
        name: Some(player.name.clone()),
        difficulty: player.difficulty,
        completed_missions: player.completed_missions(),
        progress: player.progress.values().cloned().collect(),
        total_time_ms: player.total_time_ms,
    };
    let json = serde_json::to_vec(&payload)?;
    Ok(STANDARD.encode(json))
}

/// Decode and schema-check a pasted token.
///
/// # Errors
///
/// Returns a [`TokenError`] for anything that is not a well-formed
/// payload; never panics on malformed input.
pub fn decode_token(token: &str) -> Result<TokenPayload, TokenError> {
    let bytes = STANDARD.decode(token.trim())?;
    let payload: TokenPayload = serde_json::from_slice(&bytes)?;
    if payload.player_id.trim().is_empty() {
        return Err(TokenError::MissingPlayerId);
    }
    for id in payload
        .completed_missions
        .iter()
        .copied()
        .chain(payload.progress.iter().map(|p| p.mission_id))
    {
        if id == 0 || id > MISSION_COUNT {
            return Err(TokenError::InvalidMissionId(id));
        }
    }
    Ok(payload)
}

impl TokenPayload {
    /// Reconstruct a player record from the carried fields. Prefers the
    /// full progress array; a summary token gets default entries for its
    /// completed missions, with the aggregate time spread evenly so the
    /// time invariant holds. The unlock pointer lands one past the
    /// highest completed mission, capped at the catalog size.
    #[must_use]
    pub fn into_player(self) -> PlayerRecord {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.player_id.clone());
        let mut record = PlayerRecord::new(self.player_id, name, self.difficulty);

        if self.progress.is_empty() {
            let count = self.completed_missions.len() as u64;
            for (idx, mission_id) in self.completed_missions.iter().copied().enumerate() {
                let mut entry = MissionProgress::new(mission_id);
                entry.completed = true;
                entry.time_spent_ms = if count == 0 {
                    0
                } else {
                    // Spread the aggregate; the first entry takes the
                    // remainder.
                    self.total_time_ms / count
                        + if idx == 0 { self.total_time_ms % count } else { 0 }
                };
                record.progress.insert(mission_id, entry);
            }
        } else {
            for entry in self.progress {
                record.progress.insert(entry.mission_id, entry);
            }
            for mission_id in self.completed_missions {
                record
                    .progress
                    .entry(mission_id)
                    .or_insert_with(|| MissionProgress::new(mission_id))
                    .completed = true;
            }
        }

        let highest_completed = record
            .progress
            .values()
            .filter(|p| p.completed)
            .map(|p| p.mission_id)
            .max()
            .unwrap_or(0);
        record.current_mission = (highest_completed + 1).clamp(1, MISSION_COUNT);
        record.recompute_total_time();
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_base64_is_a_typed_error() {
        assert!(matches!(
            decode_token("!!! not base64 !!!"),
            Err(TokenError::Base64(_))
        ));
    }

    #[test]
    fn non_json_payload_is_a_typed_error() {
        let token = STANDARD.encode("hello there");
        assert!(matches!(decode_token(&token), Err(TokenError::Json(_))));
    }

    #[test]
    fn blank_player_id_is_rejected() {
        let token = STANDARD.encode(r#"{"playerId":"  ","difficulty":"beginner"}"#);
        assert!(matches!(
            decode_token(&token),
            Err(TokenError::MissingPlayerId)
        ));
    }

    #[test]
    fn out_of_catalog_mission_is_rejected() {
        let token = STANDARD.encode(
            r#"{"playerId":"p1","difficulty":"beginner","completedMissions":[1,9]}"#,
        );
        assert!(matches!(
            decode_token(&token),
            Err(TokenError::InvalidMissionId(9))
        ));
    }

    #[test]
    fn accepts_camel_case_summary_tokens() {
        let token = STANDARD.encode(
            r#"{"playerId":"p1","difficulty":"intermediate","completedMissions":[1,2],"timeSpent":120000}"#,
        );
        let payload = decode_token(&token).unwrap();
        assert_eq!(payload.player_id, "p1");
        assert_eq!(payload.completed_missions, vec![1, 2]);
        assert_eq!(payload.total_time_ms, 120_000);

        let player = payload.into_player();
        assert_eq!(player.current_mission, 3);
        assert_eq!(player.completed_count(), 2);
        assert_eq!(player.total_time_ms, 120_000);
        assert!(player.time_invariant_holds());
    }

    #[test]
    fn summary_token_time_spread_handles_remainders() {
        let token = STANDARD.encode(
            r#"{"playerId":"p1","difficulty":"beginner","completedMissions":[1,2,3],"timeSpent":100}"#,
        );
        let player = decode_token(&token).unwrap().into_player();
        assert_eq!(player.total_time_ms, 100);
        assert!(player.time_invariant_holds());
    }
}
