//! Round-trip law for progress tokens: every field the payload documents
//! as carried must survive encode -> decode unchanged.

use escaperoom_core::{
    Difficulty, FixedClock, MemoryStorage, MissionProgress, ProgressStore, ProgressUpdate,
    decode_token, encode_token,
};

#[test]
fn token_roundtrip_preserves_documented_fields() {
    let mut store = ProgressStore::new(MemoryStorage::default(), FixedClock::new(0));
    store.create_player("Ada", Difficulty::Intermediate).unwrap();
    store
        .update_mission_progress(
            1,
            &ProgressUpdate {
                completed: Some(true),
                score: Some(95),
                time_spent_ms: Some(60_000),
                hints_used: Some(1),
                quiz_score: Some(80),
            },
        )
        .unwrap();
    store
        .update_mission_progress(
            2,
            &ProgressUpdate {
                time_spent_ms: Some(30_000),
                ..ProgressUpdate::default()
            },
        )
        .unwrap();
    let player = store.player().unwrap();

    let token = encode_token(player).unwrap();
    let payload = decode_token(&token).unwrap();

    assert_eq!(payload.player_id, player.id);
    assert_eq!(payload.name.as_deref(), Some("Ada"));
    assert_eq!(payload.difficulty, Difficulty::Intermediate);
    assert_eq!(payload.completed_missions, vec![1]);
    assert_eq!(payload.total_time_ms, 90_000);
    let entries: Vec<&MissionProgress> = payload.progress.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].quiz_score, Some(80));
    assert_eq!(entries[0].hints_used, 1);
}

#[test]
fn reencoding_a_decoded_token_is_semantically_idempotent() {
    let mut store = ProgressStore::new(MemoryStorage::default(), FixedClock::new(0));
    store.create_player("Grace", Difficulty::Advanced).unwrap();
    store
        .update_mission_progress(
            3,
            &ProgressUpdate {
                completed: Some(true),
                score: Some(88),
                time_spent_ms: Some(120_000),
                ..ProgressUpdate::default()
            },
        )
        .unwrap();
    let player = store.player().unwrap();

    let first = decode_token(&encode_token(player).unwrap()).unwrap();
    let reconstructed = first.clone().into_player();
    let second = decode_token(&encode_token(&reconstructed).unwrap()).unwrap();
    assert_eq!(first, second);
}
