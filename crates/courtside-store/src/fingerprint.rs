//! Content fingerprint of a game snapshot.
//!
//! The fingerprint is the BLAKE3 hex digest of the game's JSON encoding.
//! Two games with the same fingerprint serialize to the same bytes, so a
//! flush whose fingerprint matches the last successful one can be skipped.

use courtside_core::game::Game;

use crate::PersistenceError;

pub fn fingerprint(game: &Game) -> Result<String, PersistenceError> {
    let bytes = serde_json::to_vec(game)
        .map_err(|e| PersistenceError::encode(game.id().as_str(), e))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courtside_core::prelude::*;

    #[test]
    fn fingerprint_tracks_content() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut game = demo_game(&mut IdGenerator::from_seed(1), now);
        let first = fingerprint(&game).unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(fingerprint(&game.clone()).unwrap(), first);

        game.apply_stat_delta(
            TeamSide::Home,
            &PlayerId::new("h1"),
            StatKind::Rebounds,
            1,
            now,
        )
        .unwrap();
        assert_ne!(fingerprint(&game).unwrap(), first);
    }
}
