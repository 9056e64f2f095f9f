//! Players and their individual statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{IdGenerator, PlayerId};
use crate::CoreError;

// ---------------------------------------------------------------------------
// StatKind
// ---------------------------------------------------------------------------

/// The individual statistics a player accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Points,
    Fouls,
    Rebounds,
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatKind::Points => "points",
            StatKind::Fouls => "fouls",
            StatKind::Rebounds => "rebounds",
        })
    }
}

// ---------------------------------------------------------------------------
// PlayerStats
// ---------------------------------------------------------------------------

/// Running totals for one player. All counters are non-negative by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerStats {
    pub points: u32,
    pub fouls: u32,
    pub rebounds: u32,
}

impl PlayerStats {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Points => self.points,
            StatKind::Fouls => self.fouls,
            StatKind::Rebounds => self.rebounds,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: StatKind) -> &mut u32 {
        match kind {
            StatKind::Points => &mut self.points,
            StatKind::Fouls => &mut self.fouls,
            StatKind::Rebounds => &mut self.rebounds,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A rostered player.
///
/// Stats and court placement are only writable from inside this crate, through
/// the mutation layer on [`Game`](crate::game::Game).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    id: PlayerId,
    number: u32,
    name: String,
    is_on_court: bool,
    stats: PlayerStats,
}

impl Player {
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Jersey number, unique within the team.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_on_court(&self) -> bool {
        self.is_on_court
    }

    pub fn stats(&self) -> PlayerStats {
        self.stats
    }

    pub(crate) fn from_parts(
        id: PlayerId,
        number: u32,
        name: impl Into<String>,
        is_on_court: bool,
        stats: PlayerStats,
    ) -> Self {
        Self {
            id,
            number,
            name: name.into(),
            is_on_court,
            stats,
        }
    }

    pub(crate) fn set_on_court(&mut self, on_court: bool) {
        self.is_on_court = on_court;
    }

    pub(crate) fn stats_mut(&mut self) -> &mut PlayerStats {
        &mut self.stats
    }
}

/// Parse a jersey number typed by the operator.
///
/// Surrounding whitespace is ignored; anything else that is not a
/// non-negative integer is a [`CoreError::InvalidPlayerNumber`].
pub fn parse_player_number(input: &str) -> Result<u32, CoreError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| CoreError::InvalidPlayerNumber {
            input: input.to_owned(),
        })
}

/// Build a new bench player with zeroed stats.
pub fn create_player(
    number: &str,
    name: &str,
    ids: &mut IdGenerator,
    now: DateTime<Utc>,
) -> Result<Player, CoreError> {
    let number = parse_player_number(number)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::EmptyPlayerName);
    }
    Ok(Player::from_parts(
        ids.player_id(now),
        number,
        name,
        false,
        PlayerStats::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_000).unwrap()
    }

    #[test]
    fn create_player_defaults() {
        let mut ids = IdGenerator::from_seed(0);
        let player = create_player(" 23 ", "Jordan", &mut ids, now()).unwrap();
        assert_eq!(player.number(), 23);
        assert_eq!(player.name(), "Jordan");
        assert!(!player.is_on_court());
        assert_eq!(player.stats(), PlayerStats::default());
    }

    #[test]
    fn non_numeric_numbers_are_rejected() {
        let mut ids = IdGenerator::from_seed(0);
        for bad in ["", "abc", "-1", "7a", "3.5"] {
            let err = create_player(bad, "X", &mut ids, now()).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidPlayerNumber { .. }),
                "{bad:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut ids = IdGenerator::from_seed(0);
        assert_eq!(
            create_player("4", "   ", &mut ids, now()),
            Err(CoreError::EmptyPlayerName)
        );
    }

    #[test]
    fn stats_accessors_cover_every_kind() {
        let mut stats = PlayerStats::default();
        *stats.get_mut(StatKind::Points) = 10;
        *stats.get_mut(StatKind::Fouls) = 2;
        *stats.get_mut(StatKind::Rebounds) = 7;
        assert_eq!(stats.get(StatKind::Points), 10);
        assert_eq!(stats.get(StatKind::Fouls), 2);
        assert_eq!(stats.get(StatKind::Rebounds), 7);
    }

    #[test]
    fn player_serializes_camel_case() {
        let player = Player::from_parts(PlayerId::new("h1"), 7, "Kim", true, PlayerStats::default());
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["isOnCourt"], serde_json::json!(true));
        assert_eq!(json["stats"]["points"], serde_json::json!(0));
    }
}
