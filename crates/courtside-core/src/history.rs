//! Bounded action log that drives undo.
//!
//! Every undoable operation is described by a [`HistoryAction`]. Each variant
//! carries the prior state its inverse needs. The [`HistoryLog`] keeps the
//! most recent [`HISTORY_LIMIT`] entries; recording past the limit evicts the
//! oldest entry first. Undo consumes entries last-in, first-out (see
//! [`Game::undo_last`](crate::game::Game::undo_last)).
//!
//! Only growth is logged. Decrements made to correct a value are applied
//! directly and never recorded, so there is no "undo of a correction".
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use courtside_core::history::{HistoryAction, HistoryEntry, HistoryKind, HistoryLog};
//! use courtside_core::ids::PlayerId;
//! use courtside_core::team::TeamSide;
//!
//! let mut log = HistoryLog::new();
//! log.push(HistoryEntry {
//!     action: HistoryAction::Rebound {
//!         team: TeamSide::Home,
//!         player_id: PlayerId::new("h1"),
//!         previous_rebounds: 0,
//!     },
//!     quarter: 1,
//!     timestamp: Utc::now(),
//! });
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.last().map(|e| e.action.kind()), Some(HistoryKind::Rebound));
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::player::StatKind;
use crate::team::TeamSide;

/// Maximum number of entries kept in a game's history.
pub const HISTORY_LIMIT: usize = 30;

// ---------------------------------------------------------------------------
// HistoryKind
// ---------------------------------------------------------------------------

/// Tag of a [`HistoryAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryKind {
    Score,
    Foul,
    Rebound,
    Substitution,
}

// ---------------------------------------------------------------------------
// HistoryAction
// ---------------------------------------------------------------------------

/// One reversible action.
///
/// The `previous_*` fields record the player's value before the action for
/// display and auditing. Undo never restores them: it applies the inverse
/// delta to whatever the value is now, so changes made after the action
/// survive the undo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    /// Points credited to a player (and the current quarter).
    #[serde(rename_all = "camelCase")]
    Score {
        team: TeamSide,
        player_id: PlayerId,
        points: u32,
        previous_points: u32,
    },
    /// One personal foul, which also counted as one team foul.
    #[serde(rename_all = "camelCase")]
    Foul {
        team: TeamSide,
        player_id: PlayerId,
        previous_fouls: u32,
    },
    /// One rebound.
    #[serde(rename_all = "camelCase")]
    Rebound {
        team: TeamSide,
        player_id: PlayerId,
        previous_rebounds: u32,
    },
    /// `in_player_id` came off the bench, `out_player_id` went to it.
    #[serde(rename_all = "camelCase")]
    Substitution {
        team: TeamSide,
        in_player_id: PlayerId,
        out_player_id: PlayerId,
    },
}

impl HistoryAction {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryAction::Score { .. } => HistoryKind::Score,
            HistoryAction::Foul { .. } => HistoryKind::Foul,
            HistoryAction::Rebound { .. } => HistoryKind::Rebound,
            HistoryAction::Substitution { .. } => HistoryKind::Substitution,
        }
    }

    pub fn team(&self) -> TeamSide {
        match self {
            HistoryAction::Score { team, .. }
            | HistoryAction::Foul { team, .. }
            | HistoryAction::Rebound { team, .. }
            | HistoryAction::Substitution { team, .. } => *team,
        }
    }

    /// The action describing a positive stat delta, or `None` when `delta`
    /// is not positive (decrements are never logged).
    ///
    /// `previous` is the player's stat value before the delta is applied.
    pub fn for_stat(
        team: TeamSide,
        player_id: PlayerId,
        stat: StatKind,
        delta: i32,
        previous: u32,
    ) -> Option<Self> {
        if delta <= 0 {
            return None;
        }
        Some(match stat {
            StatKind::Points => HistoryAction::Score {
                team,
                player_id,
                points: delta.unsigned_abs(),
                previous_points: previous,
            },
            StatKind::Fouls => HistoryAction::Foul {
                team,
                player_id,
                previous_fouls: previous,
            },
            StatKind::Rebounds => HistoryAction::Rebound {
                team,
                player_id,
                previous_rebounds: previous,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

/// A recorded action plus audit metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Flattened, so an entry reads `{"type", "data", "quarter", "timestamp"}`.
    #[serde(flatten)]
    pub action: HistoryAction,
    /// Quarter that was selected when the action was recorded.
    pub quarter: u32,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// HistoryLog
// ---------------------------------------------------------------------------

/// FIFO-bounded, LIFO-consumed log of [`HistoryEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_LIMIT + 1),
        }
    }

    /// Append `entry`, evicting and returning the oldest entry when the log
    /// grows past [`HISTORY_LIMIT`].
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_back(entry);
        if self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rebound(n: u32) -> HistoryEntry {
        HistoryEntry {
            action: HistoryAction::Rebound {
                team: TeamSide::Away,
                player_id: PlayerId::new(format!("a{n}")),
                previous_rebounds: n,
            },
            quarter: 1,
            timestamp: Utc.timestamp_millis_opt(i64::from(n)).unwrap(),
        }
    }

    #[test]
    fn thirty_first_entry_evicts_the_first() {
        let mut log = HistoryLog::new();
        for n in 0..HISTORY_LIMIT as u32 {
            assert_eq!(log.push(rebound(n)), None);
        }
        assert_eq!(log.len(), HISTORY_LIMIT);

        let evicted = log.push(rebound(30));
        assert_eq!(evicted, Some(rebound(0)));
        assert_eq!(log.len(), HISTORY_LIMIT);
        assert_eq!(log.iter().next(), Some(&rebound(1)));
        assert_eq!(log.last(), Some(&rebound(30)));
    }

    #[test]
    fn pop_is_last_in_first_out() {
        let mut log = HistoryLog::new();
        log.push(rebound(1));
        log.push(rebound(2));
        assert_eq!(log.pop(), Some(rebound(2)));
        assert_eq!(log.pop(), Some(rebound(1)));
        assert_eq!(log.pop(), None);
        assert!(log.is_empty());
    }

    #[test]
    fn for_stat_only_logs_growth() {
        let id = PlayerId::new("h1");
        assert_eq!(
            HistoryAction::for_stat(TeamSide::Home, id.clone(), StatKind::Points, -2, 4),
            None
        );
        assert_eq!(
            HistoryAction::for_stat(TeamSide::Home, id.clone(), StatKind::Fouls, 0, 4),
            None
        );
        assert_eq!(
            HistoryAction::for_stat(TeamSide::Home, id.clone(), StatKind::Points, 3, 4),
            Some(HistoryAction::Score {
                team: TeamSide::Home,
                player_id: id,
                points: 3,
                previous_points: 4,
            })
        );
    }

    #[test]
    fn actions_serialize_with_type_tag() {
        let action = HistoryAction::Substitution {
            team: TeamSide::Home,
            in_player_id: PlayerId::new("h6"),
            out_player_id: PlayerId::new("h1"),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "SUBSTITUTION",
                "data": {"team": "home", "inPlayerId": "h6", "outPlayerId": "h1"}
            })
        );
        let back: HistoryAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn entry_flattens_action_beside_metadata() {
        let entry = rebound(3);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "REBOUND");
        assert_eq!(json["data"]["previousRebounds"], 3);
        assert_eq!(json["quarter"], 1);
        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
