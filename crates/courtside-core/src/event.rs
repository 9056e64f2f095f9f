//! Change descriptions returned by every mutation.
//!
//! Mutations on [`Game`](crate::game::Game) do not notify anyone or touch
//! storage. They return a [`GameEvent`] describing what changed, and the
//! caller (normally the session orchestrator) decides whether to notify
//! subscribers and when to persist.

use serde::{Deserialize, Serialize};

use crate::game::GameStatus;
use crate::history::{HistoryEntry, HistoryKind};
use crate::ids::{GameId, PlayerId};
use crate::player::StatKind;
use crate::team::TeamSide;

/// Before/after values of one per-quarter team slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterTally {
    /// 1-indexed quarter whose slot changed.
    pub quarter: u32,
    pub before: u32,
    pub after: u32,
}

/// Result of one stat delta.
///
/// The player stat and the coupled team slot are each floored at zero on
/// their own, so the two `after - before` differences can disagree when a
/// clamp kicks in on one side only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatChange {
    pub team: TeamSide,
    pub player_id: PlayerId,
    pub stat: StatKind,
    /// Delta the caller asked for.
    pub requested: i32,
    pub player_before: u32,
    pub player_after: u32,
    /// The coupled quarter slot: `quarterScores` for points, `teamFouls`
    /// for fouls, `None` for rebounds.
    pub team_slot: Option<QuarterTally>,
}

impl StatChange {
    /// Whether either side was floored at zero.
    pub fn was_clamped(&self) -> bool {
        let wanted = i64::from(self.requested);
        let player = i64::from(self.player_after) - i64::from(self.player_before);
        let team = self
            .team_slot
            .map(|t| i64::from(t.after) - i64::from(t.before))
            .unwrap_or(wanted);
        player != wanted || team != wanted
    }
}

/// Something that changed in a [`Game`](crate::game::Game).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A game became the current game (created or loaded).
    GameOpened { game_id: GameId },
    SettingsChanged,
    TeamRenamed { team: TeamSide, name: String },
    RosterChanged { team: TeamSide },
    StatusChanged { from: GameStatus, to: GameStatus },
    QuarterAdvanced { from: u32, to: u32 },
    StatChanged(StatChange),
    Substituted {
        team: TeamSide,
        in_player_id: PlayerId,
        out_player_id: PlayerId,
    },
    Recorded {
        kind: HistoryKind,
        /// Set when recording pushed the oldest entry out of the log.
        evicted: bool,
    },
    Undone {
        entry: HistoryEntry,
        /// The quarter the inverse was applied to. Differs from
        /// `entry.quarter` when the quarter advanced after recording.
        applied_quarter: u32,
    },
}

impl GameEvent {
    /// Whether this undo touched a different quarter than the one the action
    /// was recorded in.
    pub fn is_cross_quarter_undo(&self) -> bool {
        matches!(
            self,
            GameEvent::Undone { entry, applied_quarter } if entry.quarter != *applied_quarter
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(requested: i32, player: (u32, u32), slot: Option<(u32, u32)>) -> StatChange {
        StatChange {
            team: TeamSide::Home,
            player_id: PlayerId::new("h1"),
            stat: StatKind::Points,
            requested,
            player_before: player.0,
            player_after: player.1,
            team_slot: slot.map(|(before, after)| QuarterTally {
                quarter: 1,
                before,
                after,
            }),
        }
    }

    #[test]
    fn unclamped_change_is_reported_clean() {
        assert!(!change(2, (0, 2), Some((3, 5))).was_clamped());
        assert!(!change(-1, (1, 0), None).was_clamped());
    }

    #[test]
    fn either_side_clamping_is_detected() {
        assert!(change(-3, (2, 0), Some((5, 2))).was_clamped());
        assert!(change(-3, (5, 2), Some((1, 0))).was_clamped());
    }
}
