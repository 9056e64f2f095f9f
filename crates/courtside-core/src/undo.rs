//! Undo engine: pop the newest [`HistoryEntry`] and apply its inverse.
//!
//! | entry          | inverse                                                   |
//! |----------------|-----------------------------------------------------------|
//! | `SCORE`        | coupled points delta of `-points` (player + quarter slot) |
//! | `FOUL`         | player fouls `-1`, then team fouls slot `-1` directly      |
//! | `REBOUND`      | player rebounds `-1`                                      |
//! | `SUBSTITUTION` | incoming player back to the bench, outgoing back on court |
//!
//! Inverses target the quarter selected *now*, not the quarter stored in the
//! entry. When the two differ the inverse lands in the wrong quarter's slot;
//! this is reported on the returned event and logged, but not corrected.
//!
//! An entry whose player has since left the roster is still consumed; the
//! missing half of its inverse is skipped with a warning.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::event::GameEvent;
use crate::game::Game;
use crate::history::{HistoryAction, HistoryEntry};
use crate::ids::PlayerId;
use crate::player::StatKind;
use crate::team::TeamSide;
use crate::CoreError;

impl Game {
    /// Undo the most recent history entry.
    ///
    /// Returns `Ok(None)` without touching the game when the history is empty.
    /// Each call undoes one entry; repeated calls walk further back. There is
    /// no redo.
    pub fn undo_last(&mut self, now: DateTime<Utc>) -> Result<Option<GameEvent>, CoreError> {
        self.ensure_in_progress()?;
        let Some(entry) = self.history_mut().pop() else {
            return Ok(None);
        };

        let applied_quarter = self.current_quarter();
        if entry.quarter != applied_quarter {
            warn!(
                game_id = %self.id(),
                kind = ?entry.action.kind(),
                recorded_quarter = entry.quarter,
                applied_quarter,
                "undo applied to a different quarter than the action was recorded in"
            );
        }

        self.apply_inverse(&entry);
        self.touch(now);
        debug!(game_id = %self.id(), kind = ?entry.action.kind(), "undo applied");

        Ok(Some(GameEvent::Undone {
            entry,
            applied_quarter,
        }))
    }

    fn apply_inverse(&mut self, entry: &HistoryEntry) {
        match &entry.action {
            HistoryAction::Score {
                team,
                player_id,
                points,
                ..
            } => {
                let delta = i32::try_from(*points).map_or(i32::MIN, |p| -p);
                self.inverse_stat(*team, player_id, StatKind::Points, delta);
            }
            HistoryAction::Foul {
                team, player_id, ..
            } => {
                self.inverse_player_only(*team, player_id, StatKind::Fouls);
                let idx = self.quarter_index();
                let slot = &mut self.team_mut(*team).team_fouls_mut()[idx];
                *slot = slot.saturating_sub(1);
            }
            HistoryAction::Rebound {
                team, player_id, ..
            } => {
                self.inverse_stat(*team, player_id, StatKind::Rebounds, -1);
            }
            HistoryAction::Substitution {
                team,
                in_player_id,
                out_player_id,
            } => self.inverse_substitution(*team, in_player_id, out_player_id),
        }
    }

    fn inverse_stat(&mut self, side: TeamSide, player_id: &PlayerId, stat: StatKind, delta: i32) {
        if self.adjust_stat(side, player_id, stat, delta).is_err() {
            warn!(%side, player_id = %player_id, %stat, "undo target player is gone; skipped");
        }
    }

    /// Decrement a player stat by one without the coupled team update.
    fn inverse_player_only(&mut self, side: TeamSide, player_id: &PlayerId, stat: StatKind) {
        match self.team_mut(side).player_mut(player_id) {
            Some(player) => {
                let value = player.stats_mut().get_mut(stat);
                *value = value.saturating_sub(1);
            }
            None => {
                warn!(%side, player_id = %player_id, %stat, "undo target player is gone; skipped");
            }
        }
    }

    fn inverse_substitution(&mut self, side: TeamSide, in_id: &PlayerId, out_id: &PlayerId) {
        let team = self.team(side);
        let incoming_on = team.player(in_id).map(|p| p.is_on_court());
        let outgoing_on = team.player(out_id).map(|p| p.is_on_court());

        // Swap back only from the exact placement the substitution produced,
        // so the on-court count cannot grow.
        if incoming_on == Some(true) && outgoing_on == Some(false) {
            self.swap_placement(side, out_id, in_id);
        } else {
            warn!(
                %side,
                in_id = %in_id,
                out_id = %out_id,
                ?incoming_on,
                ?outgoing_on,
                "placement changed since the substitution; undo left it as is"
            );
        }
    }
}
