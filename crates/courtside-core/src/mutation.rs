//! The mutation layer: the only path that changes player stats, court
//! placement, per-quarter team arrays and the current quarter.
//!
//! # Coupling rules
//!
//! A stat delta on a player also moves a team-level slot for the current
//! quarter:
//!
//! | stat       | coupled slot                         |
//! |------------|--------------------------------------|
//! | `points`   | `quarter_scores[current_quarter - 1]` |
//! | `fouls`    | `team_fouls[current_quarter - 1]`     |
//! | `rebounds` | none                                 |
//!
//! Both the player stat and the coupled slot are floored at zero
//! independently: `max(0, current + delta)`. Truncation is not an error; the
//! returned [`StatChange`] carries before/after values for both sides so a
//! caller can see it.
//!
//! Recording into the history log is a separate step
//! ([`Game::record`]), taken only for growth.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::event::{GameEvent, QuarterTally, StatChange};
use crate::game::{Game, GameStatus};
use crate::history::{HistoryAction, HistoryEntry};
use crate::ids::PlayerId;
use crate::player::StatKind;
use crate::team::TeamSide;
use crate::CoreError;

/// `max(0, current + delta)`, saturating at `u32::MAX`.
pub(crate) fn floor_add(current: u32, delta: i32) -> u32 {
    let sum = i64::from(current) + i64::from(delta);
    sum.clamp(0, i64::from(u32::MAX)) as u32
}

impl Game {
    /// Apply `delta` to one player stat and its coupled team slot.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidStatus`] / [`CoreError::GameFinished`] unless
    ///   the game is in progress.
    /// - [`CoreError::PlayerNotFound`] if `player_id` is not on `side`'s
    ///   roster. Nothing changes in that case.
    pub fn apply_stat_delta(
        &mut self,
        side: TeamSide,
        player_id: &PlayerId,
        stat: StatKind,
        delta: i32,
        now: DateTime<Utc>,
    ) -> Result<GameEvent, CoreError> {
        self.ensure_in_progress()?;
        let change = self.adjust_stat(side, player_id, stat, delta)?;
        self.touch(now);
        debug!(
            game_id = %self.id(),
            %side,
            player_id = %player_id,
            %stat,
            delta,
            after = change.player_after,
            "stat applied"
        );
        Ok(GameEvent::StatChanged(change))
    }

    /// Coupled stat update without status checks or timestamping.
    pub(crate) fn adjust_stat(
        &mut self,
        side: TeamSide,
        player_id: &PlayerId,
        stat: StatKind,
        delta: i32,
    ) -> Result<StatChange, CoreError> {
        let quarter = self.current_quarter();
        let idx = self.quarter_index();
        let team = self.team_mut(side);

        let player = team
            .player_mut(player_id)
            .ok_or_else(|| CoreError::PlayerNotFound {
                player_id: player_id.clone(),
            })?;
        let slot = player.stats_mut().get_mut(stat);
        let player_before = *slot;
        *slot = floor_add(player_before, delta);
        let player_after = *slot;

        let array = match stat {
            StatKind::Points => Some(team.quarter_scores_mut()),
            StatKind::Fouls => Some(team.team_fouls_mut()),
            StatKind::Rebounds => None,
        };
        let team_slot = array.map(|slots| {
            let before = slots[idx];
            slots[idx] = floor_add(before, delta);
            QuarterTally {
                quarter,
                before,
                after: slots[idx],
            }
        });

        Ok(StatChange {
            team: side,
            player_id: player_id.clone(),
            stat,
            requested: delta,
            player_before,
            player_after,
            team_slot,
        })
    }

    /// Bring `in_id` off the bench and send `out_id` to it.
    ///
    /// `in_id` must be on the bench and `out_id` on court, which keeps the
    /// on-court count unchanged.
    pub fn substitute(
        &mut self,
        side: TeamSide,
        in_id: &PlayerId,
        out_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<GameEvent, CoreError> {
        self.ensure_in_progress()?;
        if in_id == out_id {
            return Err(CoreError::SamePlayerSubstitution {
                player_id: in_id.clone(),
            });
        }

        let team = self.team(side);
        let incoming = team.player(in_id).ok_or_else(|| CoreError::PlayerNotFound {
            player_id: in_id.clone(),
        })?;
        let outgoing = team.player(out_id).ok_or_else(|| CoreError::PlayerNotFound {
            player_id: out_id.clone(),
        })?;
        if incoming.is_on_court() {
            return Err(CoreError::InvalidSubstitution {
                player_id: in_id.clone(),
                detail: "is already on court",
            });
        }
        if !outgoing.is_on_court() {
            return Err(CoreError::InvalidSubstitution {
                player_id: out_id.clone(),
                detail: "is not on court",
            });
        }

        self.swap_placement(side, in_id, out_id);
        self.touch(now);
        debug!(game_id = %self.id(), %side, in_id = %in_id, out_id = %out_id, "substitution");
        Ok(GameEvent::Substituted {
            team: side,
            in_player_id: in_id.clone(),
            out_player_id: out_id.clone(),
        })
    }

    /// Put `on_id` on court and `off_id` on the bench. Missing ids are skipped.
    pub(crate) fn swap_placement(&mut self, side: TeamSide, on_id: &PlayerId, off_id: &PlayerId) {
        let team = self.team_mut(side);
        if let Some(p) = team.player_mut(on_id) {
            p.set_on_court(true);
        }
        if let Some(p) = team.player_mut(off_id) {
            p.set_on_court(false);
        }
    }

    /// Move to the next quarter.
    ///
    /// Team fouls are not zeroed: each quarter has its own slot, so the new
    /// quarter starts from whatever that slot holds (zero for a fresh game).
    ///
    /// # Errors
    ///
    /// [`CoreError::FinalQuarter`] when already in the last quarter; the
    /// caller should [`finish`](Game::finish) the game instead.
    pub fn advance_quarter(&mut self, now: DateTime<Utc>) -> Result<GameEvent, CoreError> {
        self.ensure_in_progress()?;
        if self.is_final_quarter() {
            return Err(CoreError::FinalQuarter {
                quarters: self.settings().quarters,
            });
        }
        let from = self.current_quarter();
        let to = from + 1;
        self.set_current_quarter(to);
        self.touch(now);
        info!(game_id = %self.id(), from, to, "quarter advanced");
        Ok(GameEvent::QuarterAdvanced { from, to })
    }

    /// Close the current quarter: advance, or finish the game after the last
    /// quarter.
    pub fn end_quarter(&mut self, now: DateTime<Utc>) -> Result<GameEvent, CoreError> {
        self.ensure_in_progress()?;
        if self.is_final_quarter() {
            self.finish(now)
        } else {
            self.advance_quarter(now)
        }
    }

    /// Append an action to the history log, stamped with the current quarter
    /// and `now`. The oldest entry is evicted past the log limit.
    pub fn record(
        &mut self,
        action: HistoryAction,
        now: DateTime<Utc>,
    ) -> Result<GameEvent, CoreError> {
        self.ensure_in_progress()?;
        let kind = action.kind();
        let entry = HistoryEntry {
            action,
            quarter: self.current_quarter(),
            timestamp: now,
        };
        let evicted = self.history_mut().push(entry).is_some();
        self.touch(now);
        debug!(game_id = %self.id(), ?kind, evicted, "history recorded");
        Ok(GameEvent::Recorded { kind, evicted })
    }

    pub(crate) fn ensure_in_progress(&self) -> Result<(), CoreError> {
        self.ensure_not_finished()?;
        self.ensure_status(GameStatus::InProgress)
    }
}
