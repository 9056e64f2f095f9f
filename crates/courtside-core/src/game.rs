//! The [`Game`] root aggregate and its lifecycle.
//!
//! A game moves `setup -> in_progress -> finished` and never backward.
//! Settings are editable only during setup. Roster edits belong to the lineup
//! flow; stat entry, substitution, quarter advance and undo require
//! `in_progress`. A finished game rejects every mutation.
//!
//! Field access is read-only from outside the crate. All writes go through
//! the methods here and in [`mutation`](crate::mutation) and
//! [`undo`](crate::undo).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::event::GameEvent;
use crate::history::{HistoryLog, HISTORY_LIMIT};
use crate::ids::{GameId, IdGenerator, PlayerId};
use crate::player::{create_player, Player};
use crate::settings::{GameSettings, MAX_ON_COURT, MAX_ROSTER_SIZE};
use crate::team::{BulkEnrollReport, Team, TeamSide, Teams};
use crate::CoreError;

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Setup,
    InProgress,
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameStatus::Setup => "setup",
            GameStatus::InProgress => "in_progress",
            GameStatus::Finished => "finished",
        })
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// One match from setup to the final whistle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    id: GameId,
    status: GameStatus,
    settings: GameSettings,
    current_quarter: u32,
    teams: Teams,
    history: HistoryLog,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Game {
    /// Create a game in `setup` with empty rosters and zero-filled quarter
    /// arrays sized by `settings.quarters`.
    pub fn create(
        settings: GameSettings,
        ids: &mut IdGenerator,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let game = Self::blank(settings, ids, now);
        info!(game_id = %game.id, quarters = settings.quarters, "game created");
        Ok(game)
    }

    /// A fresh game from settings the caller has already validated.
    pub(crate) fn blank(settings: GameSettings, ids: &mut IdGenerator, now: DateTime<Utc>) -> Self {
        Self {
            id: ids.game_id(now),
            status: GameStatus::Setup,
            settings,
            current_quarter: 1,
            teams: Teams::new(settings.quarter_slots()),
            history: HistoryLog::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // -- read access --------------------------------------------------------

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// 1-indexed quarter currently being played.
    pub fn current_quarter(&self) -> u32 {
        self.current_quarter
    }

    /// 0-based index of the current quarter in the per-quarter arrays.
    pub fn quarter_index(&self) -> usize {
        self.current_quarter.saturating_sub(1) as usize
    }

    pub fn is_final_quarter(&self) -> bool {
        self.current_quarter >= self.settings.quarters
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        self.teams.get(side)
    }

    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn player(&self, side: TeamSide, id: &PlayerId) -> Option<&Player> {
        self.team(side).player(id)
    }

    // -- crate-internal write access ---------------------------------------

    pub(crate) fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        self.teams.get_mut(side)
    }

    pub(crate) fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    /// Bump `updated_at`, never moving it backward.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    pub(crate) fn ensure_status(&self, required: GameStatus) -> Result<(), CoreError> {
        if self.status != required {
            return Err(CoreError::InvalidStatus {
                status: self.status,
                required,
            });
        }
        Ok(())
    }

    pub(crate) fn ensure_not_finished(&self) -> Result<(), CoreError> {
        if self.status == GameStatus::Finished {
            return Err(CoreError::GameFinished);
        }
        Ok(())
    }

    pub(crate) fn force_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    pub(crate) fn set_current_quarter(&mut self, quarter: u32) {
        self.current_quarter = quarter;
    }

    // -- lifecycle ----------------------------------------------------------

    /// Replace the settings while still in setup. The per-quarter arrays are
    /// re-sized to the new quarter count.
    pub fn update_settings(
        &mut self,
        settings: GameSettings,
        now: DateTime<Utc>,
    ) -> Result<GameEvent, CoreError> {
        self.ensure_status(GameStatus::Setup)?;
        settings.validate()?;
        self.settings = settings;
        for side in TeamSide::BOTH {
            self.team_mut(side).resize_quarters(settings.quarter_slots());
        }
        self.touch(now);
        Ok(GameEvent::SettingsChanged)
    }

    /// `setup -> in_progress`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<GameEvent, CoreError> {
        self.transition(GameStatus::InProgress, now)
    }

    /// `in_progress -> finished`.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<GameEvent, CoreError> {
        self.transition(GameStatus::Finished, now)
    }

    fn transition(&mut self, to: GameStatus, now: DateTime<Utc>) -> Result<GameEvent, CoreError> {
        let from = self.status;
        let allowed = matches!(
            (from, to),
            (GameStatus::Setup, GameStatus::InProgress) | (GameStatus::InProgress, GameStatus::Finished)
        );
        if !allowed {
            return Err(CoreError::InvalidTransition { from, to });
        }
        self.status = to;
        self.touch(now);
        info!(game_id = %self.id, %from, %to, "game status changed");
        Ok(GameEvent::StatusChanged { from, to })
    }

    // -- roster (lineup flow) ----------------------------------------------

    pub fn rename_team(
        &mut self,
        side: TeamSide,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<GameEvent, CoreError> {
        self.ensure_not_finished()?;
        let team = self.team_mut(side);
        team.rename(side, name);
        let name = team.name().to_owned();
        self.touch(now);
        Ok(GameEvent::TeamRenamed { team: side, name })
    }

    /// Create a player from operator input and enroll them.
    ///
    /// Allowed until the game finishes so a late arrival can join the bench.
    pub fn enroll(
        &mut self,
        side: TeamSide,
        number: &str,
        name: &str,
        ids: &mut IdGenerator,
        now: DateTime<Utc>,
    ) -> Result<PlayerId, CoreError> {
        self.ensure_not_finished()?;
        let player = create_player(number, name, ids, now)?;
        let id = self.team_mut(side).enroll(player)?;
        self.touch(now);
        Ok(id)
    }

    pub fn enroll_bulk(
        &mut self,
        side: TeamSide,
        text: &str,
        ids: &mut IdGenerator,
        now: DateTime<Utc>,
    ) -> Result<BulkEnrollReport, CoreError> {
        self.ensure_not_finished()?;
        let report = self.team_mut(side).enroll_bulk(text, ids, now);
        if !report.added.is_empty() {
            self.touch(now);
        }
        Ok(report)
    }

    /// Flip a player between starter and bench. Setup only.
    pub fn toggle_starter(
        &mut self,
        side: TeamSide,
        id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        self.ensure_status(GameStatus::Setup)?;
        let on_court = self.team_mut(side).toggle_starter(id)?;
        self.touch(now);
        Ok(on_court)
    }

    /// Drop a player from the roster. Setup only, so no recorded history can
    /// refer to them.
    pub fn remove_player(
        &mut self,
        side: TeamSide,
        id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Player, CoreError> {
        self.ensure_status(GameStatus::Setup)?;
        let player = self.team_mut(side).remove_player(id)?;
        self.touch(now);
        Ok(player)
    }

    // -- validation ---------------------------------------------------------

    /// Check every structural invariant. Used to reject corrupt saved data.
    pub fn validate(&self) -> Result<(), CoreError> {
        let broken = |detail: String| CoreError::Corrupt {
            game_id: self.id.clone(),
            detail,
        };

        self.settings.validate()?;
        if self.current_quarter < 1 || self.current_quarter > self.settings.quarters {
            return Err(broken(format!(
                "current quarter {} outside 1..={}",
                self.current_quarter, self.settings.quarters
            )));
        }
        if self.history.len() > HISTORY_LIMIT {
            return Err(broken(format!(
                "history holds {} entries (limit {HISTORY_LIMIT})",
                self.history.len()
            )));
        }
        if self.updated_at < self.created_at {
            return Err(broken("updatedAt precedes createdAt".to_owned()));
        }

        for (side, team) in self.teams.iter() {
            let slots = self.settings.quarter_slots();
            if team.quarter_scores().len() != slots || team.team_fouls().len() != slots {
                return Err(broken(format!("{side} quarter arrays are not {slots} long")));
            }
            if team.players().len() > MAX_ROSTER_SIZE {
                return Err(broken(format!("{side} roster exceeds {MAX_ROSTER_SIZE}")));
            }
            if team.on_court_count() > MAX_ON_COURT {
                return Err(broken(format!("{side} has more than {MAX_ON_COURT} on court")));
            }
            for (i, player) in team.players().iter().enumerate() {
                let rest = &team.players()[i + 1..];
                if rest.iter().any(|p| p.id() == player.id()) {
                    return Err(broken(format!("{side} repeats player id {}", player.id())));
                }
                if rest.iter().any(|p| p.number() == player.number()) {
                    return Err(broken(format!("{side} repeats number {}", player.number())));
                }
            }
        }
        Ok(())
    }
}
