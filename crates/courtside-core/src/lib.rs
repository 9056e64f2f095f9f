//! Courtside core -- entity model, mutation rules and undo for a basketball
//! scorekeeping session.
//!
//! A [`Game`](game::Game) owns two teams, their per-quarter score and
//! team-foul arrays, every player's stats, and a bounded history of
//! undoable actions. All state changes go through methods on `Game` that
//! return a [`GameEvent`](event::GameEvent) describing what changed. Nothing
//! in this crate notifies listeners or touches storage; that is the job of
//! the session layer.
//!
//! # Quick Start
//!
//! ```
//! use chrono::Utc;
//! use courtside_core::prelude::*;
//!
//! let mut ids = IdGenerator::from_seed(7);
//! let now = Utc::now();
//! let mut game = Game::create(GameSettings::default(), &mut ids, now).unwrap();
//! let player = game.enroll(TeamSide::Home, "23", "Park", &mut ids, now).unwrap();
//! game.start(now).unwrap();
//!
//! game.apply_stat_delta(TeamSide::Home, &player, StatKind::Points, 3, now).unwrap();
//! assert_eq!(game.team_total_score(TeamSide::Home), 3);
//! ```

#![deny(unsafe_code)]

pub mod demo;
pub mod event;
pub mod game;
pub mod history;
pub mod ids;
pub mod mutation;
pub mod player;
pub mod query;
pub mod settings;
pub mod team;
pub mod undo;

use game::GameStatus;
use ids::{GameId, PlayerId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by game operations.
///
/// A failed operation leaves the game exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A settings field is outside its allowed range.
    #[error("setting '{field}' must be at least 1, got {value}")]
    InvalidSettings { field: &'static str, value: u32 },

    #[error("player number '{input}' is not a non-negative integer")]
    InvalidPlayerNumber { input: String },

    #[error("player name must not be blank")]
    EmptyPlayerName,

    #[error("number {number} is already taken on this team")]
    DuplicateNumber { number: u32 },

    #[error("player id {player_id} is already on this team")]
    DuplicatePlayerId { player_id: PlayerId },

    #[error("roster is full ({limit} players)")]
    RosterFull { limit: usize },

    #[error("court is full ({limit} players)")]
    CourtFull { limit: usize },

    #[error("player {player_id} is not on this team")]
    PlayerNotFound { player_id: PlayerId },

    #[error("player {player_id} cannot be substituted for themselves")]
    SamePlayerSubstitution { player_id: PlayerId },

    #[error("invalid substitution: player {player_id} {detail}")]
    InvalidSubstitution {
        player_id: PlayerId,
        detail: &'static str,
    },

    /// The operation needs the game in another status.
    #[error("game is {status}, operation requires {required}")]
    InvalidStatus {
        status: GameStatus,
        required: GameStatus,
    },

    #[error("game is finished")]
    GameFinished,

    #[error("cannot move game from {from} to {to}")]
    InvalidTransition { from: GameStatus, to: GameStatus },

    /// Already in the last quarter; finish the game instead.
    #[error("already in the final quarter ({quarters})")]
    FinalQuarter { quarters: u32 },

    /// A deserialized game breaks a structural invariant.
    #[error("game {game_id} is corrupt: {detail}")]
    Corrupt { game_id: GameId, detail: String },
}

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input or broken data.
    Validation,
    /// A referenced player does not exist.
    NotFound,
    /// The game's status or quarter does not allow the operation.
    State,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidSettings { .. }
            | CoreError::InvalidPlayerNumber { .. }
            | CoreError::EmptyPlayerName
            | CoreError::DuplicateNumber { .. }
            | CoreError::DuplicatePlayerId { .. }
            | CoreError::RosterFull { .. }
            | CoreError::CourtFull { .. }
            | CoreError::SamePlayerSubstitution { .. }
            | CoreError::InvalidSubstitution { .. }
            | CoreError::Corrupt { .. } => ErrorKind::Validation,
            CoreError::PlayerNotFound { .. } => ErrorKind::NotFound,
            CoreError::InvalidStatus { .. }
            | CoreError::GameFinished
            | CoreError::InvalidTransition { .. }
            | CoreError::FinalQuarter { .. } => ErrorKind::State,
        }
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::demo::demo_game;
    pub use crate::event::{GameEvent, QuarterTally, StatChange};
    pub use crate::game::{Game, GameStatus};
    pub use crate::history::{HistoryAction, HistoryEntry, HistoryKind, HistoryLog, HISTORY_LIMIT};
    pub use crate::ids::{GameId, IdGenerator, PlayerId};
    pub use crate::player::{create_player, parse_player_number, Player, PlayerStats, StatKind};
    pub use crate::query::{
        current_quarter_team_fouls, foul_status, game_result, team_total_score, FoulStatus,
        GameResult, GameSummary, TeamSummary,
    };
    pub use crate::settings::{GameSettings, MAX_ON_COURT, MAX_ROSTER_SIZE};
    pub use crate::team::{BulkEnrollReport, SkipReason, SkippedLine, Team, TeamSide, Teams};
    pub use crate::{CoreError, ErrorKind};
}
