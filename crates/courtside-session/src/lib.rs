//! Courtside session -- the scorekeeping session object an application owns.
//!
//! [`SessionStore`] holds the current [`Game`](courtside_core::game::Game),
//! the storage repository, a clock, an id generator and the change
//! listeners. Every mutation runs in two phases:
//!
//! 1. the game is changed in memory, producing one or more
//!    [`GameEvent`](courtside_core::event::GameEvent)s (or an error, in which
//!    case nothing changed);
//! 2. listeners are notified and the game is flushed according to the
//!    [`FlushPolicy`].
//!
//! A failed flush is reported on the returned [`Outcome`] and never rolls
//! back phase 1.
//!
//! # Quick Start
//!
//! ```
//! use courtside_core::prelude::*;
//! use courtside_session::prelude::*;
//! use courtside_store::MemoryStore;
//!
//! let mut session = SessionStore::new(MemoryStore::new(), SystemClock);
//! session.create_game(GameSettings::default()).unwrap();
//! let p = session.add_player(TeamSide::Home, "23", "Park").unwrap().value;
//! session.start_game().unwrap();
//!
//! let outcome = session.commit_stat(TeamSide::Home, &p, StatKind::Points, 2).unwrap();
//! assert!(matches!(outcome.flush, FlushStatus::Saved));
//! assert_eq!(session.team_total_score(TeamSide::Home), 2);
//! assert_eq!(session.saved_games().len(), 1);
//! ```

#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod outcome;
pub mod store;
pub mod subscribers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FlushPolicy, SessionConfig};
pub use outcome::{FlushStatus, Outcome};
pub use store::SessionStore;
pub use subscribers::{Listener, SubscriptionId};

use courtside_core::ids::GameId;
use courtside_core::player::StatKind;
use courtside_core::CoreError;
use courtside_store::PersistenceError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation needs a current game and there is none.
    #[error("no current game")]
    NoCurrentGame,

    #[error("game {game_id} not found in saved games")]
    GameNotFound { game_id: GameId },

    /// A stat entry would drive the value below zero.
    #[error("{stat} would go negative: {current} {delta:+}")]
    NegativeStat {
        stat: StatKind,
        current: u32,
        delta: i32,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A direct storage operation (settings, theme, delete) failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{FlushPolicy, SessionConfig};
    pub use crate::outcome::{FlushStatus, Outcome};
    pub use crate::store::SessionStore;
    pub use crate::subscribers::{Listener, SubscriptionId};
    pub use crate::SessionError;
}
