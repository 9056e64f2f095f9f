//! Opaque identifiers for games and players.
//!
//! Ids are assigned once at creation and never reassigned. They embed the
//! creation time in milliseconds plus a short random suffix so two games
//! created within the same millisecond still receive distinct ids.
//!
//! Randomness comes from an [`IdGenerator`] wrapping a PCG stream. Seed it
//! explicitly with [`IdGenerator::from_seed`] for reproducible tests.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Stable identifier of a [`Game`](crate::game::Game).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wrap an existing id string (e.g. one read back from storage).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Identifier of a [`Player`](crate::player::Player), unique within its team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an existing id string (e.g. one read back from storage).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ---------------------------------------------------------------------------
// IdGenerator
// ---------------------------------------------------------------------------

/// Produces fresh [`GameId`]s and [`PlayerId`]s.
///
/// Uses a PCG generator so a seeded generator yields the same id sequence on
/// every run.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: Pcg64,
}

impl IdGenerator {
    /// A generator seeded from the thread RNG.
    pub fn new() -> Self {
        Self::from_seed(rand::random())
    }

    /// A deterministic generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// `game_<millis>_<6 chars>`.
    pub fn game_id(&mut self, now: DateTime<Utc>) -> GameId {
        let suffix = self.suffix(6);
        GameId(format!("game_{}_{suffix}", now.timestamp_millis()))
    }

    /// `p_<millis>_<9 chars>`.
    pub fn player_id(&mut self, now: DateTime<Utc>) -> PlayerId {
        let suffix = self.suffix(9);
        PlayerId(format!("p_{}_{suffix}", now.timestamp_millis()))
    }

    fn suffix(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let idx = self.rng.gen_range(0..SUFFIX_ALPHABET.len());
                SUFFIX_ALPHABET[idx] as char
            })
            .collect()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
