//! Teams, their per-quarter tallies, and roster (lineup) rules.
//!
//! A [`Team`] owns two fixed-length per-quarter arrays: `quarter_scores` and
//! `team_fouls`. Index `i` holds the tally for quarter `i + 1`. The team total
//! is never stored; it is recomputed from `quarter_scores` on every read.
//!
//! Roster rules enforced here:
//!
//! - jersey numbers are unique within a team,
//! - at most [`MAX_ROSTER_SIZE`] players are enrolled,
//! - at most [`MAX_ON_COURT`] players are on court.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{IdGenerator, PlayerId};
use crate::player::{create_player, Player};
use crate::settings::{MAX_ON_COURT, MAX_ROSTER_SIZE};
use crate::CoreError;

// ---------------------------------------------------------------------------
// TeamSide
// ---------------------------------------------------------------------------

/// Which of the two teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// Name a freshly created team carries.
    pub fn default_name(self) -> &'static str {
        match self {
            TeamSide::Home => "Home",
            TeamSide::Away => "Away",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        })
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    name: String,
    quarter_scores: Vec<u32>,
    team_fouls: Vec<u32>,
    players: Vec<Player>,
}

impl Team {
    pub(crate) fn new(name: impl Into<String>, quarters: usize) -> Self {
        Self {
            name: name.into(),
            quarter_scores: vec![0; quarters],
            team_fouls: vec![0; quarters],
            players: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Points per quarter, index `i` = quarter `i + 1`.
    pub fn quarter_scores(&self) -> &[u32] {
        &self.quarter_scores
    }

    /// Committed team fouls per quarter, index `i` = quarter `i + 1`.
    pub fn team_fouls(&self) -> &[u32] {
        &self.team_fouls
    }

    /// Players in roster (insertion) order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn player_by_number(&self, number: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.number() == number)
    }

    pub fn on_court_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_on_court()).count()
    }

    pub(crate) fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    pub(crate) fn quarter_scores_mut(&mut self) -> &mut [u32] {
        &mut self.quarter_scores
    }

    pub(crate) fn team_fouls_mut(&mut self) -> &mut [u32] {
        &mut self.team_fouls
    }

    pub(crate) fn resize_quarters(&mut self, quarters: usize) {
        self.quarter_scores.resize(quarters, 0);
        self.team_fouls.resize(quarters, 0);
    }

    pub(crate) fn push_player_unchecked(&mut self, player: Player) {
        self.players.push(player);
    }

    // -- roster rules -------------------------------------------------------

    /// A blank name falls back to the side's default name.
    pub(crate) fn rename(&mut self, side: TeamSide, name: &str) {
        let name = name.trim();
        self.name = if name.is_empty() {
            side.default_name().to_owned()
        } else {
            name.to_owned()
        };
    }

    /// Add a player to the roster.
    ///
    /// The player is placed on court automatically while fewer than
    /// [`MAX_ON_COURT`] teammates are on court.
    pub(crate) fn enroll(&mut self, mut player: Player) -> Result<PlayerId, CoreError> {
        if self.player_by_number(player.number()).is_some() {
            return Err(CoreError::DuplicateNumber {
                number: player.number(),
            });
        }
        if self.players.len() >= MAX_ROSTER_SIZE {
            return Err(CoreError::RosterFull {
                limit: MAX_ROSTER_SIZE,
            });
        }
        if self.player(player.id()).is_some() {
            return Err(CoreError::DuplicatePlayerId {
                player_id: player.id().clone(),
            });
        }
        player.set_on_court(self.on_court_count() < MAX_ON_COURT);
        let id = player.id().clone();
        self.players.push(player);
        Ok(id)
    }

    /// Enroll one player per line of `text`.
    ///
    /// Lines look like `"23 Jordan"` or `"23Jordan"`. Blank lines are ignored.
    /// Every other line either adds a player or lands in the report's skip
    /// list with a reason; a bad line never aborts the rest of the batch.
    pub(crate) fn enroll_bulk(
        &mut self,
        text: &str,
        ids: &mut IdGenerator,
        now: DateTime<Utc>,
    ) -> BulkEnrollReport {
        let mut report = BulkEnrollReport::default();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let Some((number, name)) = split_roster_line(line) else {
                report.skipped.push(SkippedLine {
                    line: line.to_owned(),
                    reason: SkipReason::Malformed,
                });
                continue;
            };

            let outcome = create_player(number, name, ids, now).and_then(|p| self.enroll(p));
            match outcome {
                Ok(id) => report.added.push(id),
                Err(err) => {
                    let reason = match err {
                        CoreError::DuplicateNumber { number } => SkipReason::DuplicateNumber { number },
                        CoreError::RosterFull { .. } => SkipReason::RosterFull,
                        _ => SkipReason::Malformed,
                    };
                    report.skipped.push(SkippedLine {
                        line: line.to_owned(),
                        reason,
                    });
                }
            }
        }

        report
    }

    /// Flip a player between starter and bench during lineup entry.
    ///
    /// Returns the new placement.
    pub(crate) fn toggle_starter(&mut self, id: &PlayerId) -> Result<bool, CoreError> {
        let on_court = self.on_court_count();
        let player = self
            .player_mut(id)
            .ok_or_else(|| CoreError::PlayerNotFound {
                player_id: id.clone(),
            })?;
        if player.is_on_court() {
            player.set_on_court(false);
            return Ok(false);
        }
        if on_court >= MAX_ON_COURT {
            return Err(CoreError::CourtFull {
                limit: MAX_ON_COURT,
            });
        }
        player.set_on_court(true);
        Ok(true)
    }

    pub(crate) fn remove_player(&mut self, id: &PlayerId) -> Result<Player, CoreError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| CoreError::PlayerNotFound {
                player_id: id.clone(),
            })?;
        Ok(self.players.remove(idx))
    }
}

/// Split `"23 Jordan"` / `"23Jordan"` into `("23", "Jordan")`.
fn split_roster_line(line: &str) -> Option<(&str, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (number, rest) = line.split_at(digits);
    let name = rest.trim();
    if name.is_empty() {
        return None;
    }
    Some((number, name))
}

// ---------------------------------------------------------------------------
// Bulk enrollment report
// ---------------------------------------------------------------------------

/// Why a bulk roster line was not enrolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    DuplicateNumber { number: u32 },
    RosterFull,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line: String,
    pub reason: SkipReason,
}

/// Result of [`Game::enroll_bulk`](crate::game::Game::enroll_bulk).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEnrollReport {
    /// Ids of the enrolled players, in line order.
    pub added: Vec<PlayerId>,
    pub skipped: Vec<SkippedLine>,
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Exactly two teams, keyed `home` and `away`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    home: Team,
    away: Team,
}

impl Teams {
    pub(crate) fn new(quarters: usize) -> Self {
        Self {
            home: Team::new(TeamSide::Home.default_name(), quarters),
            away: Team::new(TeamSide::Away.default_name(), quarters),
        }
    }

    pub fn get(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub(crate) fn get_mut(&mut self, side: TeamSide) -> &mut Team {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamSide, &Team)> {
        TeamSide::BOTH.into_iter().map(move |side| (side, self.get(side)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(10).unwrap()
    }

    fn player(ids: &mut IdGenerator, number: u32) -> Player {
        create_player(&number.to_string(), &format!("P{number}"), ids, now()).unwrap()
    }

    #[test]
    fn first_five_enrolled_start_on_court() {
        let mut ids = IdGenerator::from_seed(1);
        let mut team = Team::new("Home", 4);
        for n in 1..=7 {
            team.enroll(player(&mut ids, n)).unwrap();
        }
        assert_eq!(team.on_court_count(), 5);
        assert!(team.players()[4].is_on_court());
        assert!(!team.players()[5].is_on_court());
        assert!(!team.players()[6].is_on_court());
    }

    #[test]
    fn duplicate_number_is_rejected() {
        let mut ids = IdGenerator::from_seed(1);
        let mut team = Team::new("Home", 4);
        team.enroll(player(&mut ids, 7)).unwrap();
        let err = team.enroll(player(&mut ids, 7)).unwrap_err();
        assert_eq!(err, CoreError::DuplicateNumber { number: 7 });
        assert_eq!(team.players().len(), 1);
    }

    #[test]
    fn roster_caps_at_fifteen() {
        let mut ids = IdGenerator::from_seed(1);
        let mut team = Team::new("Home", 4);
        for n in 0..15 {
            team.enroll(player(&mut ids, n)).unwrap();
        }
        let err = team.enroll(player(&mut ids, 99)).unwrap_err();
        assert_eq!(err, CoreError::RosterFull { limit: 15 });
    }

    #[test]
    fn toggle_starter_respects_court_cap() {
        let mut ids = IdGenerator::from_seed(2);
        let mut team = Team::new("Home", 4);
        for n in 1..=6 {
            team.enroll(player(&mut ids, n)).unwrap();
        }
        let bench_id = team.players()[5].id().clone();
        let starter_id = team.players()[0].id().clone();

        assert_eq!(
            team.toggle_starter(&bench_id),
            Err(CoreError::CourtFull { limit: 5 })
        );
        assert_eq!(team.toggle_starter(&starter_id), Ok(false));
        assert_eq!(team.toggle_starter(&bench_id), Ok(true));
        assert_eq!(team.on_court_count(), 5);
    }

    #[test]
    fn bulk_enroll_reports_skips() {
        let mut ids = IdGenerator::from_seed(3);
        let mut team = Team::new("Away", 4);
        team.enroll(player(&mut ids, 4)).unwrap();

        let text = "7 Kim\n\n11Lee\n4 Dup\nno number\n23\n";
        let report = team.enroll_bulk(text, &mut ids, now());

        assert_eq!(report.added.len(), 2);
        assert_eq!(team.player_by_number(11).map(Player::name), Some("Lee"));
        assert_eq!(
            report.skipped,
            vec![
                SkippedLine {
                    line: "4 Dup".to_owned(),
                    reason: SkipReason::DuplicateNumber { number: 4 },
                },
                SkippedLine {
                    line: "no number".to_owned(),
                    reason: SkipReason::Malformed,
                },
                SkippedLine {
                    line: "23".to_owned(),
                    reason: SkipReason::Malformed,
                },
            ]
        );
    }

    #[test]
    fn bulk_enroll_stops_adding_at_capacity() {
        let mut ids = IdGenerator::from_seed(4);
        let mut team = Team::new("Away", 4);
        let text: String = (1..=17).map(|n| format!("{n} P{n}\n")).collect();
        let report = team.enroll_bulk(&text, &mut ids, now());
        assert_eq!(report.added.len(), 15);
        assert_eq!(report.skipped.len(), 2);
        assert!(report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::RosterFull));
    }

    #[test]
    fn blank_rename_restores_default() {
        let mut team = Team::new("Home", 4);
        team.rename(TeamSide::Home, "Blue");
        assert_eq!(team.name(), "Blue");
        team.rename(TeamSide::Home, "  ");
        assert_eq!(team.name(), "Home");
    }

    #[test]
    fn remove_unknown_player_is_not_found() {
        let mut team = Team::new("Home", 4);
        let err = team.remove_player(&PlayerId::new("ghost")).unwrap_err();
        assert!(matches!(err, CoreError::PlayerNotFound { .. }));
    }
}
