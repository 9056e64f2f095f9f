//! Read-only aggregation over the entity model.
//!
//! Nothing here is cached. Every figure is recomputed from the current
//! [`Game`] on each call, so it can never go stale.

use serde::{Deserialize, Serialize};

use crate::game::Game;
use crate::player::Player;
use crate::team::{Team, TeamSide};

/// Saturating sum. Single slots already saturate at `u32::MAX`, so totals
/// do the same instead of overflowing.
fn saturating_sum(values: impl IntoIterator<Item = u32>) -> u32 {
    values.into_iter().fold(0, u32::saturating_add)
}

/// Sum of the team's per-quarter scores.
pub fn team_total_score(team: &Team) -> u32 {
    saturating_sum(team.quarter_scores().iter().copied())
}

/// Team fouls committed in the quarter currently being played.
pub fn current_quarter_team_fouls(game: &Game, side: TeamSide) -> u32 {
    game.team(side)
        .team_fouls()
        .get(game.quarter_index())
        .copied()
        .unwrap_or(0)
}

/// Whether `side` has reached the team-foul limit this quarter.
pub fn team_in_foul_trouble(game: &Game, side: TeamSide) -> bool {
    current_quarter_team_fouls(game, side) >= game.settings().team_foul_limit
}

pub fn on_court(team: &Team) -> impl Iterator<Item = &Player> {
    team.players().iter().filter(|p| p.is_on_court())
}

pub fn bench(team: &Team) -> impl Iterator<Item = &Player> {
    team.players().iter().filter(|p| !p.is_on_court())
}

/// Personal foul standing of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulStatus {
    Clear,
    /// One foul away from the limit.
    Warning,
    FouledOut,
}

pub fn foul_status(player: &Player, personal_foul_limit: u32) -> FoulStatus {
    let fouls = player.stats().fouls;
    if fouls >= personal_foul_limit {
        FoulStatus::FouledOut
    } else if fouls.saturating_add(1) >= personal_foul_limit {
        FoulStatus::Warning
    } else {
        FoulStatus::Clear
    }
}

/// `fouls >= limit`. Informational only: the store keeps accepting stat
/// entries for a fouled-out player.
pub fn is_fouled_out(player: &Player, personal_foul_limit: u32) -> bool {
    foul_status(player, personal_foul_limit) == FoulStatus::FouledOut
}

pub fn team_rebounds(team: &Team) -> u32 {
    saturating_sum(team.players().iter().map(|p| p.stats().rebounds))
}

/// Sum of the players' personal fouls over the whole game.
pub fn team_personal_fouls(team: &Team) -> u32 {
    saturating_sum(team.players().iter().map(|p| p.stats().fouls))
}

/// Highest scorer; the earlier player in roster order wins a tie.
pub fn top_scorer(team: &Team) -> Option<&Player> {
    team.players().iter().reduce(|best, p| {
        if p.stats().points > best.stats().points {
            p
        } else {
            best
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    HomeWin,
    AwayWin,
    Tie,
}

pub fn game_result(game: &Game) -> GameResult {
    let home = team_total_score(game.team(TeamSide::Home));
    let away = team_total_score(game.team(TeamSide::Away));
    match home.cmp(&away) {
        std::cmp::Ordering::Greater => GameResult::HomeWin,
        std::cmp::Ordering::Less => GameResult::AwayWin,
        std::cmp::Ordering::Equal => GameResult::Tie,
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-team figures shown after the final whistle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub name: String,
    pub total_score: u32,
    pub quarter_scores: Vec<u32>,
    pub rebounds: u32,
    pub personal_fouls: u32,
    /// `(number, name, points)` of the top scorer, if the roster is not empty.
    pub top_scorer: Option<(u32, String, u32)>,
}

impl TeamSummary {
    pub fn of(team: &Team) -> Self {
        Self {
            name: team.name().to_owned(),
            total_score: team_total_score(team),
            quarter_scores: team.quarter_scores().to_vec(),
            rebounds: team_rebounds(team),
            personal_fouls: team_personal_fouls(team),
            top_scorer: top_scorer(team)
                .map(|p| (p.number(), p.name().to_owned(), p.stats().points)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub home: TeamSummary,
    pub away: TeamSummary,
    pub result: GameResult,
}

impl GameSummary {
    pub fn of(game: &Game) -> Self {
        Self {
            home: TeamSummary::of(game.team(TeamSide::Home)),
            away: TeamSummary::of(game.team(TeamSide::Away)),
            result: game_result(game),
        }
    }
}

// Convenience forms on the aggregate itself.
impl Game {
    pub fn team_total_score(&self, side: TeamSide) -> u32 {
        team_total_score(self.team(side))
    }

    pub fn current_quarter_team_fouls(&self, side: TeamSide) -> u32 {
        current_quarter_team_fouls(self, side)
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_game;
    use crate::ids::{IdGenerator, PlayerId};
    use crate::player::{PlayerStats, StatKind};
    use chrono::{TimeZone, Utc};

    fn game() -> Game {
        demo_game(
            &mut IdGenerator::from_seed(2),
            Utc.timestamp_millis_opt(0).unwrap(),
        )
    }

    fn with_fouls(fouls: u32) -> Player {
        Player::from_parts(
            PlayerId::new("x"),
            1,
            "X",
            true,
            PlayerStats {
                fouls,
                ..Default::default()
            },
        )
    }

    #[test]
    fn totals_are_sums_of_quarters() {
        let game = game();
        assert_eq!(game.team_total_score(TeamSide::Home), 30);
        assert_eq!(game.team_total_score(TeamSide::Away), 34);
        assert_eq!(game.current_quarter_team_fouls(TeamSide::Home), 3);
        assert_eq!(game_result(&game), GameResult::AwayWin);
    }

    #[test]
    fn foul_status_thresholds() {
        assert_eq!(foul_status(&with_fouls(3), 5), FoulStatus::Clear);
        assert_eq!(foul_status(&with_fouls(4), 5), FoulStatus::Warning);
        assert_eq!(foul_status(&with_fouls(5), 5), FoulStatus::FouledOut);
        assert!(is_fouled_out(&with_fouls(6), 5));
        assert!(!is_fouled_out(&with_fouls(4), 5));
    }

    #[test]
    fn on_court_and_bench_partition_the_roster() {
        let game = game();
        let team = game.team(TeamSide::Away);
        assert_eq!(on_court(team).count(), 5);
        assert_eq!(bench(team).count(), 3);
        assert!(on_court(team).all(Player::is_on_court));
    }

    #[test]
    fn top_scorer_prefers_roster_order_on_tie() {
        let game = game();
        let home = game.team(TeamSide::Home);
        assert_eq!(top_scorer(home).map(Player::number), Some(23));

        // Away: a4 and a5 both have 4 points, but a1 leads with 12.
        let away = game.team(TeamSide::Away);
        assert_eq!(top_scorer(away).map(|p| p.stats().points), Some(12));
    }

    #[test]
    fn huge_deltas_saturate_totals() {
        let mut game = game();
        let h1 = PlayerId::new("h1");
        let now = Utc.timestamp_millis_opt(1).unwrap();
        for stat in [StatKind::Points, StatKind::Fouls, StatKind::Rebounds] {
            for _ in 0..3 {
                game.apply_stat_delta(TeamSide::Home, &h1, stat, i32::MAX, now)
                    .unwrap();
            }
        }

        let home = game.team(TeamSide::Home);
        assert_eq!(home.player(&h1).unwrap().stats().points, u32::MAX);
        assert_eq!(team_total_score(home), u32::MAX);
        assert_eq!(team_rebounds(home), u32::MAX);
        assert_eq!(team_personal_fouls(home), u32::MAX);
        assert_eq!(
            foul_status(home.player(&h1).unwrap(), u32::MAX),
            FoulStatus::FouledOut
        );
        assert_eq!(foul_status(&with_fouls(u32::MAX), 0), FoulStatus::FouledOut);
        assert_eq!(game.summary().home.total_score, u32::MAX);
    }

    #[test]
    fn foul_trouble_uses_team_limit() {
        let game = game();
        assert!(!team_in_foul_trouble(&game, TeamSide::Home));
    }

    #[test]
    fn summary_collects_team_figures() {
        let summary = game().summary();
        assert_eq!(summary.home.total_score, 30);
        assert_eq!(summary.home.rebounds, 13);
        assert_eq!(summary.away.personal_fouls, 3);
        assert_eq!(summary.result, GameResult::AwayWin);
    }
}
