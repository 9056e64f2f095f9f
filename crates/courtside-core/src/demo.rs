//! A ready-made in-progress game for demos and tests.

use chrono::{DateTime, Utc};

use crate::game::{Game, GameStatus};
use crate::ids::{IdGenerator, PlayerId};
use crate::player::{Player, PlayerStats};
use crate::settings::GameSettings;
use crate::team::TeamSide;

type Row = (&'static str, u32, &'static str, bool, [u32; 3]);

const BLUE: [Row; 8] = [
    ("h1", 7, "Kim Cheolsu", true, [8, 1, 3]),
    ("h2", 11, "Lee Younghee", true, [6, 0, 2]),
    ("h3", 23, "Park Minsu", true, [10, 1, 5]),
    ("h4", 32, "Choi Jihoon", true, [4, 0, 1]),
    ("h5", 45, "Jung Daehyun", true, [2, 1, 2]),
    ("h6", 5, "Hong Gildong", false, [0, 0, 0]),
    ("h7", 8, "Kang Gamchan", false, [0, 0, 0]),
    ("h8", 15, "Eulji Mundeok", false, [0, 0, 0]),
];

const WHITE: [Row; 8] = [
    ("a1", 3, "Yi Sunsin", true, [12, 1, 4]),
    ("a2", 10, "Sejong", true, [8, 0, 3]),
    ("a3", 21, "Gwanggaeto", true, [6, 2, 2]),
    ("a4", 30, "Jang Bogo", true, [4, 0, 1]),
    ("a5", 44, "Kim Yusin", true, [4, 0, 3]),
    ("a6", 4, "Yu Gwansun", false, [0, 0, 0]),
    ("a7", 9, "An Junggeun", false, [0, 0, 0]),
    ("a8", 12, "Yun Bonggil", false, [0, 0, 0]),
];

/// Four-quarter game midway through quarter 2.
///
/// Home ("Blue") trails away ("White") 30-34 and both teams have 3 team
/// fouls in quarter 2. Players use short fixed ids
/// (`h1`..`h8`, `a1`..`a8`).
pub fn demo_game(ids: &mut IdGenerator, now: DateTime<Utc>) -> Game {
    let mut game = Game::blank(GameSettings::default(), ids, now);

    for (side, name, rows, scores, team_fouls) in [
        (TeamSide::Home, "Blue", &BLUE, [18, 12, 0, 0], [0, 3, 0, 0]),
        (TeamSide::Away, "White", &WHITE, [20, 14, 0, 0], [0, 3, 0, 0]),
    ] {
        let team = game.team_mut(side);
        team.rename(side, name);
        team.quarter_scores_mut().copy_from_slice(&scores);
        team.team_fouls_mut().copy_from_slice(&team_fouls);
        for &(id, number, player_name, on_court, [points, fouls, rebounds]) in rows {
            team.push_player_unchecked(Player::from_parts(
                PlayerId::new(id),
                number,
                player_name,
                on_court,
                PlayerStats {
                    points,
                    fouls,
                    rebounds,
                },
            ));
        }
    }

    game.force_status(GameStatus::InProgress);
    game.set_current_quarter(2);
    game
}
