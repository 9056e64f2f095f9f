//! Scripted match -- plays a short game through a session backed by files.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example scripted_match -p courtside-session [DIR]
//!
//! Saved games land in DIR (default: a `courtside-demo` directory under the
//! system temp dir). Running it again appends another game to the list.

use anyhow::Context;
use courtside_core::prelude::*;
use courtside_session::prelude::*;
use courtside_store::FileStore;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let dir = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("courtside-demo"));
    let store = FileStore::open(&dir).with_context(|| format!("opening {}", dir.display()))?;
    let mut session = SessionStore::new(store, SystemClock);

    session.subscribe(|game, event| {
        if let GameEvent::StatChanged(change) = event {
            println!(
                "  {} #{} {} {:+} -> {}   ({} {} - {} {})",
                change.team,
                game.player(change.team, &change.player_id)
                    .map_or(0, Player::number),
                change.stat,
                change.requested,
                change.player_after,
                game.team(TeamSide::Home).name(),
                game.team_total_score(TeamSide::Home),
                game.team_total_score(TeamSide::Away),
                game.team(TeamSide::Away).name(),
            );
        }
    });

    session.create_game_with_saved_settings()?;
    session.rename_team(TeamSide::Home, "Blue")?;
    session.rename_team(TeamSide::Away, "White")?;
    let home = session
        .add_players_bulk(TeamSide::Home, "7 Kim\n11 Lee\n23 Park\n32 Choi\n45 Jung\n5 Hong")?
        .value;
    let away = session
        .add_players_bulk(TeamSide::Away, "3 Yi\n10 Sejong\n21 Gwang\n30 Jang\n44 Yusin\n4 Yu")?
        .value;
    anyhow::ensure!(
        home.skipped.is_empty() && away.skipped.is_empty(),
        "roster lines were rejected"
    );
    let (h, a) = (home.added, away.added);

    session.start_game()?;
    println!("Quarter 1");
    session.commit_stat(TeamSide::Home, &h[2], StatKind::Points, 2)?;
    session.commit_stat(TeamSide::Away, &a[0], StatKind::Points, 3)?;
    session.commit_stat(TeamSide::Home, &h[0], StatKind::Fouls, 1)?;
    session.commit_stat(TeamSide::Home, &h[2], StatKind::Rebounds, 1)?;

    session.end_quarter()?;
    println!("Quarter 2");
    session.record_substitution(TeamSide::Home, &h[5], &h[0])?;
    session.commit_stat(TeamSide::Home, &h[5], StatKind::Points, 3)?;
    session.commit_stat(TeamSide::Away, &a[1], StatKind::Points, 2)?;

    println!("Undo last entry");
    if let Some(GameEvent::Undone { entry, .. }) = session.undo_last()?.value {
        println!("  undid {:?} from quarter {}", entry.action.kind(), entry.quarter);
    }

    while session
        .current_game()
        .is_some_and(|g| g.status() == GameStatus::InProgress)
    {
        session.end_quarter()?;
    }

    let summary = session.summary().context("no current game")?;
    println!();
    for team in [&summary.home, &summary.away] {
        println!(
            "{:<6} {:>3}  by quarter {:?}  rebounds {}  fouls {}",
            team.name, team.total_score, team.quarter_scores, team.rebounds, team.personal_fouls
        );
        if let Some((number, name, points)) = &team.top_scorer {
            println!("       top scorer #{number} {name} ({points} pts)");
        }
    }
    println!("result: {:?}", summary.result);
    println!(
        "{} saved game(s) in {}",
        session.saved_games().len(),
        dir.display()
    );
    Ok(())
}
