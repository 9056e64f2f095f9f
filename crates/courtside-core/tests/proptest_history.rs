//! Property tests for stat entry, substitution and undo.
//!
//! Random sequences of recorded operations are applied to the demo game and
//! the structural invariants are checked after each one. Undoing every
//! retained entry must land exactly on the state from before those entries
//! were recorded.

use chrono::{DateTime, TimeZone, Utc};
use courtside_core::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Score(TeamSide, usize, u32),
    Foul(TeamSide, usize),
    Rebound(TeamSide, usize),
    Sub(TeamSide, usize, usize),
}

fn side_strategy() -> impl Strategy<Value = TeamSide> {
    prop_oneof![Just(TeamSide::Home), Just(TeamSide::Away)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (side_strategy(), 0..8usize, 1..=3u32).prop_map(|(s, i, p)| Op::Score(s, i, p)),
        (side_strategy(), 0..8usize).prop_map(|(s, i)| Op::Foul(s, i)),
        (side_strategy(), 0..8usize).prop_map(|(s, i)| Op::Rebound(s, i)),
        (side_strategy(), 0..3usize, 0..5usize).prop_map(|(s, b, c)| Op::Sub(s, b, c)),
    ]
}

fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

/// Record-then-apply, the way an operator's stat button does it.
fn run(game: &mut Game, op: &Op, now: DateTime<Utc>) {
    match *op {
        Op::Score(side, idx, points) => stat(game, side, idx, StatKind::Points, points as i32, now),
        Op::Foul(side, idx) => stat(game, side, idx, StatKind::Fouls, 1, now),
        Op::Rebound(side, idx) => stat(game, side, idx, StatKind::Rebounds, 1, now),
        Op::Sub(side, bench_idx, court_idx) => {
            let team = game.team(side);
            let bench: Vec<PlayerId> = courtside_core::query::bench(team)
                .map(|p| p.id().clone())
                .collect();
            let court: Vec<PlayerId> = courtside_core::query::on_court(team)
                .map(|p| p.id().clone())
                .collect();
            let incoming = bench[bench_idx % bench.len()].clone();
            let outgoing = court[court_idx % court.len()].clone();
            game.record(
                HistoryAction::Substitution {
                    team: side,
                    in_player_id: incoming.clone(),
                    out_player_id: outgoing.clone(),
                },
                now,
            )
            .unwrap();
            game.substitute(side, &incoming, &outgoing, now).unwrap();
        }
    }
}

fn stat(game: &mut Game, side: TeamSide, idx: usize, kind: StatKind, delta: i32, now: DateTime<Utc>) {
    let player = &game.team(side).players()[idx];
    let id = player.id().clone();
    let previous = player.stats().get(kind);
    let action = HistoryAction::for_stat(side, id.clone(), kind, delta, previous).unwrap();
    game.record(action, now).unwrap();
    game.apply_stat_delta(side, &id, kind, delta, now).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut ids = IdGenerator::from_seed(42);
        let mut game = demo_game(&mut ids, at(1_000));
        for (i, op) in ops.iter().enumerate() {
            run(&mut game, op, at(2_000 + i as i64));
            prop_assert!(game.history().len() <= HISTORY_LIMIT);
            prop_assert!(game.validate().is_ok());
            for (_, team) in game.teams().iter() {
                prop_assert_eq!(team.on_court_count(), MAX_ON_COURT);
            }
        }
        prop_assert_eq!(game.history().len(), ops.len().min(HISTORY_LIMIT));
    }

    #[test]
    fn undoing_everything_returns_to_the_oldest_retained_state(
        ops in prop::collection::vec(op_strategy(), 1..45),
    ) {
        let mut ids = IdGenerator::from_seed(7);
        let mut game = demo_game(&mut ids, at(1_000));
        let mut snapshots = vec![game.teams().clone()];
        for (i, op) in ops.iter().enumerate() {
            run(&mut game, op, at(2_000 + i as i64));
            snapshots.push(game.teams().clone());
        }

        let retained = game.history().len();
        for _ in 0..retained {
            prop_assert!(game.undo_last(at(9_000)).unwrap().is_some());
        }
        prop_assert_eq!(game.undo_last(at(9_500)).unwrap(), None);
        prop_assert_eq!(game.teams(), &snapshots[ops.len() - retained]);
    }

    #[test]
    fn negative_deltas_never_underflow(
        idx in 0..8usize,
        deltas in prop::collection::vec(-10..10i32, 1..30),
    ) {
        let mut ids = IdGenerator::from_seed(3);
        let mut game = demo_game(&mut ids, at(1_000));
        let id = game.team(TeamSide::Home).players()[idx].id().clone();
        for delta in deltas {
            let GameEvent::StatChanged(change) = game
                .apply_stat_delta(TeamSide::Home, &id, StatKind::Points, delta, at(2_000))
                .unwrap()
            else {
                panic!("expected StatChanged");
            };
            let expected = (i64::from(change.player_before) + i64::from(delta)).max(0);
            prop_assert_eq!(i64::from(change.player_after), expected);
            let slot = change.team_slot.unwrap();
            prop_assert_eq!(
                i64::from(slot.after),
                (i64::from(slot.before) + i64::from(delta)).max(0)
            );
        }
        // Decrements are never recorded by the caller, so nothing to undo.
        prop_assert!(game.history().is_empty());
    }
}
