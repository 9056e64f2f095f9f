//! The [`SessionStore`]: current game, orchestration and persistence.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use courtside_core::event::GameEvent;
use courtside_core::game::Game;
use courtside_core::history::HistoryAction;
use courtside_core::ids::{GameId, IdGenerator, PlayerId};
use courtside_core::player::{Player, StatKind};
use courtside_core::query::GameSummary;
use courtside_core::settings::GameSettings;
use courtside_core::team::{BulkEnrollReport, TeamSide};
use courtside_core::CoreError;
use courtside_store::{fingerprint, GameRepository, KeyValueStore, Theme};

use crate::clock::{Clock, SystemClock};
use crate::config::{FlushPolicy, SessionConfig};
use crate::outcome::{FlushStatus, Outcome};
use crate::subscribers::{Listener, SubscriptionId, Subscribers};
use crate::SessionError;

/// One scorekeeping session.
///
/// Single-threaded: every call runs to completion, including listener
/// notification and the flush, before it returns.
pub struct SessionStore<S, C = SystemClock> {
    repo: GameRepository<S>,
    clock: C,
    ids: IdGenerator,
    config: SessionConfig,
    current: Option<Game>,
    subscribers: Subscribers,
    dirty: bool,
    /// Fingerprint of the last successfully flushed state of `current`.
    last_flushed: Option<String>,
    last_now: Option<DateTime<Utc>>,
}

impl<S: KeyValueStore, C: Clock> SessionStore<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, SessionConfig::default())
    }

    pub fn with_config(store: S, clock: C, config: SessionConfig) -> Self {
        Self {
            repo: GameRepository::with_keys(store, config.storage_keys.clone()),
            clock,
            ids: IdGenerator::new(),
            config,
            current: None,
            subscribers: Subscribers::default(),
            dirty: false,
            last_flushed: None,
            last_now: None,
        }
    }

    /// Replace the id generator, e.g. with a seeded one for reproducible ids.
    pub fn with_ids(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn repository(&self) -> &GameRepository<S> {
        &self.repo
    }

    /// Direct access to storage. Anything may change behind the session
    /// here, so the next [`flush`](Self::flush) writes the current game even
    /// if it has not changed since the last one.
    pub fn repository_mut(&mut self) -> &mut GameRepository<S> {
        self.last_flushed = None;
        &mut self.repo
    }

    /// Current time, never earlier than any time handed out before.
    fn now(&mut self) -> DateTime<Utc> {
        let now = match self.last_now {
            Some(last) => self.clock.now().max(last),
            None => self.clock.now(),
        };
        self.last_now = Some(now);
        now
    }

    // -----------------------------------------------------------------------
    // Current game
    // -----------------------------------------------------------------------

    pub fn current_game(&self) -> Option<&Game> {
        self.current.as_ref()
    }

    fn current(&self) -> Result<&Game, SessionError> {
        self.current.as_ref().ok_or(SessionError::NoCurrentGame)
    }

    /// Create a game in setup and make it current.
    pub fn create_game(&mut self, settings: GameSettings) -> Result<Outcome<GameId>, SessionError> {
        let now = self.now();
        let game = Game::create(settings, &mut self.ids, now)?;
        let id = game.id().clone();
        Ok(self.open(game).map(|_| id))
    }

    /// [`create_game`](Self::create_game) with the stored default settings.
    pub fn create_game_with_saved_settings(&mut self) -> Result<Outcome<GameId>, SessionError> {
        let settings = self.repo.load_settings();
        self.create_game(settings)
    }

    /// Make `game` current. It is checked for structural soundness first.
    pub fn set_current_game(&mut self, game: Game) -> Result<Outcome, SessionError> {
        game.validate()?;
        Ok(self.open(game))
    }

    /// Drop the current game from memory. Storage is untouched.
    pub fn clear_current_game(&mut self) -> Option<Game> {
        self.last_flushed = None;
        self.dirty = false;
        self.current.take()
    }

    /// Make a saved game current.
    pub fn load_game(&mut self, id: &GameId) -> Result<Outcome, SessionError> {
        let game = self
            .repo
            .load_game(id)
            .ok_or_else(|| SessionError::GameNotFound {
                game_id: id.clone(),
            })?;
        Ok(self.open(game))
    }

    fn open(&mut self, game: Game) -> Outcome {
        info!(game_id = %game.id(), status = %game.status(), "game opened");
        let event = GameEvent::GameOpened {
            game_id: game.id().clone(),
        };
        self.current = Some(game);
        self.last_flushed = None;
        self.settle(event.clone(), vec![event])
    }

    /// Every saved game, most recently created first.
    pub fn saved_games(&self) -> Vec<Game> {
        self.repo.load_all()
    }

    /// Delete a saved game. If it is the current game, the session lets go
    /// of it so the next flush cannot resurrect it.
    pub fn delete_game(&mut self, id: &GameId) -> Result<bool, SessionError> {
        let removed = self.repo.delete_game(id)?;
        if self.current.as_ref().is_some_and(|g| g.id() == id) {
            self.clear_current_game();
        }
        info!(game_id = %id, removed, "game deleted");
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Settings and theme
    // -----------------------------------------------------------------------

    pub fn saved_settings(&self) -> GameSettings {
        self.repo.load_settings()
    }

    pub fn save_settings(&mut self, settings: GameSettings) -> Result<(), SessionError> {
        settings.validate()?;
        self.repo.save_settings(&settings)?;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.repo.theme()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), SessionError> {
        self.repo.set_theme(theme)?;
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, SessionError> {
        Ok(self.repo.toggle_theme()?)
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Register a listener for every event of the current game.
    pub fn subscribe(&mut self, listener: impl FnMut(&Game, &GameEvent) + 'static) -> SubscriptionId {
        let boxed: Listener = Box::new(listener);
        self.subscribers.subscribe(boxed)
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // -----------------------------------------------------------------------
    // Two-phase plumbing
    // -----------------------------------------------------------------------

    /// Phase 1: run `op` against the current game. On error nothing changed
    /// and nothing is notified or flushed.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut Game, &mut IdGenerator, DateTime<Utc>) -> Result<(T, Vec<GameEvent>), CoreError>,
    ) -> Result<Outcome<T>, SessionError> {
        let now = self.now();
        let game = self.current.as_mut().ok_or(SessionError::NoCurrentGame)?;
        let (value, events) = op(game, &mut self.ids, now)?;
        Ok(self.settle(value, events))
    }

    /// Phase 2: notify listeners, then flush per policy.
    fn settle<T>(&mut self, value: T, events: Vec<GameEvent>) -> Outcome<T> {
        if events.is_empty() {
            return Outcome {
                value,
                flush: FlushStatus::Unchanged,
            };
        }
        if let Some(game) = self.current.as_ref() {
            for event in &events {
                self.subscribers.notify(game, event);
            }
        }
        self.dirty = true;
        let flush = match self.config.flush_policy {
            FlushPolicy::Immediate => self.flush(),
            FlushPolicy::Deferred => FlushStatus::Deferred,
        };
        Outcome { value, flush }
    }

    /// Write the current game to storage if it changed since the last
    /// successful flush.
    pub fn flush(&mut self) -> FlushStatus {
        let Some(game) = self.current.as_ref() else {
            return FlushStatus::Unchanged;
        };
        let fp = match fingerprint(game) {
            Ok(fp) => fp,
            Err(err) => {
                warn!(game_id = %game.id(), error = %err, "cannot fingerprint game");
                return FlushStatus::Failed(err);
            }
        };
        if self.last_flushed.as_deref() == Some(fp.as_str()) {
            self.dirty = false;
            return FlushStatus::Unchanged;
        }
        match self.repo.save_game(game) {
            Ok(()) => {
                debug!(game_id = %game.id(), fingerprint = %fp, "game flushed");
                self.last_flushed = Some(fp);
                self.dirty = false;
                FlushStatus::Saved
            }
            Err(err) => {
                warn!(game_id = %game.id(), error = %err, "flush failed; change kept in memory");
                FlushStatus::Failed(err)
            }
        }
    }

    /// Whether the current game has changes not yet written to storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn update_settings(&mut self, settings: GameSettings) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.update_settings(settings, now)))
    }

    pub fn start_game(&mut self) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.start(now)))
    }

    pub fn finish_game(&mut self) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.finish(now)))
    }

    pub fn advance_quarter(&mut self) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.advance_quarter(now)))
    }

    /// Advance, or finish the game after the final quarter.
    pub fn end_quarter(&mut self) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.end_quarter(now)))
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    pub fn rename_team(&mut self, side: TeamSide, name: &str) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.rename_team(side, name, now)))
    }

    pub fn add_player(
        &mut self,
        side: TeamSide,
        number: &str,
        name: &str,
    ) -> Result<Outcome<PlayerId>, SessionError> {
        self.mutate(|game, ids, now| {
            let id = game.enroll(side, number, name, ids, now)?;
            Ok((id, vec![GameEvent::RosterChanged { team: side }]))
        })
    }

    pub fn add_players_bulk(
        &mut self,
        side: TeamSide,
        text: &str,
    ) -> Result<Outcome<BulkEnrollReport>, SessionError> {
        self.mutate(|game, ids, now| {
            let report = game.enroll_bulk(side, text, ids, now)?;
            let events = if report.added.is_empty() {
                Vec::new()
            } else {
                vec![GameEvent::RosterChanged { team: side }]
            };
            Ok((report, events))
        })
    }

    pub fn toggle_starter(&mut self, side: TeamSide, id: &PlayerId) -> Result<Outcome<bool>, SessionError> {
        self.mutate(|game, _, now| {
            let on_court = game.toggle_starter(side, id, now)?;
            Ok((on_court, vec![GameEvent::RosterChanged { team: side }]))
        })
    }

    pub fn remove_player(&mut self, side: TeamSide, id: &PlayerId) -> Result<Outcome<Player>, SessionError> {
        self.mutate(|game, _, now| {
            let player = game.remove_player(side, id, now)?;
            Ok((player, vec![GameEvent::RosterChanged { team: side }]))
        })
    }

    // -----------------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------------

    /// Raw coupled stat update. Not recorded in history.
    pub fn apply_stat_delta(
        &mut self,
        side: TeamSide,
        player_id: &PlayerId,
        stat: StatKind,
        delta: i32,
    ) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.apply_stat_delta(side, player_id, stat, delta, now)))
    }

    /// Stat entry as an operator makes it.
    ///
    /// Rejects a delta that would take the stat below zero, records a
    /// history entry when `delta > 0`, then applies the delta. The outcome
    /// carries the `StatChanged` event.
    pub fn commit_stat(
        &mut self,
        side: TeamSide,
        player_id: &PlayerId,
        stat: StatKind,
        delta: i32,
    ) -> Result<Outcome, SessionError> {
        let current = self
            .current()?
            .player(side, player_id)
            .ok_or_else(|| CoreError::PlayerNotFound {
                player_id: player_id.clone(),
            })?
            .stats()
            .get(stat);
        if i64::from(current) + i64::from(delta) < 0 {
            return Err(SessionError::NegativeStat {
                stat,
                current,
                delta,
            });
        }

        self.mutate(|game, _, now| {
            let mut events = Vec::with_capacity(2);
            if let Some(action) = HistoryAction::for_stat(side, player_id.clone(), stat, delta, current) {
                events.push(game.record(action, now)?);
            }
            let changed = game.apply_stat_delta(side, player_id, stat, delta, now)?;
            events.push(changed.clone());
            Ok((changed, events))
        })
    }

    pub fn substitute(
        &mut self,
        side: TeamSide,
        in_id: &PlayerId,
        out_id: &PlayerId,
    ) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.substitute(side, in_id, out_id, now)))
    }

    /// Substitute and record it for undo. Nothing is recorded if the
    /// substitution is rejected.
    pub fn record_substitution(
        &mut self,
        side: TeamSide,
        in_id: &PlayerId,
        out_id: &PlayerId,
    ) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| {
            let swapped = game.substitute(side, in_id, out_id, now)?;
            let recorded = game.record(
                HistoryAction::Substitution {
                    team: side,
                    in_player_id: in_id.clone(),
                    out_player_id: out_id.clone(),
                },
                now,
            )?;
            Ok((swapped.clone(), vec![swapped, recorded]))
        })
    }

    /// Append an action to the current game's history.
    pub fn record(&mut self, action: HistoryAction) -> Result<Outcome, SessionError> {
        self.mutate(|game, _, now| single(game.record(action, now)))
    }

    /// Undo the most recent history entry. `value` is `None` and nothing is
    /// notified or flushed when the history is empty.
    pub fn undo_last(&mut self) -> Result<Outcome<Option<GameEvent>>, SessionError> {
        self.mutate(|game, _, now| {
            let undone = game.undo_last(now)?;
            let events: Vec<GameEvent> = undone.iter().cloned().collect();
            Ok((undone, events))
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Total score of `side` in the current game, 0 without one.
    pub fn team_total_score(&self, side: TeamSide) -> u32 {
        self.current
            .as_ref()
            .map_or(0, |g| g.team_total_score(side))
    }

    /// Team fouls of `side` in the current quarter, 0 without a game.
    pub fn current_quarter_team_fouls(&self, side: TeamSide) -> u32 {
        self.current
            .as_ref()
            .map_or(0, |g| g.current_quarter_team_fouls(side))
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.current.as_ref().map(Game::summary)
    }
}

fn single(result: Result<GameEvent, CoreError>) -> Result<(GameEvent, Vec<GameEvent>), CoreError> {
    let event = result?;
    Ok((event.clone(), vec![event]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use courtside_store::MemoryStore;

    fn session() -> (SessionStore<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.timestamp_millis_opt(1_000).unwrap());
        let session = SessionStore::new(MemoryStore::new(), clock.clone())
            .with_ids(IdGenerator::from_seed(3));
        (session, clock)
    }

    #[test]
    fn mutations_need_a_current_game() {
        let (mut session, _) = session();
        assert!(matches!(session.start_game(), Err(SessionError::NoCurrentGame)));
        assert!(matches!(session.undo_last(), Err(SessionError::NoCurrentGame)));
        assert_eq!(session.team_total_score(TeamSide::Home), 0);
        assert_eq!(session.summary(), None);
    }

    #[test]
    fn session_time_never_runs_backward() {
        let (mut session, clock) = session();
        session.create_game(GameSettings::default()).unwrap();
        clock.advance(Duration::seconds(10));
        session.rename_team(TeamSide::Home, "Blue").unwrap();
        let later = session.current_game().unwrap().updated_at();

        clock.set(Utc.timestamp_millis_opt(0).unwrap());
        session.rename_team(TeamSide::Home, "Navy").unwrap();
        assert_eq!(session.current_game().unwrap().updated_at(), later);
    }

    #[test]
    fn commit_stat_rejects_going_negative() {
        let (mut session, _) = session();
        session.create_game(GameSettings::default()).unwrap();
        let p = session.add_player(TeamSide::Away, "3", "Yi").unwrap().value;
        session.start_game().unwrap();

        let err = session
            .commit_stat(TeamSide::Away, &p, StatKind::Points, -2)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::NegativeStat {
                current: 0,
                delta: -2,
                ..
            }
        ));
        assert!(session.current_game().unwrap().history().is_empty());
    }

    #[test]
    fn failed_substitution_records_nothing() {
        let (mut session, _) = session();
        session.create_game(GameSettings::default()).unwrap();
        let a = session.add_player(TeamSide::Home, "1", "A").unwrap().value;
        let b = session.add_player(TeamSide::Home, "2", "B").unwrap().value;
        session.start_game().unwrap();
        // Both are on court, so `a` cannot come in.
        assert!(session.record_substitution(TeamSide::Home, &a, &b).is_err());
        assert!(session.current_game().unwrap().history().is_empty());
    }
}
