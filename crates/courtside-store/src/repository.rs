//! Saved games, settings and theme on top of a [`KeyValueStore`].
//!
//! # Save path
//!
//! Saving one game is read-modify-write over the whole collection: load
//! every saved game, replace the one with the same id in place or prepend
//! it when new, and write the full list back. Every save therefore costs
//! O(n) in the number of saved games.
//!
//! # Failure policy
//!
//! Loads never fail. A missing record reads as its default, and an
//! unreadable one is logged and read as its default too. Individual saved
//! games that do not decode or break a structural invariant are dropped
//! with a warning; the rest still load. Writes return a
//! [`PersistenceError`] and leave the caller's in-memory state alone.
//!
//! [`GameRepository::save_game`] and [`GameRepository::delete_game`] merge
//! into the stored collection as raw JSON. A read failure or a record that
//! is not a JSON array aborts them, and entries that `load_all` skips are
//! written back untouched.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use courtside_core::game::Game;
use courtside_core::ids::GameId;
use courtside_core::settings::GameSettings;

use crate::backend::KeyValueStore;
use crate::theme::Theme;
use crate::PersistenceError;

/// Keys of the three persisted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    pub games: String,
    pub settings: String,
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            games: "basketball-games".to_owned(),
            settings: "basketball-settings".to_owned(),
            theme: "basketball-theme".to_owned(),
        }
    }
}

/// Typed access to the persisted records.
#[derive(Debug)]
pub struct GameRepository<S> {
    store: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> GameRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    pub fn with_keys(store: S, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "storage read failed; using default");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.store
            .set(key, value)
            .map_err(|e| PersistenceError::storage(key, e))
    }

    // -- games --------------------------------------------------------------

    /// The stored collection as raw JSON entries, or why it cannot be read.
    fn load_entries(&self) -> Result<Vec<serde_json::Value>, PersistenceError> {
        let key = self.keys.games.as_str();
        let raw = self
            .store
            .get(key)
            .map_err(|e| PersistenceError::storage(key, e))?;
        match raw {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| PersistenceError::decode(key, e)),
            None => Ok(Vec::new()),
        }
    }

    fn save_entries(&mut self, entries: &[serde_json::Value]) -> Result<(), PersistenceError> {
        let key = self.keys.games.clone();
        let json =
            serde_json::to_string(entries).map_err(|e| PersistenceError::encode(&key, e))?;
        self.write(&key, &json)?;
        debug!(key = %key, games = entries.len(), bytes = json.len(), "saved games written");
        Ok(())
    }

    /// Every saved game, most recently created first.
    pub fn load_all(&self) -> Vec<Game> {
        let entries = match self.load_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(key = %self.keys.games, error = %err, "saved games unreadable; using none");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let game = match serde_json::from_value::<Game>(value) {
                    Ok(game) => game,
                    Err(err) => {
                        warn!(index, error = %err, "dropping undecodable saved game");
                        return None;
                    }
                };
                match game.validate() {
                    Ok(()) => Some(game),
                    Err(err) => {
                        warn!(index, game_id = %game.id(), error = %err, "dropping invalid saved game");
                        None
                    }
                }
            })
            .collect()
    }

    /// Overwrite the whole collection.
    pub fn save_all(&mut self, games: &[Game]) -> Result<(), PersistenceError> {
        let key = self.keys.games.clone();
        let json = serde_json::to_string(games).map_err(|e| PersistenceError::encode(&key, e))?;
        self.write(&key, &json)?;
        debug!(key = %key, games = games.len(), bytes = json.len(), "saved games written");
        Ok(())
    }

    /// Replace `game` in place by id, or prepend it if it was never saved.
    ///
    /// Fails without writing when the stored collection cannot be read.
    pub fn save_game(&mut self, game: &Game) -> Result<(), PersistenceError> {
        let mut entries = self.load_entries()?;
        let value =
            serde_json::to_value(game).map_err(|e| PersistenceError::encode(&self.keys.games, e))?;
        match entries.iter_mut().find(|entry| has_id(entry, game.id())) {
            Some(slot) => *slot = value,
            None => entries.insert(0, value),
        }
        self.save_entries(&entries)
    }

    pub fn load_game(&self, id: &GameId) -> Option<Game> {
        self.load_all().into_iter().find(|g| g.id() == id)
    }

    /// Remove a saved game. Returns whether a game with `id` was present.
    pub fn delete_game(&mut self, id: &GameId) -> Result<bool, PersistenceError> {
        let mut entries = self.load_entries()?;
        let before = entries.len();
        entries.retain(|entry| !has_id(entry, id));
        if entries.len() == before {
            return Ok(false);
        }
        self.save_entries(&entries)?;
        Ok(true)
    }

    // -- settings -----------------------------------------------------------

    /// Stored settings merged over the defaults.
    ///
    /// Missing fields take their default value. A record that does not parse
    /// or fails validation yields the defaults.
    pub fn load_settings(&self) -> GameSettings {
        let key = self.keys.settings.as_str();
        let Some(raw) = self.read(key) else {
            return GameSettings::default();
        };
        let settings = match serde_json::from_str::<GameSettings>(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(key, error = %err, "unreadable settings; using defaults");
                return GameSettings::default();
            }
        };
        match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!(key, error = %err, "invalid stored settings; using defaults");
                GameSettings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &GameSettings) -> Result<(), PersistenceError> {
        let key = self.keys.settings.clone();
        let json =
            serde_json::to_string(settings).map_err(|e| PersistenceError::encode(&key, e))?;
        self.write(&key, &json)
    }

    // -- theme --------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        self.read(&self.keys.theme)
            .map(|raw| Theme::from_stored(&raw))
            .unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), PersistenceError> {
        let key = self.keys.theme.clone();
        self.write(&key, theme.as_str())
    }

    /// Flip the stored theme and return the new value.
    pub fn toggle_theme(&mut self) -> Result<Theme, PersistenceError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}

fn has_id(entry: &serde_json::Value, id: &GameId) -> bool {
    entry.get("id").and_then(serde_json::Value::as_str) == Some(id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use chrono::{TimeZone, Utc};
    use courtside_core::ids::IdGenerator;

    fn new_game(seed: u64, ms: i64) -> Game {
        let mut ids = IdGenerator::from_seed(seed);
        Game::create(
            GameSettings::default(),
            &mut ids,
            Utc.timestamp_millis_opt(ms).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn empty_store_loads_defaults() {
        let repo = GameRepository::new(MemoryStore::new());
        assert!(repo.load_all().is_empty());
        assert_eq!(repo.load_settings(), GameSettings::default());
        assert_eq!(repo.theme(), Theme::Dark);
    }

    #[test]
    fn save_game_prepends_new_and_replaces_existing_in_place() {
        let mut repo = GameRepository::new(MemoryStore::new());
        let a = new_game(1, 1_000);
        let b = new_game(2, 2_000);
        repo.save_game(&a).unwrap();
        repo.save_game(&b).unwrap();
        let ids: Vec<_> = repo.load_all().iter().map(|g| g.id().clone()).collect();
        assert_eq!(ids, vec![b.id().clone(), a.id().clone()]);

        let mut a2 = a.clone();
        a2.rename_team(
            courtside_core::team::TeamSide::Home,
            "Renamed",
            Utc.timestamp_millis_opt(3_000).unwrap(),
        )
        .unwrap();
        repo.save_game(&a2).unwrap();
        let games = repo.load_all();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1], a2);
    }

    #[test]
    fn delete_game_reports_presence() {
        let mut repo = GameRepository::new(MemoryStore::new());
        let a = new_game(1, 1_000);
        repo.save_game(&a).unwrap();
        assert!(repo.delete_game(a.id()).unwrap());
        assert!(!repo.delete_game(a.id()).unwrap());
        assert!(repo.load_game(a.id()).is_none());
    }

    #[test]
    fn corrupt_collection_loads_empty() {
        let mut store = MemoryStore::new();
        store.set("basketball-games", "{not json").unwrap();
        let repo = GameRepository::new(store);
        assert!(repo.load_all().is_empty());
    }

    #[test]
    fn corrupt_collection_blocks_writes_instead_of_replacing_it() {
        let mut store = MemoryStore::new();
        store.set("basketball-games", "{not json").unwrap();
        let mut repo = GameRepository::new(store);
        let a = new_game(1, 1_000);

        let err = repo.save_game(&a).unwrap_err();
        assert!(matches!(err, PersistenceError::Decode { .. }));
        assert!(repo.delete_game(a.id()).is_err());
        assert_eq!(
            repo.store().get("basketball-games").unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn settings_merge_over_defaults() {
        let mut store = MemoryStore::new();
        store
            .set("basketball-settings", r#"{"quarters": 2}"#)
            .unwrap();
        let repo = GameRepository::new(store);
        assert_eq!(
            repo.load_settings(),
            GameSettings {
                quarters: 2,
                ..Default::default()
            }
        );
    }

    #[test]
    fn invalid_settings_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store
            .set("basketball-settings", r#"{"quarters": 0}"#)
            .unwrap();
        let repo = GameRepository::new(store);
        assert_eq!(repo.load_settings(), GameSettings::default());
    }

    #[test]
    fn theme_toggles_and_persists_plain_text() {
        let mut repo = GameRepository::new(MemoryStore::new());
        assert_eq!(repo.toggle_theme().unwrap(), Theme::Light);
        assert_eq!(
            repo.store().get("basketball-theme").unwrap().as_deref(),
            Some("light")
        );
        assert_eq!(repo.toggle_theme().unwrap(), Theme::Dark);
    }

    #[test]
    fn custom_keys_are_honored() {
        let keys = StorageKeys {
            games: "g".to_owned(),
            settings: "s".to_owned(),
            theme: "t".to_owned(),
        };
        let mut repo = GameRepository::with_keys(MemoryStore::new(), keys);
        repo.set_theme(Theme::Light).unwrap();
        assert_eq!(repo.store().get("t").unwrap().as_deref(), Some("light"));
        assert_eq!(repo.store().get("basketball-theme").unwrap(), None);
    }
}
