use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::*;

pub const MEMENTOS_KEY: &str = "momentos";
pub const PLAYER_COINS_KEY: &str = "playerCoins";
pub const PLAYER_POS_KEY: &str = "playerPos";
pub const PLAYER_PATHS_KEY: &str = "playerPaths";

const ALL_KEYS: [&str; 4] = [MEMENTOS_KEY, PLAYER_COINS_KEY, PLAYER_POS_KEY, PLAYER_PATHS_KEY];

/// String-keyed durable storage, in the manner of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

fn encode<T: Serialize + ?Sized>(store: &mut impl KeyValueStore, key: &'static str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|source| GameError::Storage { key, source })?;
    store.set(key, raw);
    Ok(())
}

fn decode<T: DeserializeOwned>(store: &impl KeyValueStore, key: &'static str) -> Result<Option<T>> {
    store
        .get(key)
        .map(|raw| serde_json::from_str(&raw).map_err(|source| GameError::Storage { key, source }))
        .transpose()
}

/// Writes the cache directory and the player's state under the fixed keys.
pub fn save_session<L: Luck>(session: &GameSession<L>, store: &mut impl KeyValueStore) -> Result<()> {
    let mementos: Vec<(Cell, &Memento)> = session.directory().iter().collect();
    encode(store, MEMENTOS_KEY, &mementos)?;
    encode(store, PLAYER_COINS_KEY, session.inventory())?;
    encode(store, PLAYER_POS_KEY, &session.player_position())?;
    encode(store, PLAYER_PATHS_KEY, session.paths())?;
    log::debug!("saved {} mementos", mementos.len());
    Ok(())
}

/// Rebuilds a session from the fixed keys. Missing keys fall back to a fresh session's values.
pub fn load_session<L: Luck>(config: GameConfig, luck: L, store: &impl KeyValueStore) -> Result<GameSession<L>> {
    let mementos: Vec<(Cell, Memento)> = decode(store, MEMENTOS_KEY)?.unwrap_or_default();
    let inventory: Vec<Coin> = decode(store, PLAYER_COINS_KEY)?.unwrap_or_default();
    let position: Option<Point> = decode(store, PLAYER_POS_KEY)?;
    let paths: Vec<Vec<Point>> = decode(store, PLAYER_PATHS_KEY)?.unwrap_or_default();

    let mut session = GameSession::unrefreshed(config, luck)?;
    let restored = mementos.len();
    for (cell, memento) in mementos {
        session.record_memento(cell, memento);
    }
    let position = position
        .filter(|point| point.is_finite())
        .unwrap_or(session.config().start);
    session.restore_player(position, inventory, paths);
    session.refresh_visible();
    log::debug!("loaded {} mementos", restored);
    Ok(session)
}

pub fn clear_saved(store: &mut impl KeyValueStore) {
    for key in ALL_KEYS {
        store.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn everywhere() -> FnLuck<fn(&str) -> f64> {
        fn roll(key: &str) -> f64 {
            if key.ends_with(INITIAL_COINS_SALT) { 0.35 } else { 0.0 }
        }
        FnLuck(roll as fn(&str) -> f64)
    }

    fn config() -> GameConfig {
        GameConfig {
            visibility_radius: 1,
            start: Point::new(0.00105, 0.00105),
            ..Default::default()
        }
    }

    #[test]
    fn empty_store_loads_fresh_session() {
        let store = MemoryStore::new();
        let session = load_session(config(), everywhere(), &store).unwrap();
        assert_eq!(session.player_position(), config().start);
        assert!(session.inventory().is_empty());
        assert!(session.directory().is_empty());
    }

    #[test]
    fn save_then_load_restores_progress() {
        let mut session = GameSession::new(config(), everywhere()).unwrap();
        session.collect(Cell::new(10, 10), "10:10#1").unwrap();
        session.step(Direction::West);
        session.deposit(Cell::new(9, 9), "10:10#1").unwrap();

        let mut store = MemoryStore::new();
        save_session(&session, &mut store).unwrap();
        assert_eq!(store.len(), 4);

        let mut loaded = load_session(config(), everywhere(), &store).unwrap();
        assert_eq!(loaded.player_position(), session.player_position());
        assert_eq!(loaded.paths(), session.paths());
        assert!(loaded.inventory().is_empty());
        assert_eq!(loaded.directory(), session.directory());
        assert_eq!(
            loaded.cache_at(Cell::new(10, 10)).unwrap().coin_identities(),
            vec!["10:10#0", "10:10#2"]
        );
        assert_eq!(
            loaded.cache_at(Cell::new(9, 9)).unwrap().coin_identities(),
            vec!["9:9#0", "9:9#1", "9:9#2", "10:10#1"]
        );

        let canonical = loaded.board_mut().canonicalize(Cell::new(10, 10));
        assert!(std::rc::Rc::ptr_eq(loaded.cache_at(Cell::new(10, 10)).unwrap().cell(), &canonical));
    }

    #[test]
    fn inventory_survives_reload() {
        let mut session = GameSession::new(config(), everywhere()).unwrap();
        session.collect(Cell::new(11, 10), "11:10#2").unwrap();

        let mut store = MemoryStore::new();
        save_session(&session, &mut store).unwrap();
        let loaded = load_session(config(), everywhere(), &store).unwrap();
        assert_eq!(loaded.inventory_identities(), vec!["11:10#2"]);
    }

    #[test]
    fn load_only_registers_cells_around_saved_position() {
        let mut session = GameSession::new(config(), everywhere()).unwrap();
        assert!(session.apply_position_update(Ok(Point::new(0.50005, -0.30005))));

        let mut store = MemoryStore::new();
        save_session(&session, &mut store).unwrap();
        let loaded = load_session(config(), everywhere(), &store).unwrap();

        assert_eq!(loaded.board().known_cells(), 9);
        assert_eq!(loaded.visible_caches().count(), 9);
        assert!(loaded.cache_at(Cell::new(10, 10)).is_none());
    }

    #[test]
    fn malformed_value_is_reported() {
        let mut store = MemoryStore::new();
        store.set(PLAYER_POS_KEY, "{\"lat\":".to_owned());
        let result = load_session(config(), everywhere(), &store);
        assert!(matches!(result, Err(GameError::Storage { key: PLAYER_POS_KEY, .. })));
    }

    #[test]
    fn clear_saved_removes_fixed_keys_only() {
        let session = GameSession::new(config(), everywhere()).unwrap();
        let mut store = MemoryStore::new();
        store.set("theme", "dark".to_owned());
        save_session(&session, &mut store).unwrap();

        clear_saved(&mut store);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }
}
