use std::sync::Arc;

use crate::{
    config::AppConfig,
    core::{DiceRoller, RandomDice, RoomSessionManager, SeededDice, TurnEngine},
    store::{MemoryStore, SharedStore},
};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub sessions: RoomSessionManager,
    pub engine: TurnEngine,
    pub secret_key: String,
    /// Mark session cookies `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    /// Wire the core against any store and dice source
    pub fn new(store: Arc<dyn SharedStore>, dice: Arc<dyn DiceRoller>, secret_key: String) -> Self {
        Self {
            sessions: RoomSessionManager::new(store.clone()),
            engine: TurnEngine::new(store, dice),
            secret_key,
            secure_cookies: false,
        }
    }

    /// State for the server binary: an in-memory store and configured dice
    pub fn from_config(config: &AppConfig) -> Self {
        let dice: Arc<dyn DiceRoller> = match config.dice_seed {
            Some(seed) => Arc::new(SeededDice::new(seed)),
            None => Arc::new(RandomDice),
        };
        let mut state = Self::new(Arc::new(MemoryStore::new()), dice, config.secret_key.clone());
        state.secure_cookies = !config.environment.is_development();
        state
    }
}
