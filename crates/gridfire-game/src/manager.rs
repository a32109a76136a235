//! Session manager: creates, tracks, and reaps game sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use gridfire_arena::Arena;
use gridfire_protocol::{GameId, PlayerId};
use gridfire_tick::TickConfig;

use crate::actor::spawn_session;
use crate::{GameConfig, GameError, GameSession, SessionHandle};

/// Counter for generating unique game IDs.
static NEXT_GAME_ID: AtomicI64 = AtomicI64::new(1);

/// Default command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all live game sessions.
///
/// This is the entry point for session operations from the gateway. The
/// manager itself is not synchronized; the gateway wraps it in a single
/// `tokio::sync::Mutex` and never holds the lock across the await points
/// of handle calls.
pub struct SessionManager {
    config: GameConfig,
    /// Live sessions, keyed by game ID.
    sessions: HashMap<GameId, SessionHandle>,
}

impl SessionManager {
    /// Creates a manager whose sessions all share `config`.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Creates a session for `players`: generates the arena with one spawn
    /// per player, seats everyone, and spawns the actor in its paused
    /// `Created` phase. Returns the new game ID.
    pub fn create_game(&mut self, players: &[PlayerId]) -> Result<GameId, GameError> {
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let game_id = GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed));
        let arena = Arena::generate(self.config.arena_dim, players.len())?;
        tracing::debug!(%game_id, "\n{}", arena.render_to_string());

        let session = GameSession::new(game_id, self.config.clone(), arena, players);
        let tick_config = TickConfig::with_rate(self.config.tick_rate_hz);
        let handle = spawn_session(session, tick_config, DEFAULT_CHANNEL_SIZE);
        self.sessions.insert(game_id, handle);

        tracing::info!(%game_id, players = players.len(), "game created");
        Ok(game_id)
    }

    /// Arms the tick loop of a created session.
    pub async fn start_game(&self, game_id: GameId) -> Result<(), GameError> {
        let handle = self
            .sessions
            .get(&game_id)
            .ok_or(GameError::NotFound(game_id))?;
        handle.start().await?;
        tracing::info!(%game_id, "game loop started");
        Ok(())
    }

    /// Returns a cloned handle to a live session, if registered.
    pub fn get(&self, game_id: GameId) -> Option<SessionHandle> {
        self.sessions.get(&game_id).cloned()
    }

    /// Drops handles whose actor has exited (ended or shut down games).
    /// Returns how many were removed.
    pub fn reap(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|game_id, handle| {
            let alive = !handle.is_closed();
            if !alive {
                tracing::info!(%game_id, "reaped finished game");
            }
            alive
        });
        before - self.sessions.len()
    }

    /// Lists all registered game IDs.
    pub fn game_ids(&self) -> Vec<GameId> {
        self.sessions.keys().copied().collect()
    }

    /// Returns the number of registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
