//! Error types for the game layer.

use gridfire_arena::ArenaError;
use gridfire_protocol::GameId;

/// Errors from session creation and session-handle operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No session registered under this ID.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The session's actor has exited (or its queue is gone); the caller
    /// should treat the game as over.
    #[error("game {0} is unavailable")]
    Unavailable(GameId),

    /// A session needs at least one player.
    #[error("cannot create a game with no players")]
    NoPlayers,

    /// Arena generation failed.
    #[error("arena: {0}")]
    Arena(#[from] ArenaError),
}
