//! Error types for the lobby layer.

use gridfire_protocol::{LobbyId, PlayerId};

/// Errors from lobby registry operations.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The lobby doesn't exist (or was already deleted).
    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    /// The player is already a member of a *different* lobby.
    #[error("player {0} is already in lobby {1}")]
    AlreadyInLobby(PlayerId, LobbyId),

    /// The lobby is at capacity.
    #[error("lobby {0} is full")]
    Full(LobbyId),

    /// The player is not a member of this lobby.
    #[error("player {0} is not in lobby {1}")]
    NotAMember(PlayerId, LobbyId),
}
