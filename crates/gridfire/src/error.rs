//! Unified error type for the Gridfire server.

use gridfire_game::GameError;
use gridfire_lobby::LobbyError;
use gridfire_protocol::ProtocolError;
use gridfire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GridfireError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby-level error (not found, full, membership).
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A game-level error (not found, unavailable, arena).
    #[error(transparent)]
    Game(#[from] GameError),

    /// An I/O error from the HTTP listener.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use gridfire_protocol::{GameId, LobbyId};

    use super::*;

    #[test]
    fn test_from_lobby_error() {
        let err: GridfireError = LobbyError::NotFound(LobbyId(1)).into();
        assert!(matches!(err, GridfireError::Lobby(_)));
        assert!(err.to_string().contains("L-1"));
    }

    #[test]
    fn test_from_game_error() {
        let err: GridfireError = GameError::NotFound(GameId(2)).into();
        assert!(matches!(err, GridfireError::Game(_)));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GridfireError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, GridfireError::Protocol(_)));
    }
}
