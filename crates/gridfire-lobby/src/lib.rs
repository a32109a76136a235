//! Lobby lifecycle for Gridfire.
//!
//! A lobby is the pre-game staging area: a host, up to
//! [`MAX_LOBBY_PLAYERS`] members, and a per-member ready flag. The
//! [`LobbyRegistry`] owns all lobbies and the player-to-lobby index; it is
//! plain single-threaded state, guarded by one `Mutex` at the gateway, so
//! nothing in here locks or awaits.

mod error;
mod registry;

pub use error::LobbyError;
pub use registry::{Lobby, LobbyRegistry, MAX_LOBBY_PLAYERS, MIN_PLAYERS_TO_START};
