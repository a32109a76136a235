//! Wire protocol for the Gridfire arena server.
//!
//! Everything that travels between clients and the server is defined here:
//! id newtypes, the 2D vector used by the simulation, the duplex-channel
//! input message, the per-tick snapshot payloads, and the codec seam that
//! turns them into text and back.

mod codec;
mod error;
mod types;
mod wire;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{GameId, LobbyId, PlayerId, Vec2, ROTATION_OFFSET_DEG};
pub use wire::{
    ArenaSnapshot, ClientInput, GameSnapshot, PlayerSnapshot,
    ProjectileSnapshot, NO_GAME_SENTINEL,
};
