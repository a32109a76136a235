//! Game sessions for Gridfire.
//!
//! A [`GameSession`] is the synchronous simulation: players, projectiles,
//! and the arena they fight in. Each live session is owned by exactly one
//! actor task ([`spawn_session`]) that serializes all mutation — inputs
//! from the duplex channel and the periodic tick both go through its
//! command queue, so snapshots can never observe a half-applied update.
//! The [`SessionManager`] creates sessions and tracks their handles.

mod actor;
mod config;
mod error;
mod manager;
mod session;

pub use actor::{spawn_session, SessionHandle, SessionInfo};
pub use config::GameConfig;
pub use error::GameError;
pub use manager::SessionManager;
pub use session::{GamePhase, GameSession, PlayerState, Projectile};
