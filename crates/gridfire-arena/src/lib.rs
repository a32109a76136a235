//! Procedural arena generation for Gridfire.
//!
//! An [`Arena`] is a square grid of [`Tile`]s produced once at session
//! creation and immutable for the session's lifetime. Generation is a pure
//! function of its inputs and the supplied RNG — no shared state, which is
//! what lets the generator run inside any task and be replayed in tests
//! with a seeded RNG.

mod error;
mod generator;
mod tile;

pub use error::ArenaError;
pub use generator::Arena;
pub use tile::Tile;
