//! Tile types and their wire codes.

use serde::{Deserialize, Serialize};

/// One cell of the arena grid.
///
/// The `u8` wire codes are part of the client contract — the arena endpoint
/// ships the grid as a matrix of these codes, so the numbering is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    IndestructibleWall,
    DestructibleWall,
    Water,
    Lava,
    Grass,
    Spawn,
    Teleporter,
}

impl Tile {
    /// Stable wire code for this tile.
    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::IndestructibleWall => 1,
            Tile::DestructibleWall => 2,
            Tile::Water => 3,
            Tile::Lava => 4,
            Tile::Grass => 5,
            Tile::Spawn => 6,
            Tile::Teleporter => 7,
        }
    }

    /// Whether players and projectiles are blocked by this tile.
    pub fn blocks_movement(self) -> bool {
        matches!(self, Tile::IndestructibleWall | Tile::DestructibleWall)
    }

    /// Whether this tile is free ground the generator may still claim
    /// (spawns, teleporters, and grass all want untouched empty cells).
    pub fn is_empty(self) -> bool {
        matches!(self, Tile::Empty)
    }

    /// Single-character glyph for console dumps.
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::IndestructibleWall => '#',
            Tile::DestructibleWall => 'D',
            Tile::Water => '~',
            Tile::Lava => 'L',
            Tile::Grass => 'G',
            Tile::Spawn => 'S',
            Tile::Teleporter => 'T',
        }
    }
}
