//! Messages that travel over the duplex channel and the arena endpoint.
//!
//! Field names are pinned with `#[serde(rename)]` — the client SDK predates
//! this server and its JSON shapes are the contract, mixed casing included
//! (`deltaX` but `is_shooting`).

use serde::{Deserialize, Serialize};

use crate::{GameId, PlayerId};

/// Wire value a client sends as `gameId` before it has joined a game.
pub const NO_GAME_SENTINEL: i64 = -1;

/// One inbound message on the duplex channel.
///
/// Every message carries the full input state for one client frame; the
/// server answers each with exactly one snapshot (or the `"0"` sentinel if
/// the game id does not resolve).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(rename = "gameId")]
    pub game_id: i64,
    #[serde(rename = "deltaX")]
    pub delta_x: f32,
    #[serde(rename = "deltaY")]
    pub delta_y: f32,
    #[serde(rename = "mouseX")]
    pub mouse_x: f32,
    #[serde(rename = "mouseY")]
    pub mouse_y: f32,
    /// 1 = the client is firing this frame. Kept as an integer, not a bool,
    /// to match the wire contract.
    pub is_shooting: i32,
}

impl ClientInput {
    /// The session this input addresses, or `None` for the no-game sentinel
    /// (and any other out-of-band negative value).
    pub fn target_game(&self) -> Option<GameId> {
        if self.game_id < 0 {
            None
        } else {
            Some(GameId(self.game_id))
        }
    }
}

/// One player's state inside a [`GameSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "directionX")]
    pub direction_x: f32,
    #[serde(rename = "directionY")]
    pub direction_y: f32,
    /// Facing in degrees, `[0, 360)`, 0 = the client's reference direction.
    pub angle: f32,
    pub health: i32,
}

/// One projectile's state inside a [`GameSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "directionX")]
    pub direction_x: f32,
    #[serde(rename = "directionY")]
    pub direction_y: f32,
    #[serde(rename = "ownerId")]
    pub owner_id: PlayerId,
}

/// The full per-tick state broadcast: everything a client needs to render
/// one frame of a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(rename = "gameId")]
    pub game_id: GameId,
    pub players: Vec<PlayerSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

/// The static tile grid, sent once at session start (or on request) —
/// never per tick, since tiles do not change during play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    #[serde(rename = "gameId")]
    pub game_id: GameId,
    pub dim: usize,
    /// Row-major tile codes (see the arena crate for the code table).
    pub tiles: Vec<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_input_decodes_wire_field_names() {
        let json = r#"{
            "playerId": 7, "gameId": 3,
            "deltaX": 1.0, "deltaY": -1.0,
            "mouseX": 120.5, "mouseY": 80.25,
            "is_shooting": 1
        }"#;
        let input: ClientInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.player_id, PlayerId(7));
        assert_eq!(input.target_game(), Some(GameId(3)));
        assert_eq!(input.is_shooting, 1);
        assert!((input.mouse_x - 120.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_client_input_no_game_sentinel() {
        let json = r#"{
            "playerId": 7, "gameId": -1,
            "deltaX": 0.0, "deltaY": 0.0,
            "mouseX": 0.0, "mouseY": 0.0,
            "is_shooting": 0
        }"#;
        let input: ClientInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.game_id, NO_GAME_SENTINEL);
        assert_eq!(input.target_game(), None);
    }

    #[test]
    fn test_client_input_missing_field_rejected() {
        let json = r#"{"playerId": 7, "gameId": 3}"#;
        let result: Result<ClientInput, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_player_snapshot_json_shape() {
        let snap = PlayerSnapshot {
            player_id: PlayerId(4),
            x: 2.5,
            y: 3.5,
            direction_x: 0.0,
            direction_y: 1.0,
            angle: 180.0,
            health: 90,
        };
        let json: serde_json::Value = serde_json::to_value(snap).unwrap();
        assert_eq!(json["playerId"], 4);
        assert_eq!(json["directionX"], 0.0);
        assert_eq!(json["directionY"], 1.0);
        assert_eq!(json["health"], 90);
    }

    #[test]
    fn test_game_snapshot_round_trip() {
        let snap = GameSnapshot {
            game_id: GameId(2),
            players: vec![PlayerSnapshot {
                player_id: PlayerId(1),
                x: 1.0,
                y: 1.0,
                direction_x: 1.0,
                direction_y: 0.0,
                angle: 90.0,
                health: 100,
            }],
            projectiles: vec![ProjectileSnapshot {
                x: 5.0,
                y: 5.0,
                direction_x: 0.0,
                direction_y: -1.0,
                owner_id: PlayerId(1),
            }],
        };
        let text = serde_json::to_string(&snap).unwrap();
        let decoded: GameSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(snap, decoded);
    }

    #[test]
    fn test_arena_snapshot_json_shape() {
        let snap = ArenaSnapshot {
            game_id: GameId(9),
            dim: 3,
            tiles: vec![vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]],
        };
        let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["gameId"], 9);
        assert_eq!(json["dim"], 3);
        assert_eq!(json["tiles"][1][1], 0);
    }
}
