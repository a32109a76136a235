//! The synchronous game simulation.
//!
//! `GameSession` is plain state plus pure-ish update methods; it never
//! locks, spawns, or awaits. The actor task in [`crate::actor`] owns one
//! session and feeds it inputs and ticks in a single-threaded sequence.

use std::collections::HashMap;

use gridfire_arena::{Arena, Tile};
use gridfire_protocol::{
    ArenaSnapshot, GameId, GameSnapshot, PlayerId, PlayerSnapshot, ProjectileSnapshot, Vec2,
};

use crate::GameConfig;

/// Lifecycle of a session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Session exists, arena generated, players seated; not ticking yet.
    Created,
    /// The loop is live and inputs are applied.
    Running,
    /// Over — the actor winds down and the manager reaps the handle.
    Ended,
}

impl GamePhase {
    pub fn is_running(self) -> bool {
        matches!(self, GamePhase::Running)
    }

    pub fn is_ended(self) -> bool {
        matches!(self, GamePhase::Ended)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GamePhase::Created => "created",
            GamePhase::Running => "running",
            GamePhase::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// One player's live state.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Position in tile units (tile centers at `n + 0.5`).
    pub position: Vec2,
    /// Unit facing vector, derived from the last aim point.
    pub facing: Vec2,
    /// Facing in degrees, `[0, 360)`, client convention.
    pub angle_deg: f32,
    pub health: i32,
    /// Seconds until this player may fire again.
    pub cooldown: f32,
}

/// One projectile in flight.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub position: Vec2,
    /// Unit direction of travel.
    pub direction: Vec2,
    pub owner: PlayerId,
}

/// A full game session: arena, players, projectiles, phase.
pub struct GameSession {
    id: GameId,
    config: GameConfig,
    arena: Arena,
    players: HashMap<PlayerId, PlayerState>,
    projectiles: Vec<Projectile>,
    phase: GamePhase,
    /// Started with two or more players; only such sessions can be won.
    competitive: bool,
}

impl GameSession {
    /// Seats `players` on the arena's spawn tiles (cycling if there are
    /// more players than spawns) and enters [`GamePhase::Created`].
    pub fn new(id: GameId, config: GameConfig, arena: Arena, players: &[PlayerId]) -> Self {
        let seats = seat_positions(&arena);
        let mut seated = HashMap::with_capacity(players.len());
        for (i, &player) in players.iter().enumerate() {
            let position = seats[i % seats.len()];
            seated.insert(
                player,
                PlayerState {
                    position,
                    facing: Vec2::new(0.0, -1.0),
                    angle_deg: 0.0,
                    health: config.default_health,
                    cooldown: 0.0,
                },
            );
        }
        tracing::debug!(game_id = %id, players = seated.len(), "session assembled");
        Self {
            id,
            config,
            arena,
            competitive: seated.len() >= 2,
            players: seated,
            projectiles: Vec::new(),
            phase: GamePhase::Created,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn player(&self, player: PlayerId) -> Option<&PlayerState> {
        self.players.get(&player)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Starts the loop: `Created → Running`. Any other phase is a no-op.
    pub fn start(&mut self) {
        if self.phase == GamePhase::Created {
            self.phase = GamePhase::Running;
            tracing::info!(game_id = %self.id, players = self.players.len(), "game started");
        }
    }

    /// Applies one movement/aim input for `player`, scaled by `dt` seconds.
    ///
    /// The displacement is `delta × player_speed × dt`, so the same held
    /// key moves the same distance regardless of how often inputs arrive.
    /// A destination inside a wall reverts the whole step; landing on a
    /// teleporter relocates to its partner. Unknown players and sessions
    /// that aren't running are silent no-ops.
    pub fn process_move(&mut self, player: PlayerId, delta: Vec2, aim: Vec2, dt: f32) {
        if !self.phase.is_running() {
            return;
        }
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        let dt = dt.max(0.0);

        let candidate = state.position + delta * (self.config.player_speed * dt);
        let (tx, ty) = (candidate.x.floor() as i32, candidate.y.floor() as i32);
        if !self.arena.blocks(tx, ty) {
            state.position = candidate;
            if self.arena.tile(tx, ty) == Some(Tile::Teleporter) {
                match self.arena.connected_teleporter(tx, ty) {
                    Ok((px, py)) => {
                        state.position = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                        tracing::debug!(
                            game_id = %self.id,
                            %player,
                            from = ?(tx, ty),
                            to = ?(px, py),
                            "player teleported"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(game_id = %self.id, %err, "teleporter link missing");
                    }
                }
            }
        }

        let to_aim = aim - state.position;
        if to_aim.length() > 0.0 {
            state.facing = to_aim.normalized();
            state.angle_deg = state.position.angle_to(aim);
        }
    }

    /// Fires a projectile from `player` toward `aim`.
    ///
    /// Requests during cooldown or past the per-session projectile cap are
    /// dropped, not queued.
    pub fn process_shoot(&mut self, player: PlayerId, aim: Vec2) {
        if !self.phase.is_running() {
            return;
        }
        let Some(state) = self.players.get_mut(&player) else {
            return;
        };
        if state.cooldown > 0.0 {
            return;
        }
        if self.projectiles.len() >= self.config.max_projectiles {
            tracing::debug!(game_id = %self.id, %player, "projectile cap reached, shot dropped");
            return;
        }
        let direction = aim - state.position;
        if direction.length() == 0.0 {
            return;
        }

        self.projectiles.push(Projectile {
            position: state.position,
            direction: direction.normalized(),
            owner: player,
        });
        state.cooldown = self.config.fire_cooldown;
    }

    /// Advances the simulation by `dt` seconds: cooldowns decay,
    /// projectiles fly, hits land, and eliminations are resolved.
    pub fn advance(&mut self, dt: f32) {
        if !self.phase.is_running() {
            return;
        }
        let dt = dt.max(0.0);

        for state in self.players.values_mut() {
            state.cooldown = (state.cooldown - dt).max(0.0);
        }

        let step = self.config.projectile_speed * dt;
        let mut hits: Vec<PlayerId> = Vec::new();
        let mut kept = Vec::with_capacity(self.projectiles.len());
        for mut projectile in self.projectiles.drain(..) {
            projectile.position += projectile.direction * step;
            let tx = projectile.position.x.floor() as i32;
            let ty = projectile.position.y.floor() as i32;
            if self.arena.blocks(tx, ty) {
                continue; // absorbed by a wall, or flew out of bounds
            }

            let hit = self.players.iter().find(|(id, state)| {
                **id != projectile.owner
                    && (state.position - projectile.position).length() <= self.config.hit_radius
            });
            match hit {
                Some((&id, _)) => hits.push(id),
                None => kept.push(projectile),
            }
        }
        self.projectiles = kept;

        for id in hits {
            let Some(state) = self.players.get_mut(&id) else {
                continue;
            };
            state.health -= self.config.projectile_damage;
            if state.health <= 0 {
                self.players.remove(&id);
                tracing::info!(game_id = %self.id, player = %id, "player eliminated");
            }
        }

        if self.competitive && self.players.len() <= 1 {
            self.phase = GamePhase::Ended;
            let survivor = self.players.keys().next().copied();
            tracing::info!(game_id = %self.id, ?survivor, "game over");
        }
    }

    /// The full per-tick state payload. Players are ordered by ID so the
    /// wire output is stable.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut players: Vec<PlayerSnapshot> = self
            .players
            .iter()
            .map(|(&id, state)| PlayerSnapshot {
                player_id: id,
                x: state.position.x,
                y: state.position.y,
                direction_x: state.facing.x,
                direction_y: state.facing.y,
                angle: state.angle_deg,
                health: state.health,
            })
            .collect();
        players.sort_by_key(|p| p.player_id);

        let projectiles = self
            .projectiles
            .iter()
            .map(|p| ProjectileSnapshot {
                x: p.position.x,
                y: p.position.y,
                direction_x: p.direction.x,
                direction_y: p.direction.y,
                owner_id: p.owner,
            })
            .collect();

        GameSnapshot {
            game_id: self.id,
            players,
            projectiles,
        }
    }

    /// The static tile grid for the arena endpoint.
    pub fn arena_snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            game_id: self.id,
            dim: self.arena.dim(),
            tiles: self.arena.tile_codes(),
        }
    }
}

/// Spawn-tile centers, falling back to the first open tile on arenas
/// without spawn markings.
fn seat_positions(arena: &Arena) -> Vec<Vec2> {
    let centers: Vec<Vec2> = arena
        .spawns()
        .iter()
        .map(|&(x, y)| Vec2::new(x as f32 + 0.5, y as f32 + 0.5))
        .collect();
    if !centers.is_empty() {
        return centers;
    }

    let dim = arena.dim() as i32;
    for y in 1..dim - 1 {
        for x in 1..dim - 1 {
            if !arena.blocks(x, y) {
                return vec![Vec2::new(x as f32 + 0.5, y as f32 + 0.5)];
            }
        }
    }
    // Fully walled interior; park everyone mid-map rather than panic.
    vec![Vec2::new(dim as f32 / 2.0, dim as f32 / 2.0)]
}
