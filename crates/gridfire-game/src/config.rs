//! Gameplay tuning for a session.

/// Tuning knobs shared by every session a manager creates.
///
/// Speeds are in tiles per second, the cooldown in seconds.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Side length of the generated arena.
    pub arena_dim: usize,
    /// Simulation tick rate in Hz.
    pub tick_rate_hz: u32,
    /// Player movement speed.
    pub player_speed: f32,
    /// Projectile travel speed.
    pub projectile_speed: f32,
    /// Health removed per projectile hit.
    pub projectile_damage: i32,
    /// Minimum seconds between shots from one player.
    pub fire_cooldown: f32,
    /// Cap on live projectiles per session.
    pub max_projectiles: usize,
    /// Starting health for every player.
    pub default_health: i32,
    /// Distance at which a projectile counts as hitting a player.
    pub hit_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_dim: 20,
            tick_rate_hz: 16,
            player_speed: 5.0,
            projectile_speed: 3.0,
            projectile_damage: 10,
            fire_cooldown: 0.1,
            max_projectiles: 100,
            default_health: 100,
            hit_radius: 0.5,
        }
    }
}
