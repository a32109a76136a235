//! The arena generator: cellular-automata terrain plus feature placement.

use std::collections::HashMap;

use rand::Rng;

use crate::{ArenaError, Tile};

/// Probability that an interior empty cell seeds a destructible wall.
const WALL_SEED_PROBABILITY: f64 = 0.35;
/// Smoothing rounds over the seeded noise.
const CA_ROUNDS: usize = 2;
/// A cell with at least this many destructible-wall neighbours becomes one.
const CA_WALL_THRESHOLD: usize = 4;
/// Probability that a destructible wall hardens into an indestructible one.
const HARDEN_PROBABILITY: f64 = 0.20;
/// Probability that a leftover empty cell grows decorative grass.
const GRASS_PROBABILITY: f64 = 0.08;
/// Random placement attempts before falling back to a linear scan.
const SPAWN_RETRY_LIMIT: usize = 128;
/// How far inside the outer ring teleporters are placed.
const TELEPORTER_BORDER_OFFSET: usize = 2;
const TELEPORTER_RETRY_LIMIT: usize = 64;
/// Below this dimension there is no sensible border band for teleporters.
const MIN_TELEPORTER_DIM: usize = 9;

/// A generated arena: square tile grid, spawn points, and the teleporter
/// pairing table. Immutable once built.
#[derive(Debug, Clone)]
pub struct Arena {
    dim: usize,
    /// Row-major: index `y * dim + x`.
    tiles: Vec<Tile>,
    spawns: Vec<(i32, i32)>,
    teleporter_links: HashMap<(i32, i32), (i32, i32)>,
}

impl Arena {
    /// Generates an arena from the process RNG, seeded once for the whole
    /// call — sub-steps share the stream, so repeated calls are independent.
    pub fn generate(dim: usize, num_spawns: usize) -> Result<Arena, ArenaError> {
        Self::generate_with(&mut rand::rng(), dim, num_spawns)
    }

    /// Generates an arena from an explicit RNG (seed it for reproducible
    /// terrain in tests).
    pub fn generate_with<R: Rng>(
        rng: &mut R,
        dim: usize,
        num_spawns: usize,
    ) -> Result<Arena, ArenaError> {
        if dim < 3 {
            return Err(ArenaError::InvalidDimension(dim));
        }

        let mut tiles = vec![Tile::Empty; dim * dim];
        place_ring_walls(&mut tiles, dim);
        place_big_liquid(rng, &mut tiles, dim);
        place_small_liquid(rng, &mut tiles, dim);
        seed_walls(rng, &mut tiles, dim);
        for _ in 0..CA_ROUNDS {
            smooth(&mut tiles, dim);
        }
        harden_walls(rng, &mut tiles, dim);
        let spawns = place_spawns(rng, &mut tiles, dim, num_spawns);
        let teleporter_links = place_teleporters(rng, &mut tiles, dim);
        place_grass(rng, &mut tiles, dim);

        tracing::debug!(
            dim,
            spawns = spawns.len(),
            teleporters = teleporter_links.len(),
            "arena generated"
        );

        Ok(Arena {
            dim,
            tiles,
            spawns,
            teleporter_links,
        })
    }

    /// Builds an arena from an explicit tile layout (hand-made maps and
    /// deterministic setups), checking the same structural invariants the
    /// generator guarantees: square grid, indestructible outer ring, and a
    /// reciprocal partner for every teleporter tile.
    ///
    /// Spawn points are read from the `Spawn` tiles, row-major.
    pub fn from_layout(
        rows: Vec<Vec<Tile>>,
        teleporter_pairs: &[((i32, i32), (i32, i32))],
    ) -> Result<Arena, ArenaError> {
        let dim = rows.len();
        if dim < 3 {
            return Err(ArenaError::InvalidDimension(dim));
        }
        if rows.iter().any(|row| row.len() != dim) {
            return Err(ArenaError::InvalidLayout(format!(
                "grid is not square ({dim} rows)"
            )));
        }

        let mut tiles = Vec::with_capacity(dim * dim);
        let mut spawns = Vec::new();
        for (y, row) in rows.into_iter().enumerate() {
            for (x, tile) in row.into_iter().enumerate() {
                let on_ring = x == 0 || y == 0 || x == dim - 1 || y == dim - 1;
                if on_ring && tile != Tile::IndestructibleWall {
                    return Err(ArenaError::InvalidLayout(format!(
                        "ring cell ({x}, {y}) is not an indestructible wall"
                    )));
                }
                if tile == Tile::Spawn {
                    spawns.push((x as i32, y as i32));
                }
                tiles.push(tile);
            }
        }

        let mut teleporter_links = HashMap::new();
        for &(a, b) in teleporter_pairs {
            if a == b {
                return Err(ArenaError::InvalidLayout(format!(
                    "teleporter ({}, {}) paired with itself",
                    a.0, a.1
                )));
            }
            for (x, y) in [a, b] {
                let in_range = x >= 0 && y >= 0 && (x as usize) < dim && (y as usize) < dim;
                if !in_range || tiles[y as usize * dim + x as usize] != Tile::Teleporter {
                    return Err(ArenaError::InvalidLayout(format!(
                        "link endpoint ({x}, {y}) is not a teleporter tile"
                    )));
                }
            }
            if teleporter_links.insert(a, b).is_some()
                || teleporter_links.insert(b, a).is_some()
            {
                return Err(ArenaError::InvalidLayout(format!(
                    "teleporter ({}, {}) or ({}, {}) linked twice",
                    a.0, a.1, b.0, b.1
                )));
            }
        }
        let linked = teleporter_links.len();
        let marked = tiles.iter().filter(|t| **t == Tile::Teleporter).count();
        if linked != marked {
            return Err(ArenaError::InvalidLayout(format!(
                "{marked} teleporter tiles but {linked} link endpoints"
            )));
        }

        Ok(Arena {
            dim,
            tiles,
            spawns,
            teleporter_links,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The tile at `(x, y)`, or `None` outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> Option<Tile> {
        if x < 0 || y < 0 || x as usize >= self.dim || y as usize >= self.dim {
            return None;
        }
        Some(self.tiles[y as usize * self.dim + x as usize])
    }

    /// Whether `(x, y)` blocks movement. Out-of-bounds counts as blocking.
    pub fn blocks(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_none_or(Tile::blocks_movement)
    }

    /// Spawn tile coordinates, in placement order.
    pub fn spawns(&self) -> &[(i32, i32)] {
        &self.spawns
    }

    /// The partner of the teleporter at `(x, y)`.
    ///
    /// Fails for any coordinate that is not a teleporter — callers must not
    /// be handed their own input back as if it were a partner.
    pub fn connected_teleporter(&self, x: i32, y: i32) -> Result<(i32, i32), ArenaError> {
        self.teleporter_links
            .get(&(x, y))
            .copied()
            .ok_or(ArenaError::NotATeleporter(x, y))
    }

    /// All teleporter coordinates.
    pub fn teleporters(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.teleporter_links.keys().copied()
    }

    /// Row-major wire codes for the arena endpoint.
    pub fn tile_codes(&self) -> Vec<Vec<u8>> {
        (0..self.dim)
            .map(|y| (0..self.dim).map(|x| self.tiles[y * self.dim + x].code()).collect())
            .collect()
    }

    /// Console rendering of the grid, one glyph per tile.
    pub fn render_to_string(&self) -> String {
        let mut out = String::with_capacity(self.dim * (self.dim + 1));
        for y in 0..self.dim {
            for x in 0..self.dim {
                out.push(self.tiles[y * self.dim + x].glyph());
            }
            out.push('\n');
        }
        out
    }
}

fn place_ring_walls(tiles: &mut [Tile], dim: usize) {
    for i in 0..dim {
        tiles[i] = Tile::IndestructibleWall; // row 0
        tiles[(dim - 1) * dim + i] = Tile::IndestructibleWall; // row dim-1
        tiles[i * dim] = Tile::IndestructibleWall; // col 0
        tiles[i * dim + dim - 1] = Tile::IndestructibleWall; // col dim-1
    }
}

/// The main body of water or lava, centered in the middle half of the map.
fn place_big_liquid<R: Rng>(rng: &mut R, tiles: &mut [Tile], dim: usize) {
    let liquid = random_liquid(rng);
    let lo = (dim / 4).max(1);
    let hi = (dim - lo).max(lo + 1);
    let cx = rng.random_range(lo..hi);
    let cy = rng.random_range(lo..hi);
    let radius = (dim / 5).max(1) + rng.random_range(0..(dim / 10).max(1));
    fill_disc(tiles, dim, cx as i32, cy as i32, radius as i32, liquid);
}

/// A smaller lake biased toward a map edge.
fn place_small_liquid<R: Rng>(rng: &mut R, tiles: &mut [Tile], dim: usize) {
    let liquid = random_liquid(rng);
    let band = (dim / 4).max(1);
    let cx = edge_biased_coord(rng, dim, band);
    let cy = edge_biased_coord(rng, dim, band);
    let radius = rng.random_range(1..=(dim / 10).max(1));
    fill_disc(tiles, dim, cx as i32, cy as i32, radius as i32, liquid);
}

fn random_liquid<R: Rng>(rng: &mut R) -> Tile {
    if rng.random::<bool>() {
        Tile::Water
    } else {
        Tile::Lava
    }
}

/// Picks a coordinate within `band` cells of either edge of the axis.
fn edge_biased_coord<R: Rng>(rng: &mut R, dim: usize, band: usize) -> usize {
    if rng.random::<bool>() {
        rng.random_range(0..band)
    } else {
        dim - 1 - rng.random_range(0..band)
    }
}

/// Marks every interior cell within the Euclidean radius of the center.
fn fill_disc(tiles: &mut [Tile], dim: usize, cx: i32, cy: i32, radius: i32, tile: Tile) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let x = cx + dx;
            let y = cy + dy;
            if x < 1 || y < 1 || x >= dim as i32 - 1 || y >= dim as i32 - 1 {
                continue;
            }
            if dx * dx + dy * dy <= r2 {
                tiles[y as usize * dim + x as usize] = tile;
            }
        }
    }
}

fn seed_walls<R: Rng>(rng: &mut R, tiles: &mut [Tile], dim: usize) {
    for y in 1..dim - 1 {
        for x in 1..dim - 1 {
            let idx = y * dim + x;
            if tiles[idx].is_empty() && rng.random_bool(WALL_SEED_PROBABILITY) {
                tiles[idx] = Tile::DestructibleWall;
            }
        }
    }
}

/// One cellular-automaton round. The whole next grid is computed from a
/// snapshot of the previous one, so neighbour reads never observe this
/// round's own writes. Only noise cells (empty or destructible) take part;
/// liquids, hardened walls, and the ring pass through untouched.
fn smooth(tiles: &mut Vec<Tile>, dim: usize) {
    let prev = tiles.clone();
    for y in 1..dim - 1 {
        for x in 1..dim - 1 {
            let idx = y * dim + x;
            if !matches!(prev[idx], Tile::Empty | Tile::DestructibleWall) {
                continue;
            }

            let mut wall_count = 0;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = (x as i32 + dx) as usize;
                    let ny = (y as i32 + dy) as usize;
                    if prev[ny * dim + nx] == Tile::DestructibleWall {
                        wall_count += 1;
                    }
                }
            }

            tiles[idx] = if wall_count >= CA_WALL_THRESHOLD {
                Tile::DestructibleWall
            } else {
                Tile::Empty
            };
        }
    }
}

fn harden_walls<R: Rng>(rng: &mut R, tiles: &mut [Tile], dim: usize) {
    for y in 1..dim - 1 {
        for x in 1..dim - 1 {
            let idx = y * dim + x;
            if tiles[idx] == Tile::DestructibleWall && rng.random_bool(HARDEN_PROBABILITY) {
                tiles[idx] = Tile::IndestructibleWall;
            }
        }
    }
}

/// Places spawn tiles on open ground: bounded reject-and-retry, then a
/// linear scan when the map is too crowded for luck.
fn place_spawns<R: Rng>(
    rng: &mut R,
    tiles: &mut [Tile],
    dim: usize,
    num_spawns: usize,
) -> Vec<(i32, i32)> {
    let mut spawns = Vec::with_capacity(num_spawns);
    for _ in 0..num_spawns {
        let mut placed = None;
        for _ in 0..SPAWN_RETRY_LIMIT {
            let x = rng.random_range(1..dim - 1);
            let y = rng.random_range(1..dim - 1);
            if tiles[y * dim + x].is_empty() {
                placed = Some((x, y));
                break;
            }
        }
        let found = placed.or_else(|| first_empty(tiles, dim));
        match found {
            Some((x, y)) => {
                tiles[y * dim + x] = Tile::Spawn;
                spawns.push((x as i32, y as i32));
            }
            None => {
                tracing::warn!(
                    dim,
                    placed = spawns.len(),
                    requested = num_spawns,
                    "ran out of empty cells while placing spawns"
                );
                break;
            }
        }
    }
    spawns
}

fn first_empty(tiles: &[Tile], dim: usize) -> Option<(usize, usize)> {
    for y in 1..dim - 1 {
        for x in 1..dim - 1 {
            if tiles[y * dim + x].is_empty() {
                return Some((x, y));
            }
        }
    }
    None
}

/// Places teleporters in the border band, one candidate per side, and pairs
/// them reciprocally. Every placed teleporter ends up with exactly one
/// partner; an odd leftover candidate is rolled back rather than orphaned.
fn place_teleporters<R: Rng>(
    rng: &mut R,
    tiles: &mut [Tile],
    dim: usize,
) -> HashMap<(i32, i32), (i32, i32)> {
    let mut links = HashMap::new();
    if dim < MIN_TELEPORTER_DIM {
        return links;
    }

    let offset = TELEPORTER_BORDER_OFFSET;
    let far = dim - 1 - offset;
    let mut candidates: Vec<(usize, usize)> = Vec::with_capacity(4);

    // (fixed axis value, which axis is fixed): top, bottom, left, right.
    let sides = [(offset, true), (far, true), (offset, false), (far, false)];
    for (fixed, is_row) in sides {
        for _ in 0..TELEPORTER_RETRY_LIMIT {
            let roaming = rng.random_range(offset..=far);
            let (x, y) = if is_row { (roaming, fixed) } else { (fixed, roaming) };
            if tiles[y * dim + x].is_empty() {
                tiles[y * dim + x] = Tile::Teleporter;
                candidates.push((x, y));
                break;
            }
        }
    }

    if candidates.len() % 2 == 1 {
        let (x, y) = candidates.pop().expect("odd length implies non-empty");
        tiles[y * dim + x] = Tile::Empty;
    }

    for pair in candidates.chunks_exact(2) {
        let a = (pair[0].0 as i32, pair[0].1 as i32);
        let b = (pair[1].0 as i32, pair[1].1 as i32);
        links.insert(a, b);
        links.insert(b, a);
    }
    links
}

fn place_grass<R: Rng>(rng: &mut R, tiles: &mut [Tile], dim: usize) {
    for y in 1..dim - 1 {
        for x in 1..dim - 1 {
            let idx = y * dim + x;
            if tiles[idx].is_empty() && rng.random_bool(GRASS_PROBABILITY) {
                tiles[idx] = Tile::Grass;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn arena(seed: u64, dim: usize, spawns: usize) -> Arena {
        let mut rng = StdRng::seed_from_u64(seed);
        Arena::generate_with(&mut rng, dim, spawns).unwrap()
    }

    #[test]
    fn test_dimension_below_three_rejected() {
        assert!(matches!(
            Arena::generate(2, 1),
            Err(ArenaError::InvalidDimension(2))
        ));
        assert!(matches!(
            Arena::generate(0, 0),
            Err(ArenaError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_outer_ring_is_indestructible_for_all_dims() {
        for dim in [3, 4, 5, 9, 12, 20, 33] {
            let arena = arena(dim as u64, dim, 2);
            let last = dim as i32 - 1;
            for i in 0..dim as i32 {
                assert_eq!(arena.tile(i, 0), Some(Tile::IndestructibleWall));
                assert_eq!(arena.tile(i, last), Some(Tile::IndestructibleWall));
                assert_eq!(arena.tile(0, i), Some(Tile::IndestructibleWall));
                assert_eq!(arena.tile(last, i), Some(Tile::IndestructibleWall));
            }
        }
    }

    #[test]
    fn test_teleporter_pairing_is_symmetric_and_never_self() {
        for seed in 0..20 {
            let arena = arena(seed, 20, 4);
            for (x, y) in arena.teleporters().collect::<Vec<_>>() {
                let (px, py) = arena.connected_teleporter(x, y).unwrap();
                assert_ne!((px, py), (x, y), "teleporter paired with itself");
                assert_eq!(
                    arena.connected_teleporter(px, py).unwrap(),
                    (x, y),
                    "pairing is not reciprocal"
                );
                assert_eq!(arena.tile(x, y), Some(Tile::Teleporter));
                assert_eq!(arena.tile(px, py), Some(Tile::Teleporter));
            }
        }
    }

    #[test]
    fn test_connected_teleporter_fails_loudly_off_teleporter() {
        let arena = arena(7, 20, 2);
        // (0, 0) is ring wall, never a teleporter.
        assert!(matches!(
            arena.connected_teleporter(0, 0),
            Err(ArenaError::NotATeleporter(0, 0))
        ));
        assert!(matches!(
            arena.connected_teleporter(-5, 3),
            Err(ArenaError::NotATeleporter(-5, 3))
        ));
    }

    #[test]
    fn test_spawns_land_on_spawn_tiles() {
        let arena = arena(11, 20, 6);
        assert_eq!(arena.spawns().len(), 6);
        for &(x, y) in arena.spawns() {
            assert_eq!(arena.tile(x, y), Some(Tile::Spawn));
            // Interior only.
            assert!(x >= 1 && y >= 1 && x < 19 && y < 19);
        }
    }

    #[test]
    fn test_generation_is_deterministic_under_a_seed() {
        let a = arena(99, 16, 3);
        let b = arena(99, 16, 3);
        assert_eq!(a.tile_codes(), b.tile_codes());
        assert_eq!(a.spawns(), b.spawns());
    }

    #[test]
    fn test_distinct_seeds_produce_distinct_terrain() {
        let a = arena(1, 20, 3);
        let b = arena(2, 20, 3);
        assert_ne!(a.tile_codes(), b.tile_codes());
    }

    #[test]
    fn test_tiny_arena_skips_teleporters() {
        let arena = arena(5, 5, 1);
        assert_eq!(arena.teleporters().count(), 0);
    }

    #[test]
    fn test_blocks_out_of_bounds_and_walls() {
        let arena = arena(3, 12, 2);
        assert!(arena.blocks(-1, 4));
        assert!(arena.blocks(0, 0));
        let (sx, sy) = arena.spawns()[0];
        assert!(!arena.blocks(sx, sy));
    }

    fn layout_from_glyphs(map: &[&str]) -> Vec<Vec<Tile>> {
        map.iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '#' => Tile::IndestructibleWall,
                        'D' => Tile::DestructibleWall,
                        'S' => Tile::Spawn,
                        'T' => Tile::Teleporter,
                        _ => Tile::Empty,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_from_layout_accepts_a_valid_map() {
        let rows = layout_from_glyphs(&[
            "#####",
            "#S.T#",
            "#.D.#",
            "#T.S#",
            "#####",
        ]);
        let arena = Arena::from_layout(rows, &[((3, 1), (1, 3))]).unwrap();
        assert_eq!(arena.spawns(), &[(1, 1), (3, 3)]);
        assert_eq!(arena.connected_teleporter(3, 1).unwrap(), (1, 3));
        assert_eq!(arena.connected_teleporter(1, 3).unwrap(), (3, 1));
    }

    #[test]
    fn test_from_layout_rejects_broken_ring() {
        let mut rows = layout_from_glyphs(&["###", "#.#", "###"]);
        rows[0][1] = Tile::Empty;
        assert!(matches!(
            Arena::from_layout(rows, &[]),
            Err(ArenaError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_from_layout_rejects_orphan_and_self_paired_teleporters() {
        let orphan = layout_from_glyphs(&["#####", "#T..#", "#...#", "#...#", "#####"]);
        assert!(matches!(
            Arena::from_layout(orphan, &[]),
            Err(ArenaError::InvalidLayout(_))
        ));

        let selfish = layout_from_glyphs(&["#####", "#T..#", "#...#", "#...#", "#####"]);
        assert!(matches!(
            Arena::from_layout(selfish, &[((1, 1), (1, 1))]),
            Err(ArenaError::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_render_matches_grid_shape() {
        let arena = arena(4, 10, 1);
        let text = arena.render_to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.chars().count() == 10));
        assert!(lines[0].chars().all(|c| c == '#'));
    }
}
