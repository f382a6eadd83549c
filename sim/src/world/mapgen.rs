//! Level geometry: procedurally shaped maps for the regular stages and
//! fixed arena layouts for the boss stages.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::navigation::Cell;

/// Outline of the playable area carved out of a fully blocked grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapShape {
    Rectangle,
    Circle,
}

/// Parsed or generated level geometry
#[derive(Debug, Clone)]
pub struct MapLayout {
    pub obstacles: Vec<Cell>,
    pub player_start: Cell,
    /// Pre-placed agents, only present in authored layouts
    pub enemy_spawns: Vec<Cell>,
}

/// Generates a walled map: the playable interior is carved per `shape`,
/// then 3 to 7 random blob obstacles grow inside it, and finally a 3x3
/// area around the center is cleared for the player start.
pub fn generate_shaped_map(width: usize, height: usize, shape: MapShape) -> MapLayout {
    let mut blocked = vec![vec![true; width]; height];

    match shape {
        MapShape::Rectangle => {
            for row in blocked.iter_mut().take(height - 1).skip(1) {
                for cell in row.iter_mut().take(width - 1).skip(1) {
                    *cell = false;
                }
            }
        }
        MapShape::Circle => {
            let center_x = (width / 2) as f32;
            let center_y = (height / 2) as f32;
            let radius = (width.min(height) / 2 - 1) as f32;
            for (y, row) in blocked.iter_mut().enumerate() {
                for (x, cell) in row.iter_mut().enumerate() {
                    let dx = x as f32 - center_x;
                    let dy = y as f32 - center_y;
                    if (dx * dx + dy * dy).sqrt() < radius {
                        *cell = false;
                    }
                }
            }
        }
    }

    let mut rng = rand::thread_rng();
    let blob_count = rng.gen_range(3..=7);

    for _ in 0..blob_count {
        // a walkable seed well away from the border, or skip the blob
        let mut seed = None;
        for _ in 0..100 {
            let x = rng.gen_range(5..=width - 6);
            let y = rng.gen_range(5..=height - 6);
            if !blocked[y][x] {
                seed = Some((x, y));
                break;
            }
        }
        let Some(start) = seed else { continue };

        // breadth-first growth with a dropout chance per neighbor, which
        // keeps blobs ragged instead of diamond-shaped
        let target_size = rng.gen_range(10..=20);
        let mut placed = 0;
        let mut frontier = VecDeque::from([start]);

        while placed < target_size {
            let Some((x, y)) = frontier.pop_front() else { break };
            if blocked[y][x] {
                continue;
            }
            blocked[y][x] = true;
            placed += 1;

            let mut directions = [(0i32, 1i32), (1, 0), (0, -1), (-1, 0)];
            directions.shuffle(&mut rng);
            for (dx, dy) in directions {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx > 0
                    && (nx as usize) < width - 1
                    && ny > 0
                    && (ny as usize) < height - 1
                    && !blocked[ny as usize][nx as usize]
                    && rng.gen_bool(0.7)
                {
                    frontier.push_back((nx as usize, ny as usize));
                }
            }
        }
    }

    // the start cell and its surround stay clear no matter what grew there
    let px = width / 2;
    let py = height / 2;
    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            let nx = px as i32 + dx;
            let ny = py as i32 + dy;
            if nx >= 0 && (nx as usize) < width && ny >= 0 && (ny as usize) < height {
                blocked[ny as usize][nx as usize] = false;
            }
        }
    }

    let mut obstacles = Vec::new();
    for (y, row) in blocked.iter().enumerate() {
        for (x, &cell) in row.iter().enumerate() {
            if cell {
                obstacles.push((x as i32, y as i32));
            }
        }
    }

    MapLayout {
        obstacles,
        player_start: (px as i32, py as i32),
        enemy_spawns: Vec::new(),
    }
}

/// Parses an authored layout: `B` is a block, `.` open floor, `P` the
/// player start, `E` a pre-placed agent.
pub fn parse_layout(rows: &[&str]) -> Result<MapLayout, String> {
    let mut obstacles = Vec::new();
    let mut enemy_spawns = Vec::new();
    let mut player_start = None;

    for (y, row) in rows.iter().enumerate() {
        for (x, tile) in row.chars().enumerate() {
            let cell = (x as i32, y as i32);
            match tile {
                'B' => obstacles.push(cell),
                'E' => enemy_spawns.push(cell),
                'P' => {
                    if player_start.is_some() {
                        return Err(format!("Duplicate player start at ({}, {})", x, y));
                    }
                    player_start = Some(cell);
                }
                '.' => {}
                other => return Err(format!("Unknown tile '{}' at ({}, {})", other, x, y)),
            }
        }
    }

    match player_start {
        Some(start) => Ok(MapLayout {
            obstacles,
            player_start: start,
            enemy_spawns,
        }),
        None => Err("Layout has no player start".to_string()),
    }
}

/// The arena fought in after a level's last wave. Levels past the table
/// reuse the last arena.
pub fn boss_layout(level: u32) -> &'static [&'static str] {
    match level {
        1 => &LEVEL1_BOSS_MAP,
        2 => &LEVEL2_BOSS_MAP,
        3 => &LEVEL3_BOSS_MAP,
        4 => &LEVEL4_BOSS_MAP,
        _ => &LEVEL5_BOSS_MAP,
    }
}

const LEVEL1_BOSS_MAP: [&str; 16] = [
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B...........P................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
];

const LEVEL2_BOSS_MAP: [&str; 16] = [
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
    "B............................B",
    "B............................B",
    "B.......BBBB......BBBB.......B",
    "B............................B",
    "B............................B",
    "B...........P................B",
    "B............................B",
    "B............................B",
    "B.......BBBB......BBBB.......B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
];

const LEVEL3_BOSS_MAP: [&str; 16] = [
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
    "B............................B",
    "B............................B",
    "B....BB................BB....B",
    "B...B..B..............B..B...B",
    "B...B..B..............B..B...B",
    "B...B..B......P.......B..B...B",
    "B...B..B..............B..B...B",
    "B...B..B..............B..B...B",
    "B....BB................BB....B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
];

const LEVEL4_BOSS_MAP: [&str; 16] = [
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
    "B............................B",
    "B............................B",
    "B...BBBBBB........BBBBBB.....B",
    "B...B.................B......B",
    "B...B.................B......B",
    "B...B........P........B......B",
    "B...B.................B......B",
    "B...B.................B......B",
    "B...BBBBBB........BBBBBB.....B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
];

const LEVEL5_BOSS_MAP: [&str; 16] = [
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
    "B............................B",
    "B............................B",
    "B............................B",
    "B......BBBBBBBBBBBBBB........B",
    "B............................B",
    "B.............P..............B",
    "B......B.....................B",
    "B......BBBBBBBBBBBBBB........B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "B............................B",
    "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::OccupancyGrid;

    #[test]
    fn test_rectangle_map_border_and_start_area() {
        let layout = generate_shaped_map(40, 30, MapShape::Rectangle);
        let grid = OccupancyGrid::build(&layout.obstacles, 40, 30);

        for x in 0..40 {
            assert!(!grid.is_walkable((x, 0)));
            assert!(!grid.is_walkable((x, 29)));
        }
        for y in 0..30 {
            assert!(!grid.is_walkable((0, y)));
            assert!(!grid.is_walkable((39, y)));
        }

        assert_eq!(layout.player_start, (20, 15));
        for dy in -1..=1 {
            for dx in -1..=1 {
                assert!(grid.is_walkable((20 + dx, 15 + dy)));
            }
        }
        assert!(layout.enemy_spawns.is_empty());
    }

    #[test]
    fn test_circle_map_blocks_corners() {
        let layout = generate_shaped_map(40, 30, MapShape::Circle);
        let grid = OccupancyGrid::build(&layout.obstacles, 40, 30);
        assert!(!grid.is_walkable((1, 1)));
        assert!(!grid.is_walkable((38, 1)));
        assert!(!grid.is_walkable((1, 28)));
        assert!(!grid.is_walkable((38, 28)));
        assert!(grid.is_walkable((20, 15)));
    }

    #[test]
    fn test_blob_obstacles_stay_in_bounds() {
        for _ in 0..5 {
            let layout = generate_shaped_map(40, 30, MapShape::Rectangle);
            for &(x, y) in &layout.obstacles {
                assert!(x >= 0 && x < 40 && y >= 0 && y < 30);
            }
            // border cells plus at most seven full-sized blobs
            let interior = layout
                .obstacles
                .iter()
                .filter(|&&(x, y)| x > 0 && x < 39 && y > 0 && y < 29)
                .count();
            assert!(interior <= 7 * 20);
        }
    }

    #[test]
    fn test_boss_layouts_all_parse() {
        for level in 1..=5 {
            let layout = parse_layout(boss_layout(level)).unwrap();
            let grid = OccupancyGrid::build(&layout.obstacles, 40, 30);
            // every arena is sealed by its outer wall
            for x in 0..30 {
                assert!(!grid.is_walkable((x, 0)));
                assert!(!grid.is_walkable((x, 15)));
            }
            for y in 0..16 {
                assert!(!grid.is_walkable((0, y)));
                assert!(!grid.is_walkable((29, y)));
            }
            assert!(grid.is_walkable(layout.player_start));
        }
    }

    #[test]
    fn test_level_one_arena_exact_geometry() {
        let layout = parse_layout(boss_layout(1)).unwrap();
        assert_eq!(layout.obstacles.len(), 88);
        assert_eq!(layout.player_start, (12, 6));
    }

    #[test]
    fn test_parse_layout_rejects_bad_input() {
        assert!(parse_layout(&["BPB", "BXB"]).is_err());
        assert!(parse_layout(&["B.B"]).is_err());
        assert!(parse_layout(&["BPB", "BPB"]).is_err());
    }

    #[test]
    fn test_parse_layout_collects_enemy_cells() {
        let layout = parse_layout(&["BBBB", "B.EB", "BP.B", "BBBB"]).unwrap();
        assert_eq!(layout.enemy_spawns, vec![(2, 1)]);
        assert_eq!(layout.player_start, (1, 2));
        assert_eq!(layout.obstacles.len(), 12);
    }
}
