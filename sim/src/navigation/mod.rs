//! Navigation geometry: vector math, the occupancy grid, line of sight,
//! and axis-separated collision resolution against static obstacles.
//!
//! Positions are the top-left corner of a tile-sized bounding box, so
//! steering an agent's origin onto a cell's origin is the same as steering
//! its center onto the cell's center.

pub mod pathfinding;
pub mod steering;

use redoubt_shared::config::{COLLISION_BUFFER, GRID_HEIGHT, GRID_WIDTH, TILE_SIZE};

/// Grid cell address as (column, row)
pub type Cell = (i32, i32);

// ====== Vector Math ======

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn normalized(&self) -> Vec2 {
        let len = self.length();
        if len > 0.0001 {
            Vec2::new(self.x / len, self.y / len)
        } else {
            Vec2::zero()
        }
    }

    pub fn distance_to(&self, other: &Vec2) -> f32 {
        (*other - *self).length()
    }

    pub fn dot(&self, other: &Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl std::ops::Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, scalar: f32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

// ====== Grid Conversions ======

/// World point to the cell containing it
pub fn world_to_cell(x: f32, y: f32) -> Cell {
    (
        (x / TILE_SIZE).floor() as i32,
        (y / TILE_SIZE).floor() as i32,
    )
}

/// Top-left world point of a cell
pub fn cell_origin(cell: Cell) -> Vec2 {
    Vec2::new(cell.0 as f32 * TILE_SIZE, cell.1 as f32 * TILE_SIZE)
}

/// World-space center of a cell
pub fn cell_center(cell: Cell) -> Vec2 {
    cell_origin(cell) + Vec2::new(TILE_SIZE / 2.0, TILE_SIZE / 2.0)
}

/// Center of the tile-sized box anchored at `pos`
pub fn box_center(pos: Vec2) -> Vec2 {
    pos + Vec2::new(TILE_SIZE / 2.0, TILE_SIZE / 2.0)
}

// ====== Occupancy Grid ======

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Walkable,
    Blocked,
}

/// Boolean walkability grid rebuilt on every level load.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
}

impl OccupancyGrid {
    /// Builds a grid with every obstacle cell marked blocked.
    /// Obstacle coordinates outside the grid are silently ignored.
    pub fn build(obstacles: &[Cell], width: usize, height: usize) -> Self {
        let mut grid = Self {
            width,
            height,
            cells: vec![CellState::Walkable; width * height],
        };
        for &(x, y) in obstacles {
            if x >= 0 && (x as usize) < width && y >= 0 && (y as usize) < height {
                grid.cells[y as usize * width + x as usize] = CellState::Blocked;
            }
        }
        grid
    }

    /// Default-sized empty grid
    pub fn empty() -> Self {
        Self::build(&[], GRID_WIDTH, GRID_HEIGHT)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.0 >= 0
            && (cell.0 as usize) < self.width
            && cell.1 >= 0
            && (cell.1 as usize) < self.height
    }

    /// Out-of-bounds cells count as not walkable
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell)
            && self.cells[cell.1 as usize * self.width + cell.0 as usize] == CellState::Walkable
    }
}

// ====== Line of Sight ======

/// Tests whether the straight segment between two world points (box centers)
/// is clear of blocked cells.
///
/// Samples the segment at half-tile increments rather than tracing a strict
/// supercover line, so gaps thinner than half a tile can slip through. The
/// approximation is part of observed chase behavior, keep it.
pub fn has_line_of_sight(from: Vec2, to: Vec2, grid: &OccupancyGrid) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance < TILE_SIZE {
        return true;
    }

    let dir = delta.normalized();
    let half_tile = TILE_SIZE / 2.0;
    let steps = (distance / half_tile).floor() as i32;
    for i in 1..=steps {
        let sample = from + dir * (half_tile * i as f32);
        let cell = world_to_cell(sample.x, sample.y);
        if !grid.is_walkable(cell) {
            return false;
        }
    }
    true
}

// ====== Collision ======

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Tile-sized box anchored at a world position
    pub fn tile_box(pos: Vec2) -> Self {
        Self::new(pos.x, pos.y, TILE_SIZE, TILE_SIZE)
    }

    /// Strict overlap; touching edges do not collide
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Point containment; the far edges are exclusive like `overlaps`
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x < self.x + self.w
            && point.y >= self.y
            && point.y < self.y + self.h
    }
}

/// Tile-sized rects for a set of obstacle cells
pub fn obstacle_rects(obstacles: &[Cell]) -> Vec<Rect> {
    obstacles
        .iter()
        .map(|&cell| Rect::tile_box(cell_origin(cell)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Pushes a tile-sized box at `pos` back out of the first obstacle it
/// overlaps along one axis. `moved` is the displacement just applied on that
/// axis; its sign picks which obstacle face to clamp against. Returns true
/// on contact so the caller can zero that axis of its velocity.
pub fn resolve_axis_collision(pos: &mut Vec2, axis: Axis, moved: f32, obstacles: &[Rect]) -> bool {
    if moved == 0.0 {
        return false;
    }
    let agent = Rect::tile_box(*pos);
    for obs in obstacles {
        if agent.overlaps(obs) {
            match axis {
                Axis::X => {
                    if moved > 0.0 {
                        pos.x = obs.x - TILE_SIZE - COLLISION_BUFFER;
                    } else {
                        pos.x = obs.x + obs.w + COLLISION_BUFFER;
                    }
                }
                Axis::Y => {
                    if moved > 0.0 {
                        pos.y = obs.y - TILE_SIZE - COLLISION_BUFFER;
                    } else {
                        pos.y = obs.y + obs.h + COLLISION_BUFFER;
                    }
                }
            }
            return true;
        }
    }
    false
}

/// Keeps a tile-sized box inside the level bounds
pub fn clamp_to_level(pos: &mut Vec2) {
    let max_x = GRID_WIDTH as f32 * TILE_SIZE - TILE_SIZE;
    let max_y = GRID_HEIGHT as f32 * TILE_SIZE - TILE_SIZE;
    pos.x = pos.x.clamp(0.0, max_x);
    pos.y = pos.y.clamp(0.0, max_y);
}
