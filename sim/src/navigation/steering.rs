//! Per-agent steering: velocity blending toward the player or a cached
//! path, stall-trend detection, the stuck/corner-recovery state machine,
//! and pairwise separation math.

use std::collections::VecDeque;

use log::trace;

use redoubt_shared::config::{
    ENEMY_ACCELERATION, ENEMY_BASE_SPEED, ENEMY_DECELERATION, ESCAPE_PROBE_DISTANCE,
    PATH_UPDATE_DELAY, POSITION_HISTORY_LEN, RECOVERY_DURATION, RECOVERY_STRENGTH,
    SEPARATION_MARGIN, SEPARATION_PUSH, SEPARATION_VELOCITY_BIAS, STUCK_MOVE_EPSILON,
    STUCK_SPEED_EPSILON, STUCK_TICK_THRESHOLD, STUCK_TRIGGER_COOLDOWN, TELEPORT_STUCK_LIMIT,
};

use super::pathfinding::find_path;
use super::{box_center, cell_origin, has_line_of_sight, world_to_cell, Cell, OccupancyGrid, Rect, Vec2};

/// Velocity model constants for one agent
#[derive(Debug, Clone, Copy)]
pub struct SteeringLimits {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
}

impl Default for SteeringLimits {
    fn default() -> Self {
        Self {
            max_speed: ENEMY_BASE_SPEED,
            acceleration: ENEMY_ACCELERATION,
            deceleration: ENEMY_DECELERATION,
        }
    }
}

/// Transition reported by the stuck tracker for the caller to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckAction {
    RecoveryStarted,
    TeleportNeeded,
}

/// Navigation state carried by every agent. All fields exist from
/// construction; nothing is probed into existence later.
#[derive(Debug, Clone)]
pub struct NavState {
    pub path: Vec<Cell>,
    pub path_index: usize,
    pub last_path_update: f32,
    pub needs_repath: bool,
    pub history: VecDeque<Vec2>,
    pub recovering: bool,
    pub escape_dir: Vec2,
    pub recovery_started: f32,
    pub stuck_count: u32,
    pub last_stuck_trigger: f32,
}

impl NavState {
    pub fn new() -> Self {
        Self {
            path: Vec::new(),
            path_index: 0,
            last_path_update: 0.0,
            needs_repath: false,
            history: VecDeque::with_capacity(POSITION_HISTORY_LEN),
            recovering: false,
            escape_dir: Vec2::zero(),
            recovery_started: 0.0,
            stuck_count: 0,
            last_stuck_trigger: -STUCK_TRIGGER_COOLDOWN,
        }
    }

    /// Computes this tick's displacement request: line-of-sight pursuit when
    /// the player is visible, cached-path following otherwise, blended into
    /// the current velocity by the acceleration model.
    pub fn steer(
        &mut self,
        pos: Vec2,
        velocity: Vec2,
        limits: SteeringLimits,
        player_pos: Vec2,
        grid: &OccupancyGrid,
        now: f32,
    ) -> Vec2 {
        self.record_position(pos);
        if self.stall_trend() {
            self.needs_repath = true;
        }

        let target = if has_line_of_sight(box_center(pos), box_center(player_pos), grid) {
            (player_pos - pos).normalized() * limits.max_speed
        } else {
            if self.path.is_empty()
                || self.needs_repath
                || now - self.last_path_update >= PATH_UPDATE_DELAY
            {
                self.recompute_path(pos, player_pos, grid, now);
            }
            match self.path.get(self.path_index) {
                Some(&waypoint) => {
                    let target_pos = cell_origin(waypoint);
                    if (target_pos.x - pos.x).abs() <= limits.max_speed
                        && (target_pos.y - pos.y).abs() <= limits.max_speed
                    {
                        // Close enough: consume the waypoint and hold;
                        // next tick steers at the one after it.
                        self.path_index += 1;
                        Vec2::zero()
                    } else {
                        (target_pos - pos).normalized() * limits.max_speed
                    }
                }
                None => Vec2::zero(),
            }
        };

        Vec2::new(
            approach_axis(velocity.x, target.x, limits.acceleration, limits.deceleration),
            approach_axis(velocity.y, target.y, limits.acceleration, limits.deceleration),
        )
    }

    /// While corner recovery is active, the forced displacement that
    /// replaces steering output. Expires after the recovery window and asks
    /// for a fresh path.
    pub fn recovery_override(&mut self, now: f32, max_speed: f32) -> Option<Vec2> {
        if !self.recovering {
            return None;
        }
        if now - self.recovery_started >= RECOVERY_DURATION {
            self.recovering = false;
            self.needs_repath = true;
            return None;
        }
        Some(self.escape_dir * max_speed * RECOVERY_STRENGTH)
    }

    /// Compares commanded motion with what actually happened this tick and
    /// drives the Idle -> Recovering transitions.
    pub fn track_movement(
        &mut self,
        previous: Vec2,
        current: Vec2,
        commanded_speed: f32,
        velocity: Vec2,
        obstacles: &[Rect],
        grid: &OccupancyGrid,
        now: f32,
    ) -> Option<StuckAction> {
        let actual = previous.distance_to(&current);
        if actual < STUCK_MOVE_EPSILON && commanded_speed > STUCK_SPEED_EPSILON {
            self.stuck_count += 1;
        } else {
            self.stuck_count = 0;
            self.recovering = false;
            return None;
        }

        if self.stuck_count > TELEPORT_STUCK_LIMIT {
            self.stuck_count = 0;
            self.recovering = false;
            self.needs_repath = true;
            return Some(StuckAction::TeleportNeeded);
        }

        if self.stuck_count >= STUCK_TICK_THRESHOLD
            && !self.recovering
            && now - self.last_stuck_trigger >= STUCK_TRIGGER_COOLDOWN
        {
            self.recovering = true;
            self.recovery_started = now;
            self.last_stuck_trigger = now;
            self.needs_repath = true;
            self.escape_dir = select_escape_direction(current, velocity, obstacles, grid);
            return Some(StuckAction::RecoveryStarted);
        }

        None
    }

    fn record_position(&mut self, pos: Vec2) {
        self.history.push_back(pos);
        if self.history.len() > POSITION_HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// True when the full history window collapses to at most two distinct
    /// rounded positions. Catches oscillation that moves too far per tick to
    /// register as stuck.
    fn stall_trend(&self) -> bool {
        if self.history.len() < POSITION_HISTORY_LEN {
            return false;
        }
        let mut distinct: Vec<(i32, i32)> = Vec::new();
        for pos in &self.history {
            let rounded = (pos.x.round() as i32, pos.y.round() as i32);
            if !distinct.contains(&rounded) {
                distinct.push(rounded);
                if distinct.len() > 2 {
                    return false;
                }
            }
        }
        true
    }

    fn recompute_path(&mut self, pos: Vec2, player_pos: Vec2, grid: &OccupancyGrid, now: f32) {
        let start = world_to_cell(pos.x, pos.y);
        let goal = world_to_cell(player_pos.x, player_pos.y);
        self.path = find_path(start, goal, grid);
        self.path_index = 0;
        self.last_path_update = now;
        self.needs_repath = false;
        trace!(
            "path recompute {:?} -> {:?}: {} waypoints",
            start,
            goal,
            self.path.len()
        );
    }
}

impl Default for NavState {
    fn default() -> Self {
        Self::new()
    }
}

/// One acceleration step of an axis velocity toward its target. Snaps once
/// within `accel` of the target; speeds under `decel` collapse to zero so
/// agents stop instead of creeping.
fn approach_axis(current: f32, target: f32, accel: f32, decel: f32) -> f32 {
    let next = if (target - current).abs() <= accel {
        target
    } else if target > current {
        current + accel
    } else {
        current - accel
    };
    if next.abs() < decel {
        0.0
    } else {
        next
    }
}

/// The eight compass directions, diagonals normalized
const COMPASS: [(f32, f32); 8] = [
    (1.0, 0.0),
    (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2),
    (0.0, -1.0),
    (std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2),
];

/// Picks an escape direction for a cornered agent. Probes the eight compass
/// directions a fixed distance out; candidates leaving the grid or landing
/// in an obstacle are discarded, and the survivor most opposed to the
/// current velocity wins. Falls back to reversing the velocity.
pub fn select_escape_direction(
    pos: Vec2,
    velocity: Vec2,
    obstacles: &[Rect],
    grid: &OccupancyGrid,
) -> Vec2 {
    let vel_norm = velocity.normalized();
    let mut best: Option<(f32, Vec2)> = None;

    for (dx, dy) in COMPASS {
        let dir = Vec2::new(dx, dy);
        let probe = pos + dir * ESCAPE_PROBE_DISTANCE;
        if !grid.in_bounds(world_to_cell(probe.x, probe.y)) {
            continue;
        }
        let probe_box = Rect::tile_box(probe);
        if obstacles.iter().any(|obs| probe_box.overlaps(obs)) {
            continue;
        }
        let score = (dir - vel_norm).length_squared();
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, dir));
        }
    }

    match best {
        Some((_, dir)) => dir,
        None => vel_norm * -1.0,
    }
}

/// Symmetric contribution of one crowded agent pair: the first agent moves
/// by `push` and gains `velocity_bias`, the other gets both negated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationEffect {
    pub push: Vec2,
    pub velocity_bias: Vec2,
}

/// Pairwise repulsion for two box positions. `None` when the pair is
/// outside the margin, or exactly coincident (normalizing a zero vector
/// has no meaningful direction).
pub fn separation_effect(pos: Vec2, other_pos: Vec2) -> Option<SeparationEffect> {
    let offset = pos - other_pos;
    let distance = offset.length();
    if distance <= 0.0 || distance >= SEPARATION_MARGIN {
        return None;
    }
    let away = offset.normalized();
    let overlap = SEPARATION_MARGIN - distance;
    Some(SeparationEffect {
        push: away * (overlap * SEPARATION_PUSH),
        velocity_bias: away * SEPARATION_VELOCITY_BIAS,
    })
}

/// Uniformly scales a velocity down to `max_speed`, preserving direction
pub fn clamp_speed(velocity: Vec2, max_speed: f32) -> Vec2 {
    let speed = velocity.length();
    if speed > max_speed {
        velocity * (max_speed / speed)
    } else {
        velocity
    }
}
