//! Tuning constants shared between the simulation and any frontend.
//!
//! Distances are world units (one tile = 32 units). Speeds and
//! accelerations are units per simulation tick; durations are seconds.

/// Tile edge length in world units
pub const TILE_SIZE: f32 = 32.0;

/// Occupancy grid width in cells
pub const GRID_WIDTH: usize = 40;

/// Occupancy grid height in cells
pub const GRID_HEIGHT: usize = 30;

/// Simulation tick rate in Hz
pub const TICK_RATE: u32 = 60;

/// Highest playable level; clearing it ends the run
pub const MAX_LEVEL: u32 = 5;

/// Waves per level; the last one is the scripted formation wave
pub const WAVES_PER_LEVEL: u32 = 4;

/// Pause between a cleared wave and the next spawn, seconds
pub const INTER_WAVE_DELAY: f32 = 2.0;

// =============================================================================
// Movement
// =============================================================================

/// Player displacement per tick
pub const PLAYER_SPEED: f32 = 3.0;

/// Enemy top speed per tick before level scaling
pub const ENEMY_BASE_SPEED: f32 = 4.0;

/// Per-tick velocity change while steering toward a target velocity
pub const ENEMY_ACCELERATION: f32 = 0.5;

/// Axis speeds below this are zeroed instead of creeping
pub const ENEMY_DECELERATION: f32 = 0.25;

/// Minimum seconds between path recomputes for one agent
pub const PATH_UPDATE_DELAY: f32 = 1.0;

/// Depth of the rolling position history used for stall detection
pub const POSITION_HISTORY_LEN: usize = 10;

/// Gap left between an agent and the obstacle face it was clamped against
pub const COLLISION_BUFFER: f32 = 1.0;

// =============================================================================
// Stuck detection and corner recovery
// =============================================================================

/// Actual per-tick displacement below this counts as stalled
pub const STUCK_MOVE_EPSILON: f32 = 0.5;

/// Commanded speed must exceed this for a stall to count
pub const STUCK_SPEED_EPSILON: f32 = 0.1;

/// Consecutive stalled ticks before recovery triggers
pub const STUCK_TICK_THRESHOLD: u32 = 4;

/// Minimum seconds between recovery triggers
pub const STUCK_TRIGGER_COOLDOWN: f32 = 0.4;

/// Seconds a forced escape direction stays in effect
pub const RECOVERY_DURATION: f32 = 0.6;

/// Escape displacement multiplier on top of max speed
pub const RECOVERY_STRENGTH: f32 = 2.0;

/// Probe distance when testing the eight escape directions
pub const ESCAPE_PROBE_DISTANCE: f32 = TILE_SIZE * 1.5;

/// Stall count past which the agent is teleported to a free cell
pub const TELEPORT_STUCK_LIMIT: u32 = 10;

// =============================================================================
// Separation
// =============================================================================

/// Agents closer than this push each other apart
pub const SEPARATION_MARGIN: f32 = TILE_SIZE * 0.8;

/// Positional push per unit of overlap
pub const SEPARATION_PUSH: f32 = 0.15;

/// Velocity bias away from a crowding neighbor
pub const SEPARATION_VELOCITY_BIAS: f32 = 0.3;

// =============================================================================
// Combat
// =============================================================================

/// Enemy health before level scaling
pub const ENEMY_BASE_HEALTH: u32 = 40;

/// Enemy contact damage before level scaling
pub const ENEMY_BASE_DAMAGE: u32 = 10;

/// Seconds between contact-damage applications per enemy
pub const CONTACT_DAMAGE_COOLDOWN: f32 = 1.0;

/// Melee swing reach from the attacker's center
pub const MELEE_RANGE: f32 = TILE_SIZE * 1.5;

/// Full melee arc width in radians
pub const MELEE_ARC_WIDTH: f32 = std::f32::consts::FRAC_PI_2;

/// Seconds a melee swing stays active
pub const MELEE_LIFETIME: f32 = 0.15;

/// Projectile displacement per tick
pub const PROJECTILE_SPEED: f32 = 8.0;

/// Seconds before an unspent projectile expires
pub const PROJECTILE_LIFETIME: f32 = 1.2;

/// Area-of-effect pulse radius
pub const AOE_RADIUS: f32 = TILE_SIZE * 2.5;

/// Seconds an area pulse stays active
pub const AOE_LIFETIME: f32 = 0.2;

// =============================================================================
// Spawning and placement
// =============================================================================

/// Search radius around the map center for random placement, in cells
pub const SPAWN_RADIUS_CELLS: i32 = 12;

/// Positions closer to the player than this are rejected
pub const MIN_PLAYER_DISTANCE: f32 = TILE_SIZE * 5.0;

/// Random placement attempts before giving up
pub const PLACEMENT_ATTEMPTS: u32 = 64;

// =============================================================================
// Progression and rewards
// =============================================================================

/// Experience needed to leave a level is this times the level
pub const EXP_LEVEL_FACTOR: u64 = 100;

/// Max-health gain per player level
pub const LEVEL_UP_HEALTH_BONUS: u32 = 10;

/// Base-damage gain per player level
pub const LEVEL_UP_DAMAGE_BONUS: u32 = 2;

/// Experience awarded per slain enemy, times the enemy's level
pub const EXP_REWARD_BASE: u64 = 25;

/// Gold awarded per slain enemy, times the enemy's level
pub const GOLD_REWARD_BASE: u32 = 10;

/// Chance a slain enemy drops an item
pub const LOOT_DROP_CHANCE: f64 = 0.25;
