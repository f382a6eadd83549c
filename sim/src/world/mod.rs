//! The world context: level geometry, the player, enemy agents, live
//! attacks, and the fixed-tick pipeline that sequences them.

mod mapgen;
mod waves;

pub use mapgen::{boss_layout, generate_shaped_map, parse_layout, MapLayout, MapShape};
pub use waves::{SpawnRequest, WaveEvent, WaveManager, WavePhase};

use std::collections::HashMap;

use log::{debug, error, info, warn};
use rand::Rng;

use redoubt_shared::config::{
    EXP_REWARD_BASE, GOLD_REWARD_BASE, GRID_HEIGHT, GRID_WIDTH, LOOT_DROP_CHANCE,
    MIN_PLAYER_DISTANCE, PLACEMENT_ATTEMPTS, PLAYER_SPEED, SPAWN_RADIUS_CELLS,
};
use redoubt_shared::items::{get_item_definitions, ItemDef};
use redoubt_shared::snapshot::{EnemyView, PlayerView, WorldSnapshot};
use redoubt_shared::stats::CharacterClass;

use crate::entities::{Attack, Enemy, NavContext, Player};
use crate::navigation::{
    box_center, cell_center, cell_origin, obstacle_rects, world_to_cell, Cell, OccupancyGrid,
    Rect, Vec2,
};

/// Id ranges keep agents and attacks distinguishable in logs
const ENEMY_ID_BASE: u64 = 10_000;
const ATTACK_ID_BASE: u64 = 20_000;

pub struct World {
    pub player: Player,
    enemies: HashMap<u64, Enemy>,
    attacks: Vec<Attack>,
    obstacles: Vec<Cell>,
    obstacle_rects: Vec<Rect>,
    grid: OccupancyGrid,
    waves: WaveManager,
    items: HashMap<u32, ItemDef>,
    next_enemy_id: u64,
    next_attack_id: u64,
    /// Seconds of simulated time; drives every navigation timer
    clock: f32,
    tick: u64,
    game_over: bool,
    run_complete: bool,
}

impl World {
    pub fn new(class: CharacterClass, waves: WaveManager) -> Self {
        let items = get_item_definitions()
            .into_iter()
            .map(|def| (def.id, def))
            .collect();

        let mut world = Self {
            player: Player::new((GRID_WIDTH as i32 / 2, GRID_HEIGHT as i32 / 2), class),
            enemies: HashMap::new(),
            attacks: Vec::new(),
            obstacles: Vec::new(),
            obstacle_rects: Vec::new(),
            grid: OccupancyGrid::empty(),
            waves,
            items,
            next_enemy_id: ENEMY_ID_BASE,
            next_attack_id: ATTACK_ID_BASE,
            clock: 0.0,
            tick: 0,
            game_over: false,
            run_complete: false,
        };
        let layout = generate_shaped_map(GRID_WIDTH, GRID_HEIGHT, random_shape());
        world.load_layout(layout);
        info!("World ready, {} entering level 1", class.name());
        world
    }

    /// One simulation tick. `delta` is elapsed seconds and only feeds
    /// timers; displacements are per-tick quantities.
    pub fn update(&mut self, delta: f32) {
        if !self.is_running() {
            return;
        }
        self.clock += delta;
        self.tick += 1;

        let step = Vec2::new(
            self.player.move_intent.x * PLAYER_SPEED,
            self.player.move_intent.y * PLAYER_SPEED,
        );
        self.player.apply_movement(step, &self.obstacle_rects);

        self.update_attacks(delta);

        let contact_hits = self.update_enemies(delta);
        for damage in contact_hits {
            self.player.take_damage(damage);
            debug!(
                "Player took {} contact damage, {} hp left",
                damage, self.player.health
            );
        }
        if !self.player.is_alive() {
            self.game_over = true;
            info!(
                "Player defeated on level {} wave {}",
                self.waves.level(),
                self.waves.wave()
            );
            return;
        }

        self.process_enemy_deaths();
        self.advance_waves(delta);
    }

    /// Casts the player's class attack toward `direction`
    pub fn player_attack(&mut self, direction: Vec2) {
        let dir = if direction.length() < 0.0001 {
            Vec2::new(1.0, 0.0)
        } else {
            direction
        };
        let id = self.next_attack_id;
        self.next_attack_id += 1;
        let origin = box_center(self.player.position);
        self.attacks
            .push(Attack::for_class(id, self.player.class, origin, dir, self.player.damage));
        debug!("Attack {} cast toward ({:.2}, {:.2})", id, dir.x, dir.y);
    }

    /// Spawns an agent at a grid cell with level-scaled stats
    pub fn spawn_enemy(&mut self, cell: Cell, level: u32) -> u64 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        self.enemies.insert(id, Enemy::new(id, cell, level));
        debug!("Spawned enemy {} (level {}) at {:?}", id, level, cell);
        id
    }

    /// Picks a free cell: walkable and outside the minimum player distance.
    /// With a seed the seed itself is tried first, then its 7x7
    /// neighborhood; after that, random cells around the map center.
    pub fn find_valid_cell(&self, near: Option<Cell>) -> Option<Cell> {
        if let Some(seed) = near {
            if self.is_spawnable(seed) {
                return Some(seed);
            }
            for dy in -3..=3 {
                for dx in -3..=3 {
                    let cell = (seed.0 + dx, seed.1 + dy);
                    if self.is_spawnable(cell) {
                        return Some(cell);
                    }
                }
            }
        }

        let mut rng = rand::thread_rng();
        let center_x = GRID_WIDTH as i32 / 2;
        let center_y = GRID_HEIGHT as i32 / 2;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = (
                rng.gen_range(center_x - SPAWN_RADIUS_CELLS..=center_x + SPAWN_RADIUS_CELLS),
                rng.gen_range(center_y - SPAWN_RADIUS_CELLS..=center_y + SPAWN_RADIUS_CELLS),
            );
            if self.is_spawnable(cell) {
                return Some(cell);
            }
        }
        None
    }

    /// World-space form of [`find_valid_cell`](Self::find_valid_cell)
    pub fn find_valid_position(&self, near: Option<Cell>) -> Option<Vec2> {
        self.find_valid_cell(near).map(cell_origin)
    }

    pub fn set_player_intent(&mut self, intent: Vec2) {
        self.player.move_intent = Vec2::new(intent.x.clamp(-1.0, 1.0), intent.y.clamp(-1.0, 1.0));
    }

    pub fn equip_item(&mut self, item_id: u32) -> Result<(), String> {
        self.player.equip(item_id, &self.items)
    }

    pub fn occupancy_grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn player_position(&self) -> Vec2 {
        self.player.position
    }

    pub fn static_obstacles(&self) -> &[Cell] {
        &self.obstacles
    }

    pub fn get_enemies(&self) -> Vec<&Enemy> {
        self.enemies.values().collect()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn level(&self) -> u32 {
        self.waves.level()
    }

    pub fn wave(&self) -> u32 {
        self.waves.wave()
    }

    pub fn is_running(&self) -> bool {
        !self.game_over && !self.run_complete
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_run_complete(&self) -> bool {
        self.run_complete
    }

    /// Immutable view of the tick for a frontend
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut enemies: Vec<EnemyView> = self
            .enemies
            .values()
            .map(|enemy| EnemyView {
                id: enemy.id,
                x: enemy.position.x,
                y: enemy.position.y,
                health: enemy.health,
                max_health: enemy.max_health,
                level: enemy.level,
            })
            .collect();
        enemies.sort_by_key(|view| view.id);

        WorldSnapshot {
            tick: self.tick,
            level: self.waves.level(),
            wave: self.waves.wave(),
            player: PlayerView {
                x: self.player.position.x,
                y: self.player.position.y,
                class: self.player.class,
                health: self.player.health,
                max_health: self.player.max_health,
                level: self.player.level,
                experience: self.player.experience,
                gold: self.player.gold,
            },
            enemies,
        }
    }

    /// Installs fresh geometry: rebuilds the grid and collision rects,
    /// moves the player to the start cell, clears live attacks, and spawns
    /// any agents authored into the layout.
    fn load_layout(&mut self, layout: MapLayout) {
        self.grid = OccupancyGrid::build(&layout.obstacles, GRID_WIDTH, GRID_HEIGHT);
        self.obstacle_rects = obstacle_rects(&layout.obstacles);
        self.obstacles = layout.obstacles;
        self.player.position = cell_origin(layout.player_start);
        self.player.move_intent = Vec2::zero();
        self.attacks.clear();

        let level = self.waves.level();
        for cell in layout.enemy_spawns {
            self.spawn_enemy(cell, level);
        }
    }

    /// Runs every live attack against the agents, then applies the
    /// collected hits, so damage never lands mid-pass.
    fn update_attacks(&mut self, delta: f32) {
        let mut attacks = std::mem::take(&mut self.attacks);
        let mut hits: Vec<(u64, u32)> = Vec::new();
        for attack in attacks.iter_mut() {
            for enemy_id in attack.update(delta, &self.enemies, &self.obstacle_rects) {
                hits.push((enemy_id, attack.damage));
            }
        }
        attacks.retain(|attack| !attack.expired);
        self.attacks = attacks;

        for (enemy_id, damage) in hits {
            if let Some(enemy) = self.enemies.get_mut(&enemy_id) {
                enemy.take_damage(damage);
                debug!("Enemy {} hit for {}, {} hp left", enemy_id, damage, enemy.health);
            }
        }
    }

    /// Updates agents in ascending id order; separation pushes write
    /// straight into the other agents, so later ids see earlier results
    /// within the same tick. Returns contact damage to apply.
    fn update_enemies(&mut self, delta: f32) -> Vec<u32> {
        let mut ids: Vec<u64> = self.enemies.keys().copied().collect();
        ids.sort_unstable();

        let mut contact_hits = Vec::new();
        let mut teleports = Vec::new();
        for id in ids {
            let Some(mut enemy) = self.enemies.remove(&id) else { continue };
            let ctx = NavContext {
                grid: &self.grid,
                obstacles: &self.obstacle_rects,
                player_pos: self.player.position,
                now: self.clock,
            };
            let events = enemy.update(delta, &ctx, &mut self.enemies);
            if let Some(damage) = events.contact_damage {
                contact_hits.push(damage);
            }
            if events.needs_teleport {
                teleports.push(id);
            }
            self.enemies.insert(id, enemy);
        }

        for id in teleports {
            let near = self
                .enemies
                .get(&id)
                .map(|enemy| world_to_cell(enemy.position.x, enemy.position.y));
            match self.find_valid_cell(near) {
                Some(cell) => {
                    if let Some(enemy) = self.enemies.get_mut(&id) {
                        enemy.position = cell_origin(cell);
                        enemy.velocity = Vec2::zero();
                        debug!("Relocated hard-stuck enemy {} to {:?}", id, cell);
                    }
                }
                None => warn!("No free cell to relocate enemy {}, leaving it in place", id),
            }
        }

        contact_hits
    }

    /// Removes dead agents and pays out rewards
    fn process_enemy_deaths(&mut self) {
        let mut dead: Vec<u64> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| !enemy.is_alive())
            .map(|(id, _)| *id)
            .collect();
        dead.sort_unstable();

        let mut rng = rand::thread_rng();
        for id in dead {
            let Some(enemy) = self.enemies.remove(&id) else { continue };
            let exp = EXP_REWARD_BASE * enemy.level as u64;
            let gold = GOLD_REWARD_BASE * enemy.level;
            self.player.add_gold(gold);
            self.player.gain_experience(exp);
            info!(
                "Enemy {} (level {}) defeated: +{} exp, +{} gold",
                id, enemy.level, exp, gold
            );

            if rng.gen_bool(LOOT_DROP_CHANCE) {
                let mut candidates: Vec<u32> = self
                    .items
                    .values()
                    .filter(|def| def.class == self.player.class)
                    .map(|def| def.id)
                    .collect();
                candidates.sort_unstable();
                if !candidates.is_empty() {
                    let item_id = candidates[rng.gen_range(0..candidates.len())];
                    self.player.add_item(item_id);
                    if let Some(def) = self.items.get(&item_id) {
                        info!("Enemy {} dropped {}", id, def.name);
                    }
                }
            }
        }
    }

    /// Lets the scheduler act on a cleared field: spawn the next wave, or
    /// rebuild the map for the boss arena or the next level.
    fn advance_waves(&mut self, delta: f32) {
        let live = self.enemies.len();
        match self.waves.update(delta, live) {
            WaveEvent::Idle => {}
            WaveEvent::Spawn(requests) => {
                let mut spawned = 0;
                for request in requests {
                    match self.find_valid_cell(request.cell) {
                        Some(cell) => {
                            self.spawn_enemy(cell, request.level);
                            spawned += 1;
                        }
                        None => warn!("Skipping one spawn, no free cell found"),
                    }
                }
                info!(
                    "Level {} wave {}: {} enemies spawned",
                    self.waves.level(),
                    self.waves.wave(),
                    spawned
                );
            }
            WaveEvent::Advance { level, boss } => {
                let layout = if boss {
                    match parse_layout(boss_layout(level)) {
                        Ok(layout) => layout,
                        Err(e) => {
                            error!(
                                "Boss layout for level {} is invalid ({}), generating a map",
                                level, e
                            );
                            generate_shaped_map(GRID_WIDTH, GRID_HEIGHT, random_shape())
                        }
                    }
                } else {
                    generate_shaped_map(GRID_WIDTH, GRID_HEIGHT, random_shape())
                };
                self.load_layout(layout);
                if boss {
                    info!("Level {} boss arena entered", level);
                } else {
                    info!("Level {} started", level);
                }
            }
            WaveEvent::RunComplete => {
                self.run_complete = true;
                info!("All levels cleared after {} ticks", self.tick);
            }
        }
    }

    fn is_spawnable(&self, cell: Cell) -> bool {
        self.grid.is_walkable(cell)
            && cell_center(cell).distance_to(&box_center(self.player.position))
                >= MIN_PLAYER_DISTANCE
    }
}

fn random_shape() -> MapShape {
    if rand::thread_rng().gen_bool(0.5) {
        MapShape::Circle
    } else {
        MapShape::Rectangle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redoubt_shared::config::INTER_WAVE_DELAY;

    const TICK: f32 = 1.0 / 60.0;

    fn test_world() -> World {
        World::new(CharacterClass::Warrior, WaveManager::new())
    }

    fn player_cell(world: &World) -> Cell {
        world_to_cell(world.player_position().x, world.player_position().y)
    }

    #[test]
    fn test_new_world_grid_matches_obstacles() {
        let world = test_world();
        for &cell in world.static_obstacles() {
            assert!(!world.occupancy_grid().is_walkable(cell));
        }
        assert_eq!(world.player_position(), cell_origin((20, 15)));
        assert!(world.occupancy_grid().is_walkable((20, 15)));
    }

    #[test]
    fn test_player_intent_drives_movement() {
        let mut world = test_world();
        let start = world.player_position();
        world.set_player_intent(Vec2::new(1.0, 0.0));
        world.update(TICK);
        assert!((world.player_position().x - (start.x + PLAYER_SPEED)).abs() < 0.001);
    }

    #[test]
    fn test_first_wave_spawns_after_delay() {
        let mut world = test_world();
        let ticks = (INTER_WAVE_DELAY / TICK).ceil() as usize + 2;
        for _ in 0..ticks {
            world.update(TICK);
        }
        assert!(world.enemy_count() > 0);
        assert_eq!(world.wave(), 1);
    }

    #[test]
    fn test_contact_damage_reaches_player() {
        let mut world = test_world();
        let (px, py) = player_cell(&world);
        world.spawn_enemy((px + 1, py), 1);
        let start_hp = world.player.health;
        for _ in 0..30 {
            world.update(TICK);
        }
        assert!(world.player.health < start_hp);
    }

    #[test]
    fn test_attack_kill_awards_rewards() {
        let mut world = test_world();
        let (px, py) = player_cell(&world);
        world.spawn_enemy((px + 1, py), 1);

        for _ in 0..20 {
            world.player_attack(Vec2::new(1.0, 0.0));
            world.update(TICK);
            if world.enemy_count() == 0 {
                break;
            }
        }
        assert_eq!(world.enemy_count(), 0);
        assert!(world.player.gold > 0);
        assert!(world.player.experience > 0 || world.player.level > 1);
    }

    #[test]
    fn test_separation_acts_through_world_tick() {
        let mut world = test_world();
        world.load_layout(MapLayout {
            obstacles: Vec::new(),
            player_start: (20, 15),
            enemy_spawns: Vec::new(),
        });
        let a = world.spawn_enemy((8, 8), 1);
        let b = world.spawn_enemy((8, 8), 1);
        world.enemies.get_mut(&b).unwrap().position.x += 10.0;

        world.update(TICK);

        let gap = world.enemies[&a]
            .position
            .distance_to(&world.enemies[&b].position);
        assert!(gap > 10.0);
    }

    #[test]
    fn test_find_valid_cell_prefers_the_seed() {
        let mut world = test_world();
        world.load_layout(MapLayout {
            obstacles: Vec::new(),
            player_start: (20, 15),
            enemy_spawns: Vec::new(),
        });
        assert_eq!(world.find_valid_cell(Some((5, 5))), Some((5, 5)));
    }

    #[test]
    fn test_find_valid_cell_rejects_near_player() {
        let world = test_world();
        let seed = player_cell(&world);
        // every 7x7 candidate sits inside the exclusion ring, so the fall
        // back must move further out
        let found = world.find_valid_cell(Some(seed));
        assert!(found.is_some());
        let cell = found.unwrap();
        assert!(world.occupancy_grid().is_walkable(cell));
        let gap = cell_center(cell).distance_to(&box_center(world.player_position()));
        assert!(gap >= MIN_PLAYER_DISTANCE);
    }

    #[test]
    fn test_layout_enemy_spawns_materialize() {
        let mut world = test_world();
        world.load_layout(MapLayout {
            obstacles: Vec::new(),
            player_start: (20, 15),
            enemy_spawns: vec![(5, 5), (6, 5)],
        });
        assert_eq!(world.enemy_count(), 2);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut world = test_world();
        world.spawn_enemy((8, 8), 2);
        world.update(TICK);

        let snapshot = world.snapshot();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.enemies.len(), 1);
        assert_eq!(snapshot.enemies[0].level, 2);
        assert_eq!(snapshot.player.class, CharacterClass::Warrior);
        assert_eq!(snapshot.player.max_health, 120);
    }
}
