//! Enemy agent: level-scaled stats and the per-tick navigation update.

use std::collections::HashMap;

use log::debug;

use redoubt_shared::config::{
    CONTACT_DAMAGE_COOLDOWN, ENEMY_BASE_DAMAGE, ENEMY_BASE_HEALTH, ENEMY_BASE_SPEED,
};

use crate::navigation::steering::{
    clamp_speed, separation_effect, NavState, SteeringLimits, StuckAction,
};
use crate::navigation::{
    cell_origin, clamp_to_level, resolve_axis_collision, Axis, Cell, OccupancyGrid, Rect, Vec2,
};

/// Read-only world context for one agent tick
pub struct NavContext<'a> {
    pub grid: &'a OccupancyGrid,
    pub obstacles: &'a [Rect],
    pub player_pos: Vec2,
    pub now: f32,
}

/// What the world must apply after an agent's tick
#[derive(Debug, Default, Clone, Copy)]
pub struct AgentEvents {
    pub contact_damage: Option<u32>,
    pub needs_teleport: bool,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub limits: SteeringLimits,
    pub nav: NavState,
    pub health: u32,
    pub max_health: u32,
    pub damage: u32,
    pub level: u32,
    pub contact_cooldown: f32,
}

impl Enemy {
    /// Spawns an agent at a grid cell. Health and damage scale with the
    /// level; speed scales more gently so high-level agents stay dodgeable.
    pub fn new(id: u64, cell: Cell, level: u32) -> Self {
        let level_multiplier = 1.0 + (level as f32 - 1.0) * 0.15;
        let speed_multiplier = 1.0 + (level as f32 - 1.0) * 0.05;
        let max_health = (ENEMY_BASE_HEALTH as f32 * level_multiplier) as u32;

        Self {
            id,
            position: cell_origin(cell),
            velocity: Vec2::zero(),
            limits: SteeringLimits {
                max_speed: ENEMY_BASE_SPEED * speed_multiplier,
                ..Default::default()
            },
            nav: NavState::new(),
            health: max_health,
            max_health,
            damage: (ENEMY_BASE_DAMAGE as f32 * level_multiplier) as u32,
            level,
            contact_cooldown: 0.0,
        }
    }

    /// One navigation tick: steering (or an active recovery override),
    /// axis-resolved movement, separation against the other live agents,
    /// stuck tracking, and contact damage. Crowding neighbors are pushed
    /// in place; agents updated later in the same tick see the result.
    pub fn update(
        &mut self,
        delta: f32,
        ctx: &NavContext,
        others: &mut HashMap<u64, Enemy>,
    ) -> AgentEvents {
        let mut events = AgentEvents::default();
        if !self.is_alive() {
            return events;
        }

        if self.contact_cooldown > 0.0 {
            self.contact_cooldown -= delta;
        }

        let previous = self.position;

        let displacement = match self.nav.recovery_override(ctx.now, self.limits.max_speed) {
            Some(forced) => {
                self.velocity = self.nav.escape_dir * self.limits.max_speed;
                forced
            }
            None => {
                let blended = self.nav.steer(
                    self.position,
                    self.velocity,
                    self.limits,
                    ctx.player_pos,
                    ctx.grid,
                    ctx.now,
                );
                self.velocity = blended;
                blended
            }
        };
        let commanded_speed = displacement.length();

        self.position.x += displacement.x;
        if resolve_axis_collision(&mut self.position, Axis::X, displacement.x, ctx.obstacles) {
            self.velocity.x = 0.0;
        }
        self.position.y += displacement.y;
        if resolve_axis_collision(&mut self.position, Axis::Y, displacement.y, ctx.obstacles) {
            self.velocity.y = 0.0;
        }

        self.separate(others, ctx.obstacles);
        clamp_to_level(&mut self.position);

        match self.nav.track_movement(
            previous,
            self.position,
            commanded_speed,
            self.velocity,
            ctx.obstacles,
            ctx.grid,
            ctx.now,
        ) {
            Some(StuckAction::RecoveryStarted) => {
                debug!(
                    "enemy {} cornered at ({:.1}, {:.1}), forcing escape",
                    self.id, self.position.x, self.position.y
                );
            }
            Some(StuckAction::TeleportNeeded) => {
                debug!("enemy {} hard-stuck, requesting relocation", self.id);
                events.needs_teleport = true;
            }
            None => {}
        }

        if self.contact_cooldown <= 0.0 {
            let own_box = Rect::tile_box(self.position);
            let player_box = Rect::tile_box(ctx.player_pos);
            if own_box.overlaps(&player_box) {
                self.contact_cooldown = CONTACT_DAMAGE_COOLDOWN;
                events.contact_damage = Some(self.damage);
            }
        }

        events
    }

    /// Pairwise separation against every other live agent, processed in
    /// ascending id order, then a speed clamp and a collision pass for the
    /// accumulated push.
    fn separate(&mut self, others: &mut HashMap<u64, Enemy>, obstacles: &[Rect]) {
        let mut ids: Vec<u64> = others.keys().copied().collect();
        ids.sort_unstable();

        let mut net_push = Vec2::zero();
        for other_id in ids {
            if let Some(other) = others.get_mut(&other_id) {
                if !other.is_alive() {
                    continue;
                }
                if let Some(effect) = separation_effect(self.position, other.position) {
                    self.position = self.position + effect.push;
                    self.velocity = self.velocity + effect.velocity_bias;
                    other.position = other.position - effect.push;
                    other.velocity = other.velocity - effect.velocity_bias;
                    clamp_to_level(&mut other.position);
                    net_push = net_push + effect.push;
                }
            }
        }
        self.velocity = clamp_speed(self.velocity, self.limits.max_speed);

        if net_push.x != 0.0 && resolve_axis_collision(&mut self.position, Axis::X, net_push.x, obstacles)
        {
            self.velocity.x = 0.0;
        }
        if net_push.y != 0.0 && resolve_axis_collision(&mut self.position, Axis::Y, net_push.y, obstacles)
        {
            self.velocity.y = 0.0;
        }
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}
