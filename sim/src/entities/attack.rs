//! Player attacks as one tagged type. Melee arcs, projectiles, and area
//! pulses share the common lifecycle and dispatch on their kind inside
//! `update`; every agent is hit at most once per attack instance.

use std::collections::{HashMap, HashSet};

use redoubt_shared::config::{
    AOE_LIFETIME, AOE_RADIUS, MELEE_ARC_WIDTH, MELEE_LIFETIME, MELEE_RANGE, PROJECTILE_LIFETIME,
    PROJECTILE_SPEED,
};
use redoubt_shared::stats::CharacterClass;

use crate::entities::enemy::Enemy;
use crate::navigation::{box_center, Rect, Vec2};

/// Kind-specific attack parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackKind {
    Melee { arc_width: f32 },
    Projectile { speed: f32 },
    AreaOfEffect { radius: f32 },
}

#[derive(Debug, Clone)]
pub struct Attack {
    pub id: u64,
    /// Cast point; melee aim and area pulses are anchored here
    pub origin: Vec2,
    /// Current position, advanced per tick for projectiles
    pub position: Vec2,
    pub direction: Vec2,
    pub damage: u32,
    /// Seconds of lifetime left
    pub remaining: f32,
    pub expired: bool,
    pub kind: AttackKind,
    already_hit: HashSet<u64>,
}

impl Attack {
    pub fn melee(id: u64, origin: Vec2, direction: Vec2, damage: u32) -> Self {
        Self::with_kind(
            id,
            origin,
            direction,
            damage,
            MELEE_LIFETIME,
            AttackKind::Melee { arc_width: MELEE_ARC_WIDTH },
        )
    }

    pub fn projectile(id: u64, origin: Vec2, direction: Vec2, damage: u32) -> Self {
        Self::with_kind(
            id,
            origin,
            direction,
            damage,
            PROJECTILE_LIFETIME,
            AttackKind::Projectile { speed: PROJECTILE_SPEED },
        )
    }

    pub fn area(id: u64, origin: Vec2, damage: u32) -> Self {
        Self::with_kind(
            id,
            origin,
            Vec2::zero(),
            damage,
            AOE_LIFETIME,
            AttackKind::AreaOfEffect { radius: AOE_RADIUS },
        )
    }

    /// The attack form each class fights with: warriors swing an arc, mages
    /// launch a bolt, rogues pulse a burst around themselves
    pub fn for_class(
        id: u64,
        class: CharacterClass,
        origin: Vec2,
        direction: Vec2,
        damage: u32,
    ) -> Self {
        match class {
            CharacterClass::Warrior => Self::melee(id, origin, direction, damage),
            CharacterClass::Mage => Self::projectile(id, origin, direction, damage),
            CharacterClass::Rogue => Self::area(id, origin, damage),
        }
    }

    fn with_kind(
        id: u64,
        origin: Vec2,
        direction: Vec2,
        damage: u32,
        lifetime: f32,
        kind: AttackKind,
    ) -> Self {
        Self {
            id,
            origin,
            position: origin,
            direction: direction.normalized(),
            damage,
            remaining: lifetime,
            expired: false,
            kind,
            already_hit: HashSet::new(),
        }
    }

    /// Advances the attack one tick and returns the ids of agents hit.
    /// Agents are tested in ascending id order so the outcome does not
    /// depend on map iteration.
    pub fn update(
        &mut self,
        delta: f32,
        enemies: &HashMap<u64, Enemy>,
        obstacles: &[Rect],
    ) -> Vec<u64> {
        if self.expired {
            return Vec::new();
        }

        let mut ids: Vec<u64> = enemies.keys().copied().collect();
        ids.sort_unstable();

        let mut hits = Vec::new();
        match self.kind {
            AttackKind::Melee { arc_width } => {
                let half_arc_cos = (arc_width / 2.0).cos();
                for id in ids {
                    let Some(enemy) = enemies.get(&id) else { continue };
                    if !enemy.is_alive() || self.already_hit.contains(&id) {
                        continue;
                    }
                    let offset = box_center(enemy.position) - self.origin;
                    let distance = offset.length();
                    if distance > MELEE_RANGE {
                        continue;
                    }
                    // a target standing on the attacker has no usable angle
                    if distance > 0.0001 && offset.normalized().dot(&self.direction) < half_arc_cos
                    {
                        continue;
                    }
                    self.already_hit.insert(id);
                    hits.push(id);
                }
            }
            AttackKind::Projectile { speed } => {
                self.position = self.position + self.direction * speed;
                if obstacles.iter().any(|obs| obs.contains_point(self.position)) {
                    self.expired = true;
                } else {
                    for id in ids {
                        let Some(enemy) = enemies.get(&id) else { continue };
                        if !enemy.is_alive() {
                            continue;
                        }
                        if Rect::tile_box(enemy.position).contains_point(self.position) {
                            self.already_hit.insert(id);
                            hits.push(id);
                            self.expired = true;
                            break;
                        }
                    }
                }
            }
            AttackKind::AreaOfEffect { radius } => {
                for id in ids {
                    let Some(enemy) = enemies.get(&id) else { continue };
                    if !enemy.is_alive() || self.already_hit.contains(&id) {
                        continue;
                    }
                    if box_center(enemy.position).distance_to(&self.origin) <= radius {
                        self.already_hit.insert(id);
                        hits.push(id);
                    }
                }
            }
        }

        self.remaining -= delta;
        if self.remaining <= 0.0 {
            self.expired = true;
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{cell_origin, obstacle_rects, Cell};

    const TICK: f32 = 1.0 / 60.0;

    fn enemy_map(entries: &[(u64, Cell)]) -> HashMap<u64, Enemy> {
        entries
            .iter()
            .map(|&(id, cell)| (id, Enemy::new(id, cell, 1)))
            .collect()
    }

    #[test]
    fn test_melee_hits_target_in_arc_once() {
        // Target one cell to the right of a rightward swing
        let enemies = enemy_map(&[(1, (6, 5))]);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::melee(1, origin, Vec2::new(1.0, 0.0), 10);

        assert_eq!(attack.update(TICK, &enemies, &[]), vec![1]);
        assert!(attack.update(TICK, &enemies, &[]).is_empty());
        assert!(!attack.expired);
    }

    #[test]
    fn test_melee_misses_behind_and_out_of_range() {
        // One target behind the swing, one past the reach
        let enemies = enemy_map(&[(1, (4, 5)), (2, (9, 5))]);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::melee(1, origin, Vec2::new(1.0, 0.0), 10);
        assert!(attack.update(TICK, &enemies, &[]).is_empty());
    }

    #[test]
    fn test_melee_hits_overlapping_target() {
        // Standing on the attacker: zero distance still counts as a hit
        let enemies = enemy_map(&[(1, (5, 5))]);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::melee(1, origin, Vec2::new(0.0, -1.0), 10);
        assert_eq!(attack.update(TICK, &enemies, &[]), vec![1]);
    }

    #[test]
    fn test_projectile_advances_until_target_hit() {
        let enemies = enemy_map(&[(1, (10, 5))]);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::projectile(1, origin, Vec2::new(1.0, 0.0), 10);

        let mut hit = Vec::new();
        for _ in 0..40 {
            hit = attack.update(TICK, &enemies, &[]);
            if !hit.is_empty() {
                break;
            }
        }
        assert_eq!(hit, vec![1]);
        assert!(attack.expired);
    }

    #[test]
    fn test_projectile_stopped_by_block() {
        // Wall cell between the shooter and the target soaks the bolt
        let obstacles = obstacle_rects(&[(7, 5)]);
        let enemies = enemy_map(&[(1, (10, 5))]);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::projectile(1, origin, Vec2::new(1.0, 0.0), 10);

        for _ in 0..40 {
            assert!(attack.update(TICK, &enemies, &obstacles).is_empty());
            if attack.expired {
                break;
            }
        }
        assert!(attack.expired);
    }

    #[test]
    fn test_projectile_expires_at_lifetime_end() {
        let enemies = HashMap::new();
        let mut attack = Attack::projectile(1, Vec2::new(160.0, 160.0), Vec2::new(0.0, 1.0), 10);
        let ticks = (PROJECTILE_LIFETIME / TICK).ceil() as usize + 1;
        for _ in 0..ticks {
            attack.update(TICK, &enemies, &[]);
        }
        assert!(attack.expired);
    }

    #[test]
    fn test_area_pulse_hits_inside_radius_once() {
        // Two cells out is inside the pulse, five cells out is not
        let enemies = enemy_map(&[(1, (7, 5)), (2, (10, 5))]);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::area(1, origin, 10);

        assert_eq!(attack.update(TICK, &enemies, &[]), vec![1]);
        assert!(attack.update(TICK, &enemies, &[]).is_empty());
    }

    #[test]
    fn test_dead_agents_are_not_hit() {
        let mut enemies = enemy_map(&[(1, (6, 5))]);
        enemies.get_mut(&1).unwrap().take_damage(10_000);
        let origin = box_center(cell_origin((5, 5)));
        let mut attack = Attack::area(1, origin, 10);
        assert!(attack.update(TICK, &enemies, &[]).is_empty());
    }

    #[test]
    fn test_class_attack_forms() {
        let origin = Vec2::new(160.0, 160.0);
        let dir = Vec2::new(1.0, 0.0);
        let melee = Attack::for_class(1, CharacterClass::Warrior, origin, dir, 5);
        let bolt = Attack::for_class(2, CharacterClass::Mage, origin, dir, 5);
        let pulse = Attack::for_class(3, CharacterClass::Rogue, origin, dir, 5);
        assert!(matches!(melee.kind, AttackKind::Melee { .. }));
        assert!(matches!(bolt.kind, AttackKind::Projectile { .. }));
        assert!(matches!(pulse.kind, AttackKind::AreaOfEffect { .. }));
    }
}
