//! The player character: movement, progression, and gear.

use std::collections::HashMap;

use log::info;

use redoubt_shared::config::{LEVEL_UP_DAMAGE_BONUS, LEVEL_UP_HEALTH_BONUS};
use redoubt_shared::items::{ItemDef, ItemKind};
use redoubt_shared::stats::{exp_required, CharacterClass};

use crate::navigation::{cell_origin, clamp_to_level, resolve_axis_collision, Axis, Cell, Rect, Vec2};

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec2,
    /// Movement intent per axis in [-1, 1], set by the frontend
    pub move_intent: Vec2,
    pub class: CharacterClass,
    pub health: u32,
    pub max_health: u32,
    pub damage: u32,
    pub level: u32,
    pub experience: u64,
    pub gold: u32,
    /// Owned item ids, including equipped ones
    pub inventory: Vec<u32>,
    pub equipped_weapon: Option<u32>,
    pub equipped_armor: Option<u32>,
}

impl Player {
    pub fn new(cell: Cell, class: CharacterClass) -> Self {
        Self {
            position: cell_origin(cell),
            move_intent: Vec2::zero(),
            class,
            health: class.base_max_health(),
            max_health: class.base_max_health(),
            damage: class.base_damage(),
            level: 1,
            experience: 0,
            gold: 0,
            inventory: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
        }
    }

    /// Axis-separated move against the static obstacles, then the level
    /// bounds clamp. Same resolution order the agents use.
    pub fn apply_movement(&mut self, displacement: Vec2, obstacles: &[Rect]) {
        self.position.x += displacement.x;
        resolve_axis_collision(&mut self.position, Axis::X, displacement.x, obstacles);
        self.position.y += displacement.y;
        resolve_axis_collision(&mut self.position, Axis::Y, displacement.y, obstacles);
        clamp_to_level(&mut self.position);
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Awards experience; overflow carries into the next level
    pub fn gain_experience(&mut self, amount: u64) {
        self.experience += amount;
        while self.experience >= exp_required(self.level) {
            self.experience -= exp_required(self.level);
            self.level += 1;
            self.max_health += LEVEL_UP_HEALTH_BONUS;
            self.health = (self.health + LEVEL_UP_HEALTH_BONUS).min(self.max_health);
            self.damage += LEVEL_UP_DAMAGE_BONUS;
            info!(
                "Player reached level {} ({} max hp, {} damage)",
                self.level, self.max_health, self.damage
            );
        }
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold += amount;
    }

    pub fn add_item(&mut self, item_id: u32) {
        self.inventory.push(item_id);
    }

    /// Equips an owned item, enforcing the level and class gates. A weapon
    /// replaces the current weapon's damage bonus; armor adds its bonus to
    /// max health and current health.
    pub fn equip(&mut self, item_id: u32, items: &HashMap<u32, ItemDef>) -> Result<(), String> {
        if !self.inventory.contains(&item_id) {
            return Err(format!("Item {} is not in the inventory", item_id));
        }
        let def = items
            .get(&item_id)
            .ok_or(format!("Unknown item id {}", item_id))?;
        if self.level < def.level_req {
            return Err(format!("Level {} required to equip {}", def.level_req, def.name));
        }
        if def.class != self.class {
            return Err(format!(
                "Only the {} class can equip {}",
                def.class.name(),
                def.name
            ));
        }

        match def.kind {
            ItemKind::Weapon { damage } => {
                self.unequip_weapon(items);
                self.equipped_weapon = Some(item_id);
                self.damage += damage;
            }
            ItemKind::Armor { health } => {
                self.unequip_armor(items);
                self.equipped_armor = Some(item_id);
                self.max_health += health;
                self.health += health;
            }
        }
        info!("Player equipped {}", def.name);
        Ok(())
    }

    /// Removes the equipped weapon's damage bonus
    pub fn unequip_weapon(&mut self, items: &HashMap<u32, ItemDef>) {
        if let Some(id) = self.equipped_weapon.take() {
            if let Some(def) = items.get(&id) {
                if let ItemKind::Weapon { damage } = def.kind {
                    self.damage = self.damage.saturating_sub(damage);
                }
            }
        }
    }

    /// Removes the equipped armor's health bonus, clamping current health
    /// down to the reduced maximum
    pub fn unequip_armor(&mut self, items: &HashMap<u32, ItemDef>) {
        if let Some(id) = self.equipped_armor.take() {
            if let Some(def) = items.get(&id) {
                if let ItemKind::Armor { health } = def.kind {
                    self.max_health = self.max_health.saturating_sub(health);
                    self.health = self.health.min(self.max_health);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::obstacle_rects;
    use redoubt_shared::config::COLLISION_BUFFER;
    use redoubt_shared::items::get_item_definitions;

    fn item_map() -> HashMap<u32, ItemDef> {
        get_item_definitions()
            .into_iter()
            .map(|def| (def.id, def))
            .collect()
    }

    #[test]
    fn test_class_starting_stats() {
        let warrior = Player::new((5, 5), CharacterClass::Warrior);
        assert_eq!(warrior.max_health, 120);
        assert_eq!(warrior.damage, 12);
        let mage = Player::new((5, 5), CharacterClass::Mage);
        assert_eq!(mage.max_health, 80);
        assert_eq!(mage.damage, 15);
        let rogue = Player::new((5, 5), CharacterClass::Rogue);
        assert_eq!(rogue.max_health, 100);
        assert_eq!(rogue.damage, 13);
    }

    #[test]
    fn test_movement_stops_at_obstacle() {
        // Wall cell at x=192; the box comes to rest one buffer short of it
        let obstacles = obstacle_rects(&[(6, 5)]);
        let mut player = Player::new((5, 5), CharacterClass::Warrior);
        for _ in 0..20 {
            player.apply_movement(Vec2::new(3.0, 0.0), &obstacles);
        }
        assert!((player.position.x - (192.0 - 32.0 - COLLISION_BUFFER)).abs() < 0.001);
        assert_eq!(player.position.y, 160.0);
    }

    #[test]
    fn test_experience_carries_over_level_ups() {
        let mut player = Player::new((0, 0), CharacterClass::Rogue);
        player.take_damage(50);
        player.gain_experience(250);
        // 100 exp consumed by level 2, 150 carried
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 150);
        assert_eq!(player.max_health, 110);
        assert_eq!(player.health, 60);
        assert_eq!(player.damage, 15);

        player.gain_experience(50);
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 0);
    }

    #[test]
    fn test_equip_rejects_low_level() {
        let items = item_map();
        let mut player = Player::new((0, 0), CharacterClass::Warrior);
        player.add_item(5);
        let err = player.equip(5, &items).unwrap_err();
        assert!(err.contains("Level 3 required"));
        assert_eq!(player.equipped_weapon, None);
        assert_eq!(player.damage, 12);
    }

    #[test]
    fn test_equip_rejects_wrong_class() {
        let items = item_map();
        let mut player = Player::new((0, 0), CharacterClass::Warrior);
        player.add_item(11);
        assert!(player.equip(11, &items).is_err());
        assert_eq!(player.equipped_weapon, None);
    }

    #[test]
    fn test_equip_requires_owned_item() {
        let items = item_map();
        let mut player = Player::new((0, 0), CharacterClass::Warrior);
        assert!(player.equip(1, &items).is_err());
    }

    #[test]
    fn test_weapon_swap_replaces_bonus() {
        let items = item_map();
        let mut player = Player::new((0, 0), CharacterClass::Warrior);
        let base = player.damage;
        player.add_item(1);
        player.add_item(2);

        player.equip(1, &items).unwrap();
        let first_bonus = player.damage - base;
        assert!(first_bonus > 0);

        player.equip(2, &items).unwrap();
        let second_bonus = player.damage - base;
        assert!(second_bonus > first_bonus);

        player.unequip_weapon(&items);
        assert_eq!(player.damage, base);
        assert_eq!(player.equipped_weapon, None);
    }

    #[test]
    fn test_armor_bonus_applies_and_clamps_on_removal() {
        let items = item_map();
        let mut player = Player::new((0, 0), CharacterClass::Mage);
        player.add_item(36);
        player.equip(36, &items).unwrap();
        assert!(player.max_health > 80);
        assert_eq!(player.health, player.max_health);

        player.unequip_armor(&items);
        assert_eq!(player.max_health, 80);
        assert_eq!(player.health, 80);
    }
}
