//! Item definitions shared between the simulation and any frontend.

use serde::{Deserialize, Serialize};

use crate::stats::CharacterClass;

/// What an item does when equipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Adds to the wielder's damage
    Weapon { damage: u32 },
    /// Adds to the wearer's max health
    Armor { health: u32 },
}

/// Item definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: u32,
    pub name: String,
    pub class: CharacterClass,
    pub level_req: u32,
    pub kind: ItemKind,
}

impl ItemDef {
    fn weapon(id: u32, name: &str, class: CharacterClass, level_req: u32, damage: u32) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            level_req,
            kind: ItemKind::Weapon { damage },
        }
    }

    fn armor(id: u32, name: &str, class: CharacterClass, level_req: u32, health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            level_req,
            kind: ItemKind::Armor { health },
        }
    }
}

/// Built-in item tables: ten weapons and five armors per class
pub fn get_item_definitions() -> Vec<ItemDef> {
    use CharacterClass::{Mage, Rogue, Warrior};

    vec![
        ItemDef::weapon(1, "Iron Shortsword", Warrior, 1, 15),
        ItemDef::weapon(2, "Steel Axe", Warrior, 1, 20),
        ItemDef::weapon(3, "War Hammer", Warrior, 2, 25),
        ItemDef::weapon(4, "Halberd", Warrior, 2, 25),
        ItemDef::weapon(5, "Great Sword", Warrior, 3, 35),
        ItemDef::weapon(6, "Battle Axe", Warrior, 3, 40),
        ItemDef::weapon(7, "Club", Warrior, 4, 45),
        ItemDef::weapon(8, "Trident", Warrior, 4, 40),
        ItemDef::weapon(9, "Dragon Slayer", Warrior, 6, 70),
        ItemDef::weapon(10, "Blade of the Ruined King", Warrior, 6, 65),
        ItemDef::weapon(11, "Apprentice Staff", Mage, 1, 5),
        ItemDef::weapon(12, "Sun Wand", Mage, 1, 5),
        ItemDef::weapon(13, "Thorn Staff", Mage, 2, 7),
        ItemDef::weapon(14, "Water Wand", Mage, 2, 7),
        ItemDef::weapon(15, "Lightning Staff", Mage, 3, 10),
        ItemDef::weapon(16, "Blood Staff", Mage, 3, 10),
        ItemDef::weapon(17, "Soul Flame Staff", Mage, 4, 15),
        ItemDef::weapon(18, "Azure Stone Staff", Mage, 4, 15),
        ItemDef::weapon(19, "Staff of the Elite", Mage, 6, 20),
        ItemDef::weapon(20, "Shillelagh of the Old One", Mage, 6, 20),
        ItemDef::weapon(21, "Rusty Dagger", Rogue, 1, 20),
        ItemDef::weapon(22, "Large Dagger", Rogue, 1, 20),
        ItemDef::weapon(23, "Sickle", Rogue, 2, 30),
        ItemDef::weapon(24, "Kukri", Rogue, 2, 30),
        ItemDef::weapon(25, "Small Cutlass", Rogue, 3, 35),
        ItemDef::weapon(26, "Molten Dagger", Rogue, 3, 35),
        ItemDef::weapon(27, "Shadow Dagger", Rogue, 4, 45),
        ItemDef::weapon(28, "Mythril Dagger", Rogue, 4, 45),
        ItemDef::weapon(29, "Dagger of Ullr", Rogue, 6, 60),
        ItemDef::weapon(30, "Soulflame Blade", Rogue, 6, 60),
        ItemDef::armor(31, "Leather Plate", Warrior, 1, 10),
        ItemDef::armor(32, "Iron Chainmail", Warrior, 2, 15),
        ItemDef::armor(33, "Knight's Helm", Warrior, 3, 20),
        ItemDef::armor(34, "Knight's Gauntlets", Warrior, 4, 25),
        ItemDef::armor(35, "Warlord's Plate", Warrior, 6, 30),
        ItemDef::armor(36, "Cloth Robe", Mage, 1, 5),
        ItemDef::armor(37, "Enchanted Cloak", Mage, 2, 8),
        ItemDef::armor(38, "Hat of Wizardry", Mage, 3, 11),
        ItemDef::armor(39, "Pendant of Sorcery", Mage, 4, 14),
        ItemDef::armor(40, "Ring of Hel", Mage, 6, 17),
        ItemDef::armor(41, "Leather Vest", Rogue, 1, 7),
        ItemDef::armor(42, "Shadow Garb", Rogue, 2, 12),
        ItemDef::armor(43, "Assassins Hood", Rogue, 3, 17),
        ItemDef::armor(44, "Pendant of Trickery", Rogue, 4, 22),
        ItemDef::armor(45, "Ring of Loki", Rogue, 6, 27),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_unique_and_dense() {
        let defs = get_item_definitions();
        let mut ids: Vec<u32> = defs.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&(defs.len() as u32)));
    }

    #[test]
    fn test_every_class_has_weapons_and_armor() {
        let defs = get_item_definitions();
        for class in [
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
        ] {
            let weapons = defs
                .iter()
                .filter(|d| d.class == class && matches!(d.kind, ItemKind::Weapon { .. }))
                .count();
            let armors = defs
                .iter()
                .filter(|d| d.class == class && matches!(d.kind, ItemKind::Armor { .. }))
                .count();
            assert_eq!(weapons, 10);
            assert_eq!(armors, 5);
        }
    }
}
