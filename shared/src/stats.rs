//! Character classes and stat blocks.

use serde::{Deserialize, Serialize};

use crate::config::EXP_LEVEL_FACTOR;

/// Player character class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CharacterClass {
    Warrior = 0,
    Mage = 1,
    Rogue = 2,
}

impl CharacterClass {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Warrior),
            1 => Some(Self::Mage),
            2 => Some(Self::Rogue),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Warrior => "Warrior",
            Self::Mage => "Mage",
            Self::Rogue => "Rogue",
        }
    }

    /// Starting max health for this class
    pub fn base_max_health(&self) -> u32 {
        match self {
            Self::Warrior => 120,
            Self::Mage => 80,
            Self::Rogue => 100,
        }
    }

    /// Starting unarmed damage for this class
    pub fn base_damage(&self) -> u32 {
        match self {
            Self::Warrior => 12,
            Self::Mage => 15,
            Self::Rogue => 13,
        }
    }
}

/// Experience required to advance past the given player level
pub fn exp_required(level: u32) -> u64 {
    EXP_LEVEL_FACTOR * level as u64
}
