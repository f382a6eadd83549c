//! Per-tick world snapshots handed to a frontend for rendering.

use serde::{Deserialize, Serialize};

use crate::stats::CharacterClass;

/// Player state as seen by a frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub class: CharacterClass,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub experience: u64,
    pub gold: u32,
}

/// Enemy state as seen by a frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
}

/// Everything a frontend needs to draw one simulation tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub level: u32,
    pub wave: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
}

impl WorldSnapshot {
    pub fn serialize(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Failed to serialize WorldSnapshot")
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = WorldSnapshot {
            tick: 120,
            level: 2,
            wave: 3,
            player: PlayerView {
                x: 640.0,
                y: 480.0,
                class: CharacterClass::Rogue,
                health: 90,
                max_health: 100,
                level: 3,
                experience: 250,
                gold: 40,
            },
            enemies: vec![EnemyView {
                id: 10001,
                x: 160.0,
                y: 160.0,
                health: 20,
                max_health: 46,
                level: 2,
            }],
        };

        let bytes = snapshot.serialize();
        let decoded = WorldSnapshot::deserialize(&bytes).unwrap();
        assert_eq!(decoded.tick, 120);
        assert_eq!(decoded.enemies.len(), 1);
        assert_eq!(decoded.enemies[0].id, 10001);
        assert_eq!(decoded.player.gold, 40);
    }
}
