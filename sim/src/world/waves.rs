//! Wave scheduling and level progression.
//!
//! Each level runs its waves on a generated map; the last wave of a level
//! is a scripted formation. Clearing it moves the fight into that level's
//! boss arena, and clearing the arena starts the next level. Scripted
//! formations can be overridden from a JSON file at startup.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use redoubt_shared::config::{INTER_WAVE_DELAY, MAX_LEVEL, WAVES_PER_LEVEL};

use crate::navigation::Cell;

/// Where the run currently stands within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    /// Regular waves on a generated map
    Waves,
    /// The single boss wave in the level's arena
    Boss,
}

/// One agent the world should spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Preferred cell; `None` lets the world pick one
    pub cell: Option<Cell>,
    /// Difficulty level for the spawned agent
    pub level: u32,
}

/// What the world must act on after a scheduling tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveEvent {
    Idle,
    /// Spawn the next wave
    Spawn(Vec<SpawnRequest>),
    /// Rebuild the map: the level's boss arena, or the next level's map
    Advance { level: u32, boss: bool },
    /// The final boss arena was cleared
    RunComplete,
}

/// Scripted spawn override file (level number -> wave number -> cells)
#[derive(Debug, Deserialize)]
struct WaveFile {
    levels: HashMap<String, HashMap<String, Vec<(i32, i32)>>>,
}

pub struct WaveManager {
    /// Scripted formations by level, then wave
    tables: HashMap<u32, HashMap<u32, Vec<Cell>>>,
    level: u32,
    /// Current wave within the phase; 0 before the first spawn
    wave: u32,
    phase: WavePhase,
    delay_remaining: f32,
}

impl Default for WaveManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveManager {
    pub fn new() -> Self {
        Self {
            tables: builtin_tables(),
            level: 1,
            wave: 0,
            phase: WavePhase::Waves,
            delay_remaining: INTER_WAVE_DELAY,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Replaces scripted formations with entries from a JSON file. Levels
    /// absent from the file keep their built-in tables; the whole file is
    /// rejected if nothing usable is in it.
    pub fn load_from_json<P: AsRef<Path>>(&mut self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| format!("Failed to open wave table {:?}: {}", path, e))?;
        let reader = BufReader::new(file);
        let parsed: WaveFile = serde_json::from_reader(reader)
            .map_err(|e| format!("Failed to parse wave table {:?}: {}", path, e))?;

        let mut loaded = 0;
        for (level_key, waves) in parsed.levels {
            let level = match level_key.parse::<u32>() {
                Ok(level) if (1..=MAX_LEVEL).contains(&level) => level,
                _ => {
                    warn!("Skipping wave entries for bad level key '{}'", level_key);
                    continue;
                }
            };
            for (wave_key, cells) in waves {
                let wave = match wave_key.parse::<u32>() {
                    Ok(wave) if (1..=WAVES_PER_LEVEL).contains(&wave) => wave,
                    _ => {
                        warn!(
                            "Skipping level {} entries for bad wave key '{}'",
                            level, wave_key
                        );
                        continue;
                    }
                };
                if cells.is_empty() {
                    warn!("Skipping empty spawn list for level {} wave {}", level, wave);
                    continue;
                }
                self.tables.entry(level).or_default().insert(wave, cells);
                loaded += 1;
            }
        }

        if loaded == 0 {
            return Err(format!("Wave table {:?} contains no usable entries", path));
        }
        info!("Loaded {} scripted waves from {:?}", loaded, path);
        Ok(())
    }

    /// Scheduling tick. Counts the inter-wave delay down only while the
    /// field is clear; fighting a wave holds the timer at its full value.
    pub fn update(&mut self, delta: f32, live_enemies: usize) -> WaveEvent {
        if live_enemies > 0 {
            self.delay_remaining = INTER_WAVE_DELAY;
            return WaveEvent::Idle;
        }
        if self.delay_remaining > 0.0 {
            self.delay_remaining -= delta;
            return WaveEvent::Idle;
        }
        self.delay_remaining = INTER_WAVE_DELAY;

        match self.phase {
            WavePhase::Waves => {
                if self.wave < WAVES_PER_LEVEL {
                    self.wave += 1;
                    WaveEvent::Spawn(self.wave_requests())
                } else {
                    self.phase = WavePhase::Boss;
                    self.wave = 0;
                    WaveEvent::Advance { level: self.level, boss: true }
                }
            }
            WavePhase::Boss => {
                if self.wave == 0 {
                    self.wave = 1;
                    WaveEvent::Spawn(self.boss_requests())
                } else if self.level >= MAX_LEVEL {
                    WaveEvent::RunComplete
                } else {
                    self.level += 1;
                    self.phase = WavePhase::Waves;
                    self.wave = 0;
                    WaveEvent::Advance { level: self.level, boss: false }
                }
            }
        }
    }

    /// The scripted formation for the current wave, or a level-scaled
    /// count of free-placement spawns
    fn wave_requests(&self) -> Vec<SpawnRequest> {
        if let Some(cells) = self.tables.get(&self.level).and_then(|t| t.get(&self.wave)) {
            return cells
                .iter()
                .map(|&cell| SpawnRequest { cell: Some(cell), level: self.level })
                .collect();
        }
        let count = 2 + self.level + self.wave;
        (0..count)
            .map(|_| SpawnRequest { cell: None, level: self.level })
            .collect()
    }

    /// One boss two levels above the stage plus an escort per level
    fn boss_requests(&self) -> Vec<SpawnRequest> {
        let mut requests = vec![SpawnRequest { cell: None, level: self.level + 2 }];
        for _ in 0..self.level {
            requests.push(SpawnRequest { cell: None, level: self.level });
        }
        requests
    }
}

/// The shipped formation tables: one scripted wave per level, always the
/// last wave before the boss
fn builtin_tables() -> HashMap<u32, HashMap<u32, Vec<Cell>>> {
    let formation = WAVES_PER_LEVEL;
    HashMap::from([
        (
            1,
            HashMap::from([(
                formation,
                vec![(5, 5), (10, 5), (15, 5), (5, 10), (15, 10), (10, 12)],
            )]),
        ),
        (
            2,
            HashMap::from([(
                formation,
                vec![(5, 5), (10, 5), (15, 5), (5, 10), (15, 10), (10, 3), (10, 12)],
            )]),
        ),
        (
            3,
            HashMap::from([(
                formation,
                vec![(6, 6), (12, 6), (18, 6), (6, 10), (18, 10), (12, 3), (12, 12)],
            )]),
        ),
        (
            4,
            HashMap::from([(
                formation,
                vec![
                    (5, 5),
                    (10, 5),
                    (15, 5),
                    (5, 10),
                    (15, 10),
                    (10, 3),
                    (10, 12),
                    (3, 8),
                    (18, 8),
                ],
            )]),
        ),
        (
            5,
            HashMap::from([(
                formation,
                vec![
                    (5, 5),
                    (10, 5),
                    (15, 5),
                    (5, 10),
                    (15, 10),
                    (10, 3),
                    (10, 12),
                    (3, 8),
                    (18, 8),
                    (8, 8),
                    (12, 8),
                ],
            )]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TICK: f32 = 1.0 / 60.0;

    /// Runs the delay down with an empty field and returns the first
    /// non-idle event
    fn next_event(manager: &mut WaveManager) -> WaveEvent {
        for _ in 0..1000 {
            let event = manager.update(TICK, 0);
            if event != WaveEvent::Idle {
                return event;
            }
        }
        panic!("manager produced no event within 1000 ticks");
    }

    #[test]
    fn test_builtin_formation_sizes() {
        let manager = WaveManager::new();
        let sizes: Vec<usize> = (1..=5)
            .map(|level| manager.tables[&level][&WAVES_PER_LEVEL].len())
            .collect();
        assert_eq!(sizes, vec![6, 7, 7, 9, 11]);
    }

    #[test]
    fn test_first_wave_waits_for_delay() {
        let mut manager = WaveManager::new();
        assert_eq!(manager.update(TICK, 0), WaveEvent::Idle);
        let event = next_event(&mut manager);
        match event {
            WaveEvent::Spawn(requests) => {
                // level 1 wave 1 filler: 2 + 1 + 1
                assert_eq!(requests.len(), 4);
                assert!(requests.iter().all(|r| r.cell.is_none() && r.level == 1));
            }
            other => panic!("expected a spawn, got {:?}", other),
        }
        assert_eq!(manager.wave(), 1);
    }

    #[test]
    fn test_fighting_holds_the_timer() {
        let mut manager = WaveManager::new();
        next_event(&mut manager);
        // live agents on the field pin the delay at full
        for _ in 0..500 {
            assert_eq!(manager.update(TICK, 3), WaveEvent::Idle);
        }
        assert_eq!(manager.wave(), 1);
    }

    #[test]
    fn test_final_wave_is_the_scripted_formation() {
        let mut manager = WaveManager::new();
        for _ in 0..3 {
            assert!(matches!(next_event(&mut manager), WaveEvent::Spawn(_)));
        }
        match next_event(&mut manager) {
            WaveEvent::Spawn(requests) => {
                assert_eq!(requests.len(), 6);
                assert_eq!(requests[0].cell, Some((5, 5)));
                assert_eq!(requests[5].cell, Some((10, 12)));
            }
            other => panic!("expected the formation, got {:?}", other),
        }
        assert_eq!(manager.wave(), WAVES_PER_LEVEL);
    }

    #[test]
    fn test_level_cycle_reaches_boss_then_next_level() {
        let mut manager = WaveManager::new();
        for _ in 0..WAVES_PER_LEVEL {
            assert!(matches!(next_event(&mut manager), WaveEvent::Spawn(_)));
        }

        assert_eq!(
            next_event(&mut manager),
            WaveEvent::Advance { level: 1, boss: true }
        );
        assert_eq!(manager.phase(), WavePhase::Boss);

        match next_event(&mut manager) {
            WaveEvent::Spawn(requests) => {
                // the boss outranks the stage, escorts match it
                assert_eq!(requests.len(), 2);
                assert_eq!(requests[0].level, 3);
                assert_eq!(requests[1].level, 1);
            }
            other => panic!("expected the boss wave, got {:?}", other),
        }

        assert_eq!(
            next_event(&mut manager),
            WaveEvent::Advance { level: 2, boss: false }
        );
        assert_eq!(manager.level(), 2);
        assert_eq!(manager.phase(), WavePhase::Waves);
    }

    #[test]
    fn test_final_boss_completes_the_run() {
        let mut manager = WaveManager::new();
        // fast-forward the state machine across all five levels
        loop {
            match next_event(&mut manager) {
                WaveEvent::RunComplete => break,
                WaveEvent::Spawn(_) | WaveEvent::Advance { .. } => {}
                WaveEvent::Idle => unreachable!(),
            }
        }
        assert_eq!(manager.level(), MAX_LEVEL);
        assert_eq!(manager.phase(), WavePhase::Boss);
    }

    #[test]
    fn test_json_override_replaces_one_wave() {
        let path = std::env::temp_dir().join("redoubt_waves_override_test.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{"levels": {{"1": {{"4": [[7, 7], [8, 8]]}}, "99": {{"1": [[1, 1]]}}}}}}"#
        )
        .unwrap();

        let mut manager = WaveManager::new();
        manager.load_from_json(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(manager.tables[&1][&4], vec![(7, 7), (8, 8)]);
        // untouched levels keep the shipped formations
        assert_eq!(manager.tables[&2][&4].len(), 7);
        assert!(!manager.tables.contains_key(&99));
    }

    #[test]
    fn test_json_rejects_missing_and_malformed_files() {
        let mut manager = WaveManager::new();
        assert!(manager.load_from_json("no_such_wave_file.json").is_err());

        let path = std::env::temp_dir().join("redoubt_waves_malformed_test.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(manager.load_from_json(&path).is_err());
        std::fs::remove_file(&path).ok();

        // builtins survive both failures
        assert_eq!(manager.tables[&1][&WAVES_PER_LEVEL].len(), 6);
    }
}
