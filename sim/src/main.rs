//! Headless driver: runs the simulation at the fixed tick rate with a
//! scripted player, so a full run can be watched from the logs.

use std::time::{Duration, Instant};

use env_logger::Env;
use log::{info, warn};

use redoubt_shared::config::TICK_RATE;
use redoubt_shared::stats::CharacterClass;
use redoubt_sim::navigation::{box_center, Vec2};
use redoubt_sim::world::{WaveManager, World};

/// Ticks between scripted attacks
const ATTACK_EVERY: u64 = 30;

/// Enemies closer than this many world units make the player back away
const FLEE_DISTANCE: f32 = 96.0;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let arg = std::env::args().nth(1).map(|s| s.to_lowercase());
    let class = parse_class(arg.as_deref());
    info!("Starting simulation at {} Hz, playing {}", TICK_RATE, class.name());

    let mut waves = WaveManager::new();
    match waves.load_from_json("waves.json") {
        Ok(()) => info!("Wave tables loaded from waves.json"),
        Err(e) => info!("Using built-in wave tables ({})", e),
    }

    let mut world = World::new(class, waves);

    let tick_duration = Duration::from_secs_f64(1.0 / TICK_RATE as f64);
    let mut last_tick = Instant::now();
    let mut tick_count: u64 = 0;

    while world.is_running() {
        let tick_start = Instant::now();

        drive_player(&mut world, tick_count);

        let delta = last_tick.elapsed().as_secs_f32();
        last_tick = Instant::now();
        world.update(delta);

        if tick_count % (TICK_RATE as u64 * 5) == 0 {
            let snapshot = world.snapshot();
            info!(
                "tick {}: level {} wave {}, {} enemies, player {} hp, {} gold",
                snapshot.tick,
                snapshot.level,
                snapshot.wave,
                snapshot.enemies.len(),
                snapshot.player.health,
                snapshot.player.gold
            );
        }

        tick_count += 1;
        let elapsed = tick_start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        }
    }

    let snapshot = world.snapshot();
    if world.is_run_complete() {
        info!(
            "Run complete: player level {}, {} gold banked, {} items found",
            snapshot.player.level,
            snapshot.player.gold,
            world.player.inventory.len()
        );
    } else {
        info!(
            "Game over on level {} wave {} after {} ticks",
            snapshot.level, snapshot.wave, snapshot.tick
        );
    }
}

fn parse_class(arg: Option<&str>) -> CharacterClass {
    match arg {
        None | Some("warrior") => CharacterClass::Warrior,
        Some("mage") => CharacterClass::Mage,
        Some("rogue") => CharacterClass::Rogue,
        Some(other) => {
            warn!("Unknown class '{}', playing warrior", other);
            CharacterClass::Warrior
        }
    }
}

/// Scripted stand-in for real input: kite away from the nearest enemy and
/// attack on a fixed cadence.
fn drive_player(world: &mut World, tick: u64) {
    let player_center = box_center(world.player_position());
    let nearest = world
        .get_enemies()
        .into_iter()
        .map(|enemy| box_center(enemy.position) - player_center)
        .min_by(|a, b| a.length().total_cmp(&b.length()));

    match nearest {
        Some(offset) if offset.length() < FLEE_DISTANCE => {
            world.set_player_intent(offset.normalized() * -1.0);
        }
        _ => world.set_player_intent(Vec2::zero()),
    }

    if tick % ATTACK_EVERY == 0 {
        if let Some(offset) = nearest {
            world.player_attack(offset.normalized());
        }
    }
}
