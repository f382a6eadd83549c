//! Redoubt: a wave-survival action RPG simulation.
//!
//! The heart of the crate is the enemy navigation stack under
//! [`navigation`]: grid A* with line-of-sight shortcutting, an
//! accelerate-toward-target steering model, stuck detection with corner
//! recovery, and pairwise separation between agents. [`world`] owns the
//! level state and runs the fixed-tick pipeline; [`entities`] holds the
//! player, the agents, and live attacks.

pub mod entities;
pub mod navigation;
pub mod world;

pub use world::World;
