//! Simulation entities: enemy agents, the player, and live attacks.

pub mod attack;
pub mod enemy;
pub mod player;

pub use attack::{Attack, AttackKind};
pub use enemy::{AgentEvents, Enemy, NavContext};
pub use player::Player;
