pub mod config;
pub mod items;
pub mod snapshot;
pub mod stats;

pub use items::*;
pub use snapshot::*;
pub use stats::*;
