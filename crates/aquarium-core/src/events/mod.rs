//! Event bus and event payloads.
//!
//! Systems never call each other directly for gameplay reactions: the fish
//! registry announces `fishFed`, the economy listens and awards coins, and
//! the UI layer listens to both.

mod bus;
mod types;

pub use bus::*;
pub use types::*;
