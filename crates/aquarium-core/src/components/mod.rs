//! Component definitions for the ECS simulation.
//!
//! Components are data attached to entities. Fish carry their own swim
//! behavior; lifecycle and cross-entity logic lives in systems.

mod common;
mod fish;
mod food;
mod personality;

pub use common::*;
pub use fish::*;
pub use food::*;
pub use personality::*;
