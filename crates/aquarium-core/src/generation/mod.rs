//! Generation - procedural creation of fish

mod fish;
mod names;

pub use fish::*;
pub use names::*;
