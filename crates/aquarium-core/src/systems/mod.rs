//! Systems - logic that operates on components

mod fish;
mod food;
mod interaction;

pub use fish::*;
pub use food::*;
pub use interaction::*;
