//! Aquarium Core - Interactive Aquarium Simulation Engine
//!
//! A headless simulation of a home aquarium: fish swim with
//! personality-driven motion, players feed, pet and clean, and a small coin
//! economy with levels and achievements rewards looking after the tank.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Fish and food particles
//! - **Components**: Fish state and behavior, food particles, geometry
//! - **Systems**: Fish registry, food lifecycle and the feeding pass
//!
//! Systems never call each other for gameplay reactions. They publish on the
//! [`events::EventBus`] and the economy ([`game::GameLogic`]) or the host UI
//! subscribe. Physics sits behind the [`physics::PhysicsStepper`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use aquarium_core::prelude::*;
//!
//! let mut aquarium = Aquarium::new(AquariumConfig::default().with_seed(7))
//!     .expect("default config is valid");
//!
//! aquarium.populate(5);
//! aquarium.drop_food(None, None);
//!
//! // Run simulation
//! loop {
//!     aquarium.advance(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod camera;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod game;
pub mod generation;
pub mod physics;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::camera::{Camera, ScreenPoint, Viewport};
    pub use crate::components::*;
    pub use crate::config::AquariumConfig;
    pub use crate::engine::Aquarium;
    pub use crate::events::{Event, EventBus, EventKind, GameEvent, MessageLevel};
    pub use crate::game::{AchievementId, ProgressionState};
}
