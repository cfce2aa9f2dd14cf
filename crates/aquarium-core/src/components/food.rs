//! Food particle component.

use serde::{Deserialize, Serialize};

use super::common::Vec3;
use crate::physics::BodyHandle;

/// A sinking food flake. Identity is its ECS entity handle.
#[derive(Debug, Clone)]
pub struct FoodParticle {
    pub(crate) body: BodyHandle,
    pub(crate) position: Vec3,
    /// Milliseconds since the particle was dropped
    pub(crate) age_ms: f32,
    pub(crate) eaten: bool,
    pub(crate) nutrition: f32,
    /// Dissolve progress: 1 when fresh, removed at 0
    pub(crate) opacity: f32,
    pub(crate) settled: bool,
}

impl FoodParticle {
    pub fn new(body: BodyHandle, position: Vec3, nutrition: f32) -> Self {
        Self {
            body,
            position,
            age_ms: 0.0,
            eaten: false,
            nutrition,
            opacity: 1.0,
            settled: false,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn age_ms(&self) -> f32 {
        self.age_ms
    }

    pub fn is_eaten(&self) -> bool {
        self.eaten
    }

    pub fn nutrition(&self) -> f32 {
        self.nutrition
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn snapshot(&self) -> FoodData {
        FoodData {
            position: self.position,
            age_ms: self.age_ms,
            nutrition: self.nutrition,
            opacity: self.opacity,
            settled: self.settled,
        }
    }
}

/// Render-facing view of a live particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodData {
    pub position: Vec3,
    pub age_ms: f32,
    pub nutrition: f32,
    pub opacity: f32,
    pub settled: bool,
}
