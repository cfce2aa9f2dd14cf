//! Physics seam - the rigid-body stepper the simulation drives each tick.
//!
//! The simulation treats physics as a black box behind [`PhysicsStepper`]:
//! bodies are added and removed by handle, steering code writes velocities,
//! and `step` advances everything on a fixed timestep. [`WaterPhysics`] is a
//! small built-in stepper (semi-implicit Euler with buoyancy-scaled gravity,
//! linear water drag and static tank walls) so the core runs headless.

use serde::{Deserialize, Serialize};

use crate::components::{BoundingBox, Vec3};

/// Generational handle to a body owned by a [`PhysicsStepper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// A point-mass rigid body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Fraction of world gravity applied (0 = neutrally buoyant)
    pub gravity_scale: f32,
    /// Velocity damping per second: `v *= 1 / (1 + damping * dt)`
    pub linear_damping: f32,
    /// Frozen bodies are skipped by integration
    pub frozen: bool,
}

impl RigidBody {
    /// Neutrally buoyant body with no damping (fish: steering sets velocity every tick)
    pub fn swimmer(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            gravity_scale: 0.0,
            linear_damping: 0.0,
            frozen: false,
        }
    }

    /// Slowly sinking body with water drag (food flakes)
    pub fn sinking(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            gravity_scale: 0.05,
            linear_damping: 1.0,
            frozen: false,
        }
    }
}

/// Rigid-body stepper interface.
///
/// Implementations own their bodies; callers hold only [`BodyHandle`]s.
/// Stale handles (removed bodies) resolve to `None`.
pub trait PhysicsStepper {
    fn add_body(&mut self, body: RigidBody) -> BodyHandle;

    fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody>;

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody>;

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody>;

    /// Advance all bodies by `dt` seconds of real time
    fn step(&mut self, dt: f32);

    fn body_count(&self) -> usize;

    /// Remove every body
    fn clear(&mut self);
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// Fixed-timestep water physics with static tank walls
#[derive(Debug, Clone)]
pub struct WaterPhysics {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    gravity: Vec3,
    fixed_step: f32,
    max_substeps: u32,
    accumulator: f32,
    walls: Option<BoundingBox>,
}

impl WaterPhysics {
    pub const DEFAULT_FIXED_STEP: f32 = 1.0 / 60.0;
    pub const DEFAULT_MAX_SUBSTEPS: u32 = 5;

    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            gravity: Vec3::new(0.0, -9.82, 0.0),
            fixed_step: Self::DEFAULT_FIXED_STEP,
            max_substeps: Self::DEFAULT_MAX_SUBSTEPS,
            accumulator: 0.0,
            walls: None,
        }
    }

    /// Keep bodies inside `walls`; a body touching a wall loses its velocity into it
    pub fn with_walls(mut self, walls: BoundingBox) -> Self {
        self.walls = Some(walls);
        self
    }

    pub fn with_fixed_step(mut self, fixed_step: f32, max_substeps: u32) -> Self {
        self.fixed_step = fixed_step.max(1e-4);
        self.max_substeps = max_substeps.max(1);
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    fn slot(&self, handle: BodyHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        let walls = self.walls;
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if body.frozen {
                continue;
            }

            body.velocity += gravity * (body.gravity_scale * dt);
            if body.linear_damping > 0.0 {
                body.velocity = body.velocity * (1.0 / (1.0 + body.linear_damping * dt));
            }
            body.position += body.velocity * dt;

            if let Some(walls) = walls {
                confine(body, &walls);
            }
        }
    }
}

impl Default for WaterPhysics {
    fn default() -> Self {
        Self::new()
    }
}

/// Push a body back inside the walls, zeroing velocity along any axis it hit
fn confine(body: &mut RigidBody, walls: &BoundingBox) {
    let clamped = walls.clamp(body.position);
    if clamped.x != body.position.x {
        body.velocity.x = 0.0;
    }
    if clamped.y != body.position.y {
        body.velocity.y = 0.0;
    }
    if clamped.z != body.position.z {
        body.velocity.z = 0.0;
    }
    body.position = clamped;
}

impl PhysicsStepper for WaterPhysics {
    fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle {
            index,
            generation: 0,
        }
    }

    fn remove_body(&mut self, handle: BodyHandle) -> Option<RigidBody> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(body)
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.slot(handle).and_then(|slot| slot.body.as_ref())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= self.fixed_step && substeps < self.max_substeps {
            let fixed = self.fixed_step;
            self.integrate(fixed);
            self.accumulator -= fixed;
            substeps += 1;
        }
        // Long stalls are dropped rather than simulated in a burst
        if substeps == self.max_substeps && self.accumulator >= self.fixed_step {
            self.accumulator = 0.0;
        }
    }

    fn body_count(&self) -> usize {
        self.live
    }

    fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.body.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.live = 0;
        self.accumulator = 0.0;
    }
}
