//! Food system - dropping, sinking, settling, dissolving and eating flakes

use std::collections::VecDeque;

use hecs::{Entity, World};
use log::{debug, warn};
use rand::Rng;

use crate::components::{BoundingBox, FoodData, FoodParticle, Vec3};
use crate::config::FoodConfig;
use crate::events::{EventBus, GameEvent};
use crate::physics::{PhysicsStepper, RigidBody};

/// Owns every food particle. Particles are ECS entities; this manager keeps
/// them in drop order so eviction and consumption checks run oldest first.
#[derive(Debug, Clone)]
pub struct FoodManager {
    config: FoodConfig,
    tank: BoundingBox,
    order: VecDeque<Entity>,
}

impl FoodManager {
    pub fn new(config: FoodConfig, tank: BoundingBox) -> Self {
        Self {
            config,
            tank,
            order: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &FoodConfig {
        &self.config
    }

    /// Drop `count` flakes around `position`.
    ///
    /// At capacity the oldest particle is evicted before each insert. A batch
    /// larger than the capacity is cut down to the capacity, so every handle
    /// returned and announced in `foodDropped` (queued) is live.
    pub fn drop_food(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        bus: &EventBus,
        rng: &mut impl Rng,
        position: Vec3,
        count: u32,
    ) -> Vec<Entity> {
        if !position.is_finite() {
            warn!("ignoring food drop at non-finite position {position:?}");
            return Vec::new();
        }
        let cap = u32::try_from(self.config.capacity).unwrap_or(u32::MAX);
        if count > cap {
            debug!("clamping food drop of {count} to capacity {cap}");
        }
        let count = count.min(cap);
        if count == 0 {
            return Vec::new();
        }

        let jitter = if self.config.jitter.is_finite() {
            self.config.jitter.max(0.0)
        } else {
            0.0
        };
        let mut spawned = Vec::with_capacity(count as usize);
        for _ in 0..count {
            while self.order.len() >= self.config.capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                debug!("food at capacity, evicting {oldest:?}");
                self.despawn(world, physics, oldest);
            }

            let offset = Vec3::new(
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
                rng.gen_range(-jitter..=jitter),
            );
            let spot = self.tank.clamp(position + offset);
            let velocity = Vec3::new(
                rng.gen_range(-0.2..=0.2),
                -rng.gen_range(0.1..=0.3),
                rng.gen_range(-0.2..=0.2),
            );
            let body = physics.add_body(RigidBody::sinking(spot, velocity));
            let nutrition = self.config.nutrition.sample(rng);
            let entity = world.spawn((FoodParticle::new(body, spot, nutrition),));
            self.order.push_back(entity);
            spawned.push(entity);
        }

        debug!("dropped {} food particles at {position:?}", spawned.len());
        bus.publish(GameEvent::FoodDropped {
            position,
            count,
            particles: spawned.clone(),
        });
        spawned
    }

    /// Consume a particle.
    ///
    /// Returns its nutrition the first time and 0 for eaten, evicted or
    /// unknown particles. The particle is removed in the same call.
    pub fn eat_food_particle(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        particle: Entity,
    ) -> f32 {
        let nutrition = match world.query_one_mut::<&mut FoodParticle>(particle) {
            Ok(food) if !food.eaten => {
                food.eaten = true;
                food.nutrition
            }
            _ => return 0.0,
        };
        self.order.retain(|&e| e != particle);
        self.despawn(world, physics, particle);
        nutrition
    }

    /// Age, settle and dissolve particles. Returns how many were removed.
    pub fn update(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        dt: f32,
    ) -> usize {
        let floor = self.tank.min.y + self.config.settle_tolerance;
        let mut expired = Vec::new();

        for &entity in &self.order {
            let Ok(food) = world.query_one_mut::<&mut FoodParticle>(entity) else {
                expired.push(entity);
                continue;
            };

            if let Some(body) = physics.body_mut(food.body) {
                food.position = body.position;
                if !food.settled && body.position.y <= floor {
                    body.velocity = Vec3::ZERO;
                    body.frozen = true;
                    food.settled = true;
                }
            }

            food.age_ms += dt * 1000.0;
            if food.settled && self.config.dissolve_seconds > 0.0 {
                food.opacity = (food.opacity - dt / self.config.dissolve_seconds).max(0.0);
            }

            if food.opacity <= 0.0 || food.age_ms >= self.config.max_age_ms {
                expired.push(entity);
            }
        }

        if !expired.is_empty() {
            self.order.retain(|e| !expired.contains(e));
            for &entity in &expired {
                self.despawn(world, physics, entity);
            }
            debug!("{} food particles dissolved", expired.len());
        }
        expired.len()
    }

    fn despawn(&self, world: &mut World, physics: &mut dyn PhysicsStepper, entity: Entity) {
        if let Ok(food) = world.get::<&FoodParticle>(entity) {
            physics.remove_body(food.body);
        }
        // Already gone is fine
        let _ = world.despawn(entity);
    }

    /// Live particles, oldest first
    pub fn live_particles(&self, world: &World) -> Vec<(Entity, Vec3)> {
        self.order
            .iter()
            .filter_map(|&e| {
                let food = world.get::<&FoodParticle>(e).ok()?;
                let position = food.position;
                if food.eaten {
                    None
                } else {
                    Some((e, position))
                }
            })
            .collect()
    }

    /// Particle handles in drop order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, particle: Entity) -> bool {
        self.order.contains(&particle)
    }

    pub fn particle(&self, world: &World, particle: Entity) -> Option<FoodData> {
        if !self.contains(particle) {
            return None;
        }
        world
            .get::<&FoodParticle>(particle)
            .ok()
            .map(|food| food.snapshot())
    }

    /// Remove every particle and its body
    pub fn clear(&mut self, world: &mut World, physics: &mut dyn PhysicsStepper) {
        let all: Vec<Entity> = self.order.drain(..).collect();
        for entity in all {
            self.despawn(world, physics, entity);
        }
    }
}
