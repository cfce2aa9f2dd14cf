//! Fish registry - spawning, selection, player interactions and lifecycle

use std::collections::HashMap;

use hecs::{Entity, World};
use log::{debug, info, warn};
use rand::Rng;

use crate::camera::{Camera, ScreenPoint, Viewport};
use crate::components::{
    random_heading, Fish, FishConfig, FishData, FishId, Ray, SteeringContext, Vec3, FEED_HUNGER,
};
use crate::config::{FishTuning, TankConfig};
use crate::events::{EventBus, FeedSource, GameEvent, MessageLevel};
use crate::generation::{generate_fish_name, random_fish_config, random_spawn_point};
use crate::physics::{PhysicsStepper, RigidBody};

/// Registry of live fish in insertion order, plus the current selection.
///
/// Iteration order is stable and doubles as the tie-break when two fish
/// compete for the same particle.
#[derive(Debug, Clone)]
pub struct FishSystem {
    order: Vec<Entity>,
    by_id: HashMap<FishId, Entity>,
    selected: Option<FishId>,
    steering: SteeringContext,
    tuning: FishTuning,
}

impl FishSystem {
    pub fn new(tank: &TankConfig, tuning: FishTuning) -> Self {
        let steering = SteeringContext {
            tank: tank.bounds(),
            boundary_margin: tank.boundary_margin,
            avoidance_blend: tank.avoidance_blend,
            arrival_distance: tuning.arrival_distance,
            chase_timeout: tuning.chase_timeout,
        };
        Self {
            order: Vec::new(),
            by_id: HashMap::new(),
            selected: None,
            steering,
            tuning,
        }
    }

    pub fn tuning(&self) -> &FishTuning {
        &self.tuning
    }

    pub fn steering(&self) -> &SteeringContext {
        &self.steering
    }

    /// Spawn a fish with random species, personality, tuning and position
    pub fn add_fish(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        bus: &EventBus,
        rng: &mut impl Rng,
    ) -> Entity {
        let config = random_fish_config(&self.tuning, rng);
        let name = generate_fish_name(rng);
        let position =
            random_spawn_point(&self.steering.tank, self.steering.boundary_margin, rng);
        self.spawn_fish(world, physics, bus, rng, name, config, position)
    }

    /// Spawn a fish with the given configuration at `position`
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_fish(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        bus: &EventBus,
        rng: &mut impl Rng,
        name: impl Into<String>,
        config: FishConfig,
        position: Vec3,
    ) -> Entity {
        let position = self.steering.tank.clamp(position);
        let id = FishId::random(rng);
        let body = physics.add_body(RigidBody::swimmer(position));
        let fish = Fish::new(id, name, config, body, position, random_heading(rng));
        info!(
            "{} the {} ({}) joined the tank",
            fish.name(),
            config.species.name(),
            config.personality
        );

        let entity = world.spawn((fish,));
        self.order.push(entity);
        self.by_id.insert(id, entity);
        bus.publish(GameEvent::FishCountChanged {
            count: self.order.len(),
        });
        entity
    }

    /// Select the nearest fish hit by `ray`. A miss clears the selection.
    pub fn select_at(&mut self, world: &World, bus: &EventBus, ray: &Ray) -> Option<FishId> {
        let mut best: Option<(f32, FishId)> = None;
        for &entity in &self.order {
            let Ok(fish) = world.get::<&Fish>(entity) else {
                continue;
            };
            if !fish.is_alive() {
                continue;
            }
            if let Some(t) = ray.intersect_sphere(fish.position(), fish.config().size) {
                // Strictly nearer only, so earlier fish win ties
                if best.map_or(true, |(best_t, _)| t < best_t) {
                    best = Some((t, fish.id()));
                }
            }
        }

        let hit = best.map(|(_, id)| id);
        self.set_selection(world, bus, hit);
        hit
    }

    /// Select through a screen click. A degenerate camera or viewport changes nothing.
    pub fn select_at_screen(
        &mut self,
        world: &World,
        bus: &EventBus,
        camera: &Camera,
        point: ScreenPoint,
        viewport: Viewport,
    ) -> Option<FishId> {
        match camera.ray_through(point, viewport) {
            Some(ray) => self.select_at(world, bus, &ray),
            None => {
                warn!("cannot pick through {point:?} in {viewport:?}");
                None
            }
        }
    }

    fn set_selection(&mut self, world: &World, bus: &EventBus, next: Option<FishId>) {
        if self.selected == next {
            return;
        }
        if let Some(previous) = self.selected.take() {
            if let Some(entity) = self.by_id.get(&previous) {
                if let Ok(mut fish) = world.get::<&mut Fish>(*entity) {
                    fish.set_selected(false);
                }
            }
            bus.publish(GameEvent::FishDeselected { id: previous });
        }
        if let Some(id) = next {
            if let Some(entity) = self.by_id.get(&id) {
                if let Ok(mut fish) = world.get::<&mut Fish>(*entity) {
                    fish.set_selected(true);
                }
            }
            self.selected = Some(id);
            bus.publish(GameEvent::FishSelected { id });
        }
    }

    /// Clear the selection, publishing `fishDeselected` if something was selected
    pub fn deselect(&mut self, world: &World, bus: &EventBus) {
        self.set_selection(world, bus, None);
    }

    fn resolve_target(&self, target: Option<FishId>) -> Option<(FishId, Entity)> {
        let id = target.or(self.selected)?;
        self.by_id.get(&id).map(|&entity| (id, entity))
    }

    /// Hand-feed `target`, or the selected fish.
    ///
    /// Publishes `fishFed` immediately, or a warning `message` when there is
    /// nobody to feed.
    pub fn feed(
        &mut self,
        world: &mut World,
        bus: &EventBus,
        target: Option<FishId>,
        now_ms: f64,
    ) -> Option<FishId> {
        let Some((id, entity)) = self.resolve_target(target) else {
            bus.publish(GameEvent::message("Select a fish to feed", MessageLevel::Warning));
            return None;
        };
        let fed = world
            .query_one_mut::<&mut Fish>(entity)
            .map(|fish| fish.feed(now_ms))
            .unwrap_or(false);
        if !fed {
            return None;
        }
        bus.publish_immediate(GameEvent::FishFed {
            id,
            nutrition: FEED_HUNGER,
            source: FeedSource::Hand,
        });
        Some(id)
    }

    /// Pet `target`, or the selected fish. Publishes `fishPetted` immediately.
    pub fn pet(
        &mut self,
        world: &mut World,
        bus: &EventBus,
        target: Option<FishId>,
        now_ms: f64,
    ) -> Option<FishId> {
        let Some((id, entity)) = self.resolve_target(target) else {
            bus.publish(GameEvent::message("Select a fish to pet", MessageLevel::Warning));
            return None;
        };
        let Ok(fish) = world.query_one_mut::<&mut Fish>(entity) else {
            return None;
        };
        if !fish.pet(now_ms) {
            return None;
        }
        let streak = fish.pet_streak();
        bus.publish_immediate(GameEvent::FishPetted { id, streak });
        Some(id)
    }

    /// Decay stats and steer every fish, writing velocities into their bodies
    pub fn update(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        rng: &mut impl Rng,
        dt: f32,
        now_ms: f64,
    ) {
        for &entity in &self.order {
            let Ok(fish) = world.query_one_mut::<&mut Fish>(entity) else {
                continue;
            };
            let velocity = fish.update(&self.steering, rng, dt, now_ms);
            if let Some(body) = physics.body_mut(fish.body()) {
                body.velocity = velocity;
            }
        }
    }

    /// Copy integrated positions and velocities back from physics
    pub fn sync_from_physics(&mut self, world: &mut World, physics: &dyn PhysicsStepper) {
        for &entity in &self.order {
            let Ok(fish) = world.query_one_mut::<&mut Fish>(entity) else {
                continue;
            };
            if let Some(body) = physics.body(fish.body()) {
                fish.sync_from_body(body.position, body.velocity);
            }
        }
    }

    /// Remove fish whose health reached zero, with their bodies.
    ///
    /// Publishes `fishDied` per fish and one `fishCountChanged`.
    pub fn remove_dead(
        &mut self,
        world: &mut World,
        physics: &mut dyn PhysicsStepper,
        bus: &EventBus,
    ) -> Vec<FishId> {
        let dead: Vec<Entity> = self
            .order
            .iter()
            .copied()
            .filter(|&e| world.get::<&Fish>(e).map_or(true, |fish| !fish.is_alive()))
            .collect();
        if dead.is_empty() {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(dead.len());
        for entity in &dead {
            if let Ok(fish) = world.query_one_mut::<&mut Fish>(*entity) {
                let data = fish.data();
                fish.destroy();
                physics.remove_body(fish.body());
                self.by_id.remove(&data.id);
                if self.selected == Some(data.id) {
                    self.selected = None;
                    bus.publish(GameEvent::FishDeselected { id: data.id });
                }
                info!("{} the {} died", data.name, data.species.name());
                bus.publish(GameEvent::FishDied {
                    id: data.id,
                    name: data.name,
                    species: data.species,
                });
                removed.push(data.id);
            }
            let _ = world.despawn(*entity);
        }
        self.order.retain(|e| !dead.contains(e));
        bus.publish(GameEvent::FishCountChanged {
            count: self.order.len(),
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in registry order
    pub fn ids(&self, world: &World) -> Vec<FishId> {
        self.order
            .iter()
            .filter_map(|&e| world.get::<&Fish>(e).ok().map(|fish| fish.id()))
            .collect()
    }

    pub fn entity(&self, id: FishId) -> Option<Entity> {
        self.by_id.get(&id).copied()
    }

    pub fn fish(&self, world: &World, id: FishId) -> Option<FishData> {
        let entity = self.entity(id)?;
        let data = world.get::<&Fish>(entity).ok().map(|fish| fish.data());
        data
    }

    /// Snapshots of every fish in registry order
    pub fn data(&self, world: &World) -> Vec<FishData> {
        self.order
            .iter()
            .filter_map(|&e| world.get::<&Fish>(e).ok().map(|fish| fish.data()))
            .collect()
    }

    pub fn selected(&self) -> Option<FishId> {
        self.selected
    }

    /// Entities in registry (insertion) order
    pub fn iter_order(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// Remove every fish and its body
    pub fn clear(&mut self, world: &mut World, physics: &mut dyn PhysicsStepper) {
        for entity in self.order.drain(..) {
            if let Ok(fish) = world.get::<&Fish>(entity) {
                physics.remove_body(fish.body());
            }
            let _ = world.despawn(entity);
        }
        self.by_id.clear();
        self.selected = None;
        debug!("fish registry cleared");
    }
}
