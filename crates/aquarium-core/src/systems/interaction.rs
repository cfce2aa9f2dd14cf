//! Interaction system - matches fish against food each tick

use hecs::World;
use log::debug;

use super::fish::FishSystem;
use super::food::FoodManager;
use crate::components::{Fish, FishId};
use crate::events::{EventBus, FeedSource, GameEvent};
use crate::physics::PhysicsStepper;

/// What one feeding pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedingReport {
    /// Fish that ate, with the nutrition they got, in resolution order
    pub eaten: Vec<(FishId, f32)>,
    /// Fish that started chasing a particle
    pub new_chasers: usize,
}

/// Resolve consumption and target acquisition.
///
/// Particles are visited oldest first and fish in registry order. The first
/// fish within `eat_distance` of a particle eats it and the particle is not
/// offered to anyone else. Idle fish that detect a particle before that
/// happens start chasing it. Runs after fish, physics and food updates.
pub fn resolve_feeding(
    world: &mut World,
    physics: &mut dyn PhysicsStepper,
    fish: &FishSystem,
    food: &mut FoodManager,
    bus: &EventBus,
    eat_distance: f32,
    now_ms: f64,
) -> FeedingReport {
    let mut report = FeedingReport::default();

    for (particle, position) in food.live_particles(world) {
        let mut eater = None;
        for entity in fish.iter_order() {
            let Ok(f) = world.query_one_mut::<&mut Fish>(entity) else {
                continue;
            };
            if !f.is_alive() {
                continue;
            }
            if f.is_near_food(position, eat_distance) {
                eater = Some(entity);
                break;
            }
            if !f.is_chasing_food() && f.can_detect(position) {
                f.set_food_target(position);
                report.new_chasers += 1;
            }
        }

        let Some(entity) = eater else {
            continue;
        };
        let nutrition = food.eat_food_particle(world, physics, particle);
        if nutrition <= 0.0 {
            continue;
        }
        let Ok(f) = world.query_one_mut::<&mut Fish>(entity) else {
            continue;
        };
        if f.eat(nutrition, now_ms) {
            let id = f.id();
            debug!("{} ate a flake worth {nutrition:.1}", f.name());
            bus.publish_immediate(GameEvent::FishFed {
                id,
                nutrition,
                source: FeedSource::Particle,
            });
            report.eaten.push((id, nutrition));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{FishConfig, Personality, Species, Vec3};
    use crate::config::{FishTuning, FoodConfig, TankConfig};
    use crate::events::EventKind;
    use crate::physics::WaterPhysics;
    use hecs::Entity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Tank {
        world: World,
        physics: WaterPhysics,
        bus: EventBus,
        rng: StdRng,
        fish: FishSystem,
        food: FoodManager,
    }

    fn tank() -> Tank {
        let config = TankConfig::default();
        let food = FoodConfig {
            jitter: 0.0,
            ..FoodConfig::default()
        };
        Tank {
            world: World::new(),
            physics: WaterPhysics::new().with_walls(config.bounds()),
            bus: EventBus::new(),
            rng: StdRng::seed_from_u64(1),
            fish: FishSystem::new(&config, FishTuning::default()),
            food: FoodManager::new(food, config.bounds()),
        }
    }

    impl Tank {
        fn spawn(&mut self, position: Vec3) -> FishId {
            let config = FishConfig {
                species: Species::Guppy,
                personality: Personality::Wise,
                speed: 1.0,
                turn_speed: 1.0,
                size: 0.4,
                detection_radius: 5.0,
            };
            let e = self.fish.spawn_fish(
                &mut self.world,
                &mut self.physics,
                &self.bus,
                &mut self.rng,
                "Test",
                config,
                position,
            );
            self.world.get::<&Fish>(e).unwrap().id()
        }

        fn drop_one(&mut self, position: Vec3) -> Entity {
            self.food.drop_food(
                &mut self.world,
                &mut self.physics,
                &self.bus,
                &mut self.rng,
                position,
                1,
            )[0]
        }

        fn resolve(&mut self) -> FeedingReport {
            resolve_feeding(
                &mut self.world,
                &mut self.physics,
                &self.fish,
                &mut self.food,
                &self.bus,
                0.6,
                0.0,
            )
        }
    }

    #[test]
    fn two_fish_in_range_only_first_eats() {
        let mut t = tank();
        let first = t.spawn(Vec3::new(0.2, 0.0, 0.0));
        let second = t.spawn(Vec3::new(-0.2, 0.0, 0.0));
        let particle = t.drop_one(Vec3::ZERO);

        let fed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fed);
        t.bus.subscribe(EventKind::FishFed, move |event, _| {
            sink.borrow_mut().push(event.payload.clone());
            Ok(())
        });

        let report = t.resolve();
        assert_eq!(report.eaten.len(), 1);
        assert_eq!(report.eaten[0].0, first);
        assert!(!t.food.contains(particle));
        assert_eq!(fed.borrow().len(), 1);

        let hungry = t.fish.fish(&t.world, second).unwrap();
        assert_eq!(hungry.last_fed_ms, None);
        assert!(!hungry.chasing_food);

        // Nothing left on the second pass
        assert_eq!(t.resolve(), FeedingReport::default());
    }

    #[test]
    fn nearby_fish_start_chasing() {
        let mut t = tank();
        let id = t.spawn(Vec3::new(3.0, 0.0, 0.0));
        t.drop_one(Vec3::ZERO);

        let report = t.resolve();
        assert!(report.eaten.is_empty());
        assert_eq!(report.new_chasers, 1);
        assert!(t.fish.fish(&t.world, id).unwrap().chasing_food);

        // Already chasing
        assert_eq!(t.resolve().new_chasers, 0);
    }

    #[test]
    fn distant_fish_ignore_food() {
        let mut t = tank();
        let id = t.spawn(Vec3::new(-8.0, 0.0, 0.0));
        t.drop_one(Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(t.resolve(), FeedingReport::default());
        assert!(!t.fish.fish(&t.world, id).unwrap().chasing_food);
    }

    #[test]
    fn eating_raises_hunger_by_nutrition() {
        let mut t = tank();
        let id = t.spawn(Vec3::ZERO);
        {
            let entity = t.fish.entity(id).unwrap();
            let fish = t.world.query_one_mut::<&mut Fish>(entity).unwrap();
            *fish = fish
                .clone()
                .with_stats(crate::components::FishStats::new(100.0, 50.0, 10.0));
        }
        t.drop_one(Vec3::ZERO);
        let report = t.resolve();
        let (_, nutrition) = report.eaten[0];
        let data = t.fish.fish(&t.world, id).unwrap();
        assert!((data.hunger - (10.0 + nutrition)).abs() < 1e-4);
        assert_eq!(data.happiness, 60.0);
    }
}
