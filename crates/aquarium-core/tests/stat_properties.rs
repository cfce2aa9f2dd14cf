//! Property tests for stat bounds and food consumption.

use aquarium_core::components::{
    BoundingBox, Fish, FishConfig, FishId, Personality, Species, SteeringContext, Vec3,
};
use aquarium_core::config::FoodConfig;
use aquarium_core::events::EventBus;
use aquarium_core::physics::{PhysicsStepper, RigidBody, WaterPhysics};
use aquarium_core::systems::FoodManager;
use hecs::World;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone)]
enum Op {
    Feed,
    Eat(f32),
    Pet,
    Tick(f32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Feed),
        any::<f32>().prop_map(Op::Eat),
        Just(Op::Pet),
        (0.0f32..600.0).prop_map(Op::Tick),
    ]
}

fn tank() -> BoundingBox {
    BoundingBox::centered(20.0, 12.0, 10.0)
}

fn fish(physics: &mut WaterPhysics, rng: &mut StdRng) -> Fish {
    let config = FishConfig {
        species: Species::Betta,
        personality: Personality::Playful,
        speed: 1.2,
        turn_speed: 2.0,
        size: 0.5,
        detection_radius: 5.0,
    };
    let body = physics.add_body(RigidBody::swimmer(Vec3::ZERO));
    Fish::new(FishId::random(rng), "Prop", config, body, Vec3::ZERO, Vec3::X)
}

fn steering() -> SteeringContext {
    SteeringContext {
        tank: tank(),
        boundary_margin: 2.0,
        avoidance_blend: 0.3,
        arrival_distance: 0.3,
        chase_timeout: 8.0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn stats_stay_in_bounds(ops in prop::collection::vec(arb_op(), 1..60), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut physics = WaterPhysics::new();
        let mut fish = fish(&mut physics, &mut rng);
        let ctx = steering();
        let mut now = 0.0;

        for op in ops {
            match op {
                Op::Feed => { fish.feed(now); }
                Op::Eat(n) => { fish.eat(n, now); }
                Op::Pet => { fish.pet(now); }
                Op::Tick(dt) => {
                    fish.update(&ctx, &mut rng, dt, now);
                    now += f64::from(dt) * 1000.0;
                }
            }
            let stats = fish.stats();
            for value in [stats.health(), stats.happiness(), stats.hunger()] {
                prop_assert!((0.0..=100.0).contains(&value), "stat out of bounds: {}", value);
            }
        }
    }

    #[test]
    fn particle_is_eaten_at_most_once(attempts in 1usize..10, seed in any::<u64>()) {
        let mut world = World::new();
        let mut physics = WaterPhysics::new().with_walls(tank());
        let bus = EventBus::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut food = FoodManager::new(FoodConfig::default(), tank());

        let particle = food.drop_food(&mut world, &mut physics, &bus, &mut rng, Vec3::ZERO, 1)[0];
        let payouts: Vec<f32> = (0..attempts)
            .map(|_| food.eat_food_particle(&mut world, &mut physics, particle))
            .collect();

        prop_assert!(payouts[0] >= 10.0 && payouts[0] <= 20.0);
        prop_assert!(payouts[1..].iter().all(|&n| n == 0.0));
        prop_assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn food_never_exceeds_capacity(
        batches in prop::collection::vec(0u32..8, 1..10),
        capacity in 1usize..12,
        seed in any::<u64>(),
    ) {
        let mut world = World::new();
        let mut physics = WaterPhysics::new().with_walls(tank());
        let bus = EventBus::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let config = FoodConfig { capacity, ..FoodConfig::default() };
        let mut food = FoodManager::new(config, tank());

        let mut all = Vec::new();
        for count in batches {
            all.extend(food.drop_food(&mut world, &mut physics, &bus, &mut rng, Vec3::ZERO, count));
            prop_assert!(food.len() <= capacity);
        }

        // Survivors are exactly the newest drops, oldest first
        let keep = all.len().min(capacity);
        let expected = &all[all.len() - keep..];
        let survivors: Vec<_> = food.iter().collect();
        prop_assert_eq!(survivors.as_slice(), expected);
        prop_assert_eq!(physics.body_count(), keep);
    }
}
