use aquarium_core::components::Vec3;
use aquarium_core::config::AquariumConfig;
use aquarium_core::engine::Aquarium;
use aquarium_core::events::EventBus;
use aquarium_core::physics::WaterPhysics;
use aquarium_core::systems::{resolve_feeding, FishSystem, FoodManager};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

struct Scene {
    world: World,
    physics: WaterPhysics,
    bus: EventBus,
    fish: FishSystem,
    food: FoodManager,
}

fn scene(fish_count: usize, food_count: u32) -> Scene {
    let config = AquariumConfig::default();
    let bounds = config.tank.bounds();
    let mut rng = StdRng::seed_from_u64(0xF15);
    let mut scene = Scene {
        world: World::new(),
        physics: WaterPhysics::new().with_walls(bounds),
        bus: EventBus::new(),
        fish: FishSystem::new(&config.tank, config.fish),
        food: FoodManager::new(config.food.clone(), bounds),
    };
    for _ in 0..fish_count {
        scene
            .fish
            .add_fish(&mut scene.world, &mut scene.physics, &scene.bus, &mut rng);
    }
    scene.food.drop_food(
        &mut scene.world,
        &mut scene.physics,
        &scene.bus,
        &mut rng,
        Vec3::ZERO,
        food_count,
    );
    scene
}

fn bench_resolve_feeding(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_feeding");
    for &(fish, food) in &[(10usize, 10u32), (50, 50), (200, 50)] {
        group.bench_function(format!("fish{fish}_food{food}"), |b| {
            b.iter_batched(
                || scene(fish, food),
                |mut s| {
                    let report = resolve_feeding(
                        &mut s.world,
                        &mut s.physics,
                        &s.fish,
                        &mut s.food,
                        &s.bus,
                        0.6,
                        0.0,
                    );
                    black_box(report)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance");
    for &fish in &[5usize, 50] {
        group.bench_function(format!("fish{fish}_60_frames"), |b| {
            b.iter_batched(
                || {
                    let mut aquarium = Aquarium::new(AquariumConfig::default().with_seed(7))
                        .expect("default config is valid");
                    aquarium.populate(fish);
                    aquarium.drop_food(None, Some(20));
                    aquarium
                },
                |mut aquarium| {
                    for _ in 0..60 {
                        aquarium.advance(1.0 / 60.0);
                    }
                    black_box(aquarium.food_count())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve_feeding, bench_advance);
criterion_main!(benches);
