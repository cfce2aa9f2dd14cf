//! Random fish configuration and spawn placement

use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{BoundingBox, FishConfig, Personality, Species, Vec3};
use crate::config::FishTuning;

/// Draw species, personality and tuning values within the configured ranges
pub fn random_fish_config(tuning: &FishTuning, rng: &mut impl Rng) -> FishConfig {
    let species = Species::all()
        .choose(rng)
        .copied()
        .unwrap_or(Species::Goldfish);
    let personality = Personality::all()
        .choose(rng)
        .copied()
        .unwrap_or(Personality::Curious);

    FishConfig {
        species,
        personality,
        speed: tuning.speed.sample(rng),
        turn_speed: tuning.turn_speed.sample(rng),
        size: tuning.size.sample(rng),
        detection_radius: tuning.detection_radius,
    }
}

/// Random point inside the tank, kept `margin` away from the walls
pub fn random_spawn_point(tank: &BoundingBox, margin: f32, rng: &mut impl Rng) -> Vec3 {
    let inner = tank.inset(margin);
    let mut sample = |lo: f32, hi: f32| if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    Vec3::new(
        sample(inner.min.x, inner.max.x),
        sample(inner.min.y, inner.max.y),
        sample(inner.min.z, inner.max.z),
    )
}
