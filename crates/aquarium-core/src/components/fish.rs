//! Fish component: stats, configuration and per-tick swim behavior.
//!
//! A [`Fish`] is pure simulation state. Its position lives in the physics
//! body referenced by [`Fish::body`]; the registry writes the steering
//! velocity into that body and copies the integrated position back each tick.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{BoundingBox, Vec3};
use super::personality::Personality;
use crate::physics::BodyHandle;

/// Hunger lost per minute
pub const HUNGER_DECAY_PER_MINUTE: f32 = 2.0;
/// Happiness lost per minute
pub const HAPPINESS_DECAY_PER_MINUTE: f32 = 0.5;
/// Health lost per minute while starving
pub const STARVATION_DAMAGE_PER_MINUTE: f32 = 0.5;
/// Hunger below this starts costing health and shows the hungry state
pub const HUNGRY_THRESHOLD: f32 = 20.0;
/// Health below this shows the sick state
pub const SICK_THRESHOLD: f32 = 30.0;

pub const FEED_HUNGER: f32 = 25.0;
pub const FEED_HAPPINESS: f32 = 10.0;
pub const PET_HAPPINESS: f32 = 15.0;

/// Pets further apart than this reset the streak
pub const PET_STREAK_WINDOW_MS: f64 = 5_000.0;
/// Speed never drops below this fraction of base, however sick
pub const MIN_HEALTH_SPEED_FACTOR: f32 = 0.3;

pub const STAT_MAX: f32 = 100.0;

/// Clamp a stat into `[0, 100]`; NaN collapses to 0
fn clamp_stat(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, STAT_MAX)
    }
}

/// Unique fish identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FishId(Uuid);

impl FishId {
    /// Random v4-layout id drawn from the simulation RNG, so seeded runs repeat
    pub fn random(rng: &mut impl Rng) -> Self {
        let bytes: [u8; 16] = rng.gen();
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for FishId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for FishId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Species tag; purely descriptive for the core, drives the look in the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Goldfish,
    Clownfish,
    Angelfish,
    NeonTetra,
    Betta,
    Guppy,
}

impl Species {
    pub fn all() -> &'static [Species] {
        &[
            Species::Goldfish,
            Species::Clownfish,
            Species::Angelfish,
            Species::NeonTetra,
            Species::Betta,
            Species::Guppy,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Goldfish => "goldfish",
            Species::Clownfish => "clownfish",
            Species::Angelfish => "angelfish",
            Species::NeonTetra => "neon tetra",
            Species::Betta => "betta",
            Species::Guppy => "guppy",
        }
    }
}

/// Health, happiness and hunger, each in `[0, 100]`.
///
/// Hunger counts *fullness*: 100 is sated, 0 is starving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFishStats")]
pub struct FishStats {
    health: f32,
    happiness: f32,
    hunger: f32,
}

/// Unchecked wire form; clamped on the way in
#[derive(Deserialize)]
struct RawFishStats {
    health: f32,
    happiness: f32,
    hunger: f32,
}

impl From<RawFishStats> for FishStats {
    fn from(raw: RawFishStats) -> Self {
        FishStats::new(raw.health, raw.happiness, raw.hunger)
    }
}

impl Default for FishStats {
    fn default() -> Self {
        Self {
            health: 100.0,
            happiness: 80.0,
            hunger: 80.0,
        }
    }
}

impl FishStats {
    pub fn new(health: f32, happiness: f32, hunger: f32) -> Self {
        Self {
            health: clamp_stat(health),
            happiness: clamp_stat(happiness),
            hunger: clamp_stat(hunger),
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn happiness(&self) -> f32 {
        self.happiness
    }

    pub fn hunger(&self) -> f32 {
        self.hunger
    }

    fn add_health(&mut self, delta: f32) {
        if delta.is_finite() {
            self.health = clamp_stat(self.health + delta);
        }
    }

    fn add_happiness(&mut self, delta: f32) {
        if delta.is_finite() {
            self.happiness = clamp_stat(self.happiness + delta);
        }
    }

    fn add_hunger(&mut self, delta: f32) {
        if delta.is_finite() {
            self.hunger = clamp_stat(self.hunger + delta);
        }
    }

    /// Apply `minutes` of time decay
    pub fn decay(&mut self, minutes: f32) {
        if !minutes.is_finite() || minutes <= 0.0 {
            return;
        }
        self.add_hunger(-HUNGER_DECAY_PER_MINUTE * minutes);
        if self.hunger < HUNGRY_THRESHOLD {
            self.add_health(-STARVATION_DAMAGE_PER_MINUTE * minutes);
        }
        self.add_happiness(-HAPPINESS_DECAY_PER_MINUTE * minutes);
    }
}

/// Immutable per-fish configuration fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FishConfig {
    pub species: Species,
    pub personality: Personality,
    /// Base swim speed in units per second
    pub speed: f32,
    /// Turn rate multiplier
    pub turn_speed: f32,
    /// Visual radius, also the picking radius
    pub size: f32,
    /// Radius within which food is noticed
    pub detection_radius: f32,
}

/// Which health cue the renderer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualHealth {
    Healthy,
    Hungry,
    Sick,
}

impl VisualHealth {
    pub fn from_stats(stats: &FishStats) -> Self {
        if stats.health < SICK_THRESHOLD {
            VisualHealth::Sick
        } else if stats.hunger < HUNGRY_THRESHOLD {
            VisualHealth::Hungry
        } else {
            VisualHealth::Healthy
        }
    }
}

/// Tank-wide parameters the steering step needs
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext {
    pub tank: BoundingBox,
    pub boundary_margin: f32,
    pub avoidance_blend: f32,
    pub arrival_distance: f32,
    pub chase_timeout: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FoodChase {
    target: Vec3,
    elapsed: f32,
}

/// Snapshot of a fish for UI and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishData {
    pub id: FishId,
    pub name: String,
    pub species: Species,
    pub personality: Personality,
    pub health: f32,
    pub happiness: f32,
    pub hunger: f32,
    pub visual: VisualHealth,
    pub selected: bool,
    pub chasing_food: bool,
    pub pet_streak: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub last_fed_ms: Option<f64>,
    pub last_petted_ms: Option<f64>,
}

/// A simulated fish
#[derive(Debug, Clone)]
pub struct Fish {
    id: FishId,
    name: String,
    config: FishConfig,
    stats: FishStats,
    visual: VisualHealth,
    body: BodyHandle,
    position: Vec3,
    velocity: Vec3,
    /// Steering direction; not renormalized after wall blending so repeated
    /// blends can swing it around
    direction: Vec3,
    facing: Vec3,
    chase: Option<FoodChase>,
    selected: bool,
    pet_streak: u32,
    last_fed_ms: Option<f64>,
    last_petted_ms: Option<f64>,
    last_update_ms: f64,
    destroyed: bool,
}

impl Fish {
    pub fn new(
        id: FishId,
        name: impl Into<String>,
        config: FishConfig,
        body: BodyHandle,
        position: Vec3,
        heading: Vec3,
    ) -> Self {
        let heading = match heading.normalize() {
            h if h.is_zero() => Vec3::X,
            h => h,
        };
        let stats = FishStats::default();
        Self {
            id,
            name: name.into(),
            config,
            visual: VisualHealth::from_stats(&stats),
            stats,
            body,
            position,
            velocity: Vec3::ZERO,
            direction: heading,
            facing: heading,
            chase: None,
            selected: false,
            pet_streak: 0,
            last_fed_ms: None,
            last_petted_ms: None,
            last_update_ms: 0.0,
            destroyed: false,
        }
    }

    pub fn with_stats(mut self, stats: FishStats) -> Self {
        self.stats = stats;
        self.visual = VisualHealth::from_stats(&stats);
        self
    }

    pub fn id(&self) -> FishId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FishConfig {
        &self.config
    }

    pub fn stats(&self) -> &FishStats {
        &self.stats
    }

    pub fn visual(&self) -> VisualHealth {
        self.visual
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Unit movement direction
    pub fn heading(&self) -> Vec3 {
        match self.direction.normalize() {
            h if h.is_zero() => Vec3::X,
            h => h,
        }
    }

    /// Visual forward axis, smoothed toward velocity
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Rotation about the vertical axis, radians, 0 facing +Z
    pub fn yaw(&self) -> f32 {
        self.facing.x.atan2(self.facing.z)
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn pet_streak(&self) -> u32 {
        self.pet_streak
    }

    pub fn last_update_ms(&self) -> f64 {
        self.last_update_ms
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Alive fish are not destroyed and have positive health
    pub fn is_alive(&self) -> bool {
        !self.destroyed && self.stats.health > 0.0
    }

    pub fn food_target(&self) -> Option<Vec3> {
        self.chase.map(|c| c.target)
    }

    pub fn is_chasing_food(&self) -> bool {
        !self.destroyed && self.chase.is_some()
    }

    /// Hand-feed: +25 hunger, +10 happiness. Returns false on a destroyed fish.
    pub fn feed(&mut self, now_ms: f64) -> bool {
        self.eat(FEED_HUNGER, now_ms)
    }

    /// Eat a food particle worth `nutrition` hunger points
    pub fn eat(&mut self, nutrition: f32, now_ms: f64) -> bool {
        if self.destroyed || !nutrition.is_finite() || nutrition <= 0.0 {
            return false;
        }
        self.stats.add_hunger(nutrition);
        self.stats.add_happiness(FEED_HAPPINESS);
        self.last_fed_ms = Some(now_ms);
        self.chase = None;
        self.visual = VisualHealth::from_stats(&self.stats);
        true
    }

    /// +15 happiness and extend the pet streak
    pub fn pet(&mut self, now_ms: f64) -> bool {
        if self.destroyed {
            return false;
        }
        self.stats.add_happiness(PET_HAPPINESS);
        self.pet_streak = match self.last_petted_ms {
            Some(last) if now_ms - last <= PET_STREAK_WINDOW_MS => self.pet_streak + 1,
            _ => 1,
        };
        self.last_petted_ms = Some(now_ms);
        true
    }

    pub fn set_selected(&mut self, selected: bool) {
        if !self.destroyed {
            self.selected = selected;
        }
    }

    /// Start chasing food at `target`
    pub fn set_food_target(&mut self, target: Vec3) {
        if self.destroyed || !target.is_finite() {
            return;
        }
        self.chase = Some(FoodChase {
            target,
            elapsed: 0.0,
        });
    }

    pub fn clear_food_target(&mut self) {
        self.chase = None;
    }

    /// Whether `food` lies within `radius` of this fish
    pub fn is_near_food(&self, food: Vec3, radius: f32) -> bool {
        !self.destroyed && self.position.distance_squared(&food) <= radius * radius
    }

    /// Whether `food` lies within this fish's detection radius
    pub fn can_detect(&self, food: Vec3) -> bool {
        self.is_near_food(food, self.config.detection_radius)
    }

    /// Current swim speed from base speed, health and personality
    pub fn swim_speed(&self) -> f32 {
        let health_factor = (self.stats.health / STAT_MAX).max(MIN_HEALTH_SPEED_FACTOR);
        self.config.speed * health_factor * self.config.personality.profile().speed_multiplier
    }

    /// Advance one tick: decay stats, refresh the health cue, steer.
    ///
    /// Returns the velocity to write into the physics body.
    pub fn update(
        &mut self,
        ctx: &SteeringContext,
        rng: &mut impl Rng,
        dt: f32,
        now_ms: f64,
    ) -> Vec3 {
        if self.destroyed {
            return Vec3::ZERO;
        }
        self.stats.decay(dt / 60.0);
        self.visual = VisualHealth::from_stats(&self.stats);
        self.last_update_ms = now_ms;
        self.steer(ctx, rng, dt)
    }

    fn steer(&mut self, ctx: &SteeringContext, rng: &mut impl Rng, dt: f32) -> Vec3 {
        let profile = self.config.personality.profile();

        if let Some(chase) = self.chase.as_mut() {
            chase.elapsed += dt;
            let to_target = chase.target - self.position;
            if to_target.length() <= ctx.arrival_distance || chase.elapsed >= ctx.chase_timeout {
                self.chase = None;
            } else {
                self.direction = to_target.normalize();
            }
        }

        if self.chase.is_none() && rng.gen::<f32>() < profile.direction_change_chance {
            let fresh = random_heading(rng);
            self.direction = self
                .config
                .personality
                .bias_heading(fresh, self.position, &ctx.tank)
                .normalize();
        }

        // Walls win over wandering and food
        let avoid = boundary_avoidance(self.position, &ctx.tank, ctx.boundary_margin);
        if !avoid.is_zero() {
            self.direction = self.direction.lerp(&avoid, ctx.avoidance_blend);
        }
        let mut heading = self.direction.normalize();
        if heading.is_zero() {
            heading = if avoid.is_zero() { Vec3::X } else { avoid.normalize() };
            self.direction = heading;
        }

        let velocity = heading * self.swim_speed();
        self.turn_toward(velocity, dt);
        velocity
    }

    fn turn_toward(&mut self, velocity: Vec3, dt: f32) {
        let dir = velocity.normalize();
        if dir.is_zero() {
            return;
        }
        let rate = self.config.turn_speed * self.config.personality.profile().turn_responsiveness;
        let t = (rate * dt).clamp(0.0, 1.0);
        let turned = self.facing.lerp(&dir, t).normalize();
        // Exactly opposite directions cancel out; snap instead
        self.facing = if turned.is_zero() { dir } else { turned };
    }

    /// Copy the integrated body state back after the physics step
    pub fn sync_from_body(&mut self, position: Vec3, velocity: Vec3) {
        if !self.destroyed {
            self.position = position;
            self.velocity = velocity;
        }
    }

    /// Mark destroyed; all later operations are no-ops
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.selected = false;
        self.chase = None;
    }

    /// Side-effect-free snapshot
    pub fn data(&self) -> FishData {
        FishData {
            id: self.id,
            name: self.name.clone(),
            species: self.config.species,
            personality: self.config.personality,
            health: self.stats.health,
            happiness: self.stats.happiness,
            hunger: self.stats.hunger,
            visual: self.visual,
            selected: self.selected,
            chasing_food: self.is_chasing_food(),
            pet_streak: self.pet_streak,
            position: self.position,
            velocity: self.velocity,
            yaw: self.yaw(),
            last_fed_ms: self.last_fed_ms,
            last_petted_ms: self.last_petted_ms,
        }
    }
}

/// Random heading, mostly horizontal
pub fn random_heading(rng: &mut impl Rng) -> Vec3 {
    let v = Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-1.0..=1.0) * 0.5,
        rng.gen_range(-1.0..=1.0),
    );
    let n = v.normalize();
    if n.is_zero() {
        Vec3::X
    } else {
        n
    }
}

/// Push away from walls, per axis, proportional to how far inside the margin the point is
pub fn boundary_avoidance(position: Vec3, tank: &BoundingBox, margin: f32) -> Vec3 {
    if margin <= 0.0 {
        return Vec3::ZERO;
    }
    let axis = |pos: f32, lo: f32, hi: f32| {
        if pos < lo + margin {
            (lo + margin - pos) / margin
        } else if pos > hi - margin {
            -(pos - (hi - margin)) / margin
        } else {
            0.0
        }
    };
    Vec3::new(
        axis(position.x, tank.min.x, tank.max.x),
        axis(position.y, tank.min.y, tank.max.y),
        axis(position.z, tank.min.z, tank.max.z),
    )
}
