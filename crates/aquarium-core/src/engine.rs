//! Simulation engine - main entry point for running the aquarium

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hecs::World;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::{Camera, ScreenPoint, Viewport};
use crate::components::{Fish, FishConfig, FishData, FishId, FoodData, FoodParticle, Vec3};
use crate::config::{AquariumConfig, ConfigError};
use crate::events::{EventBus, EventKind, GameEvent, SubscriptionId};
use crate::game::{GameLogic, ProgressionState};
use crate::physics::{PhysicsStepper, WaterPhysics};
use crate::systems::{resolve_feeding, FishSystem, FoodManager};

/// Events the engine itself acts on
const ENGINE_INTENTS: &[EventKind] = &[
    EventKind::FeedFish,
    EventKind::PetFish,
    EventKind::DropFood,
    EventKind::FishPurchased,
];

/// Main simulation engine.
///
/// Owns the world, the physics stepper, the event bus and every system.
/// Hosts drive it with [`advance`](Self::advance) and talk to it through
/// intents, either the helper methods or [`submit`](Self::submit).
pub struct Aquarium {
    /// ECS world holding fish and food entities
    world: World,
    physics: Box<dyn PhysicsStepper>,
    bus: EventBus,
    fish: FishSystem,
    food: FoodManager,
    game: Rc<RefCell<GameLogic>>,
    /// Intents picked up from the bus, handled during `advance`
    inbox: Rc<RefCell<VecDeque<GameEvent>>>,
    subscriptions: Vec<(EventKind, SubscriptionId)>,
    rng: StdRng,
    config: AquariumConfig,
    /// Simulation time in milliseconds since start
    elapsed_ms: f64,
    time_scale: f32,
    stopped: bool,
}

impl Aquarium {
    /// Create an empty tank with the built-in water physics
    pub fn new(config: AquariumConfig) -> Result<Self, ConfigError> {
        let physics = WaterPhysics::new().with_walls(config.tank.bounds());
        Self::with_physics(config, Box::new(physics))
    }

    /// Create an empty tank driven by a custom physics stepper
    pub fn with_physics(
        config: AquariumConfig,
        physics: Box<dyn PhysicsStepper>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let game_rng = StdRng::seed_from_u64(rng.gen());

        let bus = EventBus::new();
        let game = Rc::new(RefCell::new(GameLogic::new(config.economy.clone(), game_rng)));
        let mut subscriptions = GameLogic::attach(&game, &bus);

        let inbox = Rc::new(RefCell::new(VecDeque::new()));
        for &kind in ENGINE_INTENTS {
            let inbox = Rc::clone(&inbox);
            let id = bus.subscribe(kind, move |event, _| {
                inbox.borrow_mut().push_back(event.payload.clone());
                Ok(())
            });
            subscriptions.push((kind, id));
        }

        info!(
            "aquarium ready: {}x{}x{} tank, seed {:?}",
            config.tank.width, config.tank.height, config.tank.depth, config.seed
        );

        Ok(Self {
            world: World::new(),
            physics,
            fish: FishSystem::new(&config.tank, config.fish.clone()),
            food: FoodManager::new(config.food.clone(), config.tank.bounds()),
            bus,
            game,
            inbox,
            subscriptions,
            rng,
            config,
            elapsed_ms: 0.0,
            time_scale: 1.0,
            stopped: false,
        })
    }

    /// Add `count` random fish
    pub fn populate(&mut self, count: usize) -> Vec<FishId> {
        (0..count).filter_map(|_| self.add_random_fish()).collect()
    }

    /// Add the configured starting school of `initial_fish` random fish
    pub fn populate_initial(&mut self) -> Vec<FishId> {
        self.populate(self.config.initial_fish as usize)
    }

    fn add_random_fish(&mut self) -> Option<FishId> {
        if self.stopped {
            return None;
        }
        let entity = self.fish.add_fish(
            &mut self.world,
            &mut *self.physics,
            &self.bus,
            &mut self.rng,
        );
        self.world.get::<&Fish>(entity).ok().map(|f| f.id())
    }

    /// Add a fish with a fixed configuration
    pub fn spawn_fish(
        &mut self,
        name: &str,
        config: FishConfig,
        position: Vec3,
    ) -> Option<FishId> {
        if self.stopped {
            return None;
        }
        let entity = self.fish.spawn_fish(
            &mut self.world,
            &mut *self.physics,
            &self.bus,
            &mut self.rng,
            name,
            config,
            position,
        );
        self.world.get::<&Fish>(entity).ok().map(|f| f.id())
    }

    /// Advance the simulation by `dt` seconds of real time.
    ///
    /// Order: bus tick, intents, fish steering, physics, sync, food,
    /// feeding, dead fish removal, tank upkeep.
    pub fn advance(&mut self, dt: f32) {
        if self.stopped {
            return;
        }
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt * self.time_scale
        } else {
            warn!("ignoring invalid frame time {dt}");
            0.0
        };

        self.elapsed_ms += f64::from(dt) * 1000.0;
        let now = self.elapsed_ms;
        self.bus.set_time(now);

        self.bus.tick();
        self.process_intents(now);

        self.fish
            .update(&mut self.world, &mut *self.physics, &mut self.rng, dt, now);
        self.physics.step(dt);
        self.fish
            .sync_from_physics(&mut self.world, &*self.physics);
        self.food
            .update(&mut self.world, &mut *self.physics, dt);

        resolve_feeding(
            &mut self.world,
            &mut *self.physics,
            &self.fish,
            &mut self.food,
            &self.bus,
            self.config.fish.eat_distance,
            now,
        );
        self.fish
            .remove_dead(&mut self.world, &mut *self.physics, &self.bus);

        match self.game.try_borrow_mut() {
            Ok(mut game) => game.update(dt, &self.bus),
            Err(_) => warn!("game logic busy; skipping tank upkeep"),
        }
    }

    fn process_intents(&mut self, now: f64) {
        loop {
            // Release the inbox before handling; handlers may push more
            let next = self.inbox.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            match event {
                GameEvent::FeedFish { target } => {
                    self.fish.feed(&mut self.world, &self.bus, target, now);
                }
                GameEvent::PetFish { target } => {
                    self.fish.pet(&mut self.world, &self.bus, target, now);
                }
                GameEvent::DropFood { position, count } => {
                    let position = position.unwrap_or_else(|| self.default_drop_point());
                    let count = count.unwrap_or(self.config.food.default_drop_count);
                    self.food.drop_food(
                        &mut self.world,
                        &mut *self.physics,
                        &self.bus,
                        &mut self.rng,
                        position,
                        count,
                    );
                }
                GameEvent::FishPurchased => {
                    self.add_random_fish();
                }
                other => debug!("engine ignoring {}", other.kind()),
            }
        }
    }

    /// Just under the surface, somewhere near the middle
    fn default_drop_point(&mut self) -> Vec3 {
        let tank = self.config.tank.bounds();
        let center = tank.center();
        let spread = tank.width() * 0.25;
        Vec3::new(
            center.x + self.rng.gen_range(-spread..=spread),
            tank.max.y - 0.5,
            center.z,
        )
    }

    /// Queue a player intent. Returns false for events that are not intents.
    pub fn submit(&self, event: GameEvent) -> bool {
        if !event.kind().is_intent() {
            warn!("refusing to submit non-intent event {}", event.kind());
            return false;
        }
        self.bus.publish(event);
        true
    }

    /// Feed `target`, or the selected fish
    pub fn feed_fish(&self, target: Option<FishId>) {
        self.bus.publish(GameEvent::FeedFish { target });
    }

    /// Pet `target`, or the selected fish
    pub fn pet_fish(&self, target: Option<FishId>) {
        self.bus.publish(GameEvent::PetFish { target });
    }

    pub fn drop_food(&self, position: Option<Vec3>, count: Option<u32>) {
        self.bus.publish(GameEvent::DropFood { position, count });
    }

    pub fn clean_tank(&self) {
        self.bus.publish(GameEvent::CleanTank);
    }

    /// Buy a fish if the balance allows
    pub fn buy_fish(&self) {
        self.bus.publish(GameEvent::AddFish);
    }

    /// Select the fish under a screen point
    pub fn select_at_screen(
        &mut self,
        camera: &Camera,
        point: ScreenPoint,
        viewport: Viewport,
    ) -> Option<FishId> {
        if self.stopped {
            return None;
        }
        self.fish
            .select_at_screen(&self.world, &self.bus, camera, point, viewport)
    }

    pub fn selected(&self) -> Option<FishId> {
        self.fish.selected()
    }

    /// Snapshot of coins, level, achievements and tank condition
    pub fn progression(&self) -> ProgressionState {
        self.game.borrow().state().clone()
    }

    /// Snapshots of every fish in registry order
    pub fn fish_data(&self) -> Vec<FishData> {
        self.fish.data(&self.world)
    }

    pub fn fish(&self, id: FishId) -> Option<FishData> {
        self.fish.fish(&self.world, id)
    }

    pub fn fish_count(&self) -> usize {
        self.fish.len()
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    /// Live food particles, oldest first
    pub fn food_data(&self) -> Vec<FoodData> {
        self.food
            .iter()
            .filter_map(|e| {
                let food = self.world.get::<&FoodParticle>(e).ok()?;
                Some(food.snapshot())
            })
            .collect()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &AquariumConfig {
        &self.config
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Simulation time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        !self.stopped
    }

    /// Tear everything down. Later calls to `advance` do nothing.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        for (kind, id) in self.subscriptions.drain(..) {
            self.bus.unsubscribe(kind, id);
        }
        self.fish.clear(&mut self.world, &mut *self.physics);
        self.food.clear(&mut self.world, &mut *self.physics);
        self.physics.clear();
        self.bus.clear();
        self.inbox.borrow_mut().clear();
        info!("aquarium shut down after {:.1}s", self.elapsed_ms / 1000.0);
    }
}

impl std::fmt::Debug for Aquarium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aquarium")
            .field("fish", &self.fish.len())
            .field("food", &self.food.len())
            .field("elapsed_ms", &self.elapsed_ms)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Personality, Species};

    fn engine() -> Aquarium {
        Aquarium::new(AquariumConfig::default().with_seed(42)).unwrap()
    }

    fn guppy() -> FishConfig {
        FishConfig {
            species: Species::Guppy,
            personality: Personality::Wise,
            speed: 1.0,
            turn_speed: 1.0,
            size: 0.4,
            detection_radius: 5.0,
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine();
        assert_eq!(engine.fish_count(), 0);
        assert_eq!(engine.elapsed_ms(), 0.0);
        assert_eq!(engine.progression().coins, 100);
        assert!(engine.is_running());
    }

    #[test]
    fn test_engine_populate_initial() {
        let mut config = AquariumConfig::default().with_seed(3);
        config.initial_fish = 3;
        let mut engine = Aquarium::new(config).unwrap();
        assert_eq!(engine.populate_initial().len(), 3);
        assert_eq!(engine.fish_count(), 3);
    }

    #[test]
    fn test_engine_populate() {
        let mut engine = engine();
        let ids = engine.populate(5);
        assert_eq!(ids.len(), 5);
        assert_eq!(engine.fish_count(), 5);

        engine.advance(0.0);
        assert_eq!(engine.progression().fish_count, 5);
    }

    #[test]
    fn test_engine_update() {
        let mut engine = engine();
        engine.populate(3);

        // One simulated minute
        for _ in 0..3600 {
            engine.advance(1.0 / 60.0);
        }

        assert!((engine.elapsed_ms() - 60_000.0).abs() < 1.0);
        let tank = engine.config().tank.bounds();
        for fish in engine.fish_data() {
            assert!(tank.contains(&fish.position));
            assert!((fish.hunger - 78.0).abs() < 0.05);
        }
    }

    #[test]
    fn test_time_scale() {
        let mut engine = engine();
        engine.set_time_scale(2.0);
        engine.advance(1.0);
        assert!((engine.elapsed_ms() - 2_000.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_frame_time_is_ignored() {
        let mut engine = engine();
        engine.advance(-1.0);
        engine.advance(f32::NAN);
        assert_eq!(engine.elapsed_ms(), 0.0);
    }

    #[test]
    fn feeding_intent_pays_coins() {
        let mut engine = engine();
        let id = engine.spawn_fish("Pip", guppy(), Vec3::ZERO).unwrap();
        engine.feed_fish(Some(id));
        engine.advance(0.0);

        let state = engine.progression();
        assert_eq!(state.counters.fish_fed, 1);
        // Feeding payout plus the first_feed bonus
        assert!(state.total_earned >= 12 && state.total_earned <= 15);
        assert!(engine.fish(id).unwrap().last_fed_ms.is_some());
    }

    #[test]
    fn buying_fish_spawns_one() {
        let mut engine = engine();
        engine.buy_fish();
        engine.advance(0.0);
        assert_eq!(engine.fish_count(), 1);
        assert_eq!(engine.progression().coins, 50);

        engine.buy_fish();
        engine.buy_fish();
        engine.advance(0.0);
        assert_eq!(engine.fish_count(), 2);
        assert_eq!(engine.progression().coins, 0);
    }

    #[test]
    fn dropped_food_gets_eaten() {
        let mut config = AquariumConfig::default().with_seed(3);
        config.food.jitter = 0.0;
        let mut engine = Aquarium::new(config).unwrap();
        let id = engine.spawn_fish("Pip", guppy(), Vec3::ZERO).unwrap();

        engine.drop_food(Some(Vec3::ZERO), Some(1));
        engine.advance(1.0 / 60.0);

        assert_eq!(engine.food_count(), 0);
        assert_eq!(engine.progression().counters.fish_fed, 1);
        assert!(engine.fish(id).unwrap().last_fed_ms.is_some());
    }

    #[test]
    fn submit_accepts_only_intents() {
        let engine = engine();
        assert!(engine.submit(GameEvent::CleanTank));
        assert!(!engine.submit(GameEvent::FishPurchased));
        assert_eq!(engine.bus().pending(), 1);
    }

    #[test]
    fn shutdown_stops_everything() {
        let mut engine = engine();
        engine.populate(2);
        engine.drop_food(None, None);
        engine.advance(0.1);
        assert_eq!(engine.food_count(), 5);

        engine.shutdown();
        assert!(!engine.is_running());
        assert_eq!(engine.fish_count(), 0);
        assert_eq!(engine.food_count(), 0);

        let before = engine.elapsed_ms();
        engine.advance(1.0);
        assert_eq!(engine.elapsed_ms(), before);
        assert!(engine.populate(1).is_empty());
    }
}
