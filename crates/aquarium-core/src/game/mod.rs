//! Economy and progression.
//!
//! [`GameLogic`] is purely event driven. It listens for fed, petted, cleaned,
//! purchase, death and head-count events, pays out coins, tracks achievement
//! counters and levels, and publishes the derived events the HUD renders.

mod achievements;
mod progression;

pub use achievements::*;
pub use progression::*;

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::EconomyConfig;
use crate::events::{
    CoinSource, Event, EventBus, EventKind, GameEvent, HandlerError, HandlerResult, MessageLevel,
    SubscriptionId,
};

/// Event kinds the economy reacts to
pub const HANDLED_EVENTS: &[EventKind] = &[
    EventKind::FishFed,
    EventKind::FishPetted,
    EventKind::CleanTank,
    EventKind::AddFish,
    EventKind::FishDied,
    EventKind::FishCountChanged,
];

/// Temperature drift per second at full swing, degrees
const TEMPERATURE_DRIFT_PER_SECOND: f32 = 0.05;

pub struct GameLogic {
    config: EconomyConfig,
    state: ProgressionState,
    rng: StdRng,
    /// Seconds since the last `tankStatsUpdated`
    stats_timer: f32,
}

impl GameLogic {
    pub fn new(config: EconomyConfig, rng: StdRng) -> Self {
        let state = ProgressionState::new(config.starting_coins, config.base_temperature);
        Self {
            config,
            state,
            rng,
            stats_timer: 0.0,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Subscribe a shared `GameLogic` to every event in [`HANDLED_EVENTS`].
    ///
    /// Returns the subscriptions so the caller can detach later.
    pub fn attach(
        logic: &Rc<RefCell<GameLogic>>,
        bus: &EventBus,
    ) -> Vec<(EventKind, SubscriptionId)> {
        HANDLED_EVENTS
            .iter()
            .map(|&kind| {
                let logic = Rc::clone(logic);
                let id = bus.subscribe(kind, move |event, bus| {
                    let mut logic = logic.try_borrow_mut().map_err(|_| HandlerError::Busy)?;
                    logic.handle(event, bus)
                });
                (kind, id)
            })
            .collect()
    }

    /// React to one event
    pub fn handle(&mut self, event: &Event, bus: &EventBus) -> HandlerResult {
        match &event.payload {
            GameEvent::FishFed { .. } => {
                self.state.counters.fish_fed += 1;
                let reward = 2 + self.rng.gen_range(0..=3);
                self.award(reward, CoinSource::Feeding, bus);
            }
            GameEvent::FishPetted { .. } => {
                self.state.counters.fish_petted += 1;
                let reward = 1 + self.rng.gen_range(0..=2);
                self.award(reward, CoinSource::Petting, bus);
            }
            GameEvent::CleanTank => self.clean_tank(bus),
            GameEvent::AddFish => self.buy_fish(bus),
            GameEvent::FishDied { name, .. } => {
                self.state.counters.fish_lost += 1;
                bus.publish(GameEvent::message(
                    format!("{name} has died"),
                    MessageLevel::Warning,
                ));
            }
            GameEvent::FishCountChanged { count } => {
                self.state.fish_count = *count;
            }
            other => return Err(HandlerError::Unhandled(other.kind())),
        }
        self.check_achievements(bus);
        Ok(())
    }

    fn clean_tank(&mut self, bus: &EventBus) {
        if self.state.tank.cleanliness >= self.config.clean_threshold {
            bus.publish(GameEvent::message("The tank is already clean", MessageLevel::Info));
            return;
        }
        self.state.tank.cleanliness = 100.0;
        self.state.counters.tanks_cleaned += 1;
        bus.publish(GameEvent::message("Tank cleaned!", MessageLevel::Success));
        let reward = 10 + self.rng.gen_range(0..=5);
        self.award(reward, CoinSource::Cleaning, bus);
        self.publish_tank_stats(bus);
    }

    fn buy_fish(&mut self, bus: &EventBus) {
        let price = self.config.fish_price;
        if !self.state.spend(price) {
            bus.publish(GameEvent::message(
                format!("A new fish costs {price} coins"),
                MessageLevel::Warning,
            ));
            return;
        }
        self.state.counters.fish_bought += 1;
        debug!("fish purchased for {price} coins, {} left", self.state.coins);
        // Immediate so the spawn lands in the same engine step
        bus.publish_immediate(GameEvent::FishPurchased);
    }

    /// Pay out coins, then check for a level-up once
    fn award(&mut self, amount: u64, source: CoinSource, bus: &EventBus) {
        self.state.credit(amount);
        bus.publish(GameEvent::CoinsEarned {
            amount,
            balance: self.state.coins,
            source,
        });

        if self.state.total_earned >= self.state.next_level_at() {
            self.state.level += 1;
            let bonus = u64::from(self.state.level) * LEVEL_BONUS_PER_LEVEL;
            self.state.credit(bonus);
            info!("reached level {} (+{bonus} coins)", self.state.level);
            bus.publish(GameEvent::LevelUp {
                level: self.state.level,
                bonus,
            });
            bus.publish(GameEvent::CoinsEarned {
                amount: bonus,
                balance: self.state.coins,
                source: CoinSource::LevelUp,
            });
        }
    }

    fn check_achievements(&mut self, bus: &EventBus) {
        for achievement in ACHIEVEMENTS {
            if self.state.is_unlocked(achievement.id)
                || !achievement
                    .requirement
                    .is_met(&self.state.counters, self.state.fish_count)
            {
                continue;
            }
            self.state.unlocked.push(achievement.id);
            info!("achievement unlocked: {}", achievement.name);
            bus.publish(GameEvent::AchievementUnlocked {
                id: achievement.id,
                name: achievement.name.to_string(),
                reward: achievement.reward,
            });
            self.award(achievement.reward, CoinSource::Achievement, bus);
        }
    }

    /// Tank upkeep: cleanliness decay, temperature drift and periodic stats
    pub fn update(&mut self, dt: f32, bus: &EventBus) {
        let tank = &mut self.state.tank;
        tank.cleanliness =
            (tank.cleanliness - self.config.cleanliness_decay_per_minute * dt / 60.0).max(0.0);

        let base = self.config.base_temperature;
        let variance = self.config.temperature_variance;
        let drift = self.rng.gen_range(-1.0f32..=1.0) * TEMPERATURE_DRIFT_PER_SECOND * dt;
        tank.temperature = (tank.temperature + drift).clamp(base - variance, base + variance);

        self.stats_timer += dt;
        if self.stats_timer >= self.config.stats_interval {
            self.stats_timer = 0.0;
            self.publish_tank_stats(bus);
        }
    }

    fn publish_tank_stats(&self, bus: &EventBus) {
        bus.publish(GameEvent::TankStatsUpdated {
            cleanliness: self.state.tank.cleanliness,
            temperature: self.state.tank.temperature,
        });
    }
}

impl std::fmt::Debug for GameLogic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogic")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
