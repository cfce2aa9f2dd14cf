//! Simulation configuration: tank geometry, fish tuning, food and economy.
//!
//! Every section has sensible defaults, so a config file only needs the keys
//! it overrides:
//!
//! ```json
//! { "seed": 7, "tank": { "width": 30.0 }, "food": { "capacity": 20 } }
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::BoundingBox;

/// Errors raised while loading or validating an [`AquariumConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Inclusive `[min, max]` range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::Invalid {
                field,
                reason: format!("expected finite min <= max, got [{}, {}]", self.min, self.max),
            });
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AquariumConfig {
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Fish spawned by `Aquarium::populate_initial`
    pub initial_fish: u32,
    pub tank: TankConfig,
    pub fish: FishTuning,
    pub food: FoodConfig,
    pub economy: EconomyConfig,
}

impl Default for AquariumConfig {
    fn default() -> Self {
        Self {
            seed: None,
            initial_fish: 5,
            tank: TankConfig::default(),
            fish: FishTuning::default(),
            food: FoodConfig::default(),
            economy: EconomyConfig::default(),
        }
    }
}

impl AquariumConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                })
            }
        };

        let non_negative = |field: &'static str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be zero or more, got {value}"),
                })
            }
        };

        positive("tank.width", self.tank.width)?;
        positive("tank.height", self.tank.height)?;
        positive("tank.depth", self.tank.depth)?;
        if !(0.0..=1.0).contains(&self.tank.avoidance_blend) {
            return Err(ConfigError::Invalid {
                field: "tank.avoidance_blend",
                reason: format!("must be in [0, 1], got {}", self.tank.avoidance_blend),
            });
        }

        self.fish.speed.check("fish.speed")?;
        self.fish.turn_speed.check("fish.turn_speed")?;
        self.fish.size.check("fish.size")?;
        positive("fish.detection_radius", self.fish.detection_radius)?;
        positive("fish.eat_distance", self.fish.eat_distance)?;
        if self.fish.eat_distance >= self.fish.detection_radius {
            return Err(ConfigError::Invalid {
                field: "fish.eat_distance",
                reason: "must be smaller than fish.detection_radius".into(),
            });
        }

        if self.food.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "food.capacity",
                reason: "must be at least 1".into(),
            });
        }
        self.food.nutrition.check("food.nutrition")?;
        if self.food.nutrition.min <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "food.nutrition",
                reason: "nutrition must be positive".into(),
            });
        }
        positive("food.max_age_ms", self.food.max_age_ms)?;
        positive("food.dissolve_seconds", self.food.dissolve_seconds)?;
        non_negative("food.jitter", self.food.jitter)?;
        non_negative("food.settle_tolerance", self.food.settle_tolerance)?;

        if self.economy.temperature_variance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "economy.temperature_variance",
                reason: "must not be negative".into(),
            });
        }
        positive("economy.stats_interval", self.economy.stats_interval)?;
        Ok(())
    }
}

/// Tank geometry and wall avoidance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Distance from a wall at which fish start steering away
    pub boundary_margin: f32,
    /// Interpolation factor toward the avoidance direction
    pub avoidance_blend: f32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 12.0,
            depth: 10.0,
            boundary_margin: 2.0,
            avoidance_blend: 0.3,
        }
    }
}

impl TankConfig {
    /// Tank volume, centered on the origin
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::centered(self.width, self.height, self.depth)
    }
}

/// Ranges and radii used when creating and steering fish
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FishTuning {
    pub speed: Span,
    pub turn_speed: Span,
    pub size: Span,
    /// Radius within which a fish notices food and starts chasing it
    pub detection_radius: f32,
    /// Distance at which a fish eats a particle
    pub eat_distance: f32,
    /// A chase ends once the fish is this close to the target position
    pub arrival_distance: f32,
    /// Seconds before an unfinished chase is abandoned
    pub chase_timeout: f32,
}

impl Default for FishTuning {
    fn default() -> Self {
        Self {
            speed: Span::new(0.8, 1.6),
            turn_speed: Span::new(1.0, 2.5),
            size: Span::new(0.3, 0.7),
            detection_radius: 5.0,
            eat_distance: 0.6,
            arrival_distance: 0.3,
            chase_timeout: 8.0,
        }
    }
}

/// Food particle lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Maximum live particles; older ones are evicted first
    pub capacity: usize,
    pub default_drop_count: u32,
    pub nutrition: Span,
    /// Absolute lifetime, settled or not
    pub max_age_ms: f32,
    /// Seconds a settled particle takes to dissolve completely
    pub dissolve_seconds: f32,
    /// Per-axis random offset around the drop point
    pub jitter: f32,
    /// Height above the floor that counts as settled
    pub settle_tolerance: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            default_drop_count: 5,
            nutrition: Span::new(10.0, 20.0),
            max_age_ms: 30_000.0,
            dissolve_seconds: 5.0,
            jitter: 0.3,
            settle_tolerance: 0.05,
        }
    }
}

/// Coin economy and tank upkeep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_coins: u64,
    pub fish_price: u64,
    /// Cleaning above this cleanliness earns nothing
    pub clean_threshold: f32,
    pub cleanliness_decay_per_minute: f32,
    pub base_temperature: f32,
    /// Temperature stays within `base ± variance`
    pub temperature_variance: f32,
    /// Seconds between `tankStatsUpdated` events
    pub stats_interval: f32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_coins: 100,
            fish_price: 50,
            clean_threshold: 95.0,
            cleanliness_decay_per_minute: 0.5,
            base_temperature: 25.0,
            temperature_variance: 1.5,
            stats_interval: 1.0,
        }
    }
}
