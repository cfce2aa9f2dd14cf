//! Event payloads exchanged over the [`EventBus`](super::EventBus).
//!
//! Every event name maps to exactly one [`GameEvent`] variant, so a
//! subscriber for `fishFed` always receives a `FishFed` payload and malformed
//! payloads are impossible to construct. Variants serialize as
//! `{"type": "<eventName>", ...}` for hosts that forward them to a UI.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::components::{FishId, Species, Vec3};
use crate::game::AchievementId;

/// Event name tag, used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    // User intents
    FeedFish,
    PetFish,
    CleanTank,
    AddFish,
    DropFood,
    // Outward notifications
    Message,
    CoinsEarned,
    LevelUp,
    AchievementUnlocked,
    FishSelected,
    FishDeselected,
    FishCountChanged,
    TankStatsUpdated,
    FishFed,
    FishPetted,
    FishDied,
    FoodDropped,
    // Internal
    FishPurchased,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::FeedFish => "feedFish",
            EventKind::PetFish => "petFish",
            EventKind::CleanTank => "cleanTank",
            EventKind::AddFish => "addFish",
            EventKind::DropFood => "dropFood",
            EventKind::Message => "message",
            EventKind::CoinsEarned => "coinsEarned",
            EventKind::LevelUp => "levelUp",
            EventKind::AchievementUnlocked => "achievementUnlocked",
            EventKind::FishSelected => "fishSelected",
            EventKind::FishDeselected => "fishDeselected",
            EventKind::FishCountChanged => "fishCountChanged",
            EventKind::TankStatsUpdated => "tankStatsUpdated",
            EventKind::FishFed => "fishFed",
            EventKind::FishPetted => "fishPetted",
            EventKind::FishDied => "fishDied",
            EventKind::FoodDropped => "foodDropped",
            EventKind::FishPurchased => "fishPurchased",
        }
    }

    /// Intents the host may publish on behalf of the player
    pub fn is_intent(self) -> bool {
        matches!(
            self,
            EventKind::FeedFish
                | EventKind::PetFish
                | EventKind::CleanTank
                | EventKind::AddFish
                | EventKind::DropFood
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a `message` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

/// How a fish got fed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    /// Hand-fed through a feed intent
    Hand,
    /// Ate a food particle
    Particle,
}

/// Why coins were awarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoinSource {
    Feeding,
    Petting,
    Cleaning,
    Achievement,
    LevelUp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    FeedFish {
        target: Option<FishId>,
    },
    PetFish {
        target: Option<FishId>,
    },
    CleanTank,
    AddFish,
    DropFood {
        position: Option<Vec3>,
        count: Option<u32>,
    },
    Message {
        text: String,
        level: MessageLevel,
    },
    CoinsEarned {
        amount: u64,
        balance: u64,
        source: CoinSource,
    },
    LevelUp {
        level: u32,
        bonus: u64,
    },
    AchievementUnlocked {
        id: AchievementId,
        name: String,
        reward: u64,
    },
    FishSelected {
        id: FishId,
    },
    FishDeselected {
        id: FishId,
    },
    FishCountChanged {
        count: usize,
    },
    TankStatsUpdated {
        cleanliness: f32,
        temperature: f32,
    },
    FishFed {
        id: FishId,
        nutrition: f32,
        source: FeedSource,
    },
    FishPetted {
        id: FishId,
        streak: u32,
    },
    FishDied {
        id: FishId,
        name: String,
        species: Species,
    },
    FoodDropped {
        position: Vec3,
        count: u32,
        /// Handles of the particles created by this drop
        #[serde(skip)]
        particles: Vec<Entity>,
    },
    FishPurchased,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::FeedFish { .. } => EventKind::FeedFish,
            GameEvent::PetFish { .. } => EventKind::PetFish,
            GameEvent::CleanTank => EventKind::CleanTank,
            GameEvent::AddFish => EventKind::AddFish,
            GameEvent::DropFood { .. } => EventKind::DropFood,
            GameEvent::Message { .. } => EventKind::Message,
            GameEvent::CoinsEarned { .. } => EventKind::CoinsEarned,
            GameEvent::LevelUp { .. } => EventKind::LevelUp,
            GameEvent::AchievementUnlocked { .. } => EventKind::AchievementUnlocked,
            GameEvent::FishSelected { .. } => EventKind::FishSelected,
            GameEvent::FishDeselected { .. } => EventKind::FishDeselected,
            GameEvent::FishCountChanged { .. } => EventKind::FishCountChanged,
            GameEvent::TankStatsUpdated { .. } => EventKind::TankStatsUpdated,
            GameEvent::FishFed { .. } => EventKind::FishFed,
            GameEvent::FishPetted { .. } => EventKind::FishPetted,
            GameEvent::FishDied { .. } => EventKind::FishDied,
            GameEvent::FoodDropped { .. } => EventKind::FoodDropped,
            GameEvent::FishPurchased => EventKind::FishPurchased,
        }
    }

    pub fn message(text: impl Into<String>, level: MessageLevel) -> Self {
        GameEvent::Message {
            text: text.into(),
            level,
        }
    }
}

/// A published event with its bus timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(flatten)]
    pub payload: GameEvent,
    /// Simulation time at publish, milliseconds
    pub timestamp_ms: f64,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
