//! Achievement table

use serde::{Deserialize, Serialize};

use super::progression::AchievementCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstFeed,
    RegularFeeder,
    GentleTouch,
    FishWhisperer,
    Spotless,
    Collector,
    BigSchool,
}

/// What has to be reached for an achievement to unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    FishFed(u32),
    FishPetted(u32),
    TanksCleaned(u32),
    FishBought(u32),
    /// Fish alive in the tank at once
    FishCount(usize),
}

impl Requirement {
    pub fn is_met(self, counters: &AchievementCounters, fish_count: usize) -> bool {
        match self {
            Requirement::FishFed(n) => counters.fish_fed >= n,
            Requirement::FishPetted(n) => counters.fish_petted >= n,
            Requirement::TanksCleaned(n) => counters.tanks_cleaned >= n,
            Requirement::FishBought(n) => counters.fish_bought >= n,
            Requirement::FishCount(n) => fish_count >= n,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: Requirement,
    /// Bonus coins granted on unlock
    pub reward: u64,
}

pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: AchievementId::FirstFeed,
        name: "First Meal",
        description: "Feed a fish for the first time",
        requirement: Requirement::FishFed(1),
        reward: 10,
    },
    Achievement {
        id: AchievementId::RegularFeeder,
        name: "Regular Feeder",
        description: "Feed fish 25 times",
        requirement: Requirement::FishFed(25),
        reward: 50,
    },
    Achievement {
        id: AchievementId::GentleTouch,
        name: "Gentle Touch",
        description: "Pet a fish for the first time",
        requirement: Requirement::FishPetted(1),
        reward: 10,
    },
    Achievement {
        id: AchievementId::FishWhisperer,
        name: "Fish Whisperer",
        description: "Pet fish 50 times",
        requirement: Requirement::FishPetted(50),
        reward: 75,
    },
    Achievement {
        id: AchievementId::Spotless,
        name: "Spotless",
        description: "Clean the tank 5 times",
        requirement: Requirement::TanksCleaned(5),
        reward: 40,
    },
    Achievement {
        id: AchievementId::Collector,
        name: "Collector",
        description: "Buy 3 fish",
        requirement: Requirement::FishBought(3),
        reward: 60,
    },
    Achievement {
        id: AchievementId::BigSchool,
        name: "Big School",
        description: "Keep 10 fish in the tank",
        requirement: Requirement::FishCount(10),
        reward: 100,
    },
];

impl AchievementId {
    pub fn definition(self) -> &'static Achievement {
        // Table order matches declaration order
        &ACHIEVEMENTS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    pub fn reward(self) -> u64 {
        self.definition().reward
    }
}
