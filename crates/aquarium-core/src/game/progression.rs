//! Player progression state: coins, level, counters and tank condition.

use serde::{Deserialize, Serialize};

use super::achievements::AchievementId;

/// Coins of cumulative earnings needed per level
pub const COINS_PER_LEVEL: u64 = 100;
/// Level-up bonus per level reached
pub const LEVEL_BONUS_PER_LEVEL: u64 = 25;

/// Per-category action counts checked by the achievement table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementCounters {
    pub fish_fed: u32,
    pub fish_petted: u32,
    pub tanks_cleaned: u32,
    pub fish_bought: u32,
    pub fish_lost: u32,
}

/// Water condition shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankStats {
    /// 0 (filthy) to 100 (spotless)
    pub cleanliness: f32,
    /// Degrees Celsius
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Spendable balance
    pub coins: u64,
    /// Everything ever earned; never decreases
    pub total_earned: u64,
    /// Starts at 1; never decreases
    pub level: u32,
    pub counters: AchievementCounters,
    /// Achievements in unlock order
    pub unlocked: Vec<AchievementId>,
    /// Last reported number of live fish
    pub fish_count: usize,
    pub tank: TankStats,
}

impl ProgressionState {
    pub fn new(starting_coins: u64, temperature: f32) -> Self {
        Self {
            coins: starting_coins,
            total_earned: 0,
            level: 1,
            counters: AchievementCounters::default(),
            unlocked: Vec::new(),
            fish_count: 0,
            tank: TankStats {
                cleanliness: 100.0,
                temperature,
            },
        }
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    /// Cumulative earnings required to leave the current level
    pub fn next_level_at(&self) -> u64 {
        u64::from(self.level) * COINS_PER_LEVEL
    }

    /// Credit `amount` to both balance and lifetime earnings
    pub fn credit(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
        self.total_earned = self.total_earned.saturating_add(amount);
    }

    /// Deduct `amount` if affordable
    pub fn spend(&mut self, amount: u64) -> bool {
        match self.coins.checked_sub(amount) {
            Some(left) => {
                self.coins = left;
                true
            }
            None => false,
        }
    }
}
