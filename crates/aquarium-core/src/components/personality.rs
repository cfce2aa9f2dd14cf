//! Fish personalities: movement tuning selected by a fixed tag.
//!
//! Every fish gets exactly one personality at creation. The personality picks a
//! [`PersonalityProfile`] that scales swim speed, how often the fish wanders
//! off in a new direction, and how quickly it turns to face where it is going.
//! Playful and energetic fish are the fastest and most erratic; wise and shy
//! fish the slowest and calmest.

use serde::{Deserialize, Serialize};

use super::common::{BoundingBox, Vec3};

/// Personality tag assigned at fish creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    Playful,
    Shy,
    Energetic,
    Elegant,
    Aggressive,
    Wise,
    Curious,
}

/// Numerical movement modifiers for a personality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityProfile {
    /// Multiplier on the fish's configured base speed.
    pub speed_multiplier: f32,
    /// Probability per tick of picking a new random heading.
    pub direction_change_chance: f32,
    /// How quickly the facing axis tracks velocity (per second, scaled by turn speed).
    pub turn_responsiveness: f32,
}

impl Personality {
    /// Movement tuning for this personality.
    pub fn profile(self) -> PersonalityProfile {
        match self {
            Personality::Energetic => PersonalityProfile {
                speed_multiplier: 1.5,
                direction_change_chance: 0.06,
                turn_responsiveness: 3.5,
            },
            Personality::Playful => PersonalityProfile {
                speed_multiplier: 1.3,
                direction_change_chance: 0.05,
                turn_responsiveness: 3.0,
            },
            Personality::Aggressive => PersonalityProfile {
                speed_multiplier: 1.2,
                direction_change_chance: 0.04,
                turn_responsiveness: 2.5,
            },
            Personality::Curious => PersonalityProfile {
                speed_multiplier: 1.1,
                direction_change_chance: 0.03,
                turn_responsiveness: 2.0,
            },
            Personality::Elegant => PersonalityProfile {
                speed_multiplier: 0.9,
                direction_change_chance: 0.015,
                turn_responsiveness: 1.5,
            },
            Personality::Shy => PersonalityProfile {
                speed_multiplier: 0.7,
                direction_change_chance: 0.01,
                turn_responsiveness: 1.2,
            },
            Personality::Wise => PersonalityProfile {
                speed_multiplier: 0.6,
                direction_change_chance: 0.008,
                turn_responsiveness: 1.0,
            },
        }
    }

    /// All personalities for iteration and random selection.
    pub fn all() -> &'static [Personality] {
        &[
            Personality::Playful,
            Personality::Shy,
            Personality::Energetic,
            Personality::Elegant,
            Personality::Aggressive,
            Personality::Wise,
            Personality::Curious,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Personality::Playful => "playful",
            Personality::Shy => "shy",
            Personality::Energetic => "energetic",
            Personality::Elegant => "elegant",
            Personality::Aggressive => "aggressive",
            Personality::Wise => "wise",
            Personality::Curious => "curious",
        }
    }

    /// Apply the personality's directional bias to a freshly drawn heading.
    ///
    /// Shy fish keep to the lower half of the water column; curious fish head
    /// toward whichever walls are nearest. Other personalities are unbiased.
    pub fn bias_heading(self, heading: Vec3, position: Vec3, tank: &BoundingBox) -> Vec3 {
        match self {
            Personality::Shy => Vec3::new(heading.x, -heading.y.abs(), heading.z),
            Personality::Curious => {
                let center = tank.center();
                let toward_x = if position.x >= center.x { 1.0 } else { -1.0 };
                let toward_z = if position.z >= center.z { 1.0 } else { -1.0 };
                Vec3::new(heading.x.abs() * toward_x, heading.y, heading.z.abs() * toward_z)
            }
            _ => heading,
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_personalities_have_distinct_profiles() {
        let all = Personality::all();
        assert_eq!(all.len(), 7);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.profile(), b.profile(), "{a} and {b} share a profile");
            }
        }
    }

    #[test]
    fn playful_and_energetic_outpace_wise_and_shy() {
        let fast = [Personality::Playful, Personality::Energetic];
        let calm = [Personality::Wise, Personality::Shy];
        for f in fast {
            for c in calm {
                let (fp, cp) = (f.profile(), c.profile());
                assert!(fp.speed_multiplier > cp.speed_multiplier);
                assert!(fp.direction_change_chance > cp.direction_change_chance);
                assert!(fp.turn_responsiveness > cp.turn_responsiveness);
            }
        }
    }

    #[test]
    fn shy_heads_down() {
        let tank = BoundingBox::centered(20.0, 12.0, 10.0);
        let biased = Personality::Shy.bias_heading(Vec3::new(0.3, 0.8, 0.1), Vec3::ZERO, &tank);
        assert!(biased.y < 0.0);
        assert_eq!(biased.x, 0.3);
    }

    #[test]
    fn curious_heads_toward_near_walls() {
        let tank = BoundingBox::centered(20.0, 12.0, 10.0);
        let pos = Vec3::new(4.0, 0.0, -3.0);
        let biased = Personality::Curious.bias_heading(Vec3::new(-0.5, 0.2, 0.5), pos, &tank);
        assert!(biased.x > 0.0);
        assert!(biased.z < 0.0);
        assert_eq!(biased.y, 0.2);
    }
}
