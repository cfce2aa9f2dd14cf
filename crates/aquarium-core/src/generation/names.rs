//! Fish name generation

use rand::seq::SliceRandom;
use rand::Rng;

/// Pick a random pet name
pub fn generate_fish_name(rng: &mut impl Rng) -> String {
    FISH_NAMES
        .choose(rng)
        .copied()
        .unwrap_or("Fish")
        .to_string()
}

static FISH_NAMES: &[&str] = &[
    // Classic
    "Bubbles",
    "Finn",
    "Goldie",
    "Nemo",
    "Dory",
    "Splash",
    "Sunny",
    "Coral",
    "Pebble",
    "Ripple",
    "Marina",
    "Wave",
    // Food
    "Noodle",
    "Mochi",
    "Biscuit",
    "Pickles",
    "Waffles",
    "Sushi",
    "Peanut",
    "Tofu",
    // Grand
    "Admiral",
    "Duchess",
    "Captain",
    "Baron",
    "Sir Swims",
    "Lady Fin",
    // Nature
    "Kelp",
    "Lotus",
    "Reed",
    "Pearl",
    "Opal",
    "Jasper",
    "Willow",
    "Fern",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_name_variety() {
        let mut rng = StdRng::seed_from_u64(3);
        let names: std::collections::HashSet<String> =
            (0..100).map(|_| generate_fish_name(&mut rng)).collect();
        assert!(names.len() > 10);
        assert!(names.iter().all(|n| FISH_NAMES.contains(&n.as_str())));
    }
}
