//! Aquarium Headless Simulation Harness
//!
//! Drives the aquarium tick loop in-process with no renderer attached and
//! checks the invariants a host relies on: fish stay in the tank, stats stay
//! bounded, food never exceeds capacity, the economy pays what it promises.
//!
//! Usage:
//!   cargo run -p aquarium-simtest
//!   cargo run -p aquarium-simtest -- --seconds 120 --fish 12 --verbose
//!   cargo run -p aquarium-simtest -- --events > events.jsonl

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use aquarium_core::camera::{Camera, ScreenPoint, Viewport};
use aquarium_core::config::AquariumConfig;
use aquarium_core::engine::Aquarium;
use aquarium_core::events::{EventKind, GameEvent};
use aquarium_core::game::AchievementId;
use clap::Parser;
use log::{info, warn};

/// Headless aquarium run with invariant checks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Simulated seconds for the free-running scenario
    #[arg(short, long, default_value_t = 60.0)]
    seconds: f32,

    /// Fish to populate the tank with [default: the config's initial_fish]
    #[arg(short, long)]
    fish: Option<usize>,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulation frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// JSON config overriding the defaults
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print every outward event as one JSON line
    #[arg(long)]
    events: bool,

    /// Show passing checks too
    #[arg(short, long)]
    verbose: bool,
}

const OUTWARD_EVENTS: &[EventKind] = &[
    EventKind::Message,
    EventKind::CoinsEarned,
    EventKind::LevelUp,
    EventKind::AchievementUnlocked,
    EventKind::FishSelected,
    EventKind::FishDeselected,
    EventKind::FishCountChanged,
    EventKind::TankStatsUpdated,
    EventKind::FishFed,
    EventKind::FishPetted,
    EventKind::FishDied,
    EventKind::FoodDropped,
];

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    println!("=== Aquarium Simulation Harness ===\n");

    let config = match &args.config {
        Some(path) => match AquariumConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        None => AquariumConfig::default(),
    }
    .with_seed(args.seed);
    let fish = args.fish.unwrap_or(config.initial_fish as usize);

    let mut results = Vec::new();

    // 1. Config validation
    results.extend(validate_config(&config));

    // 2. Free-running tank
    results.extend(validate_free_run(&config, &args, fish));

    // 3. Player interactions
    results.extend(validate_interactions(&config));

    // 4. Economy
    results.extend(validate_economy(&config));

    // 5. Determinism
    results.extend(validate_determinism(&config, &args, fish));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn build(config: &AquariumConfig) -> Option<Aquarium> {
    match Aquarium::new(config.clone()) {
        Ok(aquarium) => Some(aquarium),
        Err(e) => {
            warn!("aquarium rejected config: {e}");
            None
        }
    }
}

fn step(aquarium: &mut Aquarium, seconds: f32, fps: u32) {
    let fps = fps.max(1);
    let dt = 1.0 / fps as f32;
    let frames = (seconds * fps as f32).round() as usize;
    for _ in 0..frames {
        aquarium.advance(dt);
    }
}

/// Record payloads of the given kinds as delivered
fn record(aquarium: &Aquarium, kinds: &[EventKind]) -> Rc<RefCell<Vec<GameEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    for &kind in kinds {
        let sink = Rc::clone(&seen);
        aquarium.bus().subscribe(kind, move |event, _| {
            sink.borrow_mut().push(event.payload.clone());
            Ok(())
        });
    }
    seen
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn validate_config(config: &AquariumConfig) -> Vec<TestResult> {
    println!("--- Config ---");
    let mut results = Vec::new();

    results.push(match config.validate() {
        Ok(()) => TestResult::new("config_valid", true, "config passes validation"),
        Err(e) => TestResult::new("config_valid", false, e.to_string()),
    });

    let mut broken = config.clone();
    broken.food.capacity = 0;
    results.push(TestResult::new(
        "config_rejects_zero_capacity",
        Aquarium::new(broken).is_err(),
        "food.capacity = 0 refused",
    ));

    let mut broken = config.clone();
    broken.fish.eat_distance = broken.fish.detection_radius + 1.0;
    results.push(TestResult::new(
        "config_rejects_blind_eating",
        broken.validate().is_err(),
        "eat_distance beyond detection refused",
    ));

    let partial = AquariumConfig::from_json_str(r#"{ "food": { "capacity": 7 } }"#);
    results.push(match partial {
        Ok(c) => TestResult::new(
            "config_partial_json",
            c.food.capacity == 7 && c.tank.width == AquariumConfig::default().tank.width,
            format!("capacity {} with default tank", c.food.capacity),
        ),
        Err(e) => TestResult::new("config_partial_json", false, e.to_string()),
    });

    results
}

// ── 2. Free run ─────────────────────────────────────────────────────────

fn validate_free_run(config: &AquariumConfig, args: &Args, fish: usize) -> Vec<TestResult> {
    println!("--- Free Run ({}s, {} fish) ---", args.seconds, fish);
    let mut results = Vec::new();
    let Some(mut aquarium) = build(config) else {
        results.push(TestResult::new("free_run_start", false, "config rejected"));
        return results;
    };

    if args.events {
        for &kind in OUTWARD_EVENTS {
            aquarium.bus().subscribe(kind, |event, _| {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!("could not serialize {}: {e}", event.kind()),
                }
                Ok(())
            });
        }
    }

    let spawned = if args.fish.is_some() {
        aquarium.populate(fish)
    } else {
        aquarium.populate_initial()
    };
    results.push(TestResult::new(
        "free_run_populate",
        spawned.len() == fish && aquarium.fish_count() == fish,
        format!("{} fish spawned", spawned.len()),
    ));

    // Keep dropping food so the feeding pass has work
    let bounds = config.tank.bounds();
    let capacity = config.food.capacity;
    let mut escaped = 0;
    let mut out_of_range = 0;
    let mut over_capacity = 0;
    let mut elapsed = 0.0;
    while elapsed < args.seconds {
        aquarium.drop_food(None, None);
        step(&mut aquarium, 1.0, args.fps);
        elapsed += 1.0;

        over_capacity += usize::from(aquarium.food_count() > capacity);
        for fish in aquarium.fish_data() {
            escaped += usize::from(!bounds.contains(&fish.position));
            let stats = [fish.health, fish.happiness, fish.hunger];
            out_of_range += stats.iter().filter(|s| !(0.0..=100.0).contains(*s)).count();
        }
    }

    results.push(TestResult::new(
        "free_run_fish_in_tank",
        escaped == 0,
        format!("{escaped} out-of-bounds samples"),
    ));
    results.push(TestResult::new(
        "free_run_stats_bounded",
        out_of_range == 0,
        format!("{out_of_range} stat samples outside [0, 100]"),
    ));
    results.push(TestResult::new(
        "free_run_food_capacity",
        over_capacity == 0,
        format!("{} particles live at end, cap {capacity}", aquarium.food_count()),
    ));

    let state = aquarium.progression();
    results.push(TestResult::new(
        "free_run_fish_ate",
        state.counters.fish_fed > 0 || fish == 0,
        format!("{} particles eaten, {} coins", state.counters.fish_fed, state.coins),
    ));
    info!(
        "free run finished: level {}, {} coins, {} fish",
        state.level,
        state.coins,
        aquarium.fish_count()
    );

    results
}

// ── 3. Interactions ─────────────────────────────────────────────────────

fn validate_interactions(config: &AquariumConfig) -> Vec<TestResult> {
    println!("--- Interactions ---");
    let mut results = Vec::new();
    let Some(mut aquarium) = build(config) else {
        results.push(TestResult::new("interactions_start", false, "config rejected"));
        return results;
    };
    let messages = record(&aquarium, &[EventKind::Message]);
    let petted = record(&aquarium, &[EventKind::FishPetted]);

    aquarium.feed_fish(None);
    aquarium.advance(1.0 / 60.0);
    aquarium.advance(1.0 / 60.0);
    results.push(TestResult::new(
        "feed_without_selection",
        messages.borrow().len() == 1 && aquarium.progression().total_earned == 0,
        format!("{} warning(s), no coins", messages.borrow().len()),
    ));

    let camera = Camera::default();
    let viewport = Viewport::new(1280.0, 720.0);
    let miss = aquarium.select_at_screen(&camera, ScreenPoint::new(2.0, 2.0), viewport);
    results.push(TestResult::new(
        "select_empty_tank",
        miss.is_none() && aquarium.selected().is_none(),
        "click on empty water selects nothing",
    ));

    let ids = aquarium.populate(1);
    let Some(&id) = ids.first() else {
        results.push(TestResult::new("interactions_spawn", false, "no fish spawned"));
        return results;
    };

    for _ in 0..3 {
        aquarium.pet_fish(Some(id));
        aquarium.advance(0.5);
    }
    let streaks: Vec<u32> = petted
        .borrow()
        .iter()
        .filter_map(|e| match e {
            GameEvent::FishPetted { streak, .. } => Some(*streak),
            _ => None,
        })
        .collect();
    results.push(TestResult::new(
        "pet_streak",
        streaks == [1, 2, 3],
        format!("streaks {streaks:?}"),
    ));

    let before = aquarium.fish(id).map(|f| f.hunger).unwrap_or_default();
    aquarium.feed_fish(Some(id));
    aquarium.advance(1.0 / 60.0);
    let after = aquarium.fish(id).map(|f| f.hunger).unwrap_or_default();
    results.push(TestResult::new(
        "hand_feed_fills",
        after > before,
        format!("hunger {before:.1} -> {after:.1}"),
    ));

    results
}

// ── 4. Economy ──────────────────────────────────────────────────────────

fn validate_economy(config: &AquariumConfig) -> Vec<TestResult> {
    println!("--- Economy ---");
    let mut results = Vec::new();
    let Some(mut aquarium) = build(config) else {
        results.push(TestResult::new("economy_start", false, "config rejected"));
        return results;
    };
    let economy = &config.economy;

    let start = aquarium.progression().coins;
    results.push(TestResult::new(
        "starting_coins",
        start == economy.starting_coins,
        format!("{start} coins"),
    ));

    // Buy until broke
    let affordable = if economy.fish_price == 0 {
        0
    } else {
        (start / economy.fish_price) as usize
    };
    for _ in 0..=affordable {
        aquarium.buy_fish();
    }
    aquarium.advance(1.0 / 60.0);
    aquarium.advance(1.0 / 60.0);
    let state = aquarium.progression();
    results.push(TestResult::new(
        "buy_until_broke",
        economy.fish_price == 0 || aquarium.fish_count() == affordable,
        format!("{} fish bought, {} coins left", aquarium.fish_count(), state.coins),
    ));
    results.push(TestResult::new(
        "purchases_counted",
        state.counters.fish_bought as usize == aquarium.fish_count()
            && state.is_unlocked(AchievementId::Collector) == (affordable >= 3),
        format!(
            "{} bought, {} achievements",
            state.counters.fish_bought,
            state.unlocked.len()
        ),
    ));

    // A clean tank pays nothing
    aquarium.clean_tank();
    aquarium.advance(1.0 / 60.0);
    results.push(TestResult::new(
        "clean_when_spotless",
        aquarium.progression().counters.tanks_cleaned == 0,
        "cleaning a clean tank is refused",
    ));

    // Let grime build up, then clean
    let mut minutes = 0;
    while aquarium.progression().tank.cleanliness >= economy.clean_threshold && minutes < 120 {
        aquarium.advance(60.0);
        minutes += 1;
    }
    let coins = aquarium.progression().coins;
    aquarium.clean_tank();
    aquarium.advance(1.0 / 60.0);
    let state = aquarium.progression();
    results.push(TestResult::new(
        "clean_dirty_tank",
        state.counters.tanks_cleaned == 1 && state.coins > coins,
        format!(
            "cleaned after {minutes} min, cleanliness {:.1}",
            state.tank.cleanliness
        ),
    ));

    let band = economy.base_temperature - economy.temperature_variance
        ..=economy.base_temperature + economy.temperature_variance;
    results.push(TestResult::new(
        "temperature_in_band",
        band.contains(&state.tank.temperature),
        format!("{:.2}°C", state.tank.temperature),
    ));

    results
}

// ── 5. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(config: &AquariumConfig, args: &Args, fish: usize) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let run = || {
        let mut aquarium = build(config)?;
        aquarium.populate(fish);
        aquarium.drop_food(None, None);
        step(&mut aquarium, 10.0, args.fps);
        Some((aquarium.fish_data(), aquarium.progression()))
    };

    let passed = match (run(), run()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    vec![TestResult::new(
        "same_seed_same_tank",
        passed,
        format!("seed {} replayed for 10s", args.seed),
    )]
}
