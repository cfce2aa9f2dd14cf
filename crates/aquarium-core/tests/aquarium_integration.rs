//! Integration tests for the full aquarium tick loop.
//!
//! Exercises: intents → event bus → fish/food systems → feeding pass
//! → economy, through the public `Aquarium` API only.

use std::cell::RefCell;
use std::rc::Rc;

use aquarium_core::camera::{Camera, ScreenPoint, Viewport};
use aquarium_core::components::{FishConfig, Personality, Species, Vec3};
use aquarium_core::config::AquariumConfig;
use aquarium_core::engine::Aquarium;
use aquarium_core::events::{EventKind, GameEvent};
use aquarium_core::game::AchievementId;

// ── Helpers ────────────────────────────────────────────────────────────

const FRAME: f32 = 1.0 / 60.0;

fn aquarium(seed: u64) -> Aquarium {
    Aquarium::new(AquariumConfig::default().with_seed(seed)).unwrap()
}

fn guppy() -> FishConfig {
    FishConfig {
        species: Species::Guppy,
        personality: Personality::Wise,
        speed: 1.0,
        turn_speed: 1.0,
        size: 0.5,
        detection_radius: 5.0,
    }
}

/// Quick swimmer so chases finish well before food reaches the floor
fn darter() -> FishConfig {
    FishConfig {
        species: Species::NeonTetra,
        personality: Personality::Energetic,
        speed: 1.5,
        ..guppy()
    }
}

/// Record every event of the given kinds as delivered
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

fn run(aquarium: &mut Aquarium, seconds: f32) {
    for _ in 0..(seconds / FRAME).round() as usize {
        aquarium.advance(FRAME);
    }
}

// ── Determinism ────────────────────────────────────────────────────────

#[test]
fn same_seed_same_tank() {
    let mut a = aquarium(99);
    let mut b = aquarium(99);
    a.populate(4);
    b.populate(4);
    a.drop_food(None, None);
    b.drop_food(None, None);
    run(&mut a, 5.0);
    run(&mut b, 5.0);

    assert_eq!(a.fish_data(), b.fish_data());
    assert_eq!(a.food_data(), b.food_data());
    assert_eq!(a.progression(), b.progression());
}

// ── Fish behavior through the loop ─────────────────────────────────────

#[test]
fn fish_stay_inside_the_tank() {
    let mut tank = aquarium(5);
    tank.populate(8);
    run(&mut tank, 30.0);

    let bounds = tank.config().tank.bounds();
    for fish in tank.fish_data() {
        assert!(bounds.contains(&fish.position), "{} escaped", fish.name);
        assert!(fish.health > 0.0);
    }
}

#[test]
fn food_is_found_and_eaten() {
    let mut tank = aquarium(12);
    let id = tank
        .spawn_fish("Dash", darter(), Vec3::new(2.0, 0.0, 0.0))
        .unwrap();
    let fed = record(&tank, &[EventKind::FishFed]);

    tank.drop_food(Some(Vec3::new(0.0, 1.0, 0.0)), Some(1));
    run(&mut tank, 10.0);

    assert_eq!(tank.food_count(), 0);
    assert_eq!(fed.borrow().len(), 1);
    let fish = tank.fish(id).unwrap();
    assert!(fish.last_fed_ms.is_some());
    assert!(!fish.chasing_food);
}

// ── Selection and interactions ─────────────────────────────────────────

#[test]
fn click_select_then_pet() {
    let mut tank = aquarium(1);
    let id = tank.spawn_fish("Pip", guppy(), Vec3::ZERO).unwrap();
    let events = record(&tank, &[EventKind::FishSelected, EventKind::FishPetted]);

    let picked = tank.select_at_screen(
        &Camera::default(),
        ScreenPoint::new(640.0, 360.0),
        Viewport::new(1280.0, 720.0),
    );
    assert_eq!(picked, Some(id));

    tank.pet_fish(None);
    tank.advance(FRAME);

    assert_eq!(
        *events.borrow(),
        vec![
            GameEvent::FishSelected { id },
            GameEvent::FishPetted { id, streak: 1 },
        ]
    );
    assert_eq!(tank.progression().counters.fish_petted, 1);
    assert!(tank.progression().is_unlocked(AchievementId::GentleTouch));
}

#[test]
fn feeding_nobody_shows_a_message() {
    let mut tank = aquarium(1);
    let messages = record(&tank, &[EventKind::Message]);
    tank.feed_fish(None);
    tank.advance(FRAME);
    tank.advance(FRAME);
    assert_eq!(messages.borrow().len(), 1);
    assert_eq!(tank.progression().total_earned, 0);
}

// ── Economy ────────────────────────────────────────────────────────────

#[test]
fn regular_feeding_levels_up() {
    let mut tank = aquarium(8);
    let id = tank.spawn_fish("Pip", guppy(), Vec3::ZERO).unwrap();
    let unlocks = record(&tank, &[EventKind::AchievementUnlocked, EventKind::LevelUp]);

    for _ in 0..25 {
        tank.feed_fish(Some(id));
        tank.advance(FRAME);
    }
    tank.advance(FRAME);

    let state = tank.progression();
    assert_eq!(state.counters.fish_fed, 25);
    assert!(state.is_unlocked(AchievementId::FirstFeed));
    assert!(state.is_unlocked(AchievementId::RegularFeeder));
    // 25 payouts of 2..=5 plus 60 in achievement bonuses
    assert!(state.total_earned >= 110);
    assert!(state.level >= 2);

    let first_feed = unlocks
        .borrow()
        .iter()
        .filter(|e| {
            matches!(
                e,
                GameEvent::AchievementUnlocked {
                    id: AchievementId::FirstFeed,
                    ..
                }
            )
        })
        .count();
    assert_eq!(first_feed, 1);
}

#[test]
fn cleaning_restores_a_dirty_tank() {
    let mut tank = aquarium(4);
    tank.clean_tank();
    tank.advance(FRAME);
    assert_eq!(tank.progression().counters.tanks_cleaned, 0);

    // Fifteen minutes of grime
    for _ in 0..900 {
        tank.advance(1.0);
    }
    assert!(tank.progression().tank.cleanliness < 95.0);

    tank.clean_tank();
    tank.advance(FRAME);
    let state = tank.progression();
    assert_eq!(state.counters.tanks_cleaned, 1);
    assert!(state.tank.cleanliness > 99.9);
}

#[test]
fn buying_fish_until_broke() {
    let mut tank = aquarium(2);
    let counts = record(&tank, &[EventKind::FishCountChanged]);
    for _ in 0..3 {
        tank.buy_fish();
    }
    tank.advance(FRAME);
    tank.advance(FRAME);

    assert_eq!(tank.fish_count(), 2);
    assert_eq!(tank.progression().coins, 0);
    assert_eq!(tank.progression().fish_count, 2);
    assert_eq!(
        *counts.borrow(),
        vec![
            GameEvent::FishCountChanged { count: 1 },
            GameEvent::FishCountChanged { count: 2 },
        ]
    );
}

#[test]
fn intents_parse_from_host_json() {
    let mut tank = aquarium(6);
    tank.populate(1);
    let event: GameEvent = serde_json::from_str(r#"{"type":"dropFood","count":3}"#).unwrap();
    assert!(tank.submit(event));
    tank.advance(FRAME);
    assert_eq!(tank.food_count(), 3);
}

// ── Lifecycle ──────────────────────────────────────────────────────────

#[test]
fn shutdown_is_final() {
    let mut tank = aquarium(3);
    tank.populate(3);
    tank.shutdown();
    tank.buy_fish();
    tank.advance(1.0);
    assert_eq!(tank.fish_count(), 0);
    assert_eq!(tank.elapsed_ms(), 0.0);
}
