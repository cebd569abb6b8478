use std::time::Duration;

use proptest::prelude::*;

use shared_resources::call::{CarId, Direction, Floor};
use shared_resources::config::Config;
use shared_resources::request::Command;

use crate::modules::car::MotionState;
use crate::modules::doors::DoorState;
use crate::modules::world::World;
use crate::utilities::hall_calls::CallState;

// ── Harness ──

const TICK_MS: u64 = 10;

/// Drives a world with a 10 ms tick and records every event with the
/// millisecond it was emitted at.
struct Harness {
    world: World,
    config: Config,
    now_ms: u64,
    queued: Vec<Command>,
    log: Vec<(u64, String)>,
}

impl Harness {
    fn new() -> Self {
        Harness::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        Harness {
            world: World::new(&config, Duration::ZERO),
            config,
            now_ms: 0,
            queued: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Queues `text` for the next tick.
    fn send(&mut self, text: &str) {
        let command = Command::parse(text, &self.config.elevator).unwrap();
        self.queued.push(command);
    }

    fn tick(&mut self) {
        let now = Duration::from_millis(self.now_ms);
        let commands = std::mem::take(&mut self.queued);
        for event in self.world.tick(now, commands) {
            self.log.push((self.now_ms, event.to_string()));
        }
        self.now_ms += TICK_MS;
    }

    fn run_until(&mut self, millis: u64) {
        while self.now_ms <= millis {
            self.tick();
        }
    }

    /// Ticks until `event` has been emitted, returning the time it was
    /// emitted at. Gives up after `limit_ms`.
    fn run_until_event(&mut self, event: &str, limit_ms: u64) -> u64 {
        let seen = self.log.len();
        while self.now_ms <= limit_ms {
            self.tick();
            if let Some((at, _)) = self.log[seen..].iter().find(|(_, text)| text == event) {
                return *at;
            }
        }
        panic!("{} not emitted by {} ms, got {:?}", event, limit_ms, self.log);
    }

    fn events(&self) -> Vec<&str> {
        self.log.iter().map(|(_, text)| text.as_str()).collect()
    }

    fn count(&self, event: &str) -> usize {
        self.log.iter().filter(|(_, text)| text == event).count()
    }

    fn car_floor(&self, id: CarId) -> Floor {
        self.world.car(id).map(|car| car.current_floor()).unwrap()
    }
}

// ── Boot ──

#[test]
fn boot_state() {
    let harness = Harness::new();
    let snapshot = harness.world.snapshot();
    assert_eq!(snapshot.len(), 2);
    for (index, car) in snapshot.iter().enumerate() {
        assert_eq!(car.id as usize, index + 1);
        assert_eq!(car.current_floor, 1);
        assert_eq!(car.motion, "IDLE");
        assert_eq!(car.door, "CLOSED");
        assert_eq!(car.committed_direction, "none");
        assert!(car.stops.is_empty());
    }
}

#[test]
fn snapshot_serializes_to_json() {
    let mut harness = Harness::new();
    harness.send("select_floor@3#2");
    harness.tick();
    let json = serde_json::to_value(harness.world.snapshot()).unwrap();
    assert_eq!(json[1]["id"], 2);
    assert_eq!(json[1]["stops"], serde_json::json!([3]));
    assert_eq!(json[1]["stop_origins"]["3"], "inside");
    assert_eq!(json[0]["stops"], serde_json::json!([]));
}

// ── Pickup and delivery ──

#[test]
fn pickup_at_current_floor_then_delivery() {
    let mut harness = Harness::new();
    harness.send("call_up@1");
    harness.tick();
    assert_eq!(harness.events(), vec!["floor_arrived@1#1"]);

    let opened = harness.run_until_event("door_opened#1", 10_000);
    assert_eq!(opened, 3000);

    harness.send("select_floor@3#1");
    let arrived = harness.run_until_event("up_floor_arrived@3#1", 20_000);
    assert_eq!(arrived, 8820);
    let opened_at_three = harness.run_until_event("door_opened#1", 20_000);
    assert!(opened_at_three > arrived);

    assert_eq!(
        harness.events(),
        vec![
            "floor_arrived@1#1",
            "door_opened#1",
            "door_closed#1",
            "up_floor_arrived@2#1",
            "up_floor_arrived@3#1",
            "door_opened#1",
        ]
    );
    assert!(harness.world.dispatcher().calls().is_empty());
    assert!(harness.world.car(2).map(|car| car.is_available()).unwrap());
}

#[test]
fn delivery_downwards_uses_down_prefix() {
    let mut harness = Harness::new();
    harness.send("select_floor@-1#2");
    let arrived = harness.run_until_event("down_floor_arrived@-1#2", 10_000);
    assert_eq!(arrived, 4810);
    assert_eq!(harness.car_floor(2), -1);
    assert_eq!(harness.car_floor(1), 1);
}

// ── Skipped floor ──

#[test]
fn skipped_floor_is_never_reported() {
    let mut config = Config::default();
    config.elevator.home_floor = -1;
    let mut harness = Harness::with_config(config);
    harness.send("select_floor@1#1");

    let arrived = harness.run_until_event("up_floor_arrived@1#1", 10_000);
    // Two floor travel times, the skipped floor included.
    assert_eq!(arrived, 4810);
    harness.run_until(15_000);
    assert!(harness.events().iter().all(|event| !event.contains("@0#")));
    assert_eq!(harness.count("door_opened#1"), 1);
}

// ── Two cars ──

#[test]
fn two_calls_go_to_two_cars() {
    let mut harness = Harness::new();
    harness.send("call_up@2");
    harness.send("call_down@3");
    harness.tick();

    let calls = harness.world.dispatcher().calls();
    let owners: Vec<(Floor, Option<CarId>)> = calls.iter().map(|call| (call.floor, call.assigned_car)).collect();
    assert_eq!(owners, vec![(2, Some(1)), (3, Some(2))]);
    assert!(calls.iter().all(|call| call.state == CallState::Assigned));

    harness.run_until(10_000);
    assert_eq!(harness.count("door_opened#1"), 1);
    assert_eq!(harness.count("door_opened#2"), 1);
    assert_eq!(harness.count("up_floor_arrived@3#2"), 1);
    assert_eq!(harness.car_floor(1), 2);
    assert_eq!(harness.car_floor(2), 3);
    assert!(harness.world.dispatcher().calls().is_empty());
}

#[test]
fn busy_fleet_holds_call_until_a_car_frees_up() {
    let mut config = Config::default();
    config.elevator.num_cars = 1;
    let mut harness = Harness::with_config(config);
    harness.send("select_floor@3#1");
    harness.send("call_down@2");
    harness.tick();
    assert_eq!(
        harness.world.dispatcher().calls().iter().next().map(|call| call.state),
        Some(CallState::Pending)
    );

    harness.run_until(40_000);
    assert!(harness.world.dispatcher().calls().is_empty());
    assert_eq!(harness.car_floor(1), 2);
    assert!(harness.events().contains(&"down_floor_arrived@2#1"));
    assert_eq!(harness.count("door_opened#1"), 2);
}

// ── Duplicate suppression ──

#[test]
fn repeated_hall_call_is_served_once() {
    let mut harness = Harness::new();
    harness.send("call_up@2");
    harness.tick();
    harness.run_until(500);
    harness.send("call_up@2");
    harness.run_until(12_000);

    assert_eq!(harness.count("door_opened#1"), 1);
    assert_eq!(harness.count("door_opened#2"), 0);
    assert_eq!(harness.car_floor(2), 1);
    assert!(harness.events().iter().all(|event| !event.ends_with("#2")));
}

#[test]
fn repeated_selection_is_idempotent() {
    let mut once = Harness::new();
    once.send("select_floor@3#1");
    once.tick();

    let mut twice = Harness::new();
    twice.send("select_floor@3#1");
    twice.send("select_floor@3#1");
    twice.tick();

    assert_eq!(once.world.snapshot(), twice.world.snapshot());
}

// ── Doors ──

#[test]
fn manual_doors_while_idle() {
    let mut harness = Harness::new();
    harness.send("open_door#2");
    harness.run_until_event("door_opened#2", 2_000);
    harness.send("close_door#2");
    let closed = harness.run_until_event("door_closed#2", 4_000);
    assert!(closed < 3_000);
    assert_eq!(harness.world.car(2).map(|car| car.door()), Some(DoorState::Closed));
}

#[test]
fn opening_open_doors_is_a_no_op() {
    let mut harness = Harness::new();
    harness.send("open_door#1");
    harness.run_until_event("door_opened#1", 2_000);
    harness.send("open_door#1");
    harness.run_until(3_500);
    assert_eq!(harness.count("door_opened#1"), 1);
}

#[test]
fn doors_close_by_themselves() {
    let mut harness = Harness::new();
    harness.send("open_door#1");
    let opened = harness.run_until_event("door_opened#1", 2_000);
    let closed = harness.run_until_event("door_closed#1", 10_000);
    assert_eq!(closed - opened, 4_000);
}

// ── Reset ──

#[test]
fn reset_mid_travel_returns_everything_home() {
    let mut harness = Harness::new();
    harness.send("select_floor@3#1");
    harness.send("call_down@-1");
    harness.run_until(2_500);
    assert_ne!(harness.world.car(1).map(|car| car.motion()), Some(MotionState::Idle));

    harness.send("reset");
    harness.tick();
    assert_eq!(harness.world.snapshot(), Harness::new().world.snapshot());
    assert!(harness.world.dispatcher().calls().is_empty());

    let events_at_reset = harness.log.len();
    harness.run_until(20_000);
    assert_eq!(harness.log.len(), events_at_reset);
}

#[test]
fn reset_twice_equals_reset_once() {
    let mut once = Harness::new();
    let mut twice = Harness::new();
    for harness in [&mut once, &mut twice] {
        harness.send("select_floor@2#2");
        harness.run_until(1_000);
    }
    once.send("reset");
    once.tick();
    twice.send("reset");
    twice.send("reset");
    twice.tick();
    assert_eq!(once.world.snapshot(), twice.world.snapshot());
}

#[test]
fn reset_keeps_events_emitted_earlier_in_the_tick() {
    let mut harness = Harness::new();
    harness.send("call_up@1");
    harness.send("reset");
    harness.tick();
    assert_eq!(harness.events(), vec!["floor_arrived@1#1"]);
    assert!(harness.world.dispatcher().calls().is_empty());

    harness.run_until(20_000);
    assert_eq!(harness.events(), vec!["floor_arrived@1#1"]);
}

// ── Determinism ──

fn scripted_run() -> Vec<(u64, String)> {
    let mut harness = Harness::new();
    harness.send("call_up@-1");
    harness.send("select_floor@3#2");
    harness.run_until(1_200);
    harness.send("call_down@2");
    harness.run_until(6_000);
    harness.send("open_door#2");
    harness.send("call_up@1");
    harness.run_until(30_000);
    harness.log
}

#[test]
fn identical_input_gives_identical_events() {
    let first = scripted_run();
    assert!(!first.is_empty());
    assert_eq!(first, scripted_run());
}

// ── Invariants under random load ──

fn floor() -> impl Strategy<Value = Floor> {
    prop::sample::select(vec![-1, 1, 2, 3])
}

fn car() -> impl Strategy<Value = CarId> {
    1u8..=2
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => (floor(), prop::bool::ANY).prop_map(|(floor, up)| Command::Call {
            floor,
            direction: if up { Direction::Up } else { Direction::Down },
        }),
        4 => (floor(), car()).prop_map(|(floor, car)| Command::SelectFloor { floor, car }),
        1 => car().prop_map(|car| Command::OpenDoor { car }),
        1 => car().prop_map(|car| Command::CloseDoor { car }),
        1 => Just(Command::Reset),
    ]
}

fn check_invariants(world: &World, config: &Config) {
    for car in world.cars() {
        assert!(config.elevator.floor_is_valid(car.current_floor()), "car {} at floor {}", car.id(), car.current_floor());
        if car.motion() != MotionState::Idle {
            assert_eq!(car.door(), DoorState::Closed, "car {} moving with doors {:?}", car.id(), car.door());
        }
        for stop in car.stops() {
            assert!(config.elevator.floor_is_valid(stop.floor));
            if let Some(id) = stop.call {
                let call = world.dispatcher().calls().get(id).expect("stop refers to a forgotten call");
                assert_eq!(call.state, CallState::Assigned);
                assert_eq!(call.assigned_car, Some(car.id()));
            }
        }
    }
    let calls: Vec<_> = world.dispatcher().calls().iter().collect();
    for (index, call) in calls.iter().enumerate() {
        assert!(
            calls[index + 1..]
                .iter()
                .all(|other| (other.floor, other.direction) != (call.floor, call.direction)),
            "two outstanding calls for {} at floor {}",
            call.direction,
            call.floor
        );
        match call.state {
            CallState::Pending => assert_eq!(call.assigned_car, None),
            CallState::Assigned => assert!(call.assigned_car.is_some()),
            CallState::Completed => panic!("completed call {} kept in the ledger", call.id),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn invariants_hold_and_work_drains(script in prop::collection::vec((0u64..400, command()), 1..12)) {
        let config = Config::default();
        let mut harness = Harness::with_config(config.clone());
        for (gap_ticks, command) in script {
            harness.queued.push(command);
            for _ in 0..=gap_ticks {
                harness.tick();
                check_invariants(&harness.world, &config);
            }
        }

        let deadline = harness.now_ms + 600_000;
        while harness.now_ms < deadline {
            let quiet = harness.world.dispatcher().calls().is_empty()
                && harness.world.cars().iter().all(|car| car.is_available());
            if quiet {
                break;
            }
            harness.tick();
            check_invariants(&harness.world, &config);
        }
        prop_assert!(harness.world.dispatcher().calls().is_empty(), "calls left: {:?}", harness.world.dispatcher().calls());
        prop_assert!(harness.world.cars().iter().all(|car| car.is_available()));
        prop_assert!(harness.events().iter().all(|event| !event.contains("@0#")));
    }
}
