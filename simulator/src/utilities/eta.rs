use std::time::Duration;

use shared_resources::call::Floor;
use shared_resources::config::TimingsConfig;

use crate::modules::car::{Car, MotionState};
use crate::modules::doors::DoorState;
use crate::utilities::stops::{scan_order, Stop};

/// Nominal time for `car` to reach `target`, used to rank cars for a hall
/// call. Every floor crossed costs one floor travel time, doors that are
/// open or opening add one door operation. The direction of the call is not
/// taken into account.
pub fn estimated_time(car: &Car, target: Floor, timings: &TimingsConfig) -> Duration {
    let current = car.current_floor();
    let door_busy = matches!(car.door(), DoorState::Open | DoorState::Opening);
    if current == target && door_busy {
        return Duration::ZERO;
    }

    let mut total = if door_busy { timings.door_operation() } else { Duration::ZERO };
    if car.motion() == MotionState::Idle {
        return total + timings.floor_travel() * floors_between(current, target);
    }

    let mut route: Vec<Stop> = car.stops().iter().copied().collect();
    if !route.iter().any(|stop| stop.floor == target) {
        route.push(Stop::inside(target));
    }
    let direction = car.motion().direction().or(car.direction());
    if let Some(direction) = direction {
        scan_order(&mut route, current, direction);
    }

    let mut position = current;
    for stop in route {
        total += timings.floor_travel() * floors_between(position, stop.floor);
        position = stop.floor;
        if stop.floor == target {
            break;
        }
    }
    total
}

fn floors_between(from: Floor, to: Floor) -> u32 {
    (to - from).unsigned_abs()
}
