use std::collections::BTreeMap;

use shared_resources::elevator_message::{CarSnapshot, StopOrigin};

use crate::modules::car::Car;

impl From<&Car> for CarSnapshot {
    fn from(car: &Car) -> Self {
        let mut stop_origins = BTreeMap::new();
        for stop in car.stops() {
            let origin = if stop.is_outside() { StopOrigin::Outside } else { StopOrigin::Inside };
            // A floor wanted from the hall reports as outside.
            stop_origins
                .entry(stop.floor)
                .and_modify(|existing| {
                    if origin == StopOrigin::Outside {
                        *existing = origin;
                    }
                })
                .or_insert(origin);
        }
        CarSnapshot {
            id: car.id(),
            current_floor: car.current_floor(),
            motion: car.motion().as_str().to_string(),
            door: car.door().as_str().to_string(),
            committed_direction: car
                .direction()
                .map_or("none", |direction| direction.as_str())
                .to_string(),
            stops: car.stops().floors(),
            stop_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use shared_resources::call::CallId;
    use shared_resources::config::{ElevatorConfig, TimingsConfig};

    use crate::utilities::stops::Stop;

    #[test]
    fn snapshot_reports_stops_and_origins() {
        let mut car = Car::new(2, &ElevatorConfig::default(), &TimingsConfig::default(), Duration::ZERO);
        let mut events = Vec::new();
        car.assign_stop(Stop::inside(3), None, Duration::ZERO, &mut events);
        car.assign_stop(Stop::outside(2, CallId(4)), None, Duration::ZERO, &mut events);
        car.assign_stop(Stop::inside(2), None, Duration::ZERO, &mut events);

        let snapshot = CarSnapshot::from(&car);
        assert_eq!(snapshot.id, 2);
        assert_eq!(snapshot.current_floor, 1);
        assert_eq!(snapshot.motion, "IDLE");
        assert_eq!(snapshot.door, "CLOSED");
        assert_eq!(snapshot.committed_direction, "up");
        assert_eq!(snapshot.stops, vec![2, 2, 3]);
        assert_eq!(snapshot.stop_origins.get(&2), Some(&StopOrigin::Outside));
        assert_eq!(snapshot.stop_origins.get(&3), Some(&StopOrigin::Inside));
    }

    #[test]
    fn idle_car_has_no_direction() {
        let car = Car::new(1, &ElevatorConfig::default(), &TimingsConfig::default(), Duration::ZERO);
        let snapshot = CarSnapshot::from(&car);
        assert_eq!(snapshot.committed_direction, "none");
        assert!(snapshot.stops.is_empty());
        assert!(snapshot.stop_origins.is_empty());
    }
}
