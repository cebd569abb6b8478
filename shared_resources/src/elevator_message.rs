use std::collections::BTreeMap;
use std::fmt;

use crate::call::{CarId, Direction, Floor};

/// An outbound notification in the text protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `[up_|down_]floor_arrived@F#K`. The prefix is the direction of travel
    /// when the car arrives moving, absent when it is already standing there.
    FloorArrived {
        car: CarId,
        floor: Floor,
        direction: Option<Direction>,
    },
    /// `door_opened#K`
    DoorOpened { car: CarId },
    /// `door_closed#K`
    DoorClosed { car: CarId },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::FloorArrived { car, floor, direction } => {
                if let Some(direction) = direction {
                    write!(f, "{}_", direction)?;
                }
                write!(f, "floor_arrived@{}#{}", floor, car)
            }
            Event::DoorOpened { car } => write!(f, "door_opened#{}", car),
            Event::DoorClosed { car } => write!(f, "door_closed#{}", car),
        }
    }
}

/// Whether a pending stop came from inside the car or from a hall call.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StopOrigin {
    Inside,
    Outside,
}

/// Read-only view of one car, as published on the telemetry port.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub id: CarId,
    pub current_floor: Floor,
    /// `IDLE`, `MOVING_UP` or `MOVING_DOWN`
    pub motion: String,
    /// `CLOSED`, `OPENING`, `OPEN` or `CLOSING`
    pub door: String,
    /// `up`, `down` or `none`
    pub committed_direction: String,
    pub stops: Vec<Floor>,
    pub stop_origins: BTreeMap<Floor, StopOrigin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_wire_forms() {
        let moving = Event::FloorArrived { car: 1, floor: 3, direction: Some(Direction::Up) };
        let standing = Event::FloorArrived { car: 2, floor: -1, direction: None };
        assert_eq!(moving.to_string(), "up_floor_arrived@3#1");
        assert_eq!(standing.to_string(), "floor_arrived@-1#2");
        assert_eq!(Event::DoorOpened { car: 1 }.to_string(), "door_opened#1");
        assert_eq!(Event::DoorClosed { car: 2 }.to_string(), "door_closed#2");
    }

    #[test]
    fn snapshot_json_uses_lowercase_origins() {
        let snapshot = CarSnapshot {
            id: 1,
            current_floor: 2,
            motion: "MOVING_UP".to_string(),
            door: "CLOSED".to_string(),
            committed_direction: "up".to_string(),
            stops: vec![3],
            stop_origins: BTreeMap::from([(3, StopOrigin::Outside)]),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["stop_origins"]["3"], "outside");
        assert_eq!(json["motion"], "MOVING_UP");
    }
}
