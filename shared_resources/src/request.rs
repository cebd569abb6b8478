use std::fmt;

use crate::call::{CarId, Direction, Floor};
use crate::config::ElevatorConfig;
use crate::error::CommandError;

/// An inbound request in the text protocol.
///
/// | text                  | command                         |
/// |-----------------------|---------------------------------|
/// | `call_up@F`           | hall call going up at `F`       |
/// | `call_down@F`         | hall call going down at `F`     |
/// | `select_floor@F#K`    | destination `F` chosen in car K |
/// | `open_door#K`         | open the doors of car K         |
/// | `close_door#K`        | close the doors of car K        |
/// | `reset`               | reset the whole simulation      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Call { floor: Floor, direction: Direction },
    SelectFloor { floor: Floor, car: CarId },
    OpenDoor { car: CarId },
    CloseDoor { car: CarId },
    Reset,
}

/// The action part of a raw command, i.e. everything before the first `@`
/// or `#`. Used to build error replies even for unparseable input.
pub fn action_of(raw: &str) -> &str {
    let end = raw.find(|c: char| c == '@' || c == '#').unwrap_or(raw.len());
    &raw[..end]
}

impl Command {
    /// Parses and validates `text` against the building described by `limits`.
    pub fn parse(text: &str, limits: &ElevatorConfig) -> Result<Command, CommandError> {
        let malformed = || CommandError::MalformedCommand(text.to_string());
        if text.is_empty() || text.chars().any(char::is_whitespace) {
            return Err(malformed());
        }

        if text == "reset" {
            return Ok(Command::Reset);
        }

        if let Some((action, argument)) = text.split_once('@') {
            if let Some(direction) = action.strip_prefix("call_") {
                let floor = parse_number(argument).ok_or_else(malformed)?;
                let direction = Direction::parse(direction)
                    .ok_or_else(|| CommandError::InvalidDirection(direction.to_string()))?;
                let floor = checked_floor(floor, limits)?;
                return Ok(Command::Call { floor, direction });
            }
            if action == "select_floor" {
                let (floor, car) = argument.split_once('#').ok_or_else(malformed)?;
                let floor = parse_number(floor).ok_or_else(malformed)?;
                let car = parse_number(car).ok_or_else(malformed)?;
                let floor = checked_floor(floor, limits)?;
                let car = checked_car(car, limits)?;
                return Ok(Command::SelectFloor { floor, car });
            }
            return Err(malformed());
        }

        if let Some((action, argument)) = text.split_once('#') {
            let car = parse_number(argument).ok_or_else(malformed)?;
            return match action {
                "open_door" => Ok(Command::OpenDoor { car: checked_car(car, limits)? }),
                "close_door" => Ok(Command::CloseDoor { car: checked_car(car, limits)? }),
                _ => Err(malformed()),
            };
        }

        Err(malformed())
    }

    pub fn action(&self) -> &'static str {
        match self {
            Command::Call { direction: Direction::Up, .. } => "call_up",
            Command::Call { direction: Direction::Down, .. } => "call_down",
            Command::SelectFloor { .. } => "select_floor",
            Command::OpenDoor { .. } => "open_door",
            Command::CloseDoor { .. } => "close_door",
            Command::Reset => "reset",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Call { floor, .. } => write!(f, "{}@{}", self.action(), floor),
            Command::SelectFloor { floor, car } => write!(f, "select_floor@{}#{}", floor, car),
            Command::OpenDoor { car } | Command::CloseDoor { car } => {
                write!(f, "{}#{}", self.action(), car)
            }
            Command::Reset => f.write_str("reset"),
        }
    }
}

fn parse_number(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<i64>().ok()
}

fn checked_floor(floor: i64, limits: &ElevatorConfig) -> Result<Floor, CommandError> {
    match Floor::try_from(floor) {
        Ok(floor) if limits.floor_is_valid(floor) => Ok(floor),
        Ok(floor) => Err(CommandError::InvalidFloor(floor)),
        Err(_) => Err(CommandError::InvalidFloor(Floor::MAX)),
    }
}

fn checked_car(car: i64, limits: &ElevatorConfig) -> Result<CarId, CommandError> {
    if !limits.car_is_valid(car) {
        return Err(CommandError::InvalidCar(car));
    }
    CarId::try_from(car).map_err(|_| CommandError::InvalidCar(car))
}
