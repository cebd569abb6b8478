use std::fmt;

/// A floor number as used on the wire. Negative floors are basements.
pub type Floor = i32;

/// External, 1-based car number.
pub type CarId = u8;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Signed unit step along the shaft.
    pub fn step(self) -> Floor {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }

    /// Direction of travel from `from` to `to`, `None` when they coincide.
    pub fn between(from: Floor, to: Floor) -> Option<Self> {
        if to > from {
            Some(Direction::Up)
        } else if to < from {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque hall call identifier, unique for the lifetime of a run.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_lowercase_directions() {
        assert_eq!(Direction::parse("up"), Some(Direction::Up));
        assert_eq!(Direction::parse("down"), Some(Direction::Down));
        assert_eq!(Direction::parse("UP"), None);
        assert_eq!(Direction::parse("left"), None);
        assert_eq!(Direction::parse(""), None);
    }

    #[test]
    fn direction_between_floors() {
        assert_eq!(Direction::between(-1, 1), Some(Direction::Up));
        assert_eq!(Direction::between(3, 2), Some(Direction::Down));
        assert_eq!(Direction::between(2, 2), None);
        assert_eq!(Direction::Down.step(), -1);
    }
}
