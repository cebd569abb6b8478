use thiserror::Error;

use crate::call::Floor;

/// Reasons a command is rejected before it reaches the simulation.
///
/// The wire form is produced by [`CommandError::reply`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("floor {0} is out of range or not served")]
    InvalidFloor(Floor),
    #[error("car {0} does not exist")]
    InvalidCar(i64),
    #[error("direction {0:?} is neither up nor down")]
    InvalidDirection(String),
    #[error("malformed command {0:?}")]
    MalformedCommand(String),
    #[error("simulation core is not running")]
    NotReady,
}

impl CommandError {
    pub fn slug(&self) -> &'static str {
        match self {
            CommandError::InvalidFloor(_) => "invalid_floor",
            CommandError::InvalidCar(_) => "invalid_car",
            CommandError::InvalidDirection(_) => "invalid_direction",
            CommandError::MalformedCommand(_) => "malformed_command",
            CommandError::NotReady => "not_ready",
        }
    }

    /// `error:<action>_failed:<reason>`
    pub fn reply(&self, action: &str) -> String {
        format!("error:{}_failed:{}", action, self.slug())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
