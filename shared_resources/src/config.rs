use std::fs;
use std::path::Path;
use std::time::Duration;

use log::info;

use crate::call::{CarId, Floor};
use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.json";
const FALLBACK_CONFIG_FILE: &str = "_config.json";

/// Top level of `config.json`. Every section and every field is optional;
/// missing values take the defaults below.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub elevator: ElevatorConfig,
    pub timings: TimingsConfig,
    pub simulation: SimulationConfig,
    pub network: NetworkConfig,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub min_floor: Floor,
    pub max_floor: Floor,
    pub skipped_floors: Vec<Floor>,
    pub num_cars: CarId,
    pub home_floor: Floor,
    /// Prefix the immediate at-floor announcement of a hall call with the
    /// call direction (`up_floor_arrived@F#k`).
    pub hall_call_prefix_at_floor: bool,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            min_floor: -1,
            max_floor: 3,
            skipped_floors: vec![0],
            num_cars: 2,
            home_floor: 1,
            hall_call_prefix_at_floor: false,
        }
    }
}

impl ElevatorConfig {
    pub fn floor_is_valid(&self, floor: Floor) -> bool {
        floor >= self.min_floor && floor <= self.max_floor && !self.skipped_floors.contains(&floor)
    }

    pub fn car_is_valid(&self, car: i64) -> bool {
        car >= 1 && car <= i64::from(self.num_cars)
    }

    pub fn car_ids(&self) -> impl Iterator<Item = CarId> {
        1..=self.num_cars
    }

    /// Served floors from bottom to top.
    pub fn floors(&self) -> Vec<Floor> {
        (self.min_floor..=self.max_floor)
            .filter(|floor| !self.skipped_floors.contains(floor))
            .collect()
    }

    /// Next served floor from `floor` in the direction of `step`, if any.
    pub fn next_floor(&self, floor: Floor, step: Floor) -> Option<Floor> {
        let mut next = floor + step;
        while self.skipped_floors.contains(&next) {
            next += step;
        }
        if next < self.min_floor || next > self.max_floor {
            None
        } else {
            Some(next)
        }
    }
}

/// All durations are given in seconds.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingsConfig {
    pub floor_travel_time: f64,
    pub door_operation_time: f64,
    pub door_dwell_time: f64,
    pub arrival_settle_time: f64,
    pub arrival_dwell_time: f64,
    pub post_close_hold: f64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        TimingsConfig {
            floor_travel_time: 2.0,
            door_operation_time: 1.0,
            door_dwell_time: 3.0,
            arrival_settle_time: 0.5,
            arrival_dwell_time: 2.0,
            post_close_hold: 0.3,
        }
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl TimingsConfig {
    pub fn floor_travel(&self) -> Duration {
        seconds(self.floor_travel_time)
    }

    pub fn door_operation(&self) -> Duration {
        seconds(self.door_operation_time)
    }

    pub fn door_dwell(&self) -> Duration {
        seconds(self.door_dwell_time)
    }

    pub fn announce_settle(&self) -> Duration {
        seconds(self.arrival_settle_time)
    }

    pub fn arrival_dwell(&self) -> Duration {
        seconds(self.arrival_dwell_time)
    }

    pub fn post_close_hold(&self) -> Duration {
        seconds(self.post_close_hold)
    }

    fn all(&self) -> [(&'static str, f64); 6] {
        [
            ("floor_travel_time", self.floor_travel_time),
            ("door_operation_time", self.door_operation_time),
            ("door_dwell_time", self.door_dwell_time),
            ("arrival_settle_time", self.arrival_settle_time),
            ("arrival_dwell_time", self.arrival_dwell_time),
            ("post_close_hold", self.post_close_hold),
        ]
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_period_ms: u64,
    /// Publish a snapshot every this many ticks, 0 disables publishing.
    pub snapshot_interval_ticks: u64,
    pub status_view: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            tick_period_ms: 10,
            snapshot_interval_ticks: 50,
            status_view: false,
        }
    }
}

impl SimulationConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub command_port: u16,
    pub telemetry_port: u16,
    pub telemetry: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            command_port: 19982,
            telemetry_port: 19983,
            telemetry: true,
        }
    }
}

impl Config {
    /// Loads the configuration from `path` when given, otherwise from
    /// `config.json` then `_config.json` in the working directory, and
    /// finally falls back to the built-in defaults.
    pub fn get(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config = match path {
            Some(path) => Config::read(path)?,
            None => {
                if Path::new(CONFIG_FILE).exists() {
                    Config::read(Path::new(CONFIG_FILE))?
                } else if Path::new(FALLBACK_CONFIG_FILE).exists() {
                    info!("No {} found, using {}", CONFIG_FILE, FALLBACK_CONFIG_FILE);
                    Config::read(Path::new(FALLBACK_CONFIG_FILE))?
                } else {
                    info!("No configuration file provided, using default settings");
                    Config::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Config::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let elevator = &self.elevator;
        if elevator.min_floor >= elevator.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor {} must be below max_floor {}",
                elevator.min_floor, elevator.max_floor
            )));
        }
        if elevator.num_cars == 0 {
            return Err(ConfigError::Invalid("num_cars must be at least 1".to_string()));
        }
        if !elevator.floor_is_valid(elevator.home_floor) {
            return Err(ConfigError::Invalid(format!(
                "home_floor {} is not a served floor",
                elevator.home_floor
            )));
        }
        for (name, value) in self.timings.all() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "timing {} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        if self.timings.floor_travel_time <= 0.0 {
            return Err(ConfigError::Invalid("floor_travel_time must be positive".to_string()));
        }
        if self.simulation.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be positive".to_string()));
        }
        Ok(())
    }
}
