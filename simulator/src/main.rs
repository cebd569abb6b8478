use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::error;

use shared_resources::config::Config;

/// Elevator group simulator driven over UDP with a text protocol.
#[derive(Parser, Debug)]
#[command(name = "simulator", version, about)]
struct Cli {
    /// Configuration file, defaults to config.json or _config.json
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP port commands are received on
    #[arg(long)]
    port: Option<u16>,

    /// Number of cars
    #[arg(long)]
    cars: Option<u8>,

    /// Redraw a status table of every car in the terminal
    #[arg(long)]
    status_view: bool,
}

fn load_config(cli: &Cli) -> Result<Config, shared_resources::error::ConfigError> {
    let mut config = Config::get(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.network.command_port = port;
    }
    if let Some(cars) = cli.cars {
        config.elevator.num_cars = cars;
    }
    if cli.status_view {
        config.simulation.status_view = true;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match simulator::modules::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Simulator stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
