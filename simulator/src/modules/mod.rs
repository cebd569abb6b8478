use std::io::{self, BufRead};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use log::{debug, info, warn};

use shared_resources::config::Config;
use shared_resources::elevator_message::{CarSnapshot, Event};

use crate::utilities::clock::{Clock, MonotonicClock};
use crate::utilities::debug;

pub mod car;
pub mod dispatcher;
pub mod doors;
pub mod network;
pub mod port;
pub mod world;

use port::CommandQueue;
use world::World;

/// Where the tick loop delivers its output.
#[derive(Debug, Default)]
pub struct Outlets {
    pub events: Option<Sender<Event>>,
    pub snapshots: Vec<Sender<Vec<CarSnapshot>>>,
    /// Publish a snapshot every this many ticks, 0 never.
    pub snapshot_interval: u64,
}

impl Outlets {
    fn publish_events(&self, events: Vec<Event>) {
        let Some(events_tx) = &self.events else { return };
        for event in events {
            debug!("Event {}", event);
            if events_tx.send(event).is_err() {
                debug!("Event receiver gone, dropping {}", event);
            }
        }
    }

    fn publish_snapshot(&self, world: &World, ticks: u64) {
        if self.snapshot_interval == 0 || ticks % self.snapshot_interval != 0 {
            return;
        }
        let snapshot = world.snapshot();
        for snapshots_tx in self.snapshots.iter() {
            let _ = snapshots_tx.send(snapshot.clone());
        }
    }
}

/// Runs ticks until `ticker` closes or `shutdown` fires, then applies the
/// commands still queued and hands the world back.
pub fn tick_loop<C: Clock>(
    mut world: World,
    clock: &C,
    ticker: &Receiver<Instant>,
    shutdown: &Receiver<()>,
    queue: &CommandQueue,
    outlets: &Outlets,
) -> World {
    let mut ticks: u64 = 0;
    loop {
        select! {
            recv(ticker) -> msg => {
                if msg.is_err() {
                    break;
                }
                let now = clock.now();
                let events = world.tick(now, queue.drain());
                outlets.publish_events(events);
                ticks += 1;
                outlets.publish_snapshot(&world, ticks);
            },
            recv(shutdown) -> _ => {
                break;
            },
        }
    }

    let now = clock.now();
    for command in queue.drain() {
        if let Err(e) = world.apply(command, now) {
            warn!("Command {} rejected: {}", command, e);
        }
    }
    outlets.publish_events(world.take_events());
    info!("Simulation stopped after {} ticks", ticks);
    world
}

fn watch_stdin(shutdown_tx: Sender<()>) {
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) if line.trim() == "quit" => {
                let _ = shutdown_tx.send(());
                return;
            }
            Ok(_) => {}
            Err(_) => return,
        }
    }
}

pub fn run(config: Config) -> io::Result<()> {
    // INITIALIZE CHANNELS
    let (port, queue) = port::channel(&config.elevator);
    let (event_tx, event_rx) = unbounded::<Event>();
    let (telemetry_tx, telemetry_rx) = unbounded::<Vec<CarSnapshot>>();
    let (shutdown_tx, shutdown_rx) = unbounded::<()>();

    let mut outlets = Outlets {
        events: Some(event_tx),
        snapshots: Vec::new(),
        snapshot_interval: config.simulation.snapshot_interval_ticks,
    };
    if config.network.telemetry {
        outlets.snapshots.push(telemetry_tx);
    }

    // INITIALIZE NETWORK MODULE
    network::init(&config.network, port.clone(), event_rx, telemetry_rx)?;

    // INITIALIZE STATUS VIEW
    if config.simulation.status_view {
        let (status_tx, status_rx) = unbounded::<Vec<CarSnapshot>>();
        outlets.snapshots.push(status_tx);
        thread::Builder::new().name("status_view".to_string()).spawn(move || debug::main(status_rx))?;
    }

    // INITIALIZE THREAD FOR STOP COMMAND
    {
        let shutdown_tx = shutdown_tx.clone();
        thread::Builder::new().name("stdin".to_string()).spawn(move || watch_stdin(shutdown_tx))?;
    }

    let clock = MonotonicClock::start();
    let world = World::new(&config, clock.now());
    let ticker = tick(config.simulation.tick_period());
    port.mark_ready();
    info!(
        "Simulating {} car(s) on floors {:?}, tick {} ms",
        config.elevator.num_cars,
        config.elevator.floors(),
        config.simulation.tick_period_ms
    );

    tick_loop(world, &clock, &ticker, &shutdown_rx, &queue, &outlets);
    drop(shutdown_tx);
    println!("STOPPING PROGRAM...");
    Ok(())
}
