/// ----- WORLD MODULE -----
/// The whole simulated building: every car plus the dispatcher. One tick
/// applies the commands received since the last tick, lets the dispatcher
/// bind pending calls and then advances every car in id order.

use log::{info, warn};

use shared_resources::call::CarId;
use shared_resources::config::Config;
use shared_resources::elevator_message::{CarSnapshot, Event};
use shared_resources::error::CommandError;
use shared_resources::request::Command;

use crate::modules::car::Car;
use crate::modules::dispatcher::{find_car, Dispatcher};
use crate::utilities::clock::SimTime;

#[derive(Debug, Clone)]
pub struct World {
    cars: Vec<Car>,
    dispatcher: Dispatcher,
    outbox: Vec<Event>,
}

impl World {
    pub fn new(config: &Config, now: SimTime) -> Self {
        let cars = config
            .elevator
            .car_ids()
            .map(|id| Car::new(id, &config.elevator, &config.timings, now))
            .collect();
        World {
            cars,
            dispatcher: Dispatcher::new(&config.elevator),
            outbox: Vec::new(),
        }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|car| car.id() == id)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Applies one command. Events it causes are queued for the end of the
    /// current tick.
    pub fn apply(&mut self, command: Command, now: SimTime) -> Result<(), CommandError> {
        match command {
            Command::Call { floor, direction } => self
                .dispatcher
                .add_hall_call(&mut self.cars, floor, direction, now, &mut self.outbox)
                .map(|_| ()),
            Command::SelectFloor { floor, car } => {
                self.dispatcher
                    .add_car_selection(&mut self.cars, car, floor, now, &mut self.outbox)
            }
            Command::OpenDoor { car } => {
                let ledger = self.dispatcher.calls_mut();
                let car = find_car(&mut self.cars, car).ok_or(CommandError::InvalidCar(i64::from(car)))?;
                car.open_door(now, ledger);
                Ok(())
            }
            Command::CloseDoor { car } => {
                let car = find_car(&mut self.cars, car).ok_or(CommandError::InvalidCar(i64::from(car)))?;
                car.close_door(now);
                Ok(())
            }
            Command::Reset => {
                self.reset(now);
                Ok(())
            }
        }
    }

    /// Advances the dispatcher and every car to `now`.
    pub fn step(&mut self, now: SimTime) {
        self.dispatcher.step(&mut self.cars, now, &mut self.outbox);
        for car in self.cars.iter_mut() {
            car.step(now, self.dispatcher.calls_mut(), &mut self.outbox);
        }
    }

    /// One full tick. Returns the events emitted during it, in order.
    pub fn tick(&mut self, now: SimTime, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
        for command in commands {
            if let Err(e) = self.apply(command, now) {
                warn!("Command {} rejected: {}", command, e);
            }
        }
        self.step(now);
        self.take_events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    pub fn snapshot(&self) -> Vec<CarSnapshot> {
        self.cars.iter().map(CarSnapshot::from).collect()
    }

    /// Every car back home with nothing pending, all calls forgotten. Events
    /// already emitted this tick are still delivered.
    pub fn reset(&mut self, now: SimTime) {
        info!("Resetting simulation");
        for car in self.cars.iter_mut() {
            car.reset(now);
        }
        self.dispatcher.reset();
    }
}
