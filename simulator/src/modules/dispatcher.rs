/// ----- DISPATCHER MODULE -----
/// Owns the hall call ledger and binds calls to cars. A call is only bound
/// to a car that is idle with closed doors and nothing else to do; the car
/// with the lowest estimated time wins, ties go to the lowest car id. Calls
/// that find no such car stay pending and are retried every tick.

use log::debug;

use shared_resources::call::{CallId, CarId, Direction, Floor};
use shared_resources::config::ElevatorConfig;
use shared_resources::elevator_message::Event;
use shared_resources::error::CommandError;

use crate::modules::car::{Car, StopOutcome};
use crate::utilities::clock::SimTime;
use crate::utilities::hall_calls::{HallCall, HallCalls};
use crate::utilities::stops::Stop;

#[derive(Debug, Clone)]
pub struct Dispatcher {
    elevator: ElevatorConfig,
    calls: HallCalls,
}

impl Dispatcher {
    pub fn new(elevator: &ElevatorConfig) -> Self {
        Dispatcher {
            elevator: elevator.clone(),
            calls: HallCalls::new(),
        }
    }

    pub fn calls(&self) -> &HallCalls {
        &self.calls
    }

    pub fn calls_mut(&mut self) -> &mut HallCalls {
        &mut self.calls
    }

    /// Registers a hall call, coalescing with an outstanding call for the
    /// same floor and direction, and tries to bind it right away.
    pub fn add_hall_call(
        &mut self,
        cars: &mut [Car],
        floor: Floor,
        direction: Direction,
        now: SimTime,
        events: &mut Vec<Event>,
    ) -> Result<CallId, CommandError> {
        if !self.elevator.floor_is_valid(floor) {
            return Err(CommandError::InvalidFloor(floor));
        }
        if let Some(call) = self.calls.outstanding(floor, direction) {
            debug!("Hall call {} at floor {} already registered as {}", direction, floor, call.id);
            return Ok(call.id);
        }
        let id = self.calls.insert_pending(floor, direction);
        debug!("Hall call {} registered: {} at floor {}", id, direction, floor);
        self.assign_pending(cars, now, events);
        Ok(id)
    }

    /// Adds a destination chosen inside car `car`.
    pub fn add_car_selection(
        &mut self,
        cars: &mut [Car],
        car: CarId,
        floor: Floor,
        now: SimTime,
        events: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if !self.elevator.floor_is_valid(floor) {
            return Err(CommandError::InvalidFloor(floor));
        }
        let car = find_car(cars, car).ok_or(CommandError::InvalidCar(i64::from(car)))?;
        self.assign_stop(car, floor, None, now, events);
        Ok(())
    }

    /// Binds every pending call, in arrival order, to the best available car.
    pub fn assign_pending(&mut self, cars: &mut [Car], now: SimTime, events: &mut Vec<Event>) {
        for id in self.calls.pending() {
            let Some(floor) = self.calls.get(id).map(|call| call.floor) else {
                continue;
            };
            let Some(index) = best_car(cars, floor) else {
                continue;
            };
            let car = &mut cars[index];
            if let Some(call) = self.calls.assign(id, car.id()) {
                debug!("{} bound to car {}", call.id, car.id());
                let call = call.clone();
                self.assign_stop(car, call.floor, Some(&call), now, events);
            }
        }
    }

    /// Hands a stop at `floor` to `car`, bound to `call` when it comes from
    /// the hall.
    pub fn assign_stop(
        &self,
        car: &mut Car,
        floor: Floor,
        call: Option<&HallCall>,
        now: SimTime,
        events: &mut Vec<Event>,
    ) -> StopOutcome {
        let stop = match call {
            Some(call) => Stop::outside(floor, call.id),
            None => Stop::inside(floor),
        };
        let prefix = call
            .filter(|_| self.elevator.hall_call_prefix_at_floor)
            .map(|call| call.direction);
        let outcome = car.assign_stop(stop, prefix, now, events);
        debug!("Car {} given stop at floor {} ({:?}): {:?}", car.id(), floor, stop.call, outcome);
        outcome
    }

    /// Once per tick, before the cars advance.
    pub fn step(&mut self, cars: &mut [Car], now: SimTime, events: &mut Vec<Event>) {
        self.assign_pending(cars, now, events);
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

/// Available car with the lowest estimated time to `floor`, ties broken by
/// the lowest id.
pub fn best_car(cars: &[Car], floor: Floor) -> Option<usize> {
    cars.iter()
        .enumerate()
        .filter(|(_, car)| car.is_available())
        .min_by_key(|(_, car)| (car.estimated_time(floor), car.id()))
        .map(|(index, _)| index)
}

pub fn find_car(cars: &mut [Car], id: CarId) -> Option<&mut Car> {
    cars.iter_mut().find(|car| car.id() == id)
}
