/// ----- CAR MODULE -----
/// State machine of a single car. It is advanced by `step` once per tick
/// and receives stops from the dispatcher through `assign_stop`. All timing
/// decisions compare the `now` of the tick against timestamps stored here.

use std::time::Duration;

use log::{debug, trace, warn};

use shared_resources::call::{CarId, Direction, Floor};
use shared_resources::config::{ElevatorConfig, TimingsConfig};
use shared_resources::elevator_message::Event;

use crate::modules::doors::{Door, DoorEvent, DoorState};
use crate::utilities::clock::{elapsed, SimTime};
use crate::utilities::eta;
use crate::utilities::hall_calls::CallLedger;
use crate::utilities::stops::{Stop, StopList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    MovingUp,
    MovingDown,
}

impl MotionState {
    pub fn as_str(self) -> &'static str {
        match self {
            MotionState::Idle => "IDLE",
            MotionState::MovingUp => "MOVING_UP",
            MotionState::MovingDown => "MOVING_DOWN",
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            MotionState::Idle => None,
            MotionState::MovingUp => Some(Direction::Up),
            MotionState::MovingDown => Some(Direction::Down),
        }
    }

    fn towards(direction: Direction) -> Self {
        match direction {
            Direction::Up => MotionState::MovingUp,
            Direction::Down => MotionState::MovingDown,
        }
    }
}

/// What became of a stop handed to `assign_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The car stands at the floor and announced its arrival right away.
    AnnouncedHere,
    /// The car is at the floor but its doors are busy or an arrival is
    /// already waiting to be served, nothing was changed.
    AlreadyHere,
    /// An equivalent stop is already pending.
    Duplicate,
    Queued,
}

/// Bookkeeping for the last floor reached.
#[derive(Debug, Clone, Copy, Default)]
struct Arrival {
    at: Option<SimTime>,
    announced: bool,
    serviced: bool,
    /// Open the doors even if the floor is not among the stops.
    requested: bool,
}

impl Arrival {
    fn reached(now: SimTime) -> Self {
        Arrival { at: Some(now), ..Arrival::default() }
    }

    fn requested_here(now: SimTime) -> Self {
        Arrival {
            at: Some(now),
            announced: true,
            serviced: false,
            requested: true,
        }
    }

    fn awaiting_announcement(&self) -> bool {
        self.at.is_some() && !self.announced
    }

    fn awaiting_service(&self) -> bool {
        self.at.is_some() && self.announced && !self.serviced
    }
}

#[derive(Debug, Clone)]
pub struct Car {
    id: CarId,
    elevator: ElevatorConfig,
    timings: TimingsConfig,
    current_floor: Floor,
    previous_floor: Floor,
    motion: MotionState,
    door: Door,
    stops: StopList,
    direction: Option<Direction>,
    arrival: Arrival,
    floor_changed: bool,
    moving_since: Option<SimTime>,
    last_state_change: SimTime,
}

impl Car {
    pub fn new(id: CarId, elevator: &ElevatorConfig, timings: &TimingsConfig, now: SimTime) -> Self {
        Car {
            id,
            elevator: elevator.clone(),
            timings: timings.clone(),
            current_floor: elevator.home_floor,
            previous_floor: elevator.home_floor,
            motion: MotionState::Idle,
            door: Door::new(now),
            stops: StopList::new(),
            direction: None,
            arrival: Arrival::default(),
            floor_changed: false,
            moving_since: None,
            last_state_change: now,
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn previous_floor(&self) -> Floor {
        self.previous_floor
    }

    pub fn motion(&self) -> MotionState {
        self.motion
    }

    pub fn door(&self) -> DoorState {
        self.door.state()
    }

    pub fn stops(&self) -> &StopList {
        &self.stops
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Idle, doors closed, nothing to do and no arrival waiting for its
    /// doors. Only such cars take new hall calls.
    pub fn is_available(&self) -> bool {
        self.motion == MotionState::Idle
            && self.door.is_closed()
            && self.stops.is_empty()
            && !self.arrival.awaiting_service()
    }

    /// Nominal time until this car could open its doors at `floor`.
    pub fn estimated_time(&self, floor: Floor) -> Duration {
        eta::estimated_time(self, floor, &self.timings)
    }

    /// Hands a stop to the car. Announcements made immediately are pushed
    /// to `events`. `prefix` is the direction announced when the car is
    /// already standing at the floor.
    pub fn assign_stop(
        &mut self,
        stop: Stop,
        prefix: Option<Direction>,
        now: SimTime,
        events: &mut Vec<Event>,
    ) -> StopOutcome {
        if stop.floor == self.current_floor && self.motion == MotionState::Idle {
            if !self.door.is_closed() || self.arrival.awaiting_service() {
                return StopOutcome::AlreadyHere;
            }
            events.push(Event::FloorArrived {
                car: self.id,
                floor: self.current_floor,
                direction: prefix,
            });
            self.arrival = Arrival::requested_here(now);
            debug!("Car {} already at floor {}, doors open after dwell", self.id, self.current_floor);
            return StopOutcome::AnnouncedHere;
        }

        if !self.stops.push(stop) {
            return StopOutcome::Duplicate;
        }
        self.stops.reorder(self.current_floor, &mut self.direction);
        if self.door.begin_closing(now) {
            debug!("Car {} closing doors for new stop at floor {}", self.id, stop.floor);
        }
        trace!("Car {} stops {:?}", self.id, self.stops.floors());
        StopOutcome::Queued
    }

    /// Opens the doors of an idle car. If an arrival is waiting for its
    /// doors it is served right away.
    pub fn open_door(&mut self, now: SimTime, ledger: &mut dyn CallLedger) -> bool {
        if self.motion != MotionState::Idle || !self.door.is_closed() {
            return false;
        }
        if self.arrival.awaiting_service() {
            self.serve_arrival(now, ledger);
            return true;
        }
        self.door.begin_opening(now)
    }

    pub fn close_door(&mut self, now: SimTime) -> bool {
        self.door.begin_closing(now)
    }

    /// Returns the car to its home floor with nothing pending.
    pub fn reset(&mut self, now: SimTime) {
        self.current_floor = self.elevator.home_floor;
        self.previous_floor = self.elevator.home_floor;
        self.motion = MotionState::Idle;
        self.door.reset(now);
        self.stops.clear();
        self.direction = None;
        self.arrival = Arrival::default();
        self.floor_changed = false;
        self.moving_since = None;
        self.last_state_change = now;
    }

    /// Advances the car to `now`.
    pub fn step(&mut self, now: SimTime, ledger: &mut dyn CallLedger, events: &mut Vec<Event>) {
        if self.floor_changed {
            self.floor_changed = false;
            self.arrival = Arrival::reached(now);
        }

        self.announce_arrival(now, events);
        self.travel(now);
        self.serve_floor(now, ledger);
        self.door.auto_close(now, self.timings.door_dwell());
        self.resume(now, ledger);

        match self.door.advance(now, self.timings.door_operation()) {
            Some(DoorEvent::Opened) => events.push(Event::DoorOpened { car: self.id }),
            Some(DoorEvent::Closed) => {
                events.push(Event::DoorClosed { car: self.id });
                self.last_state_change = now;
            }
            None => {}
        }
    }

    fn announce_arrival(&mut self, now: SimTime, events: &mut Vec<Event>) {
        let Some(at) = self.arrival.at else { return };
        if !self.arrival.awaiting_announcement() || elapsed(now, at) < self.timings.announce_settle() {
            return;
        }
        events.push(Event::FloorArrived {
            car: self.id,
            floor: self.current_floor,
            direction: self.motion.direction(),
        });
        self.arrival.announced = true;

        self.stops.reorder(self.current_floor, &mut self.direction);
        self.stops.promote(self.current_floor);
        match self.stops.head().map(|stop| stop.floor) {
            Some(floor) if floor == self.current_floor => {
                debug!("Car {} stopping at floor {}", self.id, floor);
                self.stop_moving(now);
            }
            Some(floor) => {
                if let Some(direction) = Direction::between(self.current_floor, floor) {
                    let motion = MotionState::towards(direction);
                    if motion != self.motion {
                        self.motion = motion;
                        self.moving_since = Some(now);
                        self.last_state_change = now;
                    }
                }
            }
            None => self.stop_moving(now),
        }
    }

    fn travel(&mut self, now: SimTime) {
        let (Some(direction), Some(since)) = (self.motion.direction(), self.moving_since) else {
            return;
        };
        if self.arrival.awaiting_announcement() {
            return;
        }
        let Some(next) = self.elevator.next_floor(self.current_floor, direction.step()) else {
            warn!(
                "Car {} cannot move {} from floor {}, stopping",
                self.id, direction, self.current_floor
            );
            self.stop_moving(now);
            return;
        };
        let floors = (next - self.current_floor).unsigned_abs();
        if elapsed(now, since) >= self.timings.floor_travel() * floors {
            trace!("Car {} passed from floor {} to {}", self.id, self.current_floor, next);
            self.previous_floor = self.current_floor;
            self.current_floor = next;
            self.moving_since = Some(now);
            self.floor_changed = true;
        }
    }

    fn serve_floor(&mut self, now: SimTime, ledger: &mut dyn CallLedger) {
        let Some(at) = self.arrival.at else { return };
        if !self.arrival.awaiting_service()
            || self.motion != MotionState::Idle
            || !self.door.is_closed()
            || elapsed(now, at) < self.timings.arrival_dwell()
        {
            return;
        }
        if self.stops.contains_floor(self.current_floor) || self.stops.is_empty() || self.arrival.requested {
            self.serve_arrival(now, ledger);
        } else {
            debug!("Car {} has nothing to serve at floor {}", self.id, self.current_floor);
            self.arrival.serviced = true;
        }
    }

    fn serve_arrival(&mut self, now: SimTime, ledger: &mut dyn CallLedger) {
        self.door.begin_opening(now);
        self.arrival.serviced = true;
        self.arrival.requested = false;
        let removed = self.stops.remove_floor(self.current_floor);
        let served = ledger.complete_calls_at(self.id, self.current_floor);
        debug!(
            "Car {} serving floor {}: {} stop(s), hall calls {:?}",
            self.id,
            self.current_floor,
            removed.len(),
            served
        );
        self.stops.reorder(self.current_floor, &mut self.direction);
        self.last_state_change = now;
    }

    fn resume(&mut self, now: SimTime, ledger: &mut dyn CallLedger) {
        if self.motion != MotionState::Idle
            || !self.door.is_closed()
            || self.stops.is_empty()
            || self.arrival.awaiting_service()
            || elapsed(now, self.last_state_change) < self.timings.post_close_hold()
        {
            return;
        }
        self.stops.reorder(self.current_floor, &mut self.direction);
        let Some(head) = self.stops.head().map(|stop| stop.floor) else { return };
        match Direction::between(self.current_floor, head) {
            Some(direction) => {
                debug!("Car {} leaving floor {} for floor {}", self.id, self.current_floor, head);
                self.motion = MotionState::towards(direction);
                self.moving_since = Some(now);
                self.last_state_change = now;
            }
            None => self.serve_arrival(now, ledger),
        }
    }

    fn stop_moving(&mut self, now: SimTime) {
        self.motion = MotionState::Idle;
        self.moving_since = None;
        self.last_state_change = now;
    }
}
