/// ----- DOORS MODULE -----
/// Door of a single car. Opening and closing take the door operation time,
/// an open door closes by itself once it has dwelt long enough.

use std::time::Duration;

use crate::utilities::clock::{elapsed, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl DoorState {
    pub fn as_str(self) -> &'static str {
        match self {
            DoorState::Closed => "CLOSED",
            DoorState::Opening => "OPENING",
            DoorState::Open => "OPEN",
            DoorState::Closing => "CLOSING",
        }
    }
}

/// Completed door movements, reported once each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEvent {
    Opened,
    Closed,
}

#[derive(Debug, Clone)]
pub struct Door {
    state: DoorState,
    changed_at: SimTime,
    opened_at: Option<SimTime>,
}

impl Door {
    pub fn new(now: SimTime) -> Self {
        Door {
            state: DoorState::Closed,
            changed_at: now,
            opened_at: None,
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == DoorState::Closed
    }

    pub fn begin_opening(&mut self, now: SimTime) -> bool {
        if self.state != DoorState::Closed {
            return false;
        }
        self.state = DoorState::Opening;
        self.changed_at = now;
        true
    }

    pub fn begin_closing(&mut self, now: SimTime) -> bool {
        if self.state != DoorState::Open {
            return false;
        }
        self.state = DoorState::Closing;
        self.changed_at = now;
        true
    }

    /// Starts closing an open door that has dwelt for `dwell`.
    pub fn auto_close(&mut self, now: SimTime, dwell: Duration) -> bool {
        match self.opened_at {
            Some(opened_at) if self.state == DoorState::Open && elapsed(now, opened_at) >= dwell => {
                self.begin_closing(now)
            }
            _ => false,
        }
    }

    /// Finishes a movement that has taken `operation` time.
    pub fn advance(&mut self, now: SimTime, operation: Duration) -> Option<DoorEvent> {
        if elapsed(now, self.changed_at) < operation {
            return None;
        }
        match self.state {
            DoorState::Opening => {
                self.state = DoorState::Open;
                self.changed_at = now;
                self.opened_at = Some(now);
                Some(DoorEvent::Opened)
            }
            DoorState::Closing => {
                self.state = DoorState::Closed;
                self.changed_at = now;
                self.opened_at = None;
                Some(DoorEvent::Closed)
            }
            DoorState::Closed | DoorState::Open => None,
        }
    }

    pub fn reset(&mut self, now: SimTime) {
        *self = Door::new(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERATION: Duration = Duration::from_secs(1);
    const DWELL: Duration = Duration::from_secs(3);

    fn at(millis: u64) -> SimTime {
        Duration::from_millis(millis)
    }

    #[test]
    fn full_cycle() {
        let mut door = Door::new(at(0));
        assert!(door.begin_opening(at(0)));
        assert_eq!(door.advance(at(990), OPERATION), None);
        assert_eq!(door.advance(at(1000), OPERATION), Some(DoorEvent::Opened));
        assert_eq!(door.state(), DoorState::Open);
        assert!(!door.auto_close(at(3990), DWELL));
        assert!(door.auto_close(at(4000), DWELL));
        assert_eq!(door.advance(at(4500), OPERATION), None);
        assert_eq!(door.advance(at(5000), OPERATION), Some(DoorEvent::Closed));
        assert!(door.is_closed());
        assert_eq!(door.advance(at(9000), OPERATION), None);
    }

    #[test]
    fn only_legal_movements_start() {
        let mut door = Door::new(at(0));
        assert!(!door.begin_closing(at(0)));
        assert!(door.begin_opening(at(0)));
        assert!(!door.begin_opening(at(10)));
        assert!(!door.begin_closing(at(10)));
        door.advance(at(1000), OPERATION);
        assert!(door.begin_closing(at(1200)));
        assert_eq!(door.state(), DoorState::Closing);
    }
}
