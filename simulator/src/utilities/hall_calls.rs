use log::debug;

use shared_resources::call::{CallId, CarId, Direction, Floor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Pending,
    Assigned,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallCall {
    pub id: CallId,
    pub floor: Floor,
    pub direction: Direction,
    pub state: CallState,
    pub assigned_car: Option<CarId>,
}

impl HallCall {
    pub fn is_outstanding(&self) -> bool {
        self.state != CallState::Completed
    }
}

/// Completes the hall calls a car serves when its doors begin opening.
pub trait CallLedger {
    /// Marks every call assigned to `car` at `floor` completed and returns
    /// the directions that were served.
    fn complete_calls_at(&mut self, car: CarId, floor: Floor) -> Vec<Direction>;
}

/// Outstanding hall calls in insertion order.
#[derive(Debug, Clone, Default)]
pub struct HallCalls {
    calls: Vec<HallCall>,
    next_id: u64,
}

impl HallCalls {
    pub fn new() -> Self {
        HallCalls::default()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HallCall> {
        self.calls.iter()
    }

    pub fn get(&self, id: CallId) -> Option<&HallCall> {
        self.calls.iter().find(|call| call.id == id)
    }

    /// The pending or assigned call for `(floor, direction)`, if any.
    pub fn outstanding(&self, floor: Floor, direction: Direction) -> Option<&HallCall> {
        self.calls
            .iter()
            .find(|call| call.floor == floor && call.direction == direction && call.is_outstanding())
    }

    pub fn insert_pending(&mut self, floor: Floor, direction: Direction) -> CallId {
        self.next_id += 1;
        let id = CallId(self.next_id);
        self.calls.push(HallCall {
            id,
            floor,
            direction,
            state: CallState::Pending,
            assigned_car: None,
        });
        id
    }

    pub fn pending(&self) -> Vec<CallId> {
        self.calls
            .iter()
            .filter(|call| call.state == CallState::Pending)
            .map(|call| call.id)
            .collect()
    }

    /// Binds a pending call to `car`. Returns the bound call.
    pub fn assign(&mut self, id: CallId, car: CarId) -> Option<&HallCall> {
        let call = self
            .calls
            .iter_mut()
            .find(|call| call.id == id && call.state == CallState::Pending)?;
        call.state = CallState::Assigned;
        call.assigned_car = Some(car);
        Some(call)
    }

    /// Forgets every call. Identifiers keep counting so they stay unique
    /// for the whole run.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl CallLedger for HallCalls {
    fn complete_calls_at(&mut self, car: CarId, floor: Floor) -> Vec<Direction> {
        let mut served = Vec::new();
        for call in self.calls.iter_mut() {
            if call.state == CallState::Assigned && call.assigned_car == Some(car) && call.floor == floor {
                call.state = CallState::Completed;
                debug!("{} ({} at floor {}) completed by car {}", call.id, call.direction, floor, car);
                served.push(call.direction);
            }
        }
        self.calls.retain(HallCall::is_outstanding);
        served
    }
}
