use shared_resources::call::{CallId, Direction, Floor};

/// A floor a car has committed to visit. Stops carrying a call id were
/// bound from a hall call, the others were selected inside the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub floor: Floor,
    pub call: Option<CallId>,
}

impl Stop {
    pub fn inside(floor: Floor) -> Self {
        Stop { floor, call: None }
    }

    pub fn outside(floor: Floor, call: CallId) -> Self {
        Stop { floor, call: Some(call) }
    }

    pub fn is_outside(&self) -> bool {
        self.call.is_some()
    }

    /// Same hall call, or the same inside selection.
    fn duplicates(&self, other: &Stop) -> bool {
        match (self.call, other.call) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.floor == other.floor,
            _ => false,
        }
    }
}

/// Ordered list of pending stops. The head is the floor the car is
/// currently heading for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopList {
    stops: Vec<Stop>,
}

impl StopList {
    pub fn new() -> Self {
        StopList { stops: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn head(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    pub fn floors(&self) -> Vec<Floor> {
        self.stops.iter().map(|stop| stop.floor).collect()
    }

    pub fn contains_floor(&self, floor: Floor) -> bool {
        self.stops.iter().any(|stop| stop.floor == floor)
    }

    pub fn contains(&self, stop: &Stop) -> bool {
        self.stops.iter().any(|existing| existing.duplicates(stop))
    }

    /// Appends `stop` unless an equivalent one is already pending.
    pub fn push(&mut self, stop: Stop) -> bool {
        if self.contains(&stop) {
            return false;
        }
        self.stops.push(stop);
        true
    }

    /// Removes and returns every stop at `floor`.
    pub fn remove_floor(&mut self, floor: Floor) -> Vec<Stop> {
        let (removed, kept) = self.stops.drain(..).partition(|stop| stop.floor == floor);
        self.stops = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.stops.clear();
    }

    /// Moves the stops at `floor` to the front, keeping relative order.
    pub fn promote(&mut self, floor: Floor) {
        let (mut here, rest): (Vec<Stop>, Vec<Stop>) =
            self.stops.drain(..).partition(|stop| stop.floor == floor);
        here.extend(rest);
        self.stops = here;
    }

    /// Recomputes the committed direction from `current` and re-sorts the
    /// list in SCAN order for it.
    pub fn reorder(&mut self, current: Floor, direction: &mut Option<Direction>) {
        *direction = next_direction(&self.stops, current, *direction);
        if let Some(direction) = *direction {
            scan_order(&mut self.stops, current, direction);
        }
    }
}

impl<'a> IntoIterator for &'a StopList {
    type Item = &'a Stop;
    type IntoIter = std::slice::Iter<'a, Stop>;

    fn into_iter(self) -> Self::IntoIter {
        self.stops.iter()
    }
}

/// Keeps `last` while some stop lies strictly ahead in it, otherwise turns
/// toward the nearest stop with ties going up. `None` when no stop lies
/// away from `current`.
pub fn next_direction(stops: &[Stop], current: Floor, last: Option<Direction>) -> Option<Direction> {
    let nearest_above = stops.iter().map(|stop| stop.floor).filter(|&floor| floor > current).min();
    let nearest_below = stops.iter().map(|stop| stop.floor).filter(|&floor| floor < current).max();
    match (last, nearest_above, nearest_below) {
        (Some(Direction::Up), Some(_), _) => Some(Direction::Up),
        (Some(Direction::Down), _, Some(_)) => Some(Direction::Down),
        (_, Some(above), Some(below)) => {
            if above - current <= current - below {
                Some(Direction::Up)
            } else {
                Some(Direction::Down)
            }
        }
        (_, Some(_), None) => Some(Direction::Up),
        (_, None, Some(_)) => Some(Direction::Down),
        (_, None, None) => None,
    }
}

/// Going up: floors above `current` ascending, then the rest ascending.
/// Going down: floors below `current` descending, then the rest ascending.
/// Stops at the same floor keep their relative order.
pub fn scan_order(stops: &mut Vec<Stop>, current: Floor, direction: Direction) {
    let (mut ahead, mut behind): (Vec<Stop>, Vec<Stop>) = stops.drain(..).partition(|stop| match direction {
        Direction::Up => stop.floor > current,
        Direction::Down => stop.floor < current,
    });
    match direction {
        Direction::Up => ahead.sort_by_key(|stop| stop.floor),
        Direction::Down => ahead.sort_by_key(|stop| std::cmp::Reverse(stop.floor)),
    }
    behind.sort_by_key(|stop| stop.floor);
    stops.extend(ahead);
    stops.extend(behind);
}
