pub mod clock;
pub mod debug;
pub mod elevator_status;
pub mod eta;
pub mod hall_calls;
pub mod stops;
