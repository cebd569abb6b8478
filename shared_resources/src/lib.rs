//! Types shared between the simulator core, its transport glue and any
//! consumer of the text protocol: floors, cars, directions, the inbound
//! command grammar, the outbound event grammar and the configuration file.

pub mod call;
pub mod config;
pub mod elevator_message;
pub mod error;
pub mod request;
