//! Discrete-time simulator for a group of elevator cars sharing one shaft
//! layout, driven by a line-oriented text protocol.

pub mod modules;
pub mod utilities;

#[cfg(test)]
mod tests;
