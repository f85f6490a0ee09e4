//! Foundation utilities shared across the subsystem

pub mod logging;
pub mod math;
