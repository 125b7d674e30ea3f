//! Simulated inputs for running the controller without hardware.

mod sensors;

pub use sensors::{run_security_simulation, simulate_tick};
