//! Home security controller library.
//!
//! Tracks sensors, an arming mode and an alarm status, and derives alarm
//! transitions from sensor edges and camera-frame verdicts. Storage and
//! image analysis are injected ports so the state machine can run against
//! real or simulated collaborators.

pub mod config;
pub mod error;
pub mod image;
pub mod input;
pub mod repository;
pub mod security;
