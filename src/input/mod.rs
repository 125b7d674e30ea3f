//! Input sources feeding the alarm controller.
//!
//! Current input sources:
//! - `simulation`: periodic random sensor edges and synthetic camera frames
//!
//! Real sensor and camera integrations plug in the same way, by calling
//! the [`AlarmController`](crate::security::AlarmController) operations.

pub mod simulation;
