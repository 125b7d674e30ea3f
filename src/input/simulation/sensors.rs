//! Sensor and camera simulation for testing.
//!
//! Provides simulated sensor edges and camera frames for development and
//! testing purposes, driving the controller the same way real inputs would.

use crate::error::Result;
use crate::image::CameraFrame;
use crate::security::AlarmController;
use log::{info, warn};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

const FRAME_WIDTH: u32 = 64;
const FRAME_HEIGHT: u32 = 48;

/// Run one simulation step: toggle a random sensor, then analyze a frame.
///
/// Does nothing to sensors if none are registered; a frame is still
/// analyzed.
pub fn simulate_tick(controller: &AlarmController) -> Result<()> {
    let sensors = controller.sensors()?;
    let picked = sensors.choose(&mut rand::thread_rng()).cloned();
    if let Some(mut sensor) = picked {
        let active = !sensor.is_active();
        controller.change_sensor_activation_status(&mut sensor, active)?;
        info!(
            "[Sim] {} sensor '{}' toggled to: {}",
            sensor.sensor_type(),
            sensor.name(),
            active
        );
    }

    controller.process_image(&CameraFrame::blank(FRAME_WIDTH, FRAME_HEIGHT))?;
    info!(
        "[Sim] Frame analyzed, alarm is {}",
        controller.alarm_status()?.description()
    );
    Ok(())
}

/// Spawn a task that runs [`simulate_tick`] every `period`.
///
/// Failures are logged and the simulation keeps going.
///
/// # Returns
///
/// A `JoinHandle` that can be used to abort the simulation task.
pub fn run_security_simulation(controller: Arc<AlarmController>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            if let Err(e) = simulate_tick(&controller) {
                warn!("[Sim] Simulation step failed: {}", e);
            }
        }
    })
}
