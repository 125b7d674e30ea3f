//! Status listeners notified by the [`AlarmController`](super::AlarmController).
//!
//! Listeners are invoked synchronously after the triggering change has been
//! persisted. They cannot fail: a listener that needs to report a problem
//! must log it itself.

use super::{AlarmStatus, Sensor};
use chrono::{DateTime, Utc};
use log::info;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Receives alarm, sensor and camera notifications.
pub trait StatusListener: Send + Sync {
    /// The alarm status changed to `status`.
    fn on_alarm_status_changed(&self, status: AlarmStatus);

    /// A sensor's active flag was updated.
    fn on_sensor_status_changed(&self, sensor: &Sensor);

    /// A camera frame was analyzed. Called for every frame, not only on change.
    fn on_cat_detected(&self, _cat_detected: bool) {}
}

/// Listener that writes every notification to the log.
#[derive(Debug, Default)]
pub struct LoggingListener;

impl StatusListener for LoggingListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        info!("[Security] Alarm status: {}", status.description());
    }

    fn on_sensor_status_changed(&self, sensor: &Sensor) {
        info!(
            "[Security] {} sensor '{}' is now {}",
            sensor.sensor_type(),
            sensor.name(),
            if sensor.is_active() { "active" } else { "inactive" }
        );
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        if cat_detected {
            info!("[Security] DANGER - CAT DETECTED");
        }
    }
}

/// A notification recorded by [`HistoryListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    AlarmChanged(AlarmStatus),
    SensorChanged { sensor: Sensor, active: bool },
    FrameAnalyzed { cat_detected: bool },
}

/// Listener that keeps the most recent notifications in memory.
///
/// Oldest entries are dropped once `capacity` is reached.
/// Slots reserved up front; larger histories grow on demand.
const PREALLOCATED_EVENTS: usize = 64;

pub struct HistoryListener {
    capacity: usize,
    events: Mutex<VecDeque<(DateTime<Utc>, StatusEvent)>>,
}

impl HistoryListener {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity.min(PREALLOCATED_EVENTS))),
        }
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Recorded events with the time they were received, oldest first.
    pub fn timeline(&self) -> Vec<(DateTime<Utc>, StatusEvent)> {
        self.events.lock().iter().cloned().collect()
    }

    /// Alarm statuses in the order they were announced.
    pub fn alarm_changes(&self) -> Vec<AlarmStatus> {
        self.events
            .lock()
            .iter()
            .filter_map(|(_, e)| match e {
                StatusEvent::AlarmChanged(status) => Some(*status),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: StatusEvent) {
        if self.capacity == 0 {
            return;
        }
        let mut events = self.events.lock();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back((Utc::now(), event));
    }
}

impl StatusListener for HistoryListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        self.record(StatusEvent::AlarmChanged(status));
    }

    fn on_sensor_status_changed(&self, sensor: &Sensor) {
        self.record(StatusEvent::SensorChanged {
            sensor: sensor.clone(),
            active: sensor.is_active(),
        });
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        self.record(StatusEvent::FrameAnalyzed { cat_detected });
    }
}
