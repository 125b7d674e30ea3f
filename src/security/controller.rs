//! Alarm state machine.
//!
//! [`AlarmController`] derives alarm-status transitions from three kinds of
//! events: sensor edges, camera-frame verdicts and arming changes. It owns
//! no durable state; every operation reads and writes through the injected
//! [`SecurityRepository`].
//!
//! ```text
//!  sensor edge ──┐
//!  frame verdict ├─▶ AlarmController ──▶ SecurityRepository
//!  arming change ┘          │
//!                           └──────────▶ StatusListener(s)
//! ```
//!
//! Each operation runs its read-modify-write under one lock, then notifies
//! listeners after the lock is released.

use super::listener::StatusListener;
use super::{AlarmStatus, ArmingStatus, Sensor};
use crate::error::Result;
use crate::image::{CameraFrame, ImageAnalyzer};
use crate::repository::SecurityRepository;
use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Minimum confidence (percent) for a frame to count as containing a cat.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 50.0;

/// A change to announce once the operation has been persisted.
enum Notification {
    Alarm(AlarmStatus),
    Sensor(Sensor),
    CatDetected(bool),
}

pub struct AlarmController {
    repository: Arc<dyn SecurityRepository>,
    analyzer: Arc<dyn ImageAnalyzer>,
    confidence_threshold: f32,
    listeners: RwLock<Vec<Arc<dyn StatusListener>>>,
    /// Verdict of the most recently processed frame.
    cat_detected: AtomicBool,
    /// Serializes the read-modify-write of each operation.
    operation: Mutex<()>,
}

impl AlarmController {
    pub fn new(repository: Arc<dyn SecurityRepository>, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        Self {
            repository,
            analyzer,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            listeners: RwLock::new(Vec::new()),
            cat_detected: AtomicBool::new(false),
            operation: Mutex::new(()),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    // ── Listeners ─────────────────────────────────────────────

    pub fn add_status_listener(&self, listener: Arc<dyn StatusListener>) {
        self.listeners.write().push(listener);
    }

    /// Deregister a listener previously passed to `add_status_listener`.
    pub fn remove_status_listener(&self, listener: &Arc<dyn StatusListener>) {
        self.listeners
            .write()
            .retain(|l| !std::ptr::addr_eq(Arc::as_ptr(l), Arc::as_ptr(listener)));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    // ── Sensors ───────────────────────────────────────────────

    pub fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        let _guard = self.operation.lock();
        self.repository.add_sensor(sensor)
    }

    pub fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        let _guard = self.operation.lock();
        self.repository.remove_sensor(sensor)
    }

    pub fn sensors(&self) -> Result<Vec<Sensor>> {
        self.repository.sensors()
    }

    /// Apply a sensor edge and update the alarm status accordingly.
    ///
    /// The edge runs from `sensor`'s current flag to `active`. On return the
    /// sensor's flag has been updated and persisted.
    pub fn change_sensor_activation_status(&self, sensor: &mut Sensor, active: bool) -> Result<()> {
        self.apply(|notifications| {
            let current = self.repository.alarm_status()?;
            let was_active = sensor.is_active();

            let next = match (current, was_active, active) {
                // Sensors can neither raise nor clear a full alarm.
                (AlarmStatus::Alarm, _, _) => None,
                (AlarmStatus::NoAlarm, false, true) => Some(AlarmStatus::PendingAlarm),
                (AlarmStatus::PendingAlarm, false, true) => Some(AlarmStatus::Alarm),
                (AlarmStatus::PendingAlarm, true, false) => {
                    if self.any_other_sensor_active(sensor)? {
                        None
                    } else {
                        Some(AlarmStatus::NoAlarm)
                    }
                }
                _ => None,
            };

            sensor.set_active(active);
            self.repository.update_sensor(sensor)?;
            let sensor_at = notifications.len();
            notifications.push(Notification::Sensor(sensor.clone()));

            match next {
                Some(next) => {
                    info!(
                        "Sensor '{}' {} -> {}: alarm {} -> {}",
                        sensor.name(),
                        was_active,
                        active,
                        current,
                        next
                    );
                    self.repository.set_alarm_status(next)?;
                    // Alarm changes are announced ahead of the sensor that caused them.
                    notifications.insert(sensor_at, Notification::Alarm(next));
                }
                None => debug!(
                    "Sensor '{}' {} -> {}: alarm stays {}",
                    sensor.name(),
                    was_active,
                    active,
                    current
                ),
            }
            Ok(())
        })
    }

    // ── Camera ────────────────────────────────────────────────

    /// Analyze a camera frame and force the alarm status if the verdict
    /// demands it.
    ///
    /// A cat while armed at home raises the alarm. No cat while no sensor
    /// is active clears it, including a full alarm.
    pub fn process_image(&self, frame: &CameraFrame) -> Result<()> {
        let cat_detected = self
            .analyzer
            .contains_cat(frame, self.confidence_threshold)?;

        self.apply(|notifications| {
            self.cat_detected.store(cat_detected, Ordering::SeqCst);
            notifications.push(Notification::CatDetected(cat_detected));

            if cat_detected {
                if self.repository.arming_status()? == ArmingStatus::ArmedHome {
                    self.force_alarm_status(AlarmStatus::Alarm, notifications)?;
                }
            } else if !self.any_sensor_active()? {
                self.force_alarm_status(AlarmStatus::NoAlarm, notifications)?;
            }
            Ok(())
        })
    }

    /// Verdict of the most recently processed frame.
    pub fn cat_detected(&self) -> bool {
        self.cat_detected.load(Ordering::SeqCst)
    }

    // ── Statuses ──────────────────────────────────────────────

    /// Change the arming mode.
    ///
    /// Disarming always clears the alarm. Arming resets every sensor to
    /// inactive; arming at home while the last frame showed a cat raises
    /// the alarm.
    pub fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.apply(|notifications| {
            match status {
                ArmingStatus::Disarmed => {
                    self.force_alarm_status(AlarmStatus::NoAlarm, notifications)?;
                }
                ArmingStatus::ArmedHome | ArmingStatus::ArmedAway => {
                    for mut sensor in self.repository.sensors()? {
                        let was_active = sensor.is_active();
                        sensor.set_active(false);
                        self.repository.update_sensor(&sensor)?;
                        if was_active {
                            notifications.push(Notification::Sensor(sensor));
                        }
                    }
                    if status == ArmingStatus::ArmedHome && self.cat_detected() {
                        self.force_alarm_status(AlarmStatus::Alarm, notifications)?;
                    }
                }
            }
            self.repository.set_arming_status(status)?;
            info!("Arming status set to {}", status.description());
            Ok(())
        })
    }

    pub fn arming_status(&self) -> Result<ArmingStatus> {
        self.repository.arming_status()
    }

    pub fn alarm_status(&self) -> Result<AlarmStatus> {
        self.repository.alarm_status()
    }

    // ── Internals ─────────────────────────────────────────────

    /// Run `op` under the operation lock, then announce every change it
    /// recorded.
    ///
    /// Notifications are delivered even when `op` fails part way: each one
    /// is recorded only after its write succeeded, so listeners hear about
    /// exactly the changes that reached the repository.
    fn apply<F>(&self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Notification>) -> Result<()>,
    {
        let mut notifications = Vec::new();
        let result = {
            let _guard = self.operation.lock();
            op(&mut notifications)
        };
        if let Err(e) = &result {
            warn!(
                "Operation failed after {} persisted change(s): {}",
                notifications.len(),
                e
            );
        }
        self.notify(notifications);
        result
    }

    /// Persist `status` unconditionally; announce it only if it differs
    /// from the stored value.
    fn force_alarm_status(
        &self,
        status: AlarmStatus,
        notifications: &mut Vec<Notification>,
    ) -> Result<()> {
        let current = self.repository.alarm_status()?;
        self.repository.set_alarm_status(status)?;
        if current != status {
            info!("Alarm status {} -> {}", current, status);
            notifications.push(Notification::Alarm(status));
        }
        Ok(())
    }

    fn any_sensor_active(&self) -> Result<bool> {
        Ok(self.repository.sensors()?.iter().any(Sensor::is_active))
    }

    fn any_other_sensor_active(&self, sensor: &Sensor) -> Result<bool> {
        Ok(self
            .repository
            .sensors()?
            .iter()
            .any(|s| s != sensor && s.is_active()))
    }

    fn notify(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        // Snapshot so listeners may (de)register listeners while notified.
        let listeners = self.listeners.read().clone();
        for notification in &notifications {
            for listener in &listeners {
                match notification {
                    Notification::Alarm(status) => listener.on_alarm_status_changed(*status),
                    Notification::Sensor(sensor) => listener.on_sensor_status_changed(sensor),
                    Notification::CatDetected(cat) => listener.on_cat_detected(*cat),
                }
            }
        }
    }
}
