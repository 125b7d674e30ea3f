//! Recording collaborators for controller integration tests.
//!
//! [`RecordingRepository`] answers status reads from fixed stubs and logs
//! every write, so tests can assert on the exact sequence of persisted
//! changes.

use home_security::error::{Result, SecurityError};
use home_security::image::{CameraFrame, ImageAnalyzer};
use home_security::repository::SecurityRepository;
use home_security::security::{AlarmStatus, ArmingStatus, Sensor, StatusListener};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Repository call record ────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RepoCall {
    SetArming(ArmingStatus),
    SetAlarm(AlarmStatus),
    AddSensor(Sensor),
    RemoveSensor(Sensor),
    UpdateSensor { sensor: Sensor, active: bool },
}

// ── RecordingRepository ───────────────────────────────────────

pub struct RecordingRepository {
    arming: Mutex<ArmingStatus>,
    alarm: Mutex<AlarmStatus>,
    sensors: Mutex<Vec<Sensor>>,
    /// Whether writes are reflected by later reads.
    stateful: bool,
    fail_writes: AtomicBool,
    fail_alarm_writes: AtomicBool,
    /// Sensor updates left before `update_sensor` starts failing.
    sensor_updates_left: Mutex<Option<usize>>,
    pub calls: Mutex<Vec<RepoCall>>,
}

#[allow(dead_code)]
impl RecordingRepository {
    /// Reads always return the stubbed values, whatever was written.
    pub fn stubbed(arming: ArmingStatus, alarm: AlarmStatus) -> Self {
        Self::build(arming, alarm, false)
    }

    /// Reads observe earlier writes.
    pub fn stateful(arming: ArmingStatus, alarm: AlarmStatus) -> Self {
        Self::build(arming, alarm, true)
    }

    fn build(arming: ArmingStatus, alarm: AlarmStatus, stateful: bool) -> Self {
        Self {
            arming: Mutex::new(arming),
            alarm: Mutex::new(alarm),
            sensors: Mutex::new(Vec::new()),
            stateful,
            fail_writes: AtomicBool::new(false),
            fail_alarm_writes: AtomicBool::new(false),
            sensor_updates_left: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_sensors(self, sensors: Vec<Sensor>) -> Self {
        *self.sensors.lock() = sensors;
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only alarm-status writes.
    pub fn fail_alarm_writes(&self, fail: bool) {
        self.fail_alarm_writes.store(fail, Ordering::SeqCst);
    }

    /// Let `count` sensor updates through, then fail the rest.
    pub fn fail_sensor_updates_after(&self, count: usize) {
        *self.sensor_updates_left.lock() = Some(count);
    }

    pub fn alarm_sets(&self) -> Vec<AlarmStatus> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RepoCall::SetAlarm(status) => Some(*status),
                _ => None,
            })
            .collect()
    }

    pub fn times_alarm_set(&self, status: AlarmStatus) -> usize {
        self.alarm_sets().iter().filter(|s| **s == status).count()
    }

    pub fn stored_sensors(&self) -> Vec<Sensor> {
        self.sensors.lock().clone()
    }

    fn write(&self, call: RepoCall) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SecurityError::Repository("storage offline".to_string()));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl SecurityRepository for RecordingRepository {
    fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(*self.arming.lock())
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.write(RepoCall::SetArming(status))?;
        if self.stateful {
            *self.arming.lock() = status;
        }
        Ok(())
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(*self.alarm.lock())
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        if self.fail_alarm_writes.load(Ordering::SeqCst) {
            return Err(SecurityError::Repository("alarm store offline".to_string()));
        }
        self.write(RepoCall::SetAlarm(status))?;
        if self.stateful {
            *self.alarm.lock() = status;
        }
        Ok(())
    }

    fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.sensors.lock().clone())
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.write(RepoCall::AddSensor(sensor.clone()))?;
        let mut sensors = self.sensors.lock();
        if !sensors.contains(&sensor) {
            sensors.push(sensor);
        }
        Ok(())
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.write(RepoCall::RemoveSensor(sensor.clone()))?;
        self.sensors.lock().retain(|s| s != sensor);
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        if let Some(left) = self.sensor_updates_left.lock().as_mut() {
            if *left == 0 {
                return Err(SecurityError::Repository("sensor store offline".to_string()));
            }
            *left -= 1;
        }
        self.write(RepoCall::UpdateSensor {
            sensor: sensor.clone(),
            active: sensor.is_active(),
        })?;
        let mut sensors = self.sensors.lock();
        if let Some(stored) = sensors.iter_mut().find(|s| *s == sensor) {
            stored.set_active(sensor.is_active());
        }
        Ok(())
    }
}

// ── Analyzers ─────────────────────────────────────────────────

/// Analyzer that always fails.
pub struct BrokenAnalyzer;

impl ImageAnalyzer for BrokenAnalyzer {
    fn contains_cat(&self, _frame: &CameraFrame, _confidence_threshold: f32) -> Result<bool> {
        Err(SecurityError::ImageAnalysis("classifier unreachable".to_string()))
    }
}

/// Analyzer that records the threshold it was called with.
pub struct ThresholdRecorder {
    pub verdict: bool,
    pub seen: Mutex<Vec<f32>>,
}

impl ImageAnalyzer for ThresholdRecorder {
    fn contains_cat(&self, _frame: &CameraFrame, confidence_threshold: f32) -> Result<bool> {
        self.seen.lock().push(confidence_threshold);
        Ok(self.verdict)
    }
}

// ── Listeners ─────────────────────────────────────────────────

/// Listener that counts notifications.
#[derive(Default)]
pub struct CountingListener {
    pub alarms: Mutex<Vec<AlarmStatus>>,
    pub sensors: Mutex<Vec<Sensor>>,
    pub frames: Mutex<Vec<bool>>,
}

impl StatusListener for CountingListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        self.alarms.lock().push(status);
    }

    fn on_sensor_status_changed(&self, sensor: &Sensor) {
        self.sensors.lock().push(sensor.clone());
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        self.frames.lock().push(cat_detected);
    }
}
