//! Storage port for sensors and statuses.
//!
//! The [`AlarmController`](crate::security::AlarmController) never caches
//! state: every operation reads and writes through a [`SecurityRepository`].
//! Two implementations are provided:
//!
//! - [`InMemoryRepository`]: process-local, used by tests and `--in-memory`.
//! - [`JsonFileRepository`]: rewrites a JSON snapshot after every mutation.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileRepository;
pub use memory::InMemoryRepository;

use crate::error::Result;
use crate::security::{AlarmStatus, ArmingStatus, Sensor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Authoritative holder of the sensor set, arming status and alarm status.
///
/// Reads must observe all prior writes. Adding a known sensor or removing
/// an unknown one is not an error.
pub trait SecurityRepository: Send + Sync {
    fn arming_status(&self) -> Result<ArmingStatus>;

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()>;

    fn alarm_status(&self) -> Result<AlarmStatus>;

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()>;

    /// All known sensors, ordered by name then type.
    fn sensors(&self) -> Result<Vec<Sensor>>;

    fn add_sensor(&self, sensor: Sensor) -> Result<()>;

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()>;

    /// Persist the `active` flag of `sensor`.
    fn update_sensor(&self, sensor: &Sensor) -> Result<()>;
}

/// Snapshot of everything a repository stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityState {
    pub arming_status: ArmingStatus,
    pub alarm_status: AlarmStatus,
    #[serde(default)]
    pub sensors: BTreeSet<Sensor>,
}

impl Default for SecurityState {
    fn default() -> Self {
        Self {
            arming_status: ArmingStatus::Disarmed,
            alarm_status: AlarmStatus::NoAlarm,
            sensors: BTreeSet::new(),
        }
    }
}

impl SecurityState {
    /// Insert the sensor unless an equal one is already present.
    pub(crate) fn add_sensor(&mut self, sensor: Sensor) {
        if !self.sensors.contains(&sensor) {
            self.sensors.insert(sensor);
        }
    }

    /// Replace the stored copy of `sensor`, inserting it if unknown.
    pub(crate) fn update_sensor(&mut self, sensor: &Sensor) {
        self.sensors.replace(sensor.clone());
    }
}
