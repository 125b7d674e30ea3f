//! Process-local repository.

use super::{SecurityRepository, SecurityState};
use crate::error::Result;
use crate::security::{AlarmStatus, ArmingStatus, Sensor};
use parking_lot::RwLock;

/// Thread-safe in-memory repository.
///
/// Starts disarmed with no alarm and no sensors unless built from an
/// existing [`SecurityState`].
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<SecurityState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: SecurityState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SecurityState {
        self.state.read().clone()
    }
}

impl SecurityRepository for InMemoryRepository {
    fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.state.read().arming_status)
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.state.write().arming_status = status;
        Ok(())
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.state.read().alarm_status)
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.state.write().alarm_status = status;
        Ok(())
    }

    fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.state.read().sensors.iter().cloned().collect())
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.state.write().add_sensor(sensor);
        Ok(())
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.state.write().sensors.remove(sensor);
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.state.write().update_sensor(sensor);
        Ok(())
    }
}
