//! JSON-file backed repository.
//!
//! The whole [`SecurityState`] is kept in memory and rewritten to disk as
//! pretty-printed JSON after every mutation. A missing file means default
//! state; the file is created on the first write.

use super::{SecurityRepository, SecurityState};
use crate::error::Result;
use crate::security::{AlarmStatus, ArmingStatus, Sensor};
use log::{debug, info};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

pub struct JsonFileRepository {
    path: PathBuf,
    state: RwLock<SecurityState>,
}

impl JsonFileRepository {
    /// Open the repository at `path`, loading existing state if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let state: SecurityState = serde_json::from_str(&content)?;
            info!(
                "Loaded security state from {} ({} sensors)",
                path.display(),
                state.sensors.len()
            );
            state
        } else {
            info!(
                "No security state at {}, starting from defaults",
                path.display()
            );
            SecurityState::default()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `f` to a copy of the state, write it to disk, then publish it.
    ///
    /// The in-memory state only changes once the save succeeded, so reads
    /// never report a value the file does not hold. The write lock is held
    /// across the save so concurrent mutations reach the file in the same
    /// order they were applied.
    fn mutate(&self, f: impl FnOnce(&mut SecurityState)) -> Result<()> {
        let mut state = self.state.write();
        let mut next = state.clone();
        f(&mut next);
        self.save(&next)?;
        *state = next;
        Ok(())
    }

    fn save(&self, state: &SecurityState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        debug!("Saved security state to {}", self.path.display());
        Ok(())
    }
}

impl SecurityRepository for JsonFileRepository {
    fn arming_status(&self) -> Result<ArmingStatus> {
        Ok(self.state.read().arming_status)
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<()> {
        self.mutate(|state| state.arming_status = status)
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        Ok(self.state.read().alarm_status)
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<()> {
        self.mutate(|state| state.alarm_status = status)
    }

    fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.state.read().sensors.iter().cloned().collect())
    }

    fn add_sensor(&self, sensor: Sensor) -> Result<()> {
        self.mutate(|state| state.add_sensor(sensor))
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.mutate(|state| {
            state.sensors.remove(sensor);
        })
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<()> {
        self.mutate(|state| state.update_sensor(sensor))
    }
}
