//! Test utilities shared across test modules
//!
//! In-memory stand-ins for the OS adapters and the profile store, plus a
//! `Paths` rooted in a temporary directory.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tempfile::TempDir;
use uuid::Uuid;

use crate::device::{AudioDevice, DeviceController, DeviceEnumerator, DeviceRole};
use crate::error::{ControllerError, EnumerationError, StoreError};
use crate::paths::Paths;
use crate::profiles::{AudioProfile, ProfileStore};

/// Create a Paths struct for testing using a temporary directory
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths::with_base_dir(temp_dir.path().join("AudioDeck"))
}

/// Device with id `id` named `Device <id>`
pub fn device(id: &str, role: DeviceRole, is_active: bool) -> AudioDevice {
    AudioDevice {
        id: id.to_string(),
        name: format!("Device {}", id),
        role,
        is_active,
        is_default: false,
    }
}

/// Enumerator returning a fixed snapshot, or failing
#[derive(Debug, Default)]
pub struct FakeEnumerator {
    devices: RefCell<Vec<AudioDevice>>,
    fail: bool,
    calls: Cell<usize>,
}

impl FakeEnumerator {
    pub fn new(devices: Vec<AudioDevice>) -> Self {
        Self {
            devices: RefCell::new(devices),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn set_devices(&self, devices: Vec<AudioDevice>) {
        *self.devices.borrow_mut() = devices;
    }

    pub fn call_count(&self) -> usize {
        self.calls.get()
    }
}

impl DeviceEnumerator for FakeEnumerator {
    fn list_devices(&self) -> Result<Vec<AudioDevice>, EnumerationError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(EnumerationError::Backend("audio service stopped".to_string()));
        }
        Ok(self.devices.borrow().clone())
    }
}

/// Controller that records calls and tracks the current defaults
#[derive(Debug, Default)]
pub struct RecordingController {
    calls: RefCell<Vec<(DeviceRole, String)>>,
    defaults: RefCell<HashMap<DeviceRole, String>>,
    failures: RefCell<HashMap<DeviceRole, ControllerError>>,
}

impl RecordingController {
    /// Make every call for `role` fail with `error`
    pub fn fail_role(&self, role: DeviceRole, error: ControllerError) {
        self.failures.borrow_mut().insert(role, error);
    }

    pub fn calls(&self) -> Vec<(DeviceRole, String)> {
        self.calls.borrow().clone()
    }

    pub fn default_for(&self, role: DeviceRole) -> Option<String> {
        self.defaults.borrow().get(&role).cloned()
    }
}

impl DeviceController for RecordingController {
    fn set_default(&self, role: DeviceRole, device_id: &str) -> Result<(), ControllerError> {
        self.calls.borrow_mut().push((role, device_id.to_string()));
        if let Some(err) = self.failures.borrow().get(&role) {
            return Err(err.clone());
        }
        self.defaults.borrow_mut().insert(role, device_id.to_string());
        Ok(())
    }
}

/// Profile store held in memory
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RefCell<Vec<AudioProfile>>,
}

impl ProfileStore for MemoryProfileStore {
    fn list_profiles(&self) -> Result<Vec<AudioProfile>, StoreError> {
        Ok(self.profiles.borrow().clone())
    }

    fn save_profile(&self, profile: &AudioProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.borrow_mut();
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }
        Ok(())
    }

    fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut profiles = self.profiles.borrow_mut();
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        Ok(profiles.len() != before)
    }
}
