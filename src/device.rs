//! Audio device model and the two OS-facing seams.
//!
//! - [`DeviceEnumerator`] produces a point-in-time snapshot of endpoints.
//! - [`DeviceController`] makes one endpoint the system default for a role.
//!
//! Both are implemented by [`crate::platform::SystemAudio`] for the real OS
//! and by in-memory doubles in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ControllerError, EnumerationError};

/// Direction of an audio endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    Output,
    Input,
}

impl DeviceRole {
    /// Roles in the order the switch engine applies them
    pub fn all() -> [DeviceRole; 2] {
        [DeviceRole::Output, DeviceRole::Input]
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceRole::Output => "Output",
            DeviceRole::Input => "Input",
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DeviceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "output" | "render" | "playback" => Ok(DeviceRole::Output),
            "input" | "capture" | "recording" => Ok(DeviceRole::Input),
            _ => Err(format!("Unknown device role: {}", s)),
        }
    }
}

/// One endpoint as seen at enumeration time.
///
/// Recreated on every enumeration; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Opaque OS endpoint id, stable across reboots
    pub id: String,
    /// Friendly name, not guaranteed unique
    pub name: String,
    pub role: DeviceRole,
    /// Enabled and connected
    pub is_active: bool,
    /// Current OS default for its role
    pub is_default: bool,
}

impl AudioDevice {
    /// Name with status markers, e.g. `Speakers (Default)`
    pub fn display_name(&self) -> String {
        let mut status = Vec::new();
        if self.is_default {
            status.push("Default");
        }
        if !self.is_active {
            status.push("Disabled");
        }

        if status.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, status.join(", "))
        }
    }
}

/// Find an active device with the given id and role.
///
/// Inactive devices are treated as absent.
pub fn find_active<'a>(
    devices: &'a [AudioDevice],
    role: DeviceRole,
    id: &str,
) -> Option<&'a AudioDevice> {
    devices
        .iter()
        .find(|d| d.is_active && d.role == role && d.id == id)
}

/// Devices of one role, in snapshot order
pub fn devices_for_role(devices: &[AudioDevice], role: DeviceRole) -> Vec<&AudioDevice> {
    devices.iter().filter(|d| d.role == role).collect()
}

/// The current default device for a role, if the snapshot reports one
pub fn default_for_role(devices: &[AudioDevice], role: DeviceRole) -> Option<&AudioDevice> {
    devices.iter().find(|d| d.role == role && d.is_default)
}

/// Source of live device snapshots
pub trait DeviceEnumerator {
    /// List output and input endpoints in OS order.
    fn list_devices(&self) -> Result<Vec<AudioDevice>, EnumerationError>;
}

/// Sets the OS default endpoint for a role.
///
/// One best-effort attempt per call, no retries.
pub trait DeviceController {
    fn set_default(&self, role: DeviceRole, device_id: &str) -> Result<(), ControllerError>;
}

impl<T: DeviceEnumerator + ?Sized> DeviceEnumerator for &T {
    fn list_devices(&self) -> Result<Vec<AudioDevice>, EnumerationError> {
        (**self).list_devices()
    }
}

impl<T: DeviceController + ?Sized> DeviceController for &T {
    fn set_default(&self, role: DeviceRole, device_id: &str) -> Result<(), ControllerError> {
        (**self).set_default(role, device_id)
    }
}
