//! Profile switching logic.
//!
//! This module implements the core mechanism of `audiodeck`: applying a
//! profile's devices as the system defaults. It handles:
//! - Taking a fresh device snapshot for every switch.
//! - Resolving each role's device id against active devices only.
//! - Calling the controller output first, then input.
//! - Reporting each role's outcome separately.
//!
//! The two roles are independent OS settings with no joint commit, so a
//! switch is best-effort per role. There is no rollback: if output switches
//! and input fails, output stays switched. Only an enumeration failure aborts
//! the call, and it does so before any device is touched.

use std::fmt;
use tracing::{debug, info, warn};

use crate::device::{AudioDevice, DeviceController, DeviceEnumerator, DeviceRole, find_active};
use crate::error::{ControllerError, EnumerationError};
use crate::profiles::AudioProfile;

/// What happened to one role during a switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleOutcome {
    /// The profile has no device for this role
    NotRequested,
    Succeeded,
    /// The id is absent from the snapshot or the device is inactive
    DeviceNotFound,
    /// The controller rejected the call; detail is the OS error verbatim
    ControllerFailed(ControllerError),
}

impl RoleOutcome {
    /// True for outcomes that do not count as a failure
    pub fn is_ok(&self) -> bool {
        matches!(self, RoleOutcome::NotRequested | RoleOutcome::Succeeded)
    }
}

impl fmt::Display for RoleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleOutcome::NotRequested => f.write_str("not requested"),
            RoleOutcome::Succeeded => f.write_str("switched"),
            RoleOutcome::DeviceNotFound => f.write_str("device not found"),
            RoleOutcome::ControllerFailed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Per-role result of one switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchResult {
    pub output: RoleOutcome,
    pub input: RoleOutcome,
    /// Devices that were resolved, for reporting. Not part of the outcome.
    pub output_device: Option<AudioDevice>,
    pub input_device: Option<AudioDevice>,
}

impl SwitchResult {
    pub fn outcome(&self, role: DeviceRole) -> &RoleOutcome {
        match role {
            DeviceRole::Output => &self.output,
            DeviceRole::Input => &self.input,
        }
    }

    /// The resolved device for a role, if it was found
    pub fn device(&self, role: DeviceRole) -> Option<&AudioDevice> {
        match role {
            DeviceRole::Output => self.output_device.as_ref(),
            DeviceRole::Input => self.input_device.as_ref(),
        }
    }

    /// Every requested role succeeded
    pub fn is_success(&self) -> bool {
        self.output.is_ok() && self.input.is_ok()
    }
}

/// Applies profiles through an enumerator and a controller.
///
/// Holds no state between calls. Callers must not run two switches at once.
#[derive(Debug)]
pub struct SwitchEngine<E, C> {
    enumerator: E,
    controller: C,
}

impl<E: DeviceEnumerator, C: DeviceController> SwitchEngine<E, C> {
    pub fn new(enumerator: E, controller: C) -> Self {
        Self {
            enumerator,
            controller,
        }
    }

    /// Switch the system defaults to the devices named by `profile`
    ///
    /// # Errors
    /// Only if enumeration fails. Per-role failures are reported in the
    /// returned [`SwitchResult`].
    pub fn switch_to_profile(&self, profile: &AudioProfile) -> Result<SwitchResult, EnumerationError> {
        let snapshot = self.enumerator.list_devices()?;
        debug!(
            profile = %profile.name,
            devices = snapshot.len(),
            "took device snapshot"
        );

        let (output, output_device) = self.apply_role(profile, DeviceRole::Output, &snapshot);
        let (input, input_device) = self.apply_role(profile, DeviceRole::Input, &snapshot);

        Ok(SwitchResult {
            output,
            input,
            output_device,
            input_device,
        })
    }

    fn apply_role(
        &self,
        profile: &AudioProfile,
        role: DeviceRole,
        snapshot: &[AudioDevice],
    ) -> (RoleOutcome, Option<AudioDevice>) {
        let Some(device_id) = profile.device_id(role) else {
            return (RoleOutcome::NotRequested, None);
        };

        let Some(device) = find_active(snapshot, role, device_id) else {
            warn!(%role, device_id, profile = %profile.name, "device not found or inactive");
            return (RoleOutcome::DeviceNotFound, None);
        };

        match self.controller.set_default(role, &device.id) {
            Ok(()) => {
                info!(%role, device = %device.name, "default device set");
                (RoleOutcome::Succeeded, Some(device.clone()))
            }
            Err(e) => {
                warn!(%role, device = %device.name, error = %e, "failed to set default device");
                (RoleOutcome::ControllerFailed(e), Some(device.clone()))
            }
        }
    }
}
