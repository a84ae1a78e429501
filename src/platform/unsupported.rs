//! Fallback for platforms without a default-device API binding.
//!
//! Enumeration fails, so a switch aborts before any device is touched.

use crate::device::{AudioDevice, DeviceController, DeviceEnumerator, DeviceRole};
use crate::error::{ControllerError, EnumerationError};

#[derive(Debug, Default)]
pub struct SystemAudio;

impl SystemAudio {
    pub fn new() -> Result<Self, EnumerationError> {
        Ok(Self)
    }
}

impl DeviceEnumerator for SystemAudio {
    fn list_devices(&self) -> Result<Vec<AudioDevice>, EnumerationError> {
        Err(EnumerationError::Unsupported)
    }
}

impl DeviceController for SystemAudio {
    fn set_default(&self, _role: DeviceRole, _device_id: &str) -> Result<(), ControllerError> {
        Err(ControllerError::Unknown(
            EnumerationError::Unsupported.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_unsupported() {
        let audio = SystemAudio::new().unwrap();
        assert!(matches!(
            audio.list_devices(),
            Err(EnumerationError::Unsupported)
        ));
        assert!(audio.set_default(DeviceRole::Output, "A").is_err());
    }
}
