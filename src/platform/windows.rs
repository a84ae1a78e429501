//! Windows Core Audio backend.
//!
//! Enumeration goes through `IMMDeviceEnumerator`. Setting the default uses
//! the undocumented `IPolicyConfig` interface, which is what the Sound
//! control panel itself calls; there is no public API for it.

#![allow(non_snake_case)]

use std::ffi::c_void;
use tracing::{debug, warn};
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Foundation::{E_ACCESSDENIED, E_INVALIDARG, E_NOTFOUND, RPC_E_CHANGED_MODE};
use windows::Win32::Media::Audio::{
    AUDCLNT_E_DEVICE_INVALIDATED, DEVICE_STATE, DEVICE_STATE_ACTIVE, DEVICE_STATE_DISABLED,
    DEVICE_STATE_UNPLUGGED, EDataFlow, ERole, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
    eCapture, eCommunications, eConsole, eMultimedia, eRender,
};
use windows::Win32::System::Com::StructuredStorage::PropVariantToStringAlloc;
use windows::Win32::System::Com::{
    CLSCTX_ALL, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx, CoTaskMemFree,
    CoUninitialize, STGM_READ,
};
use windows::core::{GUID, HRESULT, IUnknown, IUnknown_Vtbl, PCWSTR, PWSTR, interface};

use crate::device::{AudioDevice, DeviceController, DeviceEnumerator, DeviceRole};
use crate::error::{ControllerError, EnumerationError};

const CLSID_POLICY_CONFIG: GUID = GUID::from_u128(0x870af99c_171d_4f9e_af0d_e63df40c2bc9);

/// Windows 10/11 `IPolicyConfig`. Only `SetDefaultEndpoint` is called; the
/// other entries keep the vtable layout.
#[interface("f8679f50-850a-41cf-9c72-430f290290c8")]
unsafe trait IPolicyConfig: IUnknown {
    fn GetMixFormat(&self) -> HRESULT;
    fn GetDeviceFormat(&self) -> HRESULT;
    fn ResetDeviceFormat(&self) -> HRESULT;
    fn SetDeviceFormat(&self) -> HRESULT;
    fn GetProcessingPeriod(&self) -> HRESULT;
    fn SetProcessingPeriod(&self) -> HRESULT;
    fn GetShareMode(&self) -> HRESULT;
    fn SetShareMode(&self) -> HRESULT;
    fn GetPropertyValue(&self) -> HRESULT;
    fn SetPropertyValue(&self) -> HRESULT;
    fn SetDefaultEndpoint(&self, device_id: PCWSTR, role: ERole) -> HRESULT;
    fn SetEndpointVisibility(&self, device_id: PCWSTR, visible: i32) -> HRESULT;
}

/// OS roles a default is set for. Windows keeps a separate default per role.
const OS_ROLES: [ERole; 3] = [eConsole, eMultimedia, eCommunications];

/// Balances a successful `CoInitializeEx`
struct ComGuard {
    owned: bool,
}

impl ComGuard {
    fn init() -> Result<Self, EnumerationError> {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            // Already initialized as STA on this thread; usable, not ours to release
            return Ok(Self { owned: false });
        }
        hr.ok()
            .map_err(|e| EnumerationError::ComInit(e.to_string()))?;
        Ok(Self { owned: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.owned {
            unsafe { CoUninitialize() };
        }
    }
}

/// Core Audio enumerator and controller
pub struct SystemAudio {
    enumerator: IMMDeviceEnumerator,
    // Dropped last so COM outlives the enumerator
    _com: ComGuard,
}

impl SystemAudio {
    pub fn new() -> Result<Self, EnumerationError> {
        let com = ComGuard::init()?;
        let enumerator: IMMDeviceEnumerator =
            unsafe { CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL) }
                .map_err(|e| EnumerationError::Backend(e.to_string()))?;

        Ok(Self {
            enumerator,
            _com: com,
        })
    }

    fn default_device_id(&self, flow: EDataFlow) -> Option<String> {
        let device = unsafe { self.enumerator.GetDefaultAudioEndpoint(flow, eMultimedia) }.ok()?;
        unsafe { device.GetId() }.ok().map(take_pwstr)
    }

    fn collect(
        &self,
        flow: EDataFlow,
        role: DeviceRole,
        out: &mut Vec<AudioDevice>,
    ) -> Result<(), EnumerationError> {
        let default_id = self.default_device_id(flow);
        let mask = DEVICE_STATE(
            DEVICE_STATE_ACTIVE.0 | DEVICE_STATE_DISABLED.0 | DEVICE_STATE_UNPLUGGED.0,
        );

        let collection = unsafe { self.enumerator.EnumAudioEndpoints(flow, mask) }
            .map_err(|e| EnumerationError::Backend(e.to_string()))?;
        let count = unsafe { collection.GetCount() }
            .map_err(|e| EnumerationError::Backend(e.to_string()))?;

        for index in 0..count {
            let device = match unsafe { collection.Item(index) } {
                Ok(device) => device,
                Err(e) => {
                    warn!(%role, index, error = %e, "skipping unreadable endpoint");
                    continue;
                }
            };

            let id = match unsafe { device.GetId() } {
                Ok(raw) => take_pwstr(raw),
                Err(e) => {
                    warn!(%role, index, error = %e, "skipping endpoint without id");
                    continue;
                }
            };

            let is_active = unsafe { device.GetState() }
                .map(|state| state == DEVICE_STATE_ACTIVE)
                .unwrap_or(false);
            let name = friendly_name(&device).unwrap_or_else(|| format!("Audio Device {}", index + 1));
            let is_default = default_id.as_deref() == Some(id.as_str());

            out.push(AudioDevice {
                id,
                name,
                role,
                is_active,
                is_default,
            });
        }

        Ok(())
    }
}

impl DeviceEnumerator for SystemAudio {
    fn list_devices(&self) -> Result<Vec<AudioDevice>, EnumerationError> {
        let mut devices = Vec::new();
        self.collect(eRender, DeviceRole::Output, &mut devices)?;
        self.collect(eCapture, DeviceRole::Input, &mut devices)?;
        debug!(count = devices.len(), "enumerated audio endpoints");
        Ok(devices)
    }
}

impl DeviceController for SystemAudio {
    fn set_default(&self, role: DeviceRole, device_id: &str) -> Result<(), ControllerError> {
        let policy: IPolicyConfig =
            unsafe { CoCreateInstance(&CLSID_POLICY_CONFIG, None, CLSCTX_ALL) }.map_err(|e| {
                ControllerError::Unknown(format!("Could not access audio policy interface: {}", e))
            })?;

        let wide: Vec<u16> = device_id.encode_utf16().chain(std::iter::once(0)).collect();
        let mut applied = 0;
        let mut first_error = None;

        for os_role in OS_ROLES {
            match unsafe { policy.SetDefaultEndpoint(PCWSTR(wide.as_ptr()), os_role) }.ok() {
                Ok(()) => applied += 1,
                Err(e) => {
                    debug!(%role, os_role = os_role.0, error = %e, "SetDefaultEndpoint failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if applied == 0 => Err(classify(e)),
            _ => {
                debug!(%role, applied, "default endpoint set");
                Ok(())
            }
        }
    }
}

fn classify(e: windows::core::Error) -> ControllerError {
    let code = e.code();
    let detail = e.to_string();
    if code == E_ACCESSDENIED {
        ControllerError::PermissionDenied(detail)
    } else if code == E_NOTFOUND || code == E_INVALIDARG || code == AUDCLNT_E_DEVICE_INVALIDATED {
        ControllerError::DeviceUnavailable(detail)
    } else {
        ControllerError::Unknown(detail)
    }
}

fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;
        let value = store.GetValue(&PKEY_Device_FriendlyName).ok()?;
        let raw = PropVariantToStringAlloc(&value).ok()?;
        let name = take_pwstr(raw);
        (!name.is_empty()).then_some(name)
    }
}

/// Copy a COM-allocated string and free it
fn take_pwstr(raw: PWSTR) -> String {
    if raw.is_null() {
        return String::new();
    }
    unsafe {
        let value = String::from_utf16_lossy(raw.as_wide());
        CoTaskMemFree(Some(raw.0 as *const c_void));
        value
    }
}
