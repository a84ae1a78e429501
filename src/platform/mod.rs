//! Platform-specific implementations
//!
//! Exposes one `SystemAudio` type implementing both
//! [`DeviceEnumerator`](crate::device::DeviceEnumerator) and
//! [`DeviceController`](crate::device::DeviceController) for the current OS.

#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "windows")]
pub use self::windows::SystemAudio;

#[cfg(not(target_os = "windows"))]
mod unsupported;
#[cfg(not(target_os = "windows"))]
pub use self::unsupported::SystemAudio;
