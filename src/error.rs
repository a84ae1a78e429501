//! Error types for audiodeck.
//!
//! Device and profile errors are typed so callers can tell a fatal
//! enumeration failure apart from a per-role controller failure. The CLI
//! layer wraps all of these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a device snapshot from the OS audio subsystem.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("Failed to initialize COM: {0}")]
    ComInit(String),

    #[error("Audio subsystem unreachable: {0}")]
    Backend(String),

    #[error("Default device switching is not supported on this platform")]
    Unsupported,
}

/// Failure of a single set-default call.
///
/// Every variant keeps the OS detail verbatim for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Unknown(String),
}

/// Failure reading or writing the profile file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access profiles file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse profiles file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize profiles: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Profile validation and lookup failures.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile name cannot be empty")]
    EmptyName,

    #[error("Profile name cannot be longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("Profile '{0}' must reference at least one output or input device")]
    NoDevices(String),

    #[error("Profile with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Profile '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
