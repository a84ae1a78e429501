//! Core profile management logic.
//!
//! This module handles the "data model" of profiles:
//! - The persisted [`AudioProfile`] record
//! - Validating profile names and device references
//! - Creating, updating and removing profiles through a [`ProfileStore`]
//!
//! Device ids in a profile are weak references. Nothing here checks that the
//! referenced device still exists; that happens at switch time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::device::DeviceRole;
use crate::error::{ProfileError, StoreError};

/// Maximum profile name length in characters
pub const MAX_NAME_LEN: usize = 64;

/// A named selection of output and/or input device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub output_device_id: Option<String>,
    #[serde(default)]
    pub input_device_id: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl AudioProfile {
    /// Build a new profile with a fresh id. Does not validate.
    pub fn new(
        name: impl Into<String>,
        output_device_id: Option<String>,
        input_device_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            output_device_id,
            input_device_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Device reference for a role
    pub fn device_id(&self, role: DeviceRole) -> Option<&str> {
        match role {
            DeviceRole::Output => self.output_device_id.as_deref(),
            DeviceRole::Input => self.input_device_id.as_deref(),
        }
    }

    pub fn has_output(&self) -> bool {
        self.output_device_id.is_some()
    }

    pub fn has_input(&self) -> bool {
        self.input_device_id.is_some()
    }

    /// Roles this profile references, e.g. `Output + Input`
    pub fn role_summary(&self) -> String {
        let roles: Vec<&str> = DeviceRole::all()
            .iter()
            .filter(|r| self.device_id(**r).is_some())
            .map(|r| r.display_name())
            .collect();

        if roles.is_empty() {
            "Empty".to_string()
        } else {
            roles.join(" + ")
        }
    }

    /// Check the record-level invariants
    pub fn validate(&self) -> Result<(), ProfileError> {
        validate_profile_name(&self.name)?;
        if !self.has_output() && !self.has_input() {
            return Err(ProfileError::NoDevices(self.name.clone()));
        }
        Ok(())
    }
}

/// Persistence collaborator for profiles.
///
/// The switch engine only reads through this; all writes come from the
/// profile operations below.
pub trait ProfileStore {
    /// All profiles in storage order
    fn list_profiles(&self) -> Result<Vec<AudioProfile>, StoreError>;

    /// Insert or replace the profile with the same id
    fn save_profile(&self, profile: &AudioProfile) -> Result<(), StoreError>;

    /// Remove by id. Returns false if nothing was removed.
    fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Exact, case-sensitive lookup by name
    fn get_profile_by_name(&self, name: &str) -> Result<Option<AudioProfile>, StoreError> {
        Ok(self.list_profiles()?.into_iter().find(|p| p.name == name))
    }

    fn get_profile(&self, id: Uuid) -> Result<Option<AudioProfile>, StoreError> {
        Ok(self.list_profiles()?.into_iter().find(|p| p.id == id))
    }
}

/// Validate profile name
///
/// Any characters are allowed; the name must be non-empty and at most
/// [`MAX_NAME_LEN`] characters.
pub fn validate_profile_name(name: &str) -> Result<(), ProfileError> {
    if name.trim().is_empty() {
        return Err(ProfileError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ProfileError::NameTooLong { max: MAX_NAME_LEN });
    }

    Ok(())
}

/// Look up a profile by exact name
pub fn find_profile(store: &dyn ProfileStore, name: &str) -> Result<AudioProfile, ProfileError> {
    store
        .get_profile_by_name(name)?
        .ok_or_else(|| ProfileError::NotFound(name.to_string()))
}

/// Create and persist a new profile
pub fn create_profile(
    store: &dyn ProfileStore,
    name: &str,
    output_device_id: Option<String>,
    input_device_id: Option<String>,
) -> Result<AudioProfile, ProfileError> {
    let profile = AudioProfile::new(name, output_device_id, input_device_id);
    profile.validate()?;

    if store.get_profile_by_name(name)?.is_some() {
        return Err(ProfileError::DuplicateName(name.to_string()));
    }

    store.save_profile(&profile)?;
    Ok(profile)
}

/// Requested changes to an existing profile.
///
/// `None` leaves a field alone; `Some(None)` clears a device reference.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub output_device_id: Option<Option<String>>,
    pub input_device_id: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.output_device_id.is_none() && self.input_device_id.is_none()
    }
}

/// Apply an update to the profile called `name`
pub fn update_profile(
    store: &dyn ProfileStore,
    name: &str,
    update: ProfileUpdate,
) -> Result<AudioProfile, ProfileError> {
    let mut profile = find_profile(store, name)?;

    if let Some(new_name) = &update.name
        && new_name != &profile.name
        && let Some(existing) = store.get_profile_by_name(new_name)?
        && existing.id != profile.id
    {
        return Err(ProfileError::DuplicateName(new_name.clone()));
    }

    if let Some(new_name) = update.name {
        profile.name = new_name;
    }
    if let Some(output) = update.output_device_id {
        profile.output_device_id = output;
    }
    if let Some(input) = update.input_device_id {
        profile.input_device_id = input;
    }
    profile.validate()?;

    profile.updated_at = Utc::now();
    store.save_profile(&profile)?;
    Ok(profile)
}

/// Remove the profile called `name`
pub fn delete_profile(store: &dyn ProfileStore, name: &str) -> Result<AudioProfile, ProfileError> {
    let profile = find_profile(store, name)?;
    if !store.delete_profile(profile.id)? {
        return Err(ProfileError::NotFound(name.to_string()));
    }
    Ok(profile)
}

/// Serde helpers for profile timestamps.
///
/// Writes RFC 3339. Reads RFC 3339 or a naive ISO-8601 timestamp, which is
/// taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
