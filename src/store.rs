//! JSON file profile store.
//!
//! Profiles live in a single pretty-printed JSON array. Every call re-reads
//! the file, so edits made by another process are always picked up.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::fs_utils::atomic_write;
use crate::profiles::{AudioProfile, ProfileStore};

/// [`ProfileStore`] backed by `profiles.json`
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<AudioProfile>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let profiles: Vec<AudioProfile> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = profiles.len(), path = ?self.path, "read profiles");
        Ok(profiles)
    }

    fn write_all(&self, profiles: &[AudioProfile]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(profiles).map_err(StoreError::Serialize)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(count = profiles.len(), path = ?self.path, "wrote profiles");
        Ok(())
    }
}

impl ProfileStore for JsonProfileStore {
    fn list_profiles(&self) -> Result<Vec<AudioProfile>, StoreError> {
        self.read_all()
    }

    fn save_profile(&self, profile: &AudioProfile) -> Result<(), StoreError> {
        let mut profiles = self.read_all()?;
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }
        self.write_all(&profiles)
    }

    fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut profiles = self.read_all()?;
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        if profiles.len() == before {
            return Ok(false);
        }
        self.write_all(&profiles)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{create_profile, find_profile};
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> JsonProfileStore {
        JsonProfileStore::new(temp_dir.path().join("AudioDeck/profiles.json"))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        assert!(store.list_profiles().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let created = create_profile(&store, "Gaming Setup", Some("A".into()), Some("B".into()))
            .unwrap();
        assert!(store.path().exists());

        let reopened = store_in(&temp_dir);
        let loaded = find_profile(&reopened, "Gaming Setup").unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.output_device_id.as_deref(), Some("A"));
        assert_eq!(loaded.input_device_id.as_deref(), Some("B"));
        assert_eq!(loaded.created_at, created.created_at);
    }

    #[test]
    fn test_save_is_upsert_preserving_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);

        let mut first = create_profile(&store, "first", Some("A".into()), None).unwrap();
        create_profile(&store, "second", Some("B".into()), None).unwrap();

        first.input_device_id = Some("C".into());
        store.save_profile(&first).unwrap();

        let names: Vec<String> = store
            .list_profiles()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(
            store.get_profile(first.id).unwrap().unwrap().input_device_id.as_deref(),
            Some("C")
        );
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let profile = create_profile(&store, "Work", Some("A".into()), None).unwrap();

        assert!(store.delete_profile(profile.id).unwrap());
        assert!(!store.delete_profile(profile.id).unwrap());
        assert!(store.list_profiles().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();

        assert!(matches!(
            store.list_profiles(),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn test_reads_existing_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"[
  {
    "id": "2f1c6a9e-7d3b-4e8a-9c2d-1b0a9f8e7d6c",
    "name": "Meeting",
    "output_device_id": null,
    "input_device_id": "{0.0.1.00000000}.{mic}",
    "created_at": "2024-05-01T09:00:00.000001",
    "updated_at": "2024-05-01T09:00:00.000001"
  }
]"#,
        )
        .unwrap();

        let profile = find_profile(&store, "Meeting").unwrap();
        assert!(!profile.has_output());
        assert_eq!(profile.input_device_id.as_deref(), Some("{0.0.1.00000000}.{mic}"));
    }
}
