use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

/// Environment variable overriding the data directory
pub const HOME_ENV: &str = "AUDIODECK_HOME";

/// All computed paths used by audiodeck
#[derive(Debug, Clone)]
pub struct Paths {
    /// %LOCALAPPDATA%\AudioDeck (or $AUDIODECK_HOME)
    pub base_dir: PathBuf,
    /// <base>/profiles.json
    pub profiles_file: PathBuf,
    /// <base>/state.json
    pub state_file: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(dir)));
        }

        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::with_base_dir(base_dirs.data_local_dir().join("AudioDeck")))
    }

    /// Lay out all files under `base_dir`
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        let profiles_file = base_dir.join("profiles.json");
        let state_file = base_dir.join("state.json");

        Self {
            base_dir,
            profiles_file,
            state_file,
        }
    }

    /// Ensure all required directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create data directory: {:?}", self.base_dir)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let paths = Paths::with_base_dir(PathBuf::from("/data/AudioDeck"));
        assert!(paths.profiles_file.ends_with("AudioDeck/profiles.json"));
        assert!(paths.state_file.ends_with("AudioDeck/state.json"));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        unsafe { std::env::set_var(HOME_ENV, temp_dir.path()) };

        let paths = Paths::new().unwrap();
        unsafe { std::env::remove_var(HOME_ENV) };

        assert_eq!(paths.base_dir, temp_dir.path());
        assert_eq!(paths.profiles_file, temp_dir.path().join("profiles.json"));
    }

    #[test]
    #[serial]
    fn test_default_location() {
        unsafe { std::env::remove_var(HOME_ENV) };
        let paths = Paths::new().unwrap();
        assert!(paths.base_dir.ends_with("AudioDeck"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = Paths::with_base_dir(temp_dir.path().join("nested/AudioDeck"));
        paths.ensure_dirs().unwrap();
        assert!(paths.base_dir.is_dir());
    }
}
