//! Diagnostic tool for audiodeck.
//!
//! This module implements the `audiodeck doctor` command, which checks the
//! system for common issues:
//! - Existence of the data directory.
//! - Readability of the profile and state files.
//! - Whether the audio subsystem can be enumerated.
//! - Profiles that reference devices which are missing or disabled.
//!
//! It reports issues to the user with a pass/fail/warn status.

use anstyle::AnsiColor;

use crate::device::{DeviceEnumerator, DeviceRole, find_active};
use crate::paths::Paths;
use crate::profiles::ProfileStore;
use crate::state::State;
use crate::ui::Ui;

/// Run the doctor diagnostics. Returns `true` when no check failed.
pub fn run_doctor(
    paths: &Paths,
    store: &dyn ProfileStore,
    enumerator: &dyn DeviceEnumerator,
    ui: &Ui,
) -> bool {
    ui.section("audiodeck Doctor");
    ui.newline();

    let mut healthy = true;

    // 1. Data directory
    healthy &= check_step(ui, "Data Directory", || {
        if paths.base_dir.exists() {
            ui.println(format!(
                "  {} Data directory exists: {}",
                ui.icon_ok(),
                paths.base_dir.display()
            ));
        } else {
            // Created on first save
            ui.println(format!(
                "  {} Data directory missing: {}",
                ui.icon_warn(),
                paths.base_dir.display()
            ));
        }
        true
    });

    // 2. Profiles
    let profiles = store.list_profiles();
    healthy &= check_step(ui, "Profiles File", || match &profiles {
        Ok(list) => {
            ui.println(format!(
                "  {} {} profile(s) loaded",
                ui.icon_ok(),
                list.len()
            ));
            let mut ok = true;
            for profile in list {
                if let Err(e) = profile.validate() {
                    ui.println(format!(
                        "  {} Profile \"{}\" is invalid: {}",
                        ui.icon_err(),
                        profile.name,
                        e
                    ));
                    ok = false;
                }
            }
            ok
        }
        Err(e) => {
            ui.println(format!("  {} {}", ui.icon_err(), e));
            false
        }
    });

    // 3. State
    healthy &= check_step(ui, "State File", || match State::read(&paths.state_file) {
        Ok(state) => {
            ui.println(format!("  {} State file readable", ui.icon_ok()));
            if let Some(name) = &state.last_profile {
                ui.println(format!(
                    "  {} Last applied profile: {}",
                    ui.icon_info(),
                    name
                ));
                let exists = profiles
                    .as_ref()
                    .map(|list| list.iter().any(|p| Some(p.id) == state.last_profile_id))
                    .unwrap_or(true);
                if !exists {
                    ui.println(format!(
                        "  {} That profile no longer exists",
                        ui.icon_warn()
                    ));
                }
            }
            true
        }
        Err(e) => {
            ui.println(format!("  {} {:#}", ui.icon_err(), e));
            false
        }
    });

    // 4. Audio devices
    let snapshot = enumerator.list_devices();
    healthy &= check_step(ui, "Audio Devices", || match &snapshot {
        Ok(devices) => {
            for role in DeviceRole::all() {
                let active = devices
                    .iter()
                    .filter(|d| d.role == role && d.is_active)
                    .count();
                let icon = if active > 0 { ui.icon_ok() } else { ui.icon_warn() };
                ui.println(format!("  {} {} active {} device(s)", icon, active, role));
            }
            true
        }
        Err(e) => {
            ui.println(format!("  {} Cannot enumerate devices: {}", ui.icon_err(), e));
            false
        }
    });

    // 5. Device references
    if let (Ok(list), Ok(devices)) = (&profiles, &snapshot) {
        check_step(ui, "Device References", || {
            let mut stale = 0;
            for profile in list {
                for role in DeviceRole::all() {
                    let Some(id) = profile.device_id(role) else {
                        continue;
                    };
                    if find_active(devices, role, id).is_none() {
                        ui.println(format!(
                            "  {} \"{}\": {} device {} is missing or disabled",
                            ui.icon_warn(),
                            profile.name,
                            role,
                            id
                        ));
                        stale += 1;
                    }
                }
            }
            if stale == 0 {
                ui.println(format!(
                    "  {} All profile devices are available",
                    ui.icon_ok()
                ));
            }
            // Unplugged devices are expected, so this only warns
            true
        });
    }

    if healthy {
        ui.ok("No problems found");
    } else {
        ui.err("Some checks failed");
    }
    healthy
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F) -> bool
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
    success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::create_profile;
    use crate::test_utils::{FakeEnumerator, MemoryProfileStore, device, setup_test_paths};
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    #[test]
    fn test_doctor_healthy_with_stale_reference() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();
        create_profile(&store, "Headset", Some("gone".into()), None).unwrap();
        let enumerator = FakeEnumerator::new(vec![device("A", DeviceRole::Output, true)]);

        let ui = Ui::new(ColorMode::Never, false);
        assert!(run_doctor(&paths, &store, &enumerator, &ui));
    }

    #[test]
    fn test_doctor_fails_without_audio() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();

        let ui = Ui::new(ColorMode::Never, false);
        assert!(!run_doctor(&paths, &store, &FakeEnumerator::failing(), &ui));
    }

    #[test]
    fn test_doctor_fails_on_corrupt_state() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        paths.ensure_dirs().unwrap();
        std::fs::write(&paths.state_file, "{ nope").unwrap();

        let store = MemoryProfileStore::default();
        let enumerator = FakeEnumerator::new(Vec::new());
        let ui = Ui::new(ColorMode::Never, false);
        assert!(!run_doctor(&paths, &store, &enumerator, &ui));
    }
}
