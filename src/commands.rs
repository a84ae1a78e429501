//! High-level command orchestration for the CLI.
//!
//! This module contains the handler functions for each CLI command (`--list`,
//! `--profile`, `add`, `devices`, etc.). It serves as the coordination layer,
//! interacting with:
//! - `crate::ui` for user interaction (output, prompts).
//! - `crate::profiles` for profile management logic.
//! - `crate::switch` for profile activation.
//! - `crate::state` for the last-switch record and cross-process locking.
//!
//! Handlers that switch return `Ok(false)` when a requested role did not
//! succeed, so `main` can exit non-zero without treating it as an error.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use inquire::{Confirm, Select};
use tracing::warn;

use crate::device::{
    AudioDevice, DeviceController, DeviceEnumerator, DeviceRole, default_for_role,
    devices_for_role, find_active,
};
use crate::doctor::run_doctor;
use crate::error::ProfileError;
use crate::paths::Paths;
use crate::profiles::{
    AudioProfile, ProfileStore, ProfileUpdate, create_profile, delete_profile, find_profile,
    update_profile, validate_profile_name,
};
use crate::state::{LockedState, State};
use crate::switch::{RoleOutcome, SwitchEngine, SwitchResult};
use crate::ui::Ui;

/// List all profiles with their roles
pub fn list(store: &dyn ProfileStore, ui: &Ui) -> Result<()> {
    let profiles = store.list_profiles()?;

    if profiles.is_empty() {
        ui.println("No profiles configured.");
        ui.newline();
        ui.println("Create one with:");
        ui.println(format!("  {} add <NAME>", ui.bold("audiodeck")));
        return Ok(());
    }

    ui.section("Available Audio Profiles:");
    for profile in &profiles {
        ui.println(format!("  {}", profile_line(profile)));
    }
    ui.newline();
    ui.println(ui.dim(format!(
        "Switch with: audiodeck --profile \"{}\"",
        profiles[0].name
    )));

    Ok(())
}

/// `--list` entry, e.g. `• Gaming Setup (Output + Input)`
pub fn profile_line(profile: &AudioProfile) -> String {
    format!("• {} ({})", profile.name, profile.role_summary())
}

/// Last-switch record for display. A corrupt file is logged and treated as empty.
fn read_state_for_display(paths: &Paths) -> State {
    State::read(&paths.state_file).unwrap_or_else(|e| {
        warn!(path = ?paths.state_file, error = %format!("{:#}", e), "ignoring unreadable state file");
        State::default()
    })
}

/// Switch to the profile called `name`
pub fn switch_profile<E, C>(
    paths: &Paths,
    store: &dyn ProfileStore,
    engine: &SwitchEngine<E, C>,
    name: &str,
    ui: &Ui,
) -> Result<bool>
where
    E: DeviceEnumerator,
    C: DeviceController,
{
    let profile = match find_profile(store, name) {
        Ok(profile) => profile,
        Err(ProfileError::NotFound(_)) => {
            print_available_profiles(store, ui);
            bail!(
                "Profile \"{}\" not found.\nHint: Names are case-sensitive. Use --list to see all profiles.",
                name
            );
        }
        Err(e) => return Err(e.into()),
    };

    // Held until return so concurrent switches queue up
    let mut locked = LockedState::lock(&paths.state_file)?;

    let spinner = ui.spinner(format!("Switching to profile \"{}\"...", profile.name));
    let result = engine.switch_to_profile(&profile);
    ui.spinner_clear(&spinner);

    let result = result.context("Failed to enumerate audio devices; no device was changed")?;
    print_switch_result(&profile, &result, ui);

    if result.is_success() {
        locked.update(|s| {
            s.last_profile = Some(profile.name.clone());
            s.last_profile_id = Some(profile.id);
        })?;
    }

    Ok(result.is_success())
}

/// Pick a profile interactively, then switch to it
pub fn interactive<E, C>(
    paths: &Paths,
    store: &dyn ProfileStore,
    engine: &SwitchEngine<E, C>,
    ui: &Ui,
) -> Result<bool>
where
    E: DeviceEnumerator,
    C: DeviceController,
{
    let profiles = store.list_profiles()?;
    if profiles.is_empty() {
        ui.warn("No profiles configured.");
        ui.println(format!(
            "Create one with: {} add <NAME>",
            ui.bold("audiodeck")
        ));
        return Ok(true);
    }

    let last = read_state_for_display(paths);
    let options: Vec<String> = profiles
        .iter()
        .map(|p| format!("{} ({})", p.name, p.role_summary()))
        .collect();
    let start = profiles
        .iter()
        .position(|p| Some(p.id) == last.last_profile_id)
        .unwrap_or(0);

    let choice = Select::new("Switch to which profile?", options)
        .with_starting_cursor(start)
        .raw_prompt()
        .context("Profile selection cancelled")?;

    switch_profile(paths, store, engine, &profiles[choice.index].name, ui)
}

/// One line per role, e.g. `Output: switched to Speakers`
pub fn outcome_line(profile: &AudioProfile, result: &SwitchResult, role: DeviceRole) -> String {
    let detail = match result.outcome(role) {
        RoleOutcome::NotRequested => "not requested".to_string(),
        RoleOutcome::Succeeded => match result.device(role) {
            Some(device) => format!("switched to {}", device.name),
            None => "switched".to_string(),
        },
        RoleOutcome::DeviceNotFound => format!(
            "device {} not found",
            profile.device_id(role).unwrap_or("?")
        ),
        RoleOutcome::ControllerFailed(e) => format!("failed: {}", e),
    };
    format!("{}: {}", role, detail)
}

fn print_switch_result(profile: &AudioProfile, result: &SwitchResult, ui: &Ui) {
    for role in DeviceRole::all() {
        let (icon, color) = ui.outcome_style(result.outcome(role));
        let line = format!("{} {}", icon, outcome_line(profile, result, role));
        if result.outcome(role).is_ok() {
            ui.println(ui.colored(line, color));
        } else {
            ui.eprintln(ui.colored(line, color));
        }
    }

    if result.is_success() {
        ui.ok(format!("Profile \"{}\" applied", profile.name));
    } else {
        ui.err(format!("Profile \"{}\" was only partially applied", profile.name));
        if matches!(result.output, RoleOutcome::DeviceNotFound)
            || matches!(result.input, RoleOutcome::DeviceNotFound)
        {
            ui.eprintln(ui.dim(
                "Hint: The profile may reference a device that is unplugged or disabled. \
                 Run 'audiodeck inspect' or 'audiodeck edit' to fix it.",
            ));
        }
    }
}

fn print_available_profiles(store: &dyn ProfileStore, ui: &Ui) {
    ui.eprintln("Available profiles:");
    match store.list_profiles() {
        Ok(profiles) if !profiles.is_empty() => {
            for p in profiles {
                ui.eprintln(format!("  • {}", p.name));
            }
        }
        Ok(_) => ui.eprintln("  (No profiles configured)"),
        Err(e) => ui.eprintln(format!("  (Could not read profiles: {})", e)),
    }
}

/// Show the live device snapshot
pub fn devices(enumerator: &dyn DeviceEnumerator, role: Option<DeviceRole>, ui: &Ui) -> Result<()> {
    let snapshot = enumerator
        .list_devices()
        .context("Failed to enumerate audio devices")?;

    let mut table = ui.table();
    table.set_header(vec![
        ui.header_cell("Role"),
        ui.header_cell("Name"),
        ui.header_cell("Status"),
        ui.header_cell("ID"),
    ]);

    let mut shown = 0;
    for device in snapshot.iter().filter(|d| role.is_none_or(|r| d.role == r)) {
        let status = if device.is_default {
            ui.colored_cell("default", AnsiColor::Green)
        } else if device.is_active {
            ui.cell("active")
        } else {
            ui.colored_cell("disabled", AnsiColor::Yellow)
        };
        table.add_row(vec![
            ui.cell(device.role.display_name()),
            ui.cell(&device.name),
            status,
            ui.cell(&device.id),
        ]);
        shown += 1;
    }

    if shown == 0 {
        ui.warn("No audio devices found.");
        return Ok(());
    }

    ui.section("Audio Devices");
    ui.println(table.to_string());
    Ok(())
}

/// Show the current default devices and the last applied profile
pub fn current(paths: &Paths, enumerator: &dyn DeviceEnumerator, ui: &Ui) -> Result<()> {
    let state = read_state_for_display(paths);
    let snapshot = enumerator
        .list_devices()
        .context("Failed to enumerate audio devices")?;

    ui.section("Current Audio Setup");
    ui.newline();

    let mut table = ui.simple_table();
    for role in DeviceRole::all() {
        let value = match default_for_role(&snapshot, role) {
            Some(device) => ui.header_cell(&device.name),
            None => ui.colored_cell("(none)", AnsiColor::Yellow),
        };
        table.add_row(vec![ui.cell(format!("{}:", role)), value]);
    }

    match &state.last_profile {
        Some(name) => {
            table.add_row(vec![ui.cell("Last profile:"), ui.cell(name)]);
            if let Some(updated) = &state.updated_at {
                table.add_row(vec![
                    ui.cell("Switched at:"),
                    ui.cell(updated.format("%Y-%m-%d %H:%M:%S").to_string()),
                ]);
            }
        }
        None => {
            table.add_row(vec![ui.cell("Last profile:"), ui.cell("(none)")]);
        }
    }

    ui.println(table.to_string());
    Ok(())
}

/// Active devices offered for a role, in snapshot order
fn device_candidates(snapshot: &[AudioDevice], role: DeviceRole) -> Vec<&AudioDevice> {
    devices_for_role(snapshot, role)
        .into_iter()
        .filter(|d| d.is_active)
        .collect()
}

/// Device id for the option at `index`. The trailing option means no device.
///
/// Names are not unique, so the answer is mapped by position, never by label.
pub fn chosen_device_id(candidates: &[&AudioDevice], index: usize) -> Option<String> {
    candidates.get(index).map(|d| d.id.clone())
}

/// Interactive device choice for one role. `None` means no device.
fn select_device(snapshot: &[AudioDevice], role: DeviceRole) -> Result<Option<String>> {
    let candidates = device_candidates(snapshot, role);

    let mut options: Vec<String> = candidates.iter().map(|d| d.display_name()).collect();
    options.push("(none)".to_string());

    let start = candidates.iter().position(|d| d.is_default).unwrap_or(0);
    let choice = Select::new(&format!("{} device:", role), options)
        .with_starting_cursor(start)
        .with_help_message("Enter to confirm, choose (none) if this profile should not switch this role")
        .raw_prompt()
        .context("Device selection cancelled")?;

    Ok(chosen_device_id(&candidates, choice.index))
}

/// Add a new profile from device ids given on the command line
pub fn add(
    store: &dyn ProfileStore,
    name: &str,
    output: Option<String>,
    input: Option<String>,
    ui: &Ui,
) -> Result<()> {
    let profile = create_profile(store, name, output, input).map_err(|e| match e {
        ProfileError::DuplicateName(_) => anyhow::anyhow!(
            "{}\nHint: Use 'audiodeck edit \"{}\"' to modify it, or choose a different name.",
            e,
            name
        ),
        other => other.into(),
    })?;

    ui.ok(format!("Created profile \"{}\" ({})", profile.name, profile.role_summary()));
    ui.newline();
    ui.println("To activate it:");
    ui.println(format!("  audiodeck --profile \"{}\"", profile.name));
    Ok(())
}

/// Add a new profile, choosing each device from the live snapshot
pub fn add_interactive(
    store: &dyn ProfileStore,
    enumerator: &dyn DeviceEnumerator,
    name: &str,
    ui: &Ui,
) -> Result<()> {
    // Fail on a bad name before prompting
    validate_profile_name(name)?;

    let snapshot = enumerator
        .list_devices()
        .context("Failed to enumerate audio devices")?;
    let output = select_device(&snapshot, DeviceRole::Output)?;
    let input = select_device(&snapshot, DeviceRole::Input)?;
    add(store, name, output, input, ui)
}

/// Apply changes to a profile
pub fn edit(store: &dyn ProfileStore, name: &str, update: ProfileUpdate, ui: &Ui) -> Result<()> {
    if update.is_empty() {
        bail!(
            "Nothing to change.\nHint: Use --name, --output, --input, --clear-output or --clear-input."
        );
    }

    let profile = update_profile(store, name, update)?;
    ui.ok(format!("Updated profile \"{}\" ({})", profile.name, profile.role_summary()));
    Ok(())
}

/// Remove a profile
pub fn remove(paths: &Paths, store: &dyn ProfileStore, name: &str, force: bool, ui: &Ui) -> Result<()> {
    // Surface NotFound before prompting
    let profile = find_profile(store, name)?;

    if !force {
        let confirm = Confirm::new(&format!("Are you sure you want to remove profile \"{}\"?", name))
            .with_default(false)
            .prompt()
            .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Removal cancelled.");
            return Ok(());
        }
    }

    // A corrupt state file fails here, before anything is deleted
    let mut locked = LockedState::lock(&paths.state_file)?;

    delete_profile(store, name)?;

    if locked.state().last_profile_id == Some(profile.id) {
        locked.update(|s| {
            s.last_profile = None;
            s.last_profile_id = None;
        })?;
    }

    ui.ok(format!("Removed profile \"{}\"", name));
    Ok(())
}

/// Show a profile and how its devices resolve right now
pub fn inspect(
    store: &dyn ProfileStore,
    enumerator: &dyn DeviceEnumerator,
    name: &str,
    ui: &Ui,
) -> Result<()> {
    let profile = find_profile(store, name)?;

    ui.section(format!("Profile: {}", profile.name));
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![ui.cell("ID:"), ui.cell(profile.id.to_string())]);
    table.add_row(vec![
        ui.cell("Created:"),
        ui.cell(profile.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]);
    table.add_row(vec![
        ui.cell("Updated:"),
        ui.cell(profile.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]);
    ui.println(table.to_string());
    ui.newline();

    // A failed snapshot still lets the stored ids be shown
    let snapshot = match enumerator.list_devices() {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            ui.warn(format!("Could not enumerate devices: {}", e));
            None
        }
    };

    let mut devices_table = ui.simple_table();
    devices_table.set_header(vec![
        ui.header_cell("Role"),
        ui.header_cell("Device"),
        ui.header_cell("Status"),
    ]);

    for role in DeviceRole::all() {
        let Some(id) = profile.device_id(role) else {
            devices_table.add_row(vec![
                ui.cell(role.display_name()),
                ui.cell("-"),
                ui.cell("not set"),
            ]);
            continue;
        };

        let (label, status) = match snapshot.as_deref().map(|s| resolve_status(s, role, id)) {
            Some(Resolution::Ready(device)) => (device.name.clone(), ui.colored_cell("ok", AnsiColor::Green)),
            Some(Resolution::Inactive(device)) => {
                (device.name.clone(), ui.colored_cell("inactive", AnsiColor::Yellow))
            }
            Some(Resolution::Missing) => (id.to_string(), ui.colored_cell("missing", AnsiColor::Red)),
            None => (id.to_string(), ui.cell("unknown")),
        };
        devices_table.add_row(vec![ui.cell(role.display_name()), ui.cell(label), status]);
    }

    ui.println(devices_table.to_string());
    Ok(())
}

/// How a stored device reference resolves against a snapshot
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    Ready(&'a AudioDevice),
    Inactive(&'a AudioDevice),
    Missing,
}

pub fn resolve_status<'a>(snapshot: &'a [AudioDevice], role: DeviceRole, id: &str) -> Resolution<'a> {
    if let Some(device) = find_active(snapshot, role, id) {
        return Resolution::Ready(device);
    }
    match snapshot.iter().find(|d| d.role == role && d.id == id) {
        Some(device) => Resolution::Inactive(device),
        None => Resolution::Missing,
    }
}

/// Run diagnostics
pub fn doctor(
    paths: &Paths,
    store: &dyn ProfileStore,
    enumerator: &dyn DeviceEnumerator,
    ui: &Ui,
) -> Result<bool> {
    Ok(run_doctor(paths, store, enumerator, ui))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ControllerError;
    use crate::test_utils::{
        FakeEnumerator, MemoryProfileStore, RecordingController, device, setup_test_paths,
    };
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    fn test_ui() -> Ui {
        Ui::new(ColorMode::Never, false)
    }

    fn snapshot() -> Vec<AudioDevice> {
        vec![
            device("A", DeviceRole::Output, true),
            device("B", DeviceRole::Input, true),
            device("C", DeviceRole::Output, false),
        ]
    }

    #[test]
    fn test_list_empty() {
        let store = MemoryProfileStore::default();
        assert!(list(&store, &test_ui()).is_ok());
    }

    #[test]
    fn test_profile_line() {
        let both = AudioProfile::new("Gaming Setup", Some("A".into()), Some("B".into()));
        assert_eq!(profile_line(&both), "• Gaming Setup (Output + Input)");

        let output_only = AudioProfile::new("Speakers", Some("A".into()), None);
        assert_eq!(profile_line(&output_only), "• Speakers (Output)");
    }

    #[test]
    fn test_chosen_device_id_with_duplicate_names() {
        let mut first = device("X", DeviceRole::Output, true);
        let mut second = device("Y", DeviceRole::Output, true);
        first.name = "Speakers".to_string();
        second.name = "Speakers".to_string();
        let snapshot = vec![first, second, device("mic", DeviceRole::Input, true)];

        let candidates = device_candidates(&snapshot, DeviceRole::Output);
        assert_eq!(candidates.len(), 2);
        assert_eq!(chosen_device_id(&candidates, 0).as_deref(), Some("X"));
        assert_eq!(chosen_device_id(&candidates, 1).as_deref(), Some("Y"));
        assert_eq!(chosen_device_id(&candidates, 2), None);
    }

    #[test]
    fn test_chosen_device_named_none() {
        let mut odd = device("Z", DeviceRole::Input, true);
        odd.name = "(none)".to_string();
        let snapshot = vec![odd, device("off", DeviceRole::Input, false)];

        let candidates = device_candidates(&snapshot, DeviceRole::Input);
        assert_eq!(candidates.len(), 1);
        assert_eq!(chosen_device_id(&candidates, 0).as_deref(), Some("Z"));
        assert_eq!(chosen_device_id(&candidates, 1), None);
    }

    #[test]
    fn test_switch_success_records_state() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();
        let profile = create_profile(&store, "Gaming Setup", Some("A".into()), Some("B".into()))
            .unwrap();

        let enumerator = FakeEnumerator::new(snapshot());
        let controller = RecordingController::default();
        let engine = SwitchEngine::new(&enumerator, &controller);

        let ok = switch_profile(&paths, &store, &engine, "Gaming Setup", &test_ui()).unwrap();
        assert!(ok);

        let state = State::read(&paths.state_file).unwrap();
        assert_eq!(state.last_profile.as_deref(), Some("Gaming Setup"));
        assert_eq!(state.last_profile_id, Some(profile.id));
    }

    #[test]
    fn test_switch_partial_failure_reports_false() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();
        create_profile(&store, "Headset", Some("A".into()), Some("gone".into())).unwrap();

        let enumerator = FakeEnumerator::new(snapshot());
        let controller = RecordingController::default();
        let engine = SwitchEngine::new(&enumerator, &controller);

        let ok = switch_profile(&paths, &store, &engine, "Headset", &test_ui()).unwrap();
        assert!(!ok);
        assert_eq!(controller.calls(), vec![(DeviceRole::Output, "A".to_string())]);

        // Partial switches are not recorded as the active profile
        let state = State::read(&paths.state_file).unwrap();
        assert!(state.last_profile.is_none());
    }

    #[test]
    fn test_switch_unknown_profile_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();
        create_profile(&store, "Gaming Setup", Some("A".into()), None).unwrap();

        let enumerator = FakeEnumerator::new(snapshot());
        let controller = RecordingController::default();
        let engine = SwitchEngine::new(&enumerator, &controller);

        let err = switch_profile(&paths, &store, &engine, "gaming setup", &test_ui()).unwrap_err();
        assert!(err.to_string().contains("not found"));
        assert_eq!(enumerator.call_count(), 0);
    }

    #[test]
    fn test_switch_enumeration_failure_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();
        create_profile(&store, "Gaming Setup", Some("A".into()), None).unwrap();

        let enumerator = FakeEnumerator::failing();
        let controller = RecordingController::default();
        let engine = SwitchEngine::new(&enumerator, &controller);

        assert!(switch_profile(&paths, &store, &engine, "Gaming Setup", &test_ui()).is_err());
        assert!(controller.calls().is_empty());
    }

    #[test]
    fn test_outcome_lines() {
        let profile = AudioProfile::new("Gaming Setup", Some("A".into()), Some("B".into()));
        let result = SwitchResult {
            output: RoleOutcome::Succeeded,
            input: RoleOutcome::DeviceNotFound,
            output_device: Some(device("A", DeviceRole::Output, true)),
            input_device: None,
        };

        assert_eq!(
            outcome_line(&profile, &result, DeviceRole::Output),
            "Output: switched to Device A"
        );
        assert_eq!(
            outcome_line(&profile, &result, DeviceRole::Input),
            "Input: device B not found"
        );

        let failed = SwitchResult {
            output: RoleOutcome::NotRequested,
            input: RoleOutcome::ControllerFailed(ControllerError::DeviceUnavailable("gone".into())),
            output_device: None,
            input_device: Some(device("B", DeviceRole::Input, true)),
        };
        assert_eq!(outcome_line(&profile, &failed, DeviceRole::Output), "Output: not requested");
        assert_eq!(
            outcome_line(&profile, &failed, DeviceRole::Input),
            "Input: failed: device unavailable: gone"
        );
    }

    #[test]
    fn test_add_with_flags() {
        let store = MemoryProfileStore::default();

        add(&store, "Speakers", Some("A".into()), None, &test_ui()).unwrap();
        let err = add(&store, "Speakers", Some("A".into()), None, &test_ui()).unwrap_err();
        assert!(err.to_string().contains("Hint"));
        assert!(add(&store, "Empty", None, None, &test_ui()).is_err());
    }

    #[test]
    fn test_add_interactive_rejects_bad_name_before_enumerating() {
        let store = MemoryProfileStore::default();
        let enumerator = FakeEnumerator::new(snapshot());

        assert!(add_interactive(&store, &enumerator, "   ", &test_ui()).is_err());
        assert_eq!(enumerator.call_count(), 0);
    }

    #[test]
    fn test_edit_requires_a_change() {
        let store = MemoryProfileStore::default();
        create_profile(&store, "Speakers", Some("A".into()), None).unwrap();
        assert!(edit(&store, "Speakers", ProfileUpdate::default(), &test_ui()).is_err());

        let update = ProfileUpdate {
            input_device_id: Some(Some("B".into())),
            ..Default::default()
        };
        edit(&store, "Speakers", update, &test_ui()).unwrap();
        assert!(find_profile(&store, "Speakers").unwrap().has_input());
    }

    #[test]
    fn test_remove_forced_clears_state() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let store = MemoryProfileStore::default();
        let profile = create_profile(&store, "Speakers", Some("A".into()), None).unwrap();

        State {
            last_profile: Some("Speakers".into()),
            last_profile_id: Some(profile.id),
            updated_at: None,
        }
        .write(&paths.state_file)
        .unwrap();

        remove(&paths, &store, "Speakers", true, &test_ui()).unwrap();
        assert!(store.list_profiles().unwrap().is_empty());
        assert!(State::read(&paths.state_file).unwrap().last_profile.is_none());
        assert!(remove(&paths, &store, "Speakers", true, &test_ui()).is_err());
    }

    #[test]
    fn test_remove_with_corrupt_state_keeps_profile() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        paths.ensure_dirs().unwrap();
        std::fs::write(&paths.state_file, "{ nope").unwrap();

        let store = MemoryProfileStore::default();
        create_profile(&store, "Speakers", Some("A".into()), None).unwrap();

        assert!(remove(&paths, &store, "Speakers", true, &test_ui()).is_err());
        assert!(find_profile(&store, "Speakers").is_ok());
    }

    #[test]
    fn test_current_with_corrupt_state() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        paths.ensure_dirs().unwrap();
        std::fs::write(&paths.state_file, "{ nope").unwrap();

        assert!(read_state_for_display(&paths).last_profile.is_none());
        let enumerator = FakeEnumerator::new(snapshot());
        assert!(current(&paths, &enumerator, &test_ui()).is_ok());
    }

    #[test]
    fn test_resolve_status() {
        let devices = snapshot();
        assert!(matches!(
            resolve_status(&devices, DeviceRole::Output, "A"),
            Resolution::Ready(_)
        ));
        assert!(matches!(
            resolve_status(&devices, DeviceRole::Output, "C"),
            Resolution::Inactive(_)
        ));
        assert_eq!(resolve_status(&devices, DeviceRole::Input, "A"), Resolution::Missing);
    }

    #[test]
    fn test_devices_and_inspect_with_fakes() {
        let store = MemoryProfileStore::default();
        create_profile(&store, "Speakers", Some("C".into()), None).unwrap();
        let enumerator = FakeEnumerator::new(snapshot());
        let ui = test_ui();

        assert!(devices(&enumerator, None, &ui).is_ok());
        assert!(devices(&enumerator, Some(DeviceRole::Input), &ui).is_ok());
        assert!(inspect(&store, &enumerator, "Speakers", &ui).is_ok());
        assert!(inspect(&store, &FakeEnumerator::failing(), "Speakers", &ui).is_ok());
        assert!(devices(&FakeEnumerator::failing(), None, &ui).is_err());
    }

    #[test]
    fn test_current_without_state() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        let enumerator = FakeEnumerator::new(snapshot());
        assert!(current(&paths, &enumerator, &test_ui()).is_ok());
    }
}
