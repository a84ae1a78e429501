use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use audiodeck::{
    commands,
    device::{AudioDevice, DeviceEnumerator, DeviceRole},
    error::EnumerationError,
    logging,
    paths::Paths,
    platform::SystemAudio,
    profiles::ProfileUpdate,
    store::JsonProfileStore,
    switch::SwitchEngine,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "audiodeck")]
#[command(about = "AudioDeck - switch default audio devices from named profiles")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Run without arguments to pick a profile interactively.")]
struct Cli {
    /// List all profiles
    #[arg(long, conflicts_with = "profile")]
    list: bool,

    /// Switch to the profile with this exact name
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List audio devices known to the system
    Devices {
        /// Only show one role: output or input
        #[arg(long)]
        role: Option<DeviceRole>,
    },

    /// Show the current default devices and last applied profile
    Current,

    /// Show a profile and whether its devices are available
    Inspect {
        /// Name of the profile to inspect
        name: String,
    },

    /// Add a new profile
    Add {
        /// Name of the profile to create
        name: String,

        /// Output device id (see `audiodeck devices`)
        #[arg(long, value_name = "ID")]
        output: Option<String>,

        /// Input device id (see `audiodeck devices`)
        #[arg(long, value_name = "ID")]
        input: Option<String>,
    },

    /// Change a profile's name or devices
    Edit {
        /// Name of the profile to edit
        name: String,

        /// New name for the profile
        #[arg(long = "name", value_name = "NEW_NAME")]
        new_name: Option<String>,

        /// New output device id
        #[arg(long, value_name = "ID", conflicts_with = "clear_output")]
        output: Option<String>,

        /// New input device id
        #[arg(long, value_name = "ID", conflicts_with = "clear_input")]
        input: Option<String>,

        /// Stop switching the output device
        #[arg(long)]
        clear_output: bool,

        /// Stop switching the input device
        #[arg(long)]
        clear_input: bool,
    },

    /// Remove a profile
    Remove {
        /// Name of the profile to remove
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Run diagnostics on the audiodeck setup
    Doctor,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// `Some(None)` clears, `Some(Some(id))` sets, `None` leaves untouched
fn device_change(id: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear { Some(None) } else { id.map(Some) }
}

fn system_audio() -> Result<SystemAudio> {
    SystemAudio::new().context("Failed to open the audio subsystem")
}

fn run(cli: Cli, ui: &Ui) -> Result<bool> {
    let paths = Paths::new()?;
    let store = JsonProfileStore::new(&paths.profiles_file);

    if cli.list {
        commands::list(&store, ui)?;
        return Ok(true);
    }

    if let Some(name) = &cli.profile {
        let audio = system_audio()?;
        let engine = SwitchEngine::new(&audio, &audio);
        return commands::switch_profile(&paths, &store, &engine, name, ui);
    }

    let Some(command) = cli.command else {
        let audio = system_audio()?;
        let engine = SwitchEngine::new(&audio, &audio);
        return commands::interactive(&paths, &store, &engine, ui);
    };

    match command {
        Commands::Devices { role } => commands::devices(&system_audio()?, role, ui)?,
        Commands::Current => commands::current(&paths, &system_audio()?, ui)?,
        Commands::Inspect { name } => commands::inspect(&store, &system_audio()?, &name, ui)?,
        Commands::Add {
            name,
            output,
            input,
        } => {
            paths.ensure_dirs()?;
            if output.is_some() || input.is_some() {
                commands::add(&store, &name, output, input, ui)?
            } else {
                commands::add_interactive(&store, &system_audio()?, &name, ui)?
            }
        }
        Commands::Edit {
            name,
            new_name,
            output,
            input,
            clear_output,
            clear_input,
        } => {
            let update = ProfileUpdate {
                name: new_name,
                output_device_id: device_change(output, clear_output),
                input_device_id: device_change(input, clear_input),
            };
            commands::edit(&store, &name, update, ui)?
        }
        Commands::Remove { name, force } => commands::remove(&paths, &store, &name, force, ui)?,
        Commands::Doctor => {
            // A broken audio stack is something doctor reports, not a startup error
            return match SystemAudio::new() {
                Ok(audio) => commands::doctor(&paths, &store, &audio, ui),
                Err(e) => commands::doctor(&paths, &store, &Unavailable(e.to_string()), ui),
            };
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "audiodeck", &mut std::io::stdout());
        }
    }

    Ok(true)
}

/// Reports why the audio subsystem could not be opened
struct Unavailable(String);

impl DeviceEnumerator for Unavailable {
    fn list_devices(&self) -> Result<Vec<AudioDevice>, EnumerationError> {
        Err(EnumerationError::Backend(self.0.clone()))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let ui = Ui::new(cli.color, cli.no_color);
    logging::init(cli.verbose, ui.color_enabled);

    match run(cli, &ui) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            ui.err(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
