use crate::tuning::OffsetChange;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI devices
    #[arg(long)]
    pub device_list: bool,

    /// MIDI input to retune (substring match)
    #[arg(long)]
    pub input: Option<String>,

    /// MIDI output that receives the retuned stream (substring match)
    #[arg(long)]
    pub output: Option<String>,

    /// Open virtual in/out ports with this name instead of devices
    #[arg(long, value_name = "NAME")]
    pub virtual_port: Option<String>,

    /// Configuration file (defaults to ~/.config/microtunrs/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Apply a named preset at startup
    #[arg(long)]
    pub preset: Option<String>,

    /// List available presets
    #[arg(long)]
    pub list_presets: bool,

    /// Set one offset, e.g. --offset E=-13.69 (repeatable)
    #[arg(long = "offset", value_name = "NOTE=CENTS", action = ArgAction::Append)]
    pub offsets: Vec<OffsetChange>,

    /// Restore from and save to this tuning state file
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Interactive console for editing offsets while running
    #[arg(long, short)]
    pub interactive: bool,

    /// Show a live status line
    #[arg(long, short)]
    pub monitor: bool,
}

pub fn handle_device_list() -> Vec<String> {
    crate::midi::list_devices()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    fn tag(self) -> &'static str {
        match self {
            PortDirection::Input => " [Input]",
            PortDirection::Output => " [Output]",
        }
    }
}

/// Port names usable in `direction`, with the direction tag removed.
/// Untagged names are assumed to work both ways.
pub fn ports_for(devices: &[String], direction: PortDirection) -> Vec<String> {
    let other = match direction {
        PortDirection::Input => PortDirection::Output,
        PortDirection::Output => PortDirection::Input,
    };
    devices
        .iter()
        .filter(|d| !d.ends_with(other.tag()))
        .map(|d| d.strip_suffix(direction.tag()).unwrap_or(d).to_string())
        .collect()
}

/// Substring match against the device list, returning the full port name.
pub fn validate_device(device_name: &str, devices: &[String]) -> Result<String, String> {
    match devices.iter().find(|d| d.contains(device_name)) {
        Some(found) => Ok(found.clone()),
        None => {
            let mut error_msg = format!(
                "Error: Device '{}' not found in available devices:\n",
                device_name
            );
            for device in devices {
                error_msg.push_str(&format!("  - {}\n", device));
            }
            Err(error_msg)
        }
    }
}
