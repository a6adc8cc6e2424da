// config.rs

use crate::cli::Args;
use crate::note::PitchClass;
use crate::processor::DEFAULT_MAX_BLOCK_EVENTS;
use crate::state::OffsetMap;
use crate::tuning::{OffsetChange, TuningTable};
use config::{Config, ConfigError, Environment, File, FileFormat};
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "microtunrs";

/// Runtime settings, layered from defaults, an optional TOML file,
/// `MICROTUNRS_*` environment variables and finally the command line.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input_device: Option<String>,
    pub output_device: Option<String>,
    /// Create virtual ports instead of binding to devices (unix only)
    #[serde(default)]
    pub virtual_port: Option<String>,
    pub max_block_events: usize,
    pub preset_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub preset: Option<String>,
    pub log_level: String,
    /// Initial offsets keyed by stable identifier or note name
    #[serde(default)]
    pub offsets: OffsetMap,
}

impl Settings {
    /// Load from `path`, or the default location when `None`. A missing
    /// file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("max_block_events", DEFAULT_MAX_BLOCK_EVENTS as i64)?
            .set_default("log_level", "info")?;

        if let Some(file) = &config_path(path) {
            builder = builder.add_source(
                File::from(file.as_path())
                    .format(FileFormat::Toml)
                    .required(path.is_some()),
            );
        }

        builder
            .add_source(
                Environment::with_prefix("MICROTUNRS")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Parse settings from TOML text over the built-in defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("max_block_events", DEFAULT_MAX_BLOCK_EVENTS as i64)?
            .set_default("log_level", "info")?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Command-line values win over everything else.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(input) = &args.input {
            self.input_device = Some(input.clone());
        }
        if let Some(output) = &args.output {
            self.output_device = Some(output.clone());
        }
        if let Some(name) = &args.virtual_port {
            self.virtual_port = Some(name.clone());
        }
        if let Some(preset) = &args.preset {
            self.preset = Some(preset.clone());
        }
        if let Some(state_file) = &args.state_file {
            self.state_file = Some(state_file.clone());
        }
        for change in &args.offsets {
            self.offsets
                .insert(change.pitch_class.param_id().to_string(), change.cents);
        }
        debug!("Effective settings: {:?}", self);
    }

    /// Write the configured offsets into `table`. Pitch classes not named
    /// in the settings are left untouched.
    pub fn apply_offsets(&self, table: &TuningTable) {
        for (id, cents) in &self.offsets {
            match id.parse::<PitchClass>() {
                Ok(pitch_class) => {
                    table.apply_change(OffsetChange::new(pitch_class, *cents));
                }
                Err(e) => warn!("Ignoring configured offset: {}", e),
            }
        }
        if !self.offsets.is_empty() {
            info!("Applied {} configured offsets", self.offsets.len());
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    pub fn preset_file(&self) -> Option<PathBuf> {
        self.preset_file
            .clone()
            .or_else(|| data_dir().map(|d| d.join("presets.toml")))
    }
}

/// The file [`Settings::load`] reads: `explicit` if given, otherwise the
/// default location.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(default_config_path)
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_NAME)
            .join("config.toml"),
    )
}

/// `~/.local/share/microtunrs`
pub fn data_dir() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_NAME),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.max_block_events, DEFAULT_MAX_BLOCK_EVENTS);
        assert_eq!(settings.log_level(), log::LevelFilter::Info);
        assert!(settings.offsets.is_empty());
        assert!(settings.input_device.is_none());
    }

    #[test]
    fn test_file_values() {
        let settings = Settings::from_toml(
            r#"
            input_device = "Keystation"
            max_block_events = 64
            log_level = "debug"

            [offsets]
            offset_e = -13.69
            "F#" = 5.5
            "#,
        )
        .unwrap();

        assert_eq!(settings.input_device.as_deref(), Some("Keystation"));
        assert_eq!(settings.max_block_events, 64);
        assert_eq!(settings.log_level(), log::LevelFilter::Debug);

        let table = TuningTable::new();
        table.set_offset(PitchClass::A, 3.0);
        settings.apply_offsets(&table);
        assert_eq!(table.offset(PitchClass::E), -13.69);
        assert_eq!(table.offset(PitchClass::FSharp), 5.5);
        assert_eq!(table.offset(PitchClass::A), 3.0);
    }

    #[test]
    fn test_args_override_file() {
        let mut settings = Settings::from_toml(
            r#"
            input_device = "Keystation"
            [offsets]
            offset_c = 10.0
            "#,
        )
        .unwrap();
        let args = Args::parse_from([
            "test",
            "--input",
            "Launchkey",
            "--offset",
            "C=-20",
        ]);
        settings.apply_args(&args);

        assert_eq!(settings.input_device.as_deref(), Some("Launchkey"));
        assert_eq!(settings.offsets["offset_c"], -20.0);
    }

    #[test]
    fn test_config_path_prefers_explicit_file() {
        let explicit = Path::new("/tmp/microtunrs.toml");
        assert_eq!(config_path(Some(explicit)), Some(explicit.to_path_buf()));
        if let Some(default) = config_path(None) {
            assert!(default.ends_with(".config/microtunrs/config.toml"));
        }
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let missing = Path::new("/nonexistent/microtunrs/config.toml");
        assert!(Settings::load(Some(missing)).is_err());
    }
}
