//! Host-state persistence for the tuning table.
//!
//! The table is stored as a small versioned JSON document keyed by each
//! pitch class's stable identifier, so a saved session restores to exactly
//! the same corrections.

use crate::note::PitchClass;
use crate::tuning::{TuningSnapshot, TuningTable};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

pub const STATE_VERSION: u32 = 1;

/// Errors from saving or loading tuning state and presets
#[derive(Debug)]
pub enum StateError {
    Io(io::Error),
    Json(serde_json::Error),
    TomlRead(toml::de::Error),
    TomlWrite(toml::ser::Error),
    /// Document written by a newer version
    UnsupportedVersion(u32),
    UnknownPreset(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::Io(e) => write!(f, "State I/O error: {}", e),
            StateError::Json(e) => write!(f, "Malformed tuning state: {}", e),
            StateError::TomlRead(e) => write!(f, "Malformed preset file: {}", e),
            StateError::TomlWrite(e) => write!(f, "Could not encode presets: {}", e),
            StateError::UnsupportedVersion(v) => {
                write!(f, "Unsupported tuning state version: {}", v)
            }
            StateError::UnknownPreset(name) => write!(f, "Unknown preset: {}", name),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StateError::Io(e) => Some(e),
            StateError::Json(e) => Some(e),
            StateError::TomlRead(e) => Some(e),
            StateError::TomlWrite(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StateError {
    fn from(e: io::Error) -> Self {
        StateError::Io(e)
    }
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Json(e)
    }
}

impl From<toml::de::Error> for StateError {
    fn from(e: toml::de::Error) -> Self {
        StateError::TomlRead(e)
    }
}

impl From<toml::ser::Error> for StateError {
    fn from(e: toml::ser::Error) -> Self {
        StateError::TomlWrite(e)
    }
}

/// Offsets keyed by stable identifier, the shape shared by state and presets.
pub type OffsetMap = BTreeMap<String, f32>;

pub fn offsets_to_map(snapshot: &TuningSnapshot) -> OffsetMap {
    snapshot
        .iter()
        .map(|(pc, cents)| (pc.param_id().to_string(), cents))
        .collect()
}

/// Build a snapshot from an id-keyed map. Missing ids read as 0 cents;
/// unknown ids are logged and skipped.
pub fn map_to_offsets(map: &OffsetMap) -> TuningSnapshot {
    let mut offsets = [0.0f32; 12];
    for (id, cents) in map {
        match id.parse::<PitchClass>() {
            Ok(pc) => offsets[pc.index()] = *cents,
            Err(_) => warn!("Ignoring unknown tuning parameter '{}'", id),
        }
    }
    TuningSnapshot::from_offsets(offsets)
}

/// Serializable image of the tuning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningState {
    pub version: u32,
    pub offsets: OffsetMap,
}

impl TuningState {
    pub fn capture(table: &TuningTable) -> Self {
        Self {
            version: STATE_VERSION,
            offsets: offsets_to_map(&table.snapshot()),
        }
    }

    pub fn snapshot(&self) -> TuningSnapshot {
        map_to_offsets(&self.offsets)
    }

    /// Overwrite every offset in `table`.
    pub fn restore(&self, table: &TuningTable) {
        table.restore(&self.snapshot());
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StateError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, StateError> {
        let state: TuningState = serde_json::from_slice(data)?;
        if state.version > STATE_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_bytes()?)?;
        info!("Saved tuning state to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StateError> {
        let data = fs::read(path)?;
        let state = Self::from_bytes(&data)?;
        info!("Loaded tuning state from {}", path.display());
        Ok(state)
    }
}
