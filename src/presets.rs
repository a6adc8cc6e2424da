//! Named tuning presets.
//!
//! A [`PresetBank`] is an ordered list of named offset snapshots, stored on
//! disk as TOML. The factory bank carries a few historical temperaments
//! expressed as deviations from equal temperament, all rooted on C.

use crate::state::{map_to_offsets, offsets_to_map, OffsetMap, StateError};
use crate::tuning::{TuningSnapshot, TuningTable};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const EQUAL_TEMPERAMENT: &str = "Equal Temperament";

// Cents deviations from 12-TET, C through B.
const JUST_INTONATION_C: [f32; 12] = [
    0.0, 11.73, 3.91, 15.64, -13.69, -1.96, -9.78, 1.96, 13.69, -15.64, 17.6, -11.73,
];
const PYTHAGOREAN_C: [f32; 12] = [
    0.0, -9.78, 3.91, -5.87, 7.82, -1.96, 11.73, 1.96, -7.82, 5.87, -3.91, 9.78,
];
const QUARTER_COMMA_MEANTONE_C: [f32; 12] = [
    0.0, -23.95, -6.84, 10.26, -13.69, 3.42, -20.53, -3.42, -27.37, -10.26, 6.84, -17.11,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub offsets: OffsetMap,
}

impl Preset {
    pub fn new(name: &str, snapshot: &TuningSnapshot) -> Self {
        Self {
            name: name.to_string(),
            saved_at: Utc::now(),
            offsets: offsets_to_map(snapshot),
        }
    }

    pub fn snapshot(&self) -> TuningSnapshot {
        map_to_offsets(&self.offsets)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetBank {
    #[serde(default, rename = "preset")]
    presets: Vec<Preset>,
}

impl PresetBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in temperaments.
    pub fn factory() -> Self {
        let mut bank = Self::new();
        bank.insert(Preset::new(EQUAL_TEMPERAMENT, &TuningSnapshot::default()));
        bank.insert(Preset::new(
            "Just Intonation (C)",
            &TuningSnapshot::from_offsets(JUST_INTONATION_C),
        ));
        bank.insert(Preset::new(
            "Pythagorean (C)",
            &TuningSnapshot::from_offsets(PYTHAGOREAN_C),
        ));
        bank.insert(Preset::new(
            "Quarter-Comma Meantone (C)",
            &TuningSnapshot::from_offsets(QUARTER_COMMA_MEANTONE_C),
        ));
        bank
    }

    /// Loads a bank from a TOML file; a missing file yields an empty bank.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            debug!("No preset file at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let bank: PresetBank = toml::from_str(&contents)?;
        info!("Loaded {} presets from {}", bank.len(), path.display());
        Ok(bank)
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("Saved {} presets to {}", self.len(), path.display());
        Ok(())
    }

    /// Add `preset`, replacing any preset with the same name in place.
    pub fn insert(&mut self, preset: Preset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    /// Store the table's current offsets under `name`.
    pub fn capture(&mut self, name: &str, table: &TuningTable) {
        self.insert(Preset::new(name, &table.snapshot()));
        info!("Captured preset '{}'", name);
    }

    /// Write the named preset into `table`.
    pub fn apply(&self, name: &str, table: &TuningTable) -> Result<(), StateError> {
        let preset = self
            .get(name)
            .ok_or_else(|| StateError::UnknownPreset(name.to_string()))?;
        table.restore(&preset.snapshot());
        info!("Applied preset '{}'", name);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Preset> {
        let index = self.presets.iter().position(|p| p.name == name)?;
        Some(self.presets.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn get_index(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.name.as_str()).collect()
    }

    /// Presets from `other` override same-named presets here.
    pub fn merge(&mut self, other: PresetBank) {
        for preset in other.presets {
            self.insert(preset);
        }
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

/// Factory presets plus the user's own bank. Only the user bank is ever
/// written back to disk.
#[derive(Debug, Clone)]
pub struct PresetLibrary {
    factory: PresetBank,
    user: PresetBank,
    user_path: Option<PathBuf>,
}

impl PresetLibrary {
    pub fn new(user: PresetBank, user_path: Option<PathBuf>) -> Self {
        Self {
            factory: PresetBank::factory(),
            user,
            user_path,
        }
    }

    /// Reads the user bank from `user_path`. A malformed file is logged and
    /// treated as empty.
    pub fn load(user_path: Option<PathBuf>) -> Self {
        let user = match &user_path {
            Some(path) => PresetBank::load(path).unwrap_or_else(|e| {
                warn!("Ignoring preset file {}: {}", path.display(), e);
                PresetBank::new()
            }),
            None => PresetBank::new(),
        };
        Self::new(user, user_path)
    }

    /// Factory presets first, user presets overriding same-named ones.
    pub fn merged(&self) -> PresetBank {
        let mut all = self.factory.clone();
        all.merge(self.user.clone());
        all
    }

    pub fn names(&self) -> Vec<String> {
        self.merged().names().into_iter().map(str::to_string).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.user.get(name).or_else(|| self.factory.get(name))
    }

    pub fn apply(&self, name: &str, table: &TuningTable) -> Result<(), StateError> {
        if self.user.get(name).is_some() {
            self.user.apply(name, table)
        } else {
            self.factory.apply(name, table)
        }
    }

    /// Store the table's offsets as a user preset.
    pub fn capture(&mut self, name: &str, table: &TuningTable) {
        self.user.capture(name, table);
    }

    /// Writes the user bank. Returns `Ok(false)` when no file is configured.
    pub fn save(&self) -> Result<bool, StateError> {
        match &self.user_path {
            Some(path) => {
                self.user.save(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn user(&self) -> &PresetBank {
        &self.user
    }

    pub fn user_path(&self) -> Option<&Path> {
        self.user_path.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.factory.is_empty() && self.user.is_empty()
    }
}
