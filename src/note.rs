//! Note classification
//!
//! Maps an absolute MIDI note number onto its pitch class and octave using
//! the General MIDI convention where note 60 is middle C (C4) and note 0
//! sits in octave -1.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest legal MIDI note number.
pub const MAX_NOTE_NUMBER: u8 = 127;

/// One of the 12 chromatic note names within an octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C = 0,
    CSharp = 1,
    D = 2,
    DSharp = 3,
    E = 4,
    F = 5,
    FSharp = 6,
    G = 7,
    GSharp = 8,
    A = 9,
    ASharp = 10,
    B = 11,
}

impl PitchClass {
    /// All pitch classes in ascending order, C first.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Note name as printed on a keyboard ("C", "C#", ...).
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Stable identifier used for configuration, host state and presets.
    pub fn param_id(self) -> &'static str {
        match self {
            PitchClass::C => "offset_c",
            PitchClass::CSharp => "offset_c_sharp",
            PitchClass::D => "offset_d",
            PitchClass::DSharp => "offset_d_sharp",
            PitchClass::E => "offset_e",
            PitchClass::F => "offset_f",
            PitchClass::FSharp => "offset_f_sharp",
            PitchClass::G => "offset_g",
            PitchClass::GSharp => "offset_g_sharp",
            PitchClass::A => "offset_a",
            PitchClass::ASharp => "offset_a_sharp",
            PitchClass::B => "offset_b",
        }
    }

    pub fn from_param_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|pc| pc.param_id() == id)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PitchClass {
    type Err = String;

    /// Accepts sharp names ("C#"), flat names ("Db") and stable identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(pc) = Self::from_param_id(trimmed) {
            return Ok(pc);
        }

        let upper = trimmed.to_ascii_uppercase();
        let pc = match upper.as_str() {
            "C" | "B#" => PitchClass::C,
            "C#" | "DB" => PitchClass::CSharp,
            "D" => PitchClass::D,
            "D#" | "EB" => PitchClass::DSharp,
            "E" | "FB" => PitchClass::E,
            "F" | "E#" => PitchClass::F,
            "F#" | "GB" => PitchClass::FSharp,
            "G" => PitchClass::G,
            "G#" | "AB" => PitchClass::GSharp,
            "A" => PitchClass::A,
            "A#" | "BB" => PitchClass::ASharp,
            "B" | "CB" => PitchClass::B,
            _ => return Err(format!("Unknown pitch class: '{}'", trimmed)),
        };
        Ok(pc)
    }
}

/// Classification of a single note number.
///
/// `defined == false` marks the "no note played yet" state; the other fields
/// are meaningless in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteClassification {
    pub pitch_class: PitchClass,
    pub octave: i8,
    pub note_number: u8,
    pub defined: bool,
}

impl NoteClassification {
    pub const UNDEFINED: NoteClassification = NoteClassification {
        pitch_class: PitchClass::C,
        octave: -1,
        note_number: 0,
        defined: false,
    };

    pub fn is_defined(&self) -> bool {
        self.defined
    }
}

impl Default for NoteClassification {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl fmt::Display for NoteClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "{}{}", self.pitch_class, self.octave)
        } else {
            f.write_str("-")
        }
    }
}

/// Classify a MIDI note number. Numbers above 127 are clamped to 127.
pub fn classify(note_number: u8) -> NoteClassification {
    let note_number = note_number.min(MAX_NOTE_NUMBER);
    let pitch_class = PitchClass::ALL[usize::from(note_number % 12)];
    let octave = (note_number / 12) as i8 - 1;

    NoteClassification {
        pitch_class,
        octave,
        note_number,
        defined: true,
    }
}
