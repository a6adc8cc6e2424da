//! Tuning table
//!
//! Holds one cents offset per pitch class. Offsets are written from
//! configuration/UI threads and read from the processing thread, so every
//! slot is an independent lock-free atomic cell.

use crate::note::PitchClass;
use crossbeam::atomic::AtomicCell;
use log::{debug, warn};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

pub const MIN_OFFSET_CENTS: f32 = -100.0;
pub const MAX_OFFSET_CENTS: f32 = 100.0;

/// Errors raised when configuring the table through identifiers or text.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// No pitch class uses this stable identifier
    UnknownParameter(String),
    /// A `NAME=CENTS` assignment could not be parsed
    InvalidAssignment(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::UnknownParameter(id) => write!(f, "Unknown tuning parameter: {}", id),
            TuningError::InvalidAssignment(msg) => write!(f, "Invalid offset assignment: {}", msg),
        }
    }
}

impl Error for TuningError {}

/// A single "offset changed" notification from the configuration layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetChange {
    pub pitch_class: PitchClass,
    pub cents: f32,
}

impl OffsetChange {
    pub fn new(pitch_class: PitchClass, cents: f32) -> Self {
        Self { pitch_class, cents }
    }
}

impl FromStr for OffsetChange {
    type Err = TuningError;

    /// Parses `NAME=CENTS`, e.g. `C#=+12.5` or `offset_e=-13.7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| TuningError::InvalidAssignment(format!("expected NAME=CENTS, got '{}'", s)))?;

        let pitch_class = name
            .parse::<PitchClass>()
            .map_err(TuningError::InvalidAssignment)?;

        let cents = value
            .trim()
            .trim_start_matches('+')
            .parse::<f32>()
            .map_err(|e| TuningError::InvalidAssignment(format!("'{}': {}", value.trim(), e)))?;

        Ok(OffsetChange { pitch_class, cents })
    }
}

/// Plain copy of all 12 offsets, indexed by pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TuningSnapshot {
    offsets: [f32; 12],
}

impl TuningSnapshot {
    pub fn from_offsets(offsets: [f32; 12]) -> Self {
        Self {
            offsets: offsets.map(clamp_cents),
        }
    }

    pub fn offset(&self, pitch_class: PitchClass) -> f32 {
        self.offsets[pitch_class.index()]
    }

    pub fn offsets(&self) -> &[f32; 12] {
        &self.offsets
    }

    pub fn iter(&self) -> impl Iterator<Item = (PitchClass, f32)> + '_ {
        PitchClass::ALL.iter().map(move |pc| (*pc, self.offsets[pc.index()]))
    }
}

/// The 12 per-pitch-class cents offsets.
pub struct TuningTable {
    offsets: [AtomicCell<f32>; 12],
}

impl Default for TuningTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TuningTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TuningTable")
            .field("offsets", self.snapshot().offsets())
            .finish()
    }
}

impl TuningTable {
    /// Creates a table with every offset at 0 cents.
    pub fn new() -> Self {
        Self {
            offsets: std::array::from_fn(|_| AtomicCell::new(0.0)),
        }
    }

    pub fn from_snapshot(snapshot: &TuningSnapshot) -> Self {
        let table = Self::new();
        table.restore(snapshot);
        table
    }

    /// Whether reads and writes avoid locks on this platform.
    pub fn is_lock_free() -> bool {
        AtomicCell::<f32>::is_lock_free()
    }

    /// Current offset for `pitch_class` in cents.
    #[inline]
    pub fn offset(&self, pitch_class: PitchClass) -> f32 {
        self.offsets[pitch_class.index()].load()
    }

    /// Store an offset, clamped to [-100, 100]. Returns the stored value.
    pub fn set_offset(&self, pitch_class: PitchClass, cents: f32) -> f32 {
        let stored = if cents.is_nan() {
            warn!("Rejected NaN offset for {}, storing 0 cents", pitch_class);
            0.0
        } else {
            clamp_cents(cents)
        };

        if stored != cents && !cents.is_nan() {
            debug!(
                "Clamped offset for {} from {} to {} cents",
                pitch_class, cents, stored
            );
        }

        self.offsets[pitch_class.index()].store(stored);
        stored
    }

    /// Apply a configuration delta delivered by the parameter layer.
    pub fn apply_change(&self, change: OffsetChange) -> f32 {
        self.set_offset(change.pitch_class, change.cents)
    }

    /// Store an offset addressed by its stable identifier.
    pub fn set_by_id(&self, id: &str, cents: f32) -> Result<f32, TuningError> {
        let pitch_class = PitchClass::from_param_id(id)
            .ok_or_else(|| TuningError::UnknownParameter(id.to_string()))?;
        Ok(self.set_offset(pitch_class, cents))
    }

    pub fn get_by_id(&self, id: &str) -> Result<f32, TuningError> {
        PitchClass::from_param_id(id)
            .map(|pc| self.offset(pc))
            .ok_or_else(|| TuningError::UnknownParameter(id.to_string()))
    }

    pub fn snapshot(&self) -> TuningSnapshot {
        TuningSnapshot {
            offsets: std::array::from_fn(|i| self.offsets[i].load()),
        }
    }

    pub fn restore(&self, snapshot: &TuningSnapshot) {
        for (pitch_class, cents) in snapshot.iter() {
            self.set_offset(pitch_class, cents);
        }
    }

    /// Return every offset to 0 cents.
    pub fn reset(&self) {
        for cell in &self.offsets {
            cell.store(0.0);
        }
    }
}

fn clamp_cents(cents: f32) -> f32 {
    cents.clamp(MIN_OFFSET_CENTS, MAX_OFFSET_CENTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults_are_zero() {
        let table = TuningTable::new();
        for pc in PitchClass::ALL {
            assert_eq!(table.offset(pc), 0.0);
        }
    }

    #[test]
    fn test_set_offset_clamps() {
        let table = TuningTable::new();
        assert_eq!(table.set_offset(PitchClass::C, 150.0), 100.0);
        assert_eq!(table.set_offset(PitchClass::D, -101.0), -100.0);
        assert_eq!(table.set_offset(PitchClass::E, f32::INFINITY), 100.0);
        assert_eq!(table.set_offset(PitchClass::F, f32::NAN), 0.0);
        assert_eq!(table.offset(PitchClass::C), 100.0);
        assert_eq!(table.offset(PitchClass::D), -100.0);
    }

    #[test]
    fn test_offsets_are_independent() {
        let table = TuningTable::new();
        table.set_offset(PitchClass::A, -15.64);
        assert_eq!(table.offset(PitchClass::A), -15.64);
        assert_eq!(table.offset(PitchClass::ASharp), 0.0);
        assert_eq!(table.offset(PitchClass::GSharp), 0.0);
    }

    #[test]
    fn test_set_by_id() {
        let table = TuningTable::new();
        assert_eq!(table.set_by_id("offset_f_sharp", 12.0), Ok(12.0));
        assert_eq!(table.offset(PitchClass::FSharp), 12.0);
        assert_eq!(table.get_by_id("offset_f_sharp"), Ok(12.0));
        assert_eq!(
            table.set_by_id("offset_h", 1.0),
            Err(TuningError::UnknownParameter("offset_h".to_string()))
        );
    }

    #[test]
    fn test_snapshot_restore() {
        let table = TuningTable::new();
        table.set_offset(PitchClass::E, -13.69);
        table.set_offset(PitchClass::B, -11.73);
        let snapshot = table.snapshot();

        table.reset();
        assert_eq!(table.offset(PitchClass::E), 0.0);

        table.restore(&snapshot);
        assert_eq!(table.snapshot(), snapshot);
    }

    #[test]
    fn test_offset_change_parsing() {
        let change: OffsetChange = "C#=+12.5".parse().unwrap();
        assert_eq!(change, OffsetChange::new(PitchClass::CSharp, 12.5));

        let change: OffsetChange = "offset_e = -13.7".parse().unwrap();
        assert_eq!(change, OffsetChange::new(PitchClass::E, -13.7));

        assert!("C#".parse::<OffsetChange>().is_err());
        assert!("X=1".parse::<OffsetChange>().is_err());
        assert!("C=abc".parse::<OffsetChange>().is_err());
    }

    #[test]
    fn test_atomic_cells_are_lock_free() {
        assert!(TuningTable::is_lock_free());
    }

    #[test]
    fn test_concurrent_writer_and_reader() {
        let table = Arc::new(TuningTable::new());
        let writer_table = table.clone();

        let writer = thread::spawn(move || {
            for i in 0..1000 {
                writer_table.set_offset(PitchClass::G, (i % 201) as f32 - 100.0);
            }
        });

        for _ in 0..1000 {
            let value = table.offset(PitchClass::G);
            assert!((MIN_OFFSET_CENTS..=MAX_OFFSET_CENTS).contains(&value));
        }

        writer.join().unwrap();
    }
}
