//! Event retuner
//!
//! Rewrites one block of MIDI events so that every pitch class sounds at its
//! configured cents offset. Each Note-On is followed by a synthetic
//! Pitch-Wheel message carrying the tuning correction, and incoming
//! Pitch-Wheel messages are re-based onto the correction of the most
//! recently struck note so manual bends and tuning add up.
//!
//! The tracking is monophonic: one "last played note" slot, overwritten by
//! every Note-On and never cleared by Note-Off. A bend that arrives after the
//! note was released still uses that note's correction.

use crate::midi::{MidiBlock, MidiEvent, MidiMessage};
use crate::note::{classify, NoteClassification};
use crate::pitch_wheel::{apply_delta, cents_to_wheel_delta, PITCH_WHEEL_CENTER};
use crate::tuning::{TuningSnapshot, TuningTable};

/// Single-slot memory of the most recently triggered note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayingNote {
    last: NoteClassification,
}

impl PlayingNote {
    pub fn new() -> Self {
        Self {
            last: NoteClassification::UNDEFINED,
        }
    }

    #[inline]
    pub fn get(&self) -> NoteClassification {
        self.last
    }

    #[inline]
    pub fn update(&mut self, note: NoteClassification) {
        self.last = note;
    }

    /// Wheel delta currently applied to bends; 0 until a note has been played.
    #[inline]
    pub fn correction(&self, offsets: &TuningSnapshot) -> i32 {
        if self.last.defined {
            cents_to_wheel_delta(offsets.offset(self.last.pitch_class))
        } else {
            0
        }
    }
}

/// Stateful block transformer. Owns the only cross-block state besides the
/// tuning table.
#[derive(Debug, Clone)]
pub struct EventRetuner {
    playing: PlayingNote,
    scratch: MidiBlock,
}

impl EventRetuner {
    /// `block_capacity` must match the capacity of the blocks passed to
    /// [`EventRetuner::retune_block`].
    pub fn with_capacity(block_capacity: usize) -> Self {
        Self {
            playing: PlayingNote::new(),
            scratch: MidiBlock::with_capacity(block_capacity),
        }
    }

    pub fn block_capacity(&self) -> usize {
        self.scratch.capacity()
    }

    /// Reallocate the scratch block. Not real-time safe.
    pub fn set_block_capacity(&mut self, block_capacity: usize) {
        self.scratch = MidiBlock::with_capacity(block_capacity);
    }

    pub fn last_played_note(&self) -> NoteClassification {
        self.playing.get()
    }

    /// Forget the last played note.
    pub fn reset(&mut self) {
        self.playing = PlayingNote::new();
        self.scratch.clear();
    }

    /// Replace the contents of `block` with the retuned sequence.
    ///
    /// The offsets are read once, so every event in the block sees the same
    /// tuning even while another thread is writing the table. Runs in time
    /// linear in the number of events and performs no allocation as long as
    /// `block` has the retuner's capacity.
    pub fn retune_block(&mut self, tuning: &TuningTable, block: &mut MidiBlock) {
        let offsets = tuning.snapshot();
        self.retune_block_with(&offsets, block);
    }

    /// [`EventRetuner::retune_block`] against a fixed set of offsets.
    pub fn retune_block_with(&mut self, offsets: &TuningSnapshot, block: &mut MidiBlock) {
        self.scratch.clear();

        for sequenced in block.iter() {
            retune_event(&mut self.playing, offsets, &sequenced.event, &mut self.scratch);
        }

        std::mem::swap(block, &mut self.scratch);
        self.scratch.clear();
    }
}

fn retune_event(
    playing: &mut PlayingNote,
    offsets: &TuningSnapshot,
    event: &MidiEvent,
    output: &mut MidiBlock,
) {
    match event.message {
        MidiMessage::NoteOn { channel, note, velocity } if velocity > 0 => {
            let classification = classify(note);
            playing.update(classification);

            let offset = offsets.offset(classification.pitch_class);
            let value = apply_delta(PITCH_WHEEL_CENTER, cents_to_wheel_delta(offset));

            output.push(*event);
            output.push(event.with(MidiMessage::PitchWheel { channel, value }));
        }

        MidiMessage::PitchWheel { channel, value } => {
            let corrected = apply_delta(value, playing.correction(offsets));
            output.push(event.with(MidiMessage::PitchWheel {
                channel,
                value: corrected,
            }));
        }

        // Note-Off, velocity-0 Note-On and everything else
        _ => {
            output.push(*event);
        }
    }
}
