//! Per-block processing entry point.
//!
//! [`TuningProcessor`] is what a host callback drives: it takes a block of
//! audio plus the block's MIDI events, leaves the audio alone (or silences
//! it) and replaces the MIDI events with their retuned sequence.

use crate::midi::MidiBlock;
use crate::note::NoteClassification;
use crate::retuner::EventRetuner;
use crate::tuning::TuningTable;
use log::{debug, info};
use std::sync::Arc;

/// Default number of incoming events one block may carry.
pub const DEFAULT_MAX_BLOCK_EVENTS: usize = 256;

pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

/// What happens to the audio that accompanies a MIDI block. Only hosts that
/// call [`TuningProcessor::process_block`] carry audio; the MIDI driver does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioMode {
    /// Leave samples untouched
    #[default]
    Passthrough,
    /// Zero every channel
    Silence,
}

pub struct TuningProcessor {
    tuning: Arc<TuningTable>,
    retuner: EventRetuner,
    audio_mode: AudioMode,
    sample_rate: f64,
    max_block_events: usize,
}

impl TuningProcessor {
    pub fn new(tuning: Arc<TuningTable>, audio_mode: AudioMode) -> Self {
        Self {
            tuning,
            retuner: EventRetuner::with_capacity(block_capacity_for(DEFAULT_MAX_BLOCK_EVENTS)),
            audio_mode,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_events: DEFAULT_MAX_BLOCK_EVENTS,
        }
    }

    /// Configure for playback. Allocates, so call it outside the real-time
    /// path. The last played note survives re-preparation.
    pub fn prepare(&mut self, sample_rate: f64, max_block_events: usize) {
        let max_block_events = max_block_events.max(1);
        self.sample_rate = sample_rate;

        if max_block_events != self.max_block_events {
            debug!(
                "Resizing blocks from {} to {} events",
                self.max_block_events, max_block_events
            );
            self.retuner
                .set_block_capacity(block_capacity_for(max_block_events));
            self.max_block_events = max_block_events;
        }

        info!(
            "Processor prepared: sample_rate={} max_block_events={} audio_mode={:?}",
            sample_rate, max_block_events, self.audio_mode
        );
    }

    /// A block sized for this processor. Every block handed to
    /// [`TuningProcessor::process_midi`] must come from here.
    pub fn create_block(&self) -> MidiBlock {
        MidiBlock::with_capacity(self.retuner.block_capacity())
    }

    /// Process one block of audio and MIDI.
    pub fn process_block(&mut self, audio: &mut [&mut [f32]], midi: &mut MidiBlock) {
        self.process_audio(audio);
        self.process_midi(midi);
    }

    pub fn process_audio(&self, audio: &mut [&mut [f32]]) {
        if self.audio_mode == AudioMode::Silence {
            for channel in audio.iter_mut() {
                channel.fill(0.0);
            }
        }
    }

    pub fn process_midi(&mut self, midi: &mut MidiBlock) {
        self.retuner.retune_block(&self.tuning, midi);
    }

    /// Forget the last played note; bends pass through unchanged until the
    /// next Note-On.
    pub fn reset(&mut self) {
        self.retuner.reset();
    }

    pub fn tuning(&self) -> &Arc<TuningTable> {
        &self.tuning
    }

    pub fn last_played_note(&self) -> NoteClassification {
        self.retuner.last_played_note()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Incoming events accepted per block.
    pub fn max_block_events(&self) -> usize {
        self.max_block_events
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.audio_mode
    }

    pub fn set_audio_mode(&mut self, audio_mode: AudioMode) {
        self.audio_mode = audio_mode;
    }
}

/// Every Note-On becomes two events, so blocks hold twice the input.
fn block_capacity_for(max_block_events: usize) -> usize {
    max_block_events.saturating_mul(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiEvent;
    use crate::note::PitchClass;

    #[test]
    fn test_silence_zeroes_audio() {
        let processor = TuningProcessor::new(Arc::new(TuningTable::new()), AudioMode::Silence);
        let mut left = vec![0.5f32; 4];
        let mut right = vec![-0.5f32; 4];
        {
            let mut audio: Vec<&mut [f32]> = vec![left.as_mut_slice(), right.as_mut_slice()];
            processor.process_audio(&mut audio);
        }
        assert!(left.iter().chain(right.iter()).all(|s| *s == 0.0));
    }

    #[test]
    fn test_passthrough_keeps_audio() {
        let processor = TuningProcessor::new(Arc::new(TuningTable::new()), AudioMode::Passthrough);
        let mut mono = vec![0.25f32; 4];
        {
            let mut audio: Vec<&mut [f32]> = vec![mono.as_mut_slice()];
            processor.process_audio(&mut audio);
        }
        assert_eq!(mono, vec![0.25f32; 4]);
    }

    #[test]
    fn test_prepare_sizes_blocks() {
        let mut processor = TuningProcessor::new(Arc::new(TuningTable::new()), AudioMode::default());
        processor.prepare(48_000.0, 32);

        assert_eq!(processor.sample_rate(), 48_000.0);
        assert_eq!(processor.max_block_events(), 32);
        assert_eq!(processor.create_block().capacity(), 64);
    }

    #[test]
    fn test_prepare_keeps_last_played_note() {
        let mut processor = TuningProcessor::new(Arc::new(TuningTable::new()), AudioMode::default());
        let mut block = processor.create_block();
        block.push(MidiEvent::note_on(0, 0, 64, 100));
        processor.process_midi(&mut block);

        processor.prepare(96_000.0, 16);
        assert_eq!(processor.last_played_note().pitch_class, PitchClass::E);
    }

    #[test]
    fn test_full_block_of_note_ons_fits() {
        let mut processor = TuningProcessor::new(Arc::new(TuningTable::new()), AudioMode::default());
        processor.prepare(48_000.0, 8);

        let mut block = processor.create_block();
        for i in 0..8u8 {
            block.push(MidiEvent::note_on(u64::from(i), 0, 60 + i, 100));
        }
        processor.process_midi(&mut block);

        assert_eq!(block.len(), 16);
        assert!(!block.has_overflowed());
    }

    #[test]
    fn test_process_block_uses_shared_tuning() {
        let tuning = Arc::new(TuningTable::new());
        let mut processor = TuningProcessor::new(tuning.clone(), AudioMode::Silence);
        tuning.set_offset(PitchClass::G, 25.0);

        let mut block = processor.create_block();
        block.push(MidiEvent::note_on(0, 0, 67, 90));
        let mut samples = vec![1.0f32; 8];
        {
            let mut audio: Vec<&mut [f32]> = vec![samples.as_mut_slice()];
            processor.process_block(&mut audio, &mut block);
        }

        let events: Vec<MidiEvent> = block.events().copied().collect();
        assert_eq!(events[1], MidiEvent::pitch_wheel(0, 0, 8192 + 2069));
        assert_eq!(processor.last_played_note().pitch_class, PitchClass::G);
        assert!(samples.iter().all(|s| *s == 0.0));
    }
}
