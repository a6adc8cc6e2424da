//! MIDI functionality for microtunrs
//!
//! This module provides:
//! - Core MIDI event types and the wire codec
//! - [`MidiBlock`], the fixed-capacity event sequence processed per block
//! - The [`MidiEngine`] trait for device I/O
//! - [`MidirEngine`] for real MIDI devices via midir
//! - [`MockMidiEngine`] for testing
//!
mod block;
mod engine;
mod message;
pub mod midir_engine;
pub mod mock_engine;

pub use block::{MidiBlock, SequencedEvent};
pub use engine::{MidiEngine, MidiError, Result};
pub use message::{MidiEvent, MidiMessage, RawMessage};

pub use midir_engine::MidirEngine;
pub use mock_engine::MockMidiEngine;

pub type DefaultMidiEngine = MidirEngine;

#[cfg(not(feature = "test-mock"))]
pub fn list_devices() -> Vec<String> {
    midir_engine::list_ports()
}

#[cfg(feature = "test-mock")]
pub fn list_devices() -> Vec<String> {
    // Mock implementation for tests - simple format as expected by tests
    vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
}
