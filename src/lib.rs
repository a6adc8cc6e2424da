//! microtunrs: real-time MIDI microtuning.
//!
//! Every Note-On is followed by a Pitch-Wheel message that shifts the note by
//! the cents offset configured for its pitch class, and incoming bends are
//! re-based so they stack on top of the correction.

pub mod cli;
pub mod config;
pub mod event_loop;
pub mod logging;
pub mod midi;
pub mod note;
pub mod pitch_wheel;
pub mod presets;
pub mod processor;
pub mod retuner;
pub mod scheduler;
pub mod state;
pub mod tuning;
pub mod ui;

pub use cli::handle_device_list;
pub use event_loop::{EngineMessage, EventLoop};
pub use note::{classify, NoteClassification, PitchClass};
pub use processor::{AudioMode, TuningProcessor};
pub use retuner::{EventRetuner, PlayingNote};
pub use scheduler::{Scheduler, ThreadScheduler};
pub use tuning::{TuningSnapshot, TuningTable};

pub fn create_scheduler() -> ThreadScheduler {
    ThreadScheduler::new()
}
