use crate::note::{classify, NoteClassification};
use crate::pitch_wheel::corrected_center;
use crate::tuning::TuningTable;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Set in the packed last-note word once a note has been played.
const NOTE_DEFINED: u16 = 0x100;
const NOTE_MASK: u16 = 0x7f;

fn pack_note(note: NoteClassification) -> u16 {
    if note.defined {
        NOTE_DEFINED | (u16::from(note.note_number) & NOTE_MASK)
    } else {
        0
    }
}

fn unpack_note(word: u16) -> NoteClassification {
    if word & NOTE_DEFINED != 0 {
        classify((word & NOTE_MASK) as u8)
    } else {
        NoteClassification::UNDEFINED
    }
}

/// Counters published by the event loop and read by the UI thread.
#[derive(Debug)]
pub struct TuningMonitor {
    /// Note number and defined flag in one word, so readers never see a mix
    last_note: AtomicU16,
    blocks: AtomicU64,
    events_in: AtomicU64,
    events_out: AtomicU64,
    overflows: AtomicU64,
    send_failures: AtomicU64,
    running: AtomicBool,
}

impl TuningMonitor {
    pub fn new() -> Self {
        Self {
            last_note: AtomicU16::new(0),
            blocks: AtomicU64::new(0),
            events_in: AtomicU64::new(0),
            events_out: AtomicU64::new(0),
            overflows: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }

    pub fn record_block(
        &self,
        events_in: usize,
        events_out: usize,
        last_note: NoteClassification,
        overflowed: bool,
    ) {
        self.last_note.store(pack_note(last_note), Ordering::Relaxed);
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.events_in.fetch_add(events_in as u64, Ordering::Relaxed);
        self.events_out.fetch_add(events_out as u64, Ordering::Relaxed);
        if overflowed {
            self.overflows.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_send_failures(&self, count: usize) {
        self.send_failures.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn last_played_note(&self) -> NoteClassification {
        unpack_note(self.last_note.load(Ordering::Relaxed))
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn events_in(&self) -> u64 {
        self.events_in.load(Ordering::Relaxed)
    }

    pub fn events_out(&self) -> u64 {
        self.events_out.load(Ordering::Relaxed)
    }

    pub fn overflows(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }

    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn status_line(&self, tuning: &TuningTable) -> String {
        let note = self.last_played_note();
        let correction = if note.defined {
            let cents = tuning.offset(note.pitch_class);
            format!("{:+.2}c wheel {}", cents, corrected_center(cents))
        } else {
            "no note yet".to_string()
        };
        let mut line = format!(
            "Last note: {} ({}) | blocks {} | in {} | out {}",
            note,
            correction,
            self.blocks_processed(),
            self.events_in(),
            self.events_out()
        );
        let overflows = self.overflows();
        if overflows > 0 {
            line.push_str(&format!(" | overflows {}", overflows));
        }
        let failures = self.send_failures();
        if failures > 0 {
            line.push_str(&format!(" | send failures {}", failures));
        }
        line
    }
}

impl Default for TuningMonitor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_status_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{prefix:.bold.dim} {spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_prefix("Tuning");
    pb
}

/// Redraw the status spinner until [`TuningMonitor::stop`] is called.
pub fn run_monitor(monitor: Arc<TuningMonitor>, tuning: Arc<TuningTable>) {
    let pb = create_status_spinner();
    while monitor.is_running() {
        pb.set_message(monitor.status_line(&tuning));
        pb.tick();
        thread::sleep(REFRESH_INTERVAL);
    }
    pb.finish_and_clear();
}
