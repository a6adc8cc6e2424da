extern crate microtunrs;

use crossbeam::channel::unbounded;
use microtunrs::event_loop::{EngineMessage, EventLoop};
use crossbeam::channel::Receiver;
use microtunrs::midi::{self, MidiEngine, MidiError, MidiEvent, MockMidiEngine};
use microtunrs::note::PitchClass;
use microtunrs::ui::TuningMonitor;
use microtunrs::{AudioMode, TuningProcessor, TuningTable};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn wait_for(sent: &Arc<Mutex<Vec<MidiEvent>>>, count: usize) {
    for _ in 0..200 {
        if sent.lock().unwrap().len() >= count {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Refuses the first `failures` sends, then forwards to a mock engine.
struct FlakyEngine {
    inner: MockMidiEngine,
    failures: usize,
}

impl MidiEngine for FlakyEngine {
    fn send(&mut self, event: &MidiEvent) -> midi::Result<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(MidiError::SendError("port busy".to_string()));
        }
        self.inner.send(event)
    }

    fn receiver(&self) -> Receiver<MidiEvent> {
        self.inner.receiver()
    }

    fn list_devices(&self) -> Vec<String> {
        self.inner.list_devices()
    }
}

#[test]
fn integration_test_event_loop_retunes_input() {
    let tuning = Arc::new(TuningTable::new());
    tuning.set_offset(PitchClass::C, 50.0);

    let engine = MockMidiEngine::new();
    let input = engine.input();
    let sent = engine.sent();
    let monitor = Arc::new(TuningMonitor::new());
    let (control_tx, control_rx) = unbounded();

    let processor = TuningProcessor::new(tuning.clone(), AudioMode::Passthrough);
    let mut event_loop = EventLoop::new(processor, engine, control_rx, monitor.clone());
    let handle = thread::spawn(move || {
        event_loop.run();
        event_loop
    });

    input.send(MidiEvent::note_on(0, 1, 60, 100)).unwrap();
    input.send(MidiEvent::pitch_wheel(10, 1, 8192)).unwrap();

    wait_for(&sent, 3);

    control_tx.send(EngineMessage::Shutdown).unwrap();
    let event_loop = handle.join().expect("Event loop thread panicked");

    assert_eq!(
        *sent.lock().unwrap(),
        vec![
            MidiEvent::note_on(0, 1, 60, 100),
            MidiEvent::pitch_wheel(0, 1, 12329),
            MidiEvent::pitch_wheel(10, 1, 12329),
        ]
    );
    assert_eq!(event_loop.processor().last_played_note().note_number, 60);
    assert_eq!(monitor.events_out(), 3);
    assert!(!monitor.is_running(), "Shutdown should stop the monitor");
}

#[test]
fn integration_test_process_from_drains_queue() {
    let tuning = Arc::new(TuningTable::new());
    let engine = MockMidiEngine::new();
    let input = engine.input();
    let (_control_tx, control_rx) = unbounded();

    let mut processor = TuningProcessor::new(tuning, AudioMode::Passthrough);
    processor.prepare(48_000.0, 4);
    let monitor = Arc::new(TuningMonitor::new());
    let mut event_loop = EventLoop::new(processor, engine, control_rx, monitor.clone());

    for note in 60..66u8 {
        input.send(MidiEvent::note_on(u64::from(note), 0, note, 90)).unwrap();
    }

    // First block takes the first event plus three queued ones
    let first = event_loop.process_from(MidiEvent::note_on(0, 0, 59, 90));
    assert_eq!(first, 8);
    let second = event_loop.process_from(MidiEvent::note_on(1, 0, 58, 90));
    assert_eq!(second, 8);

    assert_eq!(monitor.blocks_processed(), 2);
    assert_eq!(monitor.events_in(), 8);
    assert_eq!(monitor.overflows(), 0);
    assert_eq!(event_loop.engine().sent().lock().unwrap().len(), 16);
}

#[test]
fn integration_test_reset_forgets_last_note() {
    let tuning = Arc::new(TuningTable::new());
    tuning.set_offset(PitchClass::A, -50.0);
    let engine = MockMidiEngine::new();
    let input = engine.input();
    let observer = engine.sent();
    let (control_tx, control_rx) = unbounded();

    let processor = TuningProcessor::new(tuning, AudioMode::Passthrough);
    let mut event_loop =
        EventLoop::new(processor, engine, control_rx, Arc::new(TuningMonitor::new()));
    let handle = thread::spawn(move || event_loop.run());

    input.send(MidiEvent::note_on(0, 0, 69, 100)).unwrap();
    wait_for(&observer, 2);
    control_tx.send(EngineMessage::Reset).unwrap();
    thread::sleep(Duration::from_millis(50));
    input.send(MidiEvent::pitch_wheel(5, 0, 8192)).unwrap();
    wait_for(&observer, 3);
    control_tx.send(EngineMessage::Shutdown).unwrap();
    handle.join().unwrap();

    let sent = observer.lock().unwrap();
    assert_eq!(sent[1], MidiEvent::pitch_wheel(0, 0, 8192 - 4137));
    assert_eq!(sent[2], MidiEvent::pitch_wheel(5, 0, 8192));
}

#[test]
fn integration_test_failed_send_keeps_rest_of_block() {
    let tuning = Arc::new(TuningTable::new());
    tuning.set_offset(PitchClass::C, 50.0);
    let inner = MockMidiEngine::new();
    let sent = inner.sent();
    let engine = FlakyEngine { inner, failures: 1 };
    let (_control_tx, control_rx) = unbounded();
    let monitor = Arc::new(TuningMonitor::new());

    let processor = TuningProcessor::new(tuning, AudioMode::Passthrough);
    let mut event_loop = EventLoop::new(processor, engine, control_rx, monitor.clone());

    // The Note-On is refused; its wheel correction still goes out
    let delivered = event_loop.process_from(MidiEvent::note_on(0, 0, 60, 100));

    assert_eq!(delivered, 1);
    assert_eq!(
        *sent.lock().unwrap(),
        vec![MidiEvent::pitch_wheel(0, 0, 12329)]
    );
    assert_eq!(monitor.blocks_processed(), 1);
    assert_eq!(monitor.events_in(), 1);
    assert_eq!(monitor.events_out(), 1);
    assert_eq!(monitor.send_failures(), 1);
    assert_eq!(monitor.last_played_note().note_number, 60);

    let delivered = event_loop.process_from(MidiEvent::pitch_wheel(5, 0, 8192));
    assert_eq!(delivered, 1);
    assert_eq!(monitor.blocks_processed(), 2);
    assert_eq!(monitor.send_failures(), 1);
}
