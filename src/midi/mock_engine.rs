use crate::midi::{MidiEngine, MidiError, MidiEvent, Result};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// In-memory engine: tests inject input through [`MockMidiEngine::input`]
/// and inspect everything sent through [`MockMidiEngine::sent`].
pub struct MockMidiEngine {
    tx: Sender<MidiEvent>,
    rx: Receiver<MidiEvent>,
    sent: Arc<Mutex<Vec<MidiEvent>>>,
}

impl MockMidiEngine {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        MockMidiEngine {
            tx,
            rx,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle for pushing events as if they came from a device.
    pub fn input(&self) -> Sender<MidiEvent> {
        self.tx.clone()
    }

    /// Shared log of every event passed to `send`.
    pub fn sent(&self) -> Arc<Mutex<Vec<MidiEvent>>> {
        self.sent.clone()
    }
}

impl Default for MockMidiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MidiEngine for MockMidiEngine {
    fn send(&mut self, event: &MidiEvent) -> Result<()> {
        self.sent
            .lock()
            .map_err(|e| MidiError::SendError(e.to_string()))?
            .push(*event);
        Ok(())
    }

    fn receiver(&self) -> Receiver<MidiEvent> {
        self.rx.clone()
    }

    fn list_devices(&self) -> Vec<String> {
        vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
    }
}
