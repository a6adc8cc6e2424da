use crate::midi::{MidiEngine, MidiError, MidiEvent, MidiMessage, Result};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, error, info, warn};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const CLIENT_NAME: &str = "microtunrs";

/// Capacity of the queue between the midir callback and the event loop.
pub const INPUT_QUEUE_CAPACITY: usize = 1024;

pub struct MidirEngine {
    #[allow(dead_code)]
    input: MidiInputConnection<()>,
    output: MidiOutputConnection,
    rx: Receiver<MidiEvent>,
    dropped: Arc<AtomicU64>,
}

impl MidirEngine {
    /// Connects to the first input and output ports whose names contain the
    /// given strings.
    pub fn connect(input_name: &str, output_name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new(&format!("{}-in", CLIENT_NAME))?;
        midi_in.ignore(Ignore::Sysex);

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|p| midi_in.port_name(p).unwrap_or_default().contains(input_name))
            .ok_or_else(|| {
                MidiError::ConnectionError(format!("Input device '{}' not found", input_name))
            })?;
        info!(
            "Connecting to MIDI input port: {}",
            midi_in.port_name(in_port)?
        );

        let midi_out = MidiOutput::new(&format!("{}-out", CLIENT_NAME))?;
        let out_ports = midi_out.ports();
        let out_port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(output_name)
            })
            .ok_or_else(|| {
                MidiError::ConnectionError(format!("Output device '{}' not found", output_name))
            })?;
        info!(
            "Connecting to MIDI output port: {}",
            midi_out.port_name(out_port)?
        );

        let (tx, rx) = bounded(INPUT_QUEUE_CAPACITY);
        let dropped = Arc::new(AtomicU64::new(0));
        let callback = input_callback(tx, dropped.clone());

        let input = midi_in.connect(in_port, "microtunrs-input", callback, ())?;
        let output = midi_out.connect(out_port, "microtunrs-output")?;

        Ok(MidirEngine {
            input,
            output,
            rx,
            dropped,
        })
    }

    /// Creates a virtual input and output port pair other applications can
    /// connect to.
    #[cfg(unix)]
    pub fn create_virtual(port_name: &str) -> Result<Self> {
        use midir::os::unix::{VirtualInput, VirtualOutput};

        let mut midi_in = MidiInput::new(&format!("{}-in", CLIENT_NAME))?;
        midi_in.ignore(Ignore::Sysex);
        let midi_out = MidiOutput::new(&format!("{}-out", CLIENT_NAME))?;

        let (tx, rx) = bounded(INPUT_QUEUE_CAPACITY);
        let dropped = Arc::new(AtomicU64::new(0));
        let callback = input_callback(tx, dropped.clone());

        let input = midi_in.create_virtual(port_name, callback, ())?;
        let output = midi_out.create_virtual(port_name)?;
        info!(
            "Created virtual ports '{}-in:{}' and '{}-out:{}'",
            CLIENT_NAME, port_name, CLIENT_NAME, port_name
        );

        Ok(MidirEngine {
            input,
            output,
            rx,
            dropped,
        })
    }

    /// Number of input messages discarded because the event loop fell behind.
    pub fn dropped_messages(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

fn input_callback(
    tx: Sender<MidiEvent>,
    dropped: Arc<AtomicU64>,
) -> impl FnMut(u64, &[u8], &mut ()) + Send + 'static {
    move |stamp, message, _| {
        let Some(parsed) = MidiMessage::parse(message) else {
            return;
        };
        match tx.try_send(MidiEvent::new(stamp, parsed)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl MidiEngine for MidirEngine {
    fn send(&mut self, event: &MidiEvent) -> Result<()> {
        let raw = event.message.encode();
        self.output.send(raw.as_bytes())?;
        Ok(())
    }

    fn receiver(&self) -> Receiver<MidiEvent> {
        self.rx.clone()
    }

    fn list_devices(&self) -> Vec<String> {
        list_ports()
    }
}

impl Drop for MidirEngine {
    fn drop(&mut self) {
        let dropped = self.dropped_messages();
        if dropped > 0 {
            warn!("{} incoming MIDI messages were dropped", dropped);
        }
        debug!("Closing MIDI connections");
    }
}

/// Names of all MIDI input and output ports, tagged with their direction.
pub fn list_ports() -> Vec<String> {
    let mut devices = Vec::new();

    match MidiInput::new(&format!("{}-list", CLIENT_NAME)) {
        Ok(midi_in) => {
            for port in midi_in.ports() {
                if let Ok(name) = midi_in.port_name(&port) {
                    devices.push(format!("{} [Input]", name));
                }
            }
        }
        Err(e) => error!("Failed to enumerate MIDI inputs: {}", e),
    }

    match MidiOutput::new(&format!("{}-list", CLIENT_NAME)) {
        Ok(midi_out) => {
            for port in midi_out.ports() {
                if let Ok(name) = midi_out.port_name(&port) {
                    devices.push(format!("{} [Output]", name));
                }
            }
        }
        Err(e) => error!("Failed to enumerate MIDI outputs: {}", e),
    }

    devices
}
