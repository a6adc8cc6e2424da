use super::MidiEvent;
use crossbeam::channel::Receiver;
use std::error::Error;
use std::fmt;

/// Custom error type for MIDI operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when sending a MIDI message
    SendError(String),
    /// Error when receiving a MIDI message
    RecvError(String),
    /// Error when connecting to a MIDI device
    ConnectionError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::SendError(msg) => write!(f, "MIDI send error: {}", msg),
            MidiError::RecvError(msg) => write!(f, "MIDI receive error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(e: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(e.kind().to_string())
    }
}

impl From<midir::PortInfoError> for MidiError {
    fn from(e: midir::PortInfoError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl From<midir::SendError> for MidiError {
    fn from(e: midir::SendError) -> Self {
        MidiError::SendError(e.to_string())
    }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Trait defining the interface for MIDI engine implementations
pub trait MidiEngine: Send {
    /// Sends one event to the output device
    fn send(&mut self, event: &MidiEvent) -> Result<()>;

    /// Channel on which decoded input events arrive
    fn receiver(&self) -> Receiver<MidiEvent>;

    /// Lists the port names visible to this engine
    fn list_devices(&self) -> Vec<String>;
}
