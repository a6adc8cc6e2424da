use crate::pitch_wheel::{combine_14bit, split_14bit};
use std::fmt;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;
const PITCH_WHEEL: u8 = 0xE0;

/// A short MIDI message carried through untouched.
///
/// Holds up to three bytes inline so forwarding never allocates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawMessage {
    bytes: [u8; 3],
    len: u8,
}

impl RawMessage {
    /// Returns `None` for empty input or messages longer than three bytes.
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        if data.is_empty() || data.len() > 3 {
            return None;
        }
        let mut bytes = [0u8; 3];
        bytes[..data.len()].copy_from_slice(data);
        Some(Self {
            bytes,
            len: data.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl fmt::Debug for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawMessage({:02X?})", self.as_bytes())
    }
}

/// A MIDI message the retuner understands, plus a pass-through variant.
///
/// Channels are the 0-based wire nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note On message with note number and velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off message with note number and release velocity
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Pitch wheel with a 14-bit value (center 8192)
    PitchWheel { channel: u8, value: u16 },
    /// Any other short message, forwarded verbatim
    Other(RawMessage),
}

impl MidiMessage {
    /// Decode one message from raw bytes.
    pub fn parse(data: &[u8]) -> Option<MidiMessage> {
        if data.is_empty() {
            return None;
        }

        let channel = data[0] & 0x0F;
        match data[0] & 0xF0 {
            NOTE_ON if data.len() >= 3 => Some(MidiMessage::NoteOn {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            NOTE_OFF if data.len() >= 3 => Some(MidiMessage::NoteOff {
                channel,
                note: data[1] & 0x7F,
                velocity: data[2] & 0x7F,
            }),
            PITCH_WHEEL if data.len() >= 3 => Some(MidiMessage::PitchWheel {
                channel,
                value: combine_14bit(data[1], data[2]),
            }),
            _ => RawMessage::from_slice(data).map(MidiMessage::Other),
        }
    }

    /// Encode into wire bytes.
    pub fn encode(&self) -> RawMessage {
        let (bytes, len) = match *self {
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => ([NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F], 3),
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => ([NOTE_OFF | (channel & 0x0F), note & 0x7F, velocity & 0x7F], 3),
            MidiMessage::PitchWheel { channel, value } => {
                let (lsb, msb) = split_14bit(value);
                ([PITCH_WHEEL | (channel & 0x0F), lsb, msb], 3)
            }
            MidiMessage::Other(raw) => return raw,
        };
        RawMessage { bytes, len }
    }

    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::PitchWheel { channel, .. } => Some(channel),
            MidiMessage::Other(raw) => {
                let status = raw.as_bytes()[0];
                (0x80..0xF0).contains(&status).then_some(status & 0x0F)
            }
        }
    }
}

/// A timestamped MIDI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// Sample position (or driver timestamp) of the event
    pub timestamp: u64,
    pub message: MidiMessage,
}

impl MidiEvent {
    pub fn new(timestamp: u64, message: MidiMessage) -> Self {
        Self { timestamp, message }
    }

    pub fn note_on(timestamp: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            timestamp,
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            },
        )
    }

    pub fn note_off(timestamp: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            timestamp,
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            },
        )
    }

    pub fn pitch_wheel(timestamp: u64, channel: u8, value: u16) -> Self {
        Self::new(timestamp, MidiMessage::PitchWheel { channel, value })
    }

    /// Same timestamp, different message.
    pub fn with(self, message: MidiMessage) -> Self {
        Self {
            timestamp: self.timestamp,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channel_messages() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 100]),
            Some(MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0x83, 60, 64]),
            Some(MidiMessage::NoteOff {
                channel: 3,
                note: 60,
                velocity: 64
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0xE1, 0x00, 0x40]),
            Some(MidiMessage::PitchWheel {
                channel: 1,
                value: 8192
            })
        );
    }

    #[test]
    fn test_parse_other_messages() {
        let cc = MidiMessage::parse(&[0xB0, 1, 64]).unwrap();
        match cc {
            MidiMessage::Other(raw) => assert_eq!(raw.as_bytes(), &[0xB0, 1, 64]),
            other => panic!("Expected pass-through message, got {:?}", other),
        }
        assert_eq!(cc.channel(), Some(0));

        let clock = MidiMessage::parse(&[0xF8]).unwrap();
        assert_eq!(clock.encode().as_bytes(), &[0xF8]);
        assert_eq!(clock.channel(), None);
    }

    #[test]
    fn test_parse_rejects_empty_and_long_messages() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7]), None);
    }

    #[test]
    fn test_truncated_note_on_is_passed_through() {
        match MidiMessage::parse(&[0x90, 60]) {
            Some(MidiMessage::Other(raw)) => assert_eq!(raw.as_bytes(), &[0x90, 60]),
            other => panic!("Expected pass-through message, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_pitch_wheel() {
        let msg = MidiMessage::PitchWheel {
            channel: 1,
            value: 12329,
        };
        assert_eq!(msg.encode().as_bytes(), &[0xE1, 0x29, 0x60]);
    }

    #[test]
    fn test_with_keeps_timestamp() {
        let event = MidiEvent::note_on(42, 0, 60, 100);
        let bent = event.with(MidiMessage::PitchWheel {
            channel: 0,
            value: 0,
        });
        assert_eq!(bent.timestamp, 42);
    }
}
